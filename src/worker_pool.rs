// THEORY:
// The `worker_pool` module owns the compute side of the pipeline. A fixed
// number of worker tasks handle the CPU-bound color averaging off the
// orchestrator's control flow, and the orchestrator only ever sees completed
// results arriving through per-job oneshot channels.
//
// Key architectural principles:
// 1.  **Round-robin dispatch**: A single dispatcher task owns a rotating
//     cursor over per-worker queues. Assignment depends only on submission
//     order, never on job content. A busy worker queues the jobs assigned to
//     it; the pool does not rebalance a queued job to an idle worker. With
//     uniform per-job cost that simplicity costs nothing.
// 2.  **Demultiplexing by construction**: Every result carries the tile id it
//     was computed for, and travels back on the oneshot channel created by
//     that submission. A pool shared by several concurrent sessions therefore
//     cannot misroute a result to the wrong session.
// 3.  **Failure isolation**: A job that fails surfaces as an error result for
//     its tile only. The worker that processed it moves on to its next queued
//     job and the rest of the pool never notices.

use crate::core_modules::color::color::{Rgb, average_color};
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::MosaicError;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

/// Default number of pool members.
pub const WORKER_POOL_SIZE: usize = 4;

/// A color-averaging job for one tile.
pub struct ColorJob {
    /// The tile this job was cut from. Echoed back on the result.
    pub tile_id: usize,
    /// The tile's pixel block.
    pub pixels: Vec<Pixel>,
}

/// The outcome of one job. Exactly one result is produced per submitted job.
#[derive(Debug)]
pub struct JobResult {
    /// The tile the job was submitted for.
    pub tile_id: usize,
    /// Index of the pool member that processed the job.
    pub worker: usize,
    /// The averaged color, or the per-tile failure.
    pub color: std::result::Result<Rgb, MosaicError>,
}

struct JobEnvelope {
    job: ColorJob,
    result_sender: oneshot::Sender<JobResult>,
}

/// A fixed-size pool of worker tasks processing color-averaging jobs.
pub struct WorkerPool {
    job_sender: mpsc::UnboundedSender<JobEnvelope>,
    size: usize,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `size` workers. A size of zero is clamped
    /// to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (job_sender, mut job_receiver) = mpsc::unbounded_channel::<JobEnvelope>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..size)
            .map(|_| mpsc::unbounded_channel::<JobEnvelope>())
            .unzip();

        // Dispatcher: owns the cursor, assigns jobs in arrival order.
        tokio::spawn(async move {
            let mut cursor = 0;
            while let Some(envelope) = job_receiver.recv().await {
                let _ = worker_senders[cursor].send(envelope);
                cursor = (cursor + 1) % size;
            }
        });

        let mut workers = Vec::with_capacity(size);
        for (index, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            workers.push(tokio::spawn(async move {
                while let Some(JobEnvelope { job, result_sender }) = worker_receiver.recv().await {
                    let color = average_color(&job.pixels);
                    // The session may already have failed and dropped its
                    // receiving end; that is fine, the result is discarded.
                    let _ = result_sender.send(JobResult {
                        tile_id: job.tile_id,
                        worker: index,
                        color,
                    });
                }
            }));
        }

        Self {
            job_sender,
            size,
            workers,
        }
    }

    /// A pool sized to the host's logical CPU count.
    pub fn sized_for_host() -> Self {
        Self::new(num_cpus::get().max(1))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Hands a job to the dispatcher and returns the future result. The job
    /// enters the dispatch queue immediately, in call order; only the wait
    /// for its result is deferred.
    pub fn submit(
        &self,
        job: ColorJob,
    ) -> impl Future<Output = std::result::Result<JobResult, MosaicError>> + Send + 'static {
        let tile_id = job.tile_id;
        let (result_sender, result_receiver) = oneshot::channel();
        let accepted = self
            .job_sender
            .send(JobEnvelope { job, result_sender })
            .is_ok();

        async move {
            if !accepted {
                return Err(MosaicError::WorkerFailure {
                    tile_id,
                    reason: "worker pool is shut down".to_string(),
                });
            }
            result_receiver.await.map_err(|_| MosaicError::WorkerFailure {
                tile_id,
                reason: "worker dropped the job before replying".to_string(),
            })
        }
    }

    /// Stops accepting jobs and waits for the workers to drain their queues.
    pub async fn shutdown(self) {
        let Self {
            job_sender,
            workers,
            ..
        } = self;
        drop(job_sender);
        for worker in workers {
            let _ = worker.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    fn job(tile_id: usize) -> ColorJob {
        ColorJob {
            tile_id,
            pixels: vec![Pixel::opaque(100, 150, 200); 25],
        }
    }

    #[tokio::test]
    async fn eight_jobs_round_robin_across_four_workers() {
        let pool = WorkerPool::new(4);
        let pending: Vec<_> = (0..8).map(|id| pool.submit(job(id))).collect();
        let results = join_all(pending).await;

        for (id, result) in results.into_iter().enumerate() {
            let result = result.unwrap();
            assert_eq!(result.tile_id, id);
            // Tiles {0,4} land on worker 0, {1,5} on worker 1, and so on.
            assert_eq!(result.worker, id % 4);
            assert_eq!(result.color.unwrap(), Rgb::new(100, 150, 200));
        }
    }

    #[tokio::test]
    async fn single_job_uses_only_the_first_worker() {
        let pool = WorkerPool::new(4);
        let result = pool.submit(job(0)).await.unwrap();
        assert_eq!(result.worker, 0);
    }

    #[tokio::test]
    async fn failed_job_does_not_affect_other_jobs() {
        let pool = WorkerPool::new(2);
        let empty = pool.submit(ColorJob {
            tile_id: 0,
            pixels: Vec::new(),
        });
        let healthy = pool.submit(job(1));

        let failed = empty.await.unwrap();
        assert!(matches!(
            failed.color,
            Err(MosaicError::InvalidInput { .. })
        ));

        let ok = healthy.await.unwrap();
        assert_eq!(ok.color.unwrap(), Rgb::new(100, 150, 200));
    }

    #[tokio::test]
    async fn results_are_tagged_with_their_tile_id() {
        let pool = WorkerPool::new(3);
        let pending: Vec<_> = (0..10).map(|id| pool.submit(job(id))).collect();
        let results = join_all(pending).await;
        for (id, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap().tile_id, id);
        }
    }

    #[tokio::test]
    async fn zero_size_is_clamped_to_one_worker() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        let result = pool.submit(job(0)).await.unwrap();
        assert_eq!(result.worker, 0);
    }

    #[tokio::test]
    async fn shutdown_drains_in_flight_jobs() {
        let pool = WorkerPool::new(2);
        let pending: Vec<_> = (0..4).map(|id| pool.submit(job(id))).collect();
        pool.shutdown().await;
        for result in join_all(pending).await {
            assert!(result.unwrap().color.is_ok());
        }
    }

    #[tokio::test]
    async fn every_job_yields_exactly_one_result() {
        let pool = WorkerPool::new(4);
        let pending: Vec<_> = (0..20).map(|id| pool.submit(job(id))).collect();
        let results = join_all(pending).await;
        assert_eq!(results.len(), 20);
        let mut seen: Vec<usize> = results
            .into_iter()
            .map(|result| result.unwrap().tile_id)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }
}

// THEORY:
// The `color` module holds the one genuinely numeric operation of the engine:
// reducing a block of pixels to a single representative RGB value. The average
// is what the resolver is keyed on, so it must be deterministic for identical
// input. To bound cost on large tiles only every `SAMPLE_STRIDE`-th pixel is
// visited; per-channel sums accumulate in u64 so even a full-frame block cannot
// overflow, and the division floors to integer channels.
//
// Alpha is ignored on purpose. Reference tiles are matched on color alone and
// the compositor writes opaque output.

pub mod color {
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::{MosaicError, Result};
    use std::fmt;

    /// Sampling stride for block averaging. Visiting every pixel of a large
    /// tile buys no visible accuracy for matching purposes.
    pub const SAMPLE_STRIDE: usize = 5;

    /// An averaged RGB color, the key the resolver is queried with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Rgb {
        /// The red channel value (0-255).
        pub red: u8,
        /// The green channel value (0-255).
        pub green: u8,
        /// The blue channel value (0-255).
        pub blue: u8,
    }

    impl Rgb {
        pub const fn new(red: u8, green: u8, blue: u8) -> Self {
            Self { red, green, blue }
        }

        /// Lowercase hex form, e.g. `"0a80ff"`. Reference stores key their
        /// tile lookups on this form.
        pub fn to_hex(&self) -> String {
            format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
    }

    impl fmt::Display for Rgb {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{}", self.to_hex())
        }
    }

    /// Computes the mean color of a pixel block by strided sampling.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty block. The partitioner guarantees
    /// every tile carries at least one pixel, so inside a build this only
    /// fires on a malformed hand-built job.
    pub fn average_color(pixels: &[Pixel]) -> Result<Rgb> {
        if pixels.is_empty() {
            return Err(MosaicError::InvalidInput {
                reason: "cannot average an empty pixel block".to_string(),
            });
        }

        let mut sum_red = 0u64;
        let mut sum_green = 0u64;
        let mut sum_blue = 0u64;
        let mut count = 0u64;

        for pixel in pixels.iter().step_by(SAMPLE_STRIDE) {
            sum_red += u64::from(pixel.red);
            sum_green += u64::from(pixel.green);
            sum_blue += u64::from(pixel.blue);
            count += 1;
        }

        Ok(Rgb {
            red: (sum_red / count) as u8,
            green: (sum_green / count) as u8,
            blue: (sum_blue / count) as u8,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn uniform_block_averages_to_its_color_exactly() {
            let pixels = vec![Pixel::opaque(12, 200, 77); 64];
            let color = average_color(&pixels).unwrap();
            assert_eq!(color, Rgb::new(12, 200, 77));
        }

        #[test]
        fn single_pixel_block_is_valid() {
            let pixels = [Pixel::opaque(255, 0, 128)];
            assert_eq!(average_color(&pixels).unwrap(), Rgb::new(255, 0, 128));
        }

        #[test]
        fn sampling_only_visits_strided_pixels() {
            // Pixels at indices 0 and 5 are white, everything else black.
            // With a stride of 5 over 10 pixels only the white ones are seen.
            let mut pixels = vec![Pixel::opaque(0, 0, 0); 10];
            pixels[0] = Pixel::opaque(255, 255, 255);
            pixels[5] = Pixel::opaque(255, 255, 255);
            let color = average_color(&pixels).unwrap();
            assert_eq!(color, Rgb::new(255, 255, 255));
        }

        #[test]
        fn average_floors_to_integer_channels() {
            // Sampled pixels (indices 0 and 5): red 10 and 15, mean 12.5.
            let mut pixels = vec![Pixel::opaque(10, 0, 0); 10];
            pixels[5] = Pixel::opaque(15, 0, 0);
            let color = average_color(&pixels).unwrap();
            assert_eq!(color.red, 12);
        }

        #[test]
        fn empty_block_is_rejected() {
            let result = average_color(&[]);
            assert!(matches!(result, Err(MosaicError::InvalidInput { .. })));
        }

        #[test]
        fn hex_conversion_matches_css_form() {
            assert_eq!(Rgb::new(255, 255, 255).to_hex(), "ffffff");
            assert_eq!(Rgb::new(10, 128, 255).to_hex(), "0a80ff");
            assert_eq!(Rgb::new(0, 0, 0).to_hex(), "000000");
            assert_eq!(format!("{}", Rgb::new(0, 0, 0)), "#000000");
        }
    }
}

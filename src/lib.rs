use std::{fmt, thread};

use image::RgbaImage;
use log::debug;

mod command;
mod decode;
mod output;

pub use command::{pack_color, Command, BASE_SCALE};
pub use decode::{decode, read_image, spawn_decode, DecodeHandle};
pub use output::{output_file_name, write_commands, write_commands_to};

/// A decoded image, addressed as `(x, y)` with `x` the column and `y` the row.
pub type PixelBuffer = RgbaImage;

#[derive(Debug)]
pub enum DisplayError {
    ReadImageFailed(std::io::Error),
    EmptyInput,
    DecodeImageFailed(image::ImageError),
    DecodeThreadPanicked,
    WriteOutputFailed(std::io::Error),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadImageFailed(error) => write!(f, "unable to read image: {error}"),
            Self::EmptyInput => write!(f, "unable to decode image: no data"),
            Self::DecodeImageFailed(error) => write!(f, "unable to decode image: {error}"),
            Self::DecodeThreadPanicked => write!(f, "image decoder thread panicked"),
            Self::WriteOutputFailed(error) => write!(f, "unable to write commands: {error}"),
        }
    }
}

impl std::error::Error for DisplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadImageFailed(error) | Self::WriteOutputFailed(error) => Some(error),
            Self::DecodeImageFailed(error) => Some(error),
            Self::EmptyInput | Self::DecodeThreadPanicked => None,
        }
    }
}

/// Controls how pixel coordinates map onto placement coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Distance between neighbouring placements.
    pub pixel_scale: f64,
    /// Added to every placement, as `[x, y, z]`.
    pub offset: [f64; 3],
}

impl LayoutParams {
    pub fn new(pixel_scale: f64, offset: [f64; 3]) -> Self {
        Self {
            pixel_scale,
            offset,
        }
    }

    /// Placements one glyph apart at unit scale, anchored at the origin.
    pub fn fixed_scale() -> Self {
        Self::new(BASE_SCALE, [0.0, 0.0, 0.0])
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::new(0.1, [0.0, 0.0, 0.0])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Collects every pixel with nonzero alpha, rows top to bottom, columns left to right.
pub fn build_pixels(buffer: &PixelBuffer) -> Vec<Pixel> {
    let mut pixels = Vec::new();
    for (x, y, color) in buffer.enumerate_pixels() {
        let [r, g, b, a] = color.0;
        if a != 0 {
            pixels.push(Pixel { x, y, r, g, b, a })
        }
    }
    pixels
}

/// Produces one command per opaque pixel, in scan order.
pub fn generate(buffer: &PixelBuffer, params: &LayoutParams) -> Vec<String> {
    format_batch(&build_pixels(buffer), params)
}

/// Same output as [`generate`], with the formatting spread over worker threads.
///
/// Pixels are split into batches of `batch_size` and at most `threads` batches
/// are formatted at once. A `threads` of 0 uses one thread per CPU.
pub fn generate_parallel(
    buffer: &PixelBuffer,
    params: &LayoutParams,
    batch_size: usize,
    threads: usize,
) -> Vec<String> {
    let pixels = build_pixels(buffer);
    let batch_size = batch_size.max(1);
    let threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    let batches: Vec<&[Pixel]> = pixels.chunks(batch_size).collect();
    debug!(
        "formatting {} pixels in {} batches on up to {threads} threads",
        pixels.len(),
        batches.len()
    );

    let mut commands = Vec::with_capacity(pixels.len());
    for wave in batches.chunks(threads) {
        let formatted: Vec<Vec<String>> = thread::scope(|scope| {
            let handles: Vec<_> = wave
                .iter()
                .map(|batch| scope.spawn(move || format_batch(batch, params)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });
        commands.extend(formatted.into_iter().flatten());
    }
    commands
}

fn format_batch(pixels: &[Pixel], params: &LayoutParams) -> Vec<String> {
    pixels
        .iter()
        .map(|pixel| Command::from_pixel(pixel, params).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use test_log::test;

    fn translation(command: &str) -> [f64; 3] {
        let start = command.find("translation:[").unwrap() + "translation:[".len();
        let end = start + command[start..].find(']').unwrap();
        let mut values = command[start..end]
            .split(',')
            .map(|value| value.trim_end_matches('f').parse::<f64>().unwrap());
        [
            values.next().unwrap(),
            values.next().unwrap(),
            values.next().unwrap(),
        ]
    }

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 7, 255])
        })
    }

    #[test]
    fn transparent_image_yields_nothing() {
        let buffer = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 0]));
        assert!(generate(&buffer, &LayoutParams::default()).is_empty());
    }

    #[test]
    fn opaque_image_yields_one_command_per_pixel() {
        let buffer = gradient(5, 3);
        assert_eq!(generate(&buffer, &LayoutParams::default()).len(), 15);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let buffer = RgbaImage::new(0, 0);
        assert!(generate(&buffer, &LayoutParams::default()).is_empty());
        assert!(generate_parallel(&buffer, &LayoutParams::default(), 4, 2).is_empty());
    }

    #[test]
    fn only_fully_transparent_pixels_are_skipped() {
        let mut buffer = RgbaImage::from_pixel(3, 1, Rgba([1, 2, 3, 0]));
        buffer.put_pixel(1, 0, Rgba([1, 2, 3, 1]));
        let commands = generate(&buffer, &LayoutParams::new(1.0, [0.0; 3]));
        assert_eq!(commands.len(), 1);
        assert!(commands[0].ends_with(&format!("background:{}}}", pack_color(1, 2, 3, 1))));
    }

    #[test]
    fn generation_is_repeatable() {
        let buffer = gradient(6, 4);
        let params = LayoutParams::new(0.5, [1.0, 2.0, 3.0]);
        assert_eq!(generate(&buffer, &params), generate(&buffer, &params));
    }

    #[test]
    fn scans_rows_then_columns_on_wide_images() {
        let buffer = gradient(3, 2);
        let commands = generate(&buffer, &LayoutParams::new(1.0, [0.0; 3]));
        let positions: Vec<(f64, f64)> = commands
            .iter()
            .map(|command| {
                let [x, _, z] = translation(command);
                ((x - 0.046).round(), (z - 0.097).round())
            })
            .collect();
        assert_eq!(
            positions,
            vec![
                (0.0, 0.0),
                (1.0, 0.0),
                (2.0, 0.0),
                (0.0, 1.0),
                (1.0, 1.0),
                (2.0, 1.0)
            ]
        );
    }

    #[test]
    fn scale_stretches_only_the_pixel_term() {
        let buffer = gradient(4, 4);
        let offset = [3.0, -2.0, 7.0];
        let narrow = generate(&buffer, &LayoutParams::new(1.0, offset));
        let wide = generate(&buffer, &LayoutParams::new(2.5, offset));
        for (narrow, wide) in narrow.iter().zip(&wide) {
            let [nx, ny, nz] = translation(narrow);
            let [wx, wy, wz] = translation(wide);
            assert!(((wx - 3.046) - 2.5 * (nx - 3.046)).abs() < 1e-9);
            assert!(((wz - 7.097) - 2.5 * (nz - 7.097)).abs() < 1e-9);
            assert_eq!(ny, -2.0);
            assert_eq!(wy, -2.0);
        }
    }

    #[test]
    fn parallel_output_matches_sequential() {
        let mut buffer = gradient(9, 7);
        buffer.put_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let params = LayoutParams::default();
        let expected = generate(&buffer, &params);
        for (batch_size, threads) in [(1, 1), (4, 3), (100, 2), (0, 0)] {
            assert_eq!(
                generate_parallel(&buffer, &params, batch_size, threads),
                expected
            );
        }
    }

    #[test]
    fn fixed_scale_is_the_default_glyph_spacing() {
        let params = LayoutParams::fixed_scale();
        assert_eq!(params.pixel_scale, BASE_SCALE);
        assert_eq!(params.offset, [0.0; 3]);
    }
}

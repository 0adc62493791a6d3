use std::path::Path;

use anyhow::Context;
use termvid_core::config::Config;
use termvid_core::tools::FrameConverter;
use termvid_core::{Error, Result};

use crate::resize::GridResizer;

/// Tone adjustments applied before mapping luma to characters.
/// All three are percentages; zero leaves the image untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub sharpness: f32,
    pub brightness: f32,
    pub contrast: f32,
}

/// Image file -> grid of grayscale characters, one per pixel of the grid.
pub struct AsciiConverter {
    resizer: GridResizer,
    tone: Tone,
    table: Vec<char>,
}

impl AsciiConverter {
    /// `table` runs from darkest to brightest and must not be empty.
    pub fn new(cols: u32, rows: u32, tone: Tone, table: &str) -> Self {
        Self {
            resizer: GridResizer::new(cols, rows),
            tone,
            table: table.chars().collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let (cols, rows) = config.frame_size();
        let tone = Tone {
            sharpness: config.ascii.sharpness,
            brightness: config.ascii.brightness,
            contrast: config.ascii.contrast,
        };
        Self::new(cols, rows, tone, &config.ascii.grayscale_table)
    }

    fn convert_image(&mut self, path: &Path) -> anyhow::Result<String> {
        let luma = image::open(path)
            .with_context(|| format!("failed to decode {}", path.display()))?
            .to_luma8();
        let (width, height) = luma.dimensions();
        let grid = self.resizer.resize(luma.into_raw(), width, height)?;
        Ok(self.render(&grid))
    }

    /// Map a `cols` x `rows` luma grid to text, rows separated by `\n`.
    pub fn render(&self, grid: &[u8]) -> String {
        let cols = self.resizer.cols() as usize;
        let rows = self.resizer.rows() as usize;
        let toned = apply_tone(grid, cols, rows, self.tone);

        let mut out = String::with_capacity((cols + 1) * rows);
        for (row, line) in toned.chunks(cols).enumerate() {
            if row > 0 {
                out.push('\n');
            }
            out.extend(line.iter().map(|&v| char_for(v, &self.table)));
        }
        out
    }
}

impl FrameConverter for AsciiConverter {
    fn convert(&mut self, image: &Path) -> Result<String> {
        self.convert_image(image).map_err(|e| Error::Conversion {
            path: image.to_path_buf(),
            message: format!("{e:#}"),
        })
    }
}

/// Sharpen (3x3 unsharp mask), then brightness, then contrast.
fn apply_tone(grid: &[u8], cols: usize, rows: usize, tone: Tone) -> Vec<u8> {
    let amount = tone.sharpness / 100.0;
    let shift = 255.0 * tone.brightness / 100.0;
    let stretch = 1.0 + tone.contrast / 100.0;

    let at = |x: isize, y: isize| -> f32 {
        let x = x.clamp(0, cols as isize - 1) as usize;
        let y = y.clamp(0, rows as isize - 1) as usize;
        grid[y * cols + x] as f32
    };

    let mut out = Vec::with_capacity(grid.len());
    for y in 0..rows as isize {
        for x in 0..cols as isize {
            let v = at(x, y);
            let mut blur = 0.0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    blur += at(x + dx, y + dy);
                }
            }
            blur /= 9.0;

            let sharpened = v + amount * (v - blur);
            let brightened = sharpened + shift;
            let contrasted = (brightened - 128.0) * stretch + 128.0;
            out.push(contrasted.round().clamp(0.0, 255.0) as u8);
        }
    }
    out
}

fn char_for(luma: u8, table: &[char]) -> char {
    let last = table.len().saturating_sub(1);
    table.get(luma as usize * last / 255).copied().unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    const NEUTRAL: Tone = Tone {
        sharpness: 0.0,
        brightness: 0.0,
        contrast: 0.0,
    };

    #[test]
    fn char_for_covers_the_whole_table() {
        let table: Vec<char> = " .:#@".chars().collect();
        assert_eq!(char_for(0, &table), ' ');
        assert_eq!(char_for(255, &table), '@');
        assert_eq!(char_for(128, &table), ':');
        assert_eq!(char_for(200, &[' ']), ' ');
    }

    #[test]
    fn neutral_tone_is_identity() {
        let grid: Vec<u8> = (0..=255).collect();
        assert_eq!(apply_tone(&grid, 16, 16, NEUTRAL), grid);
    }

    #[test]
    fn brightness_and_contrast_move_values() {
        let grid = vec![100u8; 4];
        let bright = apply_tone(&grid, 2, 2, Tone { brightness: 10.0, ..NEUTRAL });
        assert!(bright.iter().all(|&v| v == 126));

        let contrast = apply_tone(&[64, 192], 2, 1, Tone { contrast: 100.0, ..NEUTRAL });
        assert_eq!(contrast, vec![0, 255]);
    }

    #[test]
    fn sharpening_increases_edge_contrast() {
        // Left half dark, right half bright.
        let grid = vec![50, 50, 200, 200, 50, 50, 200, 200];
        let out = apply_tone(&grid, 4, 2, Tone { sharpness: 100.0, ..NEUTRAL });
        assert!(out[1] < 50);
        assert!(out[2] > 200);
        assert_eq!(out[0], 50);
    }

    #[test]
    fn renders_rows_of_grid_width() {
        let conv = AsciiConverter::new(3, 2, NEUTRAL, " @");
        let text = conv.render(&[0, 255, 0, 255, 0, 255]);
        assert_eq!(text, " @ \n@ @");
    }

    #[test]
    fn converts_image_file_to_grid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("0.png");
        let img = GrayImage::from_fn(40, 30, |x, _| if x < 20 { Luma([0]) } else { Luma([255]) });
        img.save(&path).unwrap();

        // Strong contrast pins resampling ripple to the table ends.
        let tone = Tone { contrast: 100.0, ..NEUTRAL };
        let mut conv = AsciiConverter::new(8, 6, tone, " .:-=+*#%@");
        let text = conv.convert(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        for line in lines {
            assert_eq!(line.chars().count(), 8);
            assert!(line.starts_with(' '));
            assert!(line.ends_with('@'));
        }

        // Same input, same output.
        assert_eq!(conv.convert(&path).unwrap(), text);
    }

    #[test]
    fn default_config_yields_80x60_grid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("1.png");
        GrayImage::from_pixel(160, 120, Luma([90])).save(&path).unwrap();

        let mut conv = AsciiConverter::from_config(&Config::default());
        let text = conv.convert(&path).unwrap();
        assert_eq!(text.lines().count(), 60);
        assert!(text.lines().all(|l| l.chars().count() == 80));
    }

    #[test]
    fn unreadable_image_is_a_conversion_failure() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("2.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let err = AsciiConverter::from_config(&Config::default()).convert(&path).unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
    }
}

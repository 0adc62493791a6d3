use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, IoContext, Result};

/// Darkest to brightest.
pub const DEFAULT_GRAYSCALE: &str = " .:-=+*#%@";

/// Output size presets, named by their line count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
pub enum Resolution {
    R1080,
    R720,
    R480,
    R360,
    R240,
    R120,
    R60,
}

impl Resolution {
    pub const ALL: [Resolution; 7] = [
        Resolution::R1080,
        Resolution::R720,
        Resolution::R480,
        Resolution::R360,
        Resolution::R240,
        Resolution::R120,
        Resolution::R60,
    ];

    pub fn lines(self) -> u32 {
        match self {
            Resolution::R1080 => 1080,
            Resolution::R720 => 720,
            Resolution::R480 => 480,
            Resolution::R360 => 360,
            Resolution::R240 => 240,
            Resolution::R120 => 120,
            Resolution::R60 => 60,
        }
    }

    /// Pixel (and character grid) dimensions, width first.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::R1080 => (1920, 1080),
            Resolution::R720 => (1280, 720),
            Resolution::R480 => (640, 480),
            Resolution::R360 => (480, 360),
            Resolution::R240 => (320, 240),
            Resolution::R120 => (160, 120),
            Resolution::R60 => (80, 60),
        }
    }
}

impl TryFrom<u32> for Resolution {
    type Error = Error;

    fn try_from(lines: u32) -> Result<Self> {
        Resolution::ALL
            .into_iter()
            .find(|r| r.lines() == lines)
            .ok_or_else(|| {
                let known: Vec<String> = Resolution::ALL.iter().map(|r| r.to_string()).collect();
                Error::Config(format!(
                    "unknown resolution {lines}, expected one of {}",
                    known.join(", ")
                ))
            })
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lines: u32 = s
            .trim()
            .trim_end_matches('p')
            .parse()
            .map_err(|_| Error::Config(format!("unknown resolution {s:?}")))?;
        Resolution::try_from(lines)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub resolution: Resolution,
    /// Sampling rate of the renderer and frame rate of the player.
    pub fps: u32,
    pub chunk_seconds: u64,
    /// Leading frames inspected when looking for letterbox bars.
    pub crop_probe_frames: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::R60,
            fps: 20,
            chunk_seconds: 10,
            crop_probe_frames: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AsciiConfig {
    pub sharpness: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub grayscale_table: String,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            sharpness: 10.0,
            brightness: 10.0,
            contrast: 10.0,
            grayscale_table: DEFAULT_GRAYSCALE.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            output_dir: PathBuf::from("ascii"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub video: VideoConfig,
    pub ascii: AsciiConfig,
    pub paths: PathsConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .io_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.video.fps == 0 {
            return Err(Error::Config("fps must be greater than zero".into()));
        }
        if self.video.chunk_seconds == 0 {
            return Err(Error::Config("chunk_seconds must be greater than zero".into()));
        }
        if self.video.crop_probe_frames == 0 {
            return Err(Error::Config("crop_probe_frames must be greater than zero".into()));
        }
        if self.ascii.grayscale_table.is_empty() {
            return Err(Error::Config("grayscale_table must not be empty".into()));
        }
        Ok(())
    }

    /// Width and height of the resized video and of every text frame.
    pub fn frame_size(&self) -> (u32, u32) {
        self.video.resolution.dimensions()
    }
}

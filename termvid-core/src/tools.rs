use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Crop rectangle as understood by the video toolchain, e.g. `80:48:0:6`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropSpec(String);

impl CropSpec {
    /// `None` for an empty token.
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim().trim_start_matches("crop=");
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CropSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video operations the renderer delegates to an external toolchain.
/// Every call blocks until the tool is done.
pub trait VideoTools {
    /// Rescale to exactly `width` x `height`.
    fn resize(&self, input: &Path, output: &Path, width: u32, height: u32) -> Result<()>;

    /// Look at the first `probe_frames` frames for letterbox bars.
    /// `None` when there is nothing to crop.
    fn detect_crop(&self, input: &Path, probe_frames: u32) -> Result<Option<CropSpec>>;

    fn crop(&self, input: &Path, output: &Path, spec: &CropSpec) -> Result<()>;

    /// Raw duration text as printed by the prober. Parsed by
    /// [`crate::plan::parse_duration`].
    fn probe_duration(&self, input: &Path) -> Result<String>;

    /// Stream-copy `[start, start + length)` without re-encoding.
    fn extract(&self, input: &Path, output: &Path, start: Duration, length: Duration)
        -> Result<()>;

    /// Write frames sampled at `fps` into `output_dir` as `0.jpg`, `1.jpg`, ...
    /// in presentation order.
    fn sample(&self, input: &Path, output_dir: &Path, fps: u32) -> Result<()>;
}

/// Turns one sampled image into the text of a frame artifact.
/// Deterministic for a given image.
pub trait FrameConverter {
    fn convert(&mut self, image: &Path) -> Result<String>;
}

impl<T: VideoTools + ?Sized> VideoTools for &T {
    fn resize(&self, input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
        (**self).resize(input, output, width, height)
    }

    fn detect_crop(&self, input: &Path, probe_frames: u32) -> Result<Option<CropSpec>> {
        (**self).detect_crop(input, probe_frames)
    }

    fn crop(&self, input: &Path, output: &Path, spec: &CropSpec) -> Result<()> {
        (**self).crop(input, output, spec)
    }

    fn probe_duration(&self, input: &Path) -> Result<String> {
        (**self).probe_duration(input)
    }

    fn extract(&self, input: &Path, output: &Path, start: Duration, length: Duration)
        -> Result<()> {
        (**self).extract(input, output, start, length)
    }

    fn sample(&self, input: &Path, output_dir: &Path, fps: u32) -> Result<()> {
        (**self).sample(input, output_dir, fps)
    }
}

impl<C: FrameConverter + ?Sized> FrameConverter for &mut C {
    fn convert(&mut self, image: &Path) -> Result<String> {
        (**self).convert(image)
    }
}

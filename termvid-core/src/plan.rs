use std::time::Duration;

use crate::error::{Error, Result};

/// Parse the prober's textual duration (seconds, possibly fractional).
pub fn parse_duration(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let seconds: f64 = trimmed
        .parse()
        .map_err(|_| Error::InvalidDuration(trimmed.to_string()))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(Error::InvalidDuration(trimmed.to_string()));
    }
    Ok(seconds)
}

/// How a video of known length is cut into fixed-length chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    total_seconds: u64,
    chunk_seconds: u64,
    chunk_count: u64,
}

impl ChunkPlan {
    /// `total_seconds` is rounded to the nearest whole second before planning.
    pub fn new(total_seconds: f64, chunk_seconds: u64) -> Result<Self> {
        if !total_seconds.is_finite() || total_seconds <= 0.0 {
            return Err(Error::InvalidDuration(total_seconds.to_string()));
        }
        if chunk_seconds == 0 {
            return Err(Error::Config("chunk length must be greater than zero".into()));
        }

        let total = total_seconds.round() as u64;
        // Clips shorter than half a second still get one chunk.
        let chunk_count = total.div_ceil(chunk_seconds).max(1);

        Ok(Self {
            total_seconds: total,
            chunk_seconds,
            chunk_count,
        })
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn chunk_seconds(&self) -> u64 {
        self.chunk_seconds
    }

    pub fn chunk_count(&self) -> u64 {
        self.chunk_count
    }

    /// Chunks in ascending index order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.chunk_count).map(move |index| Chunk {
            index,
            start: Duration::from_secs(index * self.chunk_seconds),
            length: Duration::from_secs(self.chunk_seconds),
        })
    }
}

/// One time window of the source. The last chunk's `length` may run past the
/// end of the video; the extractor clamps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub index: u64,
    pub start: Duration,
    pub length: Duration,
}

/// `HH:MM:SS`, whole seconds.
pub fn format_timestamp(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

//! Playback state machine: `Idle -> AwaitingStart -> Playing -> Done`.
//!
//! Each state is its own type so transitions can only happen in order:
//! [`Player`] (idle) is cued into [`Cued`] (awaiting start), which becomes
//! [`Playback`] (playing) once the operator confirms, and ends as
//! [`Finished`] (done).

use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use termvid_core::config::Config;
use termvid_core::error::{Error, IoContext, Result};
use termvid_core::store::{ArtifactRef, ArtifactStore};

use crate::render::render_frame;

pub const START_PROMPT: &str = "ENTER to play";

/// Time each frame stays on screen at `fps`.
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_millis(1000) / fps.max(1)
}

pub struct Player {
    store: ArtifactStore,
    interval: Duration,
}

impl Player {
    pub fn new(store: ArtifactStore, fps: u32) -> Self {
        Self {
            store,
            interval: frame_interval(fps),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ArtifactStore::new(&config.paths.output_dir), config.video.fps)
    }

    /// Find every rendered frame, in numeric index order.
    pub fn cue(self) -> Result<Cued> {
        let frames = self.store.discover()?;
        if frames.is_empty() {
            return Err(Error::NoFramesFound(self.store.root().to_path_buf()));
        }
        log::debug!("cued {} frame(s) from {}", frames.len(), self.store.root().display());
        Ok(Cued {
            store: self.store,
            interval: self.interval,
            frames,
        })
    }
}

pub struct Cued {
    store: ArtifactStore,
    interval: Duration,
    frames: Vec<ArtifactRef>,
}

impl Cued {
    pub fn total(&self) -> usize {
        self.frames.len()
    }

    /// Print the prompt and block until the operator sends a line.
    /// End of input counts as confirmation.
    pub fn wait_for_start<R: BufRead, W: Write>(self, input: &mut R, out: &mut W) -> Result<Playback> {
        writeln!(out, "{START_PROMPT}").io_context(|| "failed to write start prompt")?;
        out.flush().io_context(|| "failed to write start prompt")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .io_context(|| "failed to read start confirmation")?;
        if read == 0 {
            log::debug!("input closed, starting playback");
        }

        Ok(Playback {
            store: self.store,
            interval: self.interval,
            frames: self.frames,
            position: 0,
            buf: Vec::new(),
        })
    }
}

pub struct Playback {
    store: ArtifactStore,
    interval: Duration,
    frames: Vec<ArtifactRef>,
    position: usize,
    buf: Vec<u8>,
}

impl Playback {
    /// Frames shown so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total(&self) -> usize {
        self.frames.len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Draw the next frame. Returns `false` once every frame has been shown.
    pub fn show_next<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        let Some(frame) = self.frames.get(self.position) else {
            return Ok(false);
        };
        let content = self.store.read(frame)?;
        self.position += 1;

        render_frame(&content, self.position, self.frames.len(), &mut self.buf)
            .io_context(|| "failed to render frame")?;
        out.write_all(&self.buf).io_context(|| "failed to write frame")?;
        out.flush().io_context(|| "failed to write frame")?;
        Ok(true)
    }

    /// Show every frame in order, one interval each, then stop. No repeat.
    ///
    /// `interrupted` is polled before each frame; returning `true` ends
    /// playback early.
    pub fn run<W, F>(mut self, out: &mut W, mut interrupted: F) -> Result<Finished>
    where
        W: Write,
        F: FnMut() -> Result<bool>,
    {
        loop {
            if interrupted()? {
                log::debug!("playback interrupted at {}/{}", self.position, self.total());
                return Ok(self.finish(true));
            }
            if !self.show_next(out)? {
                return Ok(self.finish(false));
            }
            thread::sleep(self.interval);
        }
    }

    fn finish(self, interrupted: bool) -> Finished {
        Finished {
            shown: self.position,
            total: self.frames.len(),
            interrupted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Finished {
    pub shown: usize,
    pub total: usize,
    pub interrupted: bool,
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use termvid_core::cache::CacheLayout;
use termvid_core::config::Config;
use termvid_core::error::{IoContext, Result};
use termvid_core::index::FrameIndexAllocator;
use termvid_core::plan::{parse_duration, ChunkPlan};
use termvid_core::store::ArtifactStore;
use termvid_core::tools::{FrameConverter, VideoTools};

use crate::chunk::{ChunkOutput, ChunkProcessor};

#[derive(Clone, Debug)]
pub struct RenderReport {
    /// Duration of the preprocessed video as probed.
    pub duration_seconds: f64,
    /// In processing order.
    pub chunks: Vec<ChunkOutput>,
    /// Global indices handed out, equal to the number of artifacts written.
    pub frames: u64,
    pub elapsed: Duration,
}

impl RenderReport {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Drives a full render: preprocess, plan, then every chunk in ascending
/// order through the [`ChunkProcessor`].
///
/// Chunks are processed strictly one after another. The shared
/// [`FrameIndexAllocator`] depends on that to keep global indices in
/// `(chunk, frame)` order.
pub struct Renderer<'a, T, C> {
    config: &'a Config,
    tools: T,
    converter: C,
    cache: CacheLayout,
    store: ArtifactStore,
}

impl<'a, T: VideoTools, C: FrameConverter> Renderer<'a, T, C> {
    pub fn new(config: &'a Config, tools: T, converter: C) -> Self {
        Self {
            config,
            tools,
            converter,
            cache: CacheLayout::new(&config.paths.cache_dir),
            store: ArtifactStore::new(&config.paths.output_dir),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn cache(&self) -> &CacheLayout {
        &self.cache
    }

    /// Render `input` into the artifact store, replacing whatever a previous
    /// run left there. Stops at the first error; frames of chunks finished
    /// before it are kept and the cache is left for the next run to clear.
    pub fn render(&mut self, input: &Path) -> Result<RenderReport> {
        let started = Instant::now();

        self.store.clear()?;
        self.cache.clear()?;

        let source = self.preprocess(input)?;

        let duration = parse_duration(&self.tools.probe_duration(&source)?)?;
        let plan = ChunkPlan::new(duration, self.config.video.chunk_seconds)?;
        log::info!(
            "video duration: {}s, {} chunk(s) of {}s",
            plan.total_seconds(),
            plan.chunk_count(),
            plan.chunk_seconds()
        );

        let processor = ChunkProcessor::new(&self.tools, &self.cache, &self.store, self.config.video.fps);
        let mut allocator = FrameIndexAllocator::new();
        let mut chunks = Vec::with_capacity(plan.chunk_count() as usize);

        for chunk in plan.chunks() {
            let output = processor.process(&source, chunk, &mut self.converter, &mut allocator)?;
            log::info!(
                "chunk {}/{}: {} frame(s)",
                chunk.index + 1,
                plan.chunk_count(),
                output.frames
            );
            self.cache.release_chunk(chunk.index)?;
            chunks.push(output);
        }

        self.cache.clear()?;

        Ok(RenderReport {
            duration_seconds: duration,
            chunks,
            frames: allocator.allocated(),
            elapsed: started.elapsed(),
        })
    }

    /// Resize to the configured resolution, then strip letterbox bars.
    /// Returns the video the chunks are cut from.
    fn preprocess(&self, input: &Path) -> Result<PathBuf> {
        let dir = self.cache.preprocess_dir();
        fs::create_dir_all(&dir).io_context(|| format!("failed to create {}", dir.display()))?;

        let (width, height) = self.config.frame_size();
        let scaled = self.cache.scaled_video();
        log::info!("resizing {} to {width}x{height}", input.display());
        self.tools.resize(input, &scaled, width, height)?;

        match self.tools.detect_crop(&scaled, self.config.video.crop_probe_frames)? {
            Some(spec) => {
                log::info!("cropping black bars: {spec}");
                let cropped = self.cache.cropped_video();
                self.tools.crop(&scaled, &cropped, &spec)?;
                Ok(cropped)
            }
            None => {
                log::info!("no black bars detected");
                Ok(scaled)
            }
        }
    }
}

use std::fs;
use std::path::Path;

use termvid_core::cache::CacheLayout;
use termvid_core::error::{IoContext, Result};
use termvid_core::index::FrameIndexAllocator;
use termvid_core::plan::Chunk;
use termvid_core::store::{list_numbered, ArtifactStore, FrameArtifact};
use termvid_core::tools::{FrameConverter, VideoTools};

/// Global indices given to one chunk's frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkOutput {
    pub chunk: u64,
    pub frames: u64,
    /// `None` when sampling produced no frames.
    pub first_index: Option<u64>,
    pub last_index: Option<u64>,
}

/// Turns one chunk of the source into persisted frame artifacts:
/// extract the time window, sample it into images, convert each image.
pub struct ChunkProcessor<'a, T> {
    tools: &'a T,
    cache: &'a CacheLayout,
    store: &'a ArtifactStore,
    fps: u32,
}

impl<'a, T: VideoTools> ChunkProcessor<'a, T> {
    pub fn new(tools: &'a T, cache: &'a CacheLayout, store: &'a ArtifactStore, fps: u32) -> Self {
        Self {
            tools,
            cache,
            store,
            fps,
        }
    }

    /// Any failure aborts with the underlying error. Artifacts already written
    /// stay in the store.
    pub fn process<C: FrameConverter>(
        &self,
        source: &Path,
        chunk: Chunk,
        converter: &mut C,
        allocator: &mut FrameIndexAllocator,
    ) -> Result<ChunkOutput> {
        let video = self.cache.chunk_video(chunk.index);
        let frames_dir = self.cache.frames_dir(chunk.index);
        let chunks_dir = self.cache.chunks_dir();
        fs::create_dir_all(&chunks_dir)
            .io_context(|| format!("failed to create {}", chunks_dir.display()))?;
        fs::create_dir_all(&frames_dir)
            .io_context(|| format!("failed to create {}", frames_dir.display()))?;

        self.tools.extract(source, &video, chunk.start, chunk.length)?;
        self.tools.sample(&video, &frames_dir, self.fps)?;

        // Directory order is meaningless; raw frames are ordered by number.
        let raw_frames = list_numbered(&frames_dir)?;
        log::debug!("chunk {}: {} raw frames", chunk.index, raw_frames.len());

        let mut output = ChunkOutput {
            chunk: chunk.index,
            frames: 0,
            first_index: None,
            last_index: None,
        };
        for (local, image) in &raw_frames {
            let content = converter.convert(image)?;
            let index = allocator.next();
            self.store.write(&FrameArtifact { index, content })?;
            log::trace!("chunk {} frame {local} -> {index}", chunk.index);

            output.frames += 1;
            output.first_index.get_or_insert(index);
            output.last_index = Some(index);
        }
        Ok(output)
    }
}

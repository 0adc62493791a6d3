use std::fs;
use std::path::PathBuf;

use crate::error::{IoContext, Result};
use crate::store::clear_dir;

/// Scratch space of a render run.
///
/// ```text
/// <root>/preprocess/scaled.mp4
/// <root>/preprocess/cropped.mp4
/// <root>/chunks/<k>.mp4
/// <root>/frames/chunk-<k>/<n>.jpg
/// ```
#[derive(Clone, Debug)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn preprocess_dir(&self) -> PathBuf {
        self.root.join("preprocess")
    }

    pub fn scaled_video(&self) -> PathBuf {
        self.preprocess_dir().join("scaled.mp4")
    }

    pub fn cropped_video(&self) -> PathBuf {
        self.preprocess_dir().join("cropped.mp4")
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join("chunks")
    }

    pub fn chunk_video(&self, chunk: u64) -> PathBuf {
        self.chunks_dir().join(format!("{chunk}.mp4"))
    }

    pub fn frames_root(&self) -> PathBuf {
        self.root.join("frames")
    }

    pub fn frames_dir(&self, chunk: u64) -> PathBuf {
        self.frames_root().join(format!("chunk-{chunk}"))
    }

    /// Empty the three cache areas. Nothing is created.
    pub fn clear(&self) -> Result<()> {
        clear_dir(&self.chunks_dir())?;
        clear_dir(&self.frames_root())?;
        clear_dir(&self.preprocess_dir())
    }

    /// Drop one chunk's sub-video and raw frames.
    pub fn release_chunk(&self, chunk: u64) -> Result<()> {
        let video = self.chunk_video(chunk);
        if video.exists() {
            fs::remove_file(&video)
                .io_context(|| format!("failed to remove {}", video.display()))?;
        }
        let frames = self.frames_dir(chunk);
        if frames.exists() {
            fs::remove_dir_all(&frames)
                .io_context(|| format!("failed to remove {}", frames.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_paths() {
        let cache = CacheLayout::new("cache");
        assert_eq!(cache.chunk_video(3), PathBuf::from("cache/chunks/3.mp4"));
        assert_eq!(cache.frames_dir(3), PathBuf::from("cache/frames/chunk-3"));
        assert_eq!(cache.cropped_video(), PathBuf::from("cache/preprocess/cropped.mp4"));
    }

    #[test]
    fn release_chunk_leaves_other_chunks() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheLayout::new(tmp.path());
        fs::create_dir_all(cache.chunks_dir()).unwrap();
        for k in 0..2 {
            fs::write(cache.chunk_video(k), b"video").unwrap();
            fs::create_dir_all(cache.frames_dir(k)).unwrap();
            fs::write(cache.frames_dir(k).join("0.jpg"), b"jpg").unwrap();
        }

        cache.release_chunk(0).unwrap();

        assert!(!cache.chunk_video(0).exists());
        assert!(!cache.frames_dir(0).exists());
        assert!(cache.chunk_video(1).exists());
        assert!(cache.frames_dir(1).join("0.jpg").exists());

        // Releasing twice is harmless.
        cache.release_chunk(0).unwrap();
    }
}

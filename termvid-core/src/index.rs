/// Hands out global frame indices, starting at 1.
///
/// This is the only writer of global indices. It must be driven sequentially:
/// chunks in ascending index order, frames within a chunk in ascending local
/// order. That discipline alone is what makes indices follow
/// `(chunk, local frame)` order. Converting chunks in parallel would need a
/// contiguous range reserved per chunk up front, or a re-sequencing pass keyed
/// by `(chunk, local frame)` before committing to the store; never a shared
/// counter hit out of chunk order.
#[derive(Debug)]
pub struct FrameIndexAllocator {
    next: u64,
}

impl FrameIndexAllocator {
    pub const FIRST: u64 = 1;

    pub fn new() -> Self {
        Self { next: Self::FIRST }
    }

    /// Returns the current index and advances.
    pub fn next(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Number of indices handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next - Self::FIRST
    }
}

impl Default for FrameIndexAllocator {
    fn default() -> Self {
        Self::new()
    }
}

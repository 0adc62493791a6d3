pub mod engine;
pub mod render;
pub mod terminal;

pub use engine::{frame_interval, Cued, Finished, Playback, Player, START_PROMPT};
pub use terminal::TerminalSession;

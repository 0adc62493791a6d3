pub mod ascii;
pub mod chunk;
pub mod ffmpeg;
pub mod pipeline;
mod resize;

pub use ascii::AsciiConverter;
pub use ffmpeg::FfmpegTools;
pub use pipeline::{RenderReport, Renderer};

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod plan;
pub mod store;
pub mod tools;

pub use error::{Error, Result};

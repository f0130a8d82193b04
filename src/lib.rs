pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod reaction;
pub mod report;
pub mod youtube;

pub use error::{Error, Result};

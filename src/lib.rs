pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod request;
pub mod storage;
pub mod viewer;

pub use error::{Error, Result};

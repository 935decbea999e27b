pub mod api;
pub mod archive;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod logger;
pub mod models;
pub mod utils;

pub use error::{MgdlError, MgdlResult};

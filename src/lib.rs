pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod term;

pub use error::{Result, TermError};

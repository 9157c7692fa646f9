//! Core MOBI reader module

pub mod codec;
pub mod format;
pub mod reader;
pub mod types;
mod utils;

pub use format::pdb::Pdb;
pub use reader::{Mobi, MobiOptions};
pub use types::error::{MobiError, PalmDocError, Result, TrailerError};

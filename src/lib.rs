pub mod bitstream;
pub mod compression;
pub mod error;

pub use compression::{Compression, HuffProcessor};
pub use error::{Error, Result};

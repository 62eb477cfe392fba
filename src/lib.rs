pub mod config;
pub mod error;
pub mod fasta;
pub mod source;
pub mod stream;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use stream::{BufferedSeekableStream, ReadStatus};

use crate::source::OpenOptions;
use crate::stream::DEFAULT_BUFFER_SIZE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "seekbuf")]
#[command(about = "Read byte ranges and sequence tiles through a buffered seekable stream")]
pub struct Config {
    /// Stream buffer (window) size in bytes
    #[arg(long, env = "SEEKBUF_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// AWS region for s3:// sources
    #[arg(long, env = "SEEKBUF_S3_REGION")]
    pub s3_region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[arg(long, env = "SEEKBUF_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Print I/O statistics as JSON to stderr on exit
    #[arg(long)]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Copy a byte range of a source to stdout
    Read {
        /// Local path, http(s):// URL or s3://bucket/key
        source: String,

        /// First byte to read
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes to read (to the end of the source if omitted)
        #[arg(long)]
        length: Option<u64>,

        /// Print a hex dump instead of raw bytes
        #[arg(long)]
        hex: bool,
    },

    /// Print FASTA records for regions of an indexed FASTA
    Faidx {
        /// Local path, http(s):// URL or s3://bucket/key of the FASTA file
        source: String,

        /// FAI index (defaults to <source>.fai for local files)
        #[arg(long)]
        index: Option<PathBuf>,

        /// Bases per output line
        #[arg(long, default_value_t = 60)]
        line_width: usize,

        /// Regions as name, name:start or name:start-end (1-based, inclusive)
        #[arg(required = true)]
        regions: Vec<String>,
    },
}

impl Config {
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            s3_region: self.s3_region.clone(),
            s3_endpoint: self.s3_endpoint.clone(),
        }
    }
}

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seekbuf::{
    BufferedSeekableStream, Config, ReadStatus,
    config::Command,
    fasta::IndexedFasta,
    source::{self, Location, SeekableSource},
};

type Stream = BufferedSeekableStream<Box<dyn SeekableSource>>;

// Remote sources drive their own runtime, so main stays synchronous
fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let stats = match &config.command {
        Command::Read {
            source,
            offset,
            length,
            hex,
        } => {
            let mut stream = open_stream(&config, source)?;
            copy_range(&mut stream, *offset, *length, *hex)?;
            finish(stream)?
        }
        Command::Faidx {
            source,
            index,
            line_width,
            regions,
        } => {
            let location: Location = source.parse()?;
            let index_path = match (index, &location) {
                (Some(path), _) => path.clone(),
                (None, Location::File(path)) => PathBuf::from(format!("{}.fai", path.display())),
                (None, _) => anyhow::bail!("--index is required for remote FASTA sources"),
            };

            let stream = open_stream(&config, source)?;
            let mut fasta = IndexedFasta::open(stream, &index_path)?;
            write_regions(&mut fasta, regions, *line_width)?;
            finish(fasta.into_stream())?
        }
    };

    if config.stats {
        eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}

fn open_stream(config: &Config, source: &str) -> anyhow::Result<Stream> {
    let location: Location = source.parse()?;
    let inner = source::open(&location, &config.open_options())
        .with_context(|| format!("failed to open {}", location))?;

    tracing::info!("Reading {} with a {} byte buffer", location, config.buffer_size);

    Ok(BufferedSeekableStream::new(inner, config.buffer_size)?)
}

fn finish(mut stream: Stream) -> anyhow::Result<seekbuf::stream::IoStats> {
    let stats = stream.stats();
    stream.close()?;
    Ok(stats)
}

fn copy_range(stream: &mut Stream, offset: u64, length: Option<u64>, hex: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    stream.seek(offset)?;
    let mut remaining = length.unwrap_or(u64::MAX);
    let mut chunk = vec![0u8; stream.capacity()];
    let mut position = offset;

    while remaining > 0 {
        let want = chunk.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let status = stream.read_fully(&mut chunk[..want])?;
        let filled = status.filled();

        if hex {
            write_hex(&mut out, position, &chunk[..filled])?;
        } else {
            out.write_all(&chunk[..filled])?;
        }

        position += filled as u64;
        remaining -= filled as u64;

        if !matches!(status, ReadStatus::Complete(_)) {
            if length.is_some() && remaining > 0 {
                tracing::warn!("source ended at {}, {} bytes short", position, remaining);
            }
            break;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_hex(out: &mut impl Write, start: u64, bytes: &[u8]) -> io::Result<()> {
    for (i, line) in bytes.chunks(16).enumerate() {
        write!(out, "{:08x}  ", start + (i * 16) as u64)?;
        for byte in line {
            write!(out, "{:02x} ", byte)?;
        }
        for _ in line.len()..16 {
            write!(out, "   ")?;
        }
        let text: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(out, " |{}|", text)?;
    }
    Ok(())
}

fn write_regions(
    fasta: &mut IndexedFasta<Box<dyn SeekableSource>>,
    regions: &[String],
    line_width: usize,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for region in regions {
        let region = fasta.region(region)?;
        let bases = fasta
            .sequence(&region)
            .with_context(|| format!("failed to read {}", region))?;

        writeln!(out, ">{}", region)?;
        for line in bases.chunks(line_width.max(1)) {
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
    }

    out.flush()?;
    Ok(())
}

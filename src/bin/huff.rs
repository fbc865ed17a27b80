use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use huffcodec::bitstream::{BitInputStream, BitOutputStream};
use huffcodec::compression::{CodecStats, HuffProcessor};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Tree-header Huffman file compressor.
#[derive(Parser, Debug)]
#[command(author, version, about = "Huffman file compression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Raise the debug level; repeat for more detail (-vvvv logs every code).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress INPUT into OUTPUT.
    Compress { input: PathBuf, output: PathBuf },
    /// Restore INPUT, produced by `compress`, into OUTPUT.
    Decompress { input: PathBuf, output: PathBuf },
}

fn run(processor: &HuffProcessor, command: &Command) -> anyhow::Result<CodecStats> {
    let (input, output) = match command {
        Command::Compress { input, output } | Command::Decompress { input, output } => {
            (input, output)
        }
    };
    let source = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let sink = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut bits_in = BitInputStream::new(BufReader::new(source));
    let mut bits_out = BitOutputStream::new(BufWriter::new(sink));

    let stats = match command {
        Command::Compress { .. } => processor.compress_stream(&mut bits_in, &mut bits_out),
        Command::Decompress { .. } => processor.decompress_stream(&mut bits_in, &mut bits_out),
    }
    .with_context(|| format!("processing {}", input.display()))?;
    Ok(stats)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let processor = HuffProcessor::with_debug(u32::from(cli.verbose));

    let stats = run(&processor, &cli.command)?;
    log::info!(
        "read {} bits, wrote {} bits",
        stats.bits_read,
        stats.bits_written
    );
    Ok(())
}

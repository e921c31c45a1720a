// Command-line front end for oxiflate.
//
// Two working subcommands (`compress`, `decompress`) over a file or a byte
// window of one, plus `config` for build details. Output goes to stdout
// unless an output path is given.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::debug;

use crate::codec::Framing;
use crate::io::{FileError, compress_to, decompress_to};
use crate::stream::{DEFLATE_BLOCK_SIZE, FileWindow, MIN_BLOCK_SIZE, StreamOptions};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DEFAULT_LEVEL: u32 = 6;
const MAX_BLOCK_SIZE: u64 = 1 << 26; // 64 MiB

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Streaming DEFLATE compressor with gzip and zlib framing.
#[derive(Parser, Debug)]
#[command(
    name = "oxiflate",
    version,
    about = "Streaming gzip/zlib compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file or a byte range of one.
    Compress(CompressArgs),
    /// Decompress a gzip or zlib stream.
    Decompress(DecompressArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct StreamArgs {
    /// Use gzip framing instead of zlib.
    #[arg(long, short = 'z')]
    gzip: bool,

    /// Staging block size (supports K/M/G suffix).
    #[arg(
        long = "block-size",
        value_parser = parse_byte_size,
        default_value_t = DEFLATE_BLOCK_SIZE as u64
    )]
    block_size: u64,

    /// Start offset within the input file (default: 0).
    #[arg(long, value_parser = parse_byte_size)]
    offset: Option<u64>,

    /// Number of input bytes to process (default: to end of file).
    #[arg(long, value_parser = parse_byte_size)]
    length: Option<u64>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Compression level (0-9).
    #[arg(
        long,
        short = 'l',
        value_parser = clap::value_parser!(u32).range(0..=9),
        default_value_t = DEFAULT_LEVEL
    )]
    level: u32,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    #[command(flatten)]
    stream: StreamArgs,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    framing: Framing,
    level: u32,
    block_size: u64,
    window: FileWindow,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

impl Options {
    fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            block_size: self.block_size as usize,
            level: self.level,
        }
    }
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        framing: Framing::Zlib,
        level: DEFAULT_LEVEL,
        block_size: DEFLATE_BLOCK_SIZE as u64,
        window: FileWindow::whole(),
        input_file: None,
        output_file: None,
    };

    let (command, level, stream) = match cli.command {
        Cmd::Compress(args) => (Command::Compress, args.level, args.stream),
        Cmd::Decompress(args) => (Command::Decompress, DEFAULT_LEVEL, args.stream),
        Cmd::Config => return base,
    };

    Options {
        command,
        use_stdout: stream.stdout,
        framing: Framing::from_gzip(stream.gzip),
        level,
        block_size: stream.block_size,
        window: FileWindow {
            offset: Some(stream.offset.unwrap_or(0)),
            len: stream.length,
        },
        input_file: Some(stream.input),
        output_file: stream.output,
        ..base
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxiflate".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let stream = opts.stream_options();
        assert!(stream.level <= 9);
        assert!(opts.verbose <= 2);
        if opts.command == Command::Config {
            assert!(opts.input_file.is_none());
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxiflate version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");
    eprintln!("DEFLATE_BLOCK_SIZE={DEFLATE_BLOCK_SIZE}");
    eprintln!("MIN_BLOCK_SIZE={MIN_BLOCK_SIZE}");
    eprintln!("MAX_BLOCK_SIZE={MAX_BLOCK_SIZE}");
    eprintln!("WINDOW_BITS={}", crate::codec::WINDOW_BITS);
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Output selection
// ---------------------------------------------------------------------------

fn open_output(opts: &Options) -> Result<Box<dyn Write>, String> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(io::stdout().lock()) as Box<dyn Write>),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            File::create(path)
                .map(|f| Box::new(f) as Box<dyn Write>)
                .map_err(|e| format!("output file: {}: {e}", path.display()))
        }
    }
}

fn report_error(what: &str, err: &FileError) -> i32 {
    eprintln!("oxiflate: {what} error: {err}");
    1
}

fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn framing_name(framing: Framing) -> &'static str {
    if framing.is_gzip() { "gzip" } else { "zlib" }
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options, input: &Path) -> i32 {
    let writer = match open_output(opts) {
        Ok(w) => w,
        Err(msg) => {
            eprintln!("oxiflate: {msg}");
            return 1;
        }
    };

    let stats = match compress_to(
        input,
        opts.window,
        opts.framing,
        opts.stream_options(),
        writer,
    ) {
        Ok(s) => s,
        Err(e) => return report_error("compress", &e),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxiflate: compress: input size: {}, output size: {}, chunks: {}",
            stats.input_size, stats.output_size, stats.chunks
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "compress",
            "framing": framing_name(opts.framing),
            "level": opts.level,
            "block_size": opts.block_size,
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "chunks": stats.chunks,
            "sha256": stats.sha256.as_ref().map(hex),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options, input: &Path) -> i32 {
    let writer = match open_output(opts) {
        Ok(w) => w,
        Err(msg) => {
            eprintln!("oxiflate: {msg}");
            return 1;
        }
    };

    let stats = match decompress_to(
        input,
        opts.window,
        opts.framing,
        opts.stream_options(),
        writer,
    ) {
        Ok(s) => s,
        Err(e) => return report_error("decompress", &e),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxiflate: decompress: input size: {}, output size: {}, chunks: {}",
            stats.input_size, stats.output_size, stats.chunks
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "framing": framing_name(opts.framing),
            "block_size": opts.block_size,
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "chunks": stats.chunks,
            "sha256": stats.sha256.as_ref().map(hex),
        });
        eprintln!("{json:#}");
    }

    0
}

/// Default log filter; `RUST_LOG` still wins when set.
fn log_filter(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(opts.quiet, opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();
    debug!("resolved options: {opts:?}");

    if opts.block_size > MAX_BLOCK_SIZE {
        eprintln!(
            "oxiflate: --block-size: {} exceeds max {MAX_BLOCK_SIZE}",
            opts.block_size
        );
        process::exit(1);
    }

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
        && !opts.quiet
    {
        eprintln!(
            "oxiflate: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let exit_code = match (opts.command, opts.input_file.as_deref()) {
        (Command::Compress, Some(input)) => cmd_compress(&opts, input),
        (Command::Decompress, Some(input)) => cmd_decompress(&opts, input),
        (Command::Config, _) => cmd_config(),
        (_, None) => {
            eprintln!("oxiflate: an input file is required");
            1
        }
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

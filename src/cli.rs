// Command-line front end for Oxidiff.
//
// Subcommands:
//   ops     stream the copy/add edit script between two files
//   hex     print the hex-dump line projection of the diff
//   config  print defaults and enabled features

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::cancel::CancelToken;
use crate::engine::BinaryDiffer;
use crate::error::{DiffError, Result};
use crate::footprint::config::{
    DEFAULT_BYTES_PER_LINE, DEFAULT_FOOTPRINT_LENGTH, DEFAULT_TABLE_SIZE, MAX_FOOTPRINT_LENGTH,
};
use crate::footprint::DiffOptions;
use crate::io::{open_source, read_all};
use crate::lines::{LINE_PREFIX_LENGTH, LineKind, LineProjector, content};
use crate::script::{OpWriter, ScriptSummary};
use crate::source::{ByteSource, MemorySource};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Binary file differ with hex-dump output.
#[derive(Parser, Debug)]
#[command(
    name = "oxidiff",
    version,
    about = "Linear-time binary differ",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

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
    /// Print the edit script that turns BASE into VERSION.
    Ops(OpsArgs),
    /// Print both files as hex-dump lines, marking changed lines.
    Hex(HexArgs),
    /// Print defaults and enabled features.
    Config,
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// Bytes hashed per footprint (1-31).
    #[arg(long = "footprint-length", value_parser = clap::value_parser!(u32).range(1..=MAX_FOOTPRINT_LENGTH as i64), default_value_t = DEFAULT_FOOTPRINT_LENGTH)]
    footprint_length: u32,

    /// Footprint table bucket count (a prime spreads hashes best).
    #[arg(long = "table-size", value_parser = clap::value_parser!(u64).range(1..), default_value_t = DEFAULT_TABLE_SIZE as u64)]
    table_size: u64,

    /// Keep the most recent offset per footprint instead of the first.
    #[arg(long = "favor-last-match")]
    favor_last_match: bool,
}

#[derive(Args, Debug)]
struct OpsArgs {
    /// Base file ("-" for stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    base: PathBuf,

    /// Version file ("-" for stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    version: PathBuf,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Base,
    Version,
    Both,
}

#[derive(Args, Debug)]
struct HexArgs {
    /// Base file ("-" for stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    base: PathBuf,

    /// Version file ("-" for stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    version: PathBuf,

    /// Bytes dumped per line.
    #[arg(long = "bytes-per-line", value_parser = clap::value_parser!(u64).range(1..=4096), default_value_t = DEFAULT_BYTES_PER_LINE as u64)]
    bytes_per_line: u64,

    /// Which side to print.
    #[arg(long, value_enum, default_value_t = SideArg::Both)]
    side: SideArg,

    /// Omit the offset column.
    #[arg(long = "no-offsets")]
    no_offsets: bool,

    #[command(flatten)]
    tuning: TuningArgs,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

struct Globals {
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

fn build_differ(tuning: &TuningArgs) -> Result<BinaryDiffer> {
    let opts = DiffOptions::default()
        .with_footprint_length(tuning.footprint_length)?
        .with_table_size(usize::try_from(tuning.table_size).unwrap_or(usize::MAX))?
        .with_favor_last_match(tuning.favor_last_match);
    Ok(BinaryDiffer::new(opts))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Open a file as a seekable source; stdin is buffered into memory first.
fn open_input(path: &Path) -> Result<Box<dyn ByteSource>> {
    if is_stdin(path) {
        return Ok(Box::new(MemorySource::new(read_all(io::stdin().lock())?)));
    }
    open_source(path)
        .map(|s| Box::new(s) as Box<dyn ByteSource>)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())).into())
}

fn open_pair(base: &Path, version: &Path) -> Result<(Box<dyn ByteSource>, Box<dyn ByteSource>)> {
    if is_stdin(base) && is_stdin(version) {
        return Err(DiffError::InvalidInput(
            "only one of BASE and VERSION may be read from stdin".into(),
        ));
    }
    Ok((open_input(base)?, open_input(version)?))
}

fn report(
    g: &Globals,
    command: &str,
    differ: &BinaryDiffer,
    base_size: u64,
    version_size: u64,
    summary: &ScriptSummary,
) {
    if g.verbose > 0 && !g.quiet {
        eprintln!(
            "oxidiff: base size: {base_size}, version size: {version_size}, \
             copies: {} ({} bytes), adds: {} ({} bytes)",
            summary.copies, summary.copied_bytes, summary.adds, summary.added_bytes
        );
    }

    if g.json_output {
        let json = serde_json::json!({
            "command": command,
            "base_size": base_size,
            "version_size": version_size,
            "copies": summary.copies,
            "copied_bytes": summary.copied_bytes,
            "adds": summary.adds,
            "added_bytes": summary.added_bytes,
            "footprint_length": differ.footprint_length(),
            "table_size": differ.table_size(),
            "favor_last_match": differ.favor_last_match(),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => eprintln!("oxidiff: json error: {e}"),
        }
    }
}

/// Broken pipes (e.g. `oxidiff hex a b | head`) end output quietly.
fn exit_code(command: &str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(DiffError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => 0,
        Err(e) => {
            eprintln!("oxidiff: {command}: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// ops command
// ---------------------------------------------------------------------------

fn cmd_ops(g: &Globals, args: &OpsArgs) -> i32 {
    exit_code("ops", run_ops(g, args))
}

fn run_ops(g: &Globals, args: &OpsArgs) -> Result<()> {
    let differ = build_differ(&args.tuning)?;
    let (mut base, mut version) = open_pair(&args.base, &args.version)?;
    let (base_size, version_size) = (base.len(), version.len());

    let out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
    let mut writer = OpWriter::new(out);
    differ.execute_into(&mut *base, &mut *version, &CancelToken::new(), &mut writer)?;
    let (_, summary) = writer.finish()?;

    report(g, "ops", &differ, base_size, version_size, &summary);
    Ok(())
}

// ---------------------------------------------------------------------------
// hex command
// ---------------------------------------------------------------------------

fn cmd_hex(g: &Globals, args: &HexArgs) -> i32 {
    exit_code("hex", run_hex(g, args))
}

fn run_hex(g: &Globals, args: &HexArgs) -> Result<()> {
    let differ = build_differ(&args.tuning)?;
    let projector = LineProjector::new(args.bytes_per_line as usize)?;
    let (mut base, mut version) = open_pair(&args.base, &args.version)?;
    let (base_size, version_size) = (base.len(), version.len());

    let script = differ.execute(&mut *base, &mut *version, &CancelToken::new())?;
    let lines = projector.build(&mut *base, script.ops())?;

    let mut out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
    let listing: Vec<(LineKind, &str)> = match args.side {
        SideArg::Both => lines.interleaved(),
        SideArg::Base => lines
            .base_kinds
            .iter()
            .copied()
            .zip(lines.base_lines.iter().map(String::as_str))
            .collect(),
        SideArg::Version => lines
            .version_kinds
            .iter()
            .copied()
            .zip(lines.version_lines.iter().map(String::as_str))
            .collect(),
    };
    for (kind, line) in listing {
        let marker = match kind {
            LineKind::Deleted => '-',
            LineKind::Inserted => '+',
            LineKind::Shared => ' ',
        };
        let text = if args.no_offsets {
            content(line)
        } else {
            line
        };
        writeln!(out, "{marker} {text}")?;
    }
    out.flush()?;

    report(g, "hex", &differ, base_size, version_size, &script.summary());
    Ok(())
}

// ---------------------------------------------------------------------------
// config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxidiff version {version} (Rust), Copyright (C) oxidiff contributors");

    let file_io = cfg!(feature = "file-io") as u8;
    eprintln!("FILE_IO={file_io}");
    eprintln!("DEFAULT_FOOTPRINT_LENGTH={DEFAULT_FOOTPRINT_LENGTH}");
    eprintln!("MAX_FOOTPRINT_LENGTH={MAX_FOOTPRINT_LENGTH}");
    eprintln!("DEFAULT_TABLE_SIZE={DEFAULT_TABLE_SIZE}");
    eprintln!("DEFAULT_BYTES_PER_LINE={DEFAULT_BYTES_PER_LINE}");
    eprintln!("LINE_PREFIX_LENGTH={LINE_PREFIX_LENGTH}");
    eprintln!("READ_WINDOW={}", crate::source::WINDOW_SIZE);

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let g = Globals {
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    };

    let code = match &cli.command {
        Cmd::Ops(args) => cmd_ops(&g, args),
        Cmd::Hex(args) => cmd_hex(&g, args),
        Cmd::Config => cmd_config(),
    };

    process::exit(code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let argv: Vec<String> = std::iter::once("oxidiff".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        Cli::try_parse_from(argv).expect("cli parse failed")
    }

    fn try_parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("oxidiff").chain(args.iter().copied()))
    }

    #[test]
    fn ops_defaults() {
        let cli = parse(&["ops", "a.bin", "b.bin"]);
        let Cmd::Ops(args) = cli.command else {
            panic!("expected ops");
        };
        assert_eq!(args.base, PathBuf::from("a.bin"));
        assert_eq!(args.tuning.footprint_length, DEFAULT_FOOTPRINT_LENGTH);
        assert_eq!(args.tuning.table_size, DEFAULT_TABLE_SIZE as u64);
        assert!(!args.tuning.favor_last_match);
    }

    #[test]
    fn hex_options() {
        let cli = parse(&[
            "-v",
            "hex",
            "a",
            "b",
            "--bytes-per-line",
            "8",
            "--side",
            "version",
            "--footprint-length",
            "4",
            "--favor-last-match",
        ]);
        assert_eq!(cli.verbose, 1);
        let Cmd::Hex(args) = cli.command else {
            panic!("expected hex");
        };
        assert_eq!(args.bytes_per_line, 8);
        assert_eq!(args.side, SideArg::Version);
        let differ = build_differ(&args.tuning).unwrap();
        assert_eq!(differ.footprint_length(), 4);
        assert!(differ.favor_last_match());
    }

    #[test]
    fn footprint_length_range_is_enforced() {
        assert!(try_parse(&["ops", "a", "b", "--footprint-length", "0"]).is_err());
        assert!(try_parse(&["ops", "a", "b", "--footprint-length", "32"]).is_err());
        assert!(try_parse(&["ops", "a", "b", "--footprint-length", "31"]).is_ok());
    }

    #[test]
    fn zero_table_size_is_rejected() {
        assert!(try_parse(&["ops", "a", "b", "--table-size", "0"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(try_parse(&["-q", "-v", "config"]).is_err());
    }

    #[test]
    fn both_stdin_is_rejected() {
        let err = open_pair(Path::new("-"), Path::new("-")).err().unwrap();
        assert!(matches!(err, DiffError::InvalidInput(_)));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = open_input(Path::new("/nonexistent/oxidiff-input.bin")).err().unwrap();
        assert!(err.to_string().contains("oxidiff-input.bin"), "{err}");
    }
}

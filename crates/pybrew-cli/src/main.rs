mod generate;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use std::io::Write;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pybrew")]
#[command(version)]
#[command(about = "A utility to generate Homebrew formula templates for Python packages")]
struct Args {
    #[command(flatten)]
    generate: generate::GenerateArgs,

    /// Display verbose logging information
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Install the global logger.
///
/// Verbose output carries timestamp, target and level columns separated by
/// tabs; otherwise only the message is printed.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();

    if verbose {
        builder.filter_level(LevelFilter::Debug).format(|buf, record| {
            writeln!(
                buf,
                "{}\t{}\t{}\t{}",
                buf.timestamp_millis(),
                record.target(),
                record.level(),
                record.args()
            )
        });
    } else {
        builder
            .filter_level(LevelFilter::Info)
            .format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    builder.init();
}

fn run() -> Result<i32> {
    let args = Args::parse();
    init_logging(args.verbose);

    generate::execute(args.generate)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use target_bearing_core::FrameSize;

mod commands;

use commands::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "target-bearing",
    version,
    about = "Locate a coloured target in still frames and report its bearing"
)]
struct Cli {
    /// Log level for stderr output (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    /// Emit `tracing` events and spans on stderr as JSON instead of plain text.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one frame and print its report as JSON.
    Detect {
        /// PNG/JPEG frame, or a raw RGBA dump when `--raw-size` is given.
        #[arg(long)]
        input: PathBuf,
        /// Pipeline params (JSON); missing fields take defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where to write the corrected display frame (PNG).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Dimensions of a raw RGBA input, as WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_frame_size)]
        raw_size: Option<FrameSize>,
    },
    /// Run every image in a directory, in name order, through one pipeline.
    Replay {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory for the corrected display frames.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the default pipeline params as JSON.
    DefaultConfig,
}

fn parse_frame_size(s: &str) -> Result<FrameSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok(FrameSize::new(width, height))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    if let Err(e) = target_bearing_core::init_with_level(cli.log_level) {
        eprintln!("warning: logger already installed: {e}");
    }
    #[cfg(feature = "tracing")]
    target_bearing_core::init_tracing(cli.log_level, cli.json_trace);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Detect {
            input,
            config,
            output,
            raw_size,
        } => commands::detect(&input, config.as_deref(), output.as_deref(), raw_size),
        Command::Replay {
            dir,
            config,
            output_dir,
        } => commands::replay(&dir, config.as_deref(), output_dir.as_deref()),
        Command::DefaultConfig => commands::default_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_parses_both_separators() {
        assert_eq!(parse_frame_size("640x480"), Ok(FrameSize::new(640, 480)));
        assert_eq!(parse_frame_size("32X16"), Ok(FrameSize::new(32, 16)));
        assert!(parse_frame_size("640").is_err());
        assert!(parse_frame_size("ax2").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

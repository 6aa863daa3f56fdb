//! `jacl`: play JACL games in a terminal and inspect game files.

mod commands;
mod terminal;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(
    name = "jacl",
    about = "Interpreter for JACL interactive fiction",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    play: PlayArgs,
}

/// Options for playing a game.
#[derive(Args)]
struct PlayArgs {
    /// Game file to play (.j2)
    game: Option<PathBuf>,

    #[command(flatten)]
    source: SourceArgs,

    /// Seed the random number generator for a repeatable game
    #[arg(long)]
    seed: Option<u64>,
}

/// How an unprocessed game file is preprocessed before use.
#[derive(Args, Clone, Copy)]
struct SourceArgs {
    /// Write preprocessed output without obfuscation
    #[arg(long)]
    noencrypt: bool,

    /// Drop debug statements while preprocessing
    #[arg(long)]
    release: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a game file and report diagnostics
    Check {
        /// Game file (.j2)
        game: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the objects and locations a game declares
    Objects {
        /// Game file (.j2)
        game: PathBuf,

        /// Only list locations
        #[arg(short, long)]
        locations: bool,
    },

    /// Export the loaded world as JSON
    Export {
        /// Game file (.j2)
        game: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand includes and strip a game file for distribution
    Preprocess {
        /// Game file to read
        input: PathBuf,

        /// Output file (default: the input with a `.processed` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory searched for included files
        #[arg(short = 'I', long)]
        include_dir: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse_from(single_dash_flags(std::env::args_os()));

    let result = match cli.command {
        Some(Commands::Check { game, source }) => commands::check::run(&game, source.into()),
        Some(Commands::Objects { game, locations }) => commands::objects::run(&game, locations),
        Some(Commands::Export { game, output }) => commands::export::run(&game, output.as_deref()),
        Some(Commands::Preprocess {
            input,
            output,
            include_dir,
            source,
        }) => commands::preprocess::run(&input, output.as_deref(), include_dir, source.into()),
        None => match cli.play.game {
            Some(game) => commands::play::run(&game, cli.play.source.into(), cli.play.seed),
            None => Err(commands::CliError::Usage(
                "no game file given; try `jacl --help`".into(),
            )),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(e.exit_code());
    }
}

/// Accept `-noencrypt` and `-release` as spellings of the long flags.
fn single_dash_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-noencrypt") => OsString::from("--noencrypt"),
            Some("-release") => OsString::from("--release"),
            _ => arg,
        })
        .collect()
}

impl From<SourceArgs> for jacl_dsl::PreprocessConfig {
    fn from(args: SourceArgs) -> Self {
        jacl_dsl::PreprocessConfig::default()
            .with_encrypt(!args.noencrypt)
            .with_release(args.release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_dash_source_flags() {
        let args = ["jacl", "preprocess", "-noencrypt", "-release", "game.j2"].map(OsString::from);
        let cli = Cli::parse_from(single_dash_flags(args));
        let Some(Commands::Preprocess { source, input, .. }) = cli.command else {
            panic!("expected the preprocess command");
        };
        assert!(source.noencrypt);
        assert!(source.release);
        assert_eq!(input, PathBuf::from("game.j2"));
    }

    #[test]
    fn other_arguments_pass_through() {
        let args = ["jacl", "-n", "--seed", "-release.j2"].map(OsString::from);
        assert_eq!(single_dash_flags(args.clone()), args.to_vec());
    }
}

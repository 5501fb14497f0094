//! CLI module for LectureMind.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// LectureMind - study notes from lecture videos
///
/// Fetches a YouTube video's captions, asks a language model for structured
/// notes and a practice quiz, and serves the result as a web page.
#[derive(Parser, Debug)]
#[command(name = "lecturemind")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate notes and a quiz for one video and print them
    Process {
        /// YouTube video URL
        url: String,

        /// Print the full lecture record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["lecturemind", "-vv", "serve", "--port", "8080"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_process() {
        let cli = Cli::parse_from([
            "lecturemind",
            "process",
            "https://youtu.be/dQw4w9WgXcQ",
            "--json",
            "--config",
            "/tmp/lm.toml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/lm.toml"));
        assert!(matches!(cli.command, Commands::Process { json: true, .. }));
    }
}

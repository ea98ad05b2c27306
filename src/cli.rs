//! Command-line interface for katha
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parallel chunked transcription for long audio recordings
#[derive(Parser, Debug)]
#[command(name = "katha", version, about = "Parallel chunked transcription for long audio recordings")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe an audio file and print the transcript
    Transcribe {
        /// Audio file to transcribe (wav, or anything ffmpeg decodes)
        input: PathBuf,

        /// Also write the transcript to this path as UTF-8 text
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Window size per chunk (default: 30s). Examples: 30s, 45s, 90000
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_ms)]
        chunk_length: Option<u64>,

        /// Overlap between consecutive windows (default: 500ms)
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_ms)]
        overlap: Option<u64>,

        /// Number of concurrent transcription workers (default: 4)
        #[arg(long, short = 'w', value_name = "N")]
        workers: Option<usize>,
    },

    /// Run the transcription service for the web front end
    Serve {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/katha.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,

        /// Directory where transcripts are persisted (default: outputs)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Refresh the local mirror of the remote dataset
    FetchDataset {
        /// Source URL (default: [dataset].url from the config file)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Local cache file (default: [dataset].cache_file)
        #[arg(long, value_name = "PATH")]
        cache: Option<PathBuf>,

        /// Freshness window (default: 1h). Examples: 30m, 1h, 86400
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_secs)]
        max_age: Option<u64>,
    },

    /// Inspect configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration as TOML
    Show,
}

/// Parse a duration string into milliseconds.
///
/// Bare numbers are milliseconds; otherwise any format accepted by
/// `humantime` works (`30s`, `500ms`, `1h30m`).
fn parse_duration_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

/// Parse a duration string into seconds. Bare numbers are seconds.
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_ms_bare_number() {
        assert_eq!(parse_duration_ms("30000"), Ok(30_000));
    }

    #[test]
    fn parse_duration_ms_with_units() {
        assert_eq!(parse_duration_ms("30s"), Ok(30_000));
        assert_eq!(parse_duration_ms("500ms"), Ok(500));
        assert_eq!(parse_duration_ms("1m30s"), Ok(90_000));
    }

    #[test]
    fn parse_duration_ms_rejects_garbage() {
        assert!(parse_duration_ms("soon").is_err());
    }

    #[test]
    fn parse_duration_secs_bare_and_units() {
        assert_eq!(parse_duration_secs("3600"), Ok(3600));
        assert_eq!(parse_duration_secs("1h"), Ok(3600));
    }

    #[test]
    fn cli_parses_transcribe_with_overrides() {
        let cli = Cli::try_parse_from([
            "katha",
            "transcribe",
            "talk.mp3",
            "--chunk-length",
            "20s",
            "--overlap",
            "250ms",
            "-w",
            "6",
            "-o",
            "out.txt",
        ])
        .unwrap();

        let Commands::Transcribe {
            input,
            output,
            chunk_length,
            overlap,
            workers,
        } = cli.command
        else {
            panic!("expected transcribe command");
        };
        assert_eq!(input, PathBuf::from("talk.mp3"));
        assert_eq!(output, Some(PathBuf::from("out.txt")));
        assert_eq!(chunk_length, Some(20_000));
        assert_eq!(overlap, Some(250));
        assert_eq!(workers, Some(6));
    }

    #[test]
    fn cli_parses_serve_defaults() {
        let cli = Cli::try_parse_from(["katha", "serve"]).unwrap();
        let Commands::Serve { socket, output_dir } = cli.command else {
            panic!("expected serve command");
        };
        assert!(socket.is_none());
        assert!(output_dir.is_none());
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["katha"]).is_err());
    }
}

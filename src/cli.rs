//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `isotune` binary.
//!
//! ## Commands
//!
//! - `path`: Show the emotion path between two moods
//! - `recommend`: Build a playlist from one mood to another
//! - `journey`: Work through a long path one session at a time
//! - `import`: Load a CSV corpus into the track catalog
//! - `map`: Print the transition graph by valence band
//! - `emotions`: List the mood vocabulary
//!
//! ## Examples
//!
//! ```bash
//! isotune import ~/data/muse_v3.csv
//! isotune recommend angry calm -n 8 --seed 7
//! isotune journey sad happy --step 2
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "isotune")]
#[command(about = "Isotune: playlists that walk you from the mood you're in to the mood you want")]
#[command(version)]
pub struct Args {
    /// Read settings from this file instead of the data directory
    #[arg(long, global = true, env = "ISOTUNE_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that produces a playlist.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PlaylistArgs {
    /// Number of songs (defaults to the configured length)
    #[arg(short = 'n', long)]
    pub songs: Option<usize>,

    /// Seed for reproducible playlists
    #[arg(long)]
    pub seed: Option<u64>,

    /// CSV corpus to use instead of the configured one or the catalog
    #[arg(long, env = "ISOTUNE_CORPUS", value_hint = clap::ValueHint::FilePath)]
    pub corpus: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the emotion path from one mood to another
    ///
    /// Prints each emotion on the way with its valence/arousal coordinates.
    /// Unknown mood names are treated as "neutral".
    Path {
        /// Current mood
        #[arg(value_hint = clap::ValueHint::Other)]
        start: String,

        /// Desired mood
        #[arg(value_hint = clap::ValueHint::Other)]
        target: String,
    },

    /// Recommend a playlist from one mood to another
    ///
    /// Songs are picked along the emotion path so the playlist starts close
    /// to the current mood and ends close to the target.
    Recommend {
        /// Current mood
        #[arg(value_hint = clap::ValueHint::Other)]
        start: String,

        /// Desired mood (defaults to the configured target)
        #[arg(value_hint = clap::ValueHint::Other)]
        target: Option<String>,

        #[command(flatten)]
        playlist: PlaylistArgs,
    },

    /// Plan a multi-session journey and recommend songs for one step
    ///
    /// The path is planned from the starting mood once. Each session covers
    /// one transition; pass `--step` to pick which.
    Journey {
        /// Mood at the start of the journey
        #[arg(value_hint = clap::ValueHint::Other)]
        start: String,

        /// Desired mood (defaults to the configured target)
        #[arg(value_hint = clap::ValueHint::Other)]
        target: Option<String>,

        /// Session number, starting at 1
        #[arg(long, default_value = "1")]
        step: usize,

        #[command(flatten)]
        playlist: PlaylistArgs,
    },

    /// Import a CSV corpus into the track catalog
    ///
    /// Rows are stored as they appear in the file; normalisation happens when
    /// the catalog is loaded.
    Import {
        /// CSV file with track, artist, valence, arousal and id columns
        #[arg(value_hint = clap::ValueHint::FilePath)]
        csv: PathBuf,

        /// Replace an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Print the transition map grouped by valence
    Map,

    /// List known moods with their coordinates
    Emotions,

    /// Generate shell completions
    ///
    /// Bash and fish scripts also complete mood names.
    ///
    /// Usage: isotune completion bash > ~/.local/share/bash-completion/completions/isotune
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List mood names for completion (hidden command)
    #[command(hide = true)]
    CompleteEmotions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_recommend_arguments() {
        let args = Args::try_parse_from(["isotune", "recommend", "angry", "calm", "-n", "8", "--seed", "3", "--json"])
            .unwrap();
        match args.command {
            Command::Recommend { start, target, playlist } => {
                assert_eq!(start, "angry");
                assert_eq!(target.as_deref(), Some("calm"));
                assert_eq!(playlist.songs, Some(8));
                assert_eq!(playlist.seed, Some(3));
                assert!(playlist.json);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_journey_defaults_to_first_step() {
        let args = Args::try_parse_from(["isotune", "journey", "sad"]).unwrap();
        match args.command {
            Command::Journey { target, step, .. } => {
                assert!(target.is_none());
                assert_eq!(step, 1);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_import_requires_path() {
        assert!(Args::try_parse_from(["isotune", "import"]).is_err());
    }
}

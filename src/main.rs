//! # Isotune
//!
//! Command-line front end for the isotune playlist engine.
//!
//! ## Usage
//!
//! ```bash
//! # Store a corpus in the catalog
//! isotune import /path/to/muse_v3.csv
//!
//! # Inspect the planned route
//! isotune path sad happy
//!
//! # Build a playlist
//! isotune recommend angry calm -n 6 --seed 1
//!
//! # Multi-session journey, second session
//! isotune journey sad happy --step 2
//! ```
//!
//! Logging is controlled through `RUST_LOG`, e.g. `RUST_LOG=isotune=debug`.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use isotune::affect::AffectSpace;
use isotune::cli::{self, PlaylistArgs};
use isotune::composer::Playlist;
use isotune::config::{self, RuntimeConfig};
use isotune::corpus::Corpus;
use isotune::graph::{self, statistics, TransitionGraph, ValenceBand};
use isotune::journey::Journey;
use isotune::path::EmotionPath;
use isotune::recommender::{Recommendation, Recommender};
use isotune::{completion, db, loader};
use log::{debug, info, warn};
use std::io;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = match &args.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::load()?,
    };
    debug!("Runtime config: {config:?}");

    match args.command {
        cli::Command::Path { start, target } => {
            let recommender = Recommender::with_config(config.engine.clone());
            warn_unknown(&[start.as_str(), target.as_str()]);
            print_path(&recommender.planner().find_path(&start, &target));
        }
        cli::Command::Recommend { start, target, playlist } => {
            let target = target.unwrap_or_else(|| config.engine.default_target.clone());
            warn_unknown(&[start.as_str(), target.as_str()]);

            let corpus = open_corpus(&config, playlist.corpus.as_deref())?;
            let recommender = Recommender::with_config(config.engine.clone());
            let songs = playlist.songs.unwrap_or(config.engine.default_songs);

            info!("Recommending {songs} song(s) from {start} to {target}");
            let path = recommender.planner().find_path(&start, &target);
            let outcome = recommender.recommend_path(&corpus, &path, songs, playlist.seed);
            if playlist.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                if matches!(outcome, Recommendation::Ready(_) | Recommendation::NoSongsFound) {
                    print_path(&path);
                }
                report(&outcome, &corpus);
            }
        }
        cli::Command::Journey { start, target, step, playlist } => {
            let target = target.unwrap_or_else(|| config.engine.default_target.clone());
            warn_unknown(&[start.as_str(), target.as_str()]);
            run_journey(&config, &start, &target, step, &playlist)?;
        }
        cli::Command::Import { csv, force } => {
            info!("Importing corpus from: {}", csv.display());
            let rows = loader::read_csv(&csv)?;
            let mut conn = db::init_catalog(&config.db_path, force)?;
            let stored = db::import_rows(&mut conn, &rows)?;

            let corpus = Corpus::load(rows);
            println!("Imported {stored} row(s) into {}", config.db_path.display());
            println!("{} usable track(s) after validation and deduplication", corpus.len());
            if !corpus.is_ready() {
                println!("Warning: corpus is not ready ({})", not_ready_reason(&corpus));
            }
        }
        cli::Command::Map => print_map(AffectSpace::global(), TransitionGraph::global()),
        cli::Command::Emotions => {
            for (name, point) in AffectSpace::global().iter() {
                println!("{name:<12} valence {:>5.2}  arousal {:>5.2}", point.valence, point.arousal);
            }
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::write_completions(shell, &mut cmd, &mut io::stdout())?;
        }
        cli::Command::CompleteEmotions => {
            completion::print_emotion_completions(&mut io::stdout())?;
        }
    }

    Ok(())
}

/// Corpus from `--corpus`, else the configured CSV, else the catalog.
fn open_corpus(config: &RuntimeConfig, csv: Option<&Path>) -> Result<Corpus> {
    let csv = match csv {
        Some(path) => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Some(config::resolve_path(path, &cwd)?)
        }
        None => config.corpus_csv.clone(),
    };

    if let Some(path) = csv {
        info!("Loading corpus from {}", path.display());
        return Ok(Corpus::load(loader::read_csv(&path)?));
    }

    if !config.db_path.exists() {
        anyhow::bail!(
            "No corpus available. Import one with `isotune import <csv>` or pass --corpus <csv>."
        );
    }
    info!("Loading corpus from catalog {}", config.db_path.display());
    db::load_corpus(&config.db_path)
}

fn run_journey(config: &RuntimeConfig, start: &str, target: &str, step: usize, args: &PlaylistArgs) -> Result<()> {
    let recommender = Recommender::with_config(config.engine.clone());
    let journey = Journey::plan(recommender.planner(), start, target).with_step(step.saturating_sub(1));

    let corpus = open_corpus(config, args.corpus.as_deref())?;
    let songs = args.songs.unwrap_or(config.engine.default_songs);
    let outcome = recommender.recommend_step(&corpus, &journey, songs, args.seed);

    if args.json {
        let body = serde_json::json!({ "journey": journey, "recommendation": outcome });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_path(journey.path());
    println!("Total steps: {} transition(s)", journey.total_steps());
    if let Some((from, to)) = journey.current_transition() {
        println!(
            "Session {} of {}: {from} → {to}",
            journey.current_step() + 1,
            journey.total_steps()
        );
        let after = journey.sessions_after_current();
        if after > 0 {
            println!(
                "Remaining path: {} ({after} more session(s) to reach {target})",
                journey.remaining().join(" → ")
            );
        } else {
            println!("Final session of the journey.");
        }
    }
    report(&outcome, &corpus);
    Ok(())
}

/// Unknown names still work (they map to neutral) but deserve a heads-up.
fn warn_unknown(names: &[&str]) {
    let space = AffectSpace::global();
    for name in names.iter().filter(|name| !space.contains(name)) {
        warn!("Unknown mood {name:?} mapped to neutral");
        eprintln!("Note: \"{name}\" is not a known mood; treating it as neutral. See `isotune emotions`.");
    }
}

fn print_path(path: &EmotionPath) {
    let space = AffectSpace::global();
    println!("Path: {path}");
    for emotion in path.emotions() {
        let point = space.coordinates_of(emotion);
        println!("  {emotion:<12} V={:>5.2} A={:>5.2}", point.valence, point.arousal);
    }
}

fn report(outcome: &Recommendation, corpus: &Corpus) {
    match outcome {
        Recommendation::Ready(playlist) => print_playlist(playlist),
        Recommendation::AlreadyAtTarget => println!("You are already at your target mood. No transition needed."),
        Recommendation::CorpusNotReady => println!("Corpus not ready: {}.", not_ready_reason(corpus)),
        Recommendation::NoSongsFound => {
            println!("No suitable songs found for this transition. Try a larger or more varied corpus.");
        }
    }
}

fn print_playlist(playlist: &Playlist) {
    println!("Playlist ({} song(s)):", playlist.len());
    for (i, track) in playlist.iter().enumerate() {
        println!(
            "{:>3}. {} - {}  [V={:>5.2} A={:>5.2}]  {}",
            i + 1,
            track.artist,
            track.track,
            track.valence,
            track.arousal,
            track.id
        );
    }
}

fn not_ready_reason(corpus: &Corpus) -> String {
    if corpus.missing_columns().is_empty() {
        "no usable tracks".to_string()
    } else {
        format!("missing column(s) {}", corpus.missing_columns().join(", "))
    }
}

fn print_map(space: &AffectSpace, graph: &TransitionGraph) {
    for (band, title) in [
        (ValenceBand::Negative, "Negative emotions"),
        (ValenceBand::Neutral, "Neutral emotions"),
        (ValenceBand::Positive, "Positive emotions"),
    ] {
        println!("{title}:");
        for (source, targets) in graph
            .iter()
            .filter(|(source, _)| graph::valence_band(space.coordinates_of(source)) == band)
        {
            println!("  {source} → {}", targets.join(", "));
        }
    }

    let stats = statistics::summarize(graph, 5);
    println!();
    println!("Emotions with transitions: {}", stats.emotion_count);
    println!("Total transitions: {}", stats.edge_count);
    println!("Average transitions per emotion: {:.2}", stats.mean_out_degree);
    println!("Hub states (most incoming):");
    for (name, count) in &stats.hubs {
        println!("  {name}: {count}");
    }
    println!("Gateway states (most outgoing):");
    for (name, count) in &stats.gateways {
        println!("  {name}: {count}");
    }
    if !stats.dead_ends.is_empty() {
        println!("Dead ends: {}", stats.dead_ends.join(", "));
    }
}

//! ISO-principle playlist engine: start where the listener is, end where they
//! want to be, and move there in small steps.
//!
//! Core modules:
//! - [`affect`] - Mood vocabulary on the valence/arousal plane
//! - [`graph`] - Curated one-step mood transitions
//! - [`path`] - Emotion path planning
//! - [`corpus`] - Song corpus, normalisation and similarity search
//! - [`composer`] - Turning a path into a playlist
//! - [`recommender`] - End-to-end entry point
//! - [`journey`] - One transition per session
//!
//! ### Supporting Modules
//!
//! - [`loader`] - CSV ingestion
//! - [`db`] - SQLite track catalog
//! - [`config`] - Data directory and runtime configuration
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use isotune::{loader, corpus::Corpus, recommender::{Recommendation, Recommender}};
//! use std::path::Path;
//!
//! let corpus = Corpus::load(loader::read_csv(Path::new("muse_v3.csv"))?);
//! let recommender = Recommender::default();
//!
//! match recommender.recommend(&corpus, "angry", "calm", 6, Some(7)) {
//!     Recommendation::Ready(playlist) => {
//!         for track in &playlist {
//!             println!("{} - {}", track.artist, track.track);
//!         }
//!     }
//!     other => println!("{other:?}"),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## How a Playlist Is Built
//!
//! 1. Both mood names are resolved on the affect plane; unknown names map to
//!    `"neutral"`.
//! 2. A breadth-first search over the transition graph picks the shortest
//!    route with at least two transitions. Direct hops get a midpoint emotion
//!    inserted; unreachable targets get two synthesized intermediates.
//! 3. Songs are spread over the transitions. Each transition is sampled at
//!    eased waypoints, and each waypoint draws one unused track from its
//!    nearest neighbours, weighted towards the closest.
//!
//! ## Error Handling
//!
//! The engine itself never fails: bad corpus rows are dropped, unknown moods
//! fall back to neutral, and sparse regions shorten the playlist. File and
//! catalog access return `anyhow::Result`.
//!
//! ## Thread Safety
//!
//! Vocabulary and graph tables are immutable statics. A loaded [`corpus::Corpus`]
//! is read-only, so one corpus can serve many threads; each request carries
//! its own seed.

pub mod affect;
pub mod cli;
pub mod completion;
pub mod composer;
pub mod config;
pub mod corpus;
pub mod db;
pub mod graph;
pub mod journey;
pub mod loader;
pub mod path;
pub mod recommender;

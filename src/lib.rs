//! LectureMind - study notes from lecture videos
//!
//! Turns a YouTube lecture into detailed notes, revision points, likely
//! doubt points and a multiple-choice quiz, and serves them as web pages.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `youtube` - Video id extraction, oEmbed metadata and caption retrieval
//! - `study` - Language model access, JSON extraction, notes and quiz generation
//! - `store` - In-memory lecture records
//! - `orchestrator` - The processing pipeline
//! - `web` - HTTP routes and rendered pages
//! - `cli` - Command-line interface
//!
//! Upstream failures never abort the pipeline: each lookup or generation
//! step has a fixed fallback value, and the reason is kept on the record.
//!
//! # Example
//!
//! ```rust,no_run
//! use lecturemind::config::Settings;
//! use lecturemind::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let lecture = orchestrator
//!         .process("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("{} MCQs for {}", lecture.mcqs.mcqs.len(), lecture.title);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod store;
pub mod study;
pub mod web;
pub mod youtube;

#[cfg(test)]
mod test_support;

pub use error::{LectureMindError, Result};

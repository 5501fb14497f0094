//! One-off processing command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::store::LectureRecord;
use anyhow::Result;

/// Run the process command.
pub async fn run_process(url: &str, json: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Process, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner("Fetching transcript and generating notes...");
    let result = orchestrator.process(url).await;
    spinner.finish_and_clear();

    let record = match result {
        Ok(record) => record,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_summary(&record);
    }

    Ok(())
}

fn print_summary(record: &LectureRecord) {
    Output::header(&record.title);
    Output::kv("Lecture", &record.id);
    Output::kv("Video", &record.video_id);
    Output::kv("Source", &record.text_source.to_string());
    Output::kv("Questions", &record.mcqs.mcqs.len().to_string());

    for fallback in &record.fallbacks {
        Output::warning(&format!("{:?} fell back: {}", fallback.stage, fallback.reason));
    }

    let analysis = &record.analysis;
    if !analysis.key_concepts.is_empty() {
        println!();
        println!("Key concepts:");
        for concept in &analysis.key_concepts {
            Output::list_item(concept);
        }
    }

    if !analysis.revision_notes.trim().is_empty() {
        println!();
        println!("Revision notes:");
        for line in analysis.revision_notes.lines().filter(|l| !l.trim().is_empty()) {
            Output::list_item(line.trim());
        }
    }

    println!();
    Output::info("Use --json for the full notes and quiz.");
}

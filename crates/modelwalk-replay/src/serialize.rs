//! Serialization for recordings and triage reports.

use crate::recording::Recording;
use crate::triage::TriageReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Save a recording to a JSON file.
pub fn save_recording(recording: &Recording, path: &Path) -> Result<(), SerializeError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, recording)?;
    Ok(())
}

/// Load a recording from a JSON file.
pub fn load_recording(path: &Path) -> Result<Recording, SerializeError> {
    let file = File::open(path)?;
    let recording = serde_json::from_reader(file)?;
    Ok(recording)
}

/// Save a triage report as a markdown file.
pub fn save_triage_report(report: &TriageReport, path: &Path) -> Result<(), SerializeError> {
    let markdown = format_triage_markdown(report);
    let mut file = File::create(path)?;
    file.write_all(markdown.as_bytes())?;
    Ok(())
}

/// Format a triage report as markdown.
pub fn format_triage_markdown(report: &TriageReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Failure in `{}`\n\n", report.model));
    md.push_str(&format!("**Severity:** {:?}\n\n", report.severity));
    md.push_str(&format!("{}\n\n", report.summary));

    md.push_str("## Failing Action\n\n");
    md.push_str(&format!("- **Action:** {}\n", report.failing_action));
    md.push_str(&format!("- **Message:** {}\n", report.message));
    md.push_str(&format!(
        "- **Length:** {} (was {})\n\n",
        report.shrunk_len, report.original_len
    ));

    md.push_str("## Reproducer\n\n");
    md.push_str("| Step | State | Action |\n");
    md.push_str("|------|-------|--------|\n");
    for entry in &report.steps {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.step, entry.state, entry.action
        ));
    }
    md.push('\n');

    md.push_str("## Reproduction\n\n");
    md.push_str(&format!(
        "Found by the {} walk with seed {}. Replay from reset:\n\n",
        report.reproduction.strategy, report.reproduction.seed
    ));
    md.push_str("```\n");
    md.push_str(&report.reproduction.actions.join("\n"));
    md.push_str("\n```\n");

    md
}

/// Save a triage report as JSON.
pub fn save_triage_json(report: &TriageReport, path: &Path) -> Result<(), SerializeError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Load a triage report from JSON.
pub fn load_triage_json(path: &Path) -> Result<TriageReport, SerializeError> {
    let file = File::open(path)?;
    let report = serde_json::from_reader(file)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::TriageEngine;
    use std::io::Read;
    use tempfile::TempDir;

    fn sample_recording() -> Recording {
        Recording {
            model: "counter".to_string(),
            strategy: "greedy".to_string(),
            seed: 42,
            timestamp: 1_700_000_000,
            actions: vec!["inc".into(), "inc".into(), "inc".into(), "inc".into()],
            states: vec!["0".into(), "1".into(), "2".into(), "3".into()],
            failing_action: "inc".to_string(),
            message: "overflow at 3".to_string(),
        }
    }

    #[test]
    fn test_recording_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("failure.json");
        let recording = sample_recording();

        save_recording(&recording, &path).unwrap();
        let loaded = load_recording(&path).unwrap();
        assert_eq!(loaded, recording);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_recording(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(SerializeError::Io(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_recording(&path), Err(SerializeError::Json(_))));
    }

    #[test]
    fn test_triage_markdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("triage.md");
        let recording = sample_recording();
        let report = TriageEngine::triage(&recording, &recording);

        save_triage_report(&report, &path).unwrap();
        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();

        assert!(contents.contains("# Failure in `counter`"));
        assert!(contents.contains("| 4 | 3 | inc |"));
        assert!(contents.contains("seed 42"));
    }

    #[test]
    fn test_triage_json_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("triage.json");
        let recording = sample_recording();
        let report = TriageEngine::triage(&recording, &recording);

        save_triage_json(&report, &path).unwrap();
        assert_eq!(load_triage_json(&path).unwrap(), report);
    }
}

//! Analytics sinks used by the binary.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use schematic_catalog::WorkspaceConfig;
use schematic_core::{AnalyticsError, AnalyticsSink, GenerateOptions, NullSink};
use serde::Serialize;
use tracing::info;

/// Emits each event as a `tracing` event at target `schematic::analytics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn report(&self, path: &[String], options: &GenerateOptions) -> Result<(), AnalyticsError> {
        info!(
            target: "schematic::analytics",
            path = %path.join("/"),
            dry_run = options.dry_run,
            force = options.force,
            "generate"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct EventRecord<'a> {
    path: &'a [String],
    timestamp: String,
}

/// Appends one JSON object per event to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AnalyticsSink for JsonLinesSink {
    fn report(&self, path: &[String], _options: &GenerateOptions) -> Result<(), AnalyticsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let record = EventRecord {
            path,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }
}

/// Picks the sink the workspace asks for.
pub fn from_config(config: &WorkspaceConfig) -> Box<dyn AnalyticsSink> {
    if !config.analytics.enabled {
        return Box::new(NullSink);
    }
    match config.analytics_log_file() {
        Some(path) => Box::new(JsonLinesSink::new(path)),
        None => Box::new(TracingSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("analytics.jsonl");
        let sink = JsonLinesSink::new(&path);

        let event = vec!["generate".to_string(), "core".into(), "component".into()];
        sink.report(&event, &GenerateOptions::default()).unwrap();
        sink.report(&event, &GenerateOptions::default()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["path"], serde_json::json!(["generate", "core", "component"]));
        let timestamp = record["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_unwritable_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let sink = JsonLinesSink::new(dir.path());
        let event = vec!["generate".to_string()];
        assert!(matches!(
            sink.report(&event, &GenerateOptions::default()),
            Err(AnalyticsError::Io(_))
        ));
    }

    #[test]
    fn test_disabled_analytics_use_null_sink() {
        let config = WorkspaceConfig::default();
        let sink = from_config(&config);
        assert!(sink.report(&[], &GenerateOptions::default()).is_ok());
    }
}

//! Analytics event paths for generator runs.
//!
//! Collection and generator names may contain `/` (scoped package names),
//! which analytics backends do not accept inside a path token, so every `/`
//! is replaced with `_`.

use thiserror::Error;

use crate::GenerateOptions;

/// First segment of every generate event.
pub const EVENT_ROOT: &str = "generate";

/// Failures of an analytics transport. Never shown to the user.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Writing the event failed.
    #[error("analytics I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the event failed.
    #[error("analytics encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Any other transport failure.
    #[error("analytics transport error: {0}")]
    Transport(String),
}

/// Receiver of analytics events.
pub trait AnalyticsSink {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Any error is logged and dropped by the caller.
    fn report(&self, path: &[String], options: &GenerateOptions) -> Result<(), AnalyticsError>;
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn report(&self, _path: &[String], _options: &GenerateOptions) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

/// Builds the event path for a generator run.
///
/// The canonical (long) name wins over the invoked name when known.
///
/// # Examples
///
/// ```
/// use schematic_core::event_path;
///
/// assert_eq!(
///     event_path("@scope/pkg", "thing", Some("my/thing")),
///     vec!["generate", "@scope_pkg", "my_thing"],
/// );
/// assert_eq!(
///     event_path("core", "component", None),
///     vec!["generate", "core", "component"],
/// );
/// ```
pub fn event_path(collection_name: &str, generator_name: &str, long_name: Option<&str>) -> Vec<String> {
    vec![
        EVENT_ROOT.to_string(),
        escape_segment(collection_name),
        escape_segment(long_name.unwrap_or(generator_name)),
    ]
}

fn escape_segment(segment: &str) -> String {
    segment.replace('/', "_")
}

pub mod generator;
pub mod normalize;
pub mod prompt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use generator::{GenerationConfig, ReportGenerator};

/// A finished analysis report. Lives only in session state; replaced by
/// the next generation and discarded when the process ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Post-processed markdown returned by the model.
    pub markdown: String,
    /// Model that produced the report.
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

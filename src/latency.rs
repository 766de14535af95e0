/// Matching-engine latency statistics
///
/// Reads the `stats.json` document the engine writes after replaying an order
/// stream. The top level is keyed by category (`Add`, `Amend`, `Cancel`,
/// `Match`); each category holds a list of entries, or a single entry as
/// `Match` does. Categories keep their document order.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LatencyError {
    #[error("cannot read stats file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stats document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("stats document must be a JSON object keyed by category")]
    NotAnObject,

    #[error("negative latency variance {variance} for {label}")]
    NegativeVariance { label: String, variance: f64 },
}

pub type LatencyResult<T> = Result<T, LatencyError>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatencyEntry {
    pub mean_latency: f64,
    pub latency_variance: f64,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub limit_level_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryStats {
    Entries(Vec<LatencyEntry>),
    Single(LatencyEntry),
}

impl CategoryStats {
    pub fn entries(&self) -> &[LatencyEntry] {
        match self {
            CategoryStats::Entries(entries) => entries,
            CategoryStats::Single(entry) => std::slice::from_ref(entry),
        }
    }
}

/// One summarized latency figure
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyBar {
    pub label_parts: Vec<String>,
    pub mean_us: f64,
    pub std_dev_us: f64,
}

impl LatencyBar {
    pub fn label(&self) -> String {
        self.label_parts.join(" / ")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatencyReport {
    categories: Vec<(String, CategoryStats)>,
}

impl LatencyReport {
    pub fn from_json(text: &str) -> LatencyResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        let object: Map<String, Value> = match value {
            Value::Object(object) => object,
            _ => return Err(LatencyError::NotAnObject),
        };

        let mut categories = Vec::with_capacity(object.len());
        for (name, stats) in object {
            let stats: CategoryStats = serde_json::from_value(stats)?;
            categories.push((name, stats));
        }
        Ok(LatencyReport { categories })
    }

    pub fn from_file(path: impl AsRef<Path>) -> LatencyResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryStats)> {
        self.categories.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn category(&self, name: &str) -> Option<&CategoryStats> {
        self.categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, stats)| stats)
    }

    /// One bar per entry: label parts are the category, then the order type
    /// and limit level status when present
    pub fn bars(&self) -> LatencyResult<Vec<LatencyBar>> {
        let mut bars = Vec::new();
        for (name, stats) in &self.categories {
            for entry in stats.entries() {
                let mut label_parts = vec![name.clone()];
                label_parts.extend(entry.order_type.iter().cloned());
                label_parts.extend(entry.limit_level_status.iter().cloned());

                if entry.latency_variance < 0.0 {
                    return Err(LatencyError::NegativeVariance {
                        label: label_parts.join(" / "),
                        variance: entry.latency_variance,
                    });
                }

                bars.push(LatencyBar {
                    label_parts,
                    mean_us: entry.mean_latency,
                    std_dev_us: entry.latency_variance.sqrt(),
                });
            }
        }
        Ok(bars)
    }

    /// Print statistics summary
    pub fn print_summary(&self) -> LatencyResult<()> {
        let bars = self.bars()?;
        let width = bars.iter().map(|b| b.label().len()).max().unwrap_or(0);

        println!("=== Latency (us) ===");
        for bar in &bars {
            println!(
                "{:<width$}  mean {:>12.3}  std {:>12.3}",
                bar.label(),
                bar.mean_us,
                bar.std_dev_us,
                width = width
            );
        }
        Ok(())
    }
}

// Topic definitions and the topic configuration document.
//
// A topics document lists every topic with its seed phrases and optional
// softmatch settings:
//
//   topics:
//     - id: finance
//       values: ["money", "credit card"]
//       softmatch_min_similarity_any: 0.8
//       max_to_add: 20
//     - id: weather
//       values_file: weather_terms.txt
//       softmatch_min_similarity_mean: 0.4
//
// Optional keys are resolved once here into a `TopicSpec` with explicit
// defaults, so the expansion engine never checks for key presence.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::SoftmatchError;

/// A single topic, fully resolved and immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSpec {
    pub id: String,
    /// Seed phrases as written in the configuration (not yet normalized)
    pub seed_values: Vec<String>,
    /// Add any neighbor of a seed at least this similar (0 = disabled)
    pub min_similarity_any: f64,
    /// Add candidates whose mean squared similarity across seeds reaches
    /// this value (0 = disabled)
    pub min_similarity_mean: f64,
    /// Cap on the number of non-seed terms added (None = unlimited)
    pub max_additions: Option<usize>,
}

impl TopicSpec {
    /// A topic matching exactly its seeds.
    pub fn new<I, S>(id: impl Into<String>, seed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            seed_values: seed_values.into_iter().map(Into::into).collect(),
            min_similarity_any: 0.0,
            min_similarity_mean: 0.0,
            max_additions: None,
        }
    }

    pub fn with_min_similarity_any(mut self, threshold: f64) -> Self {
        self.min_similarity_any = threshold;
        self
    }

    pub fn with_min_similarity_mean(mut self, threshold: f64) -> Self {
        self.min_similarity_mean = threshold;
        self
    }

    pub fn with_max_additions(mut self, max: usize) -> Self {
        self.max_additions = Some(max);
        self
    }

    /// Whether either softmatch criterion is active.
    pub fn softmatch_enabled(&self) -> bool {
        self.min_similarity_any > 0.0 || self.min_similarity_mean > 0.0
    }

    /// Normalized seed terms in declaration order. Blank seeds are dropped.
    pub fn seed_terms(&self) -> Vec<String> {
        self.seed_values
            .iter()
            .map(|v| normalize_term(v))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Normalize a phrase into a vocabulary term: lowercase, with every run of
/// whitespace replaced by a single underscore.
///
/// This is not a per-character space replacement: `"new  york"` becomes
/// `new_york` rather than `new__york`, tabs and newlines separate words too,
/// and leading or trailing whitespace is dropped.
pub fn normalize_term(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Serialization format of a topics document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicsFormat {
    Yaml,
    Json,
}

impl TopicsFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TopicsDocument {
    topics: Vec<TopicEntry>,
}

#[derive(Debug, Deserialize)]
struct TopicEntry {
    id: String,
    values: Option<Vec<String>>,
    values_file: Option<PathBuf>,
    softmatch_min_similarity_any: Option<f64>,
    softmatch_min_similarity_mean: Option<f64>,
    max_to_add: Option<usize>,
}

/// Load and validate a topics document from disk.
///
/// `values_file` entries are resolved relative to the document's directory.
pub fn load_topics(path: &Path) -> Result<Vec<TopicSpec>, SoftmatchError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        SoftmatchError::Configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let topics = parse_topics(&contents, TopicsFormat::from_path(path), base_dir)?;
    info!(
        path = %path.display(),
        topics = topics.len(),
        "Loaded topic configuration"
    );
    Ok(topics)
}

/// Parse and validate a topics document already read into memory.
pub fn parse_topics(
    contents: &str,
    format: TopicsFormat,
    base_dir: &Path,
) -> Result<Vec<TopicSpec>, SoftmatchError> {
    let document: TopicsDocument = match format {
        TopicsFormat::Yaml => serde_yaml::from_str(contents)
            .map_err(|e| SoftmatchError::Configuration(e.to_string()))?,
        TopicsFormat::Json => serde_json::from_str(contents)
            .map_err(|e| SoftmatchError::Configuration(e.to_string()))?,
    };

    let mut seen = HashSet::new();
    let mut topics = Vec::with_capacity(document.topics.len());

    for entry in document.topics {
        let topic = resolve_entry(entry, base_dir)?;
        if !seen.insert(topic.id.clone()) {
            return Err(SoftmatchError::Configuration(format!(
                "duplicate topic id '{}'",
                topic.id
            )));
        }
        topics.push(topic);
    }

    Ok(topics)
}

fn resolve_entry(entry: TopicEntry, base_dir: &Path) -> Result<TopicSpec, SoftmatchError> {
    let id = entry.id.trim().to_string();
    if id.is_empty() {
        return Err(SoftmatchError::Configuration(
            "topic with an empty id".to_string(),
        ));
    }
    let invalid = |msg: String| SoftmatchError::Configuration(format!("topic '{}': {}", id, msg));

    let seed_values = match (entry.values, entry.values_file) {
        (Some(values), None) => values,
        (None, Some(file)) => read_values_file(&base_dir.join(file)).map_err(invalid)?,
        (Some(_), Some(_)) => {
            return Err(invalid("set either 'values' or 'values_file', not both".to_string()))
        }
        (None, None) => return Err(invalid("missing 'values' or 'values_file'".to_string())),
    };

    let min_similarity_any =
        threshold(entry.softmatch_min_similarity_any, "softmatch_min_similarity_any").map_err(invalid)?;
    let min_similarity_mean =
        threshold(entry.softmatch_min_similarity_mean, "softmatch_min_similarity_mean").map_err(invalid)?;

    if seed_values.is_empty() {
        warn!(topic = %id, "Topic has no seed values");
    }

    Ok(TopicSpec {
        id,
        seed_values,
        min_similarity_any,
        min_similarity_mean,
        max_additions: entry.max_to_add,
    })
}

fn threshold(value: Option<f64>, key: &str) -> Result<f64, String> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => Ok(v),
        Some(v) => Err(format!("'{}' must be between 0 and 1, got {}", key, v)),
    }
}

/// One seed per line; surrounding whitespace is trimmed and blank lines skipped.
fn read_values_file(path: &Path) -> Result<Vec<String>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("cannot read values_file {}: {}", path.display(), e))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

//! Keyword topic classification
//!
//! Maps free text to one of a closed set of topics by substring matching
//! against a priority-ordered keyword table. The table is data: the free-text
//! table and the prompt-card table differ, and a deployment may load its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Topic domain used to select a canned response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Hydraulic,
    Biomechanical,
    Biomedical,
    Structural,
    #[default]
    General,
}

impl Topic {
    #[cfg(test)]
    pub const ALL: [Topic; 5] = [
        Topic::Hydraulic,
        Topic::Biomechanical,
        Topic::Biomedical,
        Topic::Structural,
        Topic::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Hydraulic => "hydraulic",
            Topic::Biomechanical => "biomechanical",
            Topic::Biomedical => "biomedical",
            Topic::Structural => "structural",
            Topic::General => "general",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords for one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicKeywords {
    pub topic: Topic,
    pub keywords: Vec<String>,
}

impl TopicKeywords {
    fn new(topic: Topic, keywords: &[&str]) -> Self {
        Self {
            topic,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Priority-ordered keyword table
///
/// Entries are checked in order; the first entry with any matching keyword
/// wins. `general` never appears as an entry since it is the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub entries: Vec<TopicKeywords>,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Error)]
pub enum KeywordTableError {
    #[error("Failed to read keyword table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid keyword table JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Keyword table may not list the general topic")]
    GeneralEntry,
    #[error("Keyword table entry for {0} has no keywords")]
    EmptyEntry(Topic),
    #[error("Keyword table entry for {0} has a blank keyword")]
    BlankKeyword(Topic),
}

impl KeywordTable {
    /// Table used for typed free text
    pub fn free_text() -> Self {
        Self {
            entries: vec![
                TopicKeywords::new(
                    Topic::Hydraulic,
                    &["water", "pump", "fluid", "flow", "hydraulic"],
                ),
                TopicKeywords::new(
                    Topic::Biomechanical,
                    &["exoskeleton", "joint", "muscle", "movement", "biomechanical"],
                ),
                TopicKeywords::new(
                    Topic::Biomedical,
                    &["circulatory", "heart", "blood", "medical", "wearable"],
                ),
                TopicKeywords::new(
                    Topic::Structural,
                    &["bridge", "structure", "tensegrity", "architecture", "building"],
                ),
            ],
            case_sensitive: false,
        }
    }

    /// Table used for preset prompt cards (exact-case phrase match)
    pub fn prompt_cards() -> Self {
        Self {
            entries: vec![
                TopicKeywords::new(Topic::Hydraulic, &["water pump", "fluid"]),
                TopicKeywords::new(Topic::Biomechanical, &["exoskeleton"]),
                TopicKeywords::new(Topic::Biomedical, &["circulatory", "wearable"]),
                TopicKeywords::new(Topic::Structural, &["bridge", "tensegrity"]),
            ],
            case_sensitive: true,
        }
    }

    /// Load a table from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, KeywordTableError> {
        let raw = std::fs::read_to_string(path).map_err(|source| KeywordTableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KeywordTableError> {
        let table: KeywordTable = serde_json::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), KeywordTableError> {
        for entry in &self.entries {
            if entry.topic == Topic::General {
                return Err(KeywordTableError::GeneralEntry);
            }
            if entry.keywords.is_empty() {
                return Err(KeywordTableError::EmptyEntry(entry.topic));
            }
            // A blank keyword would match any text containing whitespace
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(KeywordTableError::BlankKeyword(entry.topic));
            }
        }
        Ok(())
    }
}

/// Deterministic, total keyword classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    table: KeywordTable,
}

impl Classifier {
    pub fn new(mut table: KeywordTable) -> Self {
        if !table.case_sensitive {
            for entry in &mut table.entries {
                for keyword in &mut entry.keywords {
                    *keyword = keyword.to_lowercase();
                }
            }
        }
        Self { table }
    }

    pub fn classify(&self, text: &str) -> Topic {
        let haystack = if self.table.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        };

        self.table
            .entries
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|k| !k.trim().is_empty() && haystack.contains(k.as_str()))
            })
            .map_or(Topic::General, |entry| entry.topic)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KeywordTable::free_text())
    }
}

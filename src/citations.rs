//! Canonical citation references and random subset sampling

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// References that are always considered active, shown as the count baseline
pub const BASELINE_REFERENCES: usize = 4;

/// Manuscripts attached to the context bar by the attach affordance
pub const CONTEXT_MANUSCRIPTS: [&str; 3] = [
    "Codex Atlanticus - Folio 812",
    "Windsor RL 19037r - Anatomy",
    "Codex Leicester - Water Studies",
];

const MIN_SAMPLE: usize = 2;
const MAX_SAMPLE: usize = 3;

/// A named source chip attached to an agent message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

impl Citation {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Read-only pool of canonical references
#[derive(Debug, Clone)]
pub struct CitationPool {
    sources: Vec<Citation>,
}

impl CitationPool {
    pub fn canonical() -> Self {
        Self {
            sources: vec![
                Citation::new("Codex Atlanticus", "📜"),
                Citation::new("Codex Leicester", "📖"),
                Citation::new("Windsor Manuscripts", "📚"),
                Citation::new("Codex Madrid I", "📐"),
            ],
        }
    }

    #[cfg(test)]
    pub fn sources(&self) -> &[Citation] {
        &self.sources
    }

    /// Pick 2 or 3 distinct references in random order
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Citation> {
        let count = rng.gen_range(MIN_SAMPLE..=MAX_SAMPLE).min(self.sources.len());
        let mut picked = self.sources.clone();
        picked.shuffle(rng);
        picked.truncate(count);
        picked
    }
}

impl Default for CitationPool {
    fn default() -> Self {
        Self::canonical()
    }
}

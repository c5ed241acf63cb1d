//! Agent reply assembly
//!
//! A backend design becomes a structured, lightly marked-up message. Any
//! gateway failure falls back to classification plus a canned response.

use crate::citations::{Citation, CitationPool};
use crate::classifier::{Classifier, KeywordTable, Topic};
use crate::gateway::{DesignResult, GatewayError};
use crate::responses::ResponseRepository;
use crate::session::{Message, Origin, ReplySource, Utterance};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};

/// Longest inspiration excerpt, in characters
const INSPIRATION_EXCERPT_CHARS: usize = 120;

pub struct ReplyComposer {
    free_text: Classifier,
    prompt_cards: Classifier,
    responses: ResponseRepository,
    citations: CitationPool,
    rng: Mutex<StdRng>,
}

impl ReplyComposer {
    pub fn new(free_text: Classifier, responses: ResponseRepository, citations: CitationPool) -> Self {
        Self {
            free_text,
            prompt_cards: Classifier::new(KeywordTable::prompt_cards()),
            responses,
            citations,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic citation sampling
    #[cfg(test)]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Topic for an utterance; prompt cards use their own rule table
    pub fn classify(&self, utterance: &Utterance) -> Topic {
        match utterance.origin {
            Origin::User => self.free_text.classify(&utterance.text),
            Origin::PromptCard => self.prompt_cards.classify(&utterance.text),
        }
    }

    pub fn compose(
        &self,
        utterance: &Utterance,
        outcome: Result<DesignResult, GatewayError>,
    ) -> Message {
        match outcome {
            Ok(design) => {
                let citations = if design.citations.is_empty() {
                    self.sample_citations()
                } else {
                    design.citations.clone()
                };
                Message::agent(format_design(&design), citations, ReplySource::Backend, None)
            }
            Err(e) => {
                tracing::debug!(kind = %e.kind, "Answering from canned responses");
                self.canned(utterance)
            }
        }
    }

    fn canned(&self, utterance: &Utterance) -> Message {
        let topic = self.classify(utterance);
        Message::agent(
            self.responses.lookup(topic),
            self.sample_citations(),
            ReplySource::Canned,
            Some(topic),
        )
    }

    fn sample_citations(&self) -> Vec<Citation> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.citations.sample(&mut *rng)
    }
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::new(
            Classifier::default(),
            ResponseRepository::default(),
            CitationPool::canonical(),
        )
    }
}

/// Render a design concept as agent markup
pub fn format_design(design: &DesignResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**{}**", plain(&design.name));
    let _ = writeln!(
        out,
        "*{} for {}*",
        plain(&design.product_type),
        plain(&design.target_market)
    );
    let _ = writeln!(
        out,
        "Scores: Innovation {:.1}/10 | Feasibility {:.1}/10 | Viability {:.1}/10",
        design.scores.innovation, design.scores.feasibility, design.scores.viability
    );

    if !design.features.is_empty() {
        out.push_str("**Key features:**\n");
        for (i, feature) in design.features.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({})",
                i + 1,
                plain(&feature.description),
                plain(&feature.development_stage)
            );
            let _ = writeln!(out, "Engineering: {}", plain(&feature.engineering_note));
            if !feature.inspiration.is_empty() {
                let _ = writeln!(out, "Inspiration: {}", excerpt(&plain(&feature.inspiration)));
            }
        }
    }

    if let Some(sentence) = principles_sentence(&design.principles) {
        out.push_str(&sentence);
    }

    out.trim_end().to_string()
}

/// Backend text as one markup-free line: emphasis markers dropped and line
/// breaks folded into single spaces
fn plain(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.replace('*', ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= INSPIRATION_EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(INSPIRATION_EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn principles_sentence(principles: &[String]) -> Option<String> {
    let principles: Vec<String> = principles.iter().map(String::as_str).map(plain).collect();
    let (last, rest) = principles.split_last()?;
    let joined = if rest.is_empty() {
        last.clone()
    } else {
        format!("{} and {last}", rest.join(", "))
    };
    Some(format!("Guided by Leonardo's principles of {joined}."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{DesignFeature, DesignScores};
    use crate::responses::ResponseRepository;

    fn feature(description: &str, stage: &str) -> DesignFeature {
        DesignFeature {
            description: description.to_string(),
            development_stage: stage.to_string(),
            engineering_note: format!("{description} note"),
            inspiration: "Codex Atlanticus spiral studies".to_string(),
        }
    }

    fn design() -> DesignResult {
        DesignResult {
            name: "Vortex Pump".to_string(),
            product_type: "portable pump".to_string(),
            target_market: "rural farms".to_string(),
            scores: DesignScores {
                innovation: 8.5,
                feasibility: 7.0,
                viability: 9.0,
            },
            features: vec![feature("Archimedean screw", "prototype"), feature("Hand crank", "concept")],
            principles: vec!["observation".to_string(), "proportion".to_string()],
            citations: vec![Citation::new("Codex Atlanticus", "📜")],
        }
    }

    #[test]
    fn test_design_layout() {
        let text = format_design(&design());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "**Vortex Pump**");
        assert_eq!(lines[1], "*portable pump for rural farms*");
        assert_eq!(
            lines[2],
            "Scores: Innovation 8.5/10 | Feasibility 7.0/10 | Viability 9.0/10"
        );
        let numbered: Vec<&&str> = lines
            .iter()
            .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .collect();
        assert_eq!(numbered.len(), 2);
        assert_eq!(*numbered[0], "1. Archimedean screw (prototype)");
        assert_eq!(*numbered[1], "2. Hand crank (concept)");
        assert_eq!(
            lines.last().copied(),
            Some("Guided by Leonardo's principles of observation and proportion.")
        );
    }

    #[test]
    fn test_backend_text_cannot_break_layout() {
        let mut noisy = design();
        noisy.name = "Vortex *Pump*\nMk II".to_string();
        noisy.product_type = "pump**".to_string();
        noisy.features = vec![feature("Screw\n2. fake item", "*beta*")];

        let text = format_design(&noisy);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "**Vortex Pump Mk II**");
        assert_eq!(lines[1], "*pump for rural farms*");
        assert!(lines.contains(&"1. Screw 2. fake item (beta)"));
        assert!(!lines.iter().any(|l| l.starts_with("2.")));
    }

    #[test]
    fn test_long_inspiration_is_excerpted() {
        let long = "a".repeat(500);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), INSPIRATION_EXCERPT_CHARS + 3);
        assert!(short.ends_with("..."));

        // Multi-byte text is cut on character boundaries
        let glyphs = "📜".repeat(200);
        assert!(excerpt(&glyphs).starts_with("📜"));
    }

    #[test]
    fn test_principles_sentence() {
        assert_eq!(principles_sentence(&[]), None);
        assert_eq!(
            principles_sentence(&["unity".to_string()]).as_deref(),
            Some("Guided by Leonardo's principles of unity.")
        );
        assert_eq!(
            principles_sentence(&["a".to_string(), "b".to_string(), "c".to_string()]).as_deref(),
            Some("Guided by Leonardo's principles of a, b and c.")
        );
    }

    #[test]
    fn test_backend_citations_are_kept() {
        let composer = ReplyComposer::default().with_seed(1);
        let reply = composer.compose(&Utterance::user("pump"), Ok(design()));

        assert_eq!(reply.source, ReplySource::Backend);
        assert_eq!(reply.citations, vec![Citation::new("Codex Atlanticus", "📜")]);
        assert_eq!(reply.topic, None);
    }

    #[test]
    fn test_empty_backend_citations_are_sampled() {
        let composer = ReplyComposer::default().with_seed(1);
        let mut bare = design();
        bare.citations.clear();

        let reply = composer.compose(&Utterance::user("pump"), Ok(bare));
        assert!((2..=3).contains(&reply.citations.len()));
    }

    #[test]
    fn test_gateway_failure_falls_back_to_canned() {
        let composer = ReplyComposer::default().with_seed(1);
        let reply = composer.compose(
            &Utterance::user("I need a portable water pump"),
            Err(GatewayError::network("connection refused")),
        );

        assert_eq!(reply.source, ReplySource::Canned);
        assert_eq!(reply.topic, Some(Topic::Hydraulic));
        assert!(reply
            .body
            .starts_with("Applying Leonardo's observations on fluid dynamics"));
        assert!((2..=3).contains(&reply.citations.len()));
    }

    #[test]
    fn test_prompt_cards_use_card_table() {
        let composer = ReplyComposer::new(
            Classifier::default(),
            ResponseRepository::default(),
            CitationPool::canonical(),
        );
        // "movement" is a free-text keyword but not a card phrase
        let card = Utterance::new("Study of movement", Origin::PromptCard);
        assert_eq!(composer.classify(&card), Topic::General);
        assert_eq!(
            composer.classify(&Utterance::user("Study of movement")),
            Topic::Biomechanical
        );
    }
}

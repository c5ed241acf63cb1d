//! Staged disclosure of "thinking" steps
//!
//! A reveal is a lazy, finite stream: each label is yielded after a fixed
//! delay, strictly in order. The stream ends early, without yielding, as soon
//! as its cancellation token fires.

use futures::stream::{self, Stream};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default pause before each step
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(400);

pub const DEFAULT_STEPS: [&str; 5] = [
    "📖 Consulting Leonardo's codices...",
    "🔬 Analyzing natural principles...",
    "⚙️ Synthesizing mechanical solutions...",
    "🎨 Applying aesthetic proportions...",
    "💡 Formulating innovative approach...",
];

/// One revealed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    pub index: usize,
    pub label: String,
}

/// Step labels plus pacing
#[derive(Debug, Clone)]
pub struct StagedDisclosure {
    steps: Vec<String>,
    step_delay: Duration,
}

impl StagedDisclosure {
    pub fn new(steps: Vec<String>, step_delay: Duration) -> Self {
        Self { steps, step_delay }
    }

    /// Reveal all steps, or nothing at all when `enabled` is false
    pub fn reveal(
        &self,
        enabled: bool,
        cancel: CancellationToken,
    ) -> impl Stream<Item = RevealStep> + Send + 'static {
        let steps = if enabled { self.steps.clone() } else { Vec::new() };
        let delay = self.step_delay;

        stream::unfold(
            (steps.into_iter().enumerate(), cancel),
            move |(mut pending, cancel)| async move {
                let (index, label) = pending.next()?;
                let cancelled = tokio::select! {
                    biased;

                    () = cancel.cancelled() => true,
                    () = tokio::time::sleep(delay) => false,
                };
                if cancelled {
                    None
                } else {
                    Some((RevealStep { index, label }, (pending, cancel)))
                }
            },
        )
    }
}

impl Default for StagedDisclosure {
    fn default() -> Self {
        Self::new(
            DEFAULT_STEPS.iter().map(|s| (*s).to_string()).collect(),
            DEFAULT_STEP_DELAY,
        )
    }
}

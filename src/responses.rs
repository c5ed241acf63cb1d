//! Canned responses keyed by topic
//!
//! Used whenever the synthesis backend is absent or fails.

use crate::classifier::Topic;
use std::collections::HashMap;

const HYDRAULIC: &str = "Applying Leonardo's observations on fluid dynamics: Water follows the path of least resistance, creating vortices and eddies that can be harnessed. For your portable pump system, consider implementing an Archimedean screw mechanism combined with modern materials. The spiral geometry provides continuous flow with minimal energy input, much like Leonardo's canal lock designs. I've referenced his Codex Atlanticus folios 26v-27r on hydraulic machines. Would you like me to elaborate on the pressure differential calculations or focus on the mechanical design?";

const BIOMECHANICAL: &str = "Leonardo's anatomical studies reveal that human joints operate through an elegant system of levers and pulleys. For your exoskeleton design, I suggest mimicking the natural antagonistic muscle pairs - particularly the biceps-triceps relationship documented in his Windsor anatomical manuscripts. Using tensioned cables running through guides at joint fulcrums can provide both power amplification and natural movement patterns. The key insight from folio 19037r: force multiplication occurs when the artificial 'tendons' attach further from the joint center than natural ones. Shall we explore the load distribution across multiple joints?";

const BIOMEDICAL: &str = "Leonardo's studies of blood flow in the Codex Leicester demonstrate his understanding of circulatory dynamics centuries before Harvey. For your wearable device, consider his observation that blood flow creates specific pressure patterns at arterial branches. Modern piezoelectric sensors placed at these bifurcation points - wrist, carotid, and temporal arteries - can capture rich cardiovascular data. Leonardo's drawings in RL 19073v-19074r show the heart's spiral muscle structure, suggesting rotational flow patterns we can now measure. Would you like specifics on sensor placement or data interpretation algorithms?";

const STRUCTURAL: &str = "Leonardo understood that nature achieves maximum strength with minimum material - his studies of bird bones in Codex on Flight reveal hollow structures with internal struts. For your tensegrity bridge, combine this principle with his force diagram methods from Codex Madrid I. Continuous tension elements (cables) and discontinuous compression elements (struts) create a self-stabilizing structure. Using bamboo for compression members and hemp cables for tension follows his preference for organic materials. Reference his Codex Arundel 263 for geometric proportions. Should we calculate the optimal strut-to-cable ratios?";

const GENERAL: &str = "Your inquiry touches on the intersection of multiple disciplines - precisely where Leonardo's genius thrived. He saw no boundaries between art, science, and engineering. Let me analyze your challenge through his methodology: First, careful observation of natural phenomena; Second, mathematical analysis of underlying principles; Third, innovative mechanical solutions; Fourth, aesthetic refinement. Which aspect would you like to explore first? I can reference specific codices and manuscripts relevant to your particular challenge.";

/// Static topic → text mapping with a guaranteed `general` entry
#[derive(Debug, Clone)]
pub struct ResponseRepository {
    entries: HashMap<Topic, String>,
    general: String,
}

impl ResponseRepository {
    pub fn new(general: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            general: general.into(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, topic: Topic, text: impl Into<String>) -> Self {
        if topic == Topic::General {
            self.general = text.into();
        } else {
            self.entries.insert(topic, text.into());
        }
        self
    }

    /// Text for `topic`, or the general entry when the topic has none
    pub fn lookup(&self, topic: Topic) -> &str {
        self.entries.get(&topic).map_or(&self.general, String::as_str)
    }
}

impl Default for ResponseRepository {
    fn default() -> Self {
        Self::new(GENERAL)
            .with_entry(Topic::Hydraulic, HYDRAULIC)
            .with_entry(Topic::Biomechanical, BIOMECHANICAL)
            .with_entry(Topic::Biomedical, BIOMEDICAL)
            .with_entry(Topic::Structural, STRUCTURAL)
    }
}

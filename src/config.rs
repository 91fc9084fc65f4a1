//! Deck configuration.
//!
//! A deck is a TOML document: window and timing settings, which backdrop
//! canvases exist, and the ordered slides with their elements and triggers.
//! When no file is given, [`DeckConfig::default`] provides the built-in NLP
//! pipeline deck.
//!
//! ```toml
//! start_slide = 0
//!
//! [window]
//! title = "My talk"
//!
//! [[slides]]
//! title = "Process"
//!
//! [[slides.elements]]
//! class = "process-step"
//! text = "Collect"
//!
//! [[slides.triggers]]
//! kind = "stagger"
//! class = "process-step"
//! step_secs = 0.2
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::DeckError;

/// Everything needed to build a presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Slide shown first.
    #[serde(default)]
    pub start_slide: usize,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub chrome: ChromeConfig,
    pub slides: Vec<SlideConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Page background as `#rrggbb`.
    pub background: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "neuroslide".to_string(),
            width: 1280,
            height: 720,
            background: "#0a0e1a".to_string(),
        }
    }
}

/// Transition and gesture timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between the outgoing slide starting to fade and the incoming
    /// slide becoming active.
    pub settle_delay_ms: u64,
    /// How long after settling further navigation stays locked.
    pub unlock_delay_ms: u64,
    /// Minimum horizontal travel for a swipe, in pixels.
    pub swipe_threshold: f64,
    /// Length of an element's reveal animation.
    pub reveal_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            unlock_delay_ms: 500,
            swipe_threshold: 50.0,
            reveal_ms: 600,
        }
    }
}

/// Backdrop canvases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Whether the `neural-canvas` element exists.
    pub neural_canvas: bool,
    /// Whether the `digital-rain` element exists.
    pub rain_canvas: bool,
    pub neural_opacity: f32,
    pub rain_opacity: f32,
    /// Fixed RNG seed for reproducible backdrops.
    pub seed: Option<u64>,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            neural_canvas: true,
            rain_canvas: true,
            neural_opacity: 0.8,
            rain_opacity: 0.15,
            seed: None,
        }
    }
}

/// Navigation chrome around the slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Whether the progress bar element exists.
    pub progress_bar: bool,
    /// Whether the `current/total` counter element exists.
    pub counter: bool,
    /// Accent color as `#rrggbb`.
    pub accent: String,
    /// Body text color as `#rrggbb`.
    pub text: String,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            progress_bar: true,
            counter: true,
            accent: "#64c8ff".to_string(),
            text: "#e6edf7".to_string(),
        }
    }
}

/// One slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideConfig {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
    /// Effects run each time the slide becomes active, in order.
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

/// One element of a slide's markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    /// `data-*` attributes, keyed without the `data-` prefix.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl ElementConfig {
    pub fn new(class: &str, text: &str) -> Self {
        Self {
            class: class.to_string(),
            id: None,
            text: text.to_string(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }
}

/// A presentation-timing side effect run when a slide becomes active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// The i-th element of `class` gets an animation delay of `i * step_secs`.
    Stagger { class: String, step_secs: f64 },
    /// Copy `data-<attribute>` into the custom property `--<property>`.
    Bind {
        class: String,
        attribute: String,
        property: String,
    },
    /// Ramp the text of element `#element` from 0 to `target`.
    Counter {
        element: String,
        target: f64,
        duration_ms: u64,
        interval_ms: u64,
        #[serde(default)]
        suffix: String,
    },
    /// Reset tab buttons and panes: first tab active.
    Tabs,
    /// Clear entity highlighting.
    Highlights,
    /// Start the neural-network backdrop if it is not running.
    NeuralField,
    /// Start the digital-rain backdrop if it is not running.
    DigitalRain,
}

impl Trigger {
    pub fn stagger(class: &str, step_secs: f64) -> Self {
        Trigger::Stagger {
            class: class.to_string(),
            step_secs,
        }
    }

    pub fn bind(class: &str, attribute: &str, property: &str) -> Self {
        Trigger::Bind {
            class: class.to_string(),
            attribute: attribute.to_string(),
            property: property.to_string(),
        }
    }
}

impl DeckConfig {
    /// Load and validate a deck from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, DeckError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a deck from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, DeckError> {
        let deck: DeckConfig = toml::from_str(content)?;
        deck.validate()?;
        Ok(deck)
    }

    /// Render the deck as TOML.
    pub fn to_toml_string(&self) -> Result<String, DeckError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the deck as TOML.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), DeckError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check structural requirements.
    pub fn validate(&self) -> Result<(), DeckError> {
        if self.slides.is_empty() {
            return Err(DeckError::EmptyDeck);
        }
        if self.start_slide >= self.slides.len() {
            return Err(DeckError::StartOutOfRange {
                index: self.start_slide,
                len: self.slides.len(),
            });
        }
        for (slide, config) in self.slides.iter().enumerate() {
            for trigger in &config.triggers {
                if let Trigger::Counter { element, target, .. } = trigger {
                    if !target.is_finite() {
                        return Err(DeckError::CounterTarget {
                            slide,
                            element: element.clone(),
                            target: *target,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for DeckConfig {
    /// The built-in deck: an eight-slide walk through an NLP resume
    /// screening pipeline.
    fn default() -> Self {
        Self {
            start_slide: 0,
            window: WindowConfig {
                title: "Resume Screening with NLP".to_string(),
                ..WindowConfig::default()
            },
            timing: TimingConfig::default(),
            effects: EffectsConfig::default(),
            chrome: ChromeConfig::default(),
            slides: default_slides(),
        }
    }
}

fn default_slides() -> Vec<SlideConfig> {
    let el = ElementConfig::new;
    vec![
        SlideConfig {
            title: "Resume Screening with NLP".to_string(),
            subtitle: Some("Matching candidates to roles, end to end".to_string()),
            elements: vec![el("tagline", "NER + BERT + TF-IDF")],
            triggers: vec![Trigger::NeuralField, Trigger::DigitalRain],
        },
        SlideConfig {
            title: "Project Overview".to_string(),
            subtitle: None,
            elements: vec![
                el("process-step", "1. Parse resumes and job descriptions"),
                el("process-step", "2. Extract entities and skills"),
                el("process-step", "3. Classify job roles"),
                el("process-step", "4. Score resume / JD similarity"),
                el("process-step", "5. Rank candidates"),
            ],
            triggers: vec![Trigger::stagger("process-step", 0.2)],
        },
        SlideConfig {
            title: "Key NLP Terms".to_string(),
            subtitle: None,
            elements: vec![
                el("metric-bar", "Tokenization").with_data("value", "95"),
                el("metric-bar", "Lemmatization").with_data("value", "80"),
                el("metric-bar", "Embeddings").with_data("value", "90"),
                el("metric-bar", "TF-IDF").with_data("value", "75"),
            ],
            triggers: vec![Trigger::bind("metric-bar", "value", "value")],
        },
        SlideConfig {
            title: "Named Entity Recognition".to_string(),
            subtitle: None,
            elements: vec![
                el("highlight-button", "Person").with_data("entity", "PERSON"),
                el("highlight-button", "Org").with_data("entity", "ORG"),
                el("highlight-button", "Skill").with_data("entity", "SKILL"),
                el("ner-token", "Jane").with_data("entity", "PERSON"),
                el("ner-token", "worked"),
                el("ner-token", "at"),
                el("ner-token", "Acme").with_data("entity", "ORG"),
                el("ner-token", "using"),
                el("ner-token", "Python").with_data("entity", "SKILL"),
                el("ner-token", "and"),
                el("ner-token", "SQL").with_data("entity", "SKILL"),
            ],
            triggers: vec![Trigger::stagger("ner-token", 0.1), Trigger::Highlights],
        },
        SlideConfig {
            title: "Job Role Classification".to_string(),
            subtitle: Some("Fine-tuned BERT".to_string()),
            elements: vec![
                el("classification", "Data Scientist").with_data("score", "0.92"),
                el("classification", "ML Engineer").with_data("score", "0.71"),
                el("classification", "Analyst").with_data("score", "0.38"),
                el("chart-bar", "Precision").with_data("value", "88"),
                el("chart-bar", "Recall").with_data("value", "84"),
                el("chart-bar", "F1").with_data("value", "86"),
            ],
            triggers: vec![
                Trigger::bind("classification", "score", "score"),
                Trigger::bind("chart-bar", "value", "value"),
            ],
        },
        SlideConfig {
            title: "Resume & JD Matching".to_string(),
            subtitle: Some("Cosine similarity".to_string()),
            elements: vec![
                el("counter", "0%").with_id("similarity-counter"),
                el("tab-button", "TF-IDF").with_data("tab", "tfidf"),
                el("tab-button", "Embeddings").with_data("tab", "embeddings"),
                el("tab-content", "Sparse term weights").with_data("tab", "tfidf"),
                el("tab-content", "Dense sentence vectors").with_data("tab", "embeddings"),
                el("freq-bar", "python").with_data("freq", "0.8"),
                el("freq-bar", "sql").with_data("freq", "0.6"),
                el("freq-bar", "cloud").with_data("freq", "0.3"),
            ],
            triggers: vec![
                Trigger::Counter {
                    element: "similarity-counter".to_string(),
                    target: 89.0,
                    duration_ms: 2000,
                    interval_ms: 20,
                    suffix: "%".to_string(),
                },
                Trigger::bind("freq-bar", "freq", "freq"),
                Trigger::Tabs,
            ],
        },
        SlideConfig {
            title: "Skills Extraction".to_string(),
            subtitle: None,
            elements: vec![
                el("skill", "Python"),
                el("skill", "Machine Learning"),
                el("skill", "SQL"),
                el("skill", "Communication"),
            ],
            triggers: Vec::new(),
        },
        SlideConfig {
            title: "Pipeline Flow".to_string(),
            subtitle: None,
            elements: vec![
                el("flow-step", "Ingest"),
                el("flow-step", "Extract"),
                el("flow-step", "Classify"),
                el("flow-step", "Match"),
                el("flow-step", "Rank"),
            ],
            triggers: vec![Trigger::stagger("flow-step", 0.2)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deck_is_valid() {
        let deck = DeckConfig::default();
        assert_eq!(deck.slides.len(), 8);
        assert!(deck.validate().is_ok());
        assert_eq!(deck.timing.settle_delay_ms, 50);
        assert_eq!(deck.timing.unlock_delay_ms, 500);
        assert_eq!(deck.timing.swipe_threshold, 50.0);
    }

    #[test]
    fn test_default_deck_survives_toml() {
        let deck = DeckConfig::default();
        let text = deck.to_toml_string().unwrap();
        let parsed = DeckConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, deck);
    }

    #[test]
    fn test_minimal_deck_fills_defaults() {
        let deck = DeckConfig::from_toml_str(
            r#"
            [[slides]]
            title = "Only"
            "#,
        )
        .unwrap();
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.window, WindowConfig::default());
        assert_eq!(deck.timing, TimingConfig::default());
        assert!(deck.slides[0].triggers.is_empty());
    }

    #[test]
    fn test_parse_triggers() {
        let deck = DeckConfig::from_toml_str(
            r#"
            [[slides]]
            title = "Match"

            [[slides.elements]]
            class = "counter"
            id = "score"

            [[slides.elements]]
            class = "freq-bar"
            data = { freq = "0.4" }

            [[slides.triggers]]
            kind = "counter"
            element = "score"
            target = 89
            duration_ms = 2000
            interval_ms = 20

            [[slides.triggers]]
            kind = "bind"
            class = "freq-bar"
            attribute = "freq"
            property = "freq"

            [[slides.triggers]]
            kind = "digital_rain"
            "#,
        )
        .unwrap();
        let slide = &deck.slides[0];
        assert_eq!(slide.elements[1].data["freq"], "0.4");
        assert_eq!(
            slide.triggers[0],
            Trigger::Counter {
                element: "score".to_string(),
                target: 89.0,
                duration_ms: 2000,
                interval_ms: 20,
                suffix: String::new(),
            }
        );
        assert_eq!(slide.triggers[1], Trigger::bind("freq-bar", "freq", "freq"));
        assert_eq!(slide.triggers[2], Trigger::DigitalRain);
    }

    #[test]
    fn test_empty_deck_rejected() {
        let err = DeckConfig::from_toml_str("slides = []").unwrap_err();
        assert!(matches!(err, DeckError::EmptyDeck));
    }

    #[test]
    fn test_start_out_of_range_rejected() {
        let err = DeckConfig::from_toml_str(
            r#"
            start_slide = 3
            [[slides]]
            title = "One"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DeckError::StartOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn test_non_finite_counter_target_rejected() {
        for target in ["nan", "inf", "-inf"] {
            let toml = format!(
                r#"
                [[slides]]
                title = "Numbers"

                [[slides.triggers]]
                kind = "counter"
                element = "total"
                target = {}
                duration_ms = 100
                interval_ms = 10
                suffix = "%"
                "#,
                target
            );
            let err = DeckConfig::from_toml_str(&toml).unwrap_err();
            assert!(
                matches!(err, DeckError::CounterTarget { slide: 0, ref element, .. } if element == "total"),
                "{} accepted",
                target
            );
        }
    }

    #[test]
    fn test_missing_slides_is_parse_error() {
        let err = DeckConfig::from_toml_str("start_slide = 0").unwrap_err();
        assert!(matches!(err, DeckError::Parse(_)));
    }
}

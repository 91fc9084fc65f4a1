//! The live document the presentation mutates.
//!
//! Each slide's elements carry their class, optional id, text, `data-*`
//! attributes, an inline style (animation delay and custom properties) and a
//! set of state classes such as `active` or `highlight`. Triggers write into
//! this model; the view reads from it.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{DeckConfig, ElementConfig};

/// State class for the selected tab button and its pane.
pub const ACTIVE: &str = "active";
/// State class for an entity-highlighted token.
pub const HIGHLIGHT: &str = "highlight";

pub const TAB_BUTTON: &str = "tab-button";
pub const TAB_CONTENT: &str = "tab-content";
pub const HIGHLIGHT_BUTTON: &str = "highlight-button";
pub const NER_TOKEN: &str = "ner-token";

/// Inline style written by triggers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    /// Entrance animation delay in seconds.
    pub animation_delay: Option<f64>,
    /// Custom properties, keyed without the leading `--`.
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub class: String,
    pub id: Option<String>,
    pub text: String,
    pub data: BTreeMap<String, String>,
    pub style: InlineStyle,
    pub state: BTreeSet<String>,
}

impl Element {
    fn from_config(config: &ElementConfig) -> Self {
        Self {
            class: config.class.clone(),
            id: config.id.clone(),
            text: config.text.clone(),
            data: config.data.clone(),
            style: InlineStyle::default(),
            state: BTreeSet::new(),
        }
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.style.properties.get(name).map(String::as_str)
    }

    /// A custom property read as a number. Missing or non-numeric values
    /// yield `None`.
    pub fn numeric_property(&self, name: &str) -> Option<f64> {
        self.property(name)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    pub fn has_state(&self, class: &str) -> bool {
        self.state.contains(class)
    }

    pub fn set_state(&mut self, class: &str, on: bool) {
        if on {
            self.state.insert(class.to_string());
        } else {
            self.state.remove(class);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageSlide {
    pub title: String,
    pub subtitle: Option<String>,
    pub elements: Vec<Element>,
    /// When the slide last became active, in presentation milliseconds.
    /// Entrance animations run relative to this.
    pub entered_at_ms: Option<u64>,
}

impl StageSlide {
    pub fn by_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.class == class)
    }

    pub fn by_class_mut<'a>(
        &'a mut self,
        class: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.elements.iter_mut().filter(move |e| e.class == class)
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id.as_deref() == Some(id))
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id.as_deref() == Some(id))
    }
}

/// Progress bar and slide counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Chrome {
    /// Bar fill in `[0, 1]`; `None` when the bar element is absent.
    pub progress: Option<f32>,
    /// `current/total` text; `None` when the counter element is absent.
    pub counter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    slides: Vec<StageSlide>,
    pub chrome: Chrome,
}

impl Stage {
    pub fn from_config(config: &DeckConfig) -> Self {
        let slides = config
            .slides
            .iter()
            .map(|s| StageSlide {
                title: s.title.clone(),
                subtitle: s.subtitle.clone(),
                elements: s.elements.iter().map(Element::from_config).collect(),
                entered_at_ms: None,
            })
            .collect();
        Self {
            slides,
            chrome: Chrome {
                progress: config.chrome.progress_bar.then_some(0.0),
                counter: config.chrome.counter.then(String::new),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide(&self, index: usize) -> Option<&StageSlide> {
        self.slides.get(index)
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut StageSlide> {
        self.slides.get_mut(index)
    }

    /// Update whichever of the progress bar and counter exist.
    pub fn set_progress(&mut self, fraction: f32, label: String) {
        if let Some(progress) = self.chrome.progress.as_mut() {
            *progress = fraction;
        }
        if let Some(counter) = self.chrome.counter.as_mut() {
            *counter = label;
        }
    }

    /// Make the tab button and pane whose `data-tab` equals `tab` the only
    /// active ones on `slide`. Returns false if no button matches.
    pub fn select_tab(&mut self, slide: usize, tab: &str) -> bool {
        let Some(slide) = self.slides.get_mut(slide) else {
            return false;
        };
        if !slide.by_class(TAB_BUTTON).any(|b| b.data("tab") == Some(tab)) {
            return false;
        }
        for el in slide.elements.iter_mut() {
            if el.class == TAB_BUTTON || el.class == TAB_CONTENT {
                let on = el.data("tab") == Some(tab);
                el.set_state(ACTIVE, on);
            }
        }
        true
    }

    /// Select the first tab button's tab, or clear all if there is none.
    pub fn reset_tabs(&mut self, slide: usize) {
        let first = self
            .slides
            .get(slide)
            .and_then(|s| s.by_class(TAB_BUTTON).next())
            .and_then(|b| b.data("tab"))
            .map(str::to_string);
        match first {
            Some(tab) => {
                self.select_tab(slide, &tab);
            }
            None => {
                if let Some(s) = self.slides.get_mut(slide) {
                    for el in s.elements.iter_mut() {
                        if el.class == TAB_BUTTON || el.class == TAB_CONTENT {
                            el.set_state(ACTIVE, false);
                        }
                    }
                }
            }
        }
    }

    /// Toggle highlighting of tokens tagged `entity`.
    ///
    /// Choosing the entity that is already highlighted clears everything;
    /// choosing another one moves the highlight there. Returns the entity
    /// now highlighted, if any, or `None` when the slide has no button for
    /// `entity` and nothing changed.
    pub fn toggle_highlight(&mut self, slide: usize, entity: &str) -> Option<Option<String>> {
        let s = self.slides.get_mut(slide)?;
        if !s
            .by_class(HIGHLIGHT_BUTTON)
            .any(|b| b.data("entity") == Some(entity))
        {
            return None;
        }
        let already = s
            .by_class(HIGHLIGHT_BUTTON)
            .any(|b| b.data("entity") == Some(entity) && b.has_state(ACTIVE));
        let chosen = if already { None } else { Some(entity) };
        for el in s.elements.iter_mut() {
            if el.class == HIGHLIGHT_BUTTON || el.class == NER_TOKEN {
                let on = chosen.is_some() && el.data("entity") == chosen;
                let class = if el.class == NER_TOKEN { HIGHLIGHT } else { ACTIVE };
                el.set_state(class, on);
            }
        }
        Some(chosen.map(str::to_string))
    }

    /// Remove all entity highlighting on `slide`.
    pub fn clear_highlights(&mut self, slide: usize) {
        if let Some(s) = self.slides.get_mut(slide) {
            for el in s.elements.iter_mut() {
                if el.class == HIGHLIGHT_BUTTON {
                    el.set_state(ACTIVE, false);
                } else if el.class == NER_TOKEN {
                    el.set_state(HIGHLIGHT, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NER: usize = 3;
    const MATCHING: usize = 5;

    fn stage() -> Stage {
        Stage::from_config(&DeckConfig::default())
    }

    fn active_tabs(stage: &Stage, slide: usize) -> Vec<(String, String)> {
        stage
            .slide(slide)
            .unwrap()
            .elements
            .iter()
            .filter(|e| e.has_state(ACTIVE))
            .map(|e| (e.class.clone(), e.data("tab").unwrap_or("").to_string()))
            .collect()
    }

    #[test]
    fn test_from_config_copies_markup() {
        let stage = stage();
        assert_eq!(stage.len(), 8);
        let slide = stage.slide(MATCHING).unwrap();
        assert!(slide.by_id("similarity-counter").is_some());
        assert_eq!(slide.by_class("freq-bar").count(), 3);
        assert_eq!(stage.chrome.progress, Some(0.0));
    }

    #[test]
    fn test_select_tab_is_exclusive() {
        let mut stage = stage();
        assert!(stage.select_tab(MATCHING, "embeddings"));
        assert_eq!(
            active_tabs(&stage, MATCHING),
            vec![
                ("tab-button".to_string(), "embeddings".to_string()),
                ("tab-content".to_string(), "embeddings".to_string()),
            ]
        );
        assert!(!stage.select_tab(MATCHING, "missing"));
        assert_eq!(active_tabs(&stage, MATCHING).len(), 2);
    }

    #[test]
    fn test_reset_tabs_selects_first() {
        let mut stage = stage();
        stage.select_tab(MATCHING, "embeddings");
        stage.reset_tabs(MATCHING);
        assert!(active_tabs(&stage, MATCHING)
            .iter()
            .all(|(_, tab)| tab == "tfidf"));
    }

    #[test]
    fn test_toggle_highlight() {
        let mut stage = stage();
        assert_eq!(stage.toggle_highlight(NER, "SKILL"), Some(Some("SKILL".to_string())));
        let lit: Vec<_> = stage
            .slide(NER)
            .unwrap()
            .by_class(NER_TOKEN)
            .filter(|t| t.has_state(HIGHLIGHT))
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(lit, vec!["Python", "SQL"]);

        assert_eq!(stage.toggle_highlight(NER, "ORG"), Some(Some("ORG".to_string())));
        assert_eq!(stage.toggle_highlight(NER, "ORG"), Some(None));
        assert!(stage
            .slide(NER)
            .unwrap()
            .elements
            .iter()
            .all(|e| !e.has_state(HIGHLIGHT) && !e.has_state(ACTIVE)));
    }

    #[test]
    fn test_toggle_unknown_entity_changes_nothing() {
        let mut stage = stage();
        stage.toggle_highlight(NER, "ORG");
        assert_eq!(stage.toggle_highlight(NER, "NOPE"), None);
        assert_eq!(stage.toggle_highlight(0, "ORG"), None);
        let lit = stage
            .slide(NER)
            .unwrap()
            .by_class(NER_TOKEN)
            .filter(|t| t.has_state(HIGHLIGHT))
            .count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_clear_highlights() {
        let mut stage = stage();
        stage.toggle_highlight(NER, "PERSON");
        stage.clear_highlights(NER);
        assert!(stage
            .slide(NER)
            .unwrap()
            .by_class(NER_TOKEN)
            .all(|t| !t.has_state(HIGHLIGHT)));
    }

    #[test]
    fn test_numeric_property() {
        let mut el = Element::from_config(&ElementConfig::new("metric-bar", "x"));
        assert_eq!(el.numeric_property("value"), None);
        el.style.properties.insert("value".into(), "85".into());
        assert_eq!(el.numeric_property("value"), Some(85.0));
        el.style.properties.insert("value".into(), "wide".into());
        assert_eq!(el.numeric_property("value"), None);
    }

    #[test]
    fn test_missing_chrome_ignores_progress() {
        let mut config = DeckConfig::default();
        config.chrome.progress_bar = false;
        config.chrome.counter = false;
        let mut stage = Stage::from_config(&config);
        stage.set_progress(0.5, "4/8".into());
        assert_eq!(stage.chrome.progress, None);
        assert_eq!(stage.chrome.counter, None);
    }
}

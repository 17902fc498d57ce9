// WHY: Default scanner for the spacing pass, one regex-automata pattern per rule
// Rules match a whole word between two separators; the pattern id selects the event

use std::io;
use std::sync::OnceLock;

use regex_automata::meta::{BuildError, Regex};
use regex_automata::Input;
use tracing::debug;

use super::{SpaceAnnotator, SpaceEvent, SpaceMatch};

/// A single spacing rule; `pattern` matches the word itself, without separators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceRule {
    pub pattern: String,
    pub event: SpaceEvent,
}

impl SpaceRule {
    pub fn new(pattern: impl Into<String>, event: SpaceEvent) -> Self {
        Self {
            pattern: pattern.into(),
            event,
        }
    }
}

/// Typographic conventions the built-in rules distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    /// English and languages without special conventions
    Default,
    /// Elided articles attach to the next word (`l'`, `dell'`)
    Romance,
    /// Romance elision plus spaces kept around `; : ! ? « »`
    French,
}

impl RuleSet {
    pub fn for_language(language: &str) -> Self {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "fr" => RuleSet::French,
            "it" | "ca" | "pt" | "oc" => RuleSet::Romance,
            _ => RuleSet::Default,
        }
    }

    pub fn rules(self) -> Vec<SpaceRule> {
        let mut rules = Vec::new();

        match self {
            RuleSet::French => {
                rules.push(SpaceRule::new(r"[.,%)\]}\u{2026}]+", SpaceEvent::RemoveLeft));
                rules.push(SpaceRule::new(r"[(\[{\u{201C}\u{BF}\u{A1}]", SpaceEvent::RemoveRight));
            }
            RuleSet::Default | RuleSet::Romance => {
                rules.push(SpaceRule::new(
                    r"[.,;:!?%)\]}\u{BB}\u{201D}\u{2026}]+",
                    SpaceEvent::RemoveLeft,
                ));
                rules.push(SpaceRule::new(
                    r"[(\[{\u{AB}\u{201C}\u{BF}\u{A1}$\u{20AC}\u{A3}#]",
                    SpaceEvent::RemoveRight,
                ));
            }
        }

        match self {
            RuleSet::Default => {
                rules.push(SpaceRule::new(
                    r"(?i:['\u{2019}](?:s|re|ve|ll|d|m|t)|n['\u{2019}]t)",
                    SpaceEvent::RemoveLeft,
                ));
            }
            RuleSet::Romance | RuleSet::French => {
                rules.push(SpaceRule::new(
                    r"(?i:(?:[cdjlmnst]|qu|un|all|dell|dall|nell|sull)['\u{2019}])",
                    SpaceEvent::RemoveRight,
                ));
            }
        }

        rules.push(SpaceRule::new(r"[/@]", SpaceEvent::RemoveBoth));
        rules
    }
}

#[derive(Debug, Clone)]
struct CompiledRules {
    regex: Regex,
    events: Vec<SpaceEvent>,
}

impl CompiledRules {
    fn compile(rules: &[SpaceRule]) -> Result<Self, BuildError> {
        let patterns: Vec<String> = rules.iter().map(|r| format!(" (?:{}) ", r.pattern)).collect();
        let regex = Regex::new_many(&patterns)?;
        debug!("Compiled {} spacing rules", patterns.len());

        Ok(Self {
            regex,
            events: rules.iter().map(|r| r.event).collect(),
        })
    }

    fn builtin(set: RuleSet) -> &'static CompiledRules {
        static DEFAULT: OnceLock<CompiledRules> = OnceLock::new();
        static ROMANCE: OnceLock<CompiledRules> = OnceLock::new();
        static FRENCH: OnceLock<CompiledRules> = OnceLock::new();

        let cell = match set {
            RuleSet::Default => &DEFAULT,
            RuleSet::Romance => &ROMANCE,
            RuleSet::French => &FRENCH,
        };
        cell.get_or_init(|| Self::compile(&set.rules()).expect("built-in spacing rules are valid"))
    }
}

/// Space annotator backed by a multi-pattern regex
#[derive(Debug, Clone)]
pub struct RuleSpaceAnnotator {
    rules: CompiledRules,
    text: String,
    cursor: usize,
}

impl RuleSpaceAnnotator {
    /// Compile custom rules
    pub fn new(rules: &[SpaceRule]) -> Result<Self, BuildError> {
        Ok(Self::with_rules(CompiledRules::compile(rules)?))
    }

    /// Built-in rules for a BCP-47-like language code such as `en` or `fr-CA`
    pub fn for_language(language: &str) -> Self {
        let set = RuleSet::for_language(language);
        Self::with_rules(CompiledRules::builtin(set).clone())
    }

    fn with_rules(rules: CompiledRules) -> Self {
        Self {
            rules,
            text: String::new(),
            cursor: 0,
        }
    }
}

impl Default for RuleSpaceAnnotator {
    fn default() -> Self {
        Self::for_language("en")
    }
}

impl SpaceAnnotator for RuleSpaceAnnotator {
    fn reset(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = 0;
    }

    fn next(&mut self) -> io::Result<Option<SpaceMatch>> {
        if self.cursor >= self.text.len() {
            return Ok(None);
        }

        let input = Input::new(&self.text).range(self.cursor..);
        let Some(found) = self.rules.regex.find(input) else {
            self.cursor = self.text.len();
            return Ok(None);
        };

        // Resume on the trailing separator so it can open the next match
        self.cursor = found.end() - 1;

        let event = self
            .rules
            .events
            .get(found.pattern().as_usize())
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown spacing rule"))?;

        Ok(Some(SpaceMatch {
            start: found.start(),
            end: found.end(),
            event,
        }))
    }
}

//! Generation parameters for a social story.
//!
//! Parameters are immutable per generation request. Scenario parsing never
//! fails: unknown scenario strings are kept verbatim so that stored stories
//! round-trip unchanged, and every lookup table treats them like the generic
//! scenario.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Youngest supported reader age.
pub const MIN_AGE: u8 = 3;

/// Oldest supported reader age.
pub const MAX_AGE: u8 = 18;

/// Errors from parameter parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("Age {0} is outside the supported range 3-18")]
    AgeOutOfRange(u8),

    #[error("Invalid age: {0}")]
    InvalidAge(String),

    #[error("Unknown language level: {0} (expected simple, intermediate or advanced)")]
    UnknownLanguageLevel(String),
}

/// The situation a story prepares the child for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scenario {
    School,
    Doctor,
    Playground,
    Shopping,
    Restaurant,
    Birthday,
    Haircut,
    Dentist,
    Library,
    Other,
    /// A scenario string outside the fixed set, kept as given.
    Unrecognized(String),
}

impl Scenario {
    /// The fixed, recognized scenarios in display order.
    pub const ALL: [Scenario; 10] = [
        Scenario::School,
        Scenario::Doctor,
        Scenario::Playground,
        Scenario::Shopping,
        Scenario::Restaurant,
        Scenario::Birthday,
        Scenario::Haircut,
        Scenario::Dentist,
        Scenario::Library,
        Scenario::Other,
    ];

    /// Parse a scenario key. Unknown keys become [`Scenario::Unrecognized`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "school" => Scenario::School,
            "doctor" => Scenario::Doctor,
            "playground" => Scenario::Playground,
            "shopping" => Scenario::Shopping,
            "restaurant" => Scenario::Restaurant,
            "birthday" => Scenario::Birthday,
            "haircut" => Scenario::Haircut,
            "dentist" => Scenario::Dentist,
            "library" => Scenario::Library,
            "other" => Scenario::Other,
            _ => Scenario::Unrecognized(s.to_string()),
        }
    }

    /// Stable key used in persisted data and file names.
    pub fn key(&self) -> &str {
        match self {
            Scenario::School => "school",
            Scenario::Doctor => "doctor",
            Scenario::Playground => "playground",
            Scenario::Shopping => "shopping",
            Scenario::Restaurant => "restaurant",
            Scenario::Birthday => "birthday",
            Scenario::Haircut => "haircut",
            Scenario::Dentist => "dentist",
            Scenario::Library => "library",
            Scenario::Other => "other",
            Scenario::Unrecognized(raw) => raw,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Scenario::School => "School",
            Scenario::Doctor => "Doctor Visit",
            Scenario::Playground => "Playground",
            Scenario::Shopping => "Shopping",
            Scenario::Restaurant => "Restaurant",
            Scenario::Birthday => "Birthday Party",
            Scenario::Haircut => "Haircut",
            Scenario::Dentist => "Dentist Visit",
            Scenario::Library => "Library",
            Scenario::Other => "Other",
            Scenario::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Scenario::Unrecognized(_))
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::School
    }
}

impl From<String> for Scenario {
    fn from(s: String) -> Self {
        Scenario::parse(&s)
    }
}

impl From<&str> for Scenario {
    fn from(s: &str) -> Self {
        Scenario::parse(s)
    }
}

impl From<Scenario> for String {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Unrecognized(raw) => raw,
            other => other.key().to_string(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Complexity tier for story text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    #[default]
    Simple,
    Intermediate,
    Advanced,
}

impl LanguageLevel {
    pub const ALL: [LanguageLevel; 3] = [
        LanguageLevel::Simple,
        LanguageLevel::Intermediate,
        LanguageLevel::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LanguageLevel::Simple => "simple",
            LanguageLevel::Intermediate => "intermediate",
            LanguageLevel::Advanced => "advanced",
        }
    }

    /// Label with the age band the level is meant for.
    pub fn label(self) -> &'static str {
        match self {
            LanguageLevel::Simple => "Simple (3-5 years)",
            LanguageLevel::Intermediate => "Intermediate (6-8 years)",
            LanguageLevel::Advanced => "Advanced (9+ years)",
        }
    }
}

impl FromStr for LanguageLevel {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(LanguageLevel::Simple),
            "intermediate" => Ok(LanguageLevel::Intermediate),
            "advanced" => Ok(LanguageLevel::Advanced),
            other => Err(ParamsError::UnknownLanguageLevel(other.to_string())),
        }
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an age string and check it against the supported range.
pub fn parse_age(s: &str) -> Result<u8, ParamsError> {
    let age: u8 = s
        .trim()
        .parse()
        .map_err(|_| ParamsError::InvalidAge(s.to_string()))?;
    check_age(age)?;
    Ok(age)
}

fn check_age(age: u8) -> Result<(), ParamsError> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(())
    } else {
        Err(ParamsError::AgeOutOfRange(age))
    }
}

/// Everything a story is generated from.
///
/// Field names on the wire follow the stored-history format
/// (`languageLevel`, `childName`, `customDetails`, `specificConcerns`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub scenario: Scenario,

    pub age: u8,

    pub language_level: LanguageLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,

    /// Free-text additional context.
    #[serde(
        default,
        rename = "customDetails",
        skip_serializing_if = "Option::is_none"
    )]
    pub context: Option<String>,

    /// Free-text concerns or goals.
    #[serde(
        default,
        rename = "specificConcerns",
        skip_serializing_if = "Option::is_none"
    )]
    pub concerns: Option<String>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self::new(Scenario::School, 5, LanguageLevel::Simple)
    }
}

impl GenerationParameters {
    pub fn new(scenario: impl Into<Scenario>, age: u8, language_level: LanguageLevel) -> Self {
        Self {
            scenario: scenario.into(),
            age,
            language_level,
            child_name: None,
            context: None,
            concerns: None,
        }
    }

    /// Set the child's name. Blank names are ignored.
    pub fn with_child_name(mut self, name: impl Into<String>) -> Self {
        self.child_name = non_blank(name.into());
        self
    }

    /// Set free-text context. Blank text is ignored.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = non_blank(context.into());
        self
    }

    /// Set free-text concerns. Blank text is ignored.
    pub fn with_concerns(mut self, concerns: impl Into<String>) -> Self {
        self.concerns = non_blank(concerns.into());
        self
    }

    pub fn child_name(&self) -> Option<&str> {
        non_blank_ref(&self.child_name)
    }

    pub fn context(&self) -> Option<&str> {
        non_blank_ref(&self.context)
    }

    pub fn concerns(&self) -> Option<&str> {
        non_blank_ref(&self.concerns)
    }

    /// Check the age range. Generation itself never requires this.
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_age(self.age)
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn non_blank_ref(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}

//! Stories and their pages.

use crate::params::{GenerationParameters, Scenario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Separator placed between pages when content is reassembled.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Number of characters shown in a history preview.
pub const PREVIEW_CHARS: usize = 100;

/// A generated social story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,

    pub created_at: DateTime<Utc>,

    #[serde(rename = "formData")]
    pub params: GenerationParameters,

    pub content: String,

    /// The text came from the fallback templates rather than the remote service.
    #[serde(default, rename = "isMock")]
    pub is_fallback: bool,
}

impl Story {
    /// Create a story with a fresh identifier and the current time.
    pub fn new(params: GenerationParameters, content: impl Into<String>, is_fallback: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            params,
            content: content.into(),
            is_fallback,
        }
    }

    /// Replace the whole text of the story.
    pub fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Split the content into pages.
    pub fn pages(&self) -> Vec<String> {
        split_pages(&self.content)
    }

    /// Display title, e.g. "School Story".
    pub fn title(&self) -> String {
        match &self.params.scenario {
            Scenario::Other => "Social Story".to_string(),
            scenario => format!("{} Story", capitalize(scenario.key())),
        }
    }

    /// "for <name>" when the story was written for a named child.
    pub fn subtitle(&self) -> Option<String> {
        self.params
            .child_name()
            .map(|name| format!("for {}", name.trim()))
    }

    /// The first characters of the content, with an ellipsis when truncated.
    pub fn preview(&self) -> String {
        if self.content.chars().count() > PREVIEW_CHARS {
            let truncated: String = self.content.chars().take(PREVIEW_CHARS).collect();
            format!("{truncated}...")
        } else {
            self.content.clone()
        }
    }

    /// File name used when exporting the story as plain text.
    pub fn export_file_name(&self) -> String {
        let scenario = sanitize(self.params.scenario.key());
        let scenario = if scenario.is_empty() {
            "story".to_string()
        } else {
            scenario
        };
        format!(
            "social-story-{scenario}-{}.txt",
            self.created_at.timestamp_millis()
        )
    }

    /// Write the content as a text file into `dir` and return its path.
    pub async fn export_text(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        let path = dir.join(self.export_file_name());
        fs::write(&path, &self.content).await?;
        Ok(path)
    }
}

/// Split text into pages on blank-line boundaries.
///
/// Runs of two or more newlines separate pages; pages that are empty or
/// whitespace-only are dropped.
pub fn split_pages(content: &str) -> Vec<String> {
    content
        .split(PAGE_SEPARATOR)
        .map(|piece| piece.trim_start_matches('\n'))
        .filter(|piece| !piece.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Reassemble pages into content.
pub fn join_pages(pages: &[String]) -> String {
    pages.join(PAGE_SEPARATOR)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sanitize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LanguageLevel;

    fn story(content: &str) -> Story {
        Story::new(GenerationParameters::default(), content, false)
    }

    #[test]
    fn test_split_on_blank_lines() {
        let pages = split_pages("Title\n\nFirst page.\nStill first.\n\n\n\nSecond page.");
        assert_eq!(pages, vec!["Title", "First page.\nStill first.", "Second page."]);
    }

    #[test]
    fn test_split_odd_newline_runs() {
        assert_eq!(split_pages("a\n\n\nb"), vec!["a", "b"]);
        assert_eq!(split_pages("a\n\n\n\n\nb\n\n\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_drops_blank_pages() {
        assert!(split_pages("").is_empty());
        assert!(split_pages("\n\n   \n\n").is_empty());
        assert_eq!(split_pages("\n\nOnly page\n\n"), vec!["Only page"]);
    }

    #[test]
    fn test_pages_rejoin_to_content() {
        let content = crate::fallback::fallback_story(
            &GenerationParameters::new("school", 5, LanguageLevel::Simple)
                .with_concerns("loud, worry, change, share"),
        );
        assert_eq!(join_pages(&split_pages(&content)), content);
    }

    #[test]
    fn test_title_and_subtitle() {
        let mut s = story("text");
        assert_eq!(s.title(), "School Story");
        assert_eq!(s.subtitle(), None);

        s.params = GenerationParameters::new("other", 5, LanguageLevel::Simple).with_child_name("Sam");
        assert_eq!(s.title(), "Social Story");
        assert_eq!(s.subtitle().as_deref(), Some("for Sam"));

        s.params.scenario = Scenario::parse("zoo");
        assert_eq!(s.title(), "Zoo Story");
    }

    #[test]
    fn test_preview() {
        assert_eq!(story("short").preview(), "short");

        let long = "é".repeat(150);
        let preview = story(&long).preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_replace_content_keeps_identity() {
        let mut s = story("old");
        let id = s.id.clone();
        s.replace_content("new");
        assert_eq!(s.content, "new");
        assert_eq!(s.id, id);
    }

    #[test]
    fn test_export_file_name() {
        let mut s = story("text");
        let name = s.export_file_name();
        assert!(name.starts_with("social-story-school-"));
        assert!(name.ends_with(".txt"));

        s.params.scenario = Scenario::parse("Zoo Trip!");
        assert!(s.export_file_name().starts_with("social-story-zoo-trip--"));
    }

    #[test]
    fn test_json_field_names() {
        let s = Story::new(GenerationParameters::default(), "text", true);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["formData"]["scenario"], "school");
        assert_eq!(json["isMock"], true);

        let back: Story = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_missing_fallback_flag_defaults_false() {
        let json = serde_json::json!({
            "id": "1700000000000",
            "createdAt": "2024-01-01T10:00:00Z",
            "formData": {"scenario": "school", "age": 5, "languageLevel": "simple"},
            "content": "Hello"
        });
        let s: Story = serde_json::from_value(json).unwrap();
        assert!(!s.is_fallback);
    }

    #[tokio::test]
    async fn test_export_text() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let s = story("My School Day\n\nHello.");

        let path = s.export_text(dir.path().join("exports")).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), s.content);
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            s.export_file_name()
        );
    }
}

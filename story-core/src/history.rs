//! Bounded, most-recent-first story history.

use crate::story::Story;
use serde::{Deserialize, Serialize};

/// Maximum number of stories kept.
pub const HISTORY_CAPACITY: usize = 10;

/// The saved stories, newest first, never more than [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryHistory {
    stories: Vec<Story>,
}

impl StoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored stories, dropping anything past capacity.
    pub fn from_stories(mut stories: Vec<Story>) -> Self {
        stories.truncate(HISTORY_CAPACITY);
        Self { stories }
    }

    /// Add a freshly generated story at the front.
    pub fn record(&mut self, story: Story) {
        self.stories.insert(0, story);
        self.stories.truncate(HISTORY_CAPACITY);
    }

    /// Save an edited story.
    ///
    /// Replaces the entry with the same id in place. A story that is not
    /// present is recorded at the front.
    pub fn save(&mut self, story: Story) {
        match self.stories.iter_mut().find(|s| s.id == story.id) {
            Some(existing) => *existing = story,
            None => self.record(story),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    /// Remove a story by id, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Story> {
        let pos = self.stories.iter().position(|s| s.id == id)?;
        Some(self.stories.remove(pos))
    }

    /// The newest story.
    pub fn latest(&self) -> Option<&Story> {
        self.stories.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter()
    }

    pub fn as_slice(&self) -> &[Story] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GenerationParameters;

    fn story(content: &str) -> Story {
        Story::new(GenerationParameters::default(), content, false)
    }

    #[test]
    fn test_record_newest_first() {
        let mut history = StoryHistory::new();
        history.record(story("first"));
        history.record(story("second"));

        let contents: Vec<_> = history.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);
        assert_eq!(history.latest().unwrap().content, "second");
    }

    #[test]
    fn test_eleventh_story_evicts_oldest() {
        let mut history = StoryHistory::new();
        let oldest = story("0");
        let oldest_id = oldest.id.clone();
        history.record(oldest);
        for i in 1..=HISTORY_CAPACITY {
            history.record(story(&i.to_string()));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert!(history.get(&oldest_id).is_none());
        let order: Vec<&str> = history.iter().map(|s| s.content.as_str()).collect();
        let expected: Vec<String> = (1..=HISTORY_CAPACITY).rev().map(|i| i.to_string()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_save_replaces_in_place() {
        let mut history = StoryHistory::new();
        let a = story("a");
        let b = story("b");
        let mut edited = a.clone();
        history.record(a);
        history.record(b);

        edited.replace_content("a, edited");
        history.save(edited.clone());

        assert_eq!(history.len(), 2);
        assert_eq!(history.as_slice()[1], edited);
        assert_eq!(history.as_slice()[0].content, "b");
    }

    #[test]
    fn test_save_unknown_id_inserts() {
        let mut history = StoryHistory::new();
        history.record(story("a"));
        history.save(story("new"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().content, "new");
    }

    #[test]
    fn test_remove() {
        let mut history = StoryHistory::new();
        let s = story("gone");
        let id = s.id.clone();
        history.record(s);

        assert_eq!(history.remove(&id).map(|s| s.content), Some("gone".to_string()));
        assert!(history.remove(&id).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_stories_truncates() {
        let stories = (0..15).map(|i| story(&i.to_string())).collect();
        let history = StoryHistory::from_stories(stories);
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.latest().unwrap().content, "0");
    }

    #[test]
    fn test_serializes_as_array() {
        let mut history = StoryHistory::new();
        history.record(story("hello"));
        let json = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["content"], "hello");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trending-topic candidate gathered from one search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub query: String,
    pub title: String,
    pub snippet: String,
}

impl Topic {
    pub fn new(
        query: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// One record of a past run, as persisted in the history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub topic_title: String,
    pub post_text: String,
    pub posted: bool,
}

/// The drafted post for this run. Produced once by the generator,
/// consumed by the publisher.
#[derive(Debug, Clone)]
pub struct GeneratedPost {
    pub chosen_topic: Topic,
    pub body: String,
    pub hashtags: Vec<String>,
}

impl GeneratedPost {
    /// Final post text: the body, a blank line, then the hashtags.
    pub fn render(&self) -> String {
        if self.hashtags.is_empty() {
            self.body.trim().to_string()
        } else {
            format!("{}\n\n{}", self.body.trim(), self.hashtags.join(" "))
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Live post accepted by the network.
    Published { post_id: String },
    /// Dry run: the post was drafted and previewed, nothing submitted.
    Previewed(GeneratedPost),
    /// Every candidate matched a recent history entry; nothing to post.
    NoNovelTopics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_body_and_hashtags() {
        let post = GeneratedPost {
            chosen_topic: Topic::new("q", "Title", ""),
            body: "Shipping a new screen this week.\n".to_string(),
            hashtags: vec!["#AndroidDev".to_string(), "#Kotlin".to_string()],
        };

        assert_eq!(
            post.render(),
            "Shipping a new screen this week.\n\n#AndroidDev #Kotlin"
        );
    }

    #[test]
    fn test_render_without_hashtags() {
        let post = GeneratedPost {
            chosen_topic: Topic::new("q", "Title", ""),
            body: "  Just the body.  ".to_string(),
            hashtags: vec![],
        };

        assert_eq!(post.render(), "Just the body.");
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::error::PipelineError;
use crate::models::Topic;

const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SNIPPET_MAX_BYTES: usize = 200;

/// Source of trending-topic candidates for one query string.
#[async_trait]
pub trait TopicSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Topic>, PipelineError>;
}

/// Google News RSS search client.
pub struct GoogleNewsClient {
    client: Client,
}

impl GoogleNewsClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TopicSource for GoogleNewsClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Topic>, PipelineError> {
        let url = format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            GOOGLE_NEWS_RSS,
            urlencoding::encode(query)
        );

        let failed = |reason: String| PipelineError::SearchFailed {
            query: query.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("Google News returned status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let channel = rss::Channel::read_from(&body[..])
            .map_err(|e| failed(format!("failed to parse RSS feed: {}", e)))?;

        Ok(parse_channel(&channel, query, limit))
    }
}

/// Convert feed items into topics. Items without a title are skipped.
fn parse_channel(channel: &rss::Channel, query: &str, limit: usize) -> Vec<Topic> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = strip_source_suffix(item.title()?);
            if title.is_empty() {
                return None;
            }

            let snippet = item.description().map(clean_snippet).unwrap_or_default();

            Some(Topic::new(query, title, snippet))
        })
        .take(limit)
        .collect()
}

/// Google News titles carry a trailing `" - Source"` attribution.
fn strip_source_suffix(title: &str) -> String {
    match title.rfind(" - ") {
        Some(pos) => title[..pos].trim().to_string(),
        None => title.trim().to_string(),
    }
}

/// Feed descriptions are HTML fragments; reduce them to one short line
/// of plain text.
fn clean_snippet(html: &str) -> String {
    let text = html2text::from_read(html.as_bytes(), 200);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_utf8(&collapsed, SNIPPET_MAX_BYTES).to_string()
}

/// Truncate to at most `max_bytes`, respecting UTF-8 boundaries.
fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"kotlin" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>Kotlin 2.1 brings context parameters - Android Weekly</title>
      <link>https://example.com/kotlin-2-1</link>
      <description>&lt;a href="https://example.com/kotlin-2-1"&gt;Kotlin 2.1 brings context parameters&lt;/a&gt;</description>
      <pubDate>Mon, 03 Aug 2026 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Jetpack Compose 1.8 stable - Android Developers Blog</title>
      <link>https://example.com/compose-1-8</link>
      <description>Compose 1.8 is now stable with shared element transitions</description>
    </item>
    <item>
      <title>Untitled story without attribution</title>
      <link>https://example.com/untitled</link>
    </item>
  </channel>
</rss>"#;

    fn fixture_channel() -> rss::Channel {
        rss::Channel::read_from(FIXTURE.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_channel_strips_source_and_html() {
        let topics = parse_channel(&fixture_channel(), "kotlin", 10);

        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0].title, "Kotlin 2.1 brings context parameters");
        assert_eq!(topics[0].query, "kotlin");
        assert!(topics[0].snippet.contains("context parameters"));
        assert!(!topics[0].snippet.contains('<'));
        assert_eq!(topics[1].title, "Jetpack Compose 1.8 stable");
        // No description at all is fine, the snippet is just empty.
        assert_eq!(topics[2].snippet, "");
    }

    #[test]
    fn test_parse_channel_honors_limit() {
        let topics = parse_channel(&fixture_channel(), "kotlin", 2);
        assert_eq!(topics.len(), 2);
    }

    #[test]
    fn test_strip_source_suffix() {
        assert_eq!(
            strip_source_suffix("Bitcoin surges past $100k - CoinDesk"),
            "Bitcoin surges past $100k"
        );
        assert_eq!(strip_source_suffix("No attribution here"), "No attribution here");
    }

    #[test]
    fn test_truncate_utf8_respects_char_boundaries() {
        // "é" is two bytes; cutting at 1 must back off to 0.
        assert_eq!(truncate_utf8("é", 1), "");
        assert_eq!(truncate_utf8("abc", 2), "ab");
        assert_eq!(truncate_utf8("abc", 10), "abc");
    }
}

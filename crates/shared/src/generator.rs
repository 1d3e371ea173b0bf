use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::PersonaConfig;
use crate::error::PipelineError;
use crate::history::normalize_title;
use crate::models::{GeneratedPost, Topic};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MAX_ATTEMPTS: u32 = 2;
const MAX_HASHTAGS: usize = 5;

/// Picks one candidate topic and drafts the post for it, in a single
/// model invocation.
#[async_trait]
pub trait ContentGenerator {
    async fn select_and_draft(
        &self,
        candidates: &[Topic],
        persona: &PersonaConfig,
    ) -> Result<GeneratedPost, PipelineError>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// The schema the model must reply with. Anything else fails the run;
/// an invented topic would bypass the history dedup, so there is no
/// fallback selection.
#[derive(Debug, Deserialize)]
struct Draft {
    chosen_title: String,
    body: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

pub struct GroqGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl GroqGenerator {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    async fn try_draft(
        &self,
        candidates: &[Topic],
        persona: &PersonaConfig,
    ) -> std::result::Result<GeneratedPost, String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: persona.system_prompt(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_prompt(candidates, persona),
                },
            ],
            temperature: 0.7,
            max_tokens: 1024,
        };

        let response = self
            .client
            .post(GROQ_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("failed to send request to Groq API: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(format!("Groq API error: {} - {}", status, error_text));
        }

        let chat = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| format!("failed to parse Groq API response: {}", e))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or("Groq API response contained no choices")?;

        validate_draft(content, candidates, persona)
    }
}

#[async_trait]
impl ContentGenerator for GroqGenerator {
    async fn select_and_draft(
        &self,
        candidates: &[Topic],
        persona: &PersonaConfig,
    ) -> Result<GeneratedPost, PipelineError> {
        let mut last_error = String::new();

        // One bounded retry; a second bad reply fails the run.
        for attempt in 0..MAX_ATTEMPTS {
            match self.try_draft(candidates, persona).await {
                Ok(post) => return Ok(post),
                Err(e) => {
                    last_error = e;
                    if attempt + 1 < MAX_ATTEMPTS {
                        eprintln!("⚠ Draft attempt failed ({}), retrying...", last_error);
                        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    }
                }
            }
        }

        Err(PipelineError::GenerationFailed(last_error))
    }
}

/// User prompt: the numbered candidate list plus the response contract.
fn build_prompt(candidates: &[Topic], persona: &PersonaConfig) -> String {
    let mut topics_text = String::new();
    for (i, topic) in candidates.iter().enumerate() {
        topics_text.push_str(&format!(
            "\n{}. **{}**\n   {}\n",
            i + 1,
            topic.title,
            topic.snippet
        ));
    }

    format!(
        r##"Based on these trending topics, pick the BEST ONE for a LinkedIn post and write that post.

## TRENDING TOPICS:
{topics}

## SELECTION CRITERIA:
1. Currently relevant/hot in the community
2. {name} can add a personal perspective
3. Will spark engagement (comments, discussions)
4. Not too generic or overdone

## RESPOND IN THIS EXACT JSON FORMAT:
{{
    "chosen_title": "the topic title, copied verbatim from the list above",
    "body": "the full post text, 150-250 words, no hashtags inside the body",
    "hashtags": ["#Tag1", "#Tag2", "#Tag3"]
}}

chosen_title MUST be one of the listed titles, copied exactly - do not invent a topic.
Put 3-5 hashtags in the hashtags array only.
Return ONLY the JSON, nothing else."##,
        topics = topics_text,
        name = persona.name,
    )
}

/// Strip code fences and surrounding prose, leaving the outermost JSON
/// object for the parser.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parse a raw model reply and validate it against the candidate pool.
///
/// The chosen title is matched under the same normalization as history
/// dedup, and the returned post carries the matched candidate itself, so
/// the selection is always a member of `candidates`.
fn validate_draft(
    content: &str,
    candidates: &[Topic],
    persona: &PersonaConfig,
) -> std::result::Result<GeneratedPost, String> {
    let draft: Draft = serde_json::from_str(extract_json(content))
        .map_err(|e| format!("model reply is not the expected JSON: {}", e))?;

    let wanted = normalize_title(&draft.chosen_title);
    let chosen = candidates
        .iter()
        .find(|t| normalize_title(&t.title) == wanted)
        .ok_or_else(|| {
            format!(
                "model chose '{}', which is not one of the supplied topics",
                draft.chosen_title
            )
        })?;

    let body = draft.body.trim().to_string();
    if body.is_empty() {
        return Err("model returned an empty post body".to_string());
    }

    let hashtags: Vec<String> = draft
        .hashtags
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(|h| {
            if h.starts_with('#') {
                h.to_string()
            } else {
                format!("#{}", h)
            }
        })
        .take(MAX_HASHTAGS)
        .collect();

    let post = GeneratedPost {
        chosen_topic: chosen.clone(),
        body,
        hashtags,
    };

    let rendered_chars = post.render().chars().count();
    if rendered_chars > persona.max_post_chars {
        return Err(format!(
            "drafted post is {} characters, over the {} limit",
            rendered_chars, persona.max_post_chars
        ));
    }

    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Topic> {
        vec![
            Topic::new("q1", "Kotlin Coroutines 2025", "structured concurrency"),
            Topic::new("q2", "Jetpack Compose Updates", "compose 1.8"),
        ]
    }

    // ==================== JSON Extraction Tests ====================

    #[test]
    fn test_extract_json_plain_object() {
        assert_eq!(extract_json(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_strips_code_fences() {
        let reply = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(reply), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_strips_surrounding_prose() {
        let reply = "Here you go:\n{\"a\": 1}\nHope that helps!";
        assert_eq!(extract_json(reply), r#"{"a": 1}"#);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_valid_reply_maps_to_candidate() {
        let reply = r##"{
            "chosen_title": "Jetpack Compose Updates",
            "body": "Compose 1.8 landed and recomposition got cheaper.",
            "hashtags": ["#AndroidDev", "Kotlin"]
        }"##;

        let post = validate_draft(reply, &candidates(), &PersonaConfig::default()).unwrap();

        assert_eq!(post.chosen_topic.title, "Jetpack Compose Updates");
        assert_eq!(post.chosen_topic.query, "q2");
        assert_eq!(post.hashtags, vec!["#AndroidDev", "#Kotlin"]);
    }

    #[test]
    fn test_chosen_title_matches_under_normalization() {
        let reply = r#"{
            "chosen_title": "  jetpack  compose UPDATES ",
            "body": "Some body text.",
            "hashtags": []
        }"#;

        let post = validate_draft(reply, &candidates(), &PersonaConfig::default()).unwrap();
        assert_eq!(post.chosen_topic.title, "Jetpack Compose Updates");
    }

    #[test]
    fn test_fabricated_topic_is_rejected() {
        let reply = r#"{
            "chosen_title": "A Topic I Made Up",
            "body": "Some body text.",
            "hashtags": []
        }"#;

        let err = validate_draft(reply, &candidates(), &PersonaConfig::default()).unwrap_err();
        assert!(err.contains("not one of the supplied topics"));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err =
            validate_draft("sure, here's a post!", &candidates(), &PersonaConfig::default())
                .unwrap_err();
        assert!(err.contains("not the expected JSON"));
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let reply = r#"{
            "chosen_title": "Kotlin Coroutines 2025",
            "body": "   ",
            "hashtags": []
        }"#;

        let err = validate_draft(reply, &candidates(), &PersonaConfig::default()).unwrap_err();
        assert!(err.contains("empty post body"));
    }

    #[test]
    fn test_overlong_post_is_rejected() {
        let persona = PersonaConfig {
            max_post_chars: 40,
            ..PersonaConfig::default()
        };

        let reply = r#"{
            "chosen_title": "Kotlin Coroutines 2025",
            "body": "This body is comfortably longer than forty characters in total.",
            "hashtags": []
        }"#;

        let err = validate_draft(reply, &candidates(), &persona).unwrap_err();
        assert!(err.contains("over the 40 limit"));
    }

    #[test]
    fn test_hashtags_are_capped() {
        let reply = r##"{
            "chosen_title": "Kotlin Coroutines 2025",
            "body": "Some body text.",
            "hashtags": ["#a", "#b", "#c", "#d", "#e", "#f", "#g"]
        }"##;

        let post = validate_draft(reply, &candidates(), &PersonaConfig::default()).unwrap();
        assert_eq!(post.hashtags.len(), MAX_HASHTAGS);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        // No body at all.
        let reply = r#"{"chosen_title": "Kotlin Coroutines 2025"}"#;
        assert!(validate_draft(reply, &candidates(), &PersonaConfig::default()).is_err());
    }
}

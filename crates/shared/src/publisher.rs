use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::GeneratedPost;

const USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";
const UGC_POSTS_URL: &str = "https://api.linkedin.com/v2/ugcPosts";
const LINKEDIN_VERSION: &str = "202401";

/// Submits a finished post to the social network.
#[async_trait]
pub trait Publisher {
    /// Returns the platform's identifier for the created post.
    async fn publish(&self, post: &GeneratedPost) -> Result<String, PipelineError>;
}

#[derive(Serialize)]
struct UgcPost {
    author: String,
    #[serde(rename = "lifecycleState")]
    lifecycle_state: String,
    #[serde(rename = "specificContent")]
    specific_content: SpecificContent,
    visibility: Visibility,
}

#[derive(Serialize)]
struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent,
}

#[derive(Serialize)]
struct ShareContent {
    #[serde(rename = "shareCommentary")]
    share_commentary: ShareText,
    #[serde(rename = "shareMediaCategory")]
    share_media_category: String,
}

#[derive(Serialize)]
struct ShareText {
    text: String,
}

#[derive(Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network_visibility: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
}

/// LinkedIn UGC posting client. The bearer credential is obtained
/// out-of-band; this client only consumes it.
pub struct LinkedInClient {
    client: Client,
    access_token: String,
    person_urn: Option<String>,
}

impl LinkedInClient {
    pub fn new(access_token: String, person_urn: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            access_token,
            person_urn,
        })
    }

    /// The author URN for the share, resolved from the token's profile
    /// when not configured.
    async fn author_urn(&self) -> Result<String, PipelineError> {
        if let Some(urn) = &self.person_urn {
            return Ok(urn.clone());
        }

        let response = self
            .client
            .get(USERINFO_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
            .map_err(|e| {
                PipelineError::PublishFailed(format!("failed to fetch LinkedIn user info: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(PipelineError::PublishFailed(format!(
                "LinkedIn userinfo returned {}: {}",
                status, error_text
            )));
        }

        let info = response.json::<UserInfo>().await.map_err(|e| {
            PipelineError::PublishFailed(format!("failed to parse LinkedIn user info: {}", e))
        })?;

        Ok(format!("urn:li:person:{}", info.sub))
    }
}

#[async_trait]
impl Publisher for LinkedInClient {
    async fn publish(&self, post: &GeneratedPost) -> Result<String, PipelineError> {
        let author = self.author_urn().await?;

        let body = UgcPost {
            author,
            lifecycle_state: "PUBLISHED".to_string(),
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: ShareText {
                        text: post.render(),
                    },
                    share_media_category: "NONE".to_string(),
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC".to_string(),
            },
        };

        let response = self
            .client
            .post(UGC_POSTS_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .header("X-Restli-Protocol-Version", "2.0.0")
            .header("LinkedIn-Version", LINKEDIN_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::PublishFailed(format!("failed to send post to LinkedIn: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(PipelineError::PublishFailed(format!(
                "LinkedIn returned {}: {}",
                status, error_text
            )));
        }

        // LinkedIn returns the share id in a response header.
        let post_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Topic;

    #[test]
    fn test_ugc_body_has_linkedin_field_names() {
        let post = GeneratedPost {
            chosen_topic: Topic::new("q", "Title", ""),
            body: "Hello LinkedIn".to_string(),
            hashtags: vec!["#AndroidDev".to_string()],
        };

        let body = UgcPost {
            author: "urn:li:person:abc".to_string(),
            lifecycle_state: "PUBLISHED".to_string(),
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: ShareText {
                        text: post.render(),
                    },
                    share_media_category: "NONE".to_string(),
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC".to_string(),
            },
        };

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["author"], "urn:li:person:abc");
        assert_eq!(json["lifecycleState"], "PUBLISHED");
        assert_eq!(
            json["specificContent"]["com.linkedin.ugc.ShareContent"]["shareCommentary"]["text"],
            "Hello LinkedIn\n\n#AndroidDev"
        );
        assert_eq!(
            json["visibility"]["com.linkedin.ugc.MemberNetworkVisibility"],
            "PUBLIC"
        );
    }
}

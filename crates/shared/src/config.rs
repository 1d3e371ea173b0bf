use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::models::Topic;

/// Secrets read from the environment at startup. Values are handed to the
/// individual clients and never logged.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub linkedin_access_token: String,
    /// Actor URN for the share (`urn:li:person:...`). When absent it is
    /// resolved from the access token's profile at publish time.
    pub linkedin_person_urn: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let groq_api_key = env::var("GROQ_API_KEY").context(
            "GROQ_API_KEY not found.\n\n\
            To fix this, create ~/.config/auto-post/.env with:\n  \
            GROQ_API_KEY=your_key_here\n  \
            LINKEDIN_ACCESS_TOKEN=your_token_here\n\n\
            Get your Groq API key from: https://console.groq.com/keys",
        )?;

        let linkedin_access_token = env::var("LINKEDIN_ACCESS_TOKEN").context(
            "LINKEDIN_ACCESS_TOKEN not found.\n\n\
            To fix this, create ~/.config/auto-post/.env with:\n  \
            GROQ_API_KEY=your_key_here\n  \
            LINKEDIN_ACCESS_TOKEN=your_token_here\n\n\
            The token needs the w_member_social scope. Obtaining and \
            refreshing it happens outside this tool.",
        )?;

        let linkedin_person_urn = env::var("LINKEDIN_PERSON_URN").ok();

        Ok(Self {
            groq_api_key,
            linkedin_access_token,
            linkedin_person_urn,
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/auto-post/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("auto-post").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() && dotenvy::from_path(&home_path).is_ok() {
                return;
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

/// The voice and style the model writes in. Immutable for the whole run.
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    pub name: String,
    pub role: String,
    pub expertise: Vec<String>,
    pub background: Vec<String>,
    pub tone: String,
    /// Hashtag vocabulary the model picks from.
    pub hashtags: Vec<String>,
    /// Upper bound for the rendered post. LinkedIn caps a share at 3000.
    pub max_post_chars: usize,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: "Jasmeet Singh".to_string(),
            role: "an Android Developer (SDE) at a healthcare tech company".to_string(),
            expertise: vec![
                "Android (Kotlin)".to_string(),
                "Jetpack Compose".to_string(),
                "Health Connect SDK".to_string(),
                "MVVM/Clean Architecture".to_string(),
                "Firebase".to_string(),
            ],
            background: vec![
                "Built healthcare apps (KinectedCare)".to_string(),
                "Built EdTech apps (FindMyTuition, 5000+ downloads)".to_string(),
            ],
            tone: "professional but conversational, light humor okay".to_string(),
            hashtags: vec![
                "#AndroidDev".to_string(),
                "#Kotlin".to_string(),
                "#JetpackCompose".to_string(),
                "#MobileDevelopment".to_string(),
                "#AppDevelopment".to_string(),
                "#SoftwareEngineering".to_string(),
                "#TechCommunity".to_string(),
                "#Programming".to_string(),
                "#BuildInPublic".to_string(),
                "#HealthTech".to_string(),
            ],
            max_post_chars: 3000,
        }
    }
}

impl PersonaConfig {
    /// System instruction for the drafting call, assembled from the knobs.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a LinkedIn content strategist and ghostwriter for {name}, {role}.\n\
            \n\
            ## ABOUT {name}:\n\
            - Expertise: {expertise}\n\
            - Experience: {background}\n\
            - Goals: build visibility, share genuine learnings, connect with the tech community\n\
            \n\
            ## YOUR TASK:\n\
            Write authentic, engaging LinkedIn posts that feel human-written, not AI-generated.\n\
            \n\
            ## POST RULES:\n\
            1. Hook first: the opening line must stop the scroll (it shows in the preview)\n\
            2. Be specific: real examples, code concepts, actual scenarios\n\
            3. Show personality: {tone}\n\
            4. Add value: every post should teach something or spark thinking\n\
            5. Engage: end with a question or discussion starter\n\
            \n\
            ## FORMAT:\n\
            - Length: 150-250 words, short paragraphs (1-3 lines), line breaks for readability\n\
            - Max 3-4 emojis\n\
            \n\
            ## AVOID:\n\
            - \"I'm humbled/excited to announce...\"\n\
            - Generic motivational quotes or obvious advice\n\
            - Sounding like a chatbot wrote it, being preachy or lecturing\n\
            \n\
            ## HASHTAGS TO USE (pick 3-5):\n\
            {hashtags}",
            name = self.name,
            role = self.role,
            expertise = self.expertise.join(", "),
            background = self.background.join("; "),
            tone = self.tone,
            hashtags = self.hashtags.join(" "),
        )
    }
}

/// Per-run knobs. Constructed once at startup and handed to the
/// orchestrator; nothing here changes during a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Search queries issued against the news feed, in order.
    pub queries: Vec<String>,
    pub results_per_query: usize,
    /// Candidate pool cap applied before selection.
    pub max_candidates: usize,
    /// How many of the most recent history entries count for dedup.
    pub dedup_window: usize,
    pub history_path: PathBuf,
    pub model: String,
    /// Evergreen topics used when every search query comes back empty.
    pub fallback_topics: Vec<Topic>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            queries: vec![
                "Android development trends 2025".to_string(),
                "Kotlin new features latest".to_string(),
                "Jetpack Compose updates".to_string(),
                "Android developer tips".to_string(),
                "Mobile app development trends".to_string(),
            ],
            results_per_query: 3,
            max_candidates: 5,
            dedup_window: 50,
            history_path: PathBuf::from("post_history.json"),
            model: "llama-3.3-70b-versatile".to_string(),
            fallback_topics: default_fallback_topics(),
        }
    }
}

fn default_fallback_topics() -> Vec<Topic> {
    [
        (
            "Kotlin 2.0 and the future of Android development",
            "Kotlin 2.0 brings major improvements to the language including better performance and new features",
        ),
        (
            "Jetpack Compose performance optimization techniques",
            "Best practices for building smooth 60fps UIs with Compose including recomposition optimization",
        ),
        (
            "Android 15 new features for developers",
            "Latest Android version brings new APIs and capabilities for app developers",
        ),
        (
            "Health Connect SDK integration patterns",
            "Building health and fitness apps with Google Health Connect SDK best practices",
        ),
        (
            "Modern Android app architecture with MVI pattern",
            "Moving beyond MVVM to Model-View-Intent for better state management",
        ),
    ]
    .into_iter()
    .map(|(title, snippet)| Topic::new("evergreen", title, snippet))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_includes_persona_knobs() {
        let persona = PersonaConfig::default();
        let prompt = persona.system_prompt();

        assert!(prompt.contains("Jasmeet Singh"));
        assert!(prompt.contains("Jetpack Compose"));
        assert!(prompt.contains("#AndroidDev"));
    }

    #[test]
    fn test_default_settings_have_fallback_topics() {
        let settings = RunSettings::default();
        assert!(!settings.queries.is_empty());
        assert_eq!(settings.fallback_topics.len(), 5);
        assert!(settings
            .fallback_topics
            .iter()
            .all(|t| t.query == "evergreen"));
    }
}

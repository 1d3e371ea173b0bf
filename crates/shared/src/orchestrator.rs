use chrono::Utc;
use std::collections::HashSet;

use crate::config::{PersonaConfig, RunSettings};
use crate::error::PipelineError;
use crate::generator::ContentGenerator;
use crate::history::{self, HistoryStore};
use crate::models::{GeneratedPost, HistoryEntry, RunOutcome, Topic};
use crate::publisher::Publisher;
use crate::search::TopicSource;

/// Runs the whole pipeline once: gather candidates, filter against
/// history, draft, then publish or preview, recording the outcome.
pub struct Orchestrator<S, G, P> {
    settings: RunSettings,
    persona: PersonaConfig,
    source: S,
    generator: G,
    publisher: P,
    history: HistoryStore,
}

impl<S, G, P> Orchestrator<S, G, P>
where
    S: TopicSource,
    G: ContentGenerator,
    P: Publisher,
{
    pub fn new(
        settings: RunSettings,
        persona: PersonaConfig,
        source: S,
        generator: G,
        publisher: P,
    ) -> Self {
        let history = HistoryStore::new(settings.history_path.clone());
        Self {
            settings,
            persona,
            source,
            generator,
            publisher,
            history,
        }
    }

    pub async fn run(&self, dry_run: bool) -> Result<RunOutcome, PipelineError> {
        let entries = self.history.load()?;

        println!("\n🔍 Searching for trending topics...");
        let candidates = self.gather_candidates().await;
        println!("✓ Collected {} candidate topics", candidates.len());

        let pool = self.filter_novel(candidates, &entries);
        if pool.is_empty() {
            println!("Every candidate was covered recently; nothing new to post.");
            return Ok(RunOutcome::NoNovelTopics);
        }
        println!("✓ {} topics survive the history filter", pool.len());

        println!("\n🤖 Drafting post...");
        let post = self
            .generator
            .select_and_draft(&pool, &self.persona)
            .await?;
        println!("✓ Selected: {}", post.chosen_topic.title);

        if dry_run {
            print_preview(&post);
            return Ok(RunOutcome::Previewed(post));
        }

        println!("\n📤 Posting to LinkedIn...");
        let post_id = self.publisher.publish(&post).await?;
        println!("✓ Post created: {}", post_id);

        // History is only touched after the network confirmed the post,
        // so a failed publish can be retried with the same candidates.
        self.history.append(HistoryEntry {
            timestamp: Utc::now(),
            topic_title: post.chosen_topic.title.clone(),
            post_text: post.render(),
            posted: true,
        })?;
        println!("📚 Saved to history");

        Ok(RunOutcome::Published { post_id })
    }

    /// Query every configured search, skipping failed or empty queries
    /// and within-run duplicate titles. Falls back to the evergreen
    /// topics when the searches produce nothing at all.
    async fn gather_candidates(&self) -> Vec<Topic> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for query in &self.settings.queries {
            let results = match self
                .source
                .search(query, self.settings.results_per_query)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("  ⚠ {}", e);
                    continue;
                }
            };

            if results.is_empty() {
                eprintln!("  ⚠ No results for '{}'", query);
                continue;
            }

            for topic in results {
                if !seen.insert(history::normalize_title(&topic.title)) {
                    continue;
                }
                println!("  📰 {}", topic.title);
                candidates.push(topic);
            }
        }

        if candidates.is_empty() && !self.settings.fallback_topics.is_empty() {
            eprintln!("  ⚠ All searches came back empty, using evergreen topics");
            candidates = self.settings.fallback_topics.clone();
        }

        candidates.truncate(self.settings.max_candidates);
        candidates
    }

    /// Drop candidates already covered within the lookback window.
    fn filter_novel(&self, candidates: Vec<Topic>, entries: &[HistoryEntry]) -> Vec<Topic> {
        candidates
            .into_iter()
            .filter(|topic| {
                let covered =
                    history::is_duplicate(&topic.title, entries, self.settings.dedup_window);
                if covered {
                    println!("  ⏭ Already covered recently: {}", topic.title);
                }
                !covered
            })
            .collect()
    }
}

fn print_preview(post: &GeneratedPost) {
    println!("\n🧪 DRY RUN - nothing will be posted");
    println!("{}", "=".repeat(60));
    println!("{}", post.render());
    println!("{}", "=".repeat(60));
}

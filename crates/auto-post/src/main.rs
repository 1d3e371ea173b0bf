use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use shared::{
    Config, GoogleNewsClient, GroqGenerator, LinkedInClient, Orchestrator, PersonaConfig,
    RunOutcome, RunSettings,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "auto-post")]
#[command(about = "Generate and publish a trending-topic LinkedIn post")]
struct Args {
    /// Draft and preview the post without publishing or touching history
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Path to the post history file
    #[arg(long, default_value = "post_history.json")]
    history: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    let settings = RunSettings {
        history_path: args.history,
        ..RunSettings::default()
    };
    let persona = PersonaConfig::default();

    println!("{}", "=".repeat(60));
    println!("🤖 LinkedIn Auto Poster");
    println!("{}", "=".repeat(60));
    println!("📅 {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    if args.dry_run {
        println!("🧪 Dry run: nothing will be posted");
    }

    let source = GoogleNewsClient::new()?;
    let generator = GroqGenerator::new(config.groq_api_key, settings.model.clone())?;
    let publisher = LinkedInClient::new(config.linkedin_access_token, config.linkedin_person_urn)?;

    let orchestrator = Orchestrator::new(settings, persona, source, generator, publisher);

    match orchestrator.run(args.dry_run).await? {
        RunOutcome::Published { post_id } => {
            println!("\n🎉 Post is live: {}", post_id);
        }
        RunOutcome::Previewed(_) => {
            println!("\n✅ Dry run complete.");
        }
        RunOutcome::NoNovelTopics => {
            println!("\n✅ Nothing novel this run; exiting cleanly.");
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordscene::models::{Config, SavedWord, UserSession};
use wordscene::{PromptGateway, Wordbook};

#[derive(Debug, Parser)]
#[command(name = "wordscene")]
#[command(about = "English vocabulary helper for Korean learners")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Break a word into prefix, root and suffix.
    Etymology { word: String },
    /// List conversational nuances of a word.
    Nuances { word: String },
    /// Part of speech and definition of a word.
    Define { word: String },
    /// Definition, etymology and nuances together.
    Explore { word: String },
    /// Write a short story using every word, in order.
    Story {
        #[arg(required = true)]
        words: Vec<String>,
        /// Also generate an illustration from the story's image prompt.
        #[arg(long)]
        illustrate: bool,
    },
    /// Generate a 16:9 image and print it as a data URI.
    Image { prompt: String },
    /// Translate a sentence with chuimsae annotations.
    Translate { sentence: String },
    /// Manage the saved wordbook.
    Wordbook {
        #[command(flatten)]
        identity: Identity,
        #[command(subcommand)]
        action: WordbookAction,
    },
}

#[derive(Debug, Args)]
struct Identity {
    /// Signed-in user id; omit to use the local wordbook.
    #[arg(long, requires = "access_token")]
    user_id: Option<String>,
    /// Session access token for the signed-in user.
    #[arg(long, requires = "user_id")]
    access_token: Option<String>,
}

impl Identity {
    fn session(&self) -> Option<UserSession> {
        match (&self.user_id, &self.access_token) {
            (Some(id), Some(token)) => Some(UserSession::new(id.clone(), token.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
enum WordbookAction {
    List,
    Save { english: String, korean: String },
    Remove { english: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IllustratedStory {
    #[serde(flatten)]
    story: wordscene::models::StoryBundle,
    image: String,
}

#[derive(Serialize)]
struct ExplorationReport {
    definition: serde_json::Value,
    etymology: serde_json::Value,
    nuances: serde_json::Value,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Successful parts as their JSON, failures as `{"error": message}`.
fn report_part<T: Serialize>(part: wordscene::Result<T>) -> Result<serde_json::Value> {
    Ok(match part {
        Ok(value) => serde_json::to_value(value)?,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    })
}

async fn run_wordbook(identity: Identity, action: WordbookAction, config: &Config) -> Result<()> {
    let wordbook = Wordbook::from_config(config);
    let session = identity.session();
    let user = session.as_ref();

    match action {
        WordbookAction::List => print_json(&wordbook.list(user).await)?,
        WordbookAction::Save { english, korean } => {
            wordbook.save(&SavedWord::new(english, korean), user).await
        }
        WordbookAction::Remove { english } => wordbook.remove(&english, user).await,
    }

    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let gateway = || PromptGateway::from_config(config);

    match command {
        Command::Etymology { word } => print_json(&gateway()?.analyze_etymology(&word).await?)?,
        Command::Nuances { word } => print_json(&gateway()?.find_nuances(&word).await?)?,
        Command::Define { word } => print_json(&gateway()?.get_definition(&word).await?)?,
        Command::Explore { word } => {
            let exploration = gateway()?.explore_word(&word).await;
            print_json(&ExplorationReport {
                definition: report_part(exploration.definition)?,
                etymology: report_part(exploration.etymology)?,
                nuances: report_part(exploration.nuances)?,
            })?
        }
        Command::Story { words, illustrate } => {
            let gateway = gateway()?;
            let story = gateway.generate_story(&words).await?;
            if illustrate {
                let image = gateway.generate_image(&story.image_prompt).await?;
                print_json(&IllustratedStory { story, image })?
            } else {
                print_json(&story)?
            }
        }
        Command::Image { prompt } => println!("{}", gateway()?.generate_image(&prompt).await?),
        Command::Translate { sentence } => {
            print_json(&gateway()?.nuance_translation(&sentence).await?)?
        }
        Command::Wordbook { identity, action } => run_wordbook(identity, action, config).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordscene=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Starting wordscene");

    if let Err(e) = run(args.command, &config).await {
        error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

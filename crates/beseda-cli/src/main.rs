use std::sync::Arc;

use clap::{Parser, Subcommand};

use beseda_core::config::Config;
use beseda_core::types::TutorReply;
use beseda_providers::openai::OpenAiClient;
use beseda_speech::elevenlabs::ElevenLabsBackend;
use beseda_speech::{SpeechBackend, SpeechOrchestrator};
use beseda_tutor::session::speech_text;
use beseda_tutor::{StudentLevel, TutorSession};

#[derive(Parser)]
#[command(
    name = "beseda",
    about = "Bilingual Russian/English conversational tutor",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment mixed-language text and speak it
    Say {
        /// Text to speak (Russian, English, or both)
        text: String,
    },

    /// One tutoring turn: ask, get a structured reply
    Ask {
        /// Your message to the tutor
        message: String,

        /// Student level (beginner, intermediate, advanced)
        #[arg(long, default_value = "beginner")]
        level: String,

        /// Also speak the reply
        #[arg(long)]
        speak: bool,
    },

    /// Look up a Russian word
    Lookup {
        /// The word to look up
        word: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

fn parse_level(level: &str) -> StudentLevel {
    match level {
        "intermediate" => StudentLevel::Intermediate,
        "advanced" => StudentLevel::Advanced,
        _ => StudentLevel::Beginner,
    }
}

/// Speak text and wait for the orchestrator to signal completion.
async fn speak_and_wait(orchestrator: &SpeechOrchestrator, text: &str) {
    let (tx, rx) = tokio::sync::oneshot::channel();
    orchestrator.speak(
        text,
        Some(Box::new(move || {
            let _ = tx.send(());
        })),
    );
    let _ = rx.await;
}

fn print_reply(reply: &TutorReply) {
    println!("{}", reply.reply);

    if let Some(corrections) = &reply.corrections {
        println!("\nCorrections:");
        for c in corrections {
            println!("  {} → {}  ({})", c.original, c.corrected, c.explanation);
        }
    }

    if let Some(tip) = &reply.vocabulary_tip {
        println!("\nVocabulary: {} — {}", tip.word, tip.definition);
        for example in &tip.examples {
            println!("  {example}");
        }
    }

    if let Some(tip) = &reply.pronunciation_tip {
        println!("\nPronunciation: {} [{}] — {}", tip.word, tip.phonetic, tip.tip);
    }

    println!("\n{}", reply.follow_up);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config first so its logging level can seed the filter
    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);

    let config = Config::load(&config_path)?;

    // Initialize logging: RUST_LOG > --verbose > config > "info"
    let filter = if cli.verbose {
        "debug"
    } else {
        config
            .logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    tracing::debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Commands::Say { text } => {
            let speech = config.speech();
            let backend = Arc::new(ElevenLabsBackend::from_config(&speech));
            if !backend.is_available() {
                anyhow::bail!(
                    "Speech not configured. Set speech.api_key in {} or speech.api_key_env.",
                    config_path.display()
                );
            }
            let orchestrator =
                SpeechOrchestrator::new(backend as Arc<dyn SpeechBackend>, speech);
            speak_and_wait(&orchestrator, &text).await;
        }
        Commands::Ask { message, level, speak } => {
            let model = config
                .model
                .clone()
                .ok_or_else(|| anyhow::anyhow!("No model configured. Set the model section in config."))?;
            let client = Arc::new(OpenAiClient::from_config(&model));
            let mut session = TutorSession::new(client, &model, parse_level(&level));

            let reply = session.respond(&message).await?;
            print_reply(&reply);

            if speak {
                let speech = config.speech();
                let backend = Arc::new(ElevenLabsBackend::from_config(&speech));
                let orchestrator =
                    SpeechOrchestrator::new(backend as Arc<dyn SpeechBackend>, speech);
                speak_and_wait(&orchestrator, &speech_text(&reply)).await;
            }
        }
        Commands::Lookup { word } => {
            let model = config
                .model
                .clone()
                .ok_or_else(|| anyhow::anyhow!("No model configured. Set the model section in config."))?;
            let client = Arc::new(OpenAiClient::from_config(&model));
            let session = TutorSession::new(client, &model, StudentLevel::default());

            let card = session.lookup(&word).await?;
            println!("{word}");
            if !card.phonetic.is_empty() {
                println!("[{}]", card.phonetic);
            }
            if !card.translation.is_empty() {
                println!("{}", card.translation);
            }
            for example in &card.examples {
                println!("  {example}");
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
        },
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use gemini_service::app::{load_history, load_image_part, App};
use gemini_service::{Config, TextRequest};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-service")]
#[command(about = "Generate text, images, and speech with Gemini")]
struct CliArgs {
    /// Directory for generated files when no --out is given.
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the text model and print its reply.
    Text {
        prompt: String,
        /// JSON file with prior turns: [{"role": "user", "parts": [{"text": "..."}]}]
        #[arg(long)]
        history: Option<PathBuf>,
        /// Image file to attach (repeatable).
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        system: Option<String>,
    },
    /// Generate an image and save it.
    Image {
        prompt: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Synthesize speech and save the raw audio.
    Speech {
        text: String,
        #[arg(long)]
        voice: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Text {
            prompt,
            history,
            images,
            model,
            system,
        } => {
            let mut request = TextRequest::new(prompt);
            if let Some(path) = history {
                request = request.with_history(load_history(&path).await?);
            }
            for path in &images {
                request = request.with_image(load_image_part(path).await?);
            }
            request.model = model;
            request.system_instruction = system;

            println!("{}", app.text(&request).await?);
        }
        Command::Image { prompt, out } => {
            let path = app.image(&prompt, out.as_deref()).await?;
            println!("{}", path.display());
        }
        Command::Speech { text, voice, out } => {
            let path = app.speech(&text, voice.as_deref(), out.as_deref()).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let app = App::new(Config::from_env(), args.output_dir);

    match run(&app, args.command).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

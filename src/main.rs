use anyhow::Result;
use clap::{Parser, Subcommand};
use social_spark::ai::GeminiClient;
use social_spark::models::{Config, UploadedImage};
use social_spark::pipeline::SparkPipeline;
use social_spark::probe::{self, DEFAULT_PROBE_MODELS, PROBE_TIMEOUT};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "social-spark")]
#[command(about = "Turn an image into social media captions, hashtags and insights")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web UI (default).
    Serve {
        /// Address to listen on; overrides BIND_ADDR.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Describe one image file and print the generated content.
    Analyze {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Check which Gemini models the API key can reach.
    Probe {
        /// Model to probe; repeat for several. Defaults to a built-in list.
        #[arg(long = "model", value_name = "MODEL")]
        models: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_spark=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{}. Set it in the environment or in a .env file.", e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(addr) = bind {
                config.bind_addr = addr;
            }
            info!("Starting social-spark web UI");
            let pipeline = SparkPipeline::new(&config);
            if let Err(e) = social_spark::server::serve(&config, pipeline).await {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Analyze { image } => {
            let pipeline = SparkPipeline::new(&config);
            let upload = UploadedImage::from_path(&image)?;
            match pipeline.run(upload).await {
                Ok(package) => {
                    println!("# Image Analysis ({})\n", package.description.model);
                    println!("{}\n", package.description.text);
                    println!("# Social Content ({})\n", package.content.model);
                    println!("{}", package.content.text);
                }
                Err(e) => {
                    error!("Analysis failed ({:?})", e.kind());
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Probe { models } => {
            let models = if models.is_empty() {
                DEFAULT_PROBE_MODELS.iter().map(|m| m.to_string()).collect()
            } else {
                models
            };
            let client = GeminiClient::new(config.api_key.clone()).with_base_url(config.base_url);
            let results = probe::probe_models(client.http(), &models, PROBE_TIMEOUT).await;

            for result in &results {
                println!("{:<24} {}", result.model, result.status);
            }

            let working: Vec<&str> = results
                .iter()
                .filter(|r| r.status.is_working())
                .map(|r| r.model.as_str())
                .collect();

            if working.is_empty() {
                println!("\nNo working models found. Possible causes:");
                println!("  1. API key is from Google Cloud Console instead of Google AI Studio");
                println!("  2. API key doesn't have Generative Language API enabled");
                println!("  3. API key has restrictions that block these endpoints");
                println!("  4. Account or billing issues");
                println!("Get a key from https://aistudio.google.com/app/apikey");
                std::process::exit(1);
            }
            println!("\nWorking models: {}", working.join(", "));
        }
    }

    Ok(())
}

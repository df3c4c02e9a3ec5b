//! Seedance command-line client.
//!
//! Reads `VOLCES_API_KEY` and `VOLCES_BASE_HOST` (or a `.env` file), sends one
//! request and prints the response as JSON.

use clap::{Parser, Subcommand};
use seedance::{
    ContentItem, GenerationRequest, ImageRole, Ratio, Resolution, SeedanceError,
    VideoGenerationRequest, VolcesClient,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::process::ExitCode;
use tracing::{debug, info};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "seedance")]
#[command(about = "Seedance/Volces video and text generation client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate text from a prompt
    Generate {
        /// Input prompt
        #[arg(short, long)]
        prompt: String,
        /// Model identifier
        #[arg(short, long)]
        model: Option<String>,
        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Sampling temperature; 0 makes the request cacheable
        #[arg(short, long)]
        temperature: Option<f64>,
    },
    /// List available models
    Models,
    /// Submit a video generation task
    Video {
        /// Video model identifier
        #[arg(short, long)]
        model: String,
        /// Text prompt
        #[arg(short, long)]
        prompt: Option<String>,
        /// Opening frame image URL
        #[arg(long)]
        first_frame: Option<String>,
        /// Closing frame image URL
        #[arg(long)]
        last_frame: Option<String>,
        /// Reference image URL, repeatable
        #[arg(long = "reference")]
        references: Vec<String>,
        /// Output resolution (480p, 720p, 1080p)
        #[arg(long, value_parser = parse_wire::<Resolution>)]
        resolution: Option<Resolution>,
        /// Aspect ratio (16:9, 4:3, 1:1, 3:4, 9:16, 21:9, adaptive)
        #[arg(long, value_parser = parse_wire::<Ratio>)]
        ratio: Option<Ratio>,
        /// Length in seconds, -1 lets the model choose
        #[arg(long, allow_hyphen_values = true)]
        duration: Option<i64>,
        /// Frame count of the form 25 + 4n
        #[arg(long)]
        frames: Option<i64>,
        /// Random seed, -1 picks one
        #[arg(long, allow_hyphen_values = true)]
        seed: Option<i64>,
        /// Keep the camera still
        #[arg(long)]
        camera_fixed: bool,
    },
    /// Show the state of a video generation task
    Task {
        /// Task identifier
        id: String,
    },
}

/// Parses a value using its JSON wire name.
fn parse_wire<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unsupported value `{}`", value))
}

fn video_request(
    model: String,
    prompt: Option<String>,
    first_frame: Option<String>,
    last_frame: Option<String>,
    references: Vec<String>,
    options: VideoOptions,
) -> Result<VideoGenerationRequest, SeedanceError> {
    let mut builder = VideoGenerationRequest::builder().model(model);
    if let Some(url) = first_frame {
        builder = builder.push_content(ContentItem::image(url, Some(ImageRole::FirstFrame)));
    }
    if let Some(url) = last_frame {
        builder = builder.push_content(ContentItem::image(url, Some(ImageRole::LastFrame)));
    }
    for url in references {
        builder = builder.push_content(ContentItem::image(url, Some(ImageRole::ReferenceImage)));
    }
    if let Some(prompt) = prompt {
        builder = builder.push_content(ContentItem::text(prompt));
    }
    if let Some(resolution) = options.resolution {
        builder = builder.resolution(resolution);
    }
    if let Some(ratio) = options.ratio {
        builder = builder.ratio(ratio);
    }
    if let Some(duration) = options.duration {
        builder = builder.duration(duration);
    }
    if let Some(frames) = options.frames {
        builder = builder.frames(frames);
    }
    if let Some(seed) = options.seed {
        builder = builder.seed(seed);
    }
    builder.camera_fixed(options.camera_fixed).build()
}

struct VideoOptions {
    resolution: Option<Resolution>,
    ratio: Option<Ratio>,
    duration: Option<i64>,
    frames: Option<i64>,
    seed: Option<i64>,
    camera_fixed: bool,
}

/// Prints a response and maps an embedded error to a failing exit code.
fn report<T: Serialize>(response: &T, failed: bool) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let client = VolcesClient::from_env()?;
    debug!(client = ?client, "Client ready");

    let code = match cli.command {
        Commands::Generate {
            prompt,
            model,
            max_tokens,
            temperature,
        } => {
            let mut builder = GenerationRequest::builder().prompt(prompt);
            if let Some(model) = model {
                builder = builder.model(model);
            }
            if let Some(max_tokens) = max_tokens {
                builder = builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = temperature {
                builder = builder.temperature(temperature);
            }
            let request = builder.build()?;
            let response = client.generate(&request).await?;
            report(&response, response.is_error())?
        }
        Commands::Models => {
            let response = client.list_models().await?;
            report(&response, response.is_error())?
        }
        Commands::Video {
            model,
            prompt,
            first_frame,
            last_frame,
            references,
            resolution,
            ratio,
            duration,
            frames,
            seed,
            camera_fixed,
        } => {
            let options = VideoOptions {
                resolution,
                ratio,
                duration,
                frames,
                seed,
                camera_fixed,
            };
            let request =
                video_request(model, prompt, first_frame, last_frame, references, options)?;
            info!(prompt = %request.prompt_summary(), "Submitting video task");
            let response = client.create_video_task(&request).await?;
            report(&response, response.is_error())?
        }
        Commands::Task { id } => {
            let response = client.get_video_task(&id).await?;
            report(&response, response.is_error())?
        }
    };

    client.close();
    Ok(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = seedance::init_tracing() {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<SeedanceError>() {
                for violation in err.violations() {
                    eprintln!("  {}", violation);
                }
            }
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

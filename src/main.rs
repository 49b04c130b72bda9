use clap::{Parser, Subcommand};
use rmeme::{
    files,
    logger::{self, LoggerConfig},
    state::{Action, AppState},
    templates, Config, DigitalTwinStyle, GeminiClient, GenerationMode, MemeError,
    MemeOrchestrator,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rmeme", version, about = "Turn photos into AI-generated memes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate memes from one or more images
    Generate {
        #[arg(short, long, default_value = "classic")]
        mode: GenerationMode,

        /// What the meme should be about; the edit instruction in custom mode
        #[arg(short, long, default_value = "")]
        topic: String,

        /// Template library id, URL or local path (custom mode)
        #[arg(long)]
        template: Option<String>,

        /// Create a digital twin of the first image in this style and use it instead
        #[arg(long)]
        twin: Option<DigitalTwinStyle>,

        /// Number of story panels (3 or 4)
        #[arg(long, env = "MEME_STORY_PANELS")]
        panels: Option<usize>,

        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Create a digital twin sticker of a subject
    Twin {
        #[arg(short, long, default_value = "sticker")]
        style: DigitalTwinStyle,

        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        image: PathBuf,
    },
    /// List the built-in meme templates
    Templates,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    logger::init_with_config(LoggerConfig::from_env())?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    let panels = match &cli.command {
        Command::Templates => {
            list_templates();
            return Ok(());
        }
        Command::Generate { panels, .. } => *panels,
        Command::Twin { .. } => None,
    };

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };
    if let Some(panels) = panels {
        config.orchestrator = config.orchestrator.with_story_panels(panels)?;
    }
    logger::log_config_info(&config);

    let client = GeminiClient::new(&config.gemini)?;
    let orchestrator = MemeOrchestrator::new(client.generator(), config.orchestrator);

    match cli.command {
        Command::Generate {
            mode,
            topic,
            template,
            twin,
            out,
            images,
            ..
        } => {
            let mut state = AppState::new()
                .reduce(Action::ModeChanged(mode))
                .reduce(Action::TopicChanged(topic));

            state = match files::load_images(&images).await {
                Ok(images) => state.reduce(Action::ImagesAdded(images)),
                Err(e) => state.reduce(Action::UploadFailed(e.to_string())),
            };
            fail_on_error(&state)?;

            if let Some(reference) = template {
                state = match templates::resolve(client.templates(), &reference).await {
                    Ok(image) => state.reduce(Action::TemplateSelected(image)),
                    Err(e) => state.reduce(Action::UploadFailed(e.to_string())),
                };
                fail_on_error(&state)?;
            }

            if let Some(style) = twin {
                state = state
                    .reduce(Action::TwinToggled(true))
                    .reduce(Action::TwinStyleChanged(style))
                    .reduce(Action::TwinStarted);
                let subject = state
                    .uploaded_images
                    .first()
                    .cloned()
                    .ok_or("no image to build a digital twin from")?;
                state = match orchestrator.create_digital_twin(&subject, style).await {
                    Ok(image) => state.reduce(Action::TwinCreated(image)),
                    Err(e) => state.reduce(Action::TwinFailed(e.to_string())),
                };
                fail_on_error(&state)?;
            }

            let request = state.to_request()?;
            state = state.reduce(Action::GenerationStarted);
            state = match orchestrator.generate(&request).await {
                Ok(memes) => state.reduce(Action::GenerationSucceeded(memes)),
                Err(e) => state.reduce(Action::GenerationFailed(e.to_string())),
            };
            fail_on_error(&state)?;

            save_all(&out, &state.generated).await?;
            if state.celebrate {
                log::info!("🎉 {} meme(s) ready!", state.generated.len());
            }
        }
        Command::Twin { style, out, image } => {
            let subject = files::load_image(&image).await?;
            let twin = orchestrator.create_digital_twin(&subject, style).await?;
            save_all(&out, &[twin.to_data_uri()]).await?;
        }
        Command::Templates => list_templates(),
    }

    Ok(())
}

fn fail_on_error(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    match &state.error {
        Some(message) => {
            log::error!("❌ {}", message);
            Err(message.clone().into())
        }
        None => Ok(()),
    }
}

async fn save_all(out: &Path, data_uris: &[String]) -> Result<(), MemeError> {
    let timestamp = chrono::Utc::now().timestamp();
    for (n, uri) in data_uris.iter().enumerate() {
        let path = files::save_data_uri(out, &format!("meme_{}_{}", n + 1, timestamp), uri).await?;
        log::info!("💾 Saved {}", path.display());
    }
    Ok(())
}

fn list_templates() {
    for template in templates::MEME_TEMPLATES {
        println!("{:<22} {:<24} {}", template.id, template.name, template.image_url);
    }
}

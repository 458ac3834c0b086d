use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voice_api::chat::handlers::MAX_IMAGE_BYTES;
use voice_api::client::chat::{ChatSession, CHAT_ERROR_REPLY};
use voice_api::client::orchestrator::{PlatformResult, TransformSession};
use voice_api::client::rate_limit::UsageCategory;
use voice_api::client::store::{new_id, now_millis, SharedStore, Store, STORE_FILE_NAME};
use voice_api::client::transport::ApiClient;
use voice_api::client::{lock, ClientError};
use voice_api::models::{
    Audience, Capture, ContentAngle, OutputLanguage, OutputLength, Platform, Profile, Tone,
};
use voice_api::persona::prompts::persona_questions;

#[derive(Parser)]
#[command(name = "voice")]
#[command(about = "Voice Builder - turn raw thoughts into platform-ready posts", long_about = None)]
struct Cli {
    /// Voice Builder server
    #[arg(long, env = "VOICE_SERVER_URL", default_value = "http://localhost:8080")]
    server: String,

    /// Client state file (defaults to the user data directory)
    #[arg(long, env = "VOICE_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite content for one platform, or all four with --all
    Transform {
        content: String,
        #[arg(long, value_parser = parse_enum::<Platform>, default_value = "twitter")]
        platform: Platform,
        #[arg(long, value_parser = parse_enum::<OutputLength>)]
        length: Option<OutputLength>,
        #[arg(long, value_parser = parse_enum::<OutputLanguage>)]
        language: Option<OutputLanguage>,
        #[arg(long, value_parser = parse_enum::<Audience>)]
        audience: Option<Audience>,
        #[arg(long, value_parser = parse_enum::<ContentAngle>)]
        angle: Option<ContentAngle>,
        /// Wait for the background prefetch and print every platform
        #[arg(long)]
        all: bool,
    },
    /// Co-think chat; reads turns from stdin when no message is given
    Chat {
        message: Option<String>,
        /// Attach an image to the first turn
        #[arg(long)]
        image: Option<PathBuf>,
        /// Start a new conversation instead of continuing the current one
        #[arg(long)]
        new: bool,
        /// Summarize the conversation into a note card afterwards
        #[arg(long)]
        card: bool,
    },
    /// Show or edit the writing profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Save quick thoughts for later
    Capture {
        #[command(subcommand)]
        action: CaptureAction,
    },
    /// Draw a line-art illustration for a post
    Illustrate {
        content: String,
        /// Skip highlight extraction and draw this scene
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long, default_value = "illustration.png")]
        out: PathBuf,
    },
    /// Today's usage against the daily limits
    Usage,
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        bio: String,
        #[arg(long, value_parser = parse_enum::<Tone>, default_value = "casual")]
        tone: Tone,
        #[arg(long = "avoid")]
        avoid_words: Vec<String>,
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
    /// Generate a platform persona from answers to its three questions
    Persona {
        #[arg(value_parser = parse_enum::<Platform>)]
        platform: Platform,
        /// Answers in question order; prompts interactively when omitted
        answers: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CaptureAction {
    Add {
        text: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    List,
    Delete { id: String },
}

/// Parses the wire spelling of any of the option enums.
fn parse_enum<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown value `{value}`"))
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voice-builder")
        .join(STORE_FILE_NAME)
}

fn image_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.len() > MAX_IMAGE_BYTES {
        bail!(
            "{} is {:.1} MB; images must be at most {} MB",
            path.display(),
            bytes.len() as f64 / (1024.0 * 1024.0),
            MAX_IMAGE_BYTES / (1024 * 1024)
        );
    }
    let media_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    Ok(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
}

fn print_result(platform: Platform, result: &PlatformResult) {
    println!(
        "── {} ({:?} · {} · {} · {})",
        platform.display_name(),
        result.length,
        result.language.badge(),
        result.audience.label(),
        result.angle.label()
    );
    if result.failed {
        println!("(生成失败)");
    } else if result.text.is_empty() {
        println!("(未生成)");
    } else {
        println!("{}", result.text.trim());
    }
    println!();
}

#[allow(clippy::too_many_arguments)]
async fn transform(
    api: Arc<ApiClient>,
    store: SharedStore,
    content: String,
    platform: Platform,
    length: Option<OutputLength>,
    language: Option<OutputLanguage>,
    audience: Option<Audience>,
    angle: Option<ContentAngle>,
    all: bool,
) -> Result<()> {
    let session = TransformSession::new(api, store, content);
    session.start()?;
    session.wait_for_active().await;

    if platform != Platform::Twitter {
        session.select_platform(platform)?;
        session.wait_for_active().await;
        if session.result(platform).is_loading {
            // Already claimed by the background prefetch.
            session.wait_for_prefetch().await;
        }
    }
    if let Some(length) = length {
        session.set_length(length)?;
        session.wait_for_active().await;
    }
    if let Some(language) = language {
        session.set_language(language)?;
        session.wait_for_active().await;
    }
    if let Some(audience) = audience {
        session.set_audience(audience)?;
        session.wait_for_active().await;
    }
    if let Some(angle) = angle {
        session.set_angle(angle)?;
        session.wait_for_active().await;
    }

    if all {
        session.wait_for_prefetch().await;
        for (platform, result) in session.snapshot() {
            print_result(platform, &result);
        }
    } else {
        print_result(platform, &session.result(platform));
    }
    Ok(())
}

async fn chat_turn(session: &ChatSession, text: &str, image: Option<String>) -> Result<()> {
    let result = session
        .send_message(text, image, |delta| {
            print!("{delta}");
            let _ = io::stdout().flush();
        })
        .await;
    println!();
    match result {
        Ok(_) | Err(ClientError::EmptyMessage) => Ok(()),
        Err(ClientError::RateLimited(category)) => {
            println!("{}", category.limit_warning());
            Ok(())
        }
        Err(e) => {
            println!("{CHAT_ERROR_REPLY}");
            Err(e.into())
        }
    }
}

async fn chat(
    api: Arc<ApiClient>,
    store: SharedStore,
    message: Option<String>,
    image: Option<PathBuf>,
    new: bool,
    card: bool,
) -> Result<()> {
    if new {
        lock(&store).start_conversation(None);
    }
    let session = ChatSession::new(api.clone(), store.clone());
    let mut image = image.as_deref().map(image_data_uri).transpose()?;

    match message {
        Some(text) => chat_turn(&session, &text, image.take()).await?,
        None => {
            let stdin = io::stdin();
            print!("> ");
            io::stdout().flush()?;
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() && image.is_none() {
                    break;
                }
                chat_turn(&session, &line, image.take()).await?;
                print!("> ");
                io::stdout().flush()?;
            }
        }
    }

    if card {
        let transcript = {
            let store = lock(&store);
            store
                .current_conversation()
                .map(|c| {
                    c.messages
                        .iter()
                        .map(|m| format!("{:?}: {}", m.role, m.content))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_default()
        };
        let note = api.extract_points(&transcript).await?;
        println!("# {}", note.title);
        for point in note.points {
            println!("- {point}");
        }
    }
    Ok(())
}

async fn persona(
    api: &ApiClient,
    store: &mut Store,
    platform: Platform,
    mut answers: Vec<String>,
) -> Result<()> {
    if store.profile.is_none() {
        bail!("Set a profile first: voice profile set --bio ...");
    }
    if answers.is_empty() {
        let stdin = io::stdin();
        for question in persona_questions(platform) {
            println!("{question}");
            print!("> ");
            io::stdout().flush()?;
            let mut answer = String::new();
            stdin.lock().read_line(&mut answer)?;
            answers.push(answer.trim().to_string());
        }
    }

    let persona = api.generate_persona(platform, &answers).await?;
    println!("{}: {}", platform.display_name(), persona.platform_bio);
    println!("语气: {}", persona.tone);
    println!("风格: {}", persona.style_notes);
    store.set_platform_persona(platform, persona);
    Ok(())
}

async fn illustrate(
    api: &ApiClient,
    store: &mut Store,
    content: &str,
    prompt: Option<&str>,
    out: &Path,
) -> Result<()> {
    if !store.check_rate_limit(UsageCategory::Image).allowed {
        println!("{}", UsageCategory::Image.limit_warning());
        return Ok(());
    }
    let illustration = api.generate_illustration(content, prompt).await?;
    let data = illustration
        .image
        .split_once(";base64,")
        .map(|(_, data)| data)
        .context("Server returned an image without base64 data")?;
    std::fs::write(out, STANDARD.decode(data)?)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    store.increment_usage(UsageCategory::Image);
    println!("Scene: {}", illustration.highlight.trim());
    println!("Saved {}", out.display());
    Ok(())
}

fn show_profile(store: &Store) {
    let Some(profile) = &store.profile else {
        println!("No profile yet. Run `voice profile set --bio ...`.");
        return;
    };
    println!("简介: {}", profile.bio);
    println!("语气: {}", profile.tone.label());
    println!("避免: {}", profile.avoid_words.join(", "));
    println!("兴趣: {}", profile.interests.join(", "));
    for platform in Platform::ALL {
        if let Some(persona) = profile.persona_for(platform) {
            println!(
                "{} 人设: {} / {} / {}",
                platform.display_name(),
                persona.platform_bio,
                persona.tone,
                persona.style_notes
            );
        }
    }
}

async fn run(cli: Cli, api: Arc<ApiClient>, store: SharedStore) -> Result<()> {
    match cli.command {
        Commands::Transform {
            content,
            platform,
            length,
            language,
            audience,
            angle,
            all,
        } => {
            let outcome = transform(
                api,
                store.clone(),
                content,
                platform,
                length,
                language,
                audience,
                angle,
                all,
            )
            .await;
            if let Err(e) = &outcome {
                if let Some(ClientError::RateLimited(category)) = e.downcast_ref::<ClientError>() {
                    println!("{}", category.limit_warning());
                    return Ok(());
                }
            }
            outcome?;
        }
        Commands::Chat {
            message,
            image,
            new,
            card,
        } => chat(api, store.clone(), message, image, new, card).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => show_profile(&*lock(&store)),
            ProfileAction::Set {
                bio,
                tone,
                avoid_words,
                interests,
            } => {
                let mut store = lock(&store);
                let platform_personas = store
                    .profile
                    .as_ref()
                    .and_then(|p| p.platform_personas.clone());
                store.set_profile(Profile {
                    bio,
                    tone,
                    avoid_words,
                    interests,
                    platform_personas,
                });
                store.complete_onboarding();
                println!("Profile saved.");
            }
            ProfileAction::Persona { platform, answers } => {
                let mut snapshot = lock(&store).clone();
                persona(&api, &mut snapshot, platform, answers).await?;
                *lock(&store) = snapshot;
            }
        },
        Commands::Capture { action } => {
            let mut store = lock(&store);
            match action {
                CaptureAction::Add { text, image } => {
                    let capture = Capture {
                        id: new_id(),
                        text,
                        image: image.as_deref().map(image_data_uri).transpose()?,
                        timestamp: now_millis(),
                    };
                    println!("{}", capture.id);
                    store.add_capture(capture);
                }
                CaptureAction::List => {
                    for capture in &store.captures {
                        let when = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(capture.timestamp)
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        let image = if capture.image.is_some() { " [图片]" } else { "" };
                        println!("{}  {when}  {}{image}", capture.id, capture.text);
                    }
                }
                CaptureAction::Delete { id } => store.delete_capture(&id),
            }
        }
        Commands::Illustrate {
            content,
            prompt,
            out,
        } => {
            let mut snapshot = lock(&store).clone();
            illustrate(&api, &mut snapshot, &content, prompt.as_deref(), &out).await?;
            *lock(&store) = snapshot;
        }
        Commands::Usage => {
            let store = lock(&store);
            for category in UsageCategory::ALL {
                let check = store.check_rate_limit(category);
                println!(
                    "{:<10} {:>3} / {:<3} (remaining {})",
                    category.as_str(),
                    category.daily_limit() - check.remaining,
                    category.daily_limit(),
                    check.remaining
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_api=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    let store = Store::load(store_path)?.into_shared();
    let api = Arc::new(ApiClient::new(cli.server.clone())?);

    let outcome = run(cli, api, store.clone()).await;

    lock(&store).save()?;
    outcome
}

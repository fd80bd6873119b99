use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use stones::api::types::{ContentKind, MemorialKind, Resolution, SocialPlatform};
use stones::api::{ApiClient, ApiError};
use stones::config::{ClientConfig, ConfigError, normalize_base_url};
use stones::flow::auth::{validate_login, validate_registration};
use stones::flow::connections::ConnectionsView;
use stones::flow::memorial::NewMemorial;
use stones::flow::voice::RECORDING_PROMPTS;
use stones::flow::{ContentFlow, FlowError, ReviewFlow, VoiceRecorder};
use stones::render::{RenderPhase, RenderView};
use stones::session::{Session, SessionError};
use stones::ui::{CardVariant, Toggle, progress_bar, render_card};

const PROGRESS_WIDTH: usize = 30;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("render failed: {0}")]
    RenderFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "stones", about = "Create narrated video memorials from the command line")]
struct Cli {
    #[arg(long, env = "STONES_API_URL")]
    base_url: Option<String>,

    #[arg(long, env = "STONES_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Project(ProjectCommand),
    Content(ContentCommand),
    Narrative(NarrativeCommand),
    Voice(VoiceCommand),
    /// Render a project's video and follow it to completion.
    Render(RenderArgs),
    Video(VideoCommand),
    Connections(ConnectionsCommand),
    Import(ImportCommand),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "STONES_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STONES_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Me,
}

#[derive(Args, Debug)]
struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProjectSubcommand {
    List,
    Create {
        #[arg(long, default_value = "milestone")]
        kind: MemorialKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Show {
        project_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ContentCommand {
    #[command(subcommand)]
    command: ContentSubcommand,
}

#[derive(Subcommand, Debug)]
enum ContentSubcommand {
    /// Mark every item except `--exclude` as included, then generate the narrative.
    Select {
        project_id: Uuid,
        #[arg(long, num_args = 1..)]
        exclude: Vec<Uuid>,
    },
}

#[derive(Args, Debug)]
struct NarrativeCommand {
    #[command(subcommand)]
    command: NarrativeSubcommand,
}

#[derive(Subcommand, Debug)]
enum NarrativeSubcommand {
    Show {
        project_id: Uuid,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct VoiceCommand {
    #[command(subcommand)]
    command: VoiceSubcommand,
}

#[derive(Subcommand, Debug)]
enum VoiceSubcommand {
    List,
    /// Print the three recording prompts.
    Prompts,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "sample", required = true, num_args = 1, help = "One audio file per prompt, in order")]
        samples: Vec<PathBuf>,
    },
    Use {
        project_id: Uuid,
        profile_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    project_id: Uuid,

    #[arg(long, default_value = "1080p")]
    resolution: Resolution,

    #[arg(long, default_value_t = 0, help = "Re-issue a failed render this many times")]
    retries: u32,
}

#[derive(Args, Debug)]
struct VideoCommand {
    #[command(subcommand)]
    command: VideoSubcommand,
}

#[derive(Subcommand, Debug)]
enum VideoSubcommand {
    List {
        project_id: Uuid,
    },
    Status {
        project_id: Uuid,
        video_id: Uuid,
        #[arg(long, default_value_t = false)]
        follow: bool,
    },
}

#[derive(Args, Debug)]
struct ConnectionsCommand {
    #[command(subcommand)]
    command: ConnectionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConnectionsSubcommand {
    List,
    /// Print the OAuth URL to open in a browser.
    Connect {
        platform: SocialPlatform,
    },
    Disconnect {
        platform: SocialPlatform,
    },
}

#[derive(Args, Debug)]
struct ImportCommand {
    #[command(subcommand)]
    command: ImportSubcommand,
}

#[derive(Subcommand, Debug)]
enum ImportSubcommand {
    Instagram {
        archive: PathBuf,
        #[arg(long)]
        project: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = normalize_base_url(base_url)?;
    }
    if let Some(path) = cli.token_file {
        config.token_file = Some(path);
    }
    let session = match &config.token_file {
        Some(path) => Session::persisted(path)?,
        None => Session::new(),
    };
    let client = Arc::new(ApiClient::new(&config, session)?);
    let cancel = cancel_on_ctrl_c();

    let result = match cli.command {
        Command::Auth(auth) => run_auth(&client, auth).await,
        Command::Project(project) => run_project(&client, project).await,
        Command::Content(content) => run_content(&client, content, &cancel).await,
        Command::Narrative(narrative) => run_narrative(&client, narrative).await,
        Command::Voice(voice) => run_voice(&client, voice, &cancel).await,
        Command::Render(args) => run_render(&client, &config, args, &cancel).await,
        Command::Video(video) => run_video(&client, &config, video, &cancel).await,
        Command::Connections(connections) => run_connections(&client, connections).await,
        Command::Import(import) => run_import(&client, import).await,
    };
    if matches!(&result, Err(CliError::Api(error)) if error.is_unauthorized()) {
        eprintln!("Session missing or expired; run `stones auth login`.");
    }
    result
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling");
            trigger.cancel();
        }
    });
    cancel
}

// =============================================================================
// AUTH & PROJECTS
// =============================================================================

async fn run_auth(client: &ApiClient, auth: AuthCommand) -> Result<(), CliError> {
    match auth.command {
        AuthSubcommand::Register { name, email, password } => {
            let request = validate_registration(&name, &email, &password)?;
            let response = client.register(&request).await?;
            eprintln!("Welcome, {}!", response.user.first_name());
            print_json(&response.user)
        }
        AuthSubcommand::Login { email, password } => {
            let request = validate_login(&email, &password)?;
            let response = client.login(&request).await?;
            eprintln!("Welcome back, {}!", response.user.first_name());
            if let Some(path) = client.session().store_path() {
                eprintln!("Token saved to {}", path.display());
            }
            print_json(&response.user)
        }
        AuthSubcommand::Logout => {
            if let Err(error) = client.logout().await {
                warn!(%error, "server logout failed; local token cleared anyway");
            }
            eprintln!("Signed out.");
            Ok(())
        }
        AuthSubcommand::Me => {
            if !client.session().is_authenticated() {
                return Err(CliError::NotFound("not signed in".into()));
            }
            print_json(&client.me().await?)
        }
    }
}

async fn run_project(client: &ApiClient, project: ProjectCommand) -> Result<(), CliError> {
    match project.command {
        ProjectSubcommand::List => print_json(&client.list_projects().await?),
        ProjectSubcommand::Create { kind, title, description, from, to } => {
            let form = NewMemorial { description, timeframe_start: from, timeframe_end: to, ..NewMemorial::new(kind, title) };
            let request = form.validate()?;
            let created = client.create_project(&request).await?;
            info!(project_id = %created.id, kind = kind.as_str(), "project created");
            print_json(&created)
        }
        ProjectSubcommand::Show { project_id } => {
            let (project, content, narrative) = tokio::try_join!(
                client.get_project(project_id),
                client.list_content(project_id),
                client.latest_narrative(project_id),
            )?;
            print_json(&serde_json::json!({
                "project": project,
                "content": content,
                "narrative": narrative,
            }))
        }
    }
}

// =============================================================================
// CONTENT, NARRATIVE & VOICE
// =============================================================================

async fn run_content(
    client: &Arc<ApiClient>,
    content: ContentCommand,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match content.command {
        ContentSubcommand::Select { project_id, exclude } => {
            let mut flow = ContentFlow::new(Arc::clone(client), project_id);
            flow.load(cancel).await?;
            let mut toggles: Vec<Toggle> = flow
                .items()
                .iter()
                .map(|item| {
                    let label = match item.kind {
                        ContentKind::Photo => "Photo",
                        ContentKind::Video => "Video",
                    };
                    let toggle = Toggle::new(label, flow.selection().is_selected(item.id)).with_id(item.id.to_string());
                    match item.original_caption.as_deref() {
                        Some(caption) => toggle.with_description(caption),
                        None => toggle,
                    }
                })
                .collect();
            for id in exclude {
                let key = id.to_string();
                let toggle = toggles
                    .iter_mut()
                    .find(|toggle| toggle.id() == key)
                    .ok_or_else(|| CliError::NotFound(format!("content item {id} is not part of project {project_id}")))?;
                if toggle.checked {
                    toggle.flip();
                }
                flow.selection_mut().set(id, toggle.checked);
            }
            for toggle in &toggles {
                eprintln!("{}", toggle.render());
            }
            eprintln!("{} of {} items selected", flow.selection().len(), flow.selection().total());

            let narrative = flow.submit(cancel).await?;
            print_json(&narrative)
        }
    }
}

async fn run_narrative(client: &ApiClient, narrative: NarrativeCommand) -> Result<(), CliError> {
    match narrative.command {
        NarrativeSubcommand::Show { project_id, json } => {
            let narrative = client
                .latest_narrative(project_id)
                .await?
                .ok_or_else(|| CliError::NotFound(format!("project {project_id} has no narrative yet")))?;
            if json {
                return print_json(&narrative);
            }
            let title = format!(
                "Narrative v{} ({} words, ~{}s)",
                narrative.version,
                narrative.words(),
                narrative.estimated_duration_seconds.unwrap_or(0)
            );
            println!("{}", render_card(&title, &narrative.script_text, CardVariant::Elevated));
            Ok(())
        }
    }
}

async fn run_voice(client: &Arc<ApiClient>, voice: VoiceCommand, cancel: &CancellationToken) -> Result<(), CliError> {
    let recorder = VoiceRecorder::new(Arc::clone(client));
    match voice.command {
        VoiceSubcommand::List => print_json(&recorder.existing(cancel).await?),
        VoiceSubcommand::Prompts => {
            for (step, prompt) in RECORDING_PROMPTS.iter().enumerate() {
                let title = format!("{}. {}", step + 1, prompt.title);
                let body = format!("{}\n\n{}", prompt.description, prompt.script);
                println!("{}\n", render_card(&title, &body, CardVariant::Outlined));
            }
            Ok(())
        }
        VoiceSubcommand::Create { name, samples } => {
            if samples.len() != RECORDING_PROMPTS.len() {
                let message = format!("expected {} --sample files, got {}", RECORDING_PROMPTS.len(), samples.len());
                return Err(FlowError::Validation(message).into());
            }
            let mut recorder = recorder;
            for path in &samples {
                recorder.record(read_file(path).await?);
                recorder.advance()?;
            }
            let profile = recorder.submit(&name, cancel).await?;
            print_json(&profile)
        }
        VoiceSubcommand::Use { project_id, profile_id } => {
            let project = recorder.select_existing(project_id, profile_id, cancel).await?;
            print_json(&project)
        }
    }
}

// =============================================================================
// RENDER & VIDEOS
// =============================================================================

async fn run_render(
    client: &Arc<ApiClient>,
    config: &ClientConfig,
    args: RenderArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut flow = ReviewFlow::new(Arc::clone(client), args.project_id, config.poll);
    flow.load(cancel).await?;
    if let (Some(narrative), Some(voice)) = (flow.narrative(), flow.voice()) {
        eprintln!("Rendering narrative v{} in voice \"{}\" at {}", narrative.version, voice.name, args.resolution.as_str());
    }

    let progress = spawn_progress(flow.subscribe());
    let mut outcome = flow.generate_video(args.resolution, cancel).await;
    let mut attempt = 0;
    while attempt < args.retries && flow.can_retry() {
        attempt += 1;
        match &outcome {
            Ok(view) => warn!(attempt, message = view.error_message.as_deref().unwrap_or(""), "render failed; retrying"),
            Err(error) => warn!(attempt, %error, "render request failed; retrying"),
        }
        outcome = flow.retry_render(cancel).await;
    }
    stop_progress(progress, &flow.render_view()).await;

    let view = outcome?;
    print_json(&view)?;
    finish(view)
}

async fn run_video(
    client: &Arc<ApiClient>,
    config: &ClientConfig,
    video: VideoCommand,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match video.command {
        VideoSubcommand::List { project_id } => print_json(&client.list_videos(project_id).await?),
        VideoSubcommand::Status { project_id, video_id, follow: false } => {
            print_json(&client.get_video(project_id, video_id).await?)
        }
        VideoSubcommand::Status { project_id, video_id, follow: true } => {
            let mut flow = ReviewFlow::new(Arc::clone(client), project_id, config.poll);
            let progress = spawn_progress(flow.subscribe());
            let outcome = flow.follow(video_id, cancel).await;
            stop_progress(progress, &flow.render_view()).await;

            let view = outcome?;
            print_json(&view)?;
            finish(view)
        }
    }
}

fn spawn_progress(mut updates: watch::Receiver<RenderView>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            eprint!("\r{} {:<9}", progress_bar(view.progress, PROGRESS_WIDTH), view.phase.label());
        }
    })
}

/// Stop the progress task, then draw the final view so the last frame is
/// never stale.
async fn stop_progress(progress: tokio::task::JoinHandle<()>, last: &RenderView) {
    progress.abort();
    // An aborted task resolves to a cancellation error.
    let _ = progress.await;
    eprintln!("\r{} {:<9}", progress_bar(last.progress, PROGRESS_WIDTH), last.phase.label());
}

fn finish(view: RenderView) -> Result<(), CliError> {
    match view.phase {
        RenderPhase::Failed => Err(CliError::RenderFailed(view.error_message.unwrap_or_default())),
        _ => {
            if let Some(url) = view.download_url {
                eprintln!("Download: {url}");
            }
            Ok(())
        }
    }
}

// =============================================================================
// CONNECTIONS & IMPORT
// =============================================================================

async fn run_connections(client: &ApiClient, connections: ConnectionsCommand) -> Result<(), CliError> {
    match connections.command {
        ConnectionsSubcommand::List => {
            let view = ConnectionsView::new(client.list_connections().await?);
            print_json(&view.rows())
        }
        ConnectionsSubcommand::Connect { platform } => {
            let view = ConnectionsView::new(client.list_connections().await?);
            if view.is_connected(platform) {
                eprintln!("{} is already connected.", platform.display_name());
                return Ok(());
            }
            let url = client.connect_url(platform).await?;
            eprintln!("Open this URL to connect {}:", platform.display_name());
            println!("{url}");
            Ok(())
        }
        ConnectionsSubcommand::Disconnect { platform } => {
            let mut view = ConnectionsView::new(client.list_connections().await?);
            let connection_id = view
                .connection_for(platform)
                .map(|c| c.id)
                .ok_or_else(|| CliError::NotFound(format!("{} is not connected", platform.display_name())))?;
            client.disconnect(connection_id).await?;
            view.remove(connection_id);
            print_json(&view.rows())
        }
    }
}

async fn run_import(client: &ApiClient, import: ImportCommand) -> Result<(), CliError> {
    match import.command {
        ImportSubcommand::Instagram { archive, project } => {
            let bytes = read_file(&archive).await?;
            info!(path = %archive.display(), bytes = bytes.len(), "uploading instagram archive");
            let result = client.import_instagram_archive(bytes, project).await?;
            print_json(&result)
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path).await.map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

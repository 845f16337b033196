//! zenfeeds - curate feeds of YouTube channels and read them newest-first.

/// Application configuration (TOML).
mod config;
/// Config-backed sign-in.
mod identity;
/// Plain-text output.
mod render;
/// Terminal UI components.
mod tui;

use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use regex::Regex;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_BASE_URL_ENV, API_KEY_ENV, AppConfig, resolve_config_path};
use crate::identity::{ProfileIdentity, SIGN_IN_FAILED};
use crate::render::{render_feed, render_feed_list, render_search_results};
use zenfeeds_api::youtube::{LocalYoutubeApi, YoutubeClient};
use zenfeeds_db::ChannelRef;
use zenfeeds_feed::mutations::{create_feed, delete_feed};
use zenfeeds_feed::{
    Aggregator, FeedSession, FeedUpdate, Identity, LocalDocumentStore, Navigation, SqliteStore,
    UserIdentity,
};

/// Shape of a YouTube channel ID.
#[allow(clippy::expect_used)]
static CHANNEL_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("failed to compile channel id regex")
});

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Sign in as a user.
    Login(LoginArgs),
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Search YouTube channels.
    Search(SearchArgs),
    /// Manage and read feeds.
    Feeds(FeedsCommand),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// User ID. Prompted for on stdin when omitted.
    #[arg(long)]
    uid: Option<String>,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Free-text query (e.g. "rust programming").
    query: String,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: clap_complete::Shell,
}

/// Arguments for the `feeds` subcommand.
#[derive(clap::Args)]
struct FeedsCommand {
    /// Feeds subcommand to run.
    #[command(subcommand)]
    command: FeedsSubcommands,
}

/// Available feeds subcommands.
#[derive(Subcommand)]
enum FeedsSubcommands {
    /// List all feeds.
    List,
    /// Create an empty feed.
    Create(CreateArgs),
    /// Print a feed's videos, newest first.
    Show(FeedArgs),
    /// Browse a feed's videos via TUI.
    View(FeedArgs),
    /// Add a channel to a feed.
    AddChannel(AddChannelArgs),
    /// Rename a feed, change its image or remove channels.
    Edit(EditArgs),
    /// Delete a feed.
    Delete(DeleteArgs),
}

/// Arguments for the `feeds create` subcommand.
#[derive(clap::Args)]
struct CreateArgs {
    /// Feed name.
    name: String,
    /// Cover image URL.
    #[arg(long, default_value = "")]
    image: String,
}

/// Arguments naming one feed.
#[derive(clap::Args)]
struct FeedArgs {
    /// Feed name.
    feed: String,
}

/// Arguments for the `feeds add-channel` subcommand.
#[derive(clap::Args)]
struct AddChannelArgs {
    /// Feed name.
    feed: String,
    /// Channel ID (e.g. "UCaYhcUwRBNscFNUKTjgPFiA").
    #[arg(long, required = true)]
    channel_id: String,
    /// Channel title. Looked up from YouTube when omitted.
    #[arg(long)]
    title: Option<String>,
}

/// Arguments for the `feeds edit` subcommand.
#[derive(clap::Args)]
struct EditArgs {
    /// Feed name.
    feed: String,
    /// New feed name.
    #[arg(long)]
    rename: Option<String>,
    /// New cover image URL.
    #[arg(long)]
    image: Option<String>,
    /// Channel ID to remove (repeatable).
    #[arg(long = "remove-channel")]
    remove_channels: Vec<String>,
}

/// Arguments for the `feeds delete` subcommand.
#[derive(clap::Args)]
struct DeleteArgs {
    /// Feed name.
    feed: String,
    /// Confirm deletion.
    #[arg(long)]
    yes: bool,
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<(PathBuf, AppConfig)> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok((config_path, config))
}

/// Returns the signed-in user and the config.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the config cannot be read.
fn signed_in(dir: Option<&PathBuf>) -> Result<(UserIdentity, AppConfig)> {
    let (config_path, config) = load_config(dir)?;
    let user = ProfileIdentity::new(config_path, None).require_user()?;
    Ok((user, config))
}

/// Builds a `YoutubeClient` from the environment and config.
///
/// # Errors
///
/// Returns an error if no API key is configured or the client fails to build.
#[instrument(skip_all)]
fn build_youtube_client(config: &AppConfig) -> Result<YoutubeClient> {
    let api_key = config
        .youtube
        .resolve_api_key(std::env::var(API_KEY_ENV).ok())?;

    let mut builder = YoutubeClient::builder()
        .api_key(api_key)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .min_interval(config.youtube.min_interval())
        .max_results(config.youtube.max_results);
    if let Some(base_url) = config
        .youtube
        .resolve_base_url(std::env::var(API_BASE_URL_ENV).ok())?
    {
        tracing::debug!(%base_url, "using YouTube API base URL override");
        builder = builder.base_url(base_url);
    }

    builder
        .build()
        .context("failed to build YouTube client")
}

/// Runs the `login` subcommand.
///
/// # Errors
///
/// Returns `Failed to sign in` for any sign-in failure.
#[instrument(skip_all)]
fn run_login(args: &LoginArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let identity = ProfileIdentity::new(config_path, args.uid.clone());

    match identity.sign_in() {
        Ok(user) => {
            tracing::info!("Signed in as {}", user.uid);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %format!("{e:#}"), "sign-in failed");
            Err(anyhow!(SIGN_IN_FAILED))
        }
    }
}

/// Runs the `logout` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be read or written.
#[instrument(skip_all)]
fn run_logout(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    match ProfileIdentity::new(config_path, None).sign_out()? {
        Some(uid) => tracing::info!("Signed out {uid}"),
        None => tracing::info!("Not signed in."),
    }
    Ok(())
}

/// Runs the `whoami` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be read.
#[instrument(skip_all)]
fn run_whoami(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    match ProfileIdentity::new(config_path, None).current_user()? {
        Some(user) => tracing::info!("{}", user.uid),
        None => tracing::info!("Not signed in."),
    }
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (_, config) = load_config(dir)?;
    let client = build_youtube_client(&config)?;

    let results = client
        .search_channels(&args.query)
        .await
        .context("channel search failed")?;
    render_search_results(&results);

    Ok(())
}

/// Runs the `feeds list` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the store fails.
#[instrument(skip_all)]
async fn run_feeds_list(dir: Option<&PathBuf>) -> Result<()> {
    let (user, _) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;

    let record = store
        .read_record(&user.uid)
        .await
        .context("failed to read feeds")?;
    let feeds = record.map(|r| r.feeds).unwrap_or_default();
    render_feed_list(&feeds);

    Ok(())
}

/// Runs the `feeds create` subcommand.
///
/// # Errors
///
/// Returns an error if the name is rejected or the store fails.
#[instrument(skip_all)]
async fn run_feeds_create(args: &CreateArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (user, _) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;

    let feed = create_feed(&store, &user.uid, &args.name, &args.image).await?;
    tracing::info!("Created feed \"{}\"", feed.name);

    Ok(())
}

/// Runs the `feeds show` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the client fails to build.
#[instrument(skip_all)]
async fn run_feeds_show(args: &FeedArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (user, config) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;
    let client = build_youtube_client(&config)?;
    let aggregator =
        Aggregator::new(&client, &store).max_concurrency(config.youtube.max_concurrency);

    let mut session = FeedSession::new(aggregator, user.uid, args.feed.as_str());
    session.refresh().await;
    render_feed(session.state());

    Ok(())
}

/// Runs the `feeds view` subcommand.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the client fails to build or
/// the TUI fails.
#[instrument(skip_all)]
async fn run_feeds_view(args: &FeedArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (user, config) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;
    let client = build_youtube_client(&config)?;
    let aggregator =
        Aggregator::new(&client, &store).max_concurrency(config.youtube.max_concurrency);

    let mut session = FeedSession::new(aggregator, user.uid, args.feed.as_str())
        .settle_delay(config.feed.settle_delay());
    let navigation = crate::tui::run_feed_viewer(&mut session)
        .await
        .context("feed viewer TUI failed")?;

    if navigation == Some(Navigation::Home) {
        tracing::info!("Deleted feed \"{}\"", session.state().feed_name());
        run_feeds_list(dir).await?;
    }

    Ok(())
}

/// Runs the `feeds add-channel` subcommand.
///
/// Looks the title up from YouTube when `--title` is omitted, then prints
/// the re-resolved feed.
///
/// # Errors
///
/// Returns an error if the channel ID is malformed, the lookup fails or
/// the feed could not be updated.
#[instrument(skip_all)]
async fn run_feeds_add_channel(args: &AddChannelArgs, dir: Option<&PathBuf>) -> Result<()> {
    let channel_id = args.channel_id.trim();
    if !CHANNEL_ID_RE.is_match(channel_id) {
        bail!("invalid channel id: {channel_id}");
    }

    let (user, config) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;
    let client = build_youtube_client(&config)?;

    let title = match args.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => String::from(title),
        _ => {
            client
                .channel_details(channel_id)
                .await
                .context("failed to look up channel")?
                .snippet
                .title
        }
    };

    let aggregator =
        Aggregator::new(&client, &store).max_concurrency(config.youtube.max_concurrency);
    let mut session = FeedSession::new(aggregator, user.uid, args.feed.as_str())
        .settle_delay(config.feed.settle_delay());

    if session
        .add_channel(ChannelRef::new(channel_id, title.as_str()))
        .await
        .is_none()
    {
        bail!("failed to add channel to feed \"{}\"", args.feed);
    }
    tracing::info!("Added {title} ({channel_id})");
    render_feed(session.state());

    Ok(())
}

/// Runs the `feeds edit` subcommand.
///
/// # Errors
///
/// Returns an error if the feed could not be updated.
#[instrument(skip_all)]
async fn run_feeds_edit(args: &EditArgs, dir: Option<&PathBuf>) -> Result<()> {
    let update = FeedUpdate {
        name: args.rename.clone(),
        image: args.image.clone(),
        channels: None,
        remove_channel_ids: args.remove_channels.clone(),
    };
    if update.is_empty() {
        tracing::info!("Nothing to change. Pass --rename, --image or --remove-channel.");
        return Ok(());
    }

    let (user, config) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;
    let client = build_youtube_client(&config)?;
    let aggregator =
        Aggregator::new(&client, &store).max_concurrency(config.youtube.max_concurrency);
    let mut session = FeedSession::new(aggregator, user.uid, args.feed.as_str())
        .settle_delay(config.feed.settle_delay());

    match session.update(&update).await {
        Some(Navigation::Feed(name)) => {
            tracing::info!("Feed renamed; it now lives at `zenfeeds feeds show {name:?}`");
        }
        Some(Navigation::Stay | Navigation::Home) => {}
        None => bail!("failed to update feed \"{}\"", args.feed),
    }
    render_feed(session.state());

    Ok(())
}

/// Runs the `feeds delete` subcommand.
///
/// # Errors
///
/// Returns an error if the feed does not exist or the store fails.
#[instrument(skip_all)]
async fn run_feeds_delete(args: &DeleteArgs, dir: Option<&PathBuf>) -> Result<()> {
    if !args.yes {
        tracing::info!(
            "This permanently deletes feed \"{}\". Pass --yes to confirm.",
            args.feed
        );
        return Ok(());
    }

    let (user, _) = signed_in(dir)?;
    let store = SqliteStore::open(dir)?;

    if !delete_feed(&store, &user.uid, &args.feed).await? {
        bail!("feed not found: {}", args.feed);
    }
    tracing::info!("Deleted feed \"{}\"", args.feed);

    Ok(())
}

/// Runs the `completions` subcommand.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, env!("CARGO_BIN_NAME"), &mut io::stdout());
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Login(args) => run_login(&args, dir),
        Commands::Logout => run_logout(dir),
        Commands::Whoami => run_whoami(dir),
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Feeds(feeds) => match feeds.command {
            FeedsSubcommands::List => run_feeds_list(dir).await,
            FeedsSubcommands::Create(args) => run_feeds_create(&args, dir).await,
            FeedsSubcommands::Show(args) => run_feeds_show(&args, dir).await,
            FeedsSubcommands::View(args) => run_feeds_view(&args, dir).await,
            FeedsSubcommands::AddChannel(args) => run_feeds_add_channel(&args, dir).await,
            FeedsSubcommands::Edit(args) => run_feeds_edit(&args, dir).await,
            FeedsSubcommands::Delete(args) => run_feeds_delete(&args, dir).await,
        },
        Commands::Completions(args) => {
            run_completions(&args);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        // Arrange & Act & Assert
        Cli::command().debug_assert();
    }

    #[test]
    fn test_channel_id_pattern() {
        // Arrange & Act & Assert
        assert!(CHANNEL_ID_RE.is_match("UCaYhcUwRBNscFNUKTjgPFiA"));
        assert!(CHANNEL_ID_RE.is_match("UC_iD0xppBwwsrM9DegC5cQQ"));
        assert!(!CHANNEL_ID_RE.is_match("UCaYhcUw"));
        assert!(!CHANNEL_ID_RE.is_match("@rustvideos"));
        assert!(!CHANNEL_ID_RE.is_match(""));
    }
}

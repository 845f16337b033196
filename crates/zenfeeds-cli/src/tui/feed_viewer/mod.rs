//! Feed viewer TUI main loop.
//!
//! Aggregation passes run on the same thread as the event loop; their
//! events are tagged with the [`RunId`] they belong to and applied to the
//! session state, which drops events of superseded passes.

/// Feed viewer state types.
pub mod state;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use zenfeeds_api::youtube::LocalYoutubeApi;
use zenfeeds_db::ChannelRef;
use zenfeeds_feed::{FeedSession, FeedUpdate, LocalDocumentStore, Navigation, PassEvent, RunId};

use self::state::{ViewerAction, ViewerState};

/// Spinner frame interval.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the feed viewer TUI for `session` and starts its first pass.
///
/// Returns the navigation requested by the user: `Some(Home)` after the
/// feed was deleted, `None` when the viewer was simply closed.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
#[allow(clippy::future_not_send)]
pub async fn run_feed_viewer<'a, A, S>(
    session: &mut FeedSession<'a, A, S>,
) -> Result<Option<Navigation>>
where
    A: LocalYoutubeApi + Sync + 'a,
    S: LocalDocumentStore + Sync + 'a,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, session).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// In-flight passes. Superseded passes are dropped with the set.
type Passes<'a> = FuturesUnordered<LocalBoxFuture<'a, ()>>;

/// Main event loop.
#[allow(clippy::future_not_send)]
async fn run_event_loop<'a, A, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut FeedSession<'a, A, S>,
) -> Result<Option<Navigation>>
where
    A: LocalYoutubeApi + Sync + 'a,
    S: LocalDocumentStore + Sync + 'a,
{
    let mut viewer = ViewerState::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<(RunId, PassEvent)>();
    let mut passes = start_pass(session, &tx);
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK_INTERVAL);

    loop {
        terminal
            .draw(|frame| ui::draw(frame, session.state(), &mut viewer))
            .context("failed to draw TUI")?;

        tokio::select! {
            Some(()) = passes.next(), if !passes.is_empty() => {}
            Some((run, event)) = rx.recv() => {
                if session.state_mut().apply(run, event) {
                    viewer.clamp(session.state().videos().len());
                }
            }
            _ = tick.tick(), if session.state().phase().is_loading() => viewer.tick(),
            maybe_event = events.next() => {
                let key = match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => key,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e).context("failed to read event"),
                    None => return Ok(None),
                };

                match viewer.handle_key(session.state(), key.code, key.modifiers) {
                    ViewerAction::None => {}
                    ViewerAction::Quit => return Ok(None),
                    ViewerAction::Refresh => {
                        passes = start_pass(session, &tx);
                    }
                    ViewerAction::Open(url) => {
                        if let Err(e) = open::that(&url) {
                            tracing::warn!(url, error = %e, "failed to open browser");
                            viewer.set_status(format!("Could not open {url}"));
                        }
                    }
                    ViewerAction::Delete => match session.delete().await {
                        Some(nav) => return Ok(Some(nav)),
                        None => viewer.set_status("Failed to delete feed"),
                    },
                    ViewerAction::AddChannel(channel_id) => {
                        passes = Passes::new();
                        viewer.set_status(format!("Adding {channel_id}..."));
                        terminal
                            .draw(|frame| ui::draw(frame, session.state(), &mut viewer))
                            .context("failed to draw TUI")?;
                        let status = add_channel(session, &channel_id).await;
                        viewer.set_status(status);
                        viewer.clamp(session.state().videos().len());
                    }
                    ViewerAction::Rename(name) => {
                        passes = Passes::new();
                        let update = FeedUpdate {
                            name: Some(name),
                            ..FeedUpdate::default()
                        };
                        let status = match session.update(&update).await {
                            Some(Navigation::Feed(name)) => format!("Renamed to \"{name}\""),
                            Some(Navigation::Stay | Navigation::Home) => {
                                String::from("Name unchanged")
                            }
                            None => String::from("Failed to rename feed"),
                        };
                        viewer.set_status(status);
                        viewer.clamp(session.state().videos().len());
                    }
                    ViewerAction::SetImage(image) => {
                        passes = Passes::new();
                        let update = FeedUpdate {
                            image: Some(image),
                            ..FeedUpdate::default()
                        };
                        let status = if session.update(&update).await.is_some() {
                            "Cover image updated"
                        } else {
                            "Failed to update cover image"
                        };
                        viewer.set_status(status);
                        viewer.clamp(session.state().videos().len());
                    }
                }
            }
        }
    }
}

/// Looks up `channel_id` and adds it to the session's feed.
///
/// Returns the status line to show.
#[allow(clippy::future_not_send)]
async fn add_channel<'a, A, S>(session: &mut FeedSession<'a, A, S>, channel_id: &str) -> String
where
    A: LocalYoutubeApi + Sync + 'a,
    S: LocalDocumentStore + Sync + 'a,
{
    if !crate::CHANNEL_ID_RE.is_match(channel_id) {
        return format!("Invalid channel id: {channel_id}");
    }

    let title = match session.aggregator().api().channel_details(channel_id).await {
        Ok(details) => details.snippet.title,
        Err(e) => {
            tracing::warn!(channel_id, error = %format!("{e:#}"), "failed to look up channel");
            return format!("Channel not found: {channel_id}");
        }
    };

    match session.add_channel(ChannelRef::new(channel_id, title.as_str())).await {
        Some(_) => format!("Added {title}"),
        None => String::from("Failed to add channel"),
    }
}

/// Begins a new pass on the session state and returns it as the only
/// in-flight pass. The previous set of passes is dropped by the caller.
fn start_pass<'a, A, S>(
    session: &mut FeedSession<'a, A, S>,
    tx: &mpsc::UnboundedSender<(RunId, PassEvent)>,
) -> Passes<'a>
where
    A: LocalYoutubeApi + Sync + 'a,
    S: LocalDocumentStore + Sync + 'a,
{
    let run = session.state_mut().begin_pass();
    let aggregator = session.aggregator();
    let uid = String::from(session.uid());
    let name = String::from(session.state().feed_name());
    let tx = tx.clone();

    tracing::debug!(run = run.get(), feed = %name, "starting pass");

    let pass = async move {
        aggregator
            .run_pass(&uid, &name, |event| {
                // The receiver lives as long as the event loop.
                let _ = tx.send((run, event));
            })
            .await;
    }
    .boxed_local();

    let passes = FuturesUnordered::new();
    passes.push(pass);
    passes
}

//! Feed viewer TUI state management.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::widgets::TableState;
use zenfeeds_feed::FeedViewState;

/// Braille spinner frames shown while a pass is loading.
const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerAction {
    /// Nothing beyond the state change already applied.
    None,
    /// Leave the viewer.
    Quit,
    /// Start a new pass that supersedes the current one.
    Refresh,
    /// Open this URL in the browser.
    Open(String),
    /// Delete the feed (already confirmed).
    Delete,
    /// Add the channel with this ID.
    AddChannel(String),
    /// Rename the feed.
    Rename(String),
    /// Replace the cover image URL.
    SetImage(String),
}

/// What a text prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Channel ID to add.
    AddChannel,
    /// New feed name.
    Rename,
    /// New cover image URL.
    Image,
}

impl PromptKind {
    /// Label shown before the typed text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddChannel => "Channel ID",
            Self::Rename => "New name",
            Self::Image => "Image URL",
        }
    }
}

/// Key input mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation keys.
    #[default]
    Normal,
    /// Typing into a prompt.
    Prompt(PromptKind),
}

/// UI-only state of the feed viewer (selection, spinner, prompts).
///
/// Feed data lives in [`FeedViewState`]; this struct never copies it.
#[derive(Debug, Default)]
pub struct ViewerState {
    /// Table state for the video list.
    pub table_state: TableState,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Text typed into the open prompt.
    pub input: String,
    spinner: usize,
    confirm_delete: bool,
    status: Option<String>,
}

impl ViewerState {
    /// Creates a viewer with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected row index.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// Current spinner frame.
    #[must_use]
    pub fn spinner_frame(&self) -> char {
        SPINNER_FRAMES.get(self.spinner).copied().unwrap_or(' ')
    }

    /// Advances the spinner by one frame.
    pub fn tick(&mut self) {
        self.spinner = self
            .spinner
            .wrapping_add(1)
            .checked_rem(SPINNER_FRAMES.len())
            .unwrap_or(0);
    }

    /// Returns `true` while the delete prompt is shown.
    #[must_use]
    pub const fn is_confirming_delete(&self) -> bool {
        self.confirm_delete
    }

    /// One-line status message, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Sets the status message.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Moves cursor up.
    pub fn move_up(&mut self) {
        let current = self.cursor();
        if current > 0 {
            self.table_state.select(Some(current.saturating_sub(1)));
        }
    }

    /// Moves cursor down within `len` rows.
    pub fn move_down(&mut self, len: usize) {
        let next = self.cursor().saturating_add(1);
        if next < len {
            self.table_state.select(Some(next));
        }
    }

    /// Keeps the selection inside a list of `len` rows.
    ///
    /// Selects the first row once a list appears and clears the
    /// selection when the list is empty.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.table_state.select(None);
        } else {
            let max = len.saturating_sub(1);
            self.table_state
                .select(Some(self.table_state.selected().unwrap_or(0).min(max)));
        }
    }

    /// Opens a prompt, prefilled with `initial`.
    fn open_prompt(&mut self, kind: PromptKind, initial: &str) {
        self.input_mode = InputMode::Prompt(kind);
        self.input = String::from(initial);
        self.status = None;
    }

    /// Handles a key while a prompt is open.
    fn handle_prompt_key(&mut self, kind: PromptKind, key: KeyCode) -> ViewerAction {
        match key {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
                ViewerAction::None
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let value = std::mem::take(&mut self.input);
                let value = value.trim();
                if value.is_empty() && kind != PromptKind::Image {
                    return ViewerAction::None;
                }
                let value = String::from(value);
                match kind {
                    PromptKind::AddChannel => ViewerAction::AddChannel(value),
                    PromptKind::Rename => ViewerAction::Rename(value),
                    PromptKind::Image => ViewerAction::SetImage(value),
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                ViewerAction::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                ViewerAction::None
            }
            _ => ViewerAction::None,
        }
    }

    /// Maps a key press to an action, updating the UI state on the way.
    pub fn handle_key(
        &mut self,
        feed: &FeedViewState,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> ViewerAction {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return ViewerAction::Quit;
        }

        if let InputMode::Prompt(kind) = self.input_mode {
            return self.handle_prompt_key(kind, key);
        }

        if self.confirm_delete {
            self.confirm_delete = false;
            return if matches!(key, KeyCode::Char('y' | 'Y')) {
                ViewerAction::Delete
            } else {
                self.status = None;
                ViewerAction::None
            };
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => ViewerAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                ViewerAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down(feed.videos().len());
                ViewerAction::None
            }
            KeyCode::Enter | KeyCode::Char('o') => feed
                .videos()
                .get(self.cursor())
                .and_then(|v| v.video.watch_url())
                .map_or(ViewerAction::None, ViewerAction::Open),
            KeyCode::Char('r') => {
                self.status = None;
                self.spinner = 0;
                ViewerAction::Refresh
            }
            KeyCode::Char('d') => {
                self.confirm_delete = true;
                self.status = Some(format!("Delete feed \"{}\"? (y/N)", feed.feed_name()));
                ViewerAction::None
            }
            KeyCode::Char('a') => {
                self.open_prompt(PromptKind::AddChannel, "");
                ViewerAction::None
            }
            KeyCode::Char('e') => {
                self.open_prompt(PromptKind::Rename, feed.feed_name());
                ViewerAction::None
            }
            KeyCode::Char('i') => {
                let image = feed.feed().map_or("", |f| f.image.as_str());
                self.open_prompt(PromptKind::Image, image);
                ViewerAction::None
            }
            _ => ViewerAction::None,
        }
    }
}

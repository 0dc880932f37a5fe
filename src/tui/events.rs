//! TUI Event System
//!
//! Terminal input and request completions share one channel; the App is only
//! ever mutated while handling one of these.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::api::{
    ApiError, AuthUrlResponse, CallbackResponse, CreateGoalsResponse, TodoLists, WeekProgress,
};

/// Events that can occur in the TUI
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// User pressed a key
    Key(KeyEvent),

    /// User pasted text
    Paste(String),

    /// Terminal was resized
    Resize(u16, u16),

    /// Tick event for the splash timer and spinner
    Tick,

    /// Week-progress fetch finished
    ProgressLoaded(Result<WeekProgress, ApiError>),

    /// Goal group submission finished
    SubmitFinished(Result<CreateGoalsResponse, ApiError>),

    /// Authorization code callback finished
    CallbackFinished(Result<CallbackResponse, ApiError>),

    /// Cached-token list lookup finished; `None` is a cache miss
    ListsLookup(Result<Option<TodoLists>, ApiError>),

    /// Authorization URL fetch finished
    AuthUrlLoaded(Result<AuthUrlResponse, ApiError>),

    /// Pasted code exchanged for lists
    CodeExchanged(Result<TodoLists, ApiError>),
}

/// Named views; exactly one is visible at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    /// Menu plus the progress panel
    Main,
    /// Goal group authoring form
    Create,
    /// Submission confirmation
    Success,
    /// Task lists through the auth relay
    Lists,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Splash => "",
            Self::Main => "Home",
            Self::Create => "New Goal Group",
            Self::Success => "Goals Sent",
            Self::Lists => "My Lists",
        }
    }
}

/// Event handler for the TUI
pub struct EventHandler {
    tx: mpsc::UnboundedSender<TuiEvent>,
    rx: mpsc::UnboundedReceiver<TuiEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Get a sender for sending events
    pub fn sender(&self) -> mpsc::UnboundedSender<TuiEvent> {
        self.tx.clone()
    }

    /// Receive the next event (blocks until available)
    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.rx.recv().await
    }

    /// Forward terminal input from crossterm's async `EventStream`, plus a
    /// `Tick` every 100ms. Stops once the receiver is gone.
    pub fn start_terminal_listener(tx: mpsc::UnboundedSender<TuiEvent>) {
        use crossterm::event::EventStream;
        use futures::StreamExt;
        use tokio::time::{Duration, MissedTickBehavior, interval};

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut ticker = interval(Duration::from_millis(100));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                let forwarded = tokio::select! {
                    maybe_event = reader.next() => match maybe_event {
                        Some(Ok(event)) => terminal_event(event),
                        Some(Err(e)) => {
                            tracing::warn!("Terminal event error: {}", e);
                            None
                        }
                        None => break,
                    },
                    _ = ticker.tick() => Some(TuiEvent::Tick),
                };

                if let Some(ev) = forwarded
                    && tx.send(ev).is_err()
                {
                    break;
                }
            }
        });
    }
}

/// Map a crossterm event to the one the App handles, if any.
fn terminal_event(event: crossterm::event::Event) -> Option<TuiEvent> {
    use crossterm::event::{Event, KeyEventKind};

    match event {
        // Press only; release/repeat would double every keystroke
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(TuiEvent::Key(key)),
        Event::Paste(text) => Some(TuiEvent::Paste(text)),
        Event::Resize(w, h) => Some(TuiEvent::Resize(w, h)),
        _ => None,
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to check if a key event matches
pub fn key_matches(event: &KeyEvent, code: KeyCode, modifiers: KeyModifiers) -> bool {
    event.code == code && event.modifiers == modifiers
}

/// Common key bindings
pub mod keys {
    use super::*;

    /// Ctrl+C - Quit
    pub fn is_quit(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    /// Escape - Cancel/Back
    pub fn is_cancel(event: &KeyEvent) -> bool {
        event.code == KeyCode::Esc
    }

    /// Enter - Select/Confirm
    pub fn is_enter(event: &KeyEvent) -> bool {
        event.code == KeyCode::Enter && event.modifiers.is_empty()
    }

    /// Tab or Down - next form field
    pub fn is_next_field(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Tab, KeyModifiers::NONE)
            || key_matches(event, KeyCode::Down, KeyModifiers::NONE)
    }

    /// Shift+Tab or Up - previous form field
    pub fn is_prev_field(event: &KeyEvent) -> bool {
        event.code == KeyCode::BackTab || key_matches(event, KeyCode::Up, KeyModifiers::NONE)
    }

    /// Ctrl+A - Add goal
    pub fn is_add_goal(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('a'), KeyModifiers::CONTROL)
    }

    /// Ctrl+D - Remove focused goal
    pub fn is_remove_goal(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('d'), KeyModifiers::CONTROL)
    }

    /// Ctrl+S - Submit the goal group
    pub fn is_submit(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    /// Ctrl+O - Open the authorization URL while typing a code
    pub fn is_open_url(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('o'), KeyModifiers::CONTROL)
    }

    /// Plain (or shifted) character meant as text input
    pub fn typed_char(event: &KeyEvent) -> Option<char> {
        match event.code {
            KeyCode::Char(c)
                if !event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    /// Single-letter shortcut, case-insensitive, no modifiers beyond Shift
    pub fn is_letter(event: &KeyEvent, letter: char) -> bool {
        typed_char(event).is_some_and(|c| c.eq_ignore_ascii_case(&letter))
    }
}

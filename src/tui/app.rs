//! Application State
//!
//! Screen router, form state, and the handlers for request completions.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::events::{EventHandler, Screen, TuiEvent, keys};
use super::form::{FieldId, FormState};
use crate::api::{
    ApiError, AuthUrlResponse, CallbackResponse, CreateGoalsResponse, GoalsApi, TodoLists,
    WeekProgress,
};
use crate::auth::{AuthRelay, AuthState, RelayError};
use crate::config::Config;
use crate::goals::{EditorEvent, EditorOutcome, GoalEditor, validate};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Your goals have been sent to Microsoft To Do";
pub const CONNECTION_ERROR_TITLE: &str = "Connection error";
pub const CONNECTION_ERROR_TEXT: &str =
    "Could not reach the server. Check that the API is running and the URL is correct.";
pub const AUTHORIZATION_FAILED_TEXT: &str =
    "There was a problem processing the authorization. Please try again.";

/// Blocking modal; dismissed with Enter or Esc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub lines: Vec<String>,
}

impl Alert {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

/// Progress panel on the Main screen
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressState {
    Idle,
    Loading,
    Loaded(WeekProgress),
    Failed(String),
}

/// Confirmation data returned by a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessView {
    pub message: String,
    pub auth_url: Option<String>,
    /// `Some` while the user is typing an authorization code
    pub code_input: Option<String>,
    pub authorizing: bool,
}

impl SuccessView {
    pub fn from_response(resp: CreateGoalsResponse) -> Self {
        Self {
            message: resp
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            auth_url: resp.auth_url.filter(|u| !u.trim().is_empty()),
            code_input: None,
            authorizing: false,
        }
    }
}

/// Main application state
pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub animation_frame: usize,

    // Splash screen state
    splash_shown_at: Option<Instant>,
    splash_delay: Duration,

    // Ctrl+C confirmation state while a draft is open
    ctrl_c_pending_at: Option<Instant>,

    // Create screen
    pub editor: Option<GoalEditor>,
    pub form: FormState,
    pub is_submitting: bool,
    pub last_outcome: Option<EditorOutcome>,

    // Success screen
    pub success: Option<SuccessView>,

    // Main screen progress panel
    pub progress: ProgressState,
    progress_start: NaiveDate,

    // Lists screen
    pub relay: AuthRelay,
    pub code_input: String,

    pub alert: Option<Alert>,
    pub status_message: Option<String>,

    api: Arc<dyn GoalsApi>,
    event_handler: EventHandler,
}

impl App {
    pub fn new(api: Arc<dyn GoalsApi>, config: &Config) -> Self {
        Self {
            screen: Screen::Splash,
            should_quit: false,
            animation_frame: 0,
            splash_shown_at: Some(Instant::now()),
            splash_delay: Duration::from_millis(config.ui.splash_millis),
            ctrl_c_pending_at: None,
            editor: None,
            form: FormState::new(),
            is_submitting: false,
            last_outcome: None,
            success: None,
            progress: ProgressState::Idle,
            progress_start: config.progress.start_date,
            relay: AuthRelay::new(),
            code_input: String::new(),
            alert: None,
            status_message: None,
            api,
            event_handler: EventHandler::new(),
        }
    }

    /// Get event sender
    pub fn event_sender(&self) -> tokio::sync::mpsc::UnboundedSender<TuiEvent> {
        self.event_handler.sender()
    }

    /// Receive next event
    pub async fn next_event(&mut self) -> Option<TuiEvent> {
        self.event_handler.next().await
    }

    /// Run a request in the background; its result comes back as an event.
    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = TuiEvent> + Send + 'static,
    {
        let tx = self.event_sender();
        tokio::spawn(async move {
            if tx.send(request.await).is_err() {
                tracing::debug!("Event channel closed before request finished");
            }
        });
    }

    /// Handle an event
    pub fn handle_event(&mut self, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key) => self.handle_key_event(key)?,
            TuiEvent::Paste(text) => self.handle_paste(&text),
            TuiEvent::Tick => {
                self.animation_frame = self.animation_frame.wrapping_add(1);
                if self.splash_elapsed() {
                    self.leave_splash();
                }
            }
            TuiEvent::ProgressLoaded(result) => self.on_progress_loaded(result),
            TuiEvent::SubmitFinished(result) => self.on_submit_finished(result),
            TuiEvent::CallbackFinished(result) => self.on_callback_finished(result),
            TuiEvent::ListsLookup(result) => self.on_lists_lookup(result),
            TuiEvent::AuthUrlLoaded(result) => self.on_auth_url_loaded(result),
            TuiEvent::CodeExchanged(result) => self.on_code_exchanged(result),
            TuiEvent::Resize(_, _) => {
                // Handled by the render loop
            }
        }
        Ok(())
    }

    fn splash_elapsed(&self) -> bool {
        self.screen == Screen::Splash
            && self
                .splash_shown_at
                .is_some_and(|shown_at| shown_at.elapsed() >= self.splash_delay)
    }

    fn leave_splash(&mut self) {
        self.splash_shown_at = None;
        self.switch_screen(Screen::Main);
    }

    /// Show a screen and run its initialization.
    pub fn switch_screen(&mut self, screen: Screen) {
        tracing::info!("Switching screen to: {:?}", screen);
        let previous = self.screen;
        self.screen = screen;
        self.status_message = None;

        // Leaving a view drops its transient state
        if previous == Screen::Create && screen != Screen::Create {
            self.editor = None;
            self.last_outcome = None;
        }
        if previous == Screen::Success && screen != Screen::Success {
            self.success = None;
        }

        match screen {
            Screen::Splash | Screen::Success => {}
            Screen::Main => self.load_progress(),
            Screen::Create => {
                self.editor = Some(GoalEditor::new(Local::now().date_naive()));
                self.form = FormState::new();
                self.is_submitting = false;
            }
            Screen::Lists => self.start_lists(),
        }
    }

    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        if keys::is_quit(&event) {
            self.handle_ctrl_c();
            return Ok(());
        }
        self.ctrl_c_pending_at = None;

        if self.alert.is_some() {
            if keys::is_enter(&event) || keys::is_cancel(&event) {
                self.alert = None;
            }
            return Ok(());
        }

        match self.screen {
            Screen::Splash => {
                if self.splash_elapsed() {
                    self.leave_splash();
                }
            }
            Screen::Main => self.handle_main_key(event),
            Screen::Create => self.handle_create_key(event),
            Screen::Success => self.handle_success_key(event),
            Screen::Lists => self.handle_lists_key(event),
        }
        Ok(())
    }

    /// Ctrl+C quits; with a draft open it needs a second press within 3s.
    fn handle_ctrl_c(&mut self) {
        if self.screen != Screen::Create {
            self.should_quit = true;
            return;
        }
        if let Some(pending_at) = self.ctrl_c_pending_at
            && pending_at.elapsed() < Duration::from_secs(3)
        {
            self.should_quit = true;
            return;
        }
        self.status_message = Some("Press Ctrl+C again to quit and discard the draft".to_string());
        self.ctrl_c_pending_at = Some(Instant::now());
    }

    fn handle_paste(&mut self, text: &str) {
        if self.alert.is_some() {
            return;
        }
        let text = text.trim_end_matches(['\r', '\n']);
        match self.screen {
            Screen::Create => {
                if let Some(editor) = self.editor.as_mut() {
                    self.last_outcome = Some(self.form.insert_str(editor, text));
                }
            }
            Screen::Success => {
                if let Some(input) = self.success.as_mut().and_then(|s| s.code_input.as_mut()) {
                    input.push_str(text.trim());
                }
            }
            Screen::Lists => {
                if matches!(self.relay.state(), AuthState::AwaitingPastedCode { .. }) {
                    self.code_input.push_str(text.trim());
                }
            }
            Screen::Splash | Screen::Main => {}
        }
    }

    // --- Main ---------------------------------------------------------

    fn handle_main_key(&mut self, event: KeyEvent) {
        if keys::is_letter(&event, 'n') {
            self.switch_screen(Screen::Create);
        } else if keys::is_letter(&event, 'l') {
            self.switch_screen(Screen::Lists);
        } else if keys::is_letter(&event, 'r') {
            self.load_progress();
        } else if keys::is_letter(&event, 'q') {
            self.should_quit = true;
        }
    }

    /// Fetch week progress for the configured start date.
    pub fn load_progress(&mut self) {
        self.progress = ProgressState::Loading;
        let api = Arc::clone(&self.api);
        let start = self.progress_start;
        self.spawn_request(async move { TuiEvent::ProgressLoaded(api.week_progress(start).await) });
    }

    fn on_progress_loaded(&mut self, result: Result<WeekProgress, ApiError>) {
        self.progress = match result {
            Ok(progress) => ProgressState::Loaded(progress),
            Err(e) => {
                tracing::warn!("Progress fetch failed: {}", e);
                ProgressState::Failed(e.to_string())
            }
        };
    }

    // --- Create -------------------------------------------------------

    fn handle_create_key(&mut self, event: KeyEvent) {
        if keys::is_submit(&event) {
            self.submit();
            return;
        }
        if self.is_submitting {
            return;
        }
        if keys::is_cancel(&event) {
            self.switch_screen(Screen::Main);
            return;
        }

        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        let outcome = if keys::is_next_field(&event) {
            self.form.next(editor);
            return;
        } else if keys::is_prev_field(&event) {
            self.form.prev(editor);
            return;
        } else if keys::is_add_goal(&event) {
            let outcome = editor.apply(EditorEvent::AddGoal);
            if let Some(last) = editor.goals().last() {
                self.form.focus_on(FieldId::GoalName(last.id));
            }
            outcome
        } else if keys::is_remove_goal(&event) {
            match self.form.focused_goal() {
                Some(id) => {
                    let position = editor.position(id);
                    let outcome = editor.apply(EditorEvent::RemoveGoal(id));
                    if outcome == EditorOutcome::Rerender {
                        self.form.sync(editor, position);
                    } else {
                        self.status_message = Some("A goal group needs at least one goal".to_string());
                    }
                    outcome
                }
                None => EditorOutcome::Ignored,
            }
        } else if event.code == KeyCode::Backspace {
            self.form.backspace(editor)
        } else if let Some(c) = keys::typed_char(&event) {
            self.form.insert_char(editor, c)
        } else {
            return;
        };
        self.last_outcome = Some(outcome);
    }

    /// Validate the draft and send it. Ignored while a submission is in flight.
    pub fn submit(&mut self) {
        if self.is_submitting {
            tracing::debug!("Submit ignored, request already in flight");
            return;
        }
        let Some(editor) = self.editor.as_ref() else {
            return;
        };

        let group = match validate(editor) {
            Ok(group) => group,
            Err(e) => {
                self.alert = Some(Alert::new("Missing information", vec![e.to_string()]));
                return;
            }
        };

        tracing::info!(
            "Submitting goal group {:?} with {} goal(s)",
            group.name,
            group.goals.len()
        );
        self.is_submitting = true;
        let request = group.to_request();
        let api = Arc::clone(&self.api);
        self.spawn_request(async move { TuiEvent::SubmitFinished(api.create_goals(&request).await) });
    }

    fn on_submit_finished(&mut self, result: Result<CreateGoalsResponse, ApiError>) {
        self.is_submitting = false;
        match result {
            Ok(resp) => {
                self.success = Some(SuccessView::from_response(resp));
                self.switch_screen(Screen::Success);
            }
            Err(e) => {
                tracing::error!("Goal submission failed: {}", e);
                self.alert = Some(Alert::new(
                    CONNECTION_ERROR_TITLE,
                    vec![CONNECTION_ERROR_TEXT.to_string(), e.to_string()],
                ));
            }
        }
    }

    // --- Success ------------------------------------------------------

    fn handle_success_key(&mut self, event: KeyEvent) {
        let Some(view) = self.success.as_mut() else {
            if keys::is_enter(&event) || keys::is_cancel(&event) {
                self.switch_screen(Screen::Main);
            }
            return;
        };

        if view.authorizing {
            return;
        }

        if let Some(input) = view.code_input.as_mut() {
            if keys::is_cancel(&event) {
                view.code_input = None;
            } else if keys::is_enter(&event) {
                self.finalize_authorization();
            } else if keys::is_open_url(&event) {
                self.open_auth_url();
            } else if event.code == KeyCode::Backspace {
                input.pop();
            } else if let Some(c) = keys::typed_char(&event) {
                input.push(c);
            }
            return;
        }

        if keys::is_letter(&event, 'o') {
            self.open_auth_url();
        } else if keys::is_letter(&event, 'c') && view.auth_url.is_some() {
            view.code_input = Some(String::new());
        } else if keys::is_enter(&event) || keys::is_cancel(&event) {
            self.switch_screen(Screen::Main);
        }
    }

    fn finalize_authorization(&mut self) {
        let Some(view) = self.success.as_mut() else {
            return;
        };
        let code = view.code_input.as_deref().unwrap_or_default().trim().to_string();
        if code.is_empty() {
            self.alert = Some(Alert::new(
                "Authorization",
                vec![RelayError::EmptyCode.to_string()],
            ));
            return;
        }
        view.authorizing = true;
        let api = Arc::clone(&self.api);
        self.spawn_request(async move {
            TuiEvent::CallbackFinished(api.finalize_authorization(&code).await)
        });
    }

    fn on_callback_finished(&mut self, result: Result<CallbackResponse, ApiError>) {
        if let Some(view) = self.success.as_mut() {
            view.authorizing = false;
            view.code_input = None;
        }
        self.alert = Some(match result {
            Ok(resp) => Alert::new(
                "Authorization complete",
                vec![resp
                    .message
                    .unwrap_or_else(|| "Authorization completed".to_string())],
            ),
            Err(e) => {
                tracing::error!("Authorization callback failed: {}", e);
                let mut lines = vec![AUTHORIZATION_FAILED_TEXT.to_string(), e.to_string()];
                if let ApiError::Server {
                    step: Some(step), ..
                } = &e
                {
                    lines.push(format!("Step: {step}"));
                }
                lines.extend(e.diagnostics());
                Alert::new("Authorization failed", lines)
            }
        });
    }

    fn current_auth_url(&self) -> Option<String> {
        match self.screen {
            Screen::Success => self.success.as_ref().and_then(|s| s.auth_url.clone()),
            Screen::Lists => self.relay.auth_url().map(str::to_string),
            _ => None,
        }
    }

    fn open_auth_url(&mut self) {
        let Some(url) = self.current_auth_url() else {
            return;
        };
        self.status_message = Some(match open::that(&url) {
            Ok(()) => "Authorization page opened in your browser".to_string(),
            Err(e) => {
                tracing::warn!("Could not open browser: {}", e);
                format!("Could not open a browser; visit {url}")
            }
        });
    }

    // --- Lists --------------------------------------------------------

    fn start_lists(&mut self) {
        self.relay = AuthRelay::new();
        self.code_input.clear();
        let api = Arc::clone(&self.api);
        self.spawn_request(async move { TuiEvent::ListsLookup(api.lists_from_cache().await) });
    }

    fn request_auth_url(&self) {
        let api = Arc::clone(&self.api);
        self.spawn_request(async move { TuiEvent::AuthUrlLoaded(api.request_auth_url().await) });
    }

    fn log_relay(result: Result<(), RelayError>) {
        if let Err(e) = result {
            tracing::warn!("Ignoring stale auth event: {}", e);
        }
    }

    fn on_lists_lookup(&mut self, result: Result<Option<TodoLists>, ApiError>) {
        match result {
            Ok(Some(lists)) => Self::log_relay(self.relay.cache_hit(lists)),
            Ok(None) => match self.relay.cache_missed() {
                Ok(()) => self.request_auth_url(),
                Err(e) => Self::log_relay(Err(e)),
            },
            Err(e) => Self::log_relay(self.relay.fail(e.to_string())),
        }
    }

    fn on_auth_url_loaded(&mut self, result: Result<AuthUrlResponse, ApiError>) {
        let outcome = match result {
            Ok(resp) => self.relay.auth_url_received(resp.auth_url),
            Err(e) => self.relay.fail(e.to_string()),
        };
        Self::log_relay(outcome);
    }

    fn on_code_exchanged(&mut self, result: Result<TodoLists, ApiError>) {
        let outcome = match result {
            Ok(lists) => self.relay.lists_received(lists),
            Err(e) => self.relay.fail(e.to_string()),
        };
        Self::log_relay(outcome);
    }

    fn handle_lists_key(&mut self, event: KeyEvent) {
        if keys::is_cancel(&event) {
            self.switch_screen(Screen::Main);
            return;
        }

        let awaiting_code = matches!(self.relay.state(), AuthState::AwaitingPastedCode { .. });
        let failed = matches!(self.relay.state(), AuthState::Error { .. });

        if awaiting_code {
            if keys::is_open_url(&event) {
                self.open_auth_url();
            } else if keys::is_enter(&event) {
                self.submit_code();
            } else if event.code == KeyCode::Backspace {
                self.code_input.pop();
            } else if let Some(c) = keys::typed_char(&event) {
                self.code_input.push(c);
            }
        } else if failed && keys::is_letter(&event, 'r') && self.relay.retry().is_ok() {
            self.request_auth_url();
        }
    }

    fn submit_code(&mut self) {
        match self.relay.submit_code(&self.code_input) {
            Ok(code) => {
                self.code_input.clear();
                let api = Arc::clone(&self.api);
                self.spawn_request(async move {
                    TuiEvent::CodeExchanged(api.lists_with_code(&code).await)
                });
            }
            Err(RelayError::EmptyCode) => {
                self.alert = Some(Alert::new(
                    "Authorization",
                    vec![RelayError::EmptyCode.to_string()],
                ));
            }
            Err(e) => Self::log_relay(Err(e)),
        }
    }
}

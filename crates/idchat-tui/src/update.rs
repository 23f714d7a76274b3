//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyEventKind};
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::login::LoginAction;
use crate::router::ViewState;
use crate::state::AppState;
use crate::{auth, chat, login};

/// Effects to run once at launch.
pub fn startup(app: &mut AppState) -> Vec<UiEffect> {
    vec![UiEffect::RestoreSession {
        task: begin_task(app, TaskKind::Restore),
    }]
}

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.viewport = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            if app.tasks.state_mut(kind).on_started(&started) {
                return vec![];
            }
            // Superseded before it was spawned; stop it.
            tracing::debug!(?kind, "cancelling superseded task");
            cancel_effect(kind, started.cancel)
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                tracing::debug!(?kind, "dropping stale task result");
                vec![]
            }
        }
        UiEvent::SessionRestored(account) => {
            auth::handle_session_restored(&mut app.auth, account);
            vec![]
        }
        UiEvent::LoginFinished(result) => {
            if result.is_ok() {
                app.chat = chat::ChatState::default();
            }
            auth::handle_login_finished(&mut app.auth, result);
            vec![]
        }
        UiEvent::SignedOut => {
            auth::handle_signed_out(&mut app.auth);
            // The transcript belongs to the session that just ended.
            app.chat = chat::ChatState::default();
            vec![]
        }
        UiEvent::ChatCompleted(outcome) => {
            chat::handle_chat_completed(&mut app.chat, outcome);
            vec![]
        }
        UiEvent::ChatCancelled => {
            tracing::debug!("chat send cancelled");
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            match ViewState::select(&app.auth) {
                ViewState::Authenticated { .. } => {
                    let action = chat::handle_key(&mut app.chat, key);
                    handle_chat_action(app, action)
                }
                ViewState::Loading | ViewState::LoginRequired => {
                    let action = login::handle_key(&app.auth, key);
                    handle_login_action(app, action)
                }
            }
        }
        Event::Paste(text) => {
            if matches!(ViewState::select(&app.auth), ViewState::Authenticated { .. }) {
                chat::handle_paste(&mut app.chat, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_login_action(app: &mut AppState, action: LoginAction) -> Vec<UiEffect> {
    match action {
        LoginAction::None => vec![],
        LoginAction::Quit => quit(app),
        LoginAction::StartLogin => {
            if !auth::begin_login(&mut app.auth) {
                return vec![];
            }
            vec![UiEffect::StartLogin {
                task: begin_task(app, TaskKind::Login),
            }]
        }
        LoginAction::CancelLogin => vec![UiEffect::CancelTask {
            kind: TaskKind::Login,
            token: app.tasks.login.cancel.clone(),
        }],
    }
}

fn handle_chat_action(app: &mut AppState, action: chat::ChatAction) -> Vec<UiEffect> {
    match action {
        chat::ChatAction::None => vec![],
        chat::ChatAction::Quit => quit(app),
        chat::ChatAction::Send(prompt) => vec![UiEffect::SendPrompt {
            task: begin_task(app, TaskKind::ChatSend),
            prompt,
        }],
        chat::ChatAction::SignOut => {
            if !auth::begin_logout(&mut app.auth) {
                return vec![];
            }
            // A reply for the old session must not land in the next one.
            let mut effects = cancel_running(app, TaskKind::ChatSend);
            effects.push(UiEffect::SignOut {
                task: begin_task(app, TaskKind::Logout),
            });
            effects
        }
    }
}

fn quit(app: &mut AppState) -> Vec<UiEffect> {
    let mut effects = cancel_running(app, TaskKind::Login);
    effects.extend(cancel_running(app, TaskKind::ChatSend));
    effects.push(UiEffect::Quit);
    effects
}

/// Allocates an id and marks it as the awaited task of `kind`.
fn begin_task(app: &mut AppState, kind: TaskKind) -> TaskId {
    let id = app.task_seq.next_id();
    app.tasks.state_mut(kind).begin(id);
    id
}

/// Forgets the task of `kind` and cancels it if it has already started.
fn cancel_running(app: &mut AppState, kind: TaskKind) -> Vec<UiEffect> {
    let state = app.tasks.state_mut(kind);
    let token = state.cancel.take();
    state.clear();
    cancel_effect(kind, token)
}

fn cancel_effect(kind: TaskKind, token: Option<CancellationToken>) -> Vec<UiEffect> {
    match token {
        Some(token) => vec![UiEffect::CancelTask {
            kind,
            token: Some(token),
        }],
        None => vec![],
    }
}

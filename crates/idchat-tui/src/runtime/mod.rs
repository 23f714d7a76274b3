//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces
//! effects; this module spawns them and feeds their results back through
//! the inbox.

mod handlers;
mod inbox;

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use idchat_core::chat::ChatClient;
use idchat_core::identity::SessionManager;
use inbox::{UiEventReceiver, UiEventSender};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while something is animating (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Tick cadence when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
pub struct TuiRuntime {
    terminal: terminal::Tui,
    pub state: AppState,
    sessions: SessionManager,
    client: ChatClient,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl TuiRuntime {
    pub fn new(state: AppState, sessions: SessionManager, client: ChatClient) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::enter().context("Failed to setup terminal")?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state,
            sessions,
            client,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let effects = update::startup(&mut self.state);
        self.execute_effects(effects);
        self.event_loop()
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout first, so the rest of the batch sees the current size.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                // Only Tick triggers a render; input batches up until then.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty && !self.state.should_quit {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.state.tasks.is_any_running() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::CancelTask { kind, token } => {
                tracing::debug!(?kind, "cancel requested");
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
            UiEffect::RestoreSession { task } => {
                let sessions = self.sessions.clone();
                self.spawn_task(TaskKind::Restore, task, false, move |_| {
                    handlers::restore_session(sessions)
                });
            }
            UiEffect::StartLogin { task } => {
                let sessions = self.sessions.clone();
                self.spawn_task(TaskKind::Login, task, true, move |cancel| {
                    handlers::login(sessions, cancel)
                });
            }
            UiEffect::SignOut { task } => {
                let sessions = self.sessions.clone();
                self.spawn_task(TaskKind::Logout, task, false, move |_| {
                    handlers::sign_out(sessions)
                });
            }
            UiEffect::SendPrompt { task, prompt } => {
                let sessions = self.sessions.clone();
                let client = self.client.clone();
                self.spawn_task(TaskKind::ChatSend, task, true, move |cancel| {
                    handlers::send_prompt(sessions, client, prompt, cancel)
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::leave();
    }
}

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Restore,
    Login,
    Logout,
    ChatSend,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Marks `id` as the task the reducer is waiting on. Called when the
    /// effect is emitted, before the runtime spawns anything.
    pub fn begin(&mut self, id: TaskId) {
        self.active = Some(id);
        self.cancel = None;
    }

    /// Records the cancel token of a spawned task. Returns `false` when the
    /// task is no longer the awaited one; its token should then be cancelled.
    pub fn on_started(&mut self, started: &TaskStarted) -> bool {
        if self.active != Some(started.id) {
            return false;
        }
        self.cancel = started.cancel.clone();
        true
    }

    /// Clears the task if `id` is the active one. A `false` return means the
    /// result is stale and must be dropped.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub restore: TaskState,
    pub login: TaskState,
    pub logout: TaskState,
    pub chat_send: TaskState,
}

impl Tasks {
    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Restore => &mut self.restore,
            TaskKind::Login => &mut self.login,
            TaskKind::Logout => &mut self.logout,
            TaskKind::ChatSend => &mut self.chat_send,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.restore.is_running()
            || self.login.is_running()
            || self.logout.is_running()
            || self.chat_send.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_completion_is_rejected() {
        let mut seq = TaskSeq::default();
        let first = seq.next_id();
        let second = seq.next_id();
        assert_ne!(first, second);

        let mut state = TaskState::default();
        state.begin(second);
        assert!(state.on_started(&TaskStarted {
            id: second,
            cancel: None,
        }));

        assert!(!state.finish_if_active(first));
        assert!(state.is_running());
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
    }

    #[test]
    fn test_start_of_cleared_task_is_rejected() {
        let mut seq = TaskSeq::default();
        let id = seq.next_id();
        let mut state = TaskState::default();
        state.begin(id);
        state.clear();

        let token = CancellationToken::new();
        assert!(!state.on_started(&TaskStarted {
            id,
            cancel: Some(token),
        }));
        assert!(!state.is_running());
        assert!(state.cancel.is_none());
    }
}

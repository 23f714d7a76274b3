use idchat_core::identity::Account;

/// What the identity session is busy with, if anything.
///
/// Changed only by session events in the reducer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionStatus {
    /// Restoring the cached account at launch.
    #[default]
    Startup,
    /// Interactive sign-in in the browser.
    Login,
    Logout,
    None,
}

impl InteractionStatus {
    pub fn in_progress(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Default)]
pub struct AuthState {
    pub status: InteractionStatus,
    pub account: Option<Account>,
    /// Last sign-in failure, shown on the login view.
    pub login_error: Option<String>,
}

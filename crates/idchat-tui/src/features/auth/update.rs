//! Auth feature reducer.
//!
//! Session lifecycle transitions. Each `begin_*` returns whether the caller
//! should emit the matching effect.

use idchat_core::identity::Account;

use super::{AuthState, InteractionStatus};

pub fn handle_session_restored(auth: &mut AuthState, account: Option<Account>) {
    auth.status = InteractionStatus::None;
    auth.account = account;
}

pub fn begin_login(auth: &mut AuthState) -> bool {
    if auth.status.in_progress() || auth.account.is_some() {
        return false;
    }
    auth.status = InteractionStatus::Login;
    auth.login_error = None;
    true
}

pub fn handle_login_finished(auth: &mut AuthState, result: Result<Account, String>) {
    auth.status = InteractionStatus::None;
    match result {
        Ok(account) => {
            auth.account = Some(account);
            auth.login_error = None;
        }
        Err(message) => auth.login_error = Some(message),
    }
}

pub fn begin_logout(auth: &mut AuthState) -> bool {
    if auth.status.in_progress() || auth.account.is_none() {
        return false;
    }
    auth.status = InteractionStatus::Logout;
    true
}

pub fn handle_signed_out(auth: &mut AuthState) {
    auth.status = InteractionStatus::None;
    auth.account = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            home_account_id: "a".to_string(),
            tenant_id: None,
            username: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn test_login_only_from_signed_out_idle() {
        let mut auth = AuthState::default();
        assert!(!begin_login(&mut auth), "startup still in progress");

        handle_session_restored(&mut auth, None);
        auth.login_error = Some("old".to_string());
        assert!(begin_login(&mut auth));
        assert_eq!(auth.status, InteractionStatus::Login);
        assert!(auth.login_error.is_none());
        assert!(!begin_login(&mut auth), "already logging in");
    }

    #[test]
    fn test_login_failure_keeps_message() {
        let mut auth = AuthState::default();
        handle_session_restored(&mut auth, None);
        begin_login(&mut auth);

        handle_login_finished(&mut auth, Err("Sign-in was cancelled.".to_string()));
        assert_eq!(auth.status, InteractionStatus::None);
        assert!(auth.account.is_none());
        assert_eq!(auth.login_error.as_deref(), Some("Sign-in was cancelled."));
    }

    #[test]
    fn test_logout_round_trip() {
        let mut auth = AuthState::default();
        handle_session_restored(&mut auth, Some(account()));
        assert!(begin_logout(&mut auth));
        assert_eq!(auth.status, InteractionStatus::Logout);

        handle_signed_out(&mut auth);
        assert_eq!(auth.status, InteractionStatus::None);
        assert!(auth.account.is_none());
        assert!(!begin_logout(&mut auth));
    }
}

//! Auth feature slice: interaction status and the signed-in account.

mod state;
mod update;

pub use state::{AuthState, InteractionStatus};
pub use update::{
    begin_login, begin_logout, handle_login_finished, handle_session_restored, handle_signed_out,
};

//! One-shot localhost listener for the authorization redirect.

use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::IdentityError;
use super::log;

/// How long to wait for the browser to come back.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// What a single request to the listener turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code(String),
    /// The provider redirected back with `error=...`.
    Denied {
        error: String,
        description: Option<String>,
    },
    StateMismatch,
    /// Not the callback path (favicon and friends). Keep waiting.
    Ignored,
}

pub struct CallbackListener {
    listener: TcpListener,
}

impl CallbackListener {
    /// Binds the loopback port before the browser is opened.
    pub async fn bind(port: u16) -> Result<Self, IdentityError> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("Failed to listen for the sign-in callback on port {port}"))?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> Option<u16> {
        self.listener.local_addr().ok().map(|a| a.port())
    }

    /// Waits for `GET <path>?code=..&state=..` and returns the code.
    pub async fn wait_for_code(
        self,
        path: &str,
        expected_state: &str,
        timeout: Duration,
    ) -> Result<String, IdentityError> {
        tokio::time::timeout(timeout, self.accept_code(path, expected_state))
            .await
            .map_err(|_elapsed| {
                IdentityError::Protocol("Timed out waiting for the sign-in callback".to_string())
            })?
    }

    async fn accept_code(&self, path: &str, expected_state: &str) -> Result<String, IdentityError> {
        loop {
            let (mut stream, _) = self
                .listener
                .accept()
                .await
                .context("Failed to accept the sign-in callback connection")?;

            let mut buffer = [0u8; 4096];
            let read = stream
                .read(&mut buffer)
                .await
                .context("Failed to read the sign-in callback request")?;
            let request = String::from_utf8_lossy(&buffer[..read]);

            match parse_callback(&request, path, expected_state) {
                Callback::Code(code) => {
                    respond(&mut stream, success_response()).await;
                    return Ok(code);
                }
                Callback::Denied { error, description } => {
                    respond(&mut stream, error_response()).await;
                    if error == "access_denied" {
                        return Err(IdentityError::Cancelled);
                    }
                    return Err(IdentityError::Protocol(description.unwrap_or(error)));
                }
                Callback::StateMismatch => {
                    respond(&mut stream, error_response()).await;
                    return Err(IdentityError::Protocol(
                        "Sign-in callback state did not match the request".to_string(),
                    ));
                }
                Callback::Ignored => {
                    respond(&mut stream, not_found_response()).await;
                }
            }
        }
    }
}

async fn respond(stream: &mut TcpStream, response: String) {
    if let Err(err) = stream.write_all(response.as_bytes()).await {
        log::verbose(&format!("Failed to answer the callback request: {err}"));
    }
    let _ = stream.shutdown().await;
}

fn parse_callback(request: &str, callback_path: &str, expected_state: &str) -> Callback {
    let Some(target) = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
    else {
        return Callback::Ignored;
    };

    let Ok(url) = url::Url::parse(&format!("http://localhost{target}")) else {
        return Callback::Ignored;
    };
    if url.path() != callback_path {
        return Callback::Ignored;
    }

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if param("state").as_deref() != Some(expected_state) {
        return Callback::StateMismatch;
    }
    if let Some(error) = param("error") {
        return Callback::Denied {
            error,
            description: param("error_description"),
        };
    }
    match param("code") {
        Some(code) if !code.is_empty() => Callback::Code(code),
        _ => Callback::Denied {
            error: "missing_code".to_string(),
            description: Some("Sign-in callback did not include a code".to_string()),
        },
    }
}

fn success_response() -> String {
    let body = "<html><body><h3>Signed in</h3><p>You can close this window and return to idchat.</p></body></html>";
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn error_response() -> String {
    let body = "<html><body><h3>Sign-in failed</h3><p>Return to idchat and try again.</p></body></html>";
    format!(
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn not_found_response() -> String {
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
}

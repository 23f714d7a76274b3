//! Diagnostic sink for the identity layer.
//!
//! Every record carries a `contains_pii` flag. Flagged records never reach
//! the tracing subscriber.

/// Severity of an identity diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Verbose,
}

/// Forwards `message` to tracing unless it contains PII.
pub fn emit(level: LogLevel, message: &str, contains_pii: bool) {
    if contains_pii {
        return;
    }
    match level {
        LogLevel::Error => tracing::error!(target: "idchat::identity", "{message}"),
        LogLevel::Warning => tracing::warn!(target: "idchat::identity", "{message}"),
        LogLevel::Info => tracing::info!(target: "idchat::identity", "{message}"),
        LogLevel::Verbose => tracing::debug!(target: "idchat::identity", "{message}"),
    }
}

pub fn error(message: &str) {
    emit(LogLevel::Error, message, false);
}

pub fn warning(message: &str) {
    emit(LogLevel::Warning, message, false);
}

pub fn info(message: &str) {
    emit(LogLevel::Info, message, false);
}

pub fn verbose(message: &str) {
    emit(LogLevel::Verbose, message, false);
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let sink = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        sink.text()
    }

    #[test]
    fn test_pii_records_are_dropped() {
        let out = capture(|| {
            emit(LogLevel::Info, "signed in as ada@example.com", true);
            emit(LogLevel::Error, "token endpoint unreachable", false);
        });

        assert!(!out.contains("ada@example.com"));
        assert!(out.contains("token endpoint unreachable"));
    }

    #[test]
    fn test_levels_map_to_tracing() {
        let out = capture(|| {
            warning("refresh token missing");
            verbose("cache hit");
        });

        assert!(out.contains("WARN"));
        assert!(out.contains("DEBUG"));
        assert!(out.contains("idchat::identity"));
    }
}

//! Every line goes to stderr behind a `[napi-postinstall@<version>]` prefix
//! so it stands out in package manager output.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::config::DEFAULT_LOG;

pub const LOG_PREFIX: &str = concat!("[napi-postinstall@", env!("CARGO_PKG_VERSION"), "] ");

pub struct Prefixed;

impl<S, N> FormatEvent<S, N> for Prefixed
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{LOG_PREFIX}")?;
        let level = *event.metadata().level();
        if level != Level::INFO {
            write!(writer, "{}: ", level.as_str().to_lowercase())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `directives` falls back to [`DEFAULT_LOG`] when it does not parse.
pub fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG))
}

pub fn init(directives: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(directives))
        .with_writer(std::io::stderr)
        .event_format(Prefixed)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(directives: &str, log: impl FnOnce()) -> String {
        let buffer = Capture::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter(directives))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .event_format(Prefixed)
            .finish();
        tracing::subscriber::with_default(subscriber, log);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_lines_carry_the_prefix() {
        let out = capture("info", || {
            tracing::info!("binary is in place");
            tracing::warn!(package = "acme", "no optional dependency");
            tracing::debug!("hidden");
        });
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("{LOG_PREFIX}binary is in place"));
        assert!(lines[1].starts_with(&format!("{LOG_PREFIX}warn: no optional dependency")));
        assert!(lines[1].contains("package=\"acme\""));
    }

    #[test]
    fn test_invalid_directives_fall_back() {
        let out = capture("acme=loudest", || tracing::info!("still shown"));
        assert!(out.contains("still shown"));
    }
}

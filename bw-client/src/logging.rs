//! Tracing setup for the binary
//!
//! Configuration decides where logs go, but resolving it already logs
//! (missing file, loaded file). Those lines go through a temporary
//! subscriber built from `RUST_LOG` alone; `init_tracing` then installs
//! the configured one for the rest of the run.

use anyhow::{Context, Result};
use bw_common::config::{ClientConfig, ConfigOverrides, LoggingConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const BOOTSTRAP_LEVEL: &str = "info";

/// Resolve the configuration with its diagnostics written to `writer`
pub fn resolve_config<W>(overrides: &ConfigOverrides, writer: W) -> bw_common::Result<ClientConfig>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_LEVEL));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));

    tracing::subscriber::with_default(subscriber, || ClientConfig::resolve(overrides))
}

/// Install the global subscriber
///
/// RUST_LOG wins over the configured level; logs go to the configured
/// file, or stderr when none is set.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let (file_layer, stderr_layer) = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (
                Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
                None,
            )
        }
        None => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_missing_config_file_warning_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = ConfigOverrides {
            config_path: Some(dir.path().join("absent.toml")),
            api_base_url: Some("http://localhost:8080/api/v1".to_string()),
            email: None,
        };
        let captured = Captured::default();

        let config = resolve_config(&overrides, captured.clone()).unwrap();

        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/api/v1/");
        let output = captured.contents();
        assert!(output.contains("WARN"), "output: {}", output);
        assert!(output.contains("not found, using defaults"), "output: {}", output);
    }

    #[test]
    fn test_loaded_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 5\n").unwrap();
        let overrides = ConfigOverrides {
            config_path: Some(path),
            ..Default::default()
        };
        let captured = Captured::default();

        let config = resolve_config(&overrides, captured.clone()).unwrap();

        assert_eq!(config.request_timeout.as_secs(), 5);
        assert!(captured.contents().contains("Loaded configuration from"));
    }
}

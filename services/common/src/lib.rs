use std::{
    env,
    fs,
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
    panic,
    str::FromStr,
    thread,
    time::{Duration, SystemTime},
};
use tokio::net::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_tracing(service_name: &str) -> TracingGuards {
    // RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "/var/log/printwatch".to_string());
    let log_root = PathBuf::from(log_dir).join(service_name);
    let stdout_layer = fmt::layer().with_writer(io::stdout);
    let mut file_guard: Option<WorkerGuard> = None;
    let mut file_layer = None;

    if fs::create_dir_all(&log_root).is_ok() {
        let appender = panic::catch_unwind(|| {
            tracing_appender::rolling::daily(&log_root, format!("{service_name}.log"))
        })
        .ok();

        if let Some(appender) = appender {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_layer = Some(fmt::layer().with_ansi(false).with_writer(writer));
            file_guard = Some(guard);
        }
    }

    if let Some(layer) = file_layer {
        let subscriber = Registry::default()
            .with(filter)
            .with(stdout_layer)
            .with(layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = Registry::default().with(filter).with(stdout_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    if file_guard.is_some() {
        let retention_days = env_or("LOG_RETENTION_DAYS", 14u64);
        let cleanup_interval = env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64);
        spawn_log_cleanup(log_root.clone(), retention_days, cleanup_interval);
        tracing::info!(
            service = service_name,
            log_root = %log_root.display(),
            retention_days,
            "file logging enabled"
        );
    } else {
        tracing::warn!(
            service = service_name,
            log_root = %log_root.display(),
            "file logging unavailable; stdout only"
        );
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

/// Reads `key` from the environment, falling back to `default` when the
/// variable is unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

/// Like [`env_or`] but yields `None` instead of a default.
pub fn env_opt<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

fn spawn_log_cleanup(log_root: PathBuf, retention_days: u64, cleanup_interval_minutes: u64) {
    if retention_days == 0 || cleanup_interval_minutes == 0 {
        return;
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(cleanup_interval_minutes * 60);

    thread::spawn(move || loop {
        let cutoff = SystemTime::now().checked_sub(retention);
        if let Some(cutoff) = cutoff {
            cleanup_old_logs(&log_root, cutoff);
        }
        thread::sleep(interval);
    });
}

fn cleanup_old_logs(root: &Path, cutoff: SystemTime) {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            cleanup_old_logs(&path, cutoff);
            continue;
        }
        let modified = match fs::metadata(&path).and_then(|metadata| metadata.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        if modified < cutoff {
            let _ = fs::remove_file(&path);
        }
    }
}

/// Card id shared by the service logs and the dashboard: `printer-` plus the
/// name with every non-alphanumeric ASCII character replaced by `-`.
pub fn card_id(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("printer-{sanitized}")
}

pub async fn bind_listener(port: u16) -> io::Result<TcpListener> {
    // All interfaces, so the service is reachable from containers.
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    Ok(listener)
}

pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "sigterm handler unavailable");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }

    tracing::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_garbage() {
        env::set_var("PRINTWATCH_TEST_PORT", "not-a-port");
        assert_eq!(env_or("PRINTWATCH_TEST_PORT", 8080u16), 8080);
        env::set_var("PRINTWATCH_TEST_PORT", "9090");
        assert_eq!(env_or("PRINTWATCH_TEST_PORT", 8080u16), 9090);
        env::remove_var("PRINTWATCH_TEST_PORT");
        assert_eq!(env_or("PRINTWATCH_TEST_PORT", 8080u16), 8080);
    }

    #[test]
    fn env_opt_trims_and_parses() {
        env::set_var("PRINTWATCH_TEST_SEED", " 42 ");
        assert_eq!(env_opt::<u64>("PRINTWATCH_TEST_SEED"), Some(42));
        env::remove_var("PRINTWATCH_TEST_SEED");
        assert_eq!(env_opt::<u64>("PRINTWATCH_TEST_SEED"), None);
    }

    #[test]
    fn card_id_replaces_non_alphanumerics() {
        assert_eq!(
            card_id("Oneill3rdfloorprinter01.bc.edu"),
            "printer-Oneill3rdfloorprinter01-bc-edu"
        );
        assert_eq!(card_id("WIHD"), "printer-WIHD");
        assert_eq!(card_id("a b_c"), "printer-a-b-c");
    }

    #[test]
    fn cleanup_removes_only_files_older_than_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("printer-service");
        fs::create_dir_all(&nested).unwrap();
        let log = nested.join("printer-service.log.2026-01-01");
        fs::write(&log, b"old").unwrap();

        // Nothing is older than a cutoff in the distant past.
        cleanup_old_logs(dir.path(), SystemTime::UNIX_EPOCH);
        assert!(log.exists());

        let future = SystemTime::now() + Duration::from_secs(60);
        cleanup_old_logs(dir.path(), future);
        assert!(!log.exists());
        assert!(nested.exists());
    }
}

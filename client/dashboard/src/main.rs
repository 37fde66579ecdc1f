mod api;
mod board;
mod config;
mod demo;

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::api::ApiClient;
use crate::board::Board;
use crate::config::{load_config, DashboardConfig};

struct Dashboard {
    config: DashboardConfig,
    api: ApiClient,
}

impl Dashboard {
    /// One fetch-then-render pass. Failures never escape: the affected half of
    /// the board is filled with demo data and the timestamp says so.
    async fn refresh(&self, board: &mut Board) {
        let printers = &self.config.printers;
        let mut demo = false;
        board.banner = None;

        match self.api.check_printers(printers).await {
            Ok(results) => {
                let applied = board.apply_status(&results);
                tracing::info!(results = results.len(), applied, "status updated");
            }
            Err(err) => {
                tracing::warn!(error = %err, "status check failed; showing demo data");
                board.banner = Some(format!("Failed to check printer status ({err})"));
                board.apply_status(&demo::status(&mut rand::thread_rng(), printers));
                demo = true;
            }
        }

        if self.config.fetch_details {
            match self.api.check_printer_details(printers).await {
                Ok(details) => {
                    let applied = board.apply_details(&details);
                    tracing::info!(details = details.len(), applied, "details updated");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "details fetch failed; showing demo data");
                    if board.banner.is_none() {
                        board.banner = Some(format!("Failed to fetch printer details ({err})"));
                    }
                    board.apply_details(&demo::details(&mut rand::thread_rng(), printers));
                    demo = true;
                }
            }
        }

        let now = chrono::Local::now().format("%H:%M:%S").to_string();
        board.mark_updated(&now, demo);
    }
}

fn init_tracing() {
    // stdout carries the board; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn draw(board: &Board) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", board.render());
    let _ = writeln!(stdout, "(enter: refresh, q: quit)");
    let _ = stdout.flush();
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Config file first, environment on top.
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load config");
            return;
        }
    };
    let api = match ApiClient::new(&config.service_url, config.request_timeout) {
        Ok(api) => api,
        Err(err) => {
            tracing::error!(error = %err, "failed to build client");
            return;
        }
    };
    tracing::info!(
        service_url = config.service_url.as_str(),
        printers = config.printers.len(),
        refresh_secs = config.refresh_interval.as_secs(),
        fetch_details = config.fetch_details,
        "dashboard starting"
    );

    let mut board = Board::new(&config.printers);
    draw(&board);

    let dashboard = Dashboard { config, api };
    let mut ticker = tokio::time::interval(dashboard.config.refresh_interval);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    // Timer ticks and manual refreshes share this loop, so cycles never overlap.
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().eq_ignore_ascii_case("q") => break,
                Ok(Some(_)) => tracing::info!("manual refresh"),
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }

        dashboard.refresh(&mut board).await;
        draw(&board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::spawn_server;
    use crate::config::{merge_env, FileConfig};
    use std::time::Duration;

    fn dashboard(service_url: &str) -> (Dashboard, Board) {
        let mut config = merge_env(FileConfig::default());
        config.service_url = service_url.to_string();
        config.request_timeout = Duration::from_secs(2);
        config.fetch_details = true;
        let api = ApiClient::new(&config.service_url, config.request_timeout).unwrap();
        let board = Board::new(&config.printers);
        (Dashboard { config, api }, board)
    }

    fn assert_demo_mode(board: &Board) {
        assert!(board.last_updated.as_deref().unwrap().ends_with("(Demo Mode)"));
        assert!(board.banner.is_some());
        assert!(board
            .cards
            .iter()
            .all(|card| card.status_text != "Checking..." && card.supplies.is_some()));
    }

    #[tokio::test]
    async fn unreachable_service_falls_back_to_demo_mode() {
        let (dashboard, mut board) = dashboard("http://127.0.0.1:1");
        dashboard.refresh(&mut board).await;
        assert_demo_mode(&board);
    }

    #[tokio::test]
    async fn server_error_falls_back_to_demo_mode() {
        let base = spawn_server("500 Internal Server Error", "{}").await;
        let (dashboard, mut board) = dashboard(&base);
        dashboard.refresh(&mut board).await;
        assert_demo_mode(&board);
        assert!(board.banner.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn unexpected_body_falls_back_to_demo_mode() {
        let base = spawn_server("200 OK", r#"{"oops":true}"#).await;
        let (dashboard, mut board) = dashboard(&base);
        dashboard.refresh(&mut board).await;
        assert_demo_mode(&board);
    }
}

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, time::Duration};

use crate::api::PrinterRef;

const DEFAULT_PRINTERS: [(&str, &str); 9] = [
    ("Oneill3rdfloorprinter01.bc.edu", "136.167.67.130"),
    ("Oneill3rdfloorprinter02.bc.edu", "136.167.66.108"),
    ("Oneill3rdfloorprinter03.bc.edu", "136.167.67.32"),
    ("Oneill3rdfloorprinter04.bc.edu", "136.167.69.110"),
    ("Oneill3rdfloorprinter05.bc.edu", "136.167.69.140"),
    ("oneill3rdfloorprinter06.bc.edu", "136.167.66.240"),
    ("oneill3rdfloorcolorprinter01.bc.edu", "136.167.67.81"),
    ("2150comm.bc.edu", "136.167.214.175"),
    ("WIHD", "136.167.66.220"),
];

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub service_url: String,
    pub refresh_interval: Duration,
    pub fetch_details: bool,
    pub request_timeout: Duration,
    pub printers: Vec<PrinterRef>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct FileConfig {
    pub service_url: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub fetch_details: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub printers: Option<Vec<PrinterRef>>,
}

pub fn default_printers() -> Vec<PrinterRef> {
    DEFAULT_PRINTERS
        .iter()
        .map(|(name, ip)| PrinterRef {
            name: name.to_string(),
            ip: ip.to_string(),
        })
        .collect()
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("DASHBOARD_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    let repo_path = PathBuf::from("client/dashboard/config.toml");
    if repo_path.exists() {
        return repo_path;
    }

    PathBuf::from("dashboard.toml")
}

pub fn parse_file_config(content: &str) -> Result<FileConfig, String> {
    toml::from_str::<FileConfig>(content).map_err(|err| format!("parse config: {err}"))
}

pub fn load_config() -> Result<DashboardConfig, String> {
    let config_path = resolve_config_path();

    let file_config = if config_path.exists() {
        let content =
            std::fs::read_to_string(&config_path).map_err(|err| format!("read config: {err}"))?;
        tracing::info!(path = %config_path.display(), "loaded config file");
        parse_file_config(&content)?
    } else {
        FileConfig::default()
    };

    Ok(merge_env(file_config))
}

/// Environment wins over the file; the file wins over built-in defaults.
/// Unrecognized values yield `None` so the file setting or default applies.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn merge_env(file_config: FileConfig) -> DashboardConfig {
    let service_url = env::var("SERVICE_URL")
        .ok()
        .or(file_config.service_url)
        .unwrap_or_else(|| "http://localhost:8080".to_string());
    let refresh_interval = env::var("REFRESH_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .or(file_config.refresh_interval_secs)
        .unwrap_or(120)
        .max(1);
    let fetch_details = env::var("FETCH_DETAILS")
        .ok()
        .and_then(|value| parse_flag(&value))
        .or(file_config.fetch_details)
        .unwrap_or(true);
    let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .or(file_config.request_timeout_secs)
        .unwrap_or(10);
    let printers = match file_config.printers {
        Some(printers) if !printers.is_empty() => printers,
        _ => default_printers(),
    };

    DashboardConfig {
        service_url: service_url.trim_end_matches('/').to_string(),
        refresh_interval: Duration::from_secs(refresh_interval),
        fetch_details,
        request_timeout: Duration::from_secs(request_timeout),
        printers,
    }
}

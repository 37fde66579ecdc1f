use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fmt, time::Duration};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrinterRef {
    pub name: String,
    pub ip: String,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    printers: &'a [PrinterRef],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub name: String,
    #[serde(default)]
    pub ip: String,
    pub status: String,
    #[serde(default)]
    pub response_time: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Toner {
    pub color: String,
    pub level: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tray {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub current: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailResult {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub toners: Vec<Toner>,
    #[serde(default)]
    pub trays: Vec<Tray>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(u16),
    Decode(reqwest::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "request failed: {err}"),
            FetchError::Status(code) => write!(f, "endpoint returned status {code}"),
            FetchError::Decode(err) => write!(f, "unexpected response body: {err}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| format!("build http client: {err}"))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn check_printers(
        &self,
        printers: &[PrinterRef],
    ) -> Result<Vec<StatusResult>, FetchError> {
        self.post("check-printers", printers).await
    }

    pub async fn check_printer_details(
        &self,
        printers: &[PrinterRef],
    ) -> Result<Vec<DetailResult>, FetchError> {
        self.post("check-printer-details", printers).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        printers: &[PrinterRef],
    ) -> Result<T, FetchError> {
        let url = format!("{}/api/{endpoint}", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&CheckRequest { printers })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(endpoint, status = status.as_u16(), "endpoint responded");
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response.json().await.map_err(FetchError::Decode)
    }
}

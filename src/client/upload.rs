use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub const DEFAULT_PROCESS_URL: &str = "http://localhost:8000/process";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("processing service replied without html_url or rows/columns")]
    UnrecognizedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { name, bytes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataSummary {
    pub rows: u64,
    pub columns: Vec<String>,
}

/// What the processing service asked the page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Navigate the whole page to this URL.
    Redirect(String),
    /// Render the summary inline.
    Summary(DataSummary),
}

#[derive(Deserialize)]
struct ProcessReply {
    html_url: Option<String>,
    rows: Option<u64>,
    columns: Option<Vec<String>>,
}

impl ProcessReply {
    fn into_outcome(self) -> Option<ProcessOutcome> {
        // a redirect takes precedence over an inline summary
        if let Some(url) = self.html_url.filter(|u| !u.is_empty()) {
            return Some(ProcessOutcome::Redirect(url));
        }
        match (self.rows, self.columns) {
            (Some(rows), Some(columns)) => Some(ProcessOutcome::Summary(DataSummary { rows, columns })),
            _ => None,
        }
    }
}

/// Single-file upload widget. Selecting a file replaces any previous
/// selection and uploads it straight away; [`FileUpload::process`] uploads
/// the current selection again.
///
/// Failures are logged and otherwise ignored, and are never retried.
#[derive(Debug)]
pub struct FileUpload {
    http: reqwest::Client,
    endpoint: String,
    selected: Option<SelectedFile>,
    last_outcome: Option<ProcessOutcome>,
}

impl FileUpload {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            selected: None,
            last_outcome: None,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&ProcessOutcome> {
        self.last_outcome.as_ref()
    }

    pub async fn select(&mut self, file: SelectedFile) -> Option<ProcessOutcome> {
        info!(file = %file.name, size = file.bytes.len(), "File selected");
        self.selected = Some(file);
        self.process().await
    }

    pub async fn process(&mut self) -> Option<ProcessOutcome> {
        let file = self.selected.as_ref()?;
        match self.send(file).await {
            Ok(outcome) => {
                self.last_outcome = Some(outcome.clone());
                Some(outcome)
            }
            Err(e) => {
                error!(error = %e, file = %file.name, "Upload failed");
                None
            }
        }
    }

    /// One multipart POST of `file` under the `file` field.
    #[instrument(skip(self, file), fields(file = %file.name, endpoint = %self.endpoint))]
    pub async fn send(&self, file: &SelectedFile) -> Result<ProcessOutcome, UploadError> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let reply: ProcessReply = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let outcome = reply.into_outcome().ok_or_else(|| {
            warn!("Processing service reply had no usable fields");
            UploadError::UnrecognizedResponse
        })?;
        info!(outcome = ?outcome, "File processed");
        Ok(outcome)
    }
}

impl Default for FileUpload {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_URL)
    }
}

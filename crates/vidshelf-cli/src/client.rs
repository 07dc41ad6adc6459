//! Shared client utilities, error types, and logging setup for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing_subscriber::EnvFilter;
use url::Url;
use vidshelf_api_models::{
    DELETE_PATH, DeleteRequest, DeleteResponse, StreamResponse, UPLOAD_FIELD, UPLOAD_PATH,
    UploadResponse, VIDEOS_PATH, VideoId, stream_path,
};
use vidshelf_core::backend::{decode_mutation_body, decode_read_body};
use vidshelf_core::{
    BackendError, ClientConfig, ControllerError, LibraryBackend, LibraryController, UploadSource,
};

use crate::cli::LogFormat;
use crate::terminal::{HeadlessEngine, TerminalSurface};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ControllerError> for CliError {
    fn from(error: ControllerError) -> Self {
        if error.is_local() {
            Self::Validation(error.to_string())
        } else {
            Self::Failure(error.into())
        }
    }
}

/// Controller type every command handler drives.
pub(crate) type CliController = LibraryController<HttpBackend, HeadlessEngine>;

/// Application context passed to command handlers.
#[derive(Clone, Debug)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) config: ClientConfig,
}

impl AppContext {
    /// Build the HTTP client and validated controller configuration.
    pub(crate) fn new(
        base_url: Url,
        timeout: Duration,
        subtitle_root: &str,
        trace_id: &str,
    ) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        let config = ClientConfig::default()
            .with_api_base_url(base_url.as_str())
            .with_subtitle_root(subtitle_root)
            .validate()
            .map_err(|err| CliError::validation(err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Fresh controller over this context's backend.
    pub(crate) fn controller(&self) -> CliController {
        LibraryController::new(
            self.config.clone(),
            HttpBackend::new(self.client.clone(), self.config.clone()),
            HeadlessEngine::default(),
            Rc::new(TerminalSurface),
        )
    }

    /// Resolve a backend-relative location against the API URL.
    pub(crate) fn absolute(&self, location: &str) -> String {
        self.base_url
            .join(location)
            .map_or_else(|_| location.to_string(), |url| url.to_string())
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Install the stderr tracing subscriber; `RUST_LOG` overrides the default level.
pub(crate) fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Video file on the local disk; read only when the upload is sent.
#[derive(Clone, Debug)]
pub(crate) struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl UploadSource for LocalFile {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// `reqwest` implementation of the library backend.
///
/// Request URLs come from [`ClientConfig::endpoint`] so a path prefix in the
/// API URL is kept.
#[derive(Clone, Debug)]
pub(crate) struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub(crate) const fn new(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.config
            .endpoint(path)
            .parse()
            .map_err(|err| BackendError::transport(path, format!("invalid base URL: {err}")))
    }

    async fn send(path: &str, request: RequestBuilder) -> Result<(u16, Vec<u8>), BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::transport(path, err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| BackendError::transport(path, err))?;
        tracing::debug!(path, status, bytes = body.len(), "backend answered");
        Ok((status, body.to_vec()))
    }
}

#[async_trait(?Send)]
impl LibraryBackend for HttpBackend {
    type Upload = LocalFile;

    async fn list_videos(&self) -> Result<Vec<VideoId>, BackendError> {
        let request = self.client.get(self.url(VIDEOS_PATH)?);
        let (status, body) = Self::send(VIDEOS_PATH, request).await?;
        decode_read_body(VIDEOS_PATH, status, &body)
    }

    async fn resolve_stream(&self, video: &VideoId) -> Result<StreamResponse, BackendError> {
        let path = stream_path(video);
        let request = self.client.get(self.url(&path)?);
        let (status, body) = Self::send(&path, request).await?;
        decode_read_body(&path, status, &body)
    }

    async fn upload(&self, file: &LocalFile) -> Result<UploadResponse, BackendError> {
        let bytes = tokio::fs::read(file.path()).await.map_err(|err| {
            BackendError::transport(
                UPLOAD_PATH,
                format!("failed to read '{}': {err}", file.path().display()),
            )
        })?;
        let part = Part::bytes(bytes).file_name(file.file_name());
        let form = Form::new().part(UPLOAD_FIELD, part);
        let request = self.client.post(self.url(UPLOAD_PATH)?).multipart(form);
        let (status, body) = Self::send(UPLOAD_PATH, request).await?;
        decode_mutation_body(UPLOAD_PATH, status, &body)
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse, BackendError> {
        let builder = self.client.post(self.url(DELETE_PATH)?).json(request);
        let (status, body) = Self::send(DELETE_PATH, builder).await?;
        decode_mutation_body(DELETE_PATH, status, &body)
    }
}

//! HTTP client for the library backend (REST + multipart).

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use vidshelf_api_models::{
    DELETE_PATH, DeleteRequest, DeleteResponse, StreamResponse, UPLOAD_FIELD, UPLOAD_PATH,
    UploadResponse, VIDEOS_PATH, VideoId, stream_path,
};
use vidshelf_core::backend::{decode_mutation_body, decode_read_body};
use vidshelf_core::{BackendError, ClientConfig, LibraryBackend, UploadSource};
use web_sys::{File, FormData};

/// File picked from the browse input or dropped on the drop zone.
#[derive(Clone, Debug)]
pub(crate) struct BrowserFile(pub(crate) File);

impl UploadSource for BrowserFile {
    fn file_name(&self) -> String {
        self.0.name()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    config: ClientConfig,
}

impl ApiClient {
    pub(crate) const fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = Request::get(&self.url(path))
            .send()
            .await
            .map_err(|err| BackendError::transport(path, err))?;
        let (status, body) = read_body(path, response).await?;
        decode_read_body(path, status, &body)
    }

    async fn send_mutation<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: Request,
    ) -> Result<T, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::transport(path, err))?;
        let (status, body) = read_body(path, response).await?;
        decode_mutation_body(path, status, &body)
    }
}

async fn read_body(path: &str, response: Response) -> Result<(u16, Vec<u8>), BackendError> {
    let status = response.status();
    let body = response
        .binary()
        .await
        .map_err(|err| BackendError::transport(path, err))?;
    Ok((status, body))
}

#[async_trait(?Send)]
impl LibraryBackend for ApiClient {
    type Upload = BrowserFile;

    async fn list_videos(&self) -> Result<Vec<VideoId>, BackendError> {
        self.get_json(VIDEOS_PATH).await
    }

    async fn resolve_stream(&self, video: &VideoId) -> Result<StreamResponse, BackendError> {
        self.get_json(&stream_path(video)).await
    }

    async fn upload(&self, file: &BrowserFile) -> Result<UploadResponse, BackendError> {
        let form = FormData::new().map_err(|err| {
            BackendError::transport(UPLOAD_PATH, format!("form-data failed: {err:?}"))
        })?;
        form.append_with_blob_and_filename(UPLOAD_FIELD, &file.0, &file.0.name())
            .map_err(|err| {
                BackendError::transport(UPLOAD_PATH, format!("attach file: {err:?}"))
            })?;
        let request = Request::post(&self.url(UPLOAD_PATH)).body(form);
        self.send_mutation(UPLOAD_PATH, request).await
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResponse, BackendError> {
        let request = Request::post(&self.url(DELETE_PATH))
            .json(request)
            .map_err(|err| BackendError::transport(DELETE_PATH, err))?;
        self.send_mutation(DELETE_PATH, request).await
    }
}

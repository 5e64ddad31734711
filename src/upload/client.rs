use super::types::{AggregatedResult, ArtifactLink, UploadResult};
use crate::error::ApiError;
use crate::selection::SelectedFile;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// The two server calls a submission is made of.
#[allow(async_fn_in_trait)]
pub trait QuestionSetApi {
    /// `POST /upload` for one file of a batch of `num_files`.
    async fn upload(&self, file: &SelectedFile, num_files: usize)
        -> Result<UploadResult, ApiError>;

    /// `POST /question_set` with the aggregated batch.
    async fn create_question_set(&self, payload: &AggregatedResult)
        -> Result<ArtifactLink, ApiError>;
}

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }
}

impl QuestionSetApi for HttpApi {
    async fn upload(
        &self,
        file: &SelectedFile,
        num_files: usize,
    ) -> Result<UploadResult, ApiError> {
        let content = tokio::fs::read(&file.path).await?;
        debug!("Uploading {} ({} bytes)", file.name, content.len());

        let part = Part::bytes(content)
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;
        let form = Form::new()
            .part("file", part)
            .text("num_files", num_files.to_string());

        let response = self
            .client
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await?;

        read_json(response).await
    }

    async fn create_question_set(
        &self,
        payload: &AggregatedResult,
    ) -> Result<ArtifactLink, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/question_set"))
            .json(payload)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Decodes a 2xx JSON body; anything else becomes an error carrying the body text.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let body = if body.trim().is_empty() {
            format!("Request failed with status: {}", status)
        } else {
            body
        };
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|_| ApiError::UnexpectedBody(body))
}

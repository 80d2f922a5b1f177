use crate::error::ClientError;
use crate::upload::types::SourceFile;
use crate::utils::image_file::{guess_mime, is_allowed_image};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize)]
struct UploadResponse {
    filename: Option<String>,
}

#[derive(Deserialize)]
struct ProcessResponse {
    processed_filename: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the HDR processing service.
#[derive(Clone)]
pub struct HdrClient {
    http: reqwest::Client,
    base: Url,
}

impl HdrClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidServerUrl {
            url: server_url.to_string(),
            reason,
        };
        let base = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not usable as a base url".to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn upload_url(&self) -> Url {
        self.endpoint(&["upload"])
    }

    pub fn process_url(&self) -> Url {
        self.endpoint(&["process"])
    }

    pub fn download_url(&self, processed_name: &str) -> Url {
        self.endpoint(&["download", processed_name])
    }

    pub fn static_url(&self, processed_name: &str) -> Url {
        self.endpoint(&["static", "processed", processed_name])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the image as multipart field `file` and returns the server-assigned name.
    pub async fn upload(&self, file: &SourceFile) -> Result<String, ClientError> {
        const ENDPOINT: &str = "/upload";

        if !is_allowed_image(Path::new(&file.name)) {
            return Err(ClientError::UnsupportedFile(file.name.clone()));
        }

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&guess_mime(&file.name))
            .map_err(ClientError::transport(ENDPOINT))?;
        let form = Form::new().part("file", part);

        info!("Uploading {} ({} bytes)", file.name, file.bytes.len());
        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::transport(ENDPOINT))?;

        let body: UploadResponse = read_json(ENDPOINT, response).await?;
        body.filename.ok_or(ClientError::MissingField {
            endpoint: ENDPOINT,
            field: "filename",
        })
    }

    /// Asks the service to process an uploaded file and returns the processed name.
    pub async fn process(&self, uploaded_name: &str) -> Result<String, ClientError> {
        const ENDPOINT: &str = "/process";

        info!("Requesting processing of {}", uploaded_name);
        let response = self
            .http
            .post(self.process_url())
            .json(&json!({ "filename": uploaded_name }))
            .send()
            .await
            .map_err(ClientError::transport(ENDPOINT))?;

        let body: ProcessResponse = read_json(ENDPOINT, response).await?;
        body.processed_filename.ok_or(ClientError::MissingField {
            endpoint: ENDPOINT,
            field: "processed_filename",
        })
    }

    /// Fetches the processed image bytes from the static host.
    pub async fn fetch_processed(&self, processed_name: &str) -> Result<Vec<u8>, ClientError> {
        const ENDPOINT: &str = "/static/processed";

        let url = self.static_url(processed_name);
        debug!("Fetching processed image from {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ClientError::transport(ENDPOINT))?;
        let response = ensure_success(ENDPOINT, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(ClientError::transport(ENDPOINT))?;
        Ok(bytes.to_vec())
    }
}

async fn ensure_success(
    endpoint: &'static str,
    response: Response,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { error: Some(message) }) => message,
        _ if text.trim().is_empty() => "no details".to_string(),
        _ => text,
    };
    Err(ClientError::Status {
        endpoint,
        status,
        detail,
    })
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, ClientError> {
    let response = ensure_success(endpoint, response).await?;
    let text = response
        .text()
        .await
        .map_err(ClientError::transport(endpoint))?;
    serde_json::from_str(&text).map_err(|source| ClientError::InvalidJson { endpoint, source })
}

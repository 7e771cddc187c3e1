//! Client for the hosted image service.
//!
//! Uploads go to the service's upload endpoint as a form post (the
//! payload is a base64 string or a URL the service fetches itself);
//! deletes go to the management API. Both authenticate with the private
//! API key as HTTP basic auth, the key as username and an empty
//! password.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ImageError;
use crate::image::store::{ImageStore, UploadedImage, IMAGE_FOLDER};

/// Response body of a successful upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Error body the service returns on failures.
#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

/// reqwest-based [`ImageStore`] implementation.
///
/// Holds a long-lived HTTP client; constructed once at startup and
/// injected into the app state.
#[derive(Clone)]
pub struct HostedImageStore {
    http: reqwest::Client,
    upload_url: String,
    api_url: String,
    private_key: String,
}

impl HostedImageStore {
    /// Create a client for the given service endpoints.
    ///
    /// # Arguments
    /// * `upload_url` - Full upload endpoint URL
    /// * `api_url` - Management API base URL (file ids are appended)
    /// * `private_key` - Private API key
    pub fn new(
        upload_url: impl Into<String>,
        api_url: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.into(),
            api_url: trim_trailing_slash(api_url.into()),
            private_key: private_key.into(),
        }
    }

    /// Extract the service's error message from a non-success response,
    /// falling back to the status code.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ServiceError>().await {
            Ok(body) => body.message,
            Err(_) => format!("service returned {}", status),
        }
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[async_trait]
impl ImageStore for HostedImageStore {
    async fn upload(&self, file_name: &str, data: &str) -> Result<UploadedImage, ImageError> {
        let folder = format!("/{}", IMAGE_FOLDER);
        let response = self
            .http
            .post(&self.upload_url)
            .basic_auth(&self.private_key, Some(""))
            .form(&[("file", data), ("fileName", file_name), ("folder", &folder)])
            .send()
            .await
            .map_err(|e| ImageError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Upload(Self::error_message(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Upload(e.to_string()))?;

        Ok(UploadedImage { url: body.url })
    }

    async fn delete(&self, file_id: &str) -> Result<(), ImageError> {
        let url = format!("{}/files/{}", self.api_url, file_id);
        let response = self
            .http
            .delete(&url)
            .basic_auth(&self.private_key, Some(""))
            .send()
            .await
            .map_err(|e| ImageError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Delete(Self::error_message(response).await));
        }
        Ok(())
    }
}

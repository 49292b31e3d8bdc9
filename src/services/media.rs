// Media host client: image upload and removal on Cloudinary
// Requests are signed with SHA-256 over the sorted parameters plus the API secret

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::app_config::MediaConfig;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Media host is not configured")]
    NotConfigured,

    #[error("Could not read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Media host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected media host response: {0}")]
    InvalidResponse(String),
}

/// Asset stored on the media host
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: String,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload a local file and return where it is served from
    async fn upload(
        &self,
        path: &Path,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadedAsset, MediaError>;

    /// Remove an asset by its public id
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Clone)]
pub struct CloudinaryClient {
    client: Arc<Client>,
    api_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(config: &MediaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("Arcadia-API/1.0")
            .build()
            .unwrap_or_default();

        Self {
            client: Arc::new(client),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn ensure_configured(&self) -> Result<(), MediaError> {
        if self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(MediaError::NotConfigured);
        }
        Ok(())
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_url, self.cloud_name, action)
    }

    fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string()
    }

    /// Hex SHA-256 of `k1=v1&k2=v2...` (keys sorted) followed by the secret
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let digest = Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes());
        format!("{:x}", digest)
    }

    async fn rejected(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("Media host answered {}: {}", status, message);
        MediaError::Rejected { status, message }
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    #[instrument(skip(self, path), fields(file = %file_name))]
    async fn upload(
        &self,
        path: &Path,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadedAsset, MediaError> {
        self.ensure_configured()?;

        let bytes = tokio::fs::read(path).await?;
        let timestamp = Self::timestamp();
        let signature = Self::sign(&[("timestamp", timestamp.as_str())], &self.api_secret);

        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let asset: UploadedAsset = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        info!("Uploaded image as {}", asset.public_id);
        Ok(asset)
    }

    #[instrument(skip(self))]
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        self.ensure_configured()?;

        let timestamp = Self::timestamp();
        let signature = Self::sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let form = multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        // "not found" means the asset is already gone
        match body.result.as_str() {
            "ok" | "not found" => {
                info!("Destroyed image {} ({})", public_id, body.result);
                Ok(())
            },
            other => Err(MediaError::InvalidResponse(other.to_string())),
        }
    }
}

/// Public id of an asset derived from its delivery URL: last path segment without extension
pub fn public_id_from_url(url: &str) -> Option<String> {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());

    let segment = path.rsplit('/').next()?;
    let stem = segment.split('.').next()?;

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_sorts_parameters() {
        let a = CloudinaryClient::sign(&[("timestamp", "1"), ("public_id", "x")], "s");
        let b = CloudinaryClient::sign(&[("public_id", "x"), ("timestamp", "1")], "s");
        assert_eq!(a, b);

        let expected = format!("{:x}", Sha256::digest(b"public_id=x&timestamp=1s"));
        assert_eq!(a, expected);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/v1712/lion_k2x9.jpg"
            ),
            Some("lion_k2x9".to_string())
        );
        assert_eq!(public_id_from_url("plain-id"), Some("plain-id".to_string()));
        assert_eq!(public_id_from_url("https://res.cloudinary.com/demo/"), None);
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses() {
        let mut config = crate::app_config::AppConfig::for_test().media;
        config.api_secret = String::new();
        let client = CloudinaryClient::new(&config);

        let result = client.destroy("abc").await;
        assert!(matches!(result, Err(MediaError::NotConfigured)));
    }
}

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};

const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Object storage for finished narration files.
#[async_trait]
pub trait AudioStorageRepository: Send + Sync {
    /// Store `bytes` under `path` and return a publicly resolvable URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, String>;
}

/// Supabase-style storage REST API.
pub struct SupabaseStorageRepository {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorageRepository {
    pub fn new(client: Client, base_url: String, service_key: String, bucket: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            urlencoding::encode(&self.bucket),
            encode_path(path)
        )
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            urlencoding::encode(&self.bucket),
            encode_path(path)
        )
    }
}

/// Encodes each segment but keeps the `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl AudioStorageRepository for SupabaseStorageRepository {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, String> {
        let size = bytes.len();
        tracing::info!(path = %path, bucket = %self.bucket, size, "Uploading narration audio");

        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header(header::CONTENT_TYPE, WAV_CONTENT_TYPE)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| format!("storage request failed: {}", e))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = status.as_u16(),
                body = %body,
                "Storage upload rejected"
            );
            return Err(format!("storage responded with status {}", status.as_u16()));
        }

        let url = self.public_url(path);
        tracing::debug!(url = %url, "Narration audio uploaded");
        Ok(url)
    }
}

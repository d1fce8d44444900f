use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum VeoError {
    #[error("submission rejected: {0}")] Submission(String),
    #[error("status poll failed: {0}")] Polling(String),
    #[error("operation completed without a video: {0}")] MissingResult(String),
    #[error("video download failed: {0}")] Fetch(String),
    #[error("video not ready after {0}s")] Timeout(u64),
}

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "imageBytes" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 {
                            *val = serde_json::Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

const DEFAULT_MODEL: &str = "veo-2.0-generate-001";
const POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct VeoClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    poll_interval: Duration,
    poll_timeout: Option<Duration>,
}

impl VeoClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval: POLL_INTERVAL,
            poll_timeout: Some(DEFAULT_POLL_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound on total polling time; `None` polls until the operation
    /// finishes or a poll fails, however long that takes.
    pub fn with_poll_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Animate a still image: submit the generation request, poll the
    /// returned operation until it finishes, then download the video bytes.
    pub async fn generate_video(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<Bytes, VeoError> {
        info!("🎬 Starting video generation process...");
        let mut operation = self.submit(image_base64, mime_type, prompt).await?;
        info!("Operation started: {}", operation.name);

        let started = Instant::now();
        while !operation.done {
            if let Some(limit) = self.poll_timeout {
                if started.elapsed() >= limit {
                    error!("❌ Operation {} still unfinished after {:?}", operation.name, limit);
                    return Err(VeoError::Timeout(limit.as_secs()));
                }
            }
            tokio::time::sleep(self.poll_interval).await;
            operation = self.refetch(&operation).await?;
            info!("Operation status: {}", if operation.done { "Done" } else { "In Progress" });
        }

        info!("✅ Video generation complete.");
        let uri = extract_video_uri(&operation)
            .ok_or_else(|| VeoError::MissingResult(format!("operation {} has no download uri", operation.name)))?
            .to_string();

        self.download(&uri).await
    }

    async fn submit(&self, image_base64: &str, mime_type: &str, prompt: &str) -> Result<Operation, VeoError> {
        let url = format!("{}/models/{}:generateVideos", self.base_url, self.model);
        info!("🔗 Submitting generation request to: {}", url);

        let request_body = json!({
            "prompt": prompt,
            "image": {
                "imageBytes": image_base64,
                "mimeType": mime_type,
            },
            "config": {
                "numberOfVideos": 1
            }
        });

        let mut loggable = request_body.clone();
        truncate_base64_in_json(&mut loggable);
        info!("📤 Request body: {}", serde_json::to_string_pretty(&loggable).unwrap_or_default());

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| VeoError::Submission(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ Submission rejected: {}", error_body);
            return Err(VeoError::Submission(format!("status={} body={}", status, error_body)));
        }

        response.json::<Operation>().await
            .map_err(|e| VeoError::Submission(format!("malformed operation: {}", e)))
    }

    // Status refetch replaces the whole operation value; the service never
    // flips a finished operation back to in-progress.
    async fn refetch(&self, operation: &Operation) -> Result<Operation, VeoError> {
        let url = format!("{}/{}", self.base_url, operation.name);

        let response = self.client
            .get(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .send()
            .await
            .map_err(|e| VeoError::Polling(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ Status poll failed: {}", error_body);
            return Err(VeoError::Polling(format!("status={} body={}", status, error_body)));
        }

        response.json::<Operation>().await
            .map_err(|e| VeoError::Polling(format!("malformed operation: {}", e)))
    }

    // The download endpoint wants the key as a query parameter, unlike the
    // header auth used for submission and polling.
    async fn download(&self, uri: &str) -> Result<Bytes, VeoError> {
        let sep = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", uri, sep, self.api_key);
        info!("⬇️ Fetching video from download link: {}", url.replace(&self.api_key, "***"));

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| VeoError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ Video download failed with status {}: {}", status, error_body);
            return Err(VeoError::Fetch(format!("status={} body={}", status, error_body)));
        }

        let bytes = response.bytes().await
            .map_err(|e| VeoError::Fetch(e.to_string()))?;
        info!("🎥 Downloaded video payload ({} bytes)", bytes.len());
        Ok(bytes)
    }
}

// --- Operation Parsing Helpers ---

#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OperationResponse {
    #[serde(rename = "generatedVideos", default)]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

fn extract_video_uri(operation: &Operation) -> Option<&str> {
    operation
        .response
        .as_ref()?
        .generated_videos
        .first()?
        .video
        .as_ref()?
        .uri
        .as_deref()
}

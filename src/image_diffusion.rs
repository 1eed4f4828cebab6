// image_diffusion.rs
use crate::config::OpenAiConfig;
use crate::openai_chat::upstream_error;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub const IMAGE_SIZE: &str = "512x512";

#[async_trait]
pub trait ImageService: Send + Sync {
    /// Requests one image for `prompt` and returns the raw response body.
    async fn generate(&self, prompt: &str) -> Result<Value>;
}

#[derive(Serialize, Debug)]
pub struct CreateImageRequest {
    pub prompt: String,
    pub n: usize,
    pub size: String,
}

impl CreateImageRequest {
    pub fn new(prompt: &str) -> Self {
        CreateImageRequest {
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        }
    }
}

/// `data[0].url`, or an empty string when the response has no image.
pub fn extract_image_url(response: &Value) -> String {
    response["data"]
        .get(0)
        .and_then(|image| image["url"].as_str())
        .unwrap_or("")
        .to_string()
}

pub struct OpenAiImageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiImageClient {
    pub fn new(client: Client, config: &OpenAiConfig) -> Self {
        OpenAiImageClient {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl ImageService for OpenAiImageClient {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        let request = CreateImageRequest::new(prompt);
        debug!("Sending generate image request: {:?}", request);

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Image generation request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read image generation response")?;
        debug!("Image generation response body: {}", body);

        if !status.is_success() {
            return Err(upstream_error("Image generation", status, &body));
        }

        serde_json::from_str(&body).context("Image generation response is not valid JSON")
    }
}

// input_process.rs
use crate::chat_history::{
    FirestoreHistoryStore, HistoryRecorder, HistoryStore, LogHistoryStore, IMAGE_ANSWER,
};
use crate::config::AppConfig;
use crate::image_diffusion::{extract_image_url, ImageService, OpenAiImageClient};
use crate::image_prompt::classify;
use crate::openai_chat::{extract_reply, ChatService, OpenAiChatClient};

use anyhow::Result;
use log::{info, warn};
use reqwest::Client;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    pub url: String,
}

/// The two user-facing flows, wired to injected API clients and a history recorder.
#[derive(Clone)]
pub struct Assistant {
    chat: Arc<dyn ChatService>,
    image: Arc<dyn ImageService>,
    recorder: HistoryRecorder,
}

impl Assistant {
    pub fn new(
        chat: Arc<dyn ChatService>,
        image: Arc<dyn ImageService>,
        recorder: HistoryRecorder,
    ) -> Self {
        Assistant { chat, image, recorder }
    }

    /// Wires the OpenAI clients and the configured history store around one HTTP client.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = Client::new();

        let store: Arc<dyn HistoryStore> = match &config.firestore {
            Some(firestore) => {
                info!(
                    "Recording history to Firestore project {} ({})",
                    firestore.project_id, firestore.collection
                );
                Arc::new(FirestoreHistoryStore::new(client.clone(), firestore.clone()))
            }
            None => {
                warn!("FIREBASE_PROJECT_ID not set, history is only logged");
                Arc::new(LogHistoryStore)
            }
        };

        Assistant::new(
            Arc::new(OpenAiChatClient::new(client.clone(), &config.openai)),
            Arc::new(OpenAiImageClient::new(client, &config.openai)),
            HistoryRecorder::new(store),
        )
    }

    /// Asks the chat model and records the exchange after the reply arrives.
    /// API failures are returned; history failures are not.
    pub async fn run_chat(&self, text: &str) -> Result<ChatReply> {
        info!("Processing chat input: {}", text);

        let response = self.chat.complete(text).await?;
        let reply = extract_reply(&response);
        info!("Chat reply: {}", reply);

        self.recorder.record(text, &reply).await;

        Ok(ChatReply { reply })
    }

    /// Records the request first, then generates the image. The history entry
    /// exists even when generation fails.
    pub async fn run_image(&self, text: &str) -> Result<ImageResult> {
        let prompt = classify(text);
        info!("Processing image input: {} (prompt: {})", text, prompt);

        self.recorder.record(text, IMAGE_ANSWER).await;

        let response = self.image.generate(&prompt).await?;
        let url = extract_image_url(&response);
        info!("Image generated. URL: {}", url);

        Ok(ImageResult { url })
    }
}

#![allow(dead_code)]

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use geriapp::chat_history::{HistoryRecord, HistoryRecorder, HistoryStore};
use geriapp::image_diffusion::ImageService;
use geriapp::input_process::Assistant;
use geriapp::openai_chat::ChatService;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Shared log of everything the fakes saw, in call order.
#[derive(Default)]
pub struct CallLog {
    pub calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn push(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct FakeChat {
    pub response: Option<Value>,
    pub log: Arc<CallLog>,
}

#[async_trait]
impl ChatService for FakeChat {
    async fn complete(&self, user_input: &str) -> Result<Value> {
        self.log.push(format!("chat:{}", user_input));
        self.response
            .clone()
            .ok_or_else(|| anyhow!("connection refused"))
            .context("Chat completion request failed")
    }
}

pub struct FakeImage {
    pub response: Option<Value>,
    pub log: Arc<CallLog>,
}

#[async_trait]
impl ImageService for FakeImage {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        self.log.push(format!("image:{}", prompt));
        self.response
            .clone()
            .ok_or_else(|| anyhow!("Image generation API returned 500"))
    }
}

pub struct FakeStore {
    pub fail: bool,
    pub records: Mutex<Vec<HistoryRecord>>,
    pub log: Arc<CallLog>,
}

#[async_trait]
impl HistoryStore for FakeStore {
    async fn append(&self, record: &HistoryRecord) -> Result<()> {
        self.log.push(format!("store:{}", record.answer));
        self.records.lock().unwrap().push(record.clone());
        if self.fail {
            Err(anyhow!("PERMISSION_DENIED"))
        } else {
            Ok(())
        }
    }
}

pub struct Harness {
    pub assistant: Assistant,
    pub store: Arc<FakeStore>,
    pub log: Arc<CallLog>,
}

pub fn harness(chat: Option<Value>, image: Option<Value>, store_fails: bool) -> Harness {
    let log = Arc::new(CallLog::default());
    let store = Arc::new(FakeStore {
        fail: store_fails,
        records: Mutex::new(Vec::new()),
        log: log.clone(),
    });
    let assistant = Assistant::new(
        Arc::new(FakeChat { response: chat, log: log.clone() }),
        Arc::new(FakeImage { response: image, log: log.clone() }),
        HistoryRecorder::new(store.clone()),
    );
    Harness { assistant, store, log }
}

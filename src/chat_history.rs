// chat_history.rs
use crate::config::FirestoreConfig;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Answer stored for image requests; the record is written before the image exists.
pub const IMAGE_ANSWER: &str = "obrázek";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub question: String,
    pub answer: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(question: &str, answer: &str) -> Self {
        HistoryRecord {
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only sink for question/answer records.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &HistoryRecord) -> Result<()>;
}

/// Writes records into a Firestore collection through the REST `commit` endpoint.
/// `createdAt` is filled in by the server at request time.
pub struct FirestoreHistoryStore {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreHistoryStore {
    pub fn new(client: Client, config: FirestoreConfig) -> Self {
        FirestoreHistoryStore { client, config }
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.config.project_id)
    }

    pub fn commit_url(&self) -> String {
        format!("{}/v1/{}/documents:commit", self.config.base_url, self.database_path())
    }

    pub fn commit_body(&self, record: &HistoryRecord, document_id: &Uuid) -> Value {
        let name = format!(
            "{}/documents/{}/{}",
            self.database_path(),
            self.config.collection,
            document_id
        );
        json!({
            "writes": [{
                "update": {
                    "name": name,
                    "fields": {
                        "question": { "stringValue": record.question },
                        "answer": { "stringValue": record.answer }
                    }
                },
                "currentDocument": { "exists": false },
                "updateTransforms": [{
                    "fieldPath": "createdAt",
                    "setToServerValue": "REQUEST_TIME"
                }]
            }]
        })
    }
}

#[async_trait]
impl HistoryStore for FirestoreHistoryStore {
    async fn append(&self, record: &HistoryRecord) -> Result<()> {
        let document_id = Uuid::new_v4();
        let body = self.commit_body(record, &document_id);
        debug!("Committing history document {}: {}", document_id, body);

        let mut request = self.client.post(self.commit_url()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.query(&[("key", api_key)]);
        }

        let response = request
            .send()
            .await
            .context("Firestore commit request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Firestore commit returned {}: {}", status, text));
        }

        info!(
            "Stored history document {} in collection {}",
            document_id, self.config.collection
        );
        Ok(())
    }
}

/// Fallback when no document store is configured.
pub struct LogHistoryStore;

#[async_trait]
impl HistoryStore for LogHistoryStore {
    async fn append(&self, record: &HistoryRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize history record")?;
        info!("History record: {}", line);
        Ok(())
    }
}

/// Best-effort writer in front of a [`HistoryStore`].
///
/// Each call makes at most one append attempt. Failures are logged and never
/// returned, so callers carry on whatever the store does.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        HistoryRecorder { store }
    }

    pub async fn record(&self, question: &str, answer: &str) {
        let record = HistoryRecord::new(question, answer);
        if let Err(e) = self.store.append(&record).await {
            error!("Failed to store history record: {:#}", e);
        }
    }
}

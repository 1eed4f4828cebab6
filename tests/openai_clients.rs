use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use geriapp::chat_history::{FirestoreHistoryStore, HistoryRecord, HistoryStore};
use geriapp::config::{FirestoreConfig, OpenAiConfig};
use geriapp::image_diffusion::{extract_image_url, ImageService, OpenAiImageClient};
use geriapp::openai_chat::{extract_reply, ChatService, OpenAiChatClient};
use reqwest::Client;
use serde_json::{json, Value};
use std::net::SocketAddr;

async fn fake_chat(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    let authorized = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        == Some("Bearer sk-test");
    if !authorized {
        return HttpResponse::Unauthorized()
            .json(json!({"error": {"message": "Incorrect API key provided"}}));
    }
    let content = format!(
        "{} -> {}",
        body["model"].as_str().unwrap_or(""),
        body["messages"][0]["content"].as_str().unwrap_or("")
    );
    HttpResponse::Ok().json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
    }))
}

async fn fake_image(body: web::Json<Value>) -> HttpResponse {
    if body["n"] != 1 || body["size"] != "512x512" {
        return HttpResponse::BadRequest().json(json!({"error": {"message": "bad request"}}));
    }
    HttpResponse::Ok().json(json!({
        "data": [{"url": format!("http://img/{}.png", body["prompt"].as_str().unwrap_or("").len())}]
    }))
}

async fn fake_commit(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !req.path().ends_with("/databases/(default)/documents:commit") {
        return HttpResponse::NotFound().finish();
    }
    if !req.query_string().contains("key=web-key") {
        return HttpResponse::Forbidden().body("PERMISSION_DENIED");
    }
    let write = &body["writes"][0];
    if write["updateTransforms"][0]["setToServerValue"] != "REQUEST_TIME" {
        return HttpResponse::BadRequest().finish();
    }
    HttpResponse::Ok().json(json!({"commitTime": "2024-05-01T10:00:00Z"}))
}

fn start_fake_upstream() -> std::io::Result<SocketAddr> {
    let server = HttpServer::new(|| {
        App::new()
            .route("/v1/chat/completions", web::post().to(fake_chat))
            .route("/v1/images/generations", web::post().to(fake_image))
            .route("/v1/projects/{tail:.*}", web::post().to(fake_commit))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))?;
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    Ok(addr)
}

fn openai_config(addr: SocketAddr, api_key: &str) -> OpenAiConfig {
    OpenAiConfig {
        api_key: api_key.to_string(),
        base_url: format!("http://{}/v1", addr),
        chat_model: "gpt-4-turbo".to_string(),
    }
}

fn firestore_config(addr: SocketAddr, api_key: &str) -> FirestoreConfig {
    FirestoreConfig {
        base_url: format!("http://{}", addr),
        project_id: "geriapp".to_string(),
        api_key: Some(api_key.to_string()),
        collection: "geriapp-history".to_string(),
    }
}

#[actix_web::test]
async fn chat_client_sends_model_and_user_message() {
    let addr = start_fake_upstream().unwrap();
    let client = OpenAiChatClient::new(Client::new(), &openai_config(addr, "sk-test"));

    let response = client.complete("Ahoj").await.unwrap();

    assert_eq!(extract_reply(&response), "gpt-4-turbo -> Ahoj");
}

#[actix_web::test]
async fn chat_client_reports_upstream_error_message() {
    let addr = start_fake_upstream().unwrap();
    let client = OpenAiChatClient::new(Client::new(), &openai_config(addr, "sk-wrong"));

    let err = client.complete("Ahoj").await.unwrap_err();

    let text = err.to_string();
    assert!(text.contains("401"), "{}", text);
    assert!(text.contains("Incorrect API key provided"), "{}", text);
}

#[actix_web::test]
async fn image_client_requests_one_512_image() {
    let addr = start_fake_upstream().unwrap();
    let client = OpenAiImageClient::new(Client::new(), &openai_config(addr, "sk-test"));

    let response = client.generate("kočka").await.unwrap();

    assert_eq!(extract_image_url(&response), format!("http://img/{}.png", "kočka".len()));
}

#[actix_web::test]
async fn firestore_store_commits_with_api_key() {
    let addr = start_fake_upstream().unwrap();
    let record = HistoryRecord::new("Ahoj", "Dobrý den!");

    let store = FirestoreHistoryStore::new(Client::new(), firestore_config(addr, "web-key"));
    store.append(&record).await.unwrap();

    let store = FirestoreHistoryStore::new(Client::new(), firestore_config(addr, "other"));
    let err = store.append(&record).await.unwrap_err();
    assert!(err.to_string().contains("403"), "{}", err);
}

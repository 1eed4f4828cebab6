// api_routes.rs
use crate::input_process::Assistant;
use crate::session_manager::{FlowKind, SessionManager, SessionState};
use crate::ui_page::INDEX_HTML;

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

pub type SharedSessions = web::Data<Mutex<SessionManager>>;

#[derive(Deserialize)]
pub struct InteractRequest {
    pub question: String,
    pub session_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session_id: Uuid,
    pub input: String,
    pub reply: String,
    pub image_url: String,
    pub loading: bool,
    pub status: Option<String>,
}

impl SessionView {
    fn new(session_id: Uuid, state: &SessionState) -> Self {
        SessionView {
            session_id,
            input: state.input.clone(),
            reply: state.reply.clone(),
            image_url: state.image_url.clone(),
            loading: state.loading,
            status: state.status.clone(),
        }
    }
}

// Set API Routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_route)).service(
        web::scope("/api")
            .route("/chat", web::post().to(chat_route))
            .route("/image", web::post().to(image_route))
            .route("/session/{id}", web::get().to(session_route)),
    );
}

async fn index_route() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

async fn chat_route(
    req: web::Json<InteractRequest>,
    assistant: web::Data<Assistant>,
    sessions: SharedSessions,
) -> HttpResponse {
    run_flow(FlowKind::Chat, req.into_inner(), &assistant, &sessions).await
}

async fn image_route(
    req: web::Json<InteractRequest>,
    assistant: web::Data<Assistant>,
    sessions: SharedSessions,
) -> HttpResponse {
    run_flow(FlowKind::Image, req.into_inner(), &assistant, &sessions).await
}

async fn session_route(path: web::Path<Uuid>, sessions: SharedSessions) -> HttpResponse {
    let session_id = path.into_inner();
    match lock(&sessions).get(&session_id) {
        Some(state) => HttpResponse::Ok().json(SessionView::new(session_id, state)),
        None => HttpResponse::NotFound().body(format!("Unknown session {}", session_id)),
    }
}

fn lock(sessions: &SharedSessions) -> std::sync::MutexGuard<'_, SessionManager> {
    sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn view(sessions: &SharedSessions, session_id: Uuid) -> SessionView {
    let manager = lock(sessions);
    let state = manager.get(&session_id).cloned().unwrap_or_default();
    SessionView::new(session_id, &state)
}

async fn run_flow(
    kind: FlowKind,
    req: InteractRequest,
    assistant: &Assistant,
    sessions: &SharedSessions,
) -> HttpResponse {
    let begun = lock(sessions).begin(req.session_id, kind, &req.question);
    let session_id = match (begun, req.session_id) {
        (Ok(session_id), _) => session_id,
        (Err(busy), Some(session_id)) => {
            warn!("Rejected {:?} request for session {}: {}", kind, session_id, busy);
            return HttpResponse::Conflict().json(view(sessions, session_id));
        }
        (Err(busy), None) => {
            error!("Rejected {:?} request for a new session: {}", kind, busy);
            return HttpResponse::InternalServerError().body(busy.to_string());
        }
    };
    info!("Running {:?} flow for session {}", kind, session_id);

    let outcome = match kind {
        FlowKind::Chat => assistant
            .run_chat(&req.question)
            .await
            .map(|chat| lock(sessions).finish_chat(session_id, chat.reply)),
        FlowKind::Image => assistant
            .run_image(&req.question)
            .await
            .map(|image| lock(sessions).finish_image(session_id, image.url)),
    };

    match outcome {
        Ok(()) => HttpResponse::Ok().json(view(sessions, session_id)),
        Err(e) => {
            error!("{:?} flow failed for session {}: {:#}", kind, session_id, e);
            lock(sessions).fail(session_id, format!("Chyba: {:#}", e));
            HttpResponse::BadGateway().json(view(sessions, session_id))
        }
    }
}

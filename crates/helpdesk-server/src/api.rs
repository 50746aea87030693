use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use helpdesk_engine::{Analytics, LifecycleEngine};
use helpdesk_shared::{TicketId, TicketIntake, TicketStatus};
use helpdesk_store::Ticket;

use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LifecycleEngine>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/tickets", post(submit_ticket).get(list_tickets))
        .route("/tickets/:id", get(get_ticket))
        .route("/tickets/:id/handover", post(handover_ticket))
        .route("/tickets/:id/reply", post(agent_reply))
        .route("/customers/:email/history", get(customer_history))
        .route("/analytics", get(analytics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    instance: String,
}

#[derive(Deserialize, Default)]
struct TicketsQuery {
    /// Optional dashboard filter, e.g. `?status=escalated`.
    status: Option<TicketStatus>,
}

#[derive(Deserialize)]
struct ReplyRequest {
    content: String,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        instance: state.config.instance_name.clone(),
    })
}

async fn submit_ticket(
    State(state): State<AppState>,
    Json(intake): Json<TicketIntake>,
) -> Result<(StatusCode, Json<Ticket>), ServerError> {
    let ticket = state.engine.submit(&intake).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketsQuery>,
) -> Result<Json<Vec<Ticket>>, ServerError> {
    let mut tickets = state.engine.all_tickets()?;
    if let Some(status) = query.status {
        tickets.retain(|t| t.status == status);
    }
    Ok(Json(tickets))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, ServerError> {
    Ok(Json(state.engine.ticket(TicketId::from(id))?))
}

async fn handover_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, ServerError> {
    Ok(Json(state.engine.handover(TicketId::from(id))?))
}

async fn agent_reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(reply): Json<ReplyRequest>,
) -> Result<Json<Ticket>, ServerError> {
    Ok(Json(state.engine.agent_reply(TicketId::from(id), &reply.content)?))
}

async fn customer_history(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Ticket>>, ServerError> {
    Ok(Json(state.engine.customer_history(&email)?))
}

async fn analytics(State(state): State<AppState>) -> Result<Json<Analytics>, ServerError> {
    Ok(Json(state.engine.analytics()?))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use helpdesk_store::Database;
    use helpdesk_triage::{Classifier, TriageRequest, TriageVerdict};

    use super::*;

    struct Scripted(TriageVerdict);

    #[async_trait]
    impl Classifier for Scripted {
        async fn classify(&self, _request: &TriageRequest) -> TriageVerdict {
            self.0.clone()
        }
    }

    fn test_app(dir: &tempfile::TempDir, verdict: TriageVerdict) -> Router {
        let db = Database::open(&dir.path().join("helpdesk.db")).unwrap();
        let engine = Arc::new(LifecycleEngine::new(db, Arc::new(Scripted(verdict))));
        build_router(AppState {
            engine,
            config: Arc::new(ServerConfig::default()),
        })
    }

    fn resolved_verdict() -> TriageVerdict {
        TriageVerdict {
            response: "Try resetting your password.".to_string(),
            sentiment: 0.6,
            should_escalate: false,
            category: "Technical".to_string(),
            suggestions: vec!["a".into(), "b".into(), "c".into()],
            reason: None,
        }
    }

    fn intake_body() -> String {
        serde_json::json!({
            "name": "Ann Lee",
            "email": "ann@x.com",
            "subject": "Cannot log in",
            "category": "technical",
            "priority": "high",
            "channel": "web_form",
            "message": "I keep getting an error page"
        })
        .to_string()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir, resolved_verdict());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn submit_creates_a_triaged_ticket() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir, resolved_verdict());

        let response = app
            .clone()
            .oneshot(post_json("/tickets", intake_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let ticket = json_body(response).await;
        assert_eq!(ticket["status"], "resolved");
        assert_eq!(ticket["category"], "Technical");
        assert_eq!(ticket["messages"].as_array().unwrap().len(), 2);

        // The ticket is retrievable by id afterwards.
        let id = ticket["id"].as_str().unwrap();
        let response = app
            .oneshot(
                Request::get(format!("/tickets/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_intake_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir, resolved_verdict());

        let body = serde_json::json!({
            "name": "A",
            "email": "ann@x.com",
            "subject": "Cannot log in",
            "category": "technical",
            "priority": "high",
            "channel": "web_form",
            "message": "I keep getting an error page"
        })
        .to_string();

        let response = app.oneshot(post_json("/tickets", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir, resolved_verdict());

        let id = Uuid::new_v4();
        let response = app
            .oneshot(post_json(
                &format!("/tickets/{id}/handover"),
                String::new(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_filter_narrows_the_listing() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir, resolved_verdict());

        app.clone()
            .oneshot(post_json("/tickets", intake_body()))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::get("/tickets?status=escalated")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 0);

        let response = app
            .oneshot(
                Request::get("/tickets?status=resolved")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}

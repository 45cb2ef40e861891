//! In-process stand-in for the flood analysis service.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

/// How the mock answers every request.
#[derive(Clone, Debug)]
pub enum Behavior {
    /// 200 with a complete body at this risk level.
    Respond(&'static str),
    /// Bare status with an error body.
    Status(u16),
    /// Sleep before responding with "Low".
    Delay(Duration),
}

/// A request as the mock received it.
#[derive(Clone, Debug, PartialEq)]
pub enum Seen {
    Coordinates(serde_json::Value),
    Image {
        field: String,
        file_name: Option<String>,
        content_type: Option<String>,
        len: usize,
    },
}

struct MockState {
    behavior: Behavior,
    seen: Mutex<Vec<Seen>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            seen: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/api/analyze/coordinates", post(coordinates))
            .route("/api/analyze/image", post(image))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }
}

pub fn analysis_body(risk_level: &str) -> serde_json::Value {
    serde_json::json!({
        "risk_level": risk_level,
        "description": "Low-lying area near the Ravi river.",
        "recommendations": ["Keep an emergency kit ready", "Know your evacuation route"],
        "elevation": 208.0,
        "distance_from_water": 1250.5,
        "location_info": "Lahore, Punjab",
        "water_bodies": "",
        "ai_analysis": "Terrain is flat with poor drainage."
    })
}

async fn respond(state: &MockState) -> Response {
    match &state.behavior {
        Behavior::Respond(level) => Json(analysis_body(level)).into_response(),
        Behavior::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap();
            (status, Json(serde_json::json!({ "detail": "mock failure" }))).into_response()
        }
        Behavior::Delay(delay) => {
            tokio::time::sleep(*delay).await;
            Json(analysis_body("Low")).into_response()
        }
    }
}

async fn coordinates(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.seen.lock().unwrap().push(Seen::Coordinates(body));
    respond(&state).await
}

async fn image(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.unwrap().len();
        state.seen.lock().unwrap().push(Seen::Image {
            field: name,
            file_name,
            content_type,
            len,
        });
    }
    respond(&state).await
}

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use db::{DBService, models::idea::Idea};
use serde_json::{Value, json};
use services::services::config::Config;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    AppState, routes,
    session::{HeaderSessionResolver, USER_ID_HEADER},
};

pub struct TestApp {
    pub db: DBService,
    pub router: Router,
    pub owner: Uuid,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DBService::new_in_memory().await.unwrap();
        let state = AppState::new(
            db.clone(),
            &Config::default(),
            Arc::new(HeaderSessionResolver),
        );
        Self {
            router: routes::router(state),
            db,
            owner: Uuid::new_v4(),
        }
    }

    pub async fn seed_idea(&self) -> Uuid {
        Idea::create(&self.db.pool, self.owner, "Test idea")
            .await
            .unwrap()
            .id
    }

    pub async fn seed_phase(&self, idea: Uuid) -> Uuid {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/api/business-plan/{}/timeline", idea),
                Some(json!({
                    "phase_name": "Build",
                    "start_date": "2025-01-01",
                    "end_date": "2025-03-01"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["phase"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Request as the idea owner.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(Some(self.owner), method, uri, body).await
    }

    pub async fn send_as(
        &self,
        user: Option<Uuid>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

// Event ingest HTTP routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use clickstitch_core::{EventKind, SessionStamp, TrackedEvent};

use crate::common::status_for;
use crate::services::{Origin, WriteService};

/// Generic page-interaction event as sent by the collector.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DataEvent {
    /// Token identifying the registered application
    pub application_token: String,
    /// Origin URL the collector runs on
    #[schema(example = "https://shop.example")]
    pub application_url: String,
    /// Client-stable cookie identifier
    #[schema(example = "1f9c2a-visitor")]
    pub cookie_id: String,
    /// Page the event was captured on
    #[schema(example = "/pricing")]
    pub current_url: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    #[schema(example = "en-US")]
    pub language: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    /// Page response time observed by the collector, in milliseconds
    #[serde(default)]
    pub response_time_ms: Option<i64>,
}

/// Button click event as sent by the collector.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ButtonEvent {
    pub application_token: String,
    #[schema(example = "https://shop.example")]
    pub application_url: String,
    #[schema(example = "1f9c2a-visitor")]
    pub cookie_id: String,
    /// Label of the clicked button
    #[schema(example = "checkout")]
    pub button_name: String,
    #[serde(default)]
    pub current_url: Option<String>,
}

impl DataEvent {
    fn into_event(self) -> (Origin, TrackedEvent) {
        let origin = Origin {
            application_token: self.application_token,
            application_url: self.application_url,
        };
        let event = TrackedEvent {
            kind: EventKind::Data,
            cookie_id: self.cookie_id,
            recorded_at: Utc::now(),
            payload: json!({
                "current_url": self.current_url,
                "referrer": self.referrer,
                "language": self.language,
                "os": self.os,
                "response_time_ms": self.response_time_ms,
            }),
        };
        (origin, event)
    }
}

impl ButtonEvent {
    fn into_event(self) -> (Origin, TrackedEvent) {
        let origin = Origin {
            application_token: self.application_token,
            application_url: self.application_url,
        };
        let event = TrackedEvent {
            kind: EventKind::Button,
            cookie_id: self.cookie_id,
            recorded_at: Utc::now(),
            payload: json!({
                "button_name": self.button_name,
                "current_url": self.current_url,
            }),
        };
        (origin, event)
    }
}

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub write_service: Arc<WriteService>,
}

impl AppState {
    pub fn new(write_service: Arc<WriteService>) -> Self {
        Self { write_service }
    }
}

/// Create event ingest routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events/data", post(ingest_data))
        .route("/v1/events/button", post(ingest_button))
        .with_state(state)
}

/// POST /v1/events/data - Ingest a page-interaction event
#[utoipa::path(
    post,
    path = "/v1/events/data",
    request_body = DataEvent,
    responses(
        (status = 202, description = "Event stitched and forwarded", body = SessionStamp),
        (status = 403, description = "Origin validation rejected"),
        (status = 422, description = "Missing cookie id"),
        (status = 502, description = "Downstream forwarder failed"),
        (status = 503, description = "History store unavailable")
    ),
    tag = "events"
)]
pub async fn ingest_data(
    State(state): State<AppState>,
    Json(req): Json<DataEvent>,
) -> Result<(StatusCode, Json<SessionStamp>), StatusCode> {
    if req.cookie_id.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (origin, event) = req.into_event();
    let stamp = state
        .write_service
        .write(&origin, event)
        .await
        .map_err(|e| {
            tracing::error!("failed to handle data event: {}", e);
            status_for(&e)
        })?;

    Ok((StatusCode::ACCEPTED, Json(stamp)))
}

/// POST /v1/events/button - Ingest a button click event
#[utoipa::path(
    post,
    path = "/v1/events/button",
    request_body = ButtonEvent,
    responses(
        (status = 202, description = "Event stitched and forwarded", body = SessionStamp),
        (status = 403, description = "Origin validation rejected"),
        (status = 422, description = "Missing cookie id"),
        (status = 502, description = "Downstream forwarder failed"),
        (status = 503, description = "History store unavailable")
    ),
    tag = "events"
)]
pub async fn ingest_button(
    State(state): State<AppState>,
    Json(req): Json<ButtonEvent>,
) -> Result<(StatusCode, Json<SessionStamp>), StatusCode> {
    if req.cookie_id.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (origin, event) = req.into_event();
    let stamp = state
        .write_service
        .write(&origin, event)
        .await
        .map_err(|e| {
            tracing::error!("failed to handle button event: {}", e);
            status_for(&e)
        })?;

    Ok((StatusCode::ACCEPTED, Json(stamp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    use clickstitch_core::{
        ActivityHistory, ActivityRecord, EnrichedEvent, EventPublisher, OriginValidator, Result,
        SessionResolver, StitchConfig, WriteError,
    };
    use clickstitch_store::InMemoryHistory;

    /// Validator that records whether it was consulted.
    struct SpyValidator {
        accept: bool,
        calls: AtomicUsize,
    }

    impl SpyValidator {
        fn accepting() -> Self {
            Self {
                accept: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                accept: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OriginValidator for SpyValidator {
        async fn validate(&self, _token: &str, _url: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.accept {
                Ok(())
            } else {
                Err(WriteError::rejected("unknown application"))
            }
        }
    }

    /// History wrapper that counts queries.
    struct CountingHistory {
        inner: InMemoryHistory,
        calls: AtomicUsize,
    }

    impl CountingHistory {
        fn empty() -> Self {
            Self {
                inner: InMemoryHistory::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ActivityHistory for CountingHistory {
        async fn latest(
            &self,
            kind: EventKind,
            cookie_id: &str,
            from: chrono::DateTime<Utc>,
            until: chrono::DateTime<Utc>,
        ) -> Result<Option<ActivityRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.latest(kind, cookie_id, from, until).await
        }
    }

    struct BrokenHistory;

    #[async_trait]
    impl ActivityHistory for BrokenHistory {
        async fn latest(
            &self,
            _kind: EventKind,
            _cookie_id: &str,
            _from: chrono::DateTime<Utc>,
            _until: chrono::DateTime<Utc>,
        ) -> Result<Option<ActivityRecord>> {
            Err(WriteError::history("connection refused"))
        }
    }

    /// Publisher that collects what was forwarded.
    #[derive(Default)]
    struct CollectingPublisher {
        published: Mutex<Vec<(String, EnrichedEvent)>>,
    }

    #[async_trait]
    impl EventPublisher for CollectingPublisher {
        async fn publish(&self, topic: &str, event: &EnrichedEvent) -> Result<()> {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), event.clone()));
            Ok(())
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _topic: &str, _event: &EnrichedEvent) -> Result<()> {
            Err(WriteError::publish("bus rejected the event"))
        }
    }

    fn app(
        validator: Arc<dyn OriginValidator>,
        history: Arc<dyn ActivityHistory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Router {
        let resolver = SessionResolver::new(history, StitchConfig::default());
        let write_service = Arc::new(WriteService::new(validator, resolver, publisher));
        routes(AppState::new(write_service))
    }

    fn data_request(cookie_id: &str) -> Request<Body> {
        let body = serde_json::json!({
            "application_token": "tok-1",
            "application_url": "https://shop.example",
            "cookie_id": cookie_id,
            "current_url": "/pricing",
        });
        Request::builder()
            .method("POST")
            .uri("/v1/events/data")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn button_request(cookie_id: &str) -> Request<Body> {
        let body = serde_json::json!({
            "application_token": "tok-1",
            "application_url": "https://shop.example",
            "cookie_id": cookie_id,
            "button_name": "checkout",
        });
        Request::builder()
            .method("POST")
            .uri("/v1/events/button")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn stamp_from(response: axum::response::Response) -> SessionStamp {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_first_event_opens_a_session_and_forwards() {
        let publisher = Arc::new(CollectingPublisher::default());
        let app = app(
            Arc::new(SpyValidator::accepting()),
            Arc::new(CountingHistory::empty()),
            publisher.clone(),
        );

        let response = app.oneshot(data_request("c-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let stamp = stamp_from(response).await;
        assert_eq!(stamp.sequence, 1);

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (topic, event) = &published[0];
        assert_eq!(topic, "data");
        assert_eq!(event.cookie_id, "c-1");
        assert_eq!(event.activity_id, stamp.activity_id);
        assert_eq!(event.payload["current_url"], "/pricing");
    }

    #[tokio::test]
    async fn test_rapid_follow_up_continues_the_session() {
        let history = Arc::new(CountingHistory::empty());
        history.inner.push(
            EventKind::Button,
            "c-1",
            ActivityRecord {
                recorded_at: Utc::now() - chrono::Duration::seconds(2),
                activity_id: "anchor".into(),
                sequence: 3,
            },
        );
        let app = app(
            Arc::new(SpyValidator::accepting()),
            history,
            Arc::new(CollectingPublisher::default()),
        );

        let response = app.oneshot(button_request("c-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let stamp = stamp_from(response).await;
        assert_eq!(stamp.activity_id, "anchor");
        assert_eq!(stamp.sequence, 4);
    }

    #[tokio::test]
    async fn test_data_event_never_continues_a_button_session() {
        let history = Arc::new(CountingHistory::empty());
        history.inner.push(
            EventKind::Button,
            "c-1",
            ActivityRecord {
                recorded_at: Utc::now() - chrono::Duration::seconds(1),
                activity_id: "button-session".into(),
                sequence: 5,
            },
        );
        let app = app(
            Arc::new(SpyValidator::accepting()),
            history,
            Arc::new(CollectingPublisher::default()),
        );

        let response = app.oneshot(data_request("c-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let stamp = stamp_from(response).await;
        assert_ne!(stamp.activity_id, "button-session");
        assert_eq!(stamp.sequence, 1);
    }

    #[tokio::test]
    async fn test_rejected_origin_skips_all_session_work() {
        let validator = Arc::new(SpyValidator::rejecting());
        let history = Arc::new(CountingHistory::empty());
        let publisher = Arc::new(CollectingPublisher::default());
        let app = app(validator.clone(), history.clone(), publisher.clone());

        let response = app.oneshot(data_request("c-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(history.calls.load(Ordering::SeqCst), 0);
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_outage_is_503_and_nothing_is_forwarded() {
        let publisher = Arc::new(CollectingPublisher::default());
        let app = app(
            Arc::new(SpyValidator::accepting()),
            Arc::new(BrokenHistory),
            publisher.clone(),
        );

        let response = app.oneshot(data_request("c-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_is_502() {
        let app = app(
            Arc::new(SpyValidator::accepting()),
            Arc::new(CountingHistory::empty()),
            Arc::new(FailingPublisher),
        );

        let response = app.oneshot(button_request("c-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_blank_cookie_id_is_unprocessable() {
        let validator = Arc::new(SpyValidator::accepting());
        let app = app(
            validator.clone(),
            Arc::new(CountingHistory::empty()),
            Arc::new(CollectingPublisher::default()),
        );

        let response = app.oneshot(data_request("   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }
}

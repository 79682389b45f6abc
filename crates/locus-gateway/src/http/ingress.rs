//! Ingress endpoint — POST /api/input.
//!
//! The single write path into the relay. Any JSON object is accepted and
//! handed to the broadcaster unchanged; the response only confirms that the
//! payload was accepted for relay, not that any subscriber received it.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use locus_core::LocusError;
use locus_protocol::{ack::IngressAck, payload};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::AppState;

/// POST /api/input
///
/// Returns 200 + success ack once the payload is queued for every connected
/// subscriber. Returns 400 for unparseable JSON and 422 for JSON that is not
/// an object; neither reaches the broadcaster.
pub async fn input_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<IngressAck>, (StatusCode, Json<IngressAck>)> {
    let payload = payload::parse_object(&body).map_err(|e| {
        warn!(bytes = body.len(), code = e.code(), error = %e, "rejected ingress payload");
        (rejection_status(&e), Json(IngressAck::error(e.to_string())))
    })?;

    let report = state.broadcaster.broadcast(payload);
    debug!(
        attempted = report.attempted,
        delivered = report.delivered,
        "ingress payload relayed"
    );

    Ok(Json(IngressAck::success()))
}

fn rejection_status(err: &LocusError) -> StatusCode {
    match err {
        LocusError::PayloadNotObject { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_router;
    use crate::ws::registry::{OutboundFrame, SubscriberId};
    use axum::{body::Body, http::Request};
    use locus_core::config::LocusConfig;
    use locus_protocol::frames::EventFrame;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    type Inbox = mpsc::Receiver<Arc<OutboundFrame>>;

    fn state_with(config: LocusConfig, n: usize) -> (Arc<AppState>, Vec<Inbox>) {
        let state = Arc::new(AppState::new(config));
        let receivers = (0..n)
            .map(|_| {
                let (tx, rx) = mpsc::channel(8);
                state.registry.add(SubscriberId::new(), tx).unwrap();
                rx
            })
            .collect();
        (state, receivers)
    }

    async fn post(state: &Arc<AppState>, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/input")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn received(rx: &mut Inbox) -> Vec<EventFrame> {
        let mut frames = Vec::new();
        while let Ok(out) = rx.try_recv() {
            frames.push(serde_json::from_str(&out.text).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn no_subscribers_still_succeeds() {
        let (state, _) = state_with(LocusConfig::default(), 0);
        let (status, body) = post(&state, r#"{"x":1}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn two_subscribers_both_receive_locus_data() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 2);
        let (status, body) = post(&state, r#"{"x":1}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "message": "data relayed"}));
        for rx in &mut receivers {
            let frames = received(rx);
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0].event, "locus_data");
            assert_eq!(frames[0].data, json!({"x": 1}));
        }
    }

    #[tokio::test]
    async fn nested_payload_is_relayed_verbatim() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 1);
        let raw = concat!(
            r#"{"vision":{"label":"cup","conf":0.93,"matrix":[]},"#,
            r#""gru":{"probs":[{"name":"Cleaning","prob":0.81}]}}"#
        );
        post(&state, raw).await;

        let out = receivers[0].try_recv().unwrap();
        assert_eq!(out.text, format!(r#"{{"event":"locus_data","data":{raw}}}"#));
    }

    #[tokio::test]
    async fn key_order_and_wide_integers_reach_subscribers() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 1);
        let raw = r#"{"zeta":1,"alpha":2,"big":123456789012345678901234567890}"#;
        let (status, _) = post(&state, raw).await;
        assert_eq!(status, StatusCode::OK);

        let out = receivers[0].try_recv().unwrap();
        assert_eq!(out.text, format!(r#"{{"event":"locus_data","data":{raw}}}"#));
        let keys: Vec<&str> = out
            .frame
            .data
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "big"]);
    }

    #[tokio::test]
    async fn non_object_body_is_unprocessable() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 2);
        for body in ["[1,2,3]", "\"text\"", "42", "null"] {
            let (status, json) = post(&state, body).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body {body}");
            assert_eq!(json["status"], "error");
        }
        for rx in &mut receivers {
            assert!(received(rx).is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 1);
        let (status, json) = post(&state, "{\"x\": ").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert!(received(&mut receivers[0]).is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = LocusConfig::default();
        config.relay.max_payload_bytes = 16;
        let (state, mut receivers) = state_with(config, 1);
        let (status, _) = post(&state, r#"{"padding":"0123456789abcdef0123456789"}"#).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(received(&mut receivers[0]).is_empty());
    }

    #[tokio::test]
    async fn closed_subscriber_does_not_fail_request() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 3);
        drop(receivers.remove(0));

        let (status, body) = post(&state, r#"{"x":1}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        for rx in &mut receivers {
            assert_eq!(received(rx).len(), 1);
        }
    }

    #[tokio::test]
    async fn quick_successive_posts_are_both_relayed() {
        let (state, mut receivers) = state_with(LocusConfig::default(), 2);
        let (a, b) = tokio::join!(post(&state, r#"{"n":1}"#), post(&state, r#"{"n":2}"#));
        assert_eq!(a.0, StatusCode::OK);
        assert_eq!(b.0, StatusCode::OK);

        for rx in &mut receivers {
            let mut seen: Vec<i64> = received(rx)
                .iter()
                .map(|f| f.data["n"].as_i64().unwrap())
                .collect();
            seen.sort();
            assert_eq!(seen, vec![1, 2]);
        }
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let (state, _) = state_with(LocusConfig::default(), 0);
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/input")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}

//! Remote adapter against a real HTTP server on an ephemeral port.
//!
//! ```bash
//! cargo test --package triagedesk-llm --test test_http_fallback
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use triagedesk_common::{IntakeRequest, Profile, RawVitals, Tier, VerdictSource};
use triagedesk_engine::{evaluate, PreparedIntake};
use triagedesk_llm::{
    HttpClassificationService, LlmClassificationService, OpenAiCompatibleBackend, RemoteClassifier,
    UnknownTierPolicy,
};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn classifier(base_url: &str) -> RemoteClassifier {
    let svc = HttpClassificationService::new(base_url, Duration::from_secs(2)).unwrap();
    RemoteClassifier::new(Arc::new(svc), UnknownTierPolicy::default())
}

fn intake() -> PreparedIntake {
    PreparedIntake::from_request(IntakeRequest {
        complaint: "chest pressure for 20 minutes, cold sweat".to_string(),
        vitals: RawVitals {
            bp: Some("180/110".to_string()),
            spo2: Some("92".to_string()),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_server_error_falls_back_to_rules() {
    let app = Router::new().route("/triage", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let url = serve(app).await;

    let p = intake();
    let c = classifier(&url).classify(&p).await;
    assert_eq!(c.verdict, evaluate(&p.complaint, &p.history, &p.vitals));
    assert_eq!(c.audit.failure.as_deref(), Some("status"));
}

#[tokio::test]
async fn test_malformed_body_falls_back_to_rules() {
    let app = Router::new().route("/triage", post(|| async { "<html>oops</html>" }));
    let url = serve(app).await;

    let p = intake();
    let c = classifier(&url).classify(&p).await;
    assert_eq!(c.verdict, evaluate(&p.complaint, &p.history, &p.vitals));
    assert_eq!(c.audit.failure.as_deref(), Some("malformed"));
}

#[tokio::test]
async fn test_unreachable_service_falls_back_to_rules() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let p = intake();
    let c = classifier(&format!("http://{addr}")).classify(&p).await;
    assert_eq!(c.verdict.tier, Tier::Critical);
    assert_eq!(c.verdict.source, VerdictSource::Rules);
    assert_eq!(c.audit.failure.as_deref(), Some("transport"));
}

#[tokio::test]
async fn test_slow_service_times_out_and_falls_back() {
    let app = Router::new().route(
        "/triage",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    let url = serve(app).await;

    let p = intake();
    let c = classifier(&url).classify(&p).await;
    assert_eq!(c.verdict, evaluate(&p.complaint, &p.history, &p.vitals));
    assert_eq!(c.verdict.source, VerdictSource::Rules);
    assert_eq!(c.audit.failure.as_deref(), Some("transport"));
    assert!(c.audit.latency_ms < 4_000);
}

#[tokio::test]
async fn test_silent_llm_endpoint_times_out_and_falls_back() {
    // accepts connections and never writes a byte
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let backend = OpenAiCompatibleBackend::new(format!("http://{addr}"), "m", None);
    let svc = LlmClassificationService::new(Arc::new(backend), 0.2, 400)
        .with_timeout(Duration::from_secs(1));
    let classifier = RemoteClassifier::new(Arc::new(svc), UnknownTierPolicy::default());

    let p = intake();
    let c = tokio::time::timeout(Duration::from_secs(5), classifier.classify(&p))
        .await
        .expect("classification must not hang");
    assert_eq!(c.verdict, evaluate(&p.complaint, &p.history, &p.vitals));
    assert_eq!(c.audit.failure.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn test_valid_reply_is_used() {
    let app = Router::new().route(
        "/triage",
        post(|Json(body): Json<serde_json::Value>| async move {
            // echo back whether vitals were sent
            let has_vitals = body.get("vitals").is_some();
            Json(serde_json::json!({
                "priority": "срочно",
                "reason": if has_vitals { "with vitals" } else { "no vitals" },
                "profile": "neurology",
                "confidence": 0.6,
                "red_flags": []
            }))
        }),
    );
    let url = serve(app).await;

    let c = classifier(&url).classify(&intake()).await;
    assert_eq!(c.verdict.tier, Tier::Urgent);
    assert_eq!(c.verdict.source, VerdictSource::Remote);
    assert_eq!(c.verdict.reason, "with vitals");
    assert_eq!(c.profile, Profile::Neuro);
    assert!(c.audit.remote);
}

mod common;

use axum::http::StatusCode;
use common::{Behavior, MockBackend, Reply, TokenCheck};
use goal_odds::metrics::{CategoricalKind, Direction, EffectInput};
use goal_odds::prediction::{AuthSession, HttpPredictionClient, PREDICTION_FAILED_ALERT};
use goal_odds::session::{Capabilities, PredictionSession, SessionError};
use serde_json::json;

async fn session_against(
    behavior: Behavior,
    auth: AuthSession,
) -> (PredictionSession<HttpPredictionClient>, MockBackend) {
    let backend = MockBackend::spawn(behavior).await;
    let client = HttpPredictionClient::new(backend.api_config()).expect("client builds");
    let session =
        PredictionSession::new(client, Capabilities::flat(), auth).expect("session builds");
    (session, backend)
}

#[tokio::test]
async fn first_prediction_logs_in_and_sends_the_metric_context() {
    let (mut session, backend) = session_against(
        Behavior {
            token_check: TokenCheck::LatestIssued,
            ..Behavior::default()
        },
        AuthSession::new(true),
    )
    .await;

    session.set_goal("Buy a house");
    session
        .edit_metrics(|input| input.add_metric("monthly_savings", "1500"))
        .expect("metric");
    session
        .edit_metrics(|input| {
            input.add_qualitative(
                "Stable job",
                EffectInput::Directional {
                    direction: Direction::Helps,
                    strength: 0.6,
                },
                0.7,
            )
        })
        .expect("factor");
    session
        .edit_metrics(|input| input.select_categorical(CategoricalKind::RelationshipStatus, "married"))
        .expect("option");

    let result = session.predict().await.expect("prediction succeeds");
    assert_eq!(result.probability_percent(), 68);

    let log = backend.log();
    assert_eq!(log.login_bodies.len(), 1);
    assert_eq!(log.predict_auth, vec![Some("demo-1".to_string())]);
    assert_eq!(
        log.predict_bodies[0]["prediction_data"]["context"],
        json!(
            "monthly_savings: 1500 dollars, stable_job_ratio: 0.80, stable_job_weight: 0.70, relationship_status: married"
        )
    );
}

#[tokio::test]
async fn stale_token_is_refreshed_and_retried_exactly_once() {
    let (mut session, backend) = session_against(
        Behavior {
            token_check: TokenCheck::LatestIssued,
            ..Behavior::default()
        },
        AuthSession::with_token("expired"),
    )
    .await;
    session.set_goal("Run a marathon");

    session.predict().await.expect("retry succeeds");

    let log = backend.log();
    assert_eq!(
        log.predict_auth,
        vec![Some("expired".to_string()), Some("demo-1".to_string())]
    );
    assert_eq!(log.login_bodies.len(), 1);
}

#[tokio::test]
async fn persistent_rejection_does_not_loop() {
    let (mut session, backend) = session_against(
        Behavior {
            token_check: TokenCheck::RejectAll,
            ..Behavior::default()
        },
        AuthSession::new(true),
    )
    .await;
    session.set_goal("Learn to fly");

    let err = session.predict().await.expect_err("always unauthorized");
    assert!(matches!(err, SessionError::Api(_)));
    assert_eq!(err.alert().message, PREDICTION_FAILED_ALERT);
    assert!(!session.is_loading());

    let log = backend.log();
    assert_eq!(log.predict_bodies.len(), 2);
    assert_eq!(log.login_bodies.len(), 2);
}

#[tokio::test]
async fn failed_demo_login_still_submits() {
    let (mut session, backend) = session_against(
        Behavior {
            login: Some(Reply::raw(StatusCode::SERVICE_UNAVAILABLE, "")),
            ..Behavior::default()
        },
        AuthSession::new(true),
    )
    .await;
    session.set_goal("Get a promotion");

    session.predict().await.expect("open backend accepts anonymous calls");
    assert_eq!(backend.log().predict_auth, vec![None]);
}

#[tokio::test]
async fn share_uses_service_text_with_footer() {
    let (mut session, _backend) =
        session_against(Behavior::default(), AuthSession::new(false)).await;
    session.set_goal("Buy a house");
    session.predict().await.expect("prediction succeeds");

    let message = session.share().await.expect("share succeeds");
    assert_eq!(message.title, "My Prediction");
    assert!(message.message.starts_with("68% to buy a house!\n\n"));
}

#[tokio::test]
async fn share_failure_maps_to_generation_alert() {
    let (mut session, _backend) = session_against(
        Behavior {
            share: Reply::raw(StatusCode::BAD_GATEWAY, "upstream"),
            ..Behavior::default()
        },
        AuthSession::new(false),
    )
    .await;
    session.set_goal("Buy a house");
    session.predict().await.expect("prediction succeeds");

    let err = session.share().await.expect_err("share endpoint failed");
    assert_eq!(err.alert().message, "Could not generate shareable content");
}

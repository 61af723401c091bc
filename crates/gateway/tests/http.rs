mod common;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use common::Harness;
use http_body_util::BodyExt;
use migration::{BrokerMigrator, MigratorTrait};
use notification::{Broker, NotificationBridge, QUEUE, SqlBroker};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use gateway::{Orchestrator, SagaPolicy, WELCOME_SUBJECT, router};

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Send a raw JSON body, valid or not.
async fn call_raw(
    app: &Router,
    method: &str,
    uri: &str,
    user: Uuid,
    body: &str,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn uuid_of(value: &Value) -> Uuid {
    Uuid::parse_str(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let h = Harness::new().await;
    let app = router(h.orchestrator(SagaPolicy::FailForward));

    let (status, _) = call(&app, "GET", "/trips", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, "POST", "/trip", None, Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn trip_lifecycle_over_http() {
    let h = Harness::new().await;
    let app = router(h.orchestrator(SagaPolicy::FailForward));

    let (status, user) = call(
        &app,
        "POST",
        "/user/register",
        None,
        Some(json!({"name": "Alice", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let alice = uuid_of(&user["id"]);

    let (status, created) = call(
        &app,
        "POST",
        "/trip",
        Some(alice),
        Some(json!({"name": "Bali Trip", "description": "surf"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let trip_id = uuid_of(&created["trip_id"]);
    assert_eq!(created["whiteboards"].as_array().unwrap().len(), 1);
    let wb_id = uuid_of(&created["whiteboards"][0]);

    let (status, view) = call(&app, "GET", &format!("/trip/{trip_id}"), Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["name"], "Bali Trip");
    assert_eq!(view["whiteboard_details"][0]["day"], 1);
    assert_eq!(
        view["whiteboard_details"][0]["pin_details"]
            .as_array()
            .unwrap()
            .len(),
        1
    );

    let (status, pin) = call(
        &app,
        "POST",
        &format!("/whiteboard/{wb_id}/pin"),
        Some(alice),
        Some(json!({"name": "Uluwatu", "participants": [alice]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pin_id = uuid_of(&pin["pin_id"]);

    let (status, pins) = call(&app, "GET", "/pins/participant", Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uuid_of(&pins[0]["id"]), pin_id);

    let (status, pin) = call(
        &app,
        "PATCH",
        &format!("/pin/{pin_id}"),
        Some(alice),
        Some(json!({"description": "sunset"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pin["description"], "sunset");

    let (status, wb) = call(&app, "GET", &format!("/whiteboard/{wb_id}"), Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wb["pins"].as_array().unwrap().len(), 2);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/whiteboard/{wb_id}/pin/{pin_id}"),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, day_two) = call(
        &app,
        "POST",
        &format!("/trip/{trip_id}/whiteboard"),
        Some(alice),
        Some(json!({"day": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let day_two = uuid_of(&day_two["whiteboard_id"]);
    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/trip/{trip_id}/whiteboard/{day_two}"),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, view) = call(&app, "GET", &format!("/trip/{trip_id}"), Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["whiteboards"], json!([wb_id]));

    let (status, _) = call(&app, "DELETE", &format!("/trip/{trip_id}"), Some(alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) =
        call(&app, "DELETE", &format!("/trip/{trip_id}"), Some(alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("authorize"));
}

#[tokio::test]
async fn members_avatars_and_display_name() {
    let h = Harness::new().await;
    let alice = h.user("Alice").await;
    let bob = h.user("Bob").await;
    let mallory = h.user("Mallory").await;
    let app = router(h.orchestrator(SagaPolicy::FailForward));

    let (_, created) = call(
        &app,
        "POST",
        "/trip",
        Some(alice.id),
        Some(json!({"name": "Bali Trip"})),
    )
    .await;
    let trip_id = uuid_of(&created["trip_id"]);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/trip/{trip_id}/members"),
        Some(alice.id),
        Some(json!({"user_ids": [bob.id]})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/trip/{trip_id}/members"),
        Some(alice.id),
        Some(json!({"user_ids": [bob.id]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/trip/{trip_id}/display_name"),
        Some(bob.id),
        Some(json!({"name": "Bobby"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, avatars) = call(
        &app,
        "POST",
        &format!("/trip/{trip_id}/avatars"),
        Some(alice.id),
        Some(json!({"user_ids": [bob.id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(avatars[0]["name"], "Bobby");

    let (status, _) = call(
        &app,
        "GET",
        &format!("/trip/{trip_id}"),
        Some(mallory.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, trips) = call(&app, "GET", "/trips", Some(bob.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uuid_of(&trips[0]["id"]), trip_id);
}

#[tokio::test]
async fn request_shape_errors() {
    let h = Harness::new().await;
    let alice = h.user("Alice").await;
    let app = router(h.orchestrator(SagaPolicy::FailForward));

    let (status, _) = call(
        &app,
        "POST",
        "/trip",
        Some(alice.id),
        Some(json!({"name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        "PATCH",
        &format!("/pin/{}", Uuid::new_v4()),
        Some(alice.id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no pin fields to update");

    let (status, _) = call(
        &app,
        "GET",
        &format!("/pin/{}", Uuid::new_v4()),
        Some(alice.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn whiteboard_and_pin_reads_are_not_trip_scoped() {
    let h = Harness::new().await;
    let alice = h.user("Alice").await;
    let bob = h.user("Bob").await;
    let orchestrator = h.orchestrator(SagaPolicy::FailForward);
    let created = orchestrator
        .create_trip(alice.id, "Bali Trip", "")
        .await
        .unwrap();
    let app = router(orchestrator);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/trip/{}", created.trip_id),
        Some(bob.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, wb) = call(
        &app,
        "GET",
        &format!("/whiteboard/{}", created.whiteboard_id),
        Some(bob.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uuid_of(&wb["pins"][0]), created.pin_id);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/pin/{}", created.pin_id),
        Some(bob.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_requests_get_a_json_error_body() {
    let h = Harness::new().await;
    let alice = h.user("Alice").await;
    let app = router(h.orchestrator(SagaPolicy::FailForward));

    let (status, body) = call_raw(&app, "POST", "/trip", alice.id, "{\"name\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call_raw(&app, "POST", "/trip", alice.id, "{\"name\": 7}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, "GET", "/trip/not-a-uuid", Some(alice.id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        "DELETE",
        &format!("/whiteboard/{}/pin/nope", Uuid::new_v4()),
        Some(alice.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn registration_publishes_welcome_email_to_the_queue() {
    let h = Harness::new().await;
    let broker_db = Database::connect("sqlite::memory:").await.unwrap();
    BrokerMigrator::up(&broker_db, None).await.unwrap();
    let broker = Arc::new(SqlBroker::new(broker_db));
    let bridge = NotificationBridge::connect(broker.clone()).await.unwrap();
    let app = router(Orchestrator::new(
        h.plan.clone(),
        h.users.clone(),
        Arc::new(bridge),
    ));

    let (status, _) = call(
        &app,
        "POST",
        "/user/register",
        None,
        Some(json!({"name": "Alice", "email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut delivery = None;
    for _ in 0..100 {
        delivery = broker.receive(QUEUE).await.unwrap();
        if delivery.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let delivery = delivery.unwrap();
    let event: Value = serde_json::from_str(&delivery.payload).unwrap();
    assert_eq!(event["to"], "a@example.com");
    assert_eq!(event["subject"], WELCOME_SUBJECT);
}

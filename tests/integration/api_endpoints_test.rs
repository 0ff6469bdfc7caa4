use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{send, week, TestApp};

fn workout_for<'a>(workouts: &'a Value, day: &str) -> &'a Value {
    workouts
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["dayOfWeek"] == day)
        .unwrap()
}

#[tokio::test]
async fn test_generate_and_fetch_week() {
    let app = TestApp::new();
    app.seed_program().await;

    let (status, generated) = app
        .request(
            Method::POST,
            "/api/workouts/generate-week",
            Some(json!({ "weekStartDate": "2026-01-14" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated.as_array().unwrap().len(), 6);

    let (status, fetched) = app
        .request(Method::GET, "/api/workouts/week?weekStartDate=2026-01-11", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.as_array().unwrap().len(), 6);

    let monday = workout_for(&fetched, "Monday");
    assert_eq!(monday["dayType"], "Technique");
    assert_eq!(monday["filter"], "Mixed/Full Body");
    assert_eq!(monday["weekStartDate"], week().to_string());
    assert_eq!(monday["station1"]["phase1"][0]["name"], "Shadowboxing");
    assert_eq!(monday["station3"][2]["name"], "Non-Stop Sparring");
}

#[tokio::test]
async fn test_protected_slot_patch_is_business_rule() {
    let app = TestApp::new();
    app.seed_program().await;

    let (_, saturday) = app
        .request(
            Method::POST,
            "/api/workouts/generate",
            Some(json!({ "dayOfWeek": "Saturday", "weekStartDate": "2026-01-11" })),
        )
        .await;
    let id = saturday["id"].as_str().unwrap();

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/workouts/{id}/regenerate-slot"),
            Some(json!({ "station": 3, "slotIndex": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BUSINESS_RULE");
}

#[tokio::test]
async fn test_patch_without_id_uses_week_and_day() {
    let app = TestApp::new();
    app.seed_program().await;

    let (_, sunday) = app
        .request(
            Method::POST,
            "/api/workouts/generate",
            Some(json!({ "dayOfWeek": "Sunday", "weekStartDate": "2026-01-11" })),
        )
        .await;

    let (status, body) = app
        .request(
            Method::PATCH,
            "/api/workouts/undefined/regenerate-slot",
            Some(json!({
                "station": 2,
                "slotIndex": 0,
                "weekStartDate": "2026-01-11",
                "dayOfWeek": "Sunday"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], sunday["id"]);
    assert_ne!(body["station2"][0]["exerciseId"], sunday["station2"][0]["exerciseId"]);

    let (status, body) = app
        .request(
            Method::PATCH,
            "/api/workouts/undefined/regenerate-slot",
            Some(json!({ "station": 2, "slotIndex": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_patch_exercise_by_name() {
    let app = TestApp::new();
    app.seed_program().await;

    let (_, sunday) = app
        .request(
            Method::POST,
            "/api/workouts/generate",
            Some(json!({ "dayOfWeek": "Sunday", "weekStartDate": "2026-01-11" })),
        )
        .await;
    let id = sunday["id"].as_str().unwrap();

    let (status, updated) = app
        .request(
            Method::PATCH,
            &format!("/api/workouts/{id}/exercise"),
            Some(json!({ "station": 2, "slotIndex": 0, "exerciseName": "Switch Kick Combo" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["station2"][0]["name"], "Switch Kick Combo");
    assert_eq!(updated["station2"][1], sunday["station2"][1]);

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/workouts/{id}/exercise"),
            Some(json!({ "station": 2, "slotIndex": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/workouts/{id}/exercise"),
            Some(json!({ "station": 4, "slotIndex": 0, "exerciseName": "Anything" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_workout_is_not_found_with_hint() {
    let app = TestApp::new();

    let (status, body) = app
        .request(Method::GET, &format!("/api/workouts/{}", Uuid::new_v4()), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("Try refreshing the week."));
}

#[tokio::test]
async fn test_other_users_workout_is_forbidden() {
    let app = TestApp::new();
    app.seed_program().await;
    let (_, sunday) = app
        .request(
            Method::POST,
            "/api/workouts/generate",
            Some(json!({ "dayOfWeek": "Sunday", "weekStartDate": "2026-01-11" })),
        )
        .await;
    let id = sunday["id"].as_str().unwrap();

    let stranger = app.state.jwt.create_token(Uuid::new_v4()).unwrap();
    let (status, body) = send(app.router(), Method::DELETE, &format!("/api/workouts/{id}"), Some(&stranger), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.request(Method::DELETE, &format!("/api/workouts/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_exhausted_pool_error_shape() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/workouts/generate",
            Some(json!({ "dayOfWeek": "Sunday", "weekStartDate": "2026-01-11" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EXHAUSTED_POOL");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/workouts/generate",
            Some(json!({ "dayOfWeek": "Someday", "weekStartDate": "2026-01-11" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_exercise_crud() {
    let app = TestApp::new();

    let (status, created) = app
        .request(
            Method::POST,
            "/api/exercises",
            Some(json!({
                "name": "Sprawl to Jab",
                "station": 2,
                "dayType": "Kickboxing",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["lastUsed"], Value::Null);

    let (status, listed) = app
        .request(Method::GET, "/api/exercises?station=2&dayType=Kickboxing", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/api/exercises/{id}"),
            Some(json!({ "name": "Sprawl to Cross" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Sprawl to Cross");

    let (status, _) = app.request(Method::DELETE, &format!("/api/exercises/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::GET, &format!("/api/exercises/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tri_set_endpoints() {
    let app = TestApp::new();
    let seeded = app.seed_program().await;

    let (status, listed) = app.request(Method::GET, "/api/trisets?focus=Lower", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], seeded.lower_set.id.to_string());

    let ids: Vec<String> = seeded.mixed[0..3].iter().map(|e| e.id.to_string()).collect();
    let (status, created) = app
        .request(
            Method::POST,
            "/api/trisets",
            Some(json!({ "focus": "Mixed", "name": "Entries", "exerciseIds": ids })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["phase2"].as_array().unwrap().len(), 0);

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/trisets/{}", created["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, candidates) = app
        .request(Method::GET, "/api/exercises/station1-for-day?dayOfWeek=Monday", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candidates.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_blocked_day_endpoints() {
    let app = TestApp::new();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/blocked-days",
            Some(json!({ "weekStartDate": "2026-01-11", "dayOfWeek": "Thursday" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, friday) = app
        .request(
            Method::POST,
            "/api/blocked-days",
            Some(json!({ "weekStartDate": "2026-01-11", "dayOfWeek": "Friday" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(friday["code"], "VALIDATION_ERROR");

    let (status, listed) = app
        .request(Method::GET, "/api/blocked-days?weekStartDate=2026-01-11", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["dayOfWeek"], "Thursday");

    let (status, _) = app
        .request(
            Method::DELETE,
            "/api/blocked-days?weekStartDate=2026-01-11&dayOfWeek=Thursday",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

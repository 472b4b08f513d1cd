// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests. Every malformed body is a 400, never a 422.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, request};

async fn assert_bad_request(app: &axum::Router, req: axum::http::Request<axum::body::Body>) {
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_create_project_requires_client_name() {
    let app = common::create_test_app();
    let token = common::sign_in(&app.router, common::CREW_LOGIN).await;

    for body in [
        json!({}),
        json!({ "clientName": "" }),
        json!({ "clientName": 42 }),
        json!({ "clientName": "a".repeat(201) }),
    ] {
        assert_bad_request(
            &app.router,
            request("POST", "/api/projects", Some(&token), Some(body)),
        )
        .await;
    }

    let list = body_json(
        app.router
            .clone()
            .oneshot(request("GET", "/api/projects", Some(&token), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_update_project_rejects_empty_client_name() {
    let app = common::create_test_app();
    let token = common::sign_in(&app.router, common::CREW_LOGIN).await;
    let project = common::create_project(&app.router, &token, "Client").await;
    let id = project["project_id"].as_str().unwrap();

    assert_bad_request(
        &app.router,
        request(
            "PUT",
            &format!("/api/projects/{id}"),
            Some(&token),
            Some(json!({ "clientName": "" })),
        ),
    )
    .await;
}

#[tokio::test]
async fn test_free_text_fields_accept_any_value() {
    let app = common::create_test_app();
    let token = common::sign_in(&app.router, common::CREW_LOGIN).await;
    let phone = "512-555-0123 ext 4455 (ask for the site manager, Tue-Thu)";

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/projects",
            Some(&token),
            Some(json!({ "clientName": "Client", "phoneNumber": phone })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let project = body_json(response).await;
    assert_eq!(project["phoneNumber"], phone);
    let id = project["project_id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/projects/{id}"),
            Some(&token),
            Some(json!({ "status": "", "phoneNumber": format!("{phone} / cell 512-555-0199") })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "");
    assert_eq!(
        updated["phoneNumber"],
        format!("{phone} / cell 512-555-0199")
    );
}

#[tokio::test]
async fn test_bid_update_rejects_bad_fields() {
    let app = common::create_test_app();
    let token = common::sign_in(&app.router, common::CREW_LOGIN).await;
    let project = common::create_project(&app.router, &token, "Client").await;
    let id = project["project_id"].as_str().unwrap();
    let uri = format!("/api/projects/{id}/bids/Solar");

    for body in [
        json!({ "estCost": -1 }),
        json!({ "estCost": "lots" }),
        json!({ "selected": "yes" }),
        json!({ "details": { "nested": { "not": "allowed" } } }),
        json!({ "details": ["not", "a", "map"] }),
    ] {
        assert_bad_request(&app.router, request("PUT", &uri, Some(&token), Some(body))).await;
    }

    // Nothing was applied
    let fetched = body_json(
        app.router
            .clone()
            .oneshot(request("GET", &format!("/api/projects/{id}"), Some(&token), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(fetched["bids"]["Solar"]["estCost"], 0.0);
    assert_eq!(fetched["bids"]["Solar"]["selected"], false);
    assert_eq!(fetched["updated_at"], project["updated_at"]);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = common::create_test_app();
    let token = common::sign_in(&app.router, common::CREW_LOGIN).await;

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/projects")
        .header(axum::http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"clientName\": "))
        .unwrap();

    assert_bad_request(&app.router, req).await;
}

#[tokio::test]
async fn test_auth_runs_before_validation() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(request("POST", "/api/projects", None, Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

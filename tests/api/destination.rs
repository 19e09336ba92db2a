use reqwest::{Method, StatusCode};

use reminders::model::Role;

use crate::helpers::{TestApp, TestUser, FALLBACK_ADDRESS};

#[tokio::test]
async fn unset_destination_resolves_to_the_fallback() {
    let app = TestApp::spawn().await;
    let maria = TestUser::register(&app.context, Role::Normal, false).await;

    let res = app
        .authorized_request(Method::GET, "destination", Some(&maria.credentials()))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let destination: serde_json::Value = res.json().await.unwrap();
    assert!(destination["address"].is_null());
    assert_eq!(FALLBACK_ADDRESS, destination["resolved"]);
}

#[tokio::test]
async fn destination_is_stored_per_user() {
    let app = TestApp::spawn().await;
    let maria = TestUser::register(&app.context, Role::Normal, false).await;

    let res = app
        .authorized_request(Method::PUT, "destination", Some(&maria.credentials()))
        .json(&serde_json::json!({"address": " Maria@Example.com "}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let destination: serde_json::Value = res.json().await.unwrap();
    assert_eq!("maria@example.com", destination["address"]);
    assert_eq!("maria@example.com", destination["resolved"]);

    let stored: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(app.data_file("config.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        "maria@example.com",
        stored[maria.id.to_string()]["email_destino"]
    );
}

#[tokio::test]
async fn invalid_destination_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .authorized_request(Method::PUT, "destination", Some(&app.admin.credentials()))
        .json(&serde_json::json!({"address": "not-an-address"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test]
async fn test_email_goes_to_the_resolved_destination() {
    let app = TestApp::spawn().await;

    let res = app
        .authorized_request(Method::POST, "destination/test", Some(&app.admin.credentials()))
        .json(&serde_json::json!({"subject": "Hello"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let sent = app.mailer.sent();
    assert_eq!(1, sent.len());
    assert_eq!("Hello", sent[0].subject);
    assert_eq!(FALLBACK_ADDRESS, sent[0].recipient.as_ref());
}

#[tokio::test]
async fn failed_test_email_is_a_bad_gateway() {
    let app = TestApp::spawn().await;
    app.mailer.fail_sends();

    let res = app
        .authorized_request(Method::POST, "destination/test", Some(&app.admin.credentials()))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_GATEWAY, res.status());
}

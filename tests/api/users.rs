use reqwest::{Method, StatusCode};

use reminders::model::Role;

use crate::helpers::{Credentials, ReminderBody, TestApp, TestUser};

#[tokio::test]
async fn admin_lists_users_without_hashes() {
    let app = TestApp::spawn().await;
    TestUser::register(&app.context, Role::Normal, false).await;

    let res = app
        .authorized_request(Method::GET, "users", Some(&app.admin.credentials()))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let users: serde_json::Value = res.json().await.unwrap();
    let users = users.as_array().unwrap();
    assert_eq!(2, users.len());
    assert!(users.iter().all(|user| user.get("password_hash").is_none()));
}

#[tokio::test]
async fn normal_users_cannot_manage_users() {
    let app = TestApp::spawn().await;
    let maria = TestUser::register(&app.context, Role::Normal, false).await;

    let res = app
        .authorized_request(Method::GET, "users", Some(&maria.credentials()))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .authorized_request(
            Method::DELETE,
            &format!("users/{}", app.admin.id),
            Some(&maria.credentials()),
        )
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());
}

#[tokio::test]
async fn created_user_must_change_password_before_first_use() {
    let app = TestApp::spawn().await;

    let res = app
        .authorized_request(Method::POST, "users", Some(&app.admin.credentials()))
        .json(&serde_json::json!({
            "username": "joao",
            "password": "temporary-password",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!("normal", created["role"]);
    assert_eq!(true, created["first_login_pending"]);

    let temporary = Credentials {
        username: "joao".into(),
        password: "temporary-password".into(),
    };
    let res = app
        .reminders_list(Some(&temporary))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .authorized_request(Method::PUT, "users/me/password", Some(&temporary))
        .json(&serde_json::json!({"new_password": "my-own-password"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NO_CONTENT, res.status());

    let res = app
        .reminders_list(Some(&temporary))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let updated = Credentials {
        username: "joao".into(),
        password: "my-own-password".into(),
    };
    let res = app
        .reminders_list(Some(&updated))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let app = TestApp::spawn().await;

    let res = app
        .authorized_request(Method::POST, "users", Some(&app.admin.credentials()))
        .json(&serde_json::json!({
            "username": app.admin.username,
            "password": "temporary-password",
            "role": "admin",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, res.status());
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .authorized_request(Method::POST, "users", Some(&app.admin.credentials()))
        .json(&serde_json::json!({"username": "joao", "password": "short"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test]
async fn deleting_a_user_removes_their_reminders_and_destination() {
    let app = TestApp::spawn().await;
    let maria = TestUser::register(&app.context, Role::Normal, false).await;
    app.create_reminder(&maria.credentials(), &ReminderBody::new("Maria's", "2024-01-01 10:00"))
        .await;
    app.create_reminder(&app.admin.credentials(), &ReminderBody::new("Admin's", "2024-01-01 10:00"))
        .await;
    app.authorized_request(Method::PUT, "destination", Some(&maria.credentials()))
        .json(&serde_json::json!({"address": "maria@example.com"}))
        .send()
        .await
        .expect("Failed to execute request");

    let res = app
        .authorized_request(
            Method::DELETE,
            &format!("users/{}", maria.id),
            Some(&app.admin.credentials()),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let stored = app.stored_reminders();
    assert_eq!(1, stored.as_array().unwrap().len());
    assert_eq!("Admin's", stored[0]["title"]);
    assert!(app.context.users.fetch_by_id(maria.id).await.is_none());
    assert_eq!(None, app.context.destinations.fetch().await.address_for(maria.id));

    let res = app
        .reminders_list(Some(&maria.credentials()))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let app = TestApp::spawn().await;

    let res = app
        .authorized_request(
            Method::DELETE,
            &format!("users/{}", app.admin.id),
            Some(&app.admin.credentials()),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::FORBIDDEN, res.status());
    assert!(app.context.users.fetch_by_id(app.admin.id).await.is_some());
}

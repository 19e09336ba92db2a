use reqwest::StatusCode;

use reminders::model::Role;

use crate::helpers::{ReminderBody, TestApp, TestUser};

#[tokio::test]
async fn requests_without_credentials_are_unauthorized() {
    let app = TestApp::spawn().await;

    let res = app.reminders_list(None).await.expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
    assert_eq!(
        r#"Basic realm="reminders""#,
        res.headers()["WWW-Authenticate"]
    );
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    let mut credentials = app.admin.credentials();
    credentials.password = "definitely-wrong".into();

    let res = app
        .reminders_list(Some(&credentials))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
}

#[tokio::test]
async fn created_reminders_are_stored_unsent() {
    let app = TestApp::spawn().await;
    let credentials = app.admin.credentials();

    let id = app
        .create_reminder(&credentials, &ReminderBody::new("Pay rent", "2024-01-01 10:00"))
        .await;

    let stored = app.stored_reminders();
    let stored = &stored[0];
    assert_eq!(id, stored["id"]);
    assert_eq!(app.admin.id.to_string(), stored["owner"]);
    assert_eq!("Pay rent", stored["title"]);
    assert_eq!("2024-01-01 10:00", stored["scheduled_at"]);
    assert_eq!(false, stored["sent"]);
}

#[tokio::test]
async fn invalid_reminders_are_rejected() {
    let app = TestApp::spawn().await;
    let credentials = app.admin.credentials();

    let test_cases = vec![
        ReminderBody::new("", "2024-01-01 10:00"),
        ReminderBody::new("No time", "2024-01-01"),
        ReminderBody::new("Bad date", "2024-13-01 10:00"),
        ReminderBody {
            title: None,
            description: None,
            scheduled_at: Some("2024-01-01 10:00".into()),
        },
    ];

    for body in test_cases {
        let res = app
            .reminder_create(Some(&credentials), &body)
            .await
            .expect("Failed to execute request");

        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "accepted {:?}", body);
    }
    assert_eq!(serde_json::json!([]), app.stored_reminders());
}

#[tokio::test]
async fn list_shows_status_and_hides_other_users_reminders() {
    let app = TestApp::spawn().await;
    let maria = TestUser::register(&app.context, Role::Normal, false).await;

    app.create_reminder(&app.admin.credentials(), &ReminderBody::new("Admin's", "2024-01-01 08:00"))
        .await;
    app.create_reminder(&maria.credentials(), &ReminderBody::new("Later", "2024-01-02 08:00"))
        .await;
    app.create_reminder(&maria.credentials(), &ReminderBody::new("Now", "2024-01-01 09:00"))
        .await;

    let res = app
        .reminders_list(Some(&maria.credentials()))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let listed: serde_json::Value = res.json().await.unwrap();
    let listed = listed.as_array().unwrap();

    assert_eq!(2, listed.len());
    assert_eq!("Now", listed[0]["title"]);
    assert_eq!("due", listed[0]["status"]);
    assert_eq!("Later", listed[1]["title"]);
    assert_eq!("upcoming", listed[1]["status"]);

    let res = app
        .reminders_list(Some(&app.admin.credentials()))
        .await
        .expect("Failed to execute request");
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(3, listed.as_array().unwrap().len());
}

#[tokio::test]
async fn editing_rearms_a_sent_reminder() {
    let app = TestApp::spawn().await;
    let credentials = app.admin.credentials();
    let id = app
        .create_reminder(&credentials, &ReminderBody::new("Pay rent", "2024-01-01 09:00"))
        .await;
    app.reminders_check(Some(&credentials))
        .await
        .expect("Failed to execute request");
    assert_eq!(true, app.stored_reminders()[0]["sent"]);

    let res = app
        .reminder_update(
            Some(&credentials),
            &id,
            &ReminderBody::new("Pay rent", "2023-12-31 09:00"),
        )
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(id, updated["id"]);
    assert_eq!(false, updated["sent"]);
    assert_eq!("due", updated["status"]);
    assert_eq!(false, app.stored_reminders()[0]["sent"]);
}

#[tokio::test]
async fn other_users_cannot_touch_a_reminder() {
    let app = TestApp::spawn().await;
    let owner = TestUser::register(&app.context, Role::Normal, false).await;
    let intruder = TestUser::register(&app.context, Role::Normal, false).await;
    let id = app
        .create_reminder(&owner.credentials(), &ReminderBody::new("Mine", "2024-01-01 10:00"))
        .await;

    let res = app
        .reminder_update(
            Some(&intruder.credentials()),
            &id,
            &ReminderBody::new("Taken", "2024-01-01 10:00"),
        )
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    let res = app
        .reminder_delete(Some(&intruder.credentials()), &id)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    assert_eq!("Mine", app.stored_reminders()[0]["title"]);
}

#[tokio::test]
async fn owner_and_admin_can_delete() {
    let app = TestApp::spawn().await;
    let owner = TestUser::register(&app.context, Role::Normal, false).await;
    let first = app
        .create_reminder(&owner.credentials(), &ReminderBody::new("First", "2024-01-01 10:00"))
        .await;
    let second = app
        .create_reminder(&owner.credentials(), &ReminderBody::new("Second", "2024-01-01 10:00"))
        .await;

    let res = app
        .reminder_delete(Some(&owner.credentials()), &first)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NO_CONTENT, res.status());

    let res = app
        .reminder_delete(Some(&app.admin.credentials()), &second)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NO_CONTENT, res.status());

    assert_eq!(serde_json::json!([]), app.stored_reminders());
}

#[tokio::test]
async fn pending_first_login_must_change_password_first() {
    let app = TestApp::spawn().await;
    let pending = TestUser::register(&app.context, Role::Normal, true).await;

    let res = app
        .reminders_list(Some(&pending.credentials()))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::FORBIDDEN, res.status());
}

mod common;

use chrono::Duration;
use common::TestApp;
use helpdesk_service::domain::session::errors::SessionError;
use helpdesk_service::domain::session::models::RefreshStatus;
use helpdesk_service::domain::session::models::SessionRecord;
use helpdesk_service::domain::session::ports::SessionStore;
use helpdesk_service::domain::user::models::Role;
use helpdesk_service::domain::user::models::UserId;
use helpdesk_service::outbound::repositories::PostgresSessionStore;

/// Session row for `user_id` made of freshly issued tokens
fn issue_session(app: &TestApp, user_id: UserId) -> SessionRecord {
    let access = app
        .codec
        .issue_access(user_id.0, "Staff", true)
        .expect("Failed to issue access token");
    let refresh = app
        .codec
        .issue_refresh(user_id.0)
        .expect("Failed to issue refresh token");

    SessionRecord::new(user_id, &access, &refresh)
}

async fn setup() -> (TestApp, PostgresSessionStore, UserId) {
    let app = TestApp::spawn().await;
    let user = app
        .create_user("agent@example.com", Role::Staff, "IT", true)
        .await;
    let store = PostgresSessionStore::new(app.db.pool.clone(), app.clock.clone());

    (app, store, user.id)
}

#[tokio::test]
async fn test_refresh_update_after_new_login_is_rejected() {
    let (app, store, user_id) = setup().await;

    let old_device = issue_session(&app, user_id);
    store.save(&old_device).await.expect("Failed to save session");

    let status = store
        .is_refresh_valid(&user_id, &old_device.refresh_token)
        .await
        .expect("Failed to check refresh token");
    assert!(status.is_valid());

    // Another device logs in between the refresh check and the write.
    let new_device = issue_session(&app, user_id);
    store.save(&new_device).await.expect("Failed to save session");

    let late_access = app
        .codec
        .issue_access(user_id.0, "Staff", true)
        .expect("Failed to issue access token");
    let result = store
        .update_access_only(
            &user_id,
            &old_device.refresh_token,
            &late_access.token,
            late_access.expires_at,
        )
        .await;

    assert_eq!(result, Err(SessionError::SessionMismatch));
    assert!(!store
        .is_access_valid(&user_id, &late_access.token)
        .await
        .unwrap());
    assert!(store
        .is_access_valid(&user_id, &new_device.access_token)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_rotation_after_new_login_is_rejected() {
    let (app, store, user_id) = setup().await;

    let old_device = issue_session(&app, user_id);
    store.save(&old_device).await.expect("Failed to save session");

    let new_device = issue_session(&app, user_id);
    store.save(&new_device).await.expect("Failed to save session");

    let rotated = issue_session(&app, user_id);
    let result = store.rotate(&old_device.refresh_token, &rotated).await;

    assert_eq!(result, Err(SessionError::SessionMismatch));
    assert!(matches!(
        store
            .is_refresh_valid(&user_id, &new_device.refresh_token)
            .await
            .unwrap(),
        RefreshStatus::Valid { .. }
    ));
}

#[tokio::test]
async fn test_rotation_replaces_both_tokens() {
    let (app, store, user_id) = setup().await;

    let current = issue_session(&app, user_id);
    store.save(&current).await.expect("Failed to save session");

    app.clock.advance(Duration::days(6));
    let rotated = issue_session(&app, user_id);
    store
        .rotate(&current.refresh_token, &rotated)
        .await
        .expect("Failed to rotate session");

    assert!(matches!(
        store
            .is_refresh_valid(&user_id, &current.refresh_token)
            .await
            .unwrap(),
        RefreshStatus::Mismatch { .. }
    ));
    assert_eq!(
        store
            .is_refresh_valid(&user_id, &rotated.refresh_token)
            .await
            .unwrap(),
        RefreshStatus::Valid {
            expires_at: rotated.refresh_expires_at
        }
    );
    assert!(store
        .is_access_valid(&user_id, &rotated.access_token)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_after_logout_is_rejected() {
    let (app, store, user_id) = setup().await;

    let current = issue_session(&app, user_id);
    store.save(&current).await.expect("Failed to save session");
    store.delete(&user_id).await.expect("Failed to delete session");

    let result = store
        .update_access_only(
            &user_id,
            &current.refresh_token,
            &current.access_token,
            current.access_expires_at,
        )
        .await;

    assert_eq!(result, Err(SessionError::SessionMismatch));
    assert_eq!(
        store
            .is_refresh_valid(&user_id, &current.refresh_token)
            .await
            .unwrap(),
        RefreshStatus::NotFound
    );
}

#[tokio::test]
async fn test_delete_if_current_only_matches_live_tokens() {
    let (app, store, user_id) = setup().await;

    let old_device = issue_session(&app, user_id);
    store.save(&old_device).await.expect("Failed to save session");
    let new_device = issue_session(&app, user_id);
    store.save(&new_device).await.expect("Failed to save session");

    assert!(!store
        .delete_if_current(&user_id, &old_device.access_token)
        .await
        .unwrap());
    assert!(store
        .delete_if_current(&user_id, &new_device.refresh_token)
        .await
        .unwrap());
    assert!(!store
        .delete_if_current(&user_id, &new_device.refresh_token)
        .await
        .unwrap());
}

use std::sync::Arc;

use axum::{
    routing::{post, put},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/admin/roles", post(handlers::assign_role))
        .route("/api/users/me/push-token", put(handlers::register_push_token))
        .route("/api/users/me/availability", put(handlers::set_availability))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{fixed_now, with_caller, FakeUserDirectory, FixedClock};

    fn server(directory: Arc<FakeUserDirectory>, caller: Option<&str>) -> TestServer {
        let service = Arc::new(UserService::new(directory, Arc::new(FixedClock(fixed_now()))));
        let router = match caller {
            Some(uid) => with_caller(routes(service), uid),
            None => routes(service),
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_assign_role_returns_status_body() {
        let directory = Arc::new(FakeUserDirectory::default());
        directory.add_user("admin-1", UserRole::Admin, false, None);
        let server = server(directory.clone(), Some("admin-1"));

        let response = server
            .post("/api/admin/roles")
            .json(&json!({ "target_uid": "citizen-7", "role": "worker" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "status": "success",
            "message": "Role successfully set to worker."
        }));
        assert_eq!(directory.profile("citizen-7").unwrap().role, UserRole::Worker);
    }

    #[tokio::test]
    async fn test_assign_role_error_kinds() {
        let directory = Arc::new(FakeUserDirectory::default());
        directory.add_user("admin-1", UserRole::Admin, false, None);
        directory.add_user("worker-1", UserRole::Worker, true, None);

        let anonymous = server(directory.clone(), None)
            .post("/api/admin/roles")
            .json(&json!({ "target_uid": "worker-1", "role": "admin" }))
            .await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(anonymous.json::<serde_json::Value>()["code"], "unauthenticated");

        let missing_role = server(directory.clone(), Some("admin-1"))
            .post("/api/admin/roles")
            .json(&json!({ "target_uid": "worker-1" }))
            .await;
        missing_role.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            missing_role.json::<serde_json::Value>()["message"],
            "Missing required field: role"
        );

        let not_admin = server(directory.clone(), Some("worker-1"))
            .post("/api/admin/roles")
            .json(&json!({ "target_uid": "worker-1", "role": "admin" }))
            .await;
        not_admin.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(not_admin.json::<serde_json::Value>()["code"], "permission-denied");
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_rejected_before_body_checks() {
        let directory = Arc::new(FakeUserDirectory::default());
        let server = server(directory.clone(), None);

        let role = server
            .post("/api/admin/roles")
            .json(&json!({ "target_uid": 42 }))
            .await;
        role.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(role.json::<serde_json::Value>()["code"], "unauthenticated");

        server
            .put("/api/users/me/push-token")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .put("/api/users/me/availability")
            .json(&json!({ "is_available": "yes" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_push_token() {
        let directory = Arc::new(FakeUserDirectory::default());
        let server = server(directory.clone(), Some("citizen-1"));

        server
            .put("/api/users/me/push-token")
            .json(&json!({ "fcm_token": "device-abc" }))
            .await
            .assert_status_ok();

        assert_eq!(
            directory.profile("citizen-1").unwrap().fcm_token.as_deref(),
            Some("device-abc")
        );
    }
}

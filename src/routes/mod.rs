use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod setup;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/pending", get(pending_page))
        .route("/unauthorized", get(unauthorized_page))
        .nest("/auth", auth::router(state.clone()))
        .nest("/setup", setup::router())
        .nest("/api", api::router())
        .nest("/profile", profile::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub msg: String,
}

// Landing targets for the guard's redirects; the views themselves are
// rendered client-side.

pub async fn login_page() -> Json<PageInfo> {
    Json(PageInfo {
        msg: "Sign in via POST /auth/signin".to_string(),
    })
}

pub async fn register_page() -> Json<PageInfo> {
    Json(PageInfo {
        msg: "Register via POST /auth/register; teachers are added by an admin".to_string(),
    })
}

pub async fn pending_page() -> Json<PageInfo> {
    Json(PageInfo {
        msg: "Your account is awaiting admin approval".to_string(),
    })
}

pub async fn unauthorized_page() -> Json<PageInfo> {
    Json(PageInfo {
        msg: "You do not have access to this page".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::state;

    async fn test_app() -> Router {
        app_router(state::memory_state().await)
    }

    fn json_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, location, body)
    }

    async fn setup_admin(app: &Router) -> String {
        let (status, _, body) = call(
            app,
            json_request(
                "POST",
                "/setup",
                None,
                Some(json!({
                    "email": "admin@x.com",
                    "password": "secret1",
                    "name": "Head Admin"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["uid"].as_str().unwrap().to_string()
    }

    async fn sign_in(app: &Router, email: &str, password: &str) -> Value {
        let (status, _, body) = call(
            app,
            json_request(
                "POST",
                "/auth/signin",
                None,
                Some(json!({ "email": email, "password": password })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "sign in failed: {body}");
        body
    }

    fn token_of(session: &Value) -> String {
        session["token"].as_str().unwrap().to_string()
    }

    async fn register_student(app: &Router, email: &str, name: &str) -> String {
        let (status, _, body) = call(
            app,
            json_request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "secret1",
                    "name": name,
                    "role": "student"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["uid"].as_str().unwrap().to_string()
    }

    async fn create_teacher(app: &Router, admin_token: &str, email: &str, name: &str) -> String {
        let (status, _, body) = call(
            app,
            json_request(
                "POST",
                "/dashboard/admin/teachers",
                Some(admin_token),
                Some(json!({
                    "name": name,
                    "email": email,
                    "subject": "Math",
                    "department": "Science",
                    "password": "secret1",
                    "role": "teacher"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "teacher creation failed: {body}");
        body["uid"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn public_pages_answer_without_a_session() {
        let app = test_app().await;
        for path in ["/login", "/register", "/pending", "/unauthorized"] {
            let (status, _, _) = call(&app, json_request("GET", path, None, None)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, _, status_body) = call(&app, json_request("GET", "/setup", None, None)).await;
        assert_eq!(status_body["setup_complete"], json!(false));
    }

    #[tokio::test]
    async fn role_endpoint_validates_and_resolves() {
        let app = test_app().await;

        let (status, _, _) = call(&app, json_request("GET", "/api/role", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) =
            call(&app, json_request("GET", "/api/role?uid=ghost", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uid = register_student(&app, "alice@x.com", "Alice").await;
        let (status, _, body) = call(
            &app,
            json_request("GET", &format!("/api/role?uid={uid}"), None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], json!("student"));
        assert_eq!(body["approved"], json!(false));
        assert_eq!(body["name"], json!("Alice"));
    }

    #[tokio::test]
    async fn student_registration_and_approval_flow() {
        let app = test_app().await;
        setup_admin(&app).await;

        // a second bootstrap attempt is refused
        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/setup",
                None,
                Some(json!({
                    "email": "intruder@x.com",
                    "password": "secret1",
                    "name": "Intruder"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // teachers cannot self-register
        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": "sneaky@x.com",
                    "password": "secret1",
                    "name": "Sneaky",
                    "role": "teacher"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let alice_uid = register_student(&app, "alice@x.com", "Alice").await;

        // login works before approval, but every view redirects to /pending
        let session = sign_in(&app, "alice@x.com", "secret1").await;
        assert_eq!(session["approved"], json!(false));
        let alice_token = token_of(&session);

        let (status, location, _) = call(
            &app,
            json_request("GET", "/dashboard/student", Some(&alice_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/pending"));

        let (_, location, _) = call(
            &app,
            json_request("GET", "/dashboard", Some(&alice_token), None),
        )
        .await;
        assert_eq!(location.as_deref(), Some("/pending"));

        // without any session the guard redirects to /login instead
        let (status, location, _) =
            call(&app, json_request("GET", "/dashboard/student", None, None)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/login"));

        // the admin sees and approves the pending registration
        let admin_token = token_of(&sign_in(&app, "admin@x.com", "secret1").await);
        let (status, _, overview) = call(
            &app,
            json_request("GET", "/dashboard/admin", Some(&admin_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["pending_students"][0]["uid"], json!(alice_uid));

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                &format!("/dashboard/admin/students/{alice_uid}/approve"),
                Some(&admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // the same token now reaches the dashboard
        let (status, _, _) = call(
            &app,
            json_request("GET", "/dashboard/student", Some(&alice_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, location, _) = call(
            &app,
            json_request("GET", "/dashboard", Some(&alice_token), None),
        )
        .await;
        assert_eq!(location.as_deref(), Some("/dashboard/student"));
    }

    #[tokio::test]
    async fn admin_provisions_staff_without_losing_their_session() {
        let app = test_app().await;
        let admin_uid = setup_admin(&app).await;
        let admin_token = token_of(&sign_in(&app, "admin@x.com", "secret1").await);

        let bob_uid = create_teacher(&app, &admin_token, "bob@x.com", "Bob").await;

        // the users record carries the teacher role, approved
        let (_, _, role) = call(
            &app,
            json_request("GET", &format!("/api/role?uid={bob_uid}"), None, None),
        )
        .await;
        assert_eq!(role["role"], json!("teacher"));
        assert_eq!(role["approved"], json!(true));

        // the teachers roster has exactly the profile fields
        let (_, _, overview) = call(
            &app,
            json_request("GET", "/dashboard/admin", Some(&admin_token), None),
        )
        .await;
        let teacher = &overview["teachers"][0];
        assert_eq!(teacher["uid"], json!(bob_uid));
        assert_eq!(teacher["subject"], json!("Math"));
        assert_eq!(teacher["department"], json!("Science"));
        assert_eq!(teacher["created_by"], json!(admin_uid));

        // the admin's own session is untouched: same token, same identity
        let (status, _, profile) = call(
            &app,
            json_request("GET", "/profile", Some(&admin_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["uid"], json!(admin_uid));
        assert_eq!(profile["role"], json!("admin"));

        // duplicate email aborts with a conflict
        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/dashboard/admin/teachers",
                Some(&admin_token),
                Some(json!({
                    "name": "Bob Again",
                    "email": "bob@x.com",
                    "subject": "Math",
                    "department": "Science",
                    "password": "secret1",
                    "role": "teacher"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // the new teacher lands on their own dashboard
        let bob_token = token_of(&sign_in(&app, "bob@x.com", "secret1").await);
        let (_, location, _) =
            call(&app, json_request("GET", "/dashboard", Some(&bob_token), None)).await;
        assert_eq!(location.as_deref(), Some("/dashboard/teacher"));

        // teachers are kept out of admin views
        let (_, location, _) = call(
            &app,
            json_request("GET", "/dashboard/admin", Some(&bob_token), None),
        )
        .await;
        assert_eq!(location.as_deref(), Some("/unauthorized"));

        // password suggestions have the expected shape
        let (_, _, suggestion) = call(
            &app,
            json_request(
                "GET",
                "/dashboard/admin/password-suggestion",
                Some(&admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(suggestion["password"].as_str().unwrap().len(), 10);

        // deleting the teacher removes both records; the orphaned token then
        // fails role resolution and is bounced to /login
        let (status, _, _) = call(
            &app,
            json_request(
                "DELETE",
                &format!("/dashboard/admin/teachers/{bob_uid}"),
                Some(&admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = call(
            &app,
            json_request("GET", &format!("/api/role?uid={bob_uid}"), None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, location, _) = call(
            &app,
            json_request("GET", "/dashboard/teacher", Some(&bob_token), None),
        )
        .await;
        assert_eq!(location.as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn booking_and_decision_flow() {
        let app = test_app().await;
        setup_admin(&app).await;
        let admin_token = token_of(&sign_in(&app, "admin@x.com", "secret1").await);
        let bob_uid = create_teacher(&app, &admin_token, "bob@x.com", "Bob").await;

        let alice_uid = register_student(&app, "alice@x.com", "Alice").await;
        call(
            &app,
            json_request(
                "POST",
                &format!("/dashboard/admin/students/{alice_uid}/approve"),
                Some(&admin_token),
                None,
            ),
        )
        .await;
        let alice_token = token_of(&sign_in(&app, "alice@x.com", "secret1").await);

        // roster is visible, incomplete bookings are rejected
        let (_, _, overview) = call(
            &app,
            json_request("GET", "/dashboard/student", Some(&alice_token), None),
        )
        .await;
        assert_eq!(overview["teachers"][0]["uid"], json!(bob_uid));

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/dashboard/student/appointments",
                Some(&alice_token),
                Some(json!({
                    "teacher_id": bob_uid,
                    "purpose": "",
                    "date": "2026-03-01",
                    "time": "14:30"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // booking with a note creates the appointment and one message
        let (status, _, appointment) = call(
            &app,
            json_request(
                "POST",
                "/dashboard/student/appointments",
                Some(&alice_token),
                Some(json!({
                    "teacher_id": bob_uid,
                    "purpose": "Help",
                    "date": "2026-03-01",
                    "time": "14:30",
                    "message": "Looking forward to it"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(appointment["status"], json!("pending"));
        assert_eq!(appointment["datetime"], json!("2026-03-01T14:30:00.000Z"));
        let appointment_id = appointment["appointment_id"].as_str().unwrap().to_string();

        let bob_token = token_of(&sign_in(&app, "bob@x.com", "secret1").await);
        let (_, _, teacher_view) = call(
            &app,
            json_request("GET", "/dashboard/teacher", Some(&bob_token), None),
        )
        .await;
        assert_eq!(teacher_view["stats"]["pending"], json!(1));
        assert_eq!(teacher_view["stats"]["total"], json!(1));
        assert_eq!(
            teacher_view["messages"][0]["appointment_id"],
            json!(appointment_id)
        );
        assert_eq!(teacher_view["students"][&alice_uid]["name"], json!("Alice"));

        // students cannot reach the teacher dashboard
        let (_, location, _) = call(
            &app,
            json_request("GET", "/dashboard/teacher", Some(&alice_token), None),
        )
        .await;
        assert_eq!(location.as_deref(), Some("/unauthorized"));

        // the owning teacher cancels; the state is terminal afterwards
        let (status, _, updated) = call(
            &app,
            json_request(
                "POST",
                &format!("/dashboard/teacher/appointments/{appointment_id}/decision"),
                Some(&bob_token),
                Some(json!({ "decision": "cancelled" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], json!("cancelled"));

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                &format!("/dashboard/teacher/appointments/{appointment_id}/decision"),
                Some(&bob_token),
                Some(json!({ "decision": "approved" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, _, overview) = call(
            &app,
            json_request("GET", "/dashboard/student", Some(&alice_token), None),
        )
        .await;
        assert_eq!(overview["appointments"][0]["status"], json!("cancelled"));
        assert_eq!(overview["stats"]["cancelled"], json!(1));
    }

    #[tokio::test]
    async fn password_change_requires_the_current_password() {
        let app = test_app().await;
        setup_admin(&app).await;
        let admin_token = token_of(&sign_in(&app, "admin@x.com", "secret1").await);

        // no token → 401, not a redirect
        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/profile/password",
                None,
                Some(json!({ "current_password": "secret1", "new_password": "fresh-secret" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/profile/password",
                Some(&admin_token),
                Some(json!({ "current_password": "wrong", "new_password": "fresh-secret" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/profile/password",
                Some(&admin_token),
                Some(json!({ "current_password": "secret1", "new_password": "tiny" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/profile/password",
                Some(&admin_token),
                Some(json!({ "current_password": "secret1", "new_password": "fresh-secret" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // old password is gone, the new one works, the token stays valid
        let (status, _, _) = call(
            &app,
            json_request(
                "POST",
                "/auth/signin",
                None,
                Some(json!({ "email": "admin@x.com", "password": "secret1" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        sign_in(&app, "admin@x.com", "fresh-secret").await;

        let (status, _, _) = call(
            &app,
            json_request("POST", "/auth/signout", Some(&admin_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

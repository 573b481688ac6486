// Integration tests for login, logout, and the resource surface,
// including the multipart gallery upload and the combined dashboard
// fetch.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use bayan_admin::models::GalleryUpload;
use bayan_admin::{ApiClient, ApiError, SessionStore};

const ADMIN_EMAIL: &str = "admin@bayan.example";
const ADMIN_PASSWORD: &str = "correct-horse";

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Clone, Default)]
struct Backend {
    seen: Arc<Mutex<Vec<Seen>>>,
    /// Scripted statuses for the login route; empty means behave normally
    login_script: Arc<Mutex<VecDeque<u16>>>,
}

impl Backend {
    fn requests_to(&self, path: &str) -> Vec<Seen> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

async fn record(backend: &Backend, request: Request) -> Seen {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = to_bytes(request.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec();

    let seen = Seen {
        method,
        path,
        authorization,
        content_type,
        body,
    };
    backend.seen.lock().unwrap().push(seen.clone());
    seen
}

async fn csrf_cookie(State(backend): State<Backend>, request: Request) -> Response {
    record(&backend, request).await;
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, "XSRF-TOKEN=fresh; Path=/")],
    )
        .into_response()
}

async fn login(State(backend): State<Backend>, request: Request) -> Response {
    let seen = record(&backend, request).await;

    if let Some(status) = backend.login_script.lock().unwrap().pop_front() {
        return (
            StatusCode::from_u16(status).expect("scripted status"),
            Json(json!({ "message": "scripted" })),
        )
            .into_response();
    }

    let credentials: Value = serde_json::from_slice(&seen.body).unwrap_or_default();
    let email = credentials["email"].as_str().unwrap_or_default();
    let password = credentials["password"].as_str().unwrap_or_default();

    if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
        (StatusCode::OK, Json(json!({ "token": "tok-123" }))).into_response()
    } else if password == "no-token" {
        // Backend bug being defended against: 200 without a token
        (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

fn sample_blog() -> Value {
    json!({
        "id": 1,
        "title_en": "Launch",
        "title_ar": "الإطلاق",
        "body_en": "We are live.",
        "body_ar": "نحن على الهواء."
    })
}

fn sample_project() -> Value {
    json!({
        "id": 2,
        "name_en": "Marina Tower",
        "name_ar": "برج المارينا",
        "description_en": "Forty floors.",
        "description_ar": "أربعون طابقا.",
        "year": 2023
    })
}

fn sample_member() -> Value {
    json!({
        "id": 3,
        "name_en": "Huda",
        "name_ar": "هدى",
        "role_en": "Site Engineer",
        "role_ar": "مهندسة موقع"
    })
}

fn sample_certificate() -> Value {
    json!({
        "id": 4,
        "title_en": "ISO 9001",
        "title_ar": "آيزو 9001",
        "issued_at": "2023-05-01"
    })
}

fn sample_csr() -> Value {
    json!({
        "id": 5,
        "title_en": "Beach Cleanup",
        "title_ar": "تنظيف الشاطئ",
        "description_en": "Volunteer day.",
        "description_ar": "يوم تطوعي."
    })
}

fn sample_image() -> Value {
    json!({ "id": 6, "url": "/storage/gallery/6.jpg", "title_en": "Site A" })
}

async fn start_backend(backend: Backend) -> SocketAddr {
    async fn with_recording(
        backend: Backend,
        request: Request,
        response: Response,
    ) -> Response {
        record(&backend, request).await;
        response
    }

    let app = Router::new()
        .route("/sanctum/csrf-cookie", get(csrf_cookie))
        .route("/api/admin/login", post(login))
        .route(
            "/api/admin/logout",
            post(|State(backend): State<Backend>, request: Request| async move {
                with_recording(backend, request, Json(json!({})).into_response()).await
            }),
        )
        .route(
            "/api/blogs",
            get(|State(backend): State<Backend>, request: Request| async move {
                let response = Json(json!({ "data": [sample_blog()] })).into_response();
                with_recording(backend, request, response).await
            }),
        )
        .route(
            "/api/projects",
            get(|State(backend): State<Backend>, request: Request| async move {
                // Bare array, no envelope: both shapes exist in the wild
                let response = Json(json!([sample_project()])).into_response();
                with_recording(backend, request, response).await
            }),
        )
        .route(
            "/api/team",
            get(|State(backend): State<Backend>, request: Request| async move {
                let response = Json(json!({ "data": [sample_member()] })).into_response();
                with_recording(backend, request, response).await
            }),
        )
        .route(
            "/api/certificates",
            get(|State(backend): State<Backend>, request: Request| async move {
                let response = Json(json!([sample_certificate()])).into_response();
                with_recording(backend, request, response).await
            }),
        )
        .route(
            "/api/csr",
            get(|State(backend): State<Backend>, request: Request| async move {
                let response = Json(json!({ "data": [sample_csr()] })).into_response();
                with_recording(backend, request, response).await
            }),
        )
        .route(
            "/gallery",
            get(|State(backend): State<Backend>, request: Request| async move {
                let response = Json(json!({ "data": [sample_image()] })).into_response();
                with_recording(backend, request, response).await
            })
            .post(|State(backend): State<Backend>, request: Request| async move {
                let response = Json(json!({ "data": sample_image() })).into_response();
                with_recording(backend, request, response).await
            }),
        )
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn client_for(addr: SocketAddr, dir: &std::path::Path) -> (ApiClient, SessionStore) {
    let session = SessionStore::new(dir.to_path_buf());
    let client = ApiClient::new(format!("http://{}", addr), session.clone()).expect("client");
    (client, session)
}

#[tokio::test]
async fn test_login_persists_token_and_authenticates_later_requests() {
    let backend = Backend::default();
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (client, session) = client_for(addr, dir.path());

    let data = client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login");
    assert_eq!(data.token, "tok-123");
    assert_eq!(session.token().as_deref(), Some("tok-123"));

    // Login itself never primes the CSRF cookie
    assert!(backend.requests_to("/sanctum/csrf-cookie").is_empty());

    // The token survives a process restart
    let reopened = SessionStore::new(dir.path().to_path_buf());
    assert!(reopened.load().expect("load"));
    assert_eq!(reopened.token().as_deref(), Some("tok-123"));

    // ...and rides along on the next request
    client.list_blogs().await.expect("list");
    let list = &backend.requests_to("/api/blogs")[0];
    assert_eq!(list.authorization.as_deref(), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_login_with_bad_credentials_is_rejected_without_redirect() {
    let backend = Backend::default();
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");

    let navigations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&navigations);
    let session = SessionStore::new(dir.path().to_path_buf());
    let client = ApiClient::new(format!("http://{}", addr), session.clone())
        .expect("client")
        .with_unauthorized_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let err = client
        .login(ADMIN_EMAIL, "wrong")
        .await
        .expect_err("rejected");
    assert!(matches!(err, ApiError::LoginRejected(_)), "got {:?}", err);
    assert_eq!(session.token(), None, "no token stored");
    assert_eq!(navigations.load(Ordering::SeqCst), 0, "no redirect for a failed login");
}

#[tokio::test]
async fn test_login_without_token_in_response_is_distinct_error() {
    let backend = Backend::default();
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (client, session) = client_for(addr, dir.path());

    let err = client
        .login(ADMIN_EMAIL, "no-token")
        .await
        .expect_err("no token");
    assert!(matches!(err, ApiError::MissingToken), "got {:?}", err);
    assert_eq!(session.token(), None);
}

#[tokio::test]
async fn test_login_is_exempt_from_the_csrf_retry_loop() {
    let backend = Backend::default();
    backend.login_script.lock().unwrap().push_back(419);
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (client, _session) = client_for(addr, dir.path());

    let err = client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect_err("419 surfaces");
    assert!(matches!(err, ApiError::CsrfExpired), "got {:?}", err);
    assert_eq!(
        backend.requests_to("/api/admin/login").len(),
        1,
        "login is never resubmitted"
    );
    assert!(backend.requests_to("/sanctum/csrf-cookie").is_empty());
}

#[tokio::test]
async fn test_logout_revokes_and_clears_session() {
    let backend = Backend::default();
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (client, session) = client_for(addr, dir.path());

    client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login");
    client.logout().await.expect("logout");

    assert_eq!(session.token(), None);
    assert!(!dir.path().join("session.json").exists());
    let revoke = &backend.requests_to("/api/admin/logout")[0];
    assert_eq!(revoke.authorization.as_deref(), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_gallery_upload_is_multipart_with_transport_boundary() {
    let backend = Backend::default();
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (client, _session) = client_for(addr, dir.path());
    client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login");

    let file_bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x42, 0x42, 0x42];
    let mut upload = GalleryUpload::new("site.jpg", "image/jpeg", file_bytes.clone());
    upload.title_en = Some("Site A".to_string());
    upload.title_ar = Some("الموقع أ".to_string());

    let image = client.upload_gallery_image(&upload).await.expect("upload");
    assert_eq!(image.id, 6);
    assert_eq!(image.url, "/storage/gallery/6.jpg");

    let post = &backend.requests_to("/gallery")[0];
    let content_type = post.content_type.as_deref().expect("content type");
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "json default must not leak into multipart: {}",
        content_type
    );
    assert!(contains(&post.body, b"filename=\"site.jpg\""));
    assert!(contains(&post.body, &file_bytes));
    assert!(contains(&post.body, b"name=\"title_ar\""));
}

#[tokio::test]
async fn test_dashboard_fetches_all_sections() {
    let backend = Backend::default();
    let addr = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (client, _session) = client_for(addr, dir.path());
    client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login");

    let snapshot = client.fetch_dashboard().await.expect("dashboard");
    assert_eq!(snapshot.blogs.len(), 1);
    assert_eq!(snapshot.projects.len(), 1);
    assert_eq!(snapshot.team.len(), 1);
    assert_eq!(snapshot.certificates.len(), 1);
    assert_eq!(snapshot.csr.len(), 1);
    assert_eq!(snapshot.projects[0].year, Some(2023));
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

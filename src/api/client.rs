//! Session-aware HTTP client for the Bayan admin API.
//!
//! Every admin operation goes through [`ApiClient`], which attaches the
//! bearer token, primes the CSRF cookie before state-changing calls,
//! renews an expired cookie with a bounded number of retries, and
//! invalidates the session globally when the backend reports it dead.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{SessionData, SessionStore};
use crate::models::{
    Blog, BlogDraft, Certificate, CertificateDraft, CsrEntry, CsrEntryDraft, GalleryImage,
    GalleryUpload, Project, ProjectDraft, TeamMember, TeamMemberDraft,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Cookie-issuing endpoint, called only for its Set-Cookie side effect
const CSRF_COOKIE_PATH: &str = "/sanctum/csrf-cookie";

/// Credential-issuing endpoint, exempt from CSRF priming and retries
const LOGIN_PATH: &str = "/api/admin/login";

/// Token revocation endpoint
const LOGOUT_PATH: &str = "/api/admin/logout";

/// Maximum number of CSRF-renewal retries after a 419 response.
/// The backend invalidates the cookie on a schedule, so one renewal
/// normally suffices; three bounds a persistently broken session.
const MAX_CSRF_RETRIES: u32 = 3;

/// Pause between CSRF-renewal retries in milliseconds.
/// Also gives the whole retry phase a hard wall-clock ceiling.
const CSRF_RETRY_DELAY_MS: u64 = 250;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Callback fired when the backend declares the session dead. The host
/// application uses it to route the user back to the login screen.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Outgoing request body. Multipart payloads keep their raw parts so a
/// CSRF retry can rebuild and resubmit an identical request.
enum Body {
    None,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

struct FormPart {
    name: String,
    value: FormValue,
}

enum FormValue {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime: String,
    },
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default, alias = "access_token")]
    token: Option<String>,
}

/// Everything the admin landing page shows, fetched in one call
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub blogs: Vec<Blog>,
    pub projects: Vec<Project>,
    pub team: Vec<TeamMember>,
    pub certificates: Vec<Certificate>,
    pub csr: Vec<CsrEntry>,
}

/// HTTP client for the Bayan admin API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    /// Create a client against a fixed base origin. The origin cannot be
    /// switched afterwards.
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            session,
            on_unauthorized: None,
        })
    }

    /// Install the callback fired when a request comes back 401 and the
    /// stored session is torn down.
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ===== Request pipeline =====

    /// Warm the CSRF cookie jar via the side-channel endpoint.
    async fn prime_csrf(&self) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, CSRF_COOKIE_PATH);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::InvalidResponse(format!(
                "csrf-cookie endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn is_mutating(method: &Method) -> bool {
        matches!(
            *method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        )
    }

    /// One attempt: attach the token if a usable one is stored, encode
    /// the body, send. Multipart bodies get their content-type (with
    /// boundary) from the transport, never from our defaults.
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: &Body,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        request = match body {
            Body::None => request,
            Body::Json(value) => request.json(value),
            Body::Multipart(parts) => request.multipart(build_form(parts)?),
        };
        request.send().await
    }

    /// Send a request through the full pipeline and classify the outcome.
    ///
    /// The retry counter lives on this stack frame, one per logical
    /// request; concurrent requests never share it.
    async fn execute(&self, method: Method, path: &str, body: Body) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let is_login = path == LOGIN_PATH;

        if Self::is_mutating(&method) && !is_login {
            // A failed side-channel call is not fatal here: the backend
            // will reject the primary request and drive the 419 path.
            if let Err(e) = self.prime_csrf().await {
                warn!(error = %e, "CSRF cookie fetch failed, sending request anyway");
            }
        }

        let mut retries: u32 = 0;
        loop {
            let response = match self.send_once(&method, &url, &body).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(url = %url, error = %e, "Request failed without a response");
                    return Err(ApiError::NetworkError(e));
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status.as_u16() == 401 && !is_login {
                // Hard global policy: the session is gone. Fire the
                // navigation hook only on the present -> absent
                // transition so concurrent 401s redirect once.
                if self.session.invalidate() {
                    if let Some(ref hook) = self.on_unauthorized {
                        hook();
                    }
                }
                return Err(ApiError::Unauthorized);
            }

            if status.as_u16() == 419 && !is_login && retries < MAX_CSRF_RETRIES {
                if let Err(e) = self.prime_csrf().await {
                    warn!(url = %url, error = %e, "CSRF renewal failed, giving up");
                    return Err(ApiError::CsrfExpired);
                }
                retries += 1;
                debug!(url = %url, retry = retries, "CSRF cookie renewed, resubmitting");
                tokio::time::sleep(Duration::from_millis(CSRF_RETRY_DELAY_MS)).await;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                warn!(url = %url, status = %status, "Server error");
            }
            return Err(ApiError::from_status(status, &text));
        }
    }

    async fn get_item<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, Body::None).await?;
        parse_item(&response.text().await?)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let response = self.execute(Method::GET, path, Body::None).await?;
        parse_list(&response.text().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = encode_body(body)?;
        let response = self.execute(Method::POST, path, Body::Json(value)).await?;
        parse_item(&response.text().await?)
    }

    async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = encode_body(body)?;
        let response = self.execute(Method::PUT, path, Body::Json(value)).await?;
        parse_item(&response.text().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, Body::None).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Authenticate against the admin backend and persist the session.
    ///
    /// Login is exempt from CSRF priming and from the retry loop: it is
    /// the credential-issuing call itself. Bad credentials surface as
    /// `LoginRejected` without touching any stored session, and a 2xx
    /// body without a token string is `MissingToken`.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let body = json!({ "email": email, "password": password });
        let response = match self.execute(Method::POST, LOGIN_PATH, Body::Json(body)).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized) => {
                return Err(ApiError::LoginRejected("invalid credentials".to_string()));
            }
            Err(e) => return Err(e),
        };

        let parsed: LoginResponse = parse_item(&response.text().await?)?;
        let token = match parsed.token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(ApiError::MissingToken),
        };

        debug!(email = %email, "Login succeeded");
        let data = SessionData::new(token, email.to_string());
        self.session.establish(data.clone());
        Ok(data)
    }

    /// Revoke the token server-side (best effort), then clear the local
    /// session unconditionally.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            if let Err(e) = self
                .execute(Method::POST, LOGOUT_PATH, Body::Json(json!({})))
                .await
            {
                debug!(error = %e, "Server-side logout failed, clearing local session anyway");
            }
        }
        self.session.clear();
        Ok(())
    }

    // ===== Blogs =====

    pub async fn list_blogs(&self) -> Result<Vec<Blog>, ApiError> {
        self.get_list("/api/blogs").await
    }

    pub async fn get_blog(&self, id: i64) -> Result<Blog, ApiError> {
        self.get_item(&format!("/api/blogs/{}", id)).await
    }

    pub async fn create_blog(&self, draft: &BlogDraft) -> Result<Blog, ApiError> {
        self.post_json("/api/blogs", draft).await
    }

    pub async fn update_blog(&self, id: i64, draft: &BlogDraft) -> Result<Blog, ApiError> {
        self.put_json(&format!("/api/blogs/{}", id), draft).await
    }

    pub async fn delete_blog(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/blogs/{}", id)).await
    }

    // ===== Projects =====

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_list("/api/projects").await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ApiError> {
        self.get_item(&format!("/api/projects/{}", id)).await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.post_json("/api/projects", draft).await
    }

    pub async fn update_project(&self, id: i64, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.put_json(&format!("/api/projects/{}", id), draft).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/projects/{}", id)).await
    }

    // ===== Team =====

    pub async fn list_team(&self) -> Result<Vec<TeamMember>, ApiError> {
        self.get_list("/api/team").await
    }

    pub async fn create_team_member(&self, draft: &TeamMemberDraft) -> Result<TeamMember, ApiError> {
        self.post_json("/api/team", draft).await
    }

    pub async fn update_team_member(
        &self,
        id: i64,
        draft: &TeamMemberDraft,
    ) -> Result<TeamMember, ApiError> {
        self.put_json(&format!("/api/team/{}", id), draft).await
    }

    pub async fn delete_team_member(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/team/{}", id)).await
    }

    // ===== Certificates =====

    pub async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError> {
        self.get_list("/api/certificates").await
    }

    pub async fn create_certificate(
        &self,
        draft: &CertificateDraft,
    ) -> Result<Certificate, ApiError> {
        self.post_json("/api/certificates", draft).await
    }

    pub async fn update_certificate(
        &self,
        id: i64,
        draft: &CertificateDraft,
    ) -> Result<Certificate, ApiError> {
        self.put_json(&format!("/api/certificates/{}", id), draft).await
    }

    pub async fn delete_certificate(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/certificates/{}", id)).await
    }

    // ===== CSR =====

    pub async fn list_csr(&self) -> Result<Vec<CsrEntry>, ApiError> {
        self.get_list("/api/csr").await
    }

    pub async fn create_csr_entry(&self, draft: &CsrEntryDraft) -> Result<CsrEntry, ApiError> {
        self.post_json("/api/csr", draft).await
    }

    pub async fn update_csr_entry(
        &self,
        id: i64,
        draft: &CsrEntryDraft,
    ) -> Result<CsrEntry, ApiError> {
        self.put_json(&format!("/api/csr/{}", id), draft).await
    }

    pub async fn delete_csr_entry(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/csr/{}", id)).await
    }

    // ===== Gallery =====

    pub async fn list_gallery(&self) -> Result<Vec<GalleryImage>, ApiError> {
        self.get_list("/gallery").await
    }

    /// Upload an image to the gallery as a multipart form
    pub async fn upload_gallery_image(
        &self,
        upload: &GalleryUpload,
    ) -> Result<GalleryImage, ApiError> {
        let response = self
            .execute(Method::POST, "/gallery", Body::Multipart(upload_parts(upload)))
            .await?;
        parse_item(&response.text().await?)
    }

    pub async fn delete_gallery_image(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/gallery/{}", id)).await
    }

    // ===== Dashboard =====

    /// Fetch everything the admin landing page shows, concurrently.
    /// All five are plain reads; the first failure wins.
    pub async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ApiError> {
        let (blogs, projects, team, certificates, csr) = futures::try_join!(
            self.list_blogs(),
            self.list_projects(),
            self.list_team(),
            self.list_certificates(),
            self.list_csr(),
        )?;
        Ok(DashboardSnapshot {
            blogs,
            projects,
            team,
            certificates,
            csr,
        })
    }
}

// ============================================================================
// Body encoding and response parsing
// ============================================================================

fn encode_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode request body: {}", e)))
}

fn upload_parts(upload: &GalleryUpload) -> Vec<FormPart> {
    let mut parts = vec![FormPart {
        name: "image".to_string(),
        value: FormValue::File {
            bytes: upload.bytes.clone(),
            file_name: upload.file_name.clone(),
            mime: upload.mime.clone(),
        },
    }];
    if let Some(ref title) = upload.title_en {
        parts.push(FormPart {
            name: "title_en".to_string(),
            value: FormValue::Text(title.clone()),
        });
    }
    if let Some(ref title) = upload.title_ar {
        parts.push(FormPart {
            name: "title_ar".to_string(),
            value: FormValue::Text(title.clone()),
        });
    }
    parts
}

fn build_form(parts: &[FormPart]) -> Result<reqwest::multipart::Form, reqwest::Error> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File {
                bytes,
                file_name,
                mime,
            } => form.part(
                part.name.clone(),
                reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)?,
            ),
        };
    }
    Ok(form)
}

/// Single resources arrive either bare or wrapped in a `data` envelope
/// depending on the endpoint; accept both.
fn parse_item<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    if let Ok(item) = serde_json::from_str::<T>(text) {
        return Ok(item);
    }

    #[derive(Deserialize)]
    struct ItemEnvelope<T> {
        data: T,
    }

    serde_json::from_str::<ItemEnvelope<T>>(text)
        .map(|envelope| envelope.data)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

fn parse_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ApiError> {
    if let Ok(items) = serde_json::from_str::<Vec<T>>(text) {
        return Ok(items);
    }

    #[derive(Deserialize)]
    struct ListEnvelope<T> {
        #[serde(default = "Vec::new")]
        data: Vec<T>,
    }

    serde_json::from_str::<ListEnvelope<T>>(text)
        .map(|envelope| envelope.data)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse list response: {}", e)))
}

//! REST API layer for the admission portal using Axum.
//!
//! Route map (all under /api):
//! - auth: register, login, me, logout
//! - users: profile, change-password, dashboard, admin listing/status
//! - applications: submit, my-application, update, delete, documents
//! - admin: listing, detail, status review, document verify, dashboard, search
//!
//! Every protected route goes through the bearer middleware, which resolves
//! the token to a live user record on each request; deactivating an account
//! therefore kills its outstanding tokens immediately.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{create_jwt, hash_password, validate_jwt, verify_password};
use crate::config::AppConfig;
use crate::email::{spawn_status_email, spawn_welcome_email, Mailer};
use crate::error::ApiError;
use crate::files::{object_key, FileStore};
use crate::guard::{require_admin, require_student};
use crate::lifecycle::{ApplicationPatch, DocumentUpload, Lifecycle, NewApplication};
use crate::models::{Address, Gender, PublicUser, Role, User};
use crate::reports::Reports;
use crate::storage::Storage;

/// Extra room for multipart framing on top of the configured file cap, so
/// an oversized file reaches the validator (and gets a proper 400) instead
/// of tripping the framework's body limit.
const UPLOAD_OVERHEAD: usize = 1024 * 1024;

/// Shared app state for REST handlers (Arc-wrapped for concurrency).
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub config: Arc<AppConfig>,
    pub lifecycle: Lifecycle,
    pub reports: Reports,
    pub files: Arc<dyn FileStore>,
    pub mailer: Option<Arc<Mailer>>,
}

/// Authenticated user attached to the request by the bearer middleware.
#[derive(Clone)]
pub struct CurrentUser(pub Arc<User>);

/// JSON extractor that maps body/schema rejections onto the validation
/// error kind instead of the framework's default response.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Not authorized to access this route".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Not authorized to access this route".to_string()))?;

    let claims = validate_jwt(token, &state.config.jwt_secret)
        .map_err(|_| ApiError::Unauthorized("Not authorized to access this route".to_string()))?;

    // Token is only as good as the account behind it, re-read every time.
    let user = state
        .storage
        .get_user(&claims.sub)?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;
    if !user.is_active {
        return Err(ApiError::Unauthorized(
            "User account is deactivated".to_string(),
        ));
    }

    req.extensions_mut().insert(CurrentUser(Arc::new(user)));
    Ok(next.run(req).await)
}

/// Create the Axum router with the full portal surface.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);
    let max_upload = state.config.max_file_size as usize + UPLOAD_OVERHEAD;

    let protected_auth = Router::new()
        .route("/me", get(get_me_handler))
        .route("/logout", get(logout_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let auth_routes = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .merge(protected_auth);

    let user_routes = Router::new()
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route("/change-password", put(change_password_handler))
        .route("/dashboard", get(user_dashboard_handler))
        .route("/", get(list_users_handler))
        .route("/:id/status", put(update_user_status_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let application_routes = Router::new()
        .route("/", post(submit_application_handler))
        .route("/my-application", get(my_application_handler))
        .route(
            "/:id",
            put(update_application_handler).delete(delete_application_handler),
        )
        .route(
            "/:id/documents",
            post(upload_document_handler)
                .get(application_documents_handler)
                .layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/documents/:doc_id", axum::routing::delete(delete_document_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/applications", get(admin_list_applications_handler))
        .route("/applications/:id", get(admin_application_detail_handler))
        .route("/applications/:id/status", put(admin_update_status_handler))
        .route("/documents/:id/verify", put(admin_verify_document_handler))
        .route("/dashboard", get(admin_dashboard_handler))
        .route("/search", get(admin_search_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/api/health", get(health_handler))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/applications", application_routes)
        .nest("/api/admin", admin_routes)
        .fallback(fallback_handler)
        .with_state(state)
}

// --- Auth handlers ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

fn auth_user_summary(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "phone": user.phone,
        "lastLogin": user.last_login,
    })
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Please enter a valid email".to_string()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if !is_valid_phone(&payload.phone) {
        return Err(ApiError::Validation(
            "Please enter a valid 10-digit phone number".to_string(),
        ));
    }

    // Friendly pre-check; the email index CAS in the store settles races.
    if state.storage.find_user_by_email(&email)?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password_hash,
        // Open registration always creates students; admins are seeded
        // out-of-band with the seed binary.
        role: Role::Student,
        phone: payload.phone,
        date_of_birth: payload.date_of_birth,
        gender: payload.gender,
        address: payload.address.unwrap_or_default(),
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };
    state.storage.create_user(&user)?;
    tracing::info!(user = %user.id, "user registered");

    let token = create_jwt(&user, &state.config.jwt_secret, state.config.jwt_expiry_secs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    spawn_welcome_email(state.mailer.clone(), user.email.clone(), user.name.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "token": token,
            "user": auth_user_summary(&user),
        })),
    ))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Please provide email and password".to_string(),
        ));
    }

    let mut user = state
        .storage
        .find_user_by_email(&payload.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !user.is_active {
        return Err(ApiError::AccountDeactivated);
    }

    let matches = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    user.last_login = Some(Utc::now());
    state.storage.update_user(&user)?;

    let token = create_jwt(&user, &state.config.jwt_secret, state.config.jwt_expiry_secs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::info!(user = %user.id, "login successful");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": auth_user_summary(&user),
    })))
}

async fn get_me_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Value> {
    Json(json!({
        "success": true,
        "user": PublicUser::from(user.as_ref()),
    }))
}

async fn logout_handler(Extension(CurrentUser(_)): Extension<CurrentUser>) -> Json<Value> {
    // Tokens are stateless; logout is an acknowledgement for the client.
    Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

// --- User handlers ---

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

async fn get_profile_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Value> {
    Json(json!({
        "success": true,
        "user": PublicUser::from(user.as_ref()),
    }))
}

async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut user = (*user).clone();

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::Validation("Name is required".to_string()));
        }
        user.name = name;
    }
    if let Some(phone) = payload.phone {
        if !is_valid_phone(&phone) {
            return Err(ApiError::Validation(
                "Please enter a valid 10-digit phone number".to_string(),
            ));
        }
        user.phone = phone;
    }
    if let Some(date_of_birth) = payload.date_of_birth {
        user.date_of_birth = date_of_birth;
    }
    if let Some(gender) = payload.gender {
        user.gender = gender;
    }
    if let Some(address) = payload.address {
        user.address = address;
    }
    user.updated_at = Utc::now();

    // Profile edits never touch email, password or role.
    state.storage.update_user(&user)?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": PublicUser::from(&user),
    })))
}

async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut user = (*user).clone();

    let matches = verify_password(&payload.current_password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !matches {
        return Err(ApiError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }
    if payload.new_password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    // The only place besides registration/seeding where a hash is written.
    user.password_hash =
        hash_password(&payload.new_password).map_err(|e| ApiError::Internal(e.to_string()))?;
    user.updated_at = Utc::now();
    state.storage.update_user(&user)?;
    tracing::info!(user = %user.id, "password changed");

    Ok(Json(json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}

async fn user_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    require_student(&user)?;
    let data = state.reports.student_dashboard(&user)?;
    Ok(Json(json!({
        "success": true,
        "data": data,
    })))
}

async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;

    let role = match query.role.as_deref() {
        Some(raw) => Some(
            Role::parse(raw)
                .ok_or_else(|| ApiError::Validation("Invalid role filter".to_string()))?,
        ),
        None => None,
    };

    let page = state.reports.list_users(
        role,
        query.is_active,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )?;

    Ok(Json(json!({
        "success": true,
        "count": page.data.len(),
        "data": page.data,
        "pagination": page.pagination,
    })))
}

async fn update_user_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;

    let mut target = state
        .storage
        .get_user(&id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    target.is_active = payload.is_active;
    target.updated_at = Utc::now();
    state.storage.update_user(&target)?;
    tracing::info!(user = %target.id, is_active = payload.is_active, "user status updated");

    let verb = if payload.is_active { "activated" } else { "deactivated" };
    Ok(Json(json!({
        "success": true,
        "message": format!("User {} successfully", verb),
        "user": PublicUser::from(&target),
    })))
}

// --- Application handlers (student) ---

async fn submit_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    AppJson(payload): AppJson<NewApplication>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_student(&user)?;
    let application = state.lifecycle.submit(&user, payload)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Application submitted successfully",
            "application": application,
        })),
    ))
}

async fn my_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    require_student(&user)?;
    let application = state.lifecycle.my_application(&user)?;
    // Detail view inlines documents and the reviewer summary.
    let application = state.reports.application_detail(&application.id)?;

    Ok(Json(json!({
        "success": true,
        "application": application,
    })))
}

async fn update_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ApplicationPatch>,
) -> Result<Json<Value>, ApiError> {
    require_student(&user)?;
    let application = state.lifecycle.update(&user, &id, payload)?;

    Ok(Json(json!({
        "success": true,
        "message": "Application updated successfully",
        "application": application,
    })))
}

async fn delete_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_student(&user)?;
    let removed = state.lifecycle.delete(&user, &id)?;

    // Blob cleanup is best-effort and detached from the response path.
    let files = state.files.clone();
    tokio::spawn(async move {
        for document in removed {
            if let Err(err) = files.delete(&document.public_id).await {
                tracing::warn!(key = %document.public_id, error = %err, "failed to delete stored file");
            }
        }
    });

    Ok(Json(json!({
        "success": true,
        "message": "Application deleted successfully",
    })))
}

async fn upload_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_student(&user)?;
    // Ownership is settled before any byte of the file is persisted.
    let application = state.lifecycle.owned_application(&user, &id)?;

    let mut document_type = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "documentType" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                document_type = Some(
                    crate::models::DocumentType::parse(raw.trim())
                        .ok_or_else(|| ApiError::Validation("Invalid document type".to_string()))?,
                );
            }
            "file" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let document_type =
        document_type.ok_or_else(|| ApiError::Validation("Please provide a document type".to_string()))?;
    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::Validation("Please upload a file".to_string()))?;

    // Size and MIME checks run before the blob or any metadata exists.
    let file_size = bytes.len() as u64;
    state.lifecycle.validate_upload(file_size, &content_type)?;

    let document_id = Uuid::new_v4().to_string();
    let key = object_key(&application.id, &document_id, &file_name);
    let stored = state
        .files
        .put(&key, &content_type, bytes)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let document = state.lifecycle.attach_document(
        &user,
        &application.id,
        DocumentUpload {
            id: document_id,
            document_type,
            file_name,
            file_url: stored.url,
            public_id: stored.key,
            file_size,
            mime_type: content_type,
        },
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Document uploaded successfully",
            "document": document,
        })),
    ))
}

async fn application_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_student(&user)?;
    let documents = state.lifecycle.application_documents(&user, &id)?;

    Ok(Json(json!({
        "success": true,
        "count": documents.len(),
        "documents": documents,
    })))
}

async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(doc_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_student(&user)?;
    let document = state.lifecycle.detach_document(&user, &doc_id)?;

    let files = state.files.clone();
    tokio::spawn(async move {
        if let Err(err) = files.delete(&document.public_id).await {
            tracing::warn!(key = %document.public_id, error = %err, "failed to delete stored file");
        }
    });

    Ok(Json(json!({
        "success": true,
        "message": "Document deleted successfully",
    })))
}

// --- Admin handlers ---

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    pub course: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDocumentRequest {
    pub is_verified: bool,
    #[serde(default)]
    pub verification_notes: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SearchQuery {
    pub query: Option<String>,
}

async fn admin_list_applications_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;

    let page = state.reports.list_applications(
        query.status.as_deref(),
        query.course.as_deref(),
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )?;

    Ok(Json(json!({
        "success": true,
        "count": page.data.len(),
        "data": page.data,
        "pagination": page.pagination,
    })))
}

async fn admin_application_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let application = state.reports.application_detail(&id)?;

    Ok(Json(json!({
        "success": true,
        "application": application,
    })))
}

async fn admin_update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let application = state
        .lifecycle
        .set_status(&user, &id, &payload.status, payload.remarks)?;

    // Notify the student after the change has committed; the outcome is
    // observed only in the logs.
    if let Some(student) = state.storage.get_user(&application.student)? {
        spawn_status_email(
            state.mailer.clone(),
            student.email,
            student.name,
            application.status,
            application.remarks.clone(),
        );
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Application {} successfully", application.status.as_str()),
        "application": application,
    })))
}

async fn admin_verify_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<VerifyDocumentRequest>,
) -> Result<Json<Value>, ApiError> {
    let document =
        state
            .lifecycle
            .verify_document(&user, &id, payload.is_verified, payload.verification_notes)?;

    let verb = if document.is_verified { "verified" } else { "unverified" };
    Ok(Json(json!({
        "success": true,
        "message": format!("Document {} successfully", verb),
        "document": document,
    })))
}

async fn admin_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let stats = state.reports.admin_dashboard()?;

    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

async fn admin_search_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let applications = state
        .reports
        .search_applications(query.query.as_deref().unwrap_or_default())?;

    Ok(Json(json!({
        "success": true,
        "count": applications.len(),
        "applications": applications,
    })))
}

// --- Misc ---

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "College Admission Portal API is running",
        "timestamp": Utc::now(),
    }))
}

async fn fallback_handler() -> ApiError {
    ApiError::NotFound("API endpoint not found".to_string())
}

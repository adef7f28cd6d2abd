//! Client service routes

use axum::{
    Form, Json, Router, async_trait,
    body::{Body, to_bytes},
    extract::{
        DefaultBodyLimit, FromRequest, Multipart, Request, State,
        multipart::MultipartError,
        rejection::{FormRejection, JsonRejection},
    },
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::IntoResponse,
    routing::{get, post},
};
use http_body_util::LengthLimitError;
use serde::Serialize;
use std::error::Error as StdError;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    error::RegistrationError,
    models::{ClientProfile, RegisterClientRequest},
    settings::ServerConfig,
    state::AppState,
    uploads::{PhotoUpload, UPLOADS_PREFIX},
    validation::{self, ValidationErrors},
};

/// Room for the text fields and multipart framing around a photo
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Response for a successful registration
#[derive(Serialize)]
pub struct RegisterClientResponse {
    pub message: String,
    pub status: &'static str,
    pub client: ClientProfile,
}

/// Create the router for the client service
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let multipart_limit = state.photos.max_bytes() + MULTIPART_OVERHEAD;
    let uploads = ServeDir::new(state.photos.root());

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/v1/client/register",
            post(register_client).layer(DefaultBodyLimit::max(multipart_limit)),
        )
        .nest_service(UPLOADS_PREFIX, uploads)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    match config.cors_origins() {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            layer.allow_origin(origins).allow_credentials(true)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "client-service"
    }))
}

/// Client registration endpoint
pub async fn register_client(
    State(state): State<AppState>,
    form: RegistrationForm,
) -> Result<impl IntoResponse, RegistrationError> {
    let RegistrationForm { mut request, photo } = form;
    info!("Client registration attempt: {:?}", request);

    // The photo is only written once the rest of the payload is known good.
    let stored_photo = match photo {
        Some(upload) => {
            validation::validate_registration(&request)?;
            state
                .photos
                .validate(&upload)
                .map_err(ValidationErrors::from)?;

            let reference = state.photos.save(&upload).await.map_err(|e| {
                RegistrationError::Internal(format!("Failed to store photo: {}", e))
            })?;
            request.photo = Some(reference.clone());
            Some(reference)
        }
        None => None,
    };

    match state.registration.register_client(request).await {
        Ok(client) => {
            let response = RegisterClientResponse {
                message: "Client registered successfully".to_string(),
                status: "created",
                client,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            if let Some(reference) = stored_photo {
                state.photos.remove(&reference).await;
            }
            Err(e)
        }
    }
}

/// Registration payload decoded from JSON, url-encoded or multipart bodies
pub struct RegistrationForm {
    pub request: RegisterClientRequest,
    pub photo: Option<PhotoUpload>,
}

#[async_trait]
impl FromRequest<AppState> for RegistrationForm {
    type Rejection = RegistrationError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| RegistrationError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        let is_json = content_type.starts_with("application/json");
        let is_form = content_type.starts_with("application/x-www-form-urlencoded");
        if !is_json && !is_form {
            let shown = if content_type.is_empty() {
                "missing".to_string()
            } else {
                content_type
            };
            return Err(RegistrationError::UnsupportedMediaType(shown));
        }

        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, state.body_limit)
            .await
            .map_err(body_read_error)?;

        let request = if is_json {
            let Json(request) =
                Json::<RegisterClientRequest>::from_bytes(&bytes).map_err(json_error)?;
            request
        } else {
            let Form(request) = Form::<RegisterClientRequest>::from_request(
                Request::from_parts(parts, Body::from(bytes)),
                state,
            )
            .await
            .map_err(form_error)?;
            request
        };

        Ok(Self {
            request,
            photo: None,
        })
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RegistrationForm, RegistrationError> {
    let mut request = RegisterClientRequest::default();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" && field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, "Invalid photo"))?;

            // Browsers send an empty, unnamed part when no file was picked.
            let nothing_picked =
                bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty();
            if !nothing_picked {
                photo = Some(PhotoUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(e, &format!("Invalid field {}", name)))?;

        let slot = match name.as_str() {
            "fullname" | "fullName" | "full_name" => &mut request.full_name,
            "email" => &mut request.email,
            "username" | "agentusername" | "userName" => &mut request.username,
            "password" => &mut request.password,
            "fathername" | "fatherName" | "father_name" => &mut request.father_name,
            "photo" => &mut request.photo,
            _ => continue,
        };
        *slot = Some(value);
    }

    Ok(RegistrationForm { request, photo })
}

/// Only a tripped length limit is a 413; transport failures are the caller's bad request
fn body_read_error(error: axum::Error) -> RegistrationError {
    let inner = error.into_inner();
    let mut source: Option<&(dyn StdError + 'static)> = Some(inner.as_ref());
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return RegistrationError::PayloadTooLarge;
        }
        source = current.source();
    }
    RegistrationError::BadRequest(format!("Failed to read request body: {}", inner))
}

fn multipart_error(error: MultipartError, context: &str) -> RegistrationError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return RegistrationError::PayloadTooLarge;
    }
    RegistrationError::BadRequest(format!("{}: {}", context, error))
}

fn json_error(rejection: JsonRejection) -> RegistrationError {
    info!("Rejected JSON registration body: {}", rejection.body_text());
    let message = match rejection {
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        _ => "Request body is not a valid registration payload",
    };
    RegistrationError::BadRequest(message.to_string())
}

fn form_error(rejection: FormRejection) -> RegistrationError {
    info!("Rejected form registration body: {}", rejection.body_text());
    RegistrationError::BadRequest("Request body is not a valid registration form".to_string())
}

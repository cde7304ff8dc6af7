//! Local stand-in for the manga translation service
//!
//! Speaks the same HTTP contract as the GPU translation server so the client
//! can be developed and tested without one. Instead of translating, it
//! validates the request exactly like the real service and sends the page
//! back unchanged.
//!
//! | route                          | answer                                    |
//! |--------------------------------|-------------------------------------------|
//! | `POST /api/translate`          | the uploaded page, or `{"error": "..."}`  |
//! | `GET /api/fonts`               | `{"fonts": [...]}`                        |
//! | `GET /api/translation-methods` | `{"translation_methods": [...]}`          |

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use manga_translate::{FontStyle, TranslationMethod, UploadCandidate};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Largest upload accepted, in bytes
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct FontsResponse {
    pub fonts: Vec<String>,
}

#[derive(Serialize)]
pub struct MethodsResponse {
    pub translation_methods: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub methods: Arc<Vec<String>>,
    pub fonts: Arc<Vec<String>>,
    /// When set, every translate call fails with a 500 carrying this message
    pub failure: Option<Arc<str>>,
    /// Simulated processing time per page
    pub delay: Duration,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            methods: Arc::new(
                TranslationMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            ),
            fonts: Arc::new(FontStyle::ALL.iter().map(|f| f.as_str().to_string()).collect()),
            failure: None,
            delay: Duration::ZERO,
        }
    }
}

impl AppState {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Render a list the way the service's error messages quote it
fn quoted_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
    format!("[{}]", items.join(", "))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(translate_page))
        .route("/api/fonts", get(list_fonts))
        .route("/api/translation-methods", get(list_methods))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_fonts(State(state): State<AppState>) -> Json<FontsResponse> {
    Json(FontsResponse {
        fonts: state.fonts.as_ref().clone(),
    })
}

async fn list_methods(State(state): State<AppState>) -> Json<MethodsResponse> {
    Json(MethodsResponse {
        translation_methods: state.methods.as_ref().clone(),
    })
}

async fn translate_page(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut method: Option<String> = None;
    let mut font: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
                image = Some((file_name, data.to_vec()));
            }
            "translation_method" => {
                method = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?,
                );
            }
            "font" => {
                font = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = image else {
        return Err(api_error(StatusCode::BAD_REQUEST, "No image file provided"));
    };
    if file_name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No selected file"));
    }

    let method = method.unwrap_or_else(|| TranslationMethod::default().as_str().to_string());
    let font = font.unwrap_or_else(|| FontStyle::default().as_str().to_string());

    if !state.methods.contains(&method) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid translation method. Must be one of: {}",
                quoted_list(&state.methods)
            ),
        ));
    }
    if !state.fonts.contains(&font) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid font. Must be one of: {}", quoted_list(&state.fonts)),
        ));
    }

    info!(
        "Translating '{}' ({} bytes) with {} / {}",
        file_name,
        data.len(),
        method,
        font
    );

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    if let Some(message) = &state.failure {
        warn!("Simulated failure: {}", message);
        return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, message.to_string()));
    }

    let candidate = UploadCandidate::sniffed(file_name, data);
    let Some(media_type) = candidate.accepted_type() else {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "cannot identify image file",
        ));
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, media_type.mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"translated_manga.{}\"",
                    media_type.extension()
                ),
            ),
        ],
        candidate.data,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use manga_translate::{
        Config, Controller, ErrorKind, HttpTranslationService, LifecycleState, ServiceError,
        Surface, TranslationService,
    };
    use std::net::SocketAddr;
    use tower::ServiceExt;

    const PAGE: &[u8] = include_bytes!("../../assets/samples/sample-2.png");
    const BOUNDARY: &str = "manga-translate-test-boundary";

    async fn spawn(state: AppState) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr, route: &str) -> HttpTranslationService {
        HttpTranslationService::new(&format!("http://{}{}", addr, route), 10).unwrap()
    }

    fn surface_for(service: HttpTranslationService) -> Surface {
        Surface::new(Controller::new(Arc::new(service), &Config::default()))
    }

    /// Hand-built multipart body: (name, optional file name, content)
    fn multipart_body(fields: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in fields {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn post_form(fields: &[(&str, Option<&str>, &[u8])]) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/translate")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap();
        let response = router(AppState::default()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    // ========== Wire contract ==========

    #[tokio::test]
    async fn test_missing_image_is_rejected() {
        let (status, body) = post_form(&[("translation_method", None, &b"google"[..])]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image file provided");
    }

    #[tokio::test]
    async fn test_empty_file_name_is_rejected() {
        let (status, body) = post_form(&[("image", Some(""), PAGE)]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No selected file");
    }

    #[tokio::test]
    async fn test_unknown_method_is_rejected() {
        let (status, body) = post_form(&[
            ("image", Some("manga.png"), PAGE),
            ("translation_method", None, &b"deepl"[..]),
        ])
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid translation method. Must be one of: ['google', 'hf', 'baidu', 'bing']"
        );
    }

    #[tokio::test]
    async fn test_unknown_font_is_rejected() {
        let (status, body) = post_form(&[
            ("image", Some("manga.png"), PAGE),
            ("font", None, &b"comic"[..]),
        ])
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid font. Must be one of: ['animeace_i', 'mangati', 'ariali']"
        );
    }

    #[tokio::test]
    async fn test_non_image_upload_fails() {
        let (status, body) = post_form(&[("image", Some("manga.png"), &b"plain text"[..])]).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "cannot identify image file");
    }

    // ========== Real client against the stand-in ==========

    #[tokio::test]
    async fn test_catalog() {
        let addr = spawn(AppState::default()).await;
        let catalog = client(addr, "/api/translate").catalog().await.unwrap();
        assert_eq!(catalog.translation_methods, vec!["google", "hf", "baidu", "bing"]);
        assert_eq!(catalog.fonts, vec!["animeace_i", "mangati", "ariali"]);
    }

    #[tokio::test]
    async fn test_client_round_trip() {
        let addr = spawn(AppState::default()).await;
        let surface = surface_for(client(addr, "/api/translate"));

        surface.on_example_selected(1).unwrap();
        surface.on_submit_clicked().await.unwrap();

        let snap = surface.controller().snapshot();
        assert_eq!(snap.state, LifecycleState::Succeeded);
        assert_eq!(snap.result.unwrap().data().as_ref(), PAGE);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_service_error_reaches_error_record() {
        let addr = spawn(AppState::failing("model overloaded")).await;
        let surface = surface_for(client(addr, "/api/translate"));

        surface.on_example_selected(0).unwrap();
        assert!(surface.on_submit_clicked().await.is_err());

        let snap = surface.controller().snapshot();
        assert_eq!(snap.state, LifecycleState::Failed);
        let error = snap.error.unwrap();
        assert_eq!(error.kind, ErrorKind::Service);
        assert_eq!(error.message, "model overloaded");
    }

    #[tokio::test]
    async fn test_error_without_json_body_uses_fallback() {
        let addr = spawn(AppState::default()).await;
        let service = client(addr, "/api/missing");
        let image = manga_translate::ImageRef::new(
            "manga.png",
            manga_translate::MediaType::Png,
            bytes::Bytes::from_static(PAGE),
        );
        let request = manga_translate::service::TranslationRequest::new(&image, Default::default());

        let err = service.translate(request).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                status: 404,
                message: None
            }
        );
        assert_eq!(err.user_message(), manga_translate::service::GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let addr = spawn(AppState::default().with_delay(Duration::from_secs(5))).await;
        let service = HttpTranslationService::new(&format!("http://{}/api/translate", addr), 1).unwrap();
        let surface = surface_for(service);

        surface.on_example_selected(0).unwrap();
        let err = surface.on_submit_clicked().await.unwrap_err();
        assert!(matches!(err, manga_translate::ControllerError::Transport(_)), "got {:?}", err);
        assert_eq!(
            surface.controller().snapshot().error.unwrap().kind,
            ErrorKind::Transport
        );
    }
}

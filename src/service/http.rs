//! HTTP provider for the manga translation service
//!
//! Pages are posted as multipart form data to the configured endpoint:
//!
//! | field                | content                                  |
//! |----------------------|------------------------------------------|
//! | `image`              | page bytes, uploaded as `manga.png`      |
//! | `translation_method` | one of `google`, `hf`, `baidu`, `bing`   |
//! | `font`               | one of `animeace_i`, `mangati`, `ariali` |
//!
//! A 2xx answer carries the translated page as the raw body. Anything else
//! carries `{"error": "..."}`, which may be missing or unparseable.
//!
//! # Example
//!
//! ```ignore
//! use manga_translate::service::{HttpTranslationService, TranslationService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HttpTranslationService::new("http://localhost:30180/api/translate", 120)?;
//!     let catalog = service.catalog().await?;
//!     println!("{:?}", catalog.fonts);
//!     Ok(())
//! }
//! ```

use crate::config::{Config, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, ENDPOINT_ENV};
use crate::image::{MediaType, TranslationResult};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::translator::{TranslationRequest, TranslationService, UPLOAD_FILE_NAME};
use async_trait::async_trait;
use infer::MatcherType;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Options the service advertises through its catalog endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionCatalog {
    pub translation_methods: Vec<String>,
    pub fonts: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct MethodsBody {
    translation_methods: Vec<String>,
}

#[derive(Deserialize)]
struct FontsBody {
    fonts: Vec<String>,
}

/// Client for the remote translation endpoint
#[derive(Clone)]
pub struct HttpTranslationService {
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Full URL of the translate endpoint
    endpoint: Url,
}

impl HttpTranslationService {
    /// Create a client for `endpoint` with the given request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New client
    /// * `Err(ServiceError::Config)` - If the endpoint isn't an http(s) URL or the client can't be built
    pub fn new(endpoint: &str, timeout_secs: u64) -> ServiceResult<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| ServiceError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ServiceError::Config(format!(
                "Endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ServiceError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        Self::new(&config.endpoint, config.request_timeout_secs)
    }

    /// Create a client from `MANGA_TRANSLATE_ENDPOINT`, falling back to the default endpoint
    pub fn from_env() -> ServiceResult<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(&endpoint, DEFAULT_TIMEOUT_SECS)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve a sibling API route, e.g. `fonts` next to `.../api/translate`
    fn sibling(&self, route: &str) -> ServiceResult<Url> {
        self.endpoint
            .join(route)
            .map_err(|e| ServiceError::Config(format!("Invalid route '{}': {}", route, e)))
    }

    /// Fetch the translation methods and fonts the service accepts
    pub async fn catalog(&self) -> ServiceResult<OptionCatalog> {
        let methods: MethodsBody = self.get_json(self.sibling("translation-methods")?).await?;
        let fonts: FontsBody = self.get_json(self.sibling("fonts")?).await?;

        Ok(OptionCatalog {
            translation_methods: methods.translation_methods,
            fonts: fonts.fonts,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> ServiceResult<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(format!("Failed to parse catalog: {}", e)))
    }
}

/// Extract the `error` field from a failure body, if there is a usable one
pub fn parse_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
}

/// Decide what kind of image a success body holds
///
/// The body's own signature wins over the declared content type. Bodies
/// that aren't images at all are rejected.
pub fn decode_image_body(content_type: Option<&str>, body: &[u8]) -> ServiceResult<MediaType> {
    if body.is_empty() {
        return Err(ServiceError::MalformedResponse(
            "Empty response body".to_string(),
        ));
    }

    let Some(kind) = infer::get(body).filter(|kind| kind.matcher_type() == MatcherType::Image)
    else {
        return Err(ServiceError::MalformedResponse(format!(
            "Response body is not an image (content type: {})",
            content_type.unwrap_or("none")
        )));
    };

    MediaType::from_mime(kind.mime_type()).ok_or_else(|| {
        ServiceError::MalformedResponse(format!(
            "Unsupported image type in response: {}",
            kind.mime_type()
        ))
    })
}

impl std::fmt::Debug for HttpTranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslationService")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

#[async_trait]
impl TranslationService for HttpTranslationService {
    async fn translate(&self, request: TranslationRequest) -> ServiceResult<TranslationResult> {
        let image = Part::bytes(request.image.to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(request.media_type.mime())?;

        let form = Form::new()
            .part("image", image)
            .text("translation_method", request.method.as_str())
            .text("font", request.font.as_str());

        debug!(
            "POST {} (method: {}, font: {}, {} bytes)",
            self.endpoint,
            request.method,
            request.font,
            request.image.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = parse_error_message(&body);
            warn!(
                "Translation service returned {}: {}",
                status,
                message.as_deref().unwrap_or("<no error message>")
            );
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;
        let media_type = decode_image_body(content_type.as_deref(), &body)?;

        Ok(TranslationResult::new(
            format!("translated_manga.{}", media_type.extension()),
            media_type,
            body,
        ))
    }

    fn service_name(&self) -> &str {
        "HTTP translation service"
    }
}

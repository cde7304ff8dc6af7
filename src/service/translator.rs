//! Translation service trait and request payload
//!
//! This module defines the `TranslationService` trait for provider abstraction,
//! so the controller can drive the real HTTP service, a deterministic mock, or
//! anything else that turns a manga page into a translated page.
//!
//! # Example
//!
//! ```ignore
//! use manga_translate::service::{HttpTranslationService, TranslationRequest, TranslationService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HttpTranslationService::from_env()?;
//!     let request = TranslationRequest::new(&image, TranslationConfig::default());
//!     let translated = service.translate(request).await?;
//!     println!("{} bytes", translated.len());
//!     Ok(())
//! }
//! ```

use crate::image::{ImageRef, MediaType, TranslationResult};
use crate::options::{FontStyle, TranslationConfig, TranslationMethod};
use crate::service::error::ServiceResult;
use async_trait::async_trait;
use bytes::Bytes;

/// File name the page is uploaded under, whatever it was called locally
pub const UPLOAD_FILE_NAME: &str = "manga.png";

/// Everything one translation call needs, captured eagerly at submit time
///
/// Holding owned copies means later changes to the controller's image or
/// options never leak into a request that is already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub image: Bytes,
    pub media_type: MediaType,
    pub method: TranslationMethod,
    pub font: FontStyle,
}

impl TranslationRequest {
    pub fn new(image: &ImageRef, config: TranslationConfig) -> Self {
        Self {
            image: image.data().clone(),
            media_type: image.media_type(),
            method: config.method,
            font: config.font,
        }
    }
}

/// Generic trait for manga translation backends
///
/// All methods are async to support I/O-bound implementations.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate one page and return the rendered result
    ///
    /// # Returns
    ///
    /// * `Ok(TranslationResult)` - The translated page
    /// * `Err(ServiceError)` - Rejection, network failure or undecodable body
    async fn translate(&self, request: TranslationRequest) -> ServiceResult<TranslationResult>;

    /// Name used in logs to identify the backend
    fn service_name(&self) -> &str;
}

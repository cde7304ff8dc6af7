//! Mock translation service for testing
//!
//! This module provides a deterministic, network-free service for exercising
//! the controller without a GPU backend.
//!
//! # Example
//!
//! ```ignore
//! use manga_translate::service::{MockMode, MockTranslationService, TranslationService};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslationService::new(MockMode::Echo);
//!     let result = mock.translate(request).await.unwrap();
//!     assert_eq!(result.data(), &request_bytes);
//! }
//! ```

use crate::image::{MediaType, TranslationResult};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::translator::{TranslationRequest, TranslationService};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock service behaviours for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Return the uploaded page unchanged
    Echo,

    /// Always return the given PNG bytes
    Fixed(Bytes),

    /// Simulate a non-success response, optionally with an `error` message
    Reject { status: u16, message: Option<String> },

    /// Simulate a connection failure
    NetworkFailure(String),
}

/// Mock service that records every request it receives
#[derive(Debug)]
pub struct MockTranslationService {
    mode: MockMode,
    /// Optional simulated processing delay (in milliseconds)
    delay_ms: u64,
    calls: AtomicUsize,
    requests: Mutex<Vec<TranslationRequest>>,
}

impl MockTranslationService {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a mock whose every call takes `delay_ms` before answering
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of translate calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copies of every request received, oldest first
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().clone()
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn respond(&self, request: &TranslationRequest) -> ServiceResult<TranslationResult> {
        match &self.mode {
            MockMode::Echo => Ok(TranslationResult::new(
                "translated_manga.png",
                request.media_type,
                request.image.clone(),
            )),
            MockMode::Fixed(bytes) => Ok(TranslationResult::new(
                "translated_manga.png",
                MediaType::Png,
                bytes.clone(),
            )),
            MockMode::Reject { status, message } => Err(ServiceError::Rejected {
                status: *status,
                message: message.clone(),
            }),
            MockMode::NetworkFailure(msg) => Err(ServiceError::Network(msg.clone())),
        }
    }
}

#[async_trait]
impl TranslationService for MockTranslationService {
    async fn translate(&self, request: TranslationRequest) -> ServiceResult<TranslationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        self.apply_delay().await;

        self.respond(&request)
    }

    fn service_name(&self) -> &str {
        "Mock translation service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageRef;
    use crate::options::{FontStyle, TranslationConfig, TranslationMethod};

    fn request(bytes: &'static [u8]) -> TranslationRequest {
        let image = ImageRef::new("page.png", MediaType::Png, Bytes::from_static(bytes));
        TranslationRequest::new(
            &image,
            TranslationConfig::new(TranslationMethod::Bing, FontStyle::Mangati),
        )
    }

    #[tokio::test]
    async fn test_echo_returns_input() {
        let mock = MockTranslationService::new(MockMode::Echo);
        let result = mock.translate(request(b"page")).await.unwrap();
        assert_eq!(result.data().as_ref(), b"page");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_fixed_returns_payload() {
        let mock = MockTranslationService::new(MockMode::Fixed(Bytes::from_static(b"out")));
        let result = mock.translate(request(b"page")).await.unwrap();
        assert_eq!(result.data().as_ref(), b"out");
    }

    #[tokio::test]
    async fn test_reject_mode() {
        let mock = MockTranslationService::new(MockMode::Reject {
            status: 500,
            message: Some("model overloaded".to_string()),
        });
        let err = mock.translate(request(b"page")).await.unwrap_err();
        assert_eq!(err.user_message(), "model overloaded");
    }

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockTranslationService::new(MockMode::NetworkFailure("down".to_string()));
        let _ = mock.translate(request(b"one")).await;
        let _ = mock.translate(request(b"two")).await;
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].image.as_ref(), b"two");
        assert_eq!(requests[0].method, TranslationMethod::Bing);
        assert_eq!(requests[0].font, FontStyle::Mangati);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied() {
        let mock = MockTranslationService::with_delay(MockMode::Echo, 3_000);
        let start = tokio::time::Instant::now();
        mock.translate(request(b"page")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(3_000));
    }
}

//! Client-side workflow for translating manga pages
//!
//! The crate centres on the [`Controller`]: it takes an uploaded page through
//! validation, option selection, submission to a remote translation service
//! and back, publishing a [`Snapshot`] for renderers after every step.
//!
//! # Workflow Example
//!
//! ```ignore
//! use manga_translate::{Config, Controller, HttpTranslationService, UploadCandidate};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let service = HttpTranslationService::from_config(&config)?;
//!     let controller = Controller::new(Arc::new(service), &config);
//!
//!     // 1. Pick a page
//!     controller.acquire(UploadCandidate::from_path("page.png".as_ref()).await?)?;
//!
//!     // 2. Translate it
//!     controller.submit().await?;
//!
//!     // 3. Render the result
//!     let snapshot = controller.snapshot();
//!     println!("{}", snapshot.result.unwrap().data_uri());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod image;
pub mod options;
pub mod service;
pub mod surface;


// Re-export main types for convenient access
pub use config::{Config, ConfigError};
pub use controller::{Controller, ControllerError, ErrorKind, ErrorRecord, LifecycleState, Snapshot};
pub use image::{ImageRef, MediaType, TranslationResult, UploadCandidate};
pub use options::{ConfigOption, FontStyle, TranslationConfig, TranslationMethod};
pub use service::{
    HttpTranslationService, MockMode, MockTranslationService, ServiceError, TranslationService,
};
pub use surface::{Gesture, SampleGallery, Surface};

//! Translation service boundary
//!
//! The controller only ever talks to a [`TranslationService`]. The HTTP
//! implementation speaks the multipart contract of the GPU translation
//! server; the mock is deterministic and never touches the network.

pub mod error;
pub mod http;
pub mod mock;
pub mod translator;

pub use error::{GENERIC_FAILURE_MESSAGE, ServiceError, ServiceResult};
pub use http::{HttpTranslationService, OptionCatalog};
pub use mock::{MockMode, MockTranslationService};
pub use translator::{TranslationRequest, TranslationService, UPLOAD_FILE_NAME};

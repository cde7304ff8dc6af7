//! Submission controller
//!
//! Single source of truth for the translation workflow. It owns the selected
//! image, the option selection, the in-flight request, the last error and the
//! last result, and serializes every operation against the lifecycle:
//!
//! ```text
//! Idle --acquire(ok)--> Ready
//! Ready --acquire(ok)--> Ready
//! Ready|Succeeded|Failed --submit()--> Submitting
//! Submitting --success--> Succeeded
//! Submitting --failure--> Failed
//! Succeeded|Failed|Submitting --acquire(ok)--> Ready
//! any --clear()--> Idle
//! any --acquire(invalid type)--> unchanged, error recorded
//! ```
//!
//! Every submission gets a generation number. `clear()`, a successful
//! `acquire()` and a newer `submit()` all move the generation on, and a
//! response (or ticker tick) is only applied while its generation is still
//! current. The status ticker handle lives in the controller state, so
//! settling or superseding a request drops it and stops the ticks.
//!
//! Renderers observe the controller through [`Controller::subscribe`], which
//! yields a fresh [`Snapshot`] after every transition.
//!
//! # Example
//!
//! ```ignore
//! use manga_translate::controller::Controller;
//! use manga_translate::service::{MockMode, MockTranslationService};
//!
//! let controller = Controller::new(Arc::new(MockTranslationService::new(MockMode::Echo)), &config);
//! controller.acquire(candidate)?;
//! controller.submit().await?;
//! assert!(controller.snapshot().result.is_some());
//! ```

pub mod error;
pub mod state;
pub mod ticker;

pub use error::{ControllerError, ErrorKind, ErrorRecord, VALIDATION_MESSAGE};
pub use state::{LifecycleState, Snapshot};
pub use ticker::{StatusTicker, TickerHandle};

use crate::config::Config;
use crate::image::{ImageRef, UploadCandidate};
use crate::options::{ConfigOption, TranslationConfig};
use crate::service::{GENERIC_FAILURE_MESSAGE, TranslationRequest, TranslationService};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Inner {
    state: LifecycleState,
    image: Option<Arc<ImageRef>>,
    result: Option<Arc<ImageRef>>,
    error: Option<ErrorRecord>,
    configuration: TranslationConfig,
    /// Bumped whenever the in-flight submission (if any) stops being current
    generation: u64,
    status_index: Option<usize>,
    ticker: Option<TickerHandle>,
}

impl Inner {
    /// Forget the in-flight submission: later responses and ticks are ignored
    fn invalidate_submission(&mut self) {
        self.generation += 1;
        self.ticker = None;
        self.status_index = None;
    }
}

struct Shared {
    inner: Mutex<Inner>,
    updates: watch::Sender<Snapshot>,
    ticker: StatusTicker,
}

impl Shared {
    fn publish(&self, inner: &Inner) {
        let status = inner
            .status_index
            .and_then(|i| self.ticker.phrase(i))
            .map(str::to_string);

        self.updates.send_replace(Snapshot {
            state: inner.state,
            image: inner.image.clone(),
            result: inner.result.clone(),
            error: inner.error.clone(),
            status,
            configuration: inner.configuration,
        });
    }
}

/// Settles a submission whose `submit()` future is dropped before the
/// service answers, so the ticker stops and the lifecycle leaves `Submitting`
struct PendingSubmission {
    shared: Weak<Shared>,
    generation: u64,
    armed: bool,
}

impl PendingSubmission {
    fn new(shared: &Arc<Shared>, generation: u64) -> Self {
        Self {
            shared: Arc::downgrade(shared),
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut inner = shared.inner.lock();
        if inner.generation != self.generation || inner.state != LifecycleState::Submitting {
            return;
        }

        warn!("Submission {} was cancelled before the service answered", self.generation);
        inner.invalidate_submission();
        inner.error = Some(ErrorRecord::new(ErrorKind::Transport, GENERIC_FAILURE_MESSAGE));
        inner.state = LifecycleState::Failed;
        shared.publish(&inner);
    }
}

/// Handle to the submission controller; clones share the same state
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
    service: Arc<dyn TranslationService>,
}

impl Controller {
    pub fn new(service: Arc<dyn TranslationService>, config: &Config) -> Self {
        Self::with_ticker(
            service,
            config.initial_selection(),
            StatusTicker::new(config.phrases.clone(), config.ticker_period()),
        )
    }

    pub fn with_ticker(
        service: Arc<dyn TranslationService>,
        configuration: TranslationConfig,
        ticker: StatusTicker,
    ) -> Self {
        let inner = Inner {
            state: LifecycleState::Idle,
            image: None,
            result: None,
            error: None,
            configuration,
            generation: 0,
            status_index: None,
            ticker: None,
        };
        let (updates, _) = watch::channel(Snapshot {
            configuration,
            ..Snapshot::default()
        });

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                updates,
                ticker,
            }),
            service,
        }
    }

    /// Receive a new snapshot after every transition
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.updates.borrow().clone()
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.inner.lock().state
    }

    pub fn configuration(&self) -> TranslationConfig {
        self.shared.inner.lock().configuration
    }

    /// Validate an upload and make it the active image
    ///
    /// Rejected candidates leave the image and lifecycle state untouched and
    /// only record a validation error.
    pub fn acquire(&self, candidate: UploadCandidate) -> Result<(), ControllerError> {
        let Some(media_type) = candidate.accepted_type() else {
            warn!(
                "Rejected upload '{}' with media type '{}'",
                candidate.file_name, candidate.media_type
            );
            let mut inner = self.shared.inner.lock();
            inner.error = Some(ErrorRecord::validation());
            self.shared.publish(&inner);
            return Err(ControllerError::Validation {
                media_type: candidate.media_type,
            });
        };

        self.load(ImageRef::new(candidate.file_name, media_type, candidate.data));
        Ok(())
    }

    /// Make a trusted image active without media type validation
    pub fn load(&self, image: ImageRef) {
        let mut inner = self.shared.inner.lock();
        if inner.state == LifecycleState::Submitting {
            info!("New image replaces the page being translated");
            inner.invalidate_submission();
        }

        info!(
            "Loaded '{}' ({}, {} bytes)",
            image.file_name(),
            image.media_type(),
            image.len()
        );
        inner.image = Some(Arc::new(image));
        inner.result = None;
        inner.error = None;
        inner.state = LifecycleState::Ready;
        self.shared.publish(&inner);
    }

    /// Change one translation option
    ///
    /// A change made after a successful translation drops the now-stale
    /// result. A request already in flight keeps the options it was sent with.
    pub fn set_configuration(&self, option: ConfigOption) {
        let mut inner = self.shared.inner.lock();
        if !inner.configuration.apply(option) {
            return;
        }

        debug!("Configuration changed: {:?}", option);
        if inner.state == LifecycleState::Succeeded {
            inner.result = None;
            inner.state = LifecycleState::Ready;
        }
        self.shared.publish(&inner);
    }

    /// Drop the image, result and error and return to `Idle`
    ///
    /// Safe from any state. A request in flight keeps running but its
    /// outcome is discarded.
    pub fn clear(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state == LifecycleState::Submitting {
            info!("Clearing while a translation is in flight; its result will be discarded");
        }
        inner.invalidate_submission();
        inner.image = None;
        inner.result = None;
        inner.error = None;
        inner.state = LifecycleState::Idle;
        self.shared.publish(&inner);
    }

    /// Send the active image to the translation service and wait for it to settle
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The lifecycle reached `Succeeded`
    /// * `Err(ControllerError::Busy | NoImage)` - Rejected up front, nothing changed
    /// * `Err(ControllerError::Service | Transport)` - The lifecycle reached `Failed`
    /// * `Err(ControllerError::Superseded)` - A newer operation replaced this submission
    ///
    /// Dropping the returned future before it settles (a timeout, an aborted
    /// task) stops the ticker and moves the lifecycle to `Failed`.
    pub async fn submit(&self) -> Result<(), ControllerError> {
        let (generation, request) = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.can_submit() {
                if inner.state == LifecycleState::Submitting {
                    debug!("Submit ignored: a translation is already in flight");
                    return Err(ControllerError::Busy);
                }
                debug!("Submit ignored: nothing loaded");
                return Err(ControllerError::NoImage);
            }
            let Some(image) = inner.image.clone() else {
                debug!("Submit ignored: no image selected");
                return Err(ControllerError::NoImage);
            };

            inner.invalidate_submission();
            let generation = inner.generation;
            inner.state = LifecycleState::Submitting;
            inner.error = None;
            inner.result = None;
            inner.status_index = Some(0);
            inner.ticker = Some(self.start_ticker(generation));

            let request = TranslationRequest::new(&image, inner.configuration);
            info!(
                "Submitting '{}' to {} (method: {}, font: {})",
                image.file_name(),
                self.service.service_name(),
                request.method,
                request.font
            );
            self.shared.publish(&inner);
            (generation, request)
        };

        // Dropping this future before the service answers fails the submission
        let pending = PendingSubmission::new(&self.shared, generation);
        let outcome = self.service.translate(request).await;
        pending.disarm();

        let mut inner = self.shared.inner.lock();
        if inner.generation != generation {
            debug!("Discarding stale response for submission {}", generation);
            return Err(ControllerError::Superseded);
        }

        inner.ticker = None;
        inner.status_index = None;
        match outcome {
            Ok(result) => {
                info!("Translation succeeded ({} bytes)", result.len());
                inner.result = Some(Arc::new(result));
                inner.error = None;
                inner.state = LifecycleState::Succeeded;
                self.shared.publish(&inner);
                Ok(())
            }
            Err(err) => {
                warn!("Translation failed: {}", err);
                inner.error = Some(ErrorRecord::from(&err));
                inner.state = LifecycleState::Failed;
                self.shared.publish(&inner);
                Err(err.into())
            }
        }
    }

    /// Start the ticker for `generation`; ticks for any other generation are ignored
    fn start_ticker(&self, generation: u64) -> TickerHandle {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        self.shared.ticker.start(move |index| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut inner = shared.inner.lock();
            if inner.generation != generation || inner.state != LifecycleState::Submitting {
                return;
            }
            inner.status_index = Some(index);
            shared.publish(&inner);
        })
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("Controller")
            .field("state", &inner.state)
            .field("image", &inner.image)
            .field("generation", &inner.generation)
            .field("service", &self.service.service_name())
            .finish()
    }
}

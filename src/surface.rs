//! Presentation surface boundary
//!
//! Renderers hold no workflow state of their own. They forward user gestures
//! here and redraw from the controller's snapshots. The only local state is
//! whether a file is being dragged over the drop target.

use crate::controller::{Controller, ControllerError, Snapshot};
use crate::image::{ImageRef, MediaType, UploadCandidate};
use crate::options::ConfigOption;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// A bundled example page
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub name: &'static str,
    pub media_type: MediaType,
    pub data: &'static [u8],
}

impl Sample {
    pub fn to_image(&self) -> ImageRef {
        ImageRef::new(self.name, self.media_type, self.data)
    }
}

const BUNDLED_SAMPLES: [Sample; 3] = [
    Sample {
        name: "sample-1.png",
        media_type: MediaType::Png,
        data: include_bytes!("../assets/samples/sample-1.png"),
    },
    Sample {
        name: "sample-2.png",
        media_type: MediaType::Png,
        data: include_bytes!("../assets/samples/sample-2.png"),
    },
    Sample {
        name: "sample-3.png",
        media_type: MediaType::Png,
        data: include_bytes!("../assets/samples/sample-3.png"),
    },
];

/// Fixed set of trusted example pages
#[derive(Debug, Clone, Copy)]
pub struct SampleGallery {
    samples: &'static [Sample],
}

impl SampleGallery {
    pub fn bundled() -> Self {
        Self {
            samples: &BUNDLED_SAMPLES,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl Default for SampleGallery {
    fn default() -> Self {
        Self::bundled()
    }
}

/// User gestures a renderer forwards
#[derive(Debug, Clone)]
pub enum Gesture {
    FileDropped(UploadCandidate),
    FilePicked(UploadCandidate),
    OptionChanged(ConfigOption),
    SubmitClicked,
    ClearClicked,
    ExampleSelected(usize),
}

/// Glue between a renderer and the controller
#[derive(Debug)]
pub struct Surface {
    controller: Controller,
    gallery: SampleGallery,
    dragging: AtomicBool,
}

impl Surface {
    pub fn new(controller: Controller) -> Self {
        Self::with_gallery(controller, SampleGallery::bundled())
    }

    pub fn with_gallery(controller: Controller, gallery: SampleGallery) -> Self {
        Self {
            controller,
            gallery,
            dragging: AtomicBool::new(false),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn gallery(&self) -> &SampleGallery {
        &self.gallery
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.controller.subscribe()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.load(Ordering::Relaxed)
    }

    pub fn on_drag_enter(&self) {
        self.dragging.store(true, Ordering::Relaxed);
    }

    pub fn on_drag_leave(&self) {
        self.dragging.store(false, Ordering::Relaxed);
    }

    pub fn on_file_dropped(&self, file: UploadCandidate) -> Result<(), ControllerError> {
        self.on_drag_leave();
        self.controller.acquire(file)
    }

    pub fn on_file_picked(&self, file: UploadCandidate) -> Result<(), ControllerError> {
        self.controller.acquire(file)
    }

    pub fn on_option_changed(&self, option: ConfigOption) {
        self.controller.set_configuration(option);
    }

    pub async fn on_submit_clicked(&self) -> Result<(), ControllerError> {
        self.controller.submit().await
    }

    pub fn on_clear_clicked(&self) {
        self.controller.clear();
    }

    /// Load a bundled sample; samples are trusted and skip type validation
    pub fn on_example_selected(&self, index: usize) -> Result<(), ControllerError> {
        let sample = self
            .gallery
            .get(index)
            .ok_or(ControllerError::UnknownSample(index))?;
        debug!("Loading sample {} ({})", index, sample.name);
        self.controller.load(sample.to_image());
        Ok(())
    }

    pub async fn dispatch(&self, gesture: Gesture) -> Result<(), ControllerError> {
        match gesture {
            Gesture::FileDropped(file) => self.on_file_dropped(file),
            Gesture::FilePicked(file) => self.on_file_picked(file),
            Gesture::OptionChanged(option) => {
                self.on_option_changed(option);
                Ok(())
            }
            Gesture::SubmitClicked => self.on_submit_clicked().await,
            Gesture::ClearClicked => {
                self.on_clear_clicked();
                Ok(())
            }
            Gesture::ExampleSelected(index) => self.on_example_selected(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::LifecycleState;
    use crate::options::TranslationMethod;
    use crate::service::{MockMode, MockTranslationService};
    use std::sync::Arc;

    fn surface() -> Surface {
        let mock = Arc::new(MockTranslationService::new(MockMode::Echo));
        Surface::new(Controller::new(mock, &Config::default()))
    }

    #[test]
    fn test_bundled_samples_are_png() {
        let gallery = SampleGallery::bundled();
        assert_eq!(gallery.len(), 3);
        for sample in gallery.iter() {
            assert_eq!(infer::get(sample.data).map(|k| k.mime_type()), Some("image/png"));
        }
    }

    #[tokio::test]
    async fn test_example_selected_loads_sample() {
        let surface = surface();
        surface.dispatch(Gesture::ExampleSelected(1)).await.unwrap();
        let snap = surface.controller().snapshot();
        assert_eq!(snap.state, LifecycleState::Ready);
        assert_eq!(snap.image.unwrap().file_name(), "sample-2.png");
    }

    #[tokio::test]
    async fn test_example_out_of_range() {
        let surface = surface();
        let err = surface.dispatch(Gesture::ExampleSelected(7)).await.unwrap_err();
        assert_eq!(err, ControllerError::UnknownSample(7));
        assert_eq!(surface.controller().state(), LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_drop_clears_drag_flag() {
        let surface = surface();
        surface.on_drag_enter();
        assert!(surface.is_dragging());
        let file = UploadCandidate::new("page.png", "image/png", surface.gallery().samples[0].data);
        surface.dispatch(Gesture::FileDropped(file)).await.unwrap();
        assert!(!surface.is_dragging());
        assert_eq!(surface.controller().state(), LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_full_gesture_flow() {
        let surface = surface();
        surface
            .dispatch(Gesture::OptionChanged(ConfigOption::Method(TranslationMethod::Hf)))
            .await
            .unwrap();
        surface.dispatch(Gesture::ExampleSelected(0)).await.unwrap();
        surface.dispatch(Gesture::SubmitClicked).await.unwrap();
        assert_eq!(surface.controller().state(), LifecycleState::Succeeded);

        surface.dispatch(Gesture::ClearClicked).await.unwrap();
        let snap = surface.controller().snapshot();
        assert_eq!(snap.state, LifecycleState::Idle);
        assert_eq!(snap.configuration.method, TranslationMethod::Hf);
    }
}

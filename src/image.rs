//! Upload candidates and renderable images
//!
//! An [`UploadCandidate`] is whatever file the user offered, together with the
//! media type it declares. Only PNG and JPEG candidates become an [`ImageRef`].
//! The same type carries the translated page the service sends back.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Fallback declared type for files whose content isn't recognised
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Media types accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Png,
    Jpeg,
}

impl MediaType {
    /// Map a declared MIME type onto the accepted set
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        if essence.eq_ignore_ascii_case("image/png") {
            Some(MediaType::Png)
        } else if essence.eq_ignore_ascii_case("image/jpeg") {
            Some(MediaType::Jpeg)
        } else {
            None
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Png => "png",
            MediaType::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Raw file payload offered by the user, not yet validated
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub file_name: String,
    /// Declared MIME type, as a browser would report `file.type`
    pub media_type: String,
    pub data: Bytes,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Build a candidate whose declared type is sniffed from the content signature
    pub fn sniffed(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let media_type = infer::get(&data)
            .map(|kind| kind.mime_type())
            .unwrap_or(OCTET_STREAM);
        Self::new(file_name, media_type, data)
    }

    /// Read a file from disk into a sniffed candidate
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::sniffed(file_name, data))
    }

    /// The accepted media type this candidate declares, if any
    pub fn accepted_type(&self) -> Option<MediaType> {
        MediaType::from_mime(&self.media_type)
    }
}

/// A validated image held by the controller
///
/// Used both for the active source page and for the translated result.
/// The data URI is rendered lazily and lives exactly as long as the image,
/// so dropping the last `Arc<ImageRef>` releases both.
pub struct ImageRef {
    file_name: String,
    media_type: MediaType,
    data: Bytes,
    data_uri: OnceLock<String>,
}

/// The decoded image returned by a successful translation
pub type TranslationResult = ImageRef;

impl ImageRef {
    pub fn new(file_name: impl Into<String>, media_type: MediaType, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            data: data.into(),
            data_uri: OnceLock::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `data:` URI suitable for an `<img src>`
    pub fn data_uri(&self) -> &str {
        self.data_uri.get_or_init(|| {
            format!(
                "data:{};base64,{}",
                self.media_type.mime(),
                STANDARD.encode(&self.data)
            )
        })
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PartialEq for ImageRef {
    fn eq(&self, other: &Self) -> bool {
        self.media_type == other.media_type && self.data == other.data
    }
}

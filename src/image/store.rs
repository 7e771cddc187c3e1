//! The `ImageStore` trait: the seam between handlers and the hosted
//! image service.

use async_trait::async_trait;

use crate::error::ImageError;

/// Logical folder on the image service under which all covers live.
pub const IMAGE_FOLDER: &str = "library";

/// A successfully uploaded image.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Public URL of the hosted asset
    pub url: String,
}

/// Upload/delete operations against the hosted image service.
///
/// `data` is the raw payload the client sent: either a base64 data
/// string or a URL the service fetches server-side. The payload is
/// opaque to this crate.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Upload an image under `file_name` in the [`IMAGE_FOLDER`] folder
    /// and return its public URL.
    async fn upload(&self, file_name: &str, data: &str) -> Result<UploadedImage, ImageError>;

    /// Delete an asset by its file id (see [`file_id_from_url`]).
    async fn delete(&self, file_id: &str) -> Result<(), ImageError>;
}

/// Derive the image service file id from a stored asset URL.
///
/// The id is the URL's trailing path segment with its extension
/// stripped, under the fixed folder: `https://…/library/dune-cover.jpg`
/// becomes `library/dune-cover`. Returns `None` for URLs with an empty
/// trailing segment.
pub fn file_id_from_url(url: &str) -> Option<String> {
    let file_name = url.rsplit('/').next()?;
    if file_name.is_empty() {
        return None;
    }
    let stem = file_name.split('.').next().unwrap_or(file_name);
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}/{}", IMAGE_FOLDER, stem))
}

/// File name for a book's cover image, derived from its title.
pub fn cover_file_name(title: &str) -> String {
    format!("{}-cover.jpg", title)
}

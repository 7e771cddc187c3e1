//! Image storage layer.
//!
//! Cover images live on an external hosted image service, reached
//! through the [`ImageStore`] trait. Handlers upload on create, replace
//! on image update, and delete on record delete; delete failures are
//! logged and never surfaced to clients.

mod client;
mod store;

pub use client::HostedImageStore;
pub use store::{cover_file_name, file_id_from_url, ImageStore, UploadedImage, IMAGE_FOLDER};

//! Media kind classification.

use std::path::Path;

/// Kind of media the service stores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum MediaKind {
    /// Still images
    #[display("photo")]
    Photo,
    /// Video content
    #[display("video")]
    Video,
}

const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "avif", "bmp", "tif", "tiff", "ico",
    "dng", "cr2", "cr3", "nef", "arw", "orf", "rw2", "raf", "srw",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "3gp", "3g2", "avi", "mkv", "webm", "wmv", "mpg", "mpeg", "mts", "m2ts",
    "asf", "flv", "mod", "tod",
];

impl MediaKind {
    /// Classify a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Photo)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Decode the media type field of a library listing.
    pub fn from_wire(value: u64) -> Option<Self> {
        match value {
            1 => Some(MediaKind::Photo),
            2 => Some(MediaKind::Video),
            _ => None,
        }
    }
}

//! The fixed category set and its extension table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad file class a file is sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Images,
    Documents,
    Videos,
    Audio,
    Archives,
    Code,
    Other,
}

/// Extensions (lowercase, no dot) that map to each category.
///
/// An extension appears at most once across the whole table.
pub const EXTENSION_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &[
            "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "tif", "tiff", "ico", "heic",
        ],
    ),
    (
        Category::Documents,
        &[
            "pdf", "doc", "docx", "txt", "xlsx", "xls", "ppt", "pptx", "rtf", "odt", "md", "csv",
        ],
    ),
    (
        Category::Videos,
        &["mp4", "avi", "mkv", "mov", "wmv", "webm", "flv", "m4v"],
    ),
    (Category::Audio, &["mp3", "wav", "flac", "m4a", "ogg", "aac"]),
    (
        Category::Archives,
        &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"],
    ),
    (
        Category::Code,
        &[
            "py", "js", "ts", "html", "css", "java", "cpp", "c", "h", "rs", "go", "sh",
        ],
    ),
];

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 7] = [
        Category::Images,
        Category::Documents,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Code,
        Category::Other,
    ];

    /// Look up an extension in the table. Case-insensitive; a leading dot is ignored.
    pub fn from_extension(ext: &str) -> Option<Category> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            return None;
        }
        EXTENSION_TABLE
            .iter()
            .find(|(_, extensions)| extensions.contains(&ext.as_str()))
            .map(|(category, _)| *category)
    }

    /// Name of the folder files of this category are moved into
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

//! # Classifier Module
//!
//! Decides which [`Category`] a file belongs to.
//!
//! ## Strategy
//! 1. Look the lowercase extension up in [`EXTENSION_TABLE`]
//! 2. Read the first [`SIGNATURE_LEN`] bytes and match them against the
//!    internal signature table
//! 3. A signature wins over a disagreeing extension. Container signatures
//!    (ZIP) defer to an extension that names a format built on top of them
//!    (docx, xlsx, ...)
//! 4. Anything unresolved is [`Category::Other`]
//!
//! Classification never fails: an unreadable file is classified by its
//! extension alone.

mod category;
mod signature;

pub use category::{Category, EXTENSION_TABLE};
pub use signature::{detect, SignatureMatch, SIGNATURE_LEN};

use crate::error::ClassificationError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How a classification was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// The file header matched a known signature
    Signature(&'static str),
    /// Only the extension was recognized
    Extension,
    /// Neither signature nor extension was recognized
    Fallback,
}

/// Result of classifying one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub basis: Basis,
}

/// Maps files to categories using extension and magic-number signature.
///
/// Stateless and cheap to copy; safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// Category of the file at `path`
    pub fn classify(&self, path: &Path) -> Category {
        self.classify_detailed(path).category
    }

    /// Category of the file at `path`, together with how it was decided
    pub fn classify_detailed(&self, path: &Path) -> Classification {
        let extension = extension_of(path);

        let by_signature = match read_header(path) {
            Ok(header) => detect(&header),
            Err(e) => {
                tracing::debug!(error = %e, "signature check skipped");
                None
            }
        };

        Self::decide(extension.as_deref(), by_signature)
    }

    /// Combine the two lookups.
    fn decide(extension: Option<&str>, by_signature: Option<SignatureMatch>) -> Classification {
        let by_extension = extension.and_then(Category::from_extension);
        let refines = |sig: &SignatureMatch| {
            extension.is_some_and(|ext| sig.refined_by.iter().any(|r| *r == ext))
        };

        match (by_signature, by_extension) {
            (Some(sig), Some(ext)) if refines(&sig) => Classification {
                category: ext,
                basis: Basis::Extension,
            },
            (Some(sig), _) => Classification {
                category: sig.category,
                basis: Basis::Signature(sig.format),
            },
            (None, Some(ext)) => Classification {
                category: ext,
                basis: Basis::Extension,
            },
            (None, None) => Classification {
                category: Category::Other,
                basis: Basis::Fallback,
            },
        }
    }
}

/// Lowercase extension without the dot, if the file name has one
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

/// Read up to [`SIGNATURE_LEN`] bytes from the start of the file.
///
/// The handle is dropped before returning.
fn read_header(path: &Path) -> Result<Vec<u8>, ClassificationError> {
    let to_error = |source| ClassificationError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(to_error)?;
    let mut header = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64)
        .read_to_end(&mut header)
        .map_err(to_error)?;
    Ok(header)
}

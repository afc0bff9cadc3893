//! # Mover Module
//!
//! Moves a file into a folder without ever overwriting anything there.
//!
//! ## Behavior
//! - Name collisions get a numeric suffix before the extension
//!   (`a.txt` -> `a_1.txt` -> `a_2.txt` ...)
//! - The final name is claimed by creating an empty placeholder with
//!   `create_new` before anything is moved, so concurrent moves into the
//!   same folder never end up on the same name
//! - Same volume: a single `rename` over the placeholder
//! - Different volumes: copy, verify the size, then delete the source.
//!   This is not atomic; if the source cannot be deleted afterwards the
//!   result is reported as [`MoveError::PartialMove`]
//!
//! Except for a partial move, a failed move leaves the source untouched.

use crate::error::MoveError;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Result of a successful move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Where the file ended up
    pub destination: PathBuf,
    /// The file was copied across volumes rather than renamed
    pub cross_volume: bool,
}

/// First free path for `file_name` inside `dir`.
///
/// `is_taken` decides whether a candidate is occupied, which lets the
/// preview check against planned files as well as the disk. Nothing is
/// reserved; [`move_file`] claims its name atomically instead.
pub fn unique_destination(
    dir: &Path,
    file_name: impl AsRef<OsStr>,
    is_taken: impl Fn(&Path) -> bool,
) -> PathBuf {
    let file_name = file_name.as_ref();
    (0u64..)
        .map(|n| candidate(dir, file_name, n))
        .find(|path| !is_taken(path))
        .unwrap_or_else(|| dir.join(file_name))
}

/// `dir/file_name` for `n == 0`, otherwise `dir/stem_n.ext`
fn candidate(dir: &Path, file_name: &OsStr, n: u64) -> PathBuf {
    if n == 0 {
        return dir.join(file_name);
    }

    let name_path = Path::new(file_name);
    let stem = name_path.file_stem().unwrap_or(file_name);
    let mut new_name = OsString::from(stem);
    new_name.push(format!("_{}", n));
    if let Some(ext) = name_path.extension() {
        new_name.push(".");
        new_name.push(ext);
    }
    dir.join(new_name)
}

/// Reserve the first free name in `dir` by creating an empty file there.
///
/// `create_new` fails if anything already sits at the path, so two callers
/// can never claim the same name.
fn claim_destination(dir: &Path, file_name: &OsStr) -> io::Result<PathBuf> {
    for n in 0u64.. {
        let path = candidate(dir, file_name, n);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::other("no free file name left"))
}

/// Move `source` into `dest_dir`, renaming on collision.
///
/// `dest_dir` must already exist.
pub fn move_file(source: &Path, dest_dir: &Path) -> Result<MoveOutcome, MoveError> {
    let file_name = source.file_name().ok_or_else(|| MoveError::InvalidSourceName {
        path: source.to_path_buf(),
    })?;

    if fs::symlink_metadata(source).is_err() {
        return Err(MoveError::SourceVanished {
            path: source.to_path_buf(),
        });
    }

    let destination = claim_destination(dest_dir, file_name)
        .map_err(|e| describe_failure(source, dest_dir, e))?;

    match fs::rename(source, &destination) {
        Ok(()) => Ok(MoveOutcome {
            destination,
            cross_volume: false,
        }),
        Err(e) if is_cross_device(&e) => {
            tracing::debug!(
                src = %source.display(),
                dest = %destination.display(),
                "rename crosses volumes, copying instead"
            );
            copy_then_delete(source, &destination)?;
            Ok(MoveOutcome {
                destination,
                cross_volume: true,
            })
        }
        Err(e) => {
            let _ = fs::remove_file(&destination);
            Err(describe_failure(source, dest_dir, e))
        }
    }
}

/// Turn a failed rename or copy into the most specific error.
fn describe_failure(source: &Path, dest_dir: &Path, error: io::Error) -> MoveError {
    if !source.exists() {
        return MoveError::SourceVanished {
            path: source.to_path_buf(),
        };
    }
    match error.kind() {
        io::ErrorKind::PermissionDenied => MoveError::DestinationNotWritable {
            path: dest_dir.to_path_buf(),
            source: error,
        },
        _ => MoveError::Io {
            path: source.to_path_buf(),
            source: error,
        },
    }
}

fn is_cross_device(error: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: Option<i32> = Some(18); // EXDEV
    #[cfg(windows)]
    const CROSS_DEVICE: Option<i32> = Some(17); // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: Option<i32> = None;

    CROSS_DEVICE.is_some() && error.raw_os_error() == CROSS_DEVICE
}

/// Copy into the claimed placeholder at `destination`, verify, then
/// remove the source.
///
/// Any failure before the source is removed deletes the placeholder again,
/// leaving the source as the only copy.
fn copy_then_delete(source: &Path, destination: &Path) -> Result<(), MoveError> {
    let dest_dir = destination.parent().unwrap_or(Path::new(""));
    let release = |error: MoveError| {
        let _ = fs::remove_file(destination);
        error
    };

    let source_meta = fs::metadata(source)
        .map_err(|e| release(describe_failure(source, dest_dir, e)))?;

    let copied = (|| -> io::Result<u64> {
        let mut reader = File::open(source)?;
        let mut writer = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(destination)?;
        let written = io::copy(&mut reader, &mut writer)?;
        writer.sync_all()?;
        writer.set_permissions(source_meta.permissions())?;
        Ok(written)
    })();

    match copied {
        Ok(written) if written == source_meta.len() => {}
        Ok(written) => {
            return Err(release(MoveError::Io {
                path: source.to_path_buf(),
                source: io::Error::other(format!(
                    "copy verification failed: source {} bytes, copied {} bytes",
                    source_meta.len(),
                    written
                )),
            }));
        }
        Err(e) => return Err(release(describe_failure(source, dest_dir, e))),
    }

    fs::remove_file(source).map_err(|e| {
        tracing::warn!(
            src = %source.display(),
            dest = %destination.display(),
            error = %e,
            "copied across volumes but could not remove the original"
        );
        MoveError::PartialMove {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            reason: e.to_string(),
        }
    })
}

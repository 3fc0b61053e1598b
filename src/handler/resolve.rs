//! Path resolution module
//!
//! Maps request paths onto the serve root and refuses anything that would
//! leave it, whether through `..`, percent-encoding or symlinks.

use std::io;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::error::ServeError;

/// The single directory all served paths are confined to
#[derive(Debug, Clone)]
pub struct ServeRoot {
    /// Canonical absolute path
    dir: PathBuf,
}

/// What a request path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Missing,
    Directory,
    File { size: u64 },
    /// Sockets, FIFOs, devices
    Other,
}

/// Absolute filesystem path derived from a request path, plus its stat result
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    path: PathBuf,
    kind: TargetKind,
}

impl ServeRoot {
    /// Canonicalize `dir` and make sure it is a directory.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().canonicalize()?;
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("serve root is not a directory: {}", dir.display()),
            ));
        }
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Resolve a request path (as found in the request line, without query)
    /// to a target inside the root.
    ///
    /// A missing file is not an error here; the caller decides what to do
    /// with `exists() == false`.
    pub async fn resolve(&self, request_path: &str) -> Result<ResolvedTarget, ServeError> {
        let relative = normalize_request_path(request_path)?;
        let candidate = self.dir.join(&relative);

        let metadata = match fs::metadata(&candidate).await {
            Ok(m) => m,
            Err(e) if is_missing(&e) => {
                return Ok(ResolvedTarget {
                    path: candidate,
                    kind: TargetKind::Missing,
                });
            }
            Err(e) => return Err(ServeError::Io(e)),
        };

        // Lexical checks cannot see symlinks, so confirm the real location too
        let canonical = fs::canonicalize(&candidate)
            .await
            .map_err(ServeError::from_io)?;
        if !canonical.starts_with(&self.dir) {
            return Err(ServeError::PathEscape);
        }

        let kind = if metadata.is_file() {
            TargetKind::File {
                size: metadata.len(),
            }
        } else if metadata.is_dir() {
            TargetKind::Directory
        } else {
            TargetKind::Other
        };

        Ok(ResolvedTarget {
            path: canonical,
            kind,
        })
    }
}

impl ResolvedTarget {
    pub const fn new(path: PathBuf, kind: TargetKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn kind(&self) -> TargetKind {
        self.kind
    }

    pub const fn exists(&self) -> bool {
        !matches!(self.kind, TargetKind::Missing)
    }

    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, TargetKind::Directory)
    }

    pub const fn is_file(&self) -> bool {
        matches!(self.kind, TargetKind::File { .. })
    }

    /// Size in bytes, only for regular files
    pub const fn size(&self) -> Option<u64> {
        match self.kind {
            TargetKind::File { size } => Some(size),
            _ => None,
        }
    }

    /// Replace the stat-time size with the size of the handle actually opened.
    #[must_use]
    pub fn with_size(self, size: u64) -> Self {
        Self {
            path: self.path,
            kind: TargetKind::File { size },
        }
    }
}

/// Percent-decode and normalize a request path into a root-relative path.
///
/// Empty and `.` segments are dropped, `..` pops a segment. Climbing above the
/// root, or a segment that is not a plain file name, is a `PathEscape`.
pub fn normalize_request_path(request_path: &str) -> Result<PathBuf, ServeError> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| ServeError::NotFound)?;
    if decoded.contains('\0') {
        return Err(ServeError::NotFound);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ServeError::PathEscape);
                }
            }
            name => {
                let mut components = Path::new(name).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(name),
                    _ => return Err(ServeError::PathEscape),
                }
            }
        }
    }

    Ok(segments.iter().collect())
}

fn is_missing(err: &io::Error) -> bool {
    // ENOTDIR: a path component is a regular file
    err.kind() == io::ErrorKind::NotFound || err.raw_os_error() == Some(20)
}

//! Error translation boundary.
//!
//! The single place where host failures cross into the runtime's
//! error-raising convention. Every façade call funnels its host result
//! through here; the raised message is the only thing scripts ever see.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Failure kinds observed at the boundary. Scripts receive only the
/// rendered message; the taxonomy exists so each branch renders its own way
/// and nothing else leaks across.
#[derive(Debug, Error)]
pub enum HostFailure {
    /// Resource exhaustion reported by the host allocator.
    #[error("{0}")]
    Alloc(String),
    /// A host filesystem operation failed; carries the host diagnostic and
    /// the offending path(s).
    #[error("filesystem error: {verb}: {detail}{paths}")]
    Filesystem {
        verb: &'static str,
        detail: String,
        paths: String,
    },
    /// Catch-all for failures outside the io taxonomy; deliberately lossy.
    /// No current host call constructs it.
    #[allow(dead_code)]
    #[error("filesystem error")]
    Unknown,
}

impl HostFailure {
    pub fn raise(self) -> String {
        self.to_string()
    }
}

fn classify(verb: &'static str, paths: String, err: io::Error) -> HostFailure {
    if err.kind() == io::ErrorKind::OutOfMemory {
        return HostFailure::Alloc(err.to_string());
    }
    HostFailure::Filesystem {
        verb,
        detail: err.to_string(),
        paths,
    }
}

/// Translate a host result taken against one path.
pub fn fs1<T>(verb: &'static str, p: &Path, r: io::Result<T>) -> Result<T, String> {
    r.map_err(|e| classify(verb, format!(" [{}]", p.display()), e).raise())
}

/// Translate a host result taken against a source/destination pair.
pub fn fs2<T>(verb: &'static str, p1: &Path, p2: &Path, r: io::Result<T>) -> Result<T, String> {
    r.map_err(|e| {
        classify(
            verb,
            format!(" [{}] [{}]", p1.display(), p2.display()),
            e,
        )
        .raise()
    })
}

/// Translate a host result with no path context (e.g. cursor advancement
/// after the originating path is gone).
pub fn fs0<T>(verb: &'static str, r: io::Result<T>) -> Result<T, String> {
    r.map_err(|e| classify(verb, String::new(), e).raise())
}

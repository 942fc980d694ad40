//! Decode requests handed out by the engine and their outcomes.

use crate::decode::{decode_image, Bitmap, DecodeError};
use crate::storage::Storage;

/// A pending fetch-and-decode of one source, tagged with its generation.
///
/// Requests are plain data and can be moved to a worker thread; only the
/// outcome whose generation matches the engine's current one is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    generation: u64,
    path: String,
}

/// The result of running a [`DecodeRequest`].
#[derive(Debug)]
pub struct DecodeOutcome {
    pub generation: u64,
    pub path: String,
    pub result: Result<Bitmap, DecodeError>,
}

impl DecodeRequest {
    pub(crate) fn new(generation: u64, path: impl Into<String>) -> Self {
        Self {
            generation,
            path: path.into(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read the source through `storage` and decode it.
    pub fn run<S: Storage + ?Sized>(self, storage: &S) -> DecodeOutcome {
        match storage.read(&self.path) {
            Ok(bytes) => self.decode_bytes(&bytes),
            Err(e) => self.fail(DecodeError::IoError(e.to_string())),
        }
    }

    /// Decode bytes the host fetched itself.
    pub fn decode_bytes(self, bytes: &[u8]) -> DecodeOutcome {
        let result = decode_image(bytes);
        self.finish(result)
    }

    /// Report that the source could not be obtained.
    pub fn fail(self, error: DecodeError) -> DecodeOutcome {
        self.finish(Err(error))
    }

    fn finish(self, result: Result<Bitmap, DecodeError>) -> DecodeOutcome {
        DecodeOutcome {
            generation: self.generation,
            path: self.path,
            result,
        }
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use web_time::Instant;

use crate::backend::{DecodeError, DecodeRenderBackend, DecodedFrame};

pub type DecodeResult = Result<Arc<DecodedFrame>, DecodeError>;

/// A decode that any number of waiters can await. Only the first poll
/// reaches the backend.
pub type DecodeFuture = Shared<BoxFuture<'static, DecodeResult>>;

/// Memoizing front of a backend's decoder, scoped to one viewer.
///
/// Concurrent requests for the same locator share one in-flight decode.
/// Failed decodes are not remembered, so asking again retries.
pub struct DecodeEngine<B> {
    backend: Arc<B>,
    entries: Mutex<HashMap<String, DecodeFuture>>,
}

impl<B: DecodeRenderBackend> DecodeEngine<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get the decode for `locator`, starting one if none is cached.
    pub fn decode(&self, locator: &str) -> DecodeFuture {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(locator) {
            match entry.peek() {
                Some(Err(_)) => {
                    log::debug!("Retrying previously failed decode of {locator}");
                }
                _ => return entry.clone(),
            }
        }

        let backend = Arc::clone(&self.backend);
        let owned = locator.to_owned();
        let future = async move {
            let started = Instant::now();
            let result = backend.decode_frame(&owned).await.map(Arc::new);
            match &result {
                Ok(frame) => log::debug!(
                    "Decoded {owned} ({}x{}) in {:?}",
                    frame.width(),
                    frame.height(),
                    started.elapsed()
                ),
                Err(err) => log::error!("Decode failed: {err}"),
            }
            result
        }
        .boxed()
        .shared();

        entries.insert(locator.to_owned(), future.clone());
        future
    }

    /// Whether a successful decode for `locator` is cached.
    pub fn is_cached(&self, locator: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(entries.get(locator).and_then(Shared::peek), Some(Ok(_)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached and in-flight entry. In-flight decodes already handed
    /// out keep running for their holders.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

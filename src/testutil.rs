//! Shared test helpers for in-crate unit tests.

use std::sync::Arc;

use crate::encoder::MemoryBlob;
use crate::storage::Repository;
use crate::substrate::MemoryStore;

/// A repository over a fresh in-memory substrate. The store is returned too
/// so tests can tamper with slots directly.
pub fn test_repository() -> (Arc<MemoryStore>, Repository) {
    let store = Arc::new(MemoryStore::new());
    let repo = Repository::new(store.clone());
    (store, repo)
}

/// Deterministic, non-text content containing NUL bytes
pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

pub fn pdf(name: &str, len: usize) -> MemoryBlob {
    MemoryBlob::new(name, "application/pdf", sample_bytes(len))
}

pub fn png(name: &str, len: usize) -> MemoryBlob {
    MemoryBlob::new(name, "image/png", sample_bytes(len))
}

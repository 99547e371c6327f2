//! Token-gated resources and the blob handles they hand out

pub mod blob;
pub mod gated;

pub use blob::{Blob, BlobHandle, BlobStore, BlobUrl};
pub use gated::{DependentFetch, GatedResource, Phase};

/// A cached value that may own something outside the Rust heap's reach
///
/// `release` is called exactly once when the value is evicted from a
/// resource cache (key change, invalidation, teardown). The default does
/// nothing, which suits plain data.
pub trait Release {
    fn release(&self) {}
}

impl Release for BlobHandle {
    fn release(&self) {
        BlobHandle::release(self)
    }
}

//! Language model cache.
//!
//! - [`AssetStore`] owns the on-disk files (`<cache_dir>/<id>.traineddata`).
//! - [`ModelFetcher`] fills it from the remote host, once per model.
//!
//! A non-empty file is trusted as a valid model: there is no checksum and no
//! expiry. An interrupted download never lands under the final name.

mod fetcher;
mod store;

pub use fetcher::{EnsureOutcome, ModelFetcher};
pub use store::AssetStore;

//! # walk-bias
//!
//! Second-order (node2vec) reweighting of random-walk transitions.
//!
//! A walker that just crossed `src -> dst` is about to leave `dst`. Given the
//! sorted neighbor list of `dst` (`destinations`), the sorted neighbor list of
//! the node it came from (`previous_destinations`), and the per-edge weights of
//! `dst` (`transition`), the kernel rescales `transition` in place:
//! - **return** (the candidate is `src` or `dst`): `× return_weight`
//!   (combined kernel only; the explore-only kernel leaves it alone),
//! - **close** (the candidate is also a previous neighbor): unchanged,
//! - **far** (everything else): `× explore_weight`.
//!
//! Public invariants (must not drift):
//! - **No allocation, no normalization**: weights are scaled in place and are
//!   not renormalized; sampling is the caller's job.
//! - **One multiply per entry**: each weight is touched at most once, so all
//!   backends agree bit-for-bit with the scalar merge in [`merge`].
//! - **Bounds**: no backend reads past either input slice, whatever the input.
//!
//! Swappable (allowed to change without breaking the contract):
//! - which [`Backend`] is picked at runtime
//! - lane widths

pub mod batch;
pub mod kernel;
pub mod merge;
#[cfg(feature = "simd")]
pub mod simd;
pub mod weights;

pub use batch::{Batch, Portable};
pub use kernel::{
    backend, try_update_explore_return_weight, try_update_explore_weight,
    update_explore_return_weight, update_explore_weight, Backend, PORTABLE_LANES,
};
pub use weights::WalkWeights;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("length mismatch: transition has {transition} entries, destinations has {destinations}")]
    LengthMismatch {
        transition: usize,
        destinations: usize,
    },
    #[error("{list} is not strictly ascending at index {index}")]
    NotStrictlyAscending { list: &'static str, index: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Public entry points and backend dispatch.

use crate::batch::{self, Portable};
use crate::{merge, Error, Result};
use std::fmt;
use std::sync::OnceLock;

/// Lane width of the pure-Rust batched backend.
pub const PORTABLE_LANES: usize = 8;

/// Which implementation the dispatching entry points run.
///
/// Every backend produces bit-identical output to [`crate::merge`].
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    /// The reference two-cursor merge.
    Scalar,
    /// [`Portable`] lanes of width [`PORTABLE_LANES`].
    Portable,
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    Avx2(crate::simd::Avx2),
    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    Neon(crate::simd::Neon),
}

impl Backend {
    /// Best backend for this CPU and feature set.
    pub fn detect() -> Self {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if let Some(lanes) = crate::simd::Avx2::detect() {
                return Backend::Avx2(lanes);
            }
        }
        #[cfg(all(feature = "simd", target_arch = "aarch64"))]
        {
            if let Some(lanes) = crate::simd::Neon::detect() {
                return Backend::Neon(lanes);
            }
        }
        if cfg!(feature = "simd") {
            Backend::Portable
        } else {
            Backend::Scalar
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Portable => "portable",
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Backend::Avx2(_) => "avx2",
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Backend::Neon(_) => "neon",
        }
    }

    /// Elements handled per batched step (1 for the scalar merge).
    pub fn lanes(self) -> usize {
        match self {
            Backend::Scalar => 1,
            Backend::Portable => PORTABLE_LANES,
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Backend::Avx2(_) => 8,
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Backend::Neon(_) => 4,
        }
    }

    /// Run the explore-only kernel on this backend.
    pub fn update_explore_weight(
        self,
        transition: &mut [f32],
        destinations: &[u32],
        previous_destinations: &[u32],
        explore_weight: f32,
        src: u32,
        dst: u32,
    ) {
        self.run(
            transition,
            destinations,
            previous_destinations,
            explore_weight,
            None,
            src,
            dst,
        );
    }

    /// Run the explore+return kernel on this backend.
    #[allow(clippy::too_many_arguments)]
    pub fn update_explore_return_weight(
        self,
        transition: &mut [f32],
        destinations: &[u32],
        previous_destinations: &[u32],
        explore_weight: f32,
        return_weight: f32,
        src: u32,
        dst: u32,
    ) {
        self.run(
            transition,
            destinations,
            previous_destinations,
            explore_weight,
            Some(return_weight),
            src,
            dst,
        );
    }

    #[allow(clippy::too_many_arguments)]
    #[inline]
    fn run(
        self,
        transition: &mut [f32],
        destinations: &[u32],
        previous_destinations: &[u32],
        explore_weight: f32,
        return_weight: Option<f32>,
        src: u32,
        dst: u32,
    ) {
        match (self, return_weight) {
            (Backend::Scalar, None) => merge::update_explore_weight(
                transition,
                destinations,
                previous_destinations,
                explore_weight,
                src,
                dst,
            ),
            (Backend::Scalar, Some(r)) => merge::update_explore_return_weight(
                transition,
                destinations,
                previous_destinations,
                explore_weight,
                r,
                src,
                dst,
            ),
            (Backend::Portable, r) => batch::merge(
                Portable::<PORTABLE_LANES>,
                transition,
                destinations,
                previous_destinations,
                explore_weight,
                r,
                src,
                dst,
            ),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            (Backend::Avx2(lanes), r) => batch::merge(
                lanes,
                transition,
                destinations,
                previous_destinations,
                explore_weight,
                r,
                src,
                dst,
            ),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            (Backend::Neon(lanes), r) => batch::merge(
                lanes,
                transition,
                destinations,
                previous_destinations,
                explore_weight,
                r,
                src,
                dst,
            ),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The process-wide backend, detected on first use.
pub fn backend() -> Backend {
    static BACKEND: OnceLock<Backend> = OnceLock::new();
    *BACKEND.get_or_init(|| {
        let chosen = Backend::detect();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            backend = chosen.name(),
            lanes = chosen.lanes(),
            "selected transition kernel backend"
        );
        chosen
    })
}

/// Scale the transition weights of far destinations by `explore_weight`.
///
/// `transition[i]` is the weight of the edge to `destinations[i]`. A destination
/// that is absent from `previous_destinations` and is neither `src` nor `dst`
/// is multiplied by `explore_weight`; every other entry is left untouched.
///
/// Preconditions (not checked, see [`try_update_explore_weight`]):
/// - `destinations` and `previous_destinations` are strictly ascending;
/// - `transition.len() == destinations.len()`.
///
/// Violations give meaningless weights but never panic or read out of bounds
/// in release builds.
///
/// ```
/// let mut t = [1.0f32; 4];
/// walk_bias::update_explore_weight(&mut t, &[1, 2, 3, 4], &[2, 4], 2.0, 0, 1);
/// assert_eq!(t, [1.0, 1.0, 2.0, 1.0]);
/// ```
#[inline]
pub fn update_explore_weight(
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    src: u32,
    dst: u32,
) {
    backend().update_explore_weight(
        transition,
        destinations,
        previous_destinations,
        explore_weight,
        src,
        dst,
    );
}

/// Scale far destinations by `explore_weight` and endpoints by `return_weight`.
///
/// A destination equal to `src` or `dst` is a return regardless of whether it
/// is also in `previous_destinations`. Close destinations keep their weight.
/// Same preconditions as [`update_explore_weight`].
///
/// ```
/// let mut t = [1.0f32; 4];
/// walk_bias::update_explore_return_weight(&mut t, &[1, 2, 3, 4], &[2, 4], 2.0, 0.5, 3, 99);
/// assert_eq!(t, [2.0, 1.0, 0.5, 1.0]);
/// ```
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn update_explore_return_weight(
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    return_weight: f32,
    src: u32,
    dst: u32,
) {
    backend().update_explore_return_weight(
        transition,
        destinations,
        previous_destinations,
        explore_weight,
        return_weight,
        src,
        dst,
    );
}

/// [`update_explore_weight`] after validating its preconditions.
///
/// On error `transition` is not modified.
pub fn try_update_explore_weight(
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    src: u32,
    dst: u32,
) -> Result<()> {
    check_inputs(transition, destinations, previous_destinations)?;
    update_explore_weight(
        transition,
        destinations,
        previous_destinations,
        explore_weight,
        src,
        dst,
    );
    Ok(())
}

/// [`update_explore_return_weight`] after validating its preconditions.
///
/// On error `transition` is not modified.
#[allow(clippy::too_many_arguments)]
pub fn try_update_explore_return_weight(
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    return_weight: f32,
    src: u32,
    dst: u32,
) -> Result<()> {
    check_inputs(transition, destinations, previous_destinations)?;
    update_explore_return_weight(
        transition,
        destinations,
        previous_destinations,
        explore_weight,
        return_weight,
        src,
        dst,
    );
    Ok(())
}

fn check_inputs(transition: &[f32], destinations: &[u32], previous_destinations: &[u32]) -> Result<()> {
    if transition.len() != destinations.len() {
        return Err(Error::LengthMismatch {
            transition: transition.len(),
            destinations: destinations.len(),
        });
    }
    check_strictly_ascending("destinations", destinations)?;
    check_strictly_ascending("previous_destinations", previous_destinations)
}

fn check_strictly_ascending(list: &'static str, ids: &[u32]) -> Result<()> {
    match ids.windows(2).position(|w| w[0] >= w[1]) {
        Some(k) => Err(Error::NotStrictlyAscending { list, index: k + 1 }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_stable_and_named() {
        let a = backend();
        let b = backend();
        assert_eq!(a.name(), b.name());
        assert_eq!(a.to_string(), a.name());
        assert!(a.lanes() >= 1);
        if !cfg!(feature = "simd") {
            assert_eq!(a.name(), "scalar");
        }
    }

    #[test]
    fn checked_rejects_length_mismatch_without_writing() {
        let mut t = [1.0f32; 2];
        let err = try_update_explore_weight(&mut t, &[1, 2, 3], &[], 2.0, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                transition: 2,
                destinations: 3
            }
        ));
        assert_eq!(t, [1.0, 1.0]);
    }

    #[test]
    fn checked_reports_first_unsorted_index() {
        let mut t = [1.0f32; 4];
        let err = try_update_explore_return_weight(&mut t, &[1, 2, 2, 3], &[], 2.0, 0.5, 0, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotStrictlyAscending {
                list: "destinations",
                index: 2
            }
        ));

        let err = try_update_explore_weight(&mut t, &[1, 2, 3, 4], &[5, 4], 2.0, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::NotStrictlyAscending {
                list: "previous_destinations",
                index: 1
            }
        ));
        assert_eq!(t, [1.0; 4]);
    }

    #[test]
    fn checked_accepts_valid_input() {
        let mut t = [1.0f32; 4];
        try_update_explore_weight(&mut t, &[1, 2, 3, 4], &[2, 4], 2.0, 0, 1).unwrap();
        assert_eq!(t, [1.0, 1.0, 2.0, 1.0]);
    }
}

//! Batched merge driver.
//!
//! The driver runs the same two-cursor merge as [`crate::merge`], but hands two
//! pieces of work to a [`Batch`] lane set whenever a full batch is available:
//! - skipping previous neighbors that are below the current destination, and
//! - scaling the destinations tail once the previous list is exhausted.
//!
//! Anything shorter than one batch falls back to per-element code.

/// A fixed-width lane set.
///
/// Implementors must agree exactly with the scalar rules; they only change how
/// many elements are handled per step.
pub trait Batch: Copy {
    /// Number of lanes.
    const WIDTH: usize;

    /// Count the entries of `block[..WIDTH]` that are strictly below `x`.
    ///
    /// On a sorted block this is how far the previous-list cursor can move.
    /// Panics if `block` is shorter than `WIDTH`.
    fn count_below(self, block: &[u32], x: u32) -> usize;

    /// Scale one batch of tail weights in place.
    ///
    /// Lane `k` is multiplied by `endpoint` when `destinations[k]` is `src`
    /// or `dst`, and by `explore` otherwise. Panics if either slice is shorter
    /// than `WIDTH`.
    fn scale(
        self,
        transition: &mut [f32],
        destinations: &[u32],
        src: u32,
        dst: u32,
        endpoint: f32,
        explore: f32,
    );
}

/// Pure-Rust lanes over `[u32; W]` blocks. `W = 1` is the scalar merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portable<const W: usize>;

impl<const W: usize> Batch for Portable<W> {
    const WIDTH: usize = {
        assert!(W > 0, "lane width must be at least 1");
        W
    };

    #[inline]
    fn count_below(self, block: &[u32], x: u32) -> usize {
        block[..W].iter().map(|&y| usize::from(y < x)).sum()
    }

    #[inline]
    fn scale(
        self,
        transition: &mut [f32],
        destinations: &[u32],
        src: u32,
        dst: u32,
        endpoint: f32,
        explore: f32,
    ) {
        for (w, &x) in transition[..W].iter_mut().zip(&destinations[..W]) {
            let hit = x == src || x == dst;
            *w *= if hit { endpoint } else { explore };
        }
    }
}

/// Run the merge with `lanes`.
///
/// `return_weight == None` is the explore-only kernel: endpoints keep their
/// weight. `Some(r)` is the explore+return kernel. Output is identical to
/// [`crate::merge`] for any lane set.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn merge<B: Batch>(
    lanes: B,
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    return_weight: Option<f32>,
    src: u32,
    dst: u32,
) {
    debug_assert_eq!(transition.len(), destinations.len());
    let n = transition.len().min(destinations.len());
    let m = previous_destinations.len();
    let width = B::WIDTH;

    let mut i = 0usize;
    let mut j = 0usize;
    while i < n && j < m {
        let x = destinations[i];
        // Endpoints are settled before looking at the previous list. For the
        // explore-only kernel this leaves them untouched either way.
        if x == src || x == dst {
            if let Some(r) = return_weight {
                transition[i] *= r;
            }
            i += 1;
            continue;
        }
        let y = previous_destinations[j];
        if x < y {
            transition[i] *= explore_weight;
            i += 1;
        } else if x == y {
            i += 1;
            j += 1;
        } else if m - j >= width {
            // Lane 0 is `y < x`, so this always advances.
            j += lanes.count_below(&previous_destinations[j..j + width], x);
        } else {
            j += 1;
        }
    }

    let endpoint = return_weight.unwrap_or(1.0);
    let mut weights = transition[i..n].chunks_exact_mut(width);
    let mut ids = destinations[i..n].chunks_exact(width);
    for (w, d) in (&mut weights).zip(&mut ids) {
        lanes.scale(w, d, src, dst, endpoint, explore_weight);
    }
    for (w, &x) in weights.into_remainder().iter_mut().zip(ids.remainder()) {
        if x == src || x == dst {
            if let Some(r) = return_weight {
                *w *= r;
            }
        } else {
            *w *= explore_weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_below_counts_the_sorted_prefix() {
        let block = [1u32, 3, 5, 7, 9, 11, 13, 15];
        assert_eq!(Portable::<8>.count_below(&block, 0), 0);
        assert_eq!(Portable::<8>.count_below(&block, 6), 3);
        assert_eq!(Portable::<8>.count_below(&block, 15), 7);
        assert_eq!(Portable::<8>.count_below(&block, u32::MAX), 8);
        assert_eq!(Portable::<4>.count_below(&block, u32::MAX), 4);
    }

    #[test]
    fn scale_selects_factor_per_lane() {
        let mut w = [1.0f32, 2.0, 3.0, 4.0];
        Portable::<4>.scale(&mut w, &[5, 6, 7, 8], 6, 8, 0.5, 10.0);
        assert_eq!(w, [10.0, 1.0, 30.0, 2.0]);
    }

    #[test]
    fn long_skip_over_previous_list() {
        // Previous list far ahead of the single destination, forcing several
        // batched skips followed by the scalar stragglers.
        let prev: Vec<u32> = (0..37).collect();
        let dests = [36u32, 40, 41, 42, 43, 44, 45, 46, 47, 48];
        let mut got = [1.0f32; 10];
        let mut want = [1.0f32; 10];
        merge(Portable::<8>, &mut got, &dests, &prev, 2.0, Some(0.5), 41, 1000);
        crate::merge::update_explore_return_weight(&mut want, &dests, &prev, 2.0, 0.5, 41, 1000);
        assert_eq!(got, want);
        assert_eq!(got[0], 1.0);
        assert_eq!(got[2], 0.5);
    }

    #[test]
    fn explore_only_tail_leaves_endpoints_alone() {
        let dests: Vec<u32> = (0..11).collect();
        let mut got = vec![3.0f32; 11];
        merge(Portable::<4>, &mut got, &dests, &[], 2.0, None, 2, 9);
        for (k, &w) in got.iter().enumerate() {
            let expected = if k == 2 || k == 9 { 3.0 } else { 6.0 };
            assert_eq!(w, expected, "index {k}");
        }
    }
}

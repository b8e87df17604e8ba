//! Scalar two-cursor merge: the reference classifier.
//!
//! Both lists are walked left to right once. A destination is
//! - **returned** (distance 0) when it is `src` or `dst`,
//! - **close** (distance 1) when it also appears in `previous_destinations`,
//! - **far** (distance 2) otherwise.
//!
//! The batched and SIMD backends are checked against these functions.

/// Scale far destinations by `explore_weight`; endpoints and close nodes are left as-is.
///
/// Preconditions (not checked): both neighbor lists are strictly ascending and
/// `transition.len() == destinations.len()`. Only the common prefix of
/// `transition` and `destinations` is ever touched.
pub fn update_explore_weight(
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    src: u32,
    dst: u32,
) {
    debug_assert_eq!(transition.len(), destinations.len());
    let n = transition.len().min(destinations.len());
    let m = previous_destinations.len();

    let mut i = 0usize;
    let mut j = 0usize;
    while i < n && j < m {
        let x = destinations[i];
        let y = previous_destinations[j];
        if x < y {
            if x != src && x != dst {
                transition[i] *= explore_weight;
            }
            i += 1;
        } else if x == y {
            i += 1;
            j += 1;
        } else {
            j += 1;
        }
    }

    // previous list exhausted: nothing left can be close
    for (w, &x) in transition[i..n].iter_mut().zip(&destinations[i..n]) {
        if x != src && x != dst {
            *w *= explore_weight;
        }
    }
}

/// Like [`update_explore_weight`], but endpoints are scaled by `return_weight`.
///
/// The endpoint check runs before the close/far decision, so an endpoint that
/// is also a previous neighbor is still treated as a return.
pub fn update_explore_return_weight(
    transition: &mut [f32],
    destinations: &[u32],
    previous_destinations: &[u32],
    explore_weight: f32,
    return_weight: f32,
    src: u32,
    dst: u32,
) {
    debug_assert_eq!(transition.len(), destinations.len());
    let n = transition.len().min(destinations.len());
    let m = previous_destinations.len();

    let mut i = 0usize;
    let mut j = 0usize;
    while i < n && j < m {
        let x = destinations[i];
        if x == src || x == dst {
            transition[i] *= return_weight;
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
        } else {
            j += 1;
        }
    }

    for (w, &x) in transition[i..n].iter_mut().zip(&destinations[i..n]) {
        *w *= if x == src || x == dst {
            return_weight
        } else {
            explore_weight
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explore_scenario() {
        let mut t = [1.0f32; 4];
        update_explore_weight(&mut t, &[1, 2, 3, 4], &[2, 4], 2.0, 0, 1);
        assert_eq!(t, [1.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn explore_return_scenario() {
        let mut t = [1.0f32; 4];
        update_explore_return_weight(&mut t, &[1, 2, 3, 4], &[2, 4], 2.0, 0.5, 3, 99);
        assert_eq!(t, [2.0, 1.0, 0.5, 1.0]);
    }

    #[test]
    fn endpoint_in_previous_list_is_a_return() {
        // 2 is both dst and a previous neighbor.
        let mut t = [1.0f32; 3];
        update_explore_return_weight(&mut t, &[1, 2, 5], &[1, 2], 4.0, 0.25, 7, 2);
        assert_eq!(t, [1.0, 0.25, 4.0]);
    }

    #[test]
    fn empty_previous_list_makes_everything_far() {
        let mut t = [1.0f32, 2.0, 3.0];
        update_explore_weight(&mut t, &[0, 5, 9], &[], 3.0, 5, 100);
        assert_eq!(t, [3.0, 2.0, 9.0]);
    }

    #[test]
    fn empty_destinations_is_a_noop() {
        let mut t: [f32; 0] = [];
        update_explore_weight(&mut t, &[], &[1, 2, 3], 3.0, 0, 1);
        update_explore_return_weight(&mut t, &[], &[1, 2, 3], 3.0, 0.5, 0, 1);
    }

    #[test]
    fn previous_list_entirely_below_destinations() {
        let mut t = [1.0f32; 3];
        update_explore_weight(&mut t, &[10, 11, 12], &[1, 2, 3], 2.0, 0, 11);
        assert_eq!(t, [2.0, 1.0, 2.0]);
    }
}

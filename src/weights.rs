//! Node2vec bias parameters.

use crate::{kernel, Error, Result};

/// Multipliers applied by the second-order kernel.
///
/// `return_weight` scales destinations equal to an endpoint of the edge just
/// traversed; `explore_weight` scales destinations at distance 2 from the
/// previous node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkWeights {
    /// Inverse of node2vec's return parameter \(p\).
    pub return_weight: f32,
    /// Inverse of node2vec's in-out parameter \(q\).
    pub explore_weight: f32,
}

impl Default for WalkWeights {
    /// A first-order walk: both weights are 1.
    fn default() -> Self {
        Self {
            return_weight: 1.0,
            explore_weight: 1.0,
        }
    }
}

fn not_one(weight: f32) -> bool {
    (weight - 1.0).abs() > f32::EPSILON
}

fn validate_weight(name: &str, weight: f32) -> Result<f32> {
    if weight > 0.0 && weight.is_finite() {
        Ok(weight)
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} ({weight}) is not a strictly positive real number"
        )))
    }
}

impl WalkWeights {
    /// Weights from node2vec's `p` (return) and `q` (in-out) parameters.
    ///
    /// ```
    /// let w = walk_bias::WalkWeights::from_pq(0.5, 2.0).unwrap();
    /// assert_eq!(w.return_weight, 2.0);
    /// assert_eq!(w.explore_weight, 0.5);
    /// ```
    pub fn from_pq(p: f32, q: f32) -> Result<Self> {
        let p = validate_weight("p", p)?;
        let q = validate_weight("q", q)?;
        Ok(Self {
            return_weight: 1.0 / p,
            explore_weight: 1.0 / q,
        })
    }

    /// Both weights must be strictly positive and finite.
    pub fn validate(&self) -> Result<()> {
        validate_weight("return_weight", self.return_weight)?;
        validate_weight("explore_weight", self.explore_weight)?;
        Ok(())
    }

    /// True when neither weight changes anything.
    pub fn is_first_order_walk(&self) -> bool {
        !self.is_node2vec_walk()
    }

    /// True when either weight differs from 1 by more than `f32::EPSILON`.
    pub fn is_node2vec_walk(&self) -> bool {
        not_one(self.return_weight) || not_one(self.explore_weight)
    }

    /// Rescale `transition` for a step that just crossed `src -> dst`.
    ///
    /// Bit-identical to [`kernel::update_explore_return_weight`]. Only weights
    /// exactly equal to 1 are skipped; NaN is applied like any other weight.
    pub fn apply(
        &self,
        transition: &mut [f32],
        destinations: &[u32],
        previous_destinations: &[u32],
        src: u32,
        dst: u32,
    ) {
        let scales_return = self.return_weight != 1.0;
        if !scales_return && self.explore_weight == 1.0 {
            #[cfg(feature = "tracing")]
            tracing::trace!(src, dst, "unit weights, transition unchanged");
            return;
        }
        if scales_return {
            kernel::update_explore_return_weight(
                transition,
                destinations,
                previous_destinations,
                self.explore_weight,
                self.return_weight,
                src,
                dst,
            );
        } else {
            kernel::update_explore_weight(
                transition,
                destinations,
                previous_destinations,
                self.explore_weight,
                src,
                dst,
            );
        }
    }
}

//! Architecture lane sets.
//!
//! - AVX2 on x86_64 (8 lanes, when available at runtime)
//! - NEON on aarch64 (4 lanes)
//!
//! Each lane set is a zero-sized token that can only be obtained through
//! `detect()`, so holding one proves the target feature is present and the
//! safe [`Batch`] methods may call the `#[target_feature]` functions.

#[allow(unused_imports)]
use crate::batch::Batch;

// ─────────────────────────────────────────────────────────────────────────────
// AVX2 (x86_64)
// ─────────────────────────────────────────────────────────────────────────────

/// 8 × u32 / 8 × f32 lanes.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy)]
pub struct Avx2 {
    _detected: (),
}

#[cfg(target_arch = "x86_64")]
impl Avx2 {
    /// `Some` iff the running CPU supports AVX2.
    #[inline]
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx2") {
            Some(Self { _detected: () })
        } else {
            None
        }
    }
}

#[cfg(target_arch = "x86_64")]
impl Batch for Avx2 {
    const WIDTH: usize = 8;

    #[inline]
    fn count_below(self, block: &[u32], x: u32) -> usize {
        let block = &block[..8];
        // SAFETY: `self` exists only when AVX2 was detected; `block` holds 8 ids.
        unsafe { count_below_avx2(block, x) }
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
        let transition = &mut transition[..8];
        let destinations = &destinations[..8];
        // SAFETY: as above; both slices hold 8 elements.
        unsafe { scale_avx2(transition, destinations, src, dst, endpoint, explore) }
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn count_below_avx2(block: &[u32], x: u32) -> usize {
    use std::arch::x86_64::*;

    // AVX2 only has signed compares: flip the sign bit so that
    // unsigned `y < x` becomes signed `x' > y'`.
    let bias = _mm256_set1_epi32(i32::MIN);
    let ys = _mm256_loadu_si256(block.as_ptr().cast::<__m256i>());
    let xs = _mm256_set1_epi32(x as i32);
    let below = _mm256_cmpgt_epi32(_mm256_xor_si256(xs, bias), _mm256_xor_si256(ys, bias));
    let mask = _mm256_movemask_ps(_mm256_castsi256_ps(below)) as u32;
    mask.count_ones() as usize
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn scale_avx2(
    transition: &mut [f32],
    destinations: &[u32],
    src: u32,
    dst: u32,
    endpoint: f32,
    explore: f32,
) {
    use std::arch::x86_64::*;

    let ids = _mm256_loadu_si256(destinations.as_ptr().cast::<__m256i>());
    let hit = _mm256_or_si256(
        _mm256_cmpeq_epi32(ids, _mm256_set1_epi32(src as i32)),
        _mm256_cmpeq_epi32(ids, _mm256_set1_epi32(dst as i32)),
    );
    let factor = _mm256_blendv_ps(
        _mm256_set1_ps(explore),
        _mm256_set1_ps(endpoint),
        _mm256_castsi256_ps(hit),
    );
    let w = _mm256_loadu_ps(transition.as_ptr());
    _mm256_storeu_ps(transition.as_mut_ptr(), _mm256_mul_ps(w, factor));
}

// ─────────────────────────────────────────────────────────────────────────────
// NEON (aarch64)
// ─────────────────────────────────────────────────────────────────────────────

/// 4 × u32 / 4 × f32 lanes.
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Clone, Copy)]
pub struct Neon {
    _detected: (),
}

#[cfg(target_arch = "aarch64")]
impl Neon {
    /// `Some` iff the running CPU supports NEON (every mainstream aarch64 target does).
    #[inline]
    pub fn detect() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(Self { _detected: () })
        } else {
            None
        }
    }
}

#[cfg(target_arch = "aarch64")]
impl Batch for Neon {
    const WIDTH: usize = 4;

    #[inline]
    fn count_below(self, block: &[u32], x: u32) -> usize {
        let block = &block[..4];
        // SAFETY: `self` exists only when NEON was detected; `block` holds 4 ids.
        unsafe { count_below_neon(block, x) }
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
        let transition = &mut transition[..4];
        let destinations = &destinations[..4];
        // SAFETY: as above; both slices hold 4 elements.
        unsafe { scale_neon(transition, destinations, src, dst, endpoint, explore) }
    }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn count_below_neon(block: &[u32], x: u32) -> usize {
    use std::arch::aarch64::*;

    let ys = vld1q_u32(block.as_ptr());
    let below = vcltq_u32(ys, vdupq_n_u32(x));
    // all-ones lanes -> 1
    vaddvq_u32(vshrq_n_u32::<31>(below)) as usize
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn scale_neon(
    transition: &mut [f32],
    destinations: &[u32],
    src: u32,
    dst: u32,
    endpoint: f32,
    explore: f32,
) {
    use std::arch::aarch64::*;

    let ids = vld1q_u32(destinations.as_ptr());
    let hit = vorrq_u32(
        vceqq_u32(ids, vdupq_n_u32(src)),
        vceqq_u32(ids, vdupq_n_u32(dst)),
    );
    let factor = vbslq_f32(hit, vdupq_n_f32(endpoint), vdupq_n_f32(explore));
    let w = vld1q_f32(transition.as_ptr());
    vst1q_f32(transition.as_mut_ptr(), vmulq_f32(w, factor));
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;
    #[allow(unused_imports)]
    use crate::batch::Portable;

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn avx2_matches_portable_lanes() {
        let Some(lanes) = Avx2::detect() else {
            return;
        };
        // Includes ids above i32::MAX to exercise the sign-bit flip.
        let block = [0u32, 7, 8, 100, 1 << 31, (1 << 31) + 5, u32::MAX - 1, u32::MAX];
        for x in [0u32, 1, 8, 9, 101, 1 << 31, (1 << 31) + 6, u32::MAX] {
            assert_eq!(
                lanes.count_below(&block, x),
                Portable::<8>.count_below(&block, x),
                "x = {x}"
            );
        }

        let mut a = [1.0f32, -2.0, 3.5, 0.0, 8.0, 1e-3, 7.0, 9.0];
        let mut b = a;
        lanes.scale(&mut a, &block, 8, u32::MAX, 0.5, 3.0);
        Portable::<8>.scale(&mut b, &block, 8, u32::MAX, 0.5, 3.0);
        assert_eq!(a, b);
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn neon_matches_portable_lanes() {
        let Some(lanes) = Neon::detect() else {
            return;
        };
        let block = [3u32, 9, 1 << 31, u32::MAX];
        for x in [0u32, 3, 4, 10, (1 << 31) + 1, u32::MAX] {
            assert_eq!(
                lanes.count_below(&block, x),
                Portable::<4>.count_below(&block, x),
                "x = {x}"
            );
        }

        let mut a = [1.0f32, -2.0, 3.5, 0.0];
        let mut b = a;
        lanes.scale(&mut a, &block, 9, 3, 0.25, 4.0);
        Portable::<4>.scale(&mut b, &block, 9, 3, 0.25, 4.0);
        assert_eq!(a, b);
    }
}

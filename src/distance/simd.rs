//! SIMD Euclidean kernels with runtime dispatch.
//!
//! Supported instruction sets, fastest first:
//! - **AVX-512F** (x86_64): 16 lanes. Requires nightly Rust and the `avx512` cargo feature.
//! - **AVX2+FMA** (x86_64): 8 lanes.
//! - **NEON** (aarch64): 4 lanes, always available.
//! - **Scalar** fallback everywhere else.
//!
//! CPU features are probed once; the chosen kernel is cached for the life of
//! the process.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use super::scalar;
use std::sync::OnceLock;

type Kernel = fn(&[f32], &[f32]) -> f32;

static SQUARED_KERNEL: OnceLock<(Kernel, &'static str)> = OnceLock::new();

// =============================================================================
// AVX-512 (x86_64)
// =============================================================================

/// Squared Euclidean distance using AVX-512F.
///
/// # Safety
/// The caller must ensure the CPU supports AVX-512F.
#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
#[target_feature(enable = "avx512f")]
pub unsafe fn euclidean_distance_squared_avx512(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Point dimensions must match");

    let len = a.len();
    let mut i = 0;
    let mut acc = _mm512_setzero_ps();

    while i + 16 <= len {
        let diff = _mm512_sub_ps(
            _mm512_loadu_ps(a.as_ptr().add(i)),
            _mm512_loadu_ps(b.as_ptr().add(i)),
        );
        acc = _mm512_fmadd_ps(diff, diff, acc);
        i += 16;
    }

    let mut total = _mm512_reduce_add_ps(acc);
    total += scalar::euclidean_distance_squared(&a[i..], &b[i..]);
    total
}

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
fn squared_avx512_dispatched(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: only installed after avx512f was detected.
    unsafe { euclidean_distance_squared_avx512(a, b) }
}

// =============================================================================
// AVX2+FMA (x86_64)
// =============================================================================

/// Squared Euclidean distance using AVX2 and FMA.
///
/// # Safety
/// The caller must ensure the CPU supports AVX2 and FMA.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn euclidean_distance_squared_avx2(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Point dimensions must match");

    let len = a.len();
    let mut i = 0;
    let mut acc = _mm256_setzero_ps();

    while i + 8 <= len {
        let diff = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        acc = _mm256_fmadd_ps(diff, diff, acc);
        i += 8;
    }

    let mut lanes = [0.0f32; 8];
    _mm256_storeu_ps(lanes.as_mut_ptr(), acc);
    let mut total: f32 = lanes.iter().sum();
    total += scalar::euclidean_distance_squared(&a[i..], &b[i..]);
    total
}

#[cfg(target_arch = "x86_64")]
fn squared_avx2_dispatched(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: only installed after avx2 and fma were detected.
    unsafe { euclidean_distance_squared_avx2(a, b) }
}

// =============================================================================
// NEON (aarch64)
// =============================================================================

/// Squared Euclidean distance using NEON.
#[cfg(target_arch = "aarch64")]
pub fn euclidean_distance_squared_neon(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Point dimensions must match");

    let len = a.len();
    let mut i = 0;
    // SAFETY: NEON is mandatory on aarch64 and every load stays within `len`.
    let mut total = unsafe {
        let mut acc = vdupq_n_f32(0.0);
        while i + 4 <= len {
            let diff = vsubq_f32(vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
            acc = vfmaq_f32(acc, diff, diff);
            i += 4;
        }
        vaddvq_f32(acc)
    };
    total += scalar::euclidean_distance_squared(&a[i..], &b[i..]);
    total
}

// =============================================================================
// Dispatch
// =============================================================================

#[cfg(target_arch = "x86_64")]
fn select_kernel() -> (Kernel, &'static str) {
    #[cfg(feature = "avx512")]
    {
        if is_x86_feature_detected!("avx512f") {
            return (squared_avx512_dispatched as Kernel, "avx512");
        }
    }
    if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
        return (squared_avx2_dispatched as Kernel, "avx2+fma");
    }
    (scalar::euclidean_distance_squared as Kernel, "scalar")
}

#[cfg(target_arch = "aarch64")]
fn select_kernel() -> (Kernel, &'static str) {
    (euclidean_distance_squared_neon as Kernel, "neon")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn select_kernel() -> (Kernel, &'static str) {
    (scalar::euclidean_distance_squared as Kernel, "scalar")
}

fn selected() -> &'static (Kernel, &'static str) {
    SQUARED_KERNEL.get_or_init(|| {
        let selected = select_kernel();
        tracing::debug!(kernel = selected.1, "euclidean kernel selected");
        selected
    })
}

/// Name of the kernel chosen for this CPU ("avx512", "avx2+fma", "neon" or "scalar").
pub fn active_kernel() -> &'static str {
    selected().1
}

/// Squared Euclidean distance with automatic CPU feature detection.
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    (selected().0)(a, b)
}

/// Euclidean distance with automatic CPU feature detection.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

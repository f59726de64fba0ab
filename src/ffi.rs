//! C boundary: build, query and destroy a [`QueryContext`] through an opaque
//! handle and flat buffers.
//!
//! ```text
//! void   *forge_knn_build(uint64_t seed, int verbosity, float coverage, float sample_rate,
//!                         const float *data, int rows, int cols);
//! void    forge_knn_destroy(void *handle);
//! int     forge_knn_find_nearest(const void *handle, const float *query, int k, int *out);
//! int     forge_knn_find_nearest_one_based(const void *handle, const float *query, int k, int *out);
//! int     forge_knn_get(const void *handle, int id, float *out);
//! int     forge_knn_get_one_based(const void *handle, int id, float *out);
//! int     forge_knn_size(const void *handle);
//! int     forge_knn_dimension(const void *handle);
//! ```
//!
//! Query functions return the number of identifiers written, or one of the
//! negative codes in [`crate::constants::codes`]. Nothing is written to `out`
//! on failure. A negative `k` is treated as 0. Panics never cross the
//! boundary.
//!
//! # Identifier offsets
//!
//! The engine's identifiers are 0-based. Some hosts expect 1-based
//! identifiers; the `_one_based` entry points serve them by applying
//! [`IdOffset::ONE_BASED`] to identifiers going out and removing it from
//! identifiers coming in. This is convention version
//! [`BOUNDARY_ID_VERSION`] of this boundary.

use crate::config::IndexParams;
use crate::constants::{codes, params};
use crate::context::QueryContext;
use crate::error::{KnnError, Result};
use crate::types::PointId;
use core::ffi::{c_float, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

/// Version of the identifier convention exposed by this boundary.
pub const BOUNDARY_ID_VERSION: u32 = 1;

/// A fixed shift applied to identifiers as they leave the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdOffset(u32);

impl IdOffset {
    /// Identifiers exactly as the engine reports them.
    pub const ZERO_BASED: Self = Self(0);

    /// Identifiers shifted up by one.
    pub const ONE_BASED: Self = Self(1);

    /// Translate an engine identifier into this convention.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the shifted identifier does not fit in an `i32`.
    pub fn apply(self, id: PointId) -> Result<i32> {
        id.as_usize()
            .checked_add(self.0 as usize)
            .and_then(|shifted| i32::try_from(shifted).ok())
            .ok_or_else(|| KnnError::out_of_range(id.as_usize(), i32::MAX as usize))
    }

    /// Translate an identifier in this convention back to the engine's.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `raw` is below the offset.
    pub fn remove(self, raw: i32) -> Result<PointId> {
        usize::try_from(raw)
            .ok()
            .and_then(|r| r.checked_sub(self.0 as usize))
            .map(PointId::new)
            .ok_or_else(|| {
                KnnError::invalid_argument(format!("identifier {} is below offset {}", raw, self.0))
            })
    }
}

/// Copy `ids` into caller-owned storage, applying `offset`.
///
/// Every identifier is translated before anything is written, so `out` is
/// untouched on error.
///
/// # Errors
///
/// `InvalidArgument` if `out` is shorter than `ids`; `OutOfRange` if an
/// identifier does not fit the output type.
pub fn write_ids(ids: &[PointId], out: &mut [i32], offset: IdOffset) -> Result<usize> {
    if out.len() < ids.len() {
        return Err(KnnError::invalid_argument(format!(
            "output holds {} identifiers, {} needed",
            out.len(),
            ids.len()
        )));
    }
    let translated = ids
        .iter()
        .map(|&id| offset.apply(id))
        .collect::<Result<Vec<i32>>>()?;
    out[..translated.len()].copy_from_slice(&translated);
    Ok(translated.len())
}

fn report(op: &'static str, err: &KnnError) -> i32 {
    tracing::warn!(op, error = %err, "boundary call failed");
    err.code()
}

fn guarded(op: &'static str, body: impl FnOnce() -> Result<c_int>) -> c_int {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(n)) => n,
        Ok(Err(err)) => report(op, &err),
        Err(_) => {
            tracing::warn!(op, "panic caught at boundary");
            codes::PANIC
        }
    }
}

fn non_negative(value: c_int, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| KnnError::invalid_argument(format!("{} must be non-negative, got {}", what, value)))
}

fn params_from_raw(
    seed: u64,
    verbosity: c_int,
    coverage: c_float,
    sample_rate: c_float,
) -> IndexParams {
    let verbosity = verbosity.clamp(0, params::MAX_VERBOSITY as c_int) as u8;
    let params = IndexParams::default()
        .with_seed(seed)
        .with_verbosity(verbosity)
        .with_coverage(coverage);
    // Zero, negative or NaN means "derive from the row count".
    if sample_rate > 0.0 {
        params.with_sample_rate(sample_rate)
    } else {
        params
    }
}

unsafe fn handle_ref<'a>(handle: *const QueryContext) -> Result<&'a QueryContext> {
    handle
        .as_ref()
        .ok_or_else(|| KnnError::invalid_argument("null handle"))
}

unsafe fn find_nearest_raw(
    handle: *const QueryContext,
    query: *const c_float,
    k: c_int,
    out: *mut c_int,
    offset: IdOffset,
) -> Result<c_int> {
    let ctx = handle_ref(handle)?;
    if query.is_null() {
        return Err(KnnError::invalid_argument("null query buffer"));
    }
    let query = std::slice::from_raw_parts(query, ctx.dimension());
    let k = usize::try_from(k).unwrap_or(0);

    let ids = ctx.find_nearest(query, k)?;
    if ids.is_empty() {
        return Ok(0);
    }
    if out.is_null() {
        return Err(KnnError::invalid_argument("null output buffer"));
    }
    let out = std::slice::from_raw_parts_mut(out, ids.len());
    let written = write_ids(&ids, out, offset)?;
    Ok(written as c_int)
}

unsafe fn get_raw(
    handle: *const QueryContext,
    id: c_int,
    out: *mut c_float,
    offset: IdOffset,
) -> Result<c_int> {
    let ctx = handle_ref(handle)?;
    let point = ctx.store().get(offset.remove(id)?)?;
    let written = c_int::try_from(point.dim())
        .map_err(|_| KnnError::invalid_argument("dimension does not fit in int"))?;
    if out.is_null() {
        return Err(KnnError::invalid_argument("null output buffer"));
    }
    std::slice::from_raw_parts_mut(out, point.dim()).copy_from_slice(point.as_slice());
    Ok(written)
}

/// Build a query context from a row-major `rows x cols` buffer of `float`.
///
/// Returns null on failure (the reason is logged). `sample_rate <= 0`
/// derives the rate from the row count.
///
/// # Safety
///
/// `data` must point to `rows * cols` readable `float` values, or may be null
/// when `rows * cols == 0`. The buffer is copied; it need not outlive the
/// call. The returned handle must be released with [`forge_knn_destroy`]
/// exactly once.
#[no_mangle]
pub unsafe extern "C" fn forge_knn_build(
    seed: u64,
    verbosity: c_int,
    coverage: c_float,
    sample_rate: c_float,
    data: *const c_float,
    rows: c_int,
    cols: c_int,
) -> *mut QueryContext {
    let result = catch_unwind(AssertUnwindSafe(|| -> Result<QueryContext> {
        let rows = non_negative(rows, "rows")?;
        let cols = non_negative(cols, "cols")?;
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| KnnError::invalid_argument("rows * cols overflows"))?;
        let buffer: &[f32] = if len == 0 {
            &[]
        } else if data.is_null() {
            return Err(KnnError::invalid_argument("null data buffer"));
        } else {
            std::slice::from_raw_parts(data, len)
        };
        let params = params_from_raw(seed, verbosity, coverage, sample_rate);
        QueryContext::build(buffer, rows, cols, params)
    }));

    match result {
        Ok(Ok(ctx)) => Box::into_raw(Box::new(ctx)),
        Ok(Err(err)) => {
            report("build", &err);
            ptr::null_mut()
        }
        Err(_) => {
            tracing::warn!(op = "build", "panic caught at boundary");
            ptr::null_mut()
        }
    }
}

/// Release a handle returned by [`forge_knn_build`]. Null is a no-op.
///
/// # Safety
///
/// `handle` must be null or a live handle from [`forge_knn_build`] that has
/// not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn forge_knn_destroy(handle: *mut QueryContext) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Write up to `k` nearest 0-based identifiers into `out`, closest first.
///
/// Returns the count written, or a negative error code.
///
/// # Safety
///
/// `handle` must be a live handle; `query` must point to as many `float`
/// values as the context's dimensionality; `out` must have room for `k`
/// `int` values.
#[no_mangle]
pub unsafe extern "C" fn forge_knn_find_nearest(
    handle: *const QueryContext,
    query: *const c_float,
    k: c_int,
    out: *mut c_int,
) -> c_int {
    guarded("find_nearest", || {
        find_nearest_raw(handle, query, k, out, IdOffset::ZERO_BASED)
    })
}

/// Like [`forge_knn_find_nearest`], with identifiers shifted to 1-based.
///
/// # Safety
///
/// Same contract as [`forge_knn_find_nearest`].
#[no_mangle]
pub unsafe extern "C" fn forge_knn_find_nearest_one_based(
    handle: *const QueryContext,
    query: *const c_float,
    k: c_int,
    out: *mut c_int,
) -> c_int {
    guarded("find_nearest_one_based", || {
        find_nearest_raw(handle, query, k, out, IdOffset::ONE_BASED)
    })
}

/// Copy the coordinates of 0-based point `id` into `out`.
///
/// Returns the number of values written (the dimensionality), or a negative
/// error code; `OutOfRange` for an unknown identifier.
///
/// # Safety
///
/// `handle` must be a live handle; `out` must have room for as many `float`
/// values as the context's dimensionality.
#[no_mangle]
pub unsafe extern "C" fn forge_knn_get(
    handle: *const QueryContext,
    id: c_int,
    out: *mut c_float,
) -> c_int {
    guarded("get", || get_raw(handle, id, out, IdOffset::ZERO_BASED))
}

/// Like [`forge_knn_get`], taking a 1-based identifier.
///
/// # Safety
///
/// Same contract as [`forge_knn_get`].
#[no_mangle]
pub unsafe extern "C" fn forge_knn_get_one_based(
    handle: *const QueryContext,
    id: c_int,
    out: *mut c_float,
) -> c_int {
    guarded("get_one_based", || get_raw(handle, id, out, IdOffset::ONE_BASED))
}

/// Number of points behind `handle`, or a negative error code.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn forge_knn_size(handle: *const QueryContext) -> c_int {
    guarded("size", || {
        let ctx = handle_ref(handle)?;
        c_int::try_from(ctx.len())
            .map_err(|_| KnnError::out_of_range(ctx.len(), c_int::MAX as usize))
    })
}

/// Dimensionality of the points behind `handle`, or a negative error code.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn forge_knn_dimension(handle: *const QueryContext) -> c_int {
    guarded("dimension", || {
        let ctx = handle_ref(handle)?;
        c_int::try_from(ctx.dimension())
            .map_err(|_| KnnError::invalid_argument("dimension does not fit in int"))
    })
}

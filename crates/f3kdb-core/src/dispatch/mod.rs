//! Selection of the concrete processing routine.
//!
//! Routines are laid out in a static table indexed by dither algorithm, then
//! CPU tier, then `sample_mode * 2 + (blur_first ? 0 : 1) - 1`. Slot 0 of
//! every cell is empty; sample mode 0 has no routine.

mod cpu;

pub use cpu::{detect, CpuTier};
pub(crate) use cpu::resolve;

use crate::dither::{FloydSteinberg, NoDither, OrderedDither};
use crate::params::DitherAlgorithm;
use crate::process::{
    process_plane_scalar, process_plane_sse2, process_plane_sse41, process_plane_ssse3,
    ProcessPlaneFn,
};

const IMPLS_PER_CELL: usize = 5;

type DispatchCell = [Option<ProcessPlaneFn>; IMPLS_PER_CELL];

macro_rules! impl_cell {
    ($backend:ident, $kernel:ty) => {
        [
            None,
            Some($backend::<1, true, $kernel> as ProcessPlaneFn),
            Some($backend::<1, false, $kernel> as ProcessPlaneFn),
            Some($backend::<2, true, $kernel> as ProcessPlaneFn),
            Some($backend::<2, false, $kernel> as ProcessPlaneFn),
        ]
    };
}

macro_rules! dither_row {
    ($kernel:ty) => {
        [
            impl_cell!(process_plane_scalar, $kernel),
            impl_cell!(process_plane_sse2, $kernel),
            impl_cell!(process_plane_ssse3, $kernel),
            impl_cell!(process_plane_sse41, $kernel),
        ]
    };
}

static PROCESS_PLANE_IMPLS: [[DispatchCell; CpuTier::COUNT]; DitherAlgorithm::COUNT] = [
    dither_row!(NoDither),
    dither_row!(OrderedDither),
    dither_row!(FloydSteinberg),
    // 16-bit output drops no bits, so the pass-through variants never dither.
    dither_row!(NoDither),
    dither_row!(NoDither),
];

#[inline]
fn impl_index(sample_mode: u8, blur_first: bool) -> usize {
    usize::from(sample_mode) * 2 + usize::from(!blur_first) - 1
}

/// Routine for the given combination.
///
/// A missing entry means the table and the parameter model disagree. That
/// is a build defect, not a runtime condition, so the process aborts.
pub(crate) fn select(
    dither_algo: DitherAlgorithm,
    tier: CpuTier,
    sample_mode: u8,
    blur_first: bool,
) -> ProcessPlaneFn {
    let cell = &PROCESS_PLANE_IMPLS[dither_algo.table_index()][tier.index()];
    match cell.get(impl_index(sample_mode, blur_first)).copied().flatten() {
        Some(routine) => routine,
        None => {
            tracing::error!(
                ?dither_algo,
                %tier,
                sample_mode,
                blur_first,
                "No processing routine for combination"
            );
            std::process::abort()
        }
    }
}

//! CPU capability tiers.

use std::fmt;
use std::sync::OnceLock;

use crate::params::OptimizationMode;

/// Implementation tier, ordered from least to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CpuTier {
    Scalar,
    Sse2,
    Ssse3,
    Sse41,
}

impl CpuTier {
    pub const COUNT: usize = 4;

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            CpuTier::Scalar => "scalar",
            CpuTier::Sse2 => "sse2",
            CpuTier::Ssse3 => "ssse3",
            CpuTier::Sse41 => "sse4.1",
        }
    }

    /// Tier named by an explicit optimization request, `None` for auto-detect.
    fn requested(opt: OptimizationMode) -> Option<CpuTier> {
        match opt {
            OptimizationMode::AutoDetect => None,
            OptimizationMode::Scalar => Some(CpuTier::Scalar),
            OptimizationMode::Sse2 => Some(CpuTier::Sse2),
            OptimizationMode::Ssse3 => Some(CpuTier::Ssse3),
            OptimizationMode::Sse41 => Some(CpuTier::Sse41),
        }
    }
}

impl fmt::Display for CpuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Best tier the running CPU supports. Probed once per process.
pub fn detect() -> CpuTier {
    static DETECTED: OnceLock<CpuTier> = OnceLock::new();
    *DETECTED.get_or_init(probe)
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn probe() -> CpuTier {
    if std::arch::is_x86_feature_detected!("sse4.1") {
        CpuTier::Sse41
    } else if std::arch::is_x86_feature_detected!("ssse3") {
        CpuTier::Ssse3
    } else if std::arch::is_x86_feature_detected!("sse2") {
        CpuTier::Sse2
    } else {
        CpuTier::Scalar
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn probe() -> CpuTier {
    CpuTier::Scalar
}

/// Tier to run for `opt`, never above what the hardware supports.
pub(crate) fn resolve(opt: OptimizationMode) -> CpuTier {
    resolve_against(opt, detect())
}

fn resolve_against(opt: OptimizationMode, available: CpuTier) -> CpuTier {
    match CpuTier::requested(opt) {
        Some(requested) => requested.min(available),
        None => available,
    }
}

//======================================================================
// src/cpu.rs
// 프로세스 전역 CPU 기능 탐지. 최초 사용 시 한 번만 수행합니다.
//======================================================================

use std::sync::OnceLock;

/// Instruction-set extensions the accelerated kernels rely on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    /// AES-NI together with SSE2.
    pub aes: bool,
    /// PCLMULQDQ together with SSSE3 (byte shuffles).
    pub pclmulqdq: bool,
}

static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Returns the cached feature set, detecting it on first call.
pub fn features() -> CpuFeatures {
    *FEATURES.get_or_init(|| {
        let detected = detect();
        tracing::debug!(
            aes = detected.aes,
            pclmulqdq = detected.pclmulqdq,
            "cpu features detected"
        );
        detected
    })
}

#[cfg(all(target_arch = "x86_64", not(feature = "force_soft")))]
fn detect() -> CpuFeatures {
    let sse2 = std::is_x86_feature_detected!("sse2");
    CpuFeatures {
        aes: sse2 && std::is_x86_feature_detected!("aes"),
        pclmulqdq: sse2
            && std::is_x86_feature_detected!("ssse3")
            && std::is_x86_feature_detected!("pclmulqdq"),
    }
}

#[cfg(not(all(target_arch = "x86_64", not(feature = "force_soft"))))]
fn detect() -> CpuFeatures {
    CpuFeatures::default()
}

/// Per-instance backend preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Acceleration {
    /// Use whatever the CPU offers.
    #[default]
    Auto,
    /// Always take the portable path.
    Portable,
}

impl Acceleration {
    /// Whether AES-NI kernels may be used.
    pub fn aes(self) -> bool {
        self == Acceleration::Auto && features().aes
    }

    /// Whether carry-less multiplication kernels may be used.
    pub fn clmul(self) -> bool {
        self == Acceleration::Auto && features().pclmulqdq
    }
}

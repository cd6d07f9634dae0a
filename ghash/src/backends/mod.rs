//======================================================================
// ghash/src/backends/mod.rs
// Selects the multiplication backend once, when the key is set.
//======================================================================

use crate::consts::BLOCK_SIZE;
use batchblock::Acceleration;
use cfg_if::cfg_if;
use zeroize::Zeroize;

pub(crate) mod soft;

cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub(crate) mod clmul;
    }
}

#[derive(Clone)]
pub(crate) enum Backend {
    Soft(soft::Table),
    #[cfg(target_arch = "x86_64")]
    Clmul(clmul::Powers),
}

impl Backend {
    pub(crate) fn new(h: &[u8; BLOCK_SIZE], acceleration: Acceleration) -> Self {
        #[cfg(target_arch = "x86_64")]
        if acceleration.clmul() {
            // SAFETY: PCLMULQDQ and SSSE3 were detected.
            return Backend::Clmul(unsafe { clmul::Powers::new(h) });
        }
        #[cfg(not(target_arch = "x86_64"))]
        let _ = acceleration;

        Backend::Soft(soft::Table::new(h))
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Backend::Soft(_) => "soft",
            #[cfg(target_arch = "x86_64")]
            Backend::Clmul(_) => "clmul",
        }
    }

    /// `blocks.len()` must be a multiple of [`BLOCK_SIZE`].
    #[inline]
    pub(crate) fn update(&self, acc: &mut [u8; BLOCK_SIZE], blocks: &[u8]) {
        debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);
        match self {
            Backend::Soft(table) => table.update(acc, blocks),
            // SAFETY: this variant only exists when the features were detected.
            #[cfg(target_arch = "x86_64")]
            Backend::Clmul(powers) => unsafe { powers.update(acc, blocks) },
        }
    }
}

impl Zeroize for Backend {
    fn zeroize(&mut self) {
        match self {
            Backend::Soft(table) => table.zeroize(),
            #[cfg(target_arch = "x86_64")]
            Backend::Clmul(powers) => powers.zeroize(),
        }
    }
}

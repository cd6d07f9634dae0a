//======================================================================
// ghash/src/lib.rs
// Crate entry point for the GHASH universal hash.
//======================================================================
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// --- Module Declarations ---

mod backends;
pub mod consts;


// --- Re-exports ---

pub use batchblock::{Acceleration, Error, Result};
pub use consts::BLOCK_SIZE;

use backends::Backend;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// GHASH keyed with a hash subkey `H`.
///
/// Input is treated as one continuous byte stream: a trailing partial
/// block is held back until more data arrives, [`GHash::pad`] is called,
/// or the MAC is read.
#[derive(Clone, ZeroizeOnDrop)]
pub struct GHash {
    backend: Backend,
    accumulator: [u8; BLOCK_SIZE],
    pending: [u8; BLOCK_SIZE],
    pending_len: usize,
}

impl GHash {
    /// Keys a new instance; `subkey` must be exactly 16 bytes.
    pub fn new(subkey: &[u8]) -> Result<Self> {
        Self::with_acceleration(subkey, Acceleration::Auto)
    }

    pub fn with_acceleration(subkey: &[u8], acceleration: Acceleration) -> Result<Self> {
        let h: &[u8; BLOCK_SIZE] = subkey.try_into().map_err(|_| Error::InvalidKeySize {
            expected: "16",
            actual: subkey.len(),
        })?;
        let backend = Backend::new(h, acceleration);
        tracing::trace!(backend = backend.name(), "ghash key ready");

        Ok(Self {
            backend,
            accumulator: [0u8; BLOCK_SIZE],
            pending: [0u8; BLOCK_SIZE],
            pending_len: 0,
        })
    }

    /// Name of the multiplication backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Absorbs `data`. Whole blocks go to the backend in one call so the
    /// accelerated path can aggregate them.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.pending_len > 0 {
            let take = (BLOCK_SIZE - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];
            if self.pending_len < BLOCK_SIZE {
                return;
            }
            self.backend.update(&mut self.accumulator, &self.pending);
            self.pending_len = 0;
        }

        let whole = data.len() - data.len() % BLOCK_SIZE;
        if whole > 0 {
            self.backend.update(&mut self.accumulator, &data[..whole]);
        }
        let rest = &data[whole..];
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
    }

    /// Zero-pads and absorbs a buffered partial block, if any.
    pub fn pad(&mut self) {
        if self.pending_len > 0 {
            self.pending[self.pending_len..].fill(0);
            self.backend.update(&mut self.accumulator, &self.pending);
            self.pending_len = 0;
        }
    }

    /// Writes the 16-byte MAC into `out` and resets for the next message.
    pub fn get_mac(&mut self, out: &mut [u8]) -> Result<()> {
        Error::check_len(BLOCK_SIZE, out.len())?;
        out[..BLOCK_SIZE].copy_from_slice(&self.finalize_reset());
        Ok(())
    }

    /// Returns the MAC and resets for the next message.
    pub fn finalize_reset(&mut self) -> [u8; BLOCK_SIZE] {
        self.pad();
        let mac = self.accumulator;
        self.reset();
        mac
    }

    /// Clears the accumulator and any buffered input. The key is kept.
    pub fn reset(&mut self) {
        self.accumulator.zeroize();
        self.pending.zeroize();
        self.pending_len = 0;
    }
}

impl core::fmt::Debug for GHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GHash")
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

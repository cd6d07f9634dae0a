//======================================================================
// src/aes.rs
// AES-128/192/256. 생성 시점에 백엔드를 고정합니다.
//======================================================================

use crate::backends::soft::{self, RoundKeys};
use crate::block::{check_batch, BlockCipher, HardwareAcceleration};
use crate::consts::AES_MAX_ROUND_KEYS;
use crate::cpu::Acceleration;
use crate::error::{Error, Result};
use zeroize::ZeroizeOnDrop;

#[cfg(target_arch = "x86_64")]
use crate::backends::aesni;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Soft,
    #[cfg(target_arch = "x86_64")]
    AesNi,
}

/// AES with a 128, 192 or 256-bit key.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Aes {
    encrypt_keys: RoundKeys,
    /// Equivalent-inverse schedule; only filled for the AES-NI backend.
    decrypt_keys: RoundKeys,
    #[zeroize(skip)]
    rounds: usize,
    #[zeroize(skip)]
    backend: Backend,
}

impl Aes {
    /// Expands `key` and picks the fastest available backend.
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_acceleration(key, Acceleration::Auto)
    }

    pub fn with_acceleration(key: &[u8], acceleration: Acceleration) -> Result<Self> {
        let rounds = match key.len() {
            16 => 10,
            24 => 12,
            32 => 14,
            actual => {
                return Err(Error::InvalidKeySize {
                    expected: "16, 24 or 32",
                    actual,
                })
            }
        };

        let mut aes = Self {
            encrypt_keys: [[0u8; 16]; AES_MAX_ROUND_KEYS],
            decrypt_keys: [[0u8; 16]; AES_MAX_ROUND_KEYS],
            rounds,
            backend: Backend::Soft,
        };
        soft::expand_key(key, rounds, &mut aes.encrypt_keys);

        #[cfg(target_arch = "x86_64")]
        if acceleration.aes() {
            // SAFETY: AES-NI presence was just checked.
            unsafe { aesni::invert_keys(&aes.encrypt_keys, rounds, &mut aes.decrypt_keys) };
            aes.backend = Backend::AesNi;
        }
        #[cfg(not(target_arch = "x86_64"))]
        let _ = acceleration;

        tracing::trace!(cipher = aes.name(), backend = ?aes.backend, "aes key schedule ready");
        Ok(aes)
    }

    /// Key length in bytes.
    pub fn key_size(&self) -> usize {
        (self.rounds - 6) * 4
    }
}

macro_rules! aes_batch {
    ($enc:ident, $dec:ident, $n:literal) => {
        fn $enc(&self, blocks: &mut [u8]) {
            // The AES-NI kernels index by lane; the length must be exact.
            check_batch::<Self>(blocks, $n);
            match self.backend {
                Backend::Soft => {
                    for block in blocks.chunks_exact_mut(16) {
                        soft::encrypt_block(&self.encrypt_keys, self.rounds, block);
                    }
                }
                // SAFETY: the backend is only chosen when AES-NI is present.
                #[cfg(target_arch = "x86_64")]
                Backend::AesNi => unsafe {
                    aesni::encrypt::<$n>(&self.encrypt_keys, self.rounds, blocks)
                },
            }
        }

        fn $dec(&self, blocks: &mut [u8]) {
            check_batch::<Self>(blocks, $n);
            match self.backend {
                Backend::Soft => {
                    for block in blocks.chunks_exact_mut(16) {
                        soft::decrypt_block(&self.encrypt_keys, self.rounds, block);
                    }
                }
                // SAFETY: as above.
                #[cfg(target_arch = "x86_64")]
                Backend::AesNi => unsafe {
                    aesni::decrypt::<$n>(&self.decrypt_keys, self.rounds, blocks)
                },
            }
        }
    };
}

impl BlockCipher for Aes {
    const BLOCK_SIZE: usize = 16;

    fn name(&self) -> &'static str {
        match self.rounds {
            10 => "AES-128",
            12 => "AES-192",
            _ => "AES-256",
        }
    }

    fn hardware_acceleration(&self) -> HardwareAcceleration {
        match self.backend {
            Backend::Soft => HardwareAcceleration::empty(),
            #[cfg(target_arch = "x86_64")]
            Backend::AesNi => {
                HardwareAcceleration::BLOCK1
                    | HardwareAcceleration::BLOCK2
                    | HardwareAcceleration::BLOCK4
                    | HardwareAcceleration::BLOCK8
            }
        }
    }

    aes_batch!(encrypt1, decrypt1, 1);
    aes_batch!(encrypt2, decrypt2, 2);
    aes_batch!(encrypt4, decrypt4, 4);
    aes_batch!(encrypt8, decrypt8, 8);
}

impl core::fmt::Debug for Aes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Aes")
            .field("rounds", &self.rounds)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

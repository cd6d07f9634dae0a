//======================================================================
// src/sm4.rs
// SM4 (GB/T 32907-2016) portable implementation.
//======================================================================

use crate::block::{check_batch, BlockCipher};
use crate::consts::{SM4_CK, SM4_FK, SM4_SBOX};
use crate::error::{Error, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

const ROUNDS: usize = 32;

/// SM4 with a 128-bit key.
///
/// Only a portable backend exists, so every batch width goes through the
/// default half-splitting composition.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Sm4 {
    round_keys: [u32; ROUNDS],
}

impl Sm4 {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 16 {
            return Err(Error::InvalidKeySize {
                expected: "16",
                actual: key.len(),
            });
        }

        let mut k = [0u32; 4];
        for ((word, chunk), fk) in k.iter_mut().zip(key.chunks_exact(4)).zip(SM4_FK) {
            *word = load_be(chunk) ^ fk;
        }

        let mut round_keys = [0u32; ROUNDS];
        for (i, rk) in round_keys.iter_mut().enumerate() {
            let next = k[0] ^ key_transform(k[1] ^ k[2] ^ k[3] ^ SM4_CK[i]);
            k = [k[1], k[2], k[3], next];
            *rk = next;
        }
        k.zeroize();

        tracing::trace!(cipher = "SM4", backend = "soft", "sm4 key schedule ready");
        Ok(Self { round_keys })
    }

    fn crypt(&self, block: &mut [u8], decrypt: bool) {
        let mut x = [
            load_be(&block[0..4]),
            load_be(&block[4..8]),
            load_be(&block[8..12]),
            load_be(&block[12..16]),
        ];
        for i in 0..ROUNDS {
            let rk = if decrypt {
                self.round_keys[ROUNDS - 1 - i]
            } else {
                self.round_keys[i]
            };
            let next = x[0] ^ round_transform(x[1] ^ x[2] ^ x[3] ^ rk);
            x = [x[1], x[2], x[3], next];
        }
        // Output is the reversed final state (X35, X34, X33, X32).
        for (chunk, word) in block.chunks_exact_mut(4).zip(x.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        x.zeroize();
    }
}

#[inline(always)]
fn load_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Non-linear substitution τ.
#[inline(always)]
fn tau(x: u32) -> u32 {
    let b = x.to_be_bytes();
    u32::from_be_bytes([
        SM4_SBOX[b[0] as usize],
        SM4_SBOX[b[1] as usize],
        SM4_SBOX[b[2] as usize],
        SM4_SBOX[b[3] as usize],
    ])
}

/// T = L ∘ τ for the encryption rounds.
#[inline(always)]
fn round_transform(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// T' = L' ∘ τ for the key schedule.
#[inline(always)]
fn key_transform(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

impl BlockCipher for Sm4 {
    const BLOCK_SIZE: usize = 16;

    fn name(&self) -> &'static str {
        "SM4"
    }

    fn encrypt1(&self, block: &mut [u8]) {
        check_batch::<Self>(block, 1);
        self.crypt(block, false);
    }

    fn decrypt1(&self, block: &mut [u8]) {
        check_batch::<Self>(block, 1);
        self.crypt(block, true);
    }
}

impl core::fmt::Debug for Sm4 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sm4").finish_non_exhaustive()
    }
}

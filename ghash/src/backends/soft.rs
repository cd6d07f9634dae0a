//======================================================================
// ghash/src/backends/soft.rs
// Nibble-table GF(2^128) multiplication (Shoup's 4-bit method).
//======================================================================

use crate::consts::{BLOCK_SIZE, LAST4, R};
use zeroize::Zeroize;

/// The sixteen multiples `i · H` for every 4-bit `i`, in GCM bit order.
#[derive(Clone, Zeroize)]
pub(crate) struct Table {
    m: [u128; 16],
}

impl Table {
    pub(crate) fn new(h: &[u8; BLOCK_SIZE]) -> Self {
        let mut m = [0u128; 16];
        let mut v = u128::from_be_bytes(*h);
        m[8] = v;

        // m[4], m[2], m[1] are H·x, H·x², H·x³.
        let mut i = 4;
        while i > 0 {
            v = (v >> 1) ^ (R & 0u128.wrapping_sub(v & 1));
            m[i] = v;
            i >>= 1;
        }
        let mut i = 2;
        while i <= 8 {
            for j in 1..i {
                m[i + j] = m[i] ^ m[j];
            }
            i *= 2;
        }
        Self { m }
    }

    /// Returns `x · H`.
    pub(crate) fn mul(&self, x: u128) -> u128 {
        let x = x.to_be_bytes();
        let mut z = self.m[usize::from(x[15] & 0x0f)];

        for i in (0..BLOCK_SIZE).rev() {
            let lo = usize::from(x[i] & 0x0f);
            let hi = usize::from(x[i] >> 4);
            if i != BLOCK_SIZE - 1 {
                z = shift4(z) ^ self.m[lo];
            }
            z = shift4(z) ^ self.m[hi];
        }
        z
    }

    /// Folds whole blocks into the accumulator one at a time.
    pub(crate) fn update(&self, acc: &mut [u8; BLOCK_SIZE], blocks: &[u8]) {
        let mut y = u128::from_be_bytes(*acc);
        for block in blocks.chunks_exact(BLOCK_SIZE) {
            y = self.mul(y ^ load(block));
        }
        *acc = y.to_be_bytes();
    }
}

#[inline(always)]
fn shift4(z: u128) -> u128 {
    let rem = (z & 0x0f) as usize;
    (z >> 4) ^ (u128::from(LAST4[rem]) << 112)
}

#[inline(always)]
fn load(block: &[u8]) -> u128 {
    let mut bytes = [0u8; BLOCK_SIZE];
    bytes.copy_from_slice(block);
    u128::from_be_bytes(bytes)
}

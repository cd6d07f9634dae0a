//======================================================================
// src/backends/aesni.rs
// AES-NI kernels. Lanes are interleaved so N independent blocks share
// each round-key load.
//======================================================================

use super::soft::RoundKeys;
use core::arch::x86_64::*;

#[inline]
#[target_feature(enable = "aes,sse2")]
unsafe fn load_keys(keys: &RoundKeys) -> [__m128i; 15] {
    let mut out = [_mm_setzero_si128(); 15];
    for (reg, key) in out.iter_mut().zip(keys) {
        *reg = _mm_loadu_si128(key.as_ptr().cast());
    }
    out
}

/// Builds the equivalent-inverse-cipher schedule from the encryption one.
///
/// # Safety
/// The CPU must support AES-NI and SSE2.
#[target_feature(enable = "aes,sse2")]
pub(crate) unsafe fn invert_keys(encrypt: &RoundKeys, rounds: usize, decrypt: &mut RoundKeys) {
    decrypt[0] = encrypt[rounds];
    for i in 1..rounds {
        let k = _mm_loadu_si128(encrypt[rounds - i].as_ptr().cast());
        _mm_storeu_si128(decrypt[i].as_mut_ptr().cast(), _mm_aesimc_si128(k));
    }
    decrypt[rounds] = encrypt[0];
}

/// Encrypts `N` consecutive 16-byte blocks in place.
///
/// # Safety
/// The CPU must support AES-NI and SSE2.
#[target_feature(enable = "aes,sse2")]
pub(crate) unsafe fn encrypt<const N: usize>(keys: &RoundKeys, rounds: usize, blocks: &mut [u8]) {
    assert_eq!(blocks.len(), 16 * N);
    let rk = load_keys(keys);
    let ptr = blocks.as_mut_ptr();

    let mut lanes = [_mm_setzero_si128(); N];
    for (i, lane) in lanes.iter_mut().enumerate() {
        *lane = _mm_xor_si128(_mm_loadu_si128(ptr.add(16 * i).cast()), rk[0]);
    }
    for key in &rk[1..rounds] {
        for lane in lanes.iter_mut() {
            *lane = _mm_aesenc_si128(*lane, *key);
        }
    }
    for (i, lane) in lanes.iter().enumerate() {
        let out = _mm_aesenclast_si128(*lane, rk[rounds]);
        _mm_storeu_si128(ptr.add(16 * i).cast(), out);
    }
}

/// Decrypts `N` consecutive 16-byte blocks in place with the schedule from
/// [`invert_keys`].
///
/// # Safety
/// The CPU must support AES-NI and SSE2.
#[target_feature(enable = "aes,sse2")]
pub(crate) unsafe fn decrypt<const N: usize>(keys: &RoundKeys, rounds: usize, blocks: &mut [u8]) {
    assert_eq!(blocks.len(), 16 * N);
    let rk = load_keys(keys);
    let ptr = blocks.as_mut_ptr();

    let mut lanes = [_mm_setzero_si128(); N];
    for (i, lane) in lanes.iter_mut().enumerate() {
        *lane = _mm_xor_si128(_mm_loadu_si128(ptr.add(16 * i).cast()), rk[0]);
    }
    for key in &rk[1..rounds] {
        for lane in lanes.iter_mut() {
            *lane = _mm_aesdec_si128(*lane, *key);
        }
    }
    for (i, lane) in lanes.iter().enumerate() {
        let out = _mm_aesdeclast_si128(*lane, rk[rounds]);
        _mm_storeu_si128(ptr.add(16 * i).cast(), out);
    }
}

//======================================================================
// src/backends/soft.rs
// Portable (table-based) AES round functions.
//======================================================================

use crate::consts::{AES_INV_SBOX, AES_MAX_ROUND_KEYS, AES_RCON, AES_SBOX};
use zeroize::Zeroize;

/// Expanded round keys, stored as bytes in FIPS-197 order.
pub(crate) type RoundKeys = [[u8; 16]; AES_MAX_ROUND_KEYS];

/// FIPS-197 key expansion. `key` is 16, 24 or 32 bytes.
pub(crate) fn expand_key(key: &[u8], rounds: usize, out: &mut RoundKeys) {
    let nk = key.len() / 4;
    let total = 4 * (rounds + 1);
    let mut w = [0u32; 4 * AES_MAX_ROUND_KEYS];

    for (word, chunk) in w.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for i in nk..total {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ (u32::from(AES_RCON[i / nk - 1]) << 24);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        w[i] = w[i - nk] ^ temp;
    }

    for (r, round_key) in out.iter_mut().take(rounds + 1).enumerate() {
        for c in 0..4 {
            round_key[4 * c..4 * c + 4].copy_from_slice(&w[4 * r + c].to_be_bytes());
        }
    }
    w.zeroize();
}

#[inline(always)]
fn sub_word(x: u32) -> u32 {
    let b = x.to_be_bytes();
    u32::from_be_bytes([
        AES_SBOX[b[0] as usize],
        AES_SBOX[b[1] as usize],
        AES_SBOX[b[2] as usize],
        AES_SBOX[b[3] as usize],
    ])
}

// --- Round steps (state is column-major, as loaded from the block) ---

#[inline(always)]
fn add_round_key(state: &mut [u8; 16], key: &[u8; 16]) {
    for (s, k) in state.iter_mut().zip(key) {
        *s ^= k;
    }
}

#[inline(always)]
fn sub_bytes(state: &mut [u8; 16], sbox: &[u8; 256]) {
    for s in state.iter_mut() {
        *s = sbox[*s as usize];
    }
}

#[inline(always)]
fn shift_rows(state: &mut [u8; 16]) {
    let old = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[4 * c + r] = old[4 * ((c + r) % 4) + r];
        }
    }
}

#[inline(always)]
fn inv_shift_rows(state: &mut [u8; 16]) {
    let old = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[4 * ((c + r) % 4) + r] = old[4 * c + r];
        }
    }
}

/// Multiplication by `x` in GF(2^8).
#[inline(always)]
fn xtime(x: u8) -> u8 {
    (x << 1) ^ (0x1b & 0u8.wrapping_sub(x >> 7))
}

#[inline(always)]
fn mix_columns(state: &mut [u8; 16]) {
    for col in state.chunks_exact_mut(4) {
        let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
        let t = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ t ^ xtime(a0 ^ a1);
        col[1] = a1 ^ t ^ xtime(a1 ^ a2);
        col[2] = a2 ^ t ^ xtime(a2 ^ a3);
        col[3] = a3 ^ t ^ xtime(a3 ^ a0);
    }
}

#[inline(always)]
fn inv_mix_columns(state: &mut [u8; 16]) {
    // Pre-multiply by {04}x^2 + {05} so the forward MixColumns finishes the job.
    for col in state.chunks_exact_mut(4) {
        let u = xtime(xtime(col[0] ^ col[2]));
        let v = xtime(xtime(col[1] ^ col[3]));
        col[0] ^= u;
        col[1] ^= v;
        col[2] ^= u;
        col[3] ^= v;
    }
    mix_columns(state);
}

// --- Block transforms ---

/// Encrypts one 16-byte block in place.
pub(crate) fn encrypt_block(keys: &RoundKeys, rounds: usize, block: &mut [u8]) {
    let mut state = [0u8; 16];
    state.copy_from_slice(block);

    add_round_key(&mut state, &keys[0]);
    for key in &keys[1..rounds] {
        sub_bytes(&mut state, &AES_SBOX);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, key);
    }
    sub_bytes(&mut state, &AES_SBOX);
    shift_rows(&mut state);
    add_round_key(&mut state, &keys[rounds]);

    block.copy_from_slice(&state);
    state.zeroize();
}

/// Decrypts one 16-byte block in place (straight inverse cipher).
pub(crate) fn decrypt_block(keys: &RoundKeys, rounds: usize, block: &mut [u8]) {
    let mut state = [0u8; 16];
    state.copy_from_slice(block);

    add_round_key(&mut state, &keys[rounds]);
    for key in keys[1..rounds].iter().rev() {
        inv_shift_rows(&mut state);
        sub_bytes(&mut state, &AES_INV_SBOX);
        add_round_key(&mut state, key);
        inv_mix_columns(&mut state);
    }
    inv_shift_rows(&mut state);
    sub_bytes(&mut state, &AES_INV_SBOX);
    add_round_key(&mut state, &keys[0]);

    block.copy_from_slice(&state);
    state.zeroize();
}

//======================================================================
// ghash/src/consts.rs
// GHASH constants.
//======================================================================

/// GHASH block and tag length in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Powers of H kept by the carry-less backend; also its aggregation width.
pub const POWERS: usize = 8;

/// Reduction of the four bits shifted out of a 128-bit value, pre-shifted
/// so that `LAST4[rem] << 112` folds them back in (Shoup's method).
pub(crate) const LAST4: [u16; 16] = [
    0x0000, 0x1c20, 0x3840, 0x2460, 0x7080, 0x6ca0, 0x48c0, 0x54e0,
    0xe100, 0xfd20, 0xd940, 0xc560, 0x9180, 0x8da0, 0xa9c0, 0xb5e0,
];

/// The bit-reflected field polynomial `x^128 + x^7 + x^2 + x + 1`.
pub(crate) const R: u128 = 0xe1 << 120;

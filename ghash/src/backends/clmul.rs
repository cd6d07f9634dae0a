//======================================================================
// ghash/src/backends/clmul.rs
// PCLMULQDQ backend. Operands are byte-reversed so that the carry-less
// product, shifted left by one, lines up with GCM's reflected bit order.
// Eight blocks are multiplied by H^8..H^1 and summed before a single
// reduction. Eight is the aggregation width for any batch the modes hand
// over (up to 64 blocks); longer inputs run as consecutive groups of
// eight plus a block-at-a-time tail, with the same result as one block at
// a time.
//======================================================================

use crate::consts::{BLOCK_SIZE, POWERS};
use core::arch::x86_64::*;
use zeroize::Zeroize;

/// Byte-reversed powers `H^1 ..= H^POWERS`; `h[0]` is `H`.
#[derive(Clone, Zeroize)]
pub(crate) struct Powers {
    h: [[u8; BLOCK_SIZE]; POWERS],
}

impl Powers {
    /// # Safety
    /// The CPU must support PCLMULQDQ, SSE2 and SSSE3.
    #[target_feature(enable = "pclmulqdq,sse2,ssse3")]
    pub(crate) unsafe fn new(h: &[u8; BLOCK_SIZE]) -> Self {
        let mut powers = Self {
            h: [[0u8; BLOCK_SIZE]; POWERS],
        };
        let h1 = bswap(_mm_loadu_si128(h.as_ptr().cast()));
        let mut current = h1;
        for (i, slot) in powers.h.iter_mut().enumerate() {
            if i > 0 {
                current = gfmul(current, h1);
            }
            _mm_storeu_si128(slot.as_mut_ptr().cast(), current);
        }
        powers
    }

    /// Folds whole blocks into the accumulator.
    ///
    /// # Safety
    /// Same CPU requirements as [`Powers::new`].
    #[target_feature(enable = "pclmulqdq,sse2,ssse3")]
    pub(crate) unsafe fn update(&self, acc: &mut [u8; BLOCK_SIZE], blocks: &[u8]) {
        let mut hp = [_mm_setzero_si128(); POWERS];
        for (reg, power) in hp.iter_mut().zip(&self.h) {
            *reg = _mm_loadu_si128(power.as_ptr().cast());
        }
        let mut y = bswap(_mm_loadu_si128(acc.as_ptr().cast()));

        let mut groups = blocks.chunks_exact(BLOCK_SIZE * POWERS);
        for group in &mut groups {
            // y' = (y + X1)·H^8 + X2·H^7 + ... + X8·H
            let mut lo = _mm_setzero_si128();
            let mut mid = _mm_setzero_si128();
            let mut hi = _mm_setzero_si128();
            for (i, block) in group.chunks_exact(BLOCK_SIZE).enumerate() {
                let mut x = bswap(_mm_loadu_si128(block.as_ptr().cast()));
                if i == 0 {
                    x = _mm_xor_si128(x, y);
                }
                mul_accumulate(x, hp[POWERS - 1 - i], &mut lo, &mut mid, &mut hi);
            }
            y = reduce(lo, mid, hi);
        }

        for block in groups.remainder().chunks_exact(BLOCK_SIZE) {
            let x = bswap(_mm_loadu_si128(block.as_ptr().cast()));
            y = gfmul(_mm_xor_si128(y, x), hp[0]);
        }

        _mm_storeu_si128(acc.as_mut_ptr().cast(), bswap(y));
    }
}

#[inline]
#[target_feature(enable = "sse2,ssse3")]
unsafe fn bswap(v: __m128i) -> __m128i {
    let mask = _mm_set_epi8(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15);
    _mm_shuffle_epi8(v, mask)
}

/// Adds the unreduced 256-bit product `a · b` into `lo`, `mid`, `hi`
/// (Karatsuba: `mid` collects `(a0 + a1)(b0 + b1)`).
#[inline]
#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn mul_accumulate(a: __m128i, b: __m128i, lo: &mut __m128i, mid: &mut __m128i, hi: &mut __m128i) {
    *lo = _mm_xor_si128(*lo, _mm_clmulepi64_si128(a, b, 0x00));
    *hi = _mm_xor_si128(*hi, _mm_clmulepi64_si128(a, b, 0x11));
    let a_sum = _mm_xor_si128(a, _mm_shuffle_epi32(a, 0x4e));
    let b_sum = _mm_xor_si128(b, _mm_shuffle_epi32(b, 0x4e));
    *mid = _mm_xor_si128(*mid, _mm_clmulepi64_si128(a_sum, b_sum, 0x00));
}

/// Turns accumulated Karatsuba terms into a reduced field element.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn reduce(lo: __m128i, mid: __m128i, hi: __m128i) -> __m128i {
    let mid = _mm_xor_si128(mid, _mm_xor_si128(lo, hi));
    let mut low = _mm_xor_si128(lo, _mm_slli_si128(mid, 8));
    let mut high = _mm_xor_si128(hi, _mm_srli_si128(mid, 8));

    // Shift the 256-bit product left by one.
    let carry_low = _mm_srli_epi32(low, 31);
    let carry_high = _mm_srli_epi32(high, 31);
    low = _mm_slli_epi32(low, 1);
    high = _mm_slli_epi32(high, 1);
    let cross = _mm_srli_si128(carry_low, 12);
    low = _mm_or_si128(low, _mm_slli_si128(carry_low, 4));
    high = _mm_or_si128(high, _mm_slli_si128(carry_high, 4));
    high = _mm_or_si128(high, cross);

    // First phase of the reduction.
    let a = _mm_slli_epi32(low, 31);
    let b = _mm_slli_epi32(low, 30);
    let c = _mm_slli_epi32(low, 25);
    let t = _mm_xor_si128(_mm_xor_si128(a, b), c);
    let spill = _mm_srli_si128(t, 4);
    low = _mm_xor_si128(low, _mm_slli_si128(t, 12));

    // Second phase.
    let d = _mm_srli_epi32(low, 1);
    let e = _mm_srli_epi32(low, 2);
    let f = _mm_srli_epi32(low, 7);
    let u = _mm_xor_si128(_mm_xor_si128(d, e), _mm_xor_si128(f, spill));
    low = _mm_xor_si128(low, u);
    _mm_xor_si128(high, low)
}

#[inline]
#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn gfmul(a: __m128i, b: __m128i) -> __m128i {
    let mut lo = _mm_setzero_si128();
    let mut mid = _mm_setzero_si128();
    let mut hi = _mm_setzero_si128();
    mul_accumulate(a, b, &mut lo, &mut mid, &mut hi);
    reduce(lo, mid, hi)
}

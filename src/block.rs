//======================================================================
// src/block.rs
// 블록 암호 배치 계약: 배치 폭, 가속 능력 집합, BlockCipher 트레잇.
//======================================================================

use crate::error::{Error, Result};

// --- Batch Widths ---

/// Number of cipher blocks moved through one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BatchWidth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
    ThirtyTwo = 32,
}

impl BatchWidth {
    /// Every width, narrowest first.
    pub const ALL: [BatchWidth; 6] = [
        BatchWidth::One,
        BatchWidth::Two,
        BatchWidth::Four,
        BatchWidth::Eight,
        BatchWidth::Sixteen,
        BatchWidth::ThirtyTwo,
    ];

    /// Widest width any cipher may be driven with.
    pub const MAX: BatchWidth = BatchWidth::ThirtyTwo;

    #[inline]
    pub const fn blocks(self) -> usize {
        self as usize
    }

    /// Length in bytes of a batch buffer of this width.
    #[inline]
    pub const fn bytes(self, block_size: usize) -> usize {
        self.blocks() * block_size
    }

    pub fn from_blocks(blocks: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.blocks() == blocks)
    }

    /// The capability bit describing this width.
    pub const fn flag(self) -> HardwareAcceleration {
        match self {
            BatchWidth::One => HardwareAcceleration::BLOCK1,
            BatchWidth::Two => HardwareAcceleration::BLOCK2,
            BatchWidth::Four => HardwareAcceleration::BLOCK4,
            BatchWidth::Eight => HardwareAcceleration::BLOCK8,
            BatchWidth::Sixteen => HardwareAcceleration::BLOCK16,
            BatchWidth::ThirtyTwo => HardwareAcceleration::BLOCK32,
        }
    }
}

// --- Capability Set ---

bitflags::bitflags! {
    /// Batch widths backed by a real SIMD kernel on this instance.
    ///
    /// Purely advisory: every width is always callable, unflagged ones are
    /// composed from narrower calls.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HardwareAcceleration: u8 {
        const BLOCK1 = 1 << 0;
        const BLOCK2 = 1 << 1;
        const BLOCK4 = 1 << 2;
        const BLOCK8 = 1 << 3;
        const BLOCK16 = 1 << 4;
        const BLOCK32 = 1 << 5;
    }
}

impl HardwareAcceleration {
    /// Widest flagged width; `One` when nothing is accelerated.
    pub fn widest(self) -> BatchWidth {
        BatchWidth::ALL
            .into_iter()
            .rev()
            .find(|w| self.contains(w.flag()))
            .unwrap_or(BatchWidth::One)
    }
}

// --- Block Cipher Contract ---

/// A keyed block cipher with batched entry points.
///
/// Implementors supply the single-block transforms. Every wider call has a
/// default that splits the buffer into two halves and recurses, so a
/// backend only overrides the widths it has a kernel for; overriding
/// `encrypt8` alone also speeds up 16- and 32-block calls.
///
/// The `encryptN`/`decryptN` methods take a buffer of exactly
/// `N * BLOCK_SIZE` bytes.
///
/// # Panics
///
/// `encryptN`, `decryptN`, `encrypt_batch` and `decrypt_batch` panic when
/// the buffer length is anything else, on every backend. Use the checked
/// [`BlockCipher::encrypt`] family when the length is not already known to
/// be right.
pub trait BlockCipher {
    /// Block length in bytes.
    const BLOCK_SIZE: usize;

    /// Human readable algorithm name, e.g. `"AES-128"`.
    fn name(&self) -> &'static str;

    /// Widths with a genuine accelerated path.
    fn hardware_acceleration(&self) -> HardwareAcceleration {
        HardwareAcceleration::empty()
    }

    fn encrypt1(&self, block: &mut [u8]);
    fn decrypt1(&self, block: &mut [u8]);

    fn encrypt2(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 2);
        self.encrypt1(lo);
        self.encrypt1(hi);
    }

    fn encrypt4(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 4);
        self.encrypt2(lo);
        self.encrypt2(hi);
    }

    fn encrypt8(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 8);
        self.encrypt4(lo);
        self.encrypt4(hi);
    }

    fn encrypt16(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 16);
        self.encrypt8(lo);
        self.encrypt8(hi);
    }

    fn encrypt32(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 32);
        self.encrypt16(lo);
        self.encrypt16(hi);
    }

    fn decrypt2(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 2);
        self.decrypt1(lo);
        self.decrypt1(hi);
    }

    fn decrypt4(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 4);
        self.decrypt2(lo);
        self.decrypt2(hi);
    }

    fn decrypt8(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 8);
        self.decrypt4(lo);
        self.decrypt4(hi);
    }

    fn decrypt16(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 16);
        self.decrypt8(lo);
        self.decrypt8(hi);
    }

    fn decrypt32(&self, blocks: &mut [u8]) {
        let (lo, hi) = halves::<Self>(blocks, 32);
        self.decrypt16(lo);
        self.decrypt16(hi);
    }

    /// Encrypts exactly `width` blocks in place.
    #[inline]
    fn encrypt_batch(&self, width: BatchWidth, blocks: &mut [u8]) {
        check_batch::<Self>(blocks, width.blocks());
        match width {
            BatchWidth::One => self.encrypt1(blocks),
            BatchWidth::Two => self.encrypt2(blocks),
            BatchWidth::Four => self.encrypt4(blocks),
            BatchWidth::Eight => self.encrypt8(blocks),
            BatchWidth::Sixteen => self.encrypt16(blocks),
            BatchWidth::ThirtyTwo => self.encrypt32(blocks),
        }
    }

    /// Decrypts exactly `width` blocks in place.
    #[inline]
    fn decrypt_batch(&self, width: BatchWidth, blocks: &mut [u8]) {
        check_batch::<Self>(blocks, width.blocks());
        match width {
            BatchWidth::One => self.decrypt1(blocks),
            BatchWidth::Two => self.decrypt2(blocks),
            BatchWidth::Four => self.decrypt4(blocks),
            BatchWidth::Eight => self.decrypt8(blocks),
            BatchWidth::Sixteen => self.decrypt16(blocks),
            BatchWidth::ThirtyTwo => self.decrypt32(blocks),
        }
    }

    /// Encrypts the leading `width` blocks of `buffer` in place.
    fn encrypt_in_place(&self, width: BatchWidth, buffer: &mut [u8]) -> Result<()> {
        let len = width.bytes(Self::BLOCK_SIZE);
        Error::check_len(len, buffer.len())?;
        self.encrypt_batch(width, &mut buffer[..len]);
        Ok(())
    }

    /// Decrypts the leading `width` blocks of `buffer` in place.
    fn decrypt_in_place(&self, width: BatchWidth, buffer: &mut [u8]) -> Result<()> {
        let len = width.bytes(Self::BLOCK_SIZE);
        Error::check_len(len, buffer.len())?;
        self.decrypt_batch(width, &mut buffer[..len]);
        Ok(())
    }

    /// Encrypts `width` blocks of `source` into `destination`.
    fn encrypt(&self, width: BatchWidth, source: &[u8], destination: &mut [u8]) -> Result<()> {
        let len = width.bytes(Self::BLOCK_SIZE);
        Error::check_len(len, source.len())?;
        Error::check_len(len, destination.len())?;
        destination[..len].copy_from_slice(&source[..len]);
        self.encrypt_batch(width, &mut destination[..len]);
        Ok(())
    }

    /// Decrypts `width` blocks of `source` into `destination`.
    fn decrypt(&self, width: BatchWidth, source: &[u8], destination: &mut [u8]) -> Result<()> {
        let len = width.bytes(Self::BLOCK_SIZE);
        Error::check_len(len, source.len())?;
        Error::check_len(len, destination.len())?;
        destination[..len].copy_from_slice(&source[..len]);
        self.decrypt_batch(width, &mut destination[..len]);
        Ok(())
    }
}

/// Panics unless `blocks` holds exactly `count` blocks of `C`.
#[inline(always)]
pub fn check_batch<C: BlockCipher + ?Sized>(blocks: &[u8], count: usize) {
    assert_eq!(
        blocks.len(),
        count * C::BLOCK_SIZE,
        "batch of {count} blocks must be {} bytes",
        count * C::BLOCK_SIZE
    );
}

#[inline(always)]
fn halves<C: BlockCipher + ?Sized>(blocks: &mut [u8], count: usize) -> (&mut [u8], &mut [u8]) {
    check_batch::<C>(blocks, count);
    let mid = blocks.len() / 2;
    blocks.split_at_mut(mid)
}

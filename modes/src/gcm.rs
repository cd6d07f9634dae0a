//======================================================================
// modes/src/gcm.rs
// GCM authenticated encryption (NIST SP 800-38D) with 96-bit nonces.
//
// The body keystream is generated exactly as in CTR mode, one batch of
// the cipher's widest accelerated width at a time, and each ciphertext
// batch is fed to GHASH as soon as it exists.
//======================================================================

use crate::ctr::{add32, fill_counters, xor_in_place, BLOCK_SIZE};
use aead::{
    consts::{U0, U12, U16},
    generic_array::GenericArray,
    AeadCore, AeadInPlace, Nonce, Tag,
};
use batchblock::{Acceleration, BatchWidth, BlockCipher, Error, Result};
use batchblock_ghash::GHash;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// Nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// Tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Longest plaintext GCM allows under one nonce: 2^39 - 256 bits.
pub const MAX_MESSAGE_LEN: u64 = (1 << 36) - 32;

const MAX_BATCH_BYTES: usize = BatchWidth::MAX.bytes(BLOCK_SIZE);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Seal,
    Open,
}

/// A GCM session bound to one block-cipher key.
///
/// Holds the cipher and a GHASH instance keyed with `H = E(K, 0^128)`.
/// Counter block, lengths and keystream are local to each call.
pub struct Gcm<C: BlockCipher> {
    cipher: C,
    ghash: GHash,
    width: BatchWidth,
}

impl<C: BlockCipher> Gcm<C> {
    pub fn new(cipher: C) -> Result<Self> {
        Self::with_acceleration(cipher, Acceleration::Auto)
    }

    /// Like [`Gcm::new`], with an explicit GHASH backend preference.
    pub fn with_acceleration(cipher: C, acceleration: Acceleration) -> Result<Self> {
        if C::BLOCK_SIZE != BLOCK_SIZE {
            return Err(Error::InvalidArgument("GCM requires a 16-byte block cipher"));
        }

        let mut h = Zeroizing::new([0u8; BLOCK_SIZE]);
        cipher.encrypt1(&mut h[..]);
        let ghash = GHash::with_acceleration(&h[..], acceleration)?;
        let width = cipher.hardware_acceleration().widest();

        tracing::trace!(
            cipher = cipher.name(),
            width = width.blocks(),
            ghash = ghash.backend_name(),
            "gcm session ready"
        );
        Ok(Self {
            cipher,
            ghash,
            width,
        })
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Encrypts `plaintext` into `ciphertext` and writes the 16-byte tag.
    ///
    /// Never reuse a nonce with the same key; this cannot be detected here.
    pub fn encrypt(
        &mut self,
        nonce: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
        tag: &mut [u8],
        associated_data: &[u8],
    ) -> Result<()> {
        check_nonce(nonce)?;
        if ciphertext.len() != plaintext.len() {
            return Err(Error::InvalidArgument("ciphertext length must equal plaintext length"));
        }
        if tag.len() != TAG_SIZE {
            return Err(Error::InvalidArgument("tag must be 16 bytes"));
        }
        check_message_len(plaintext.len())?;

        ciphertext.copy_from_slice(plaintext);
        let computed = crypt(
            &self.cipher,
            &mut self.ghash,
            self.width,
            nonce,
            associated_data,
            ciphertext,
            Direction::Seal,
        );
        tag.copy_from_slice(&computed);
        Ok(())
    }

    /// Decrypts `ciphertext` into `plaintext` after checking `tag`.
    ///
    /// On [`Error::AuthenticationTagMismatch`] `plaintext` is zero-filled.
    pub fn decrypt(
        &mut self,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        plaintext: &mut [u8],
        associated_data: &[u8],
    ) -> Result<()> {
        check_nonce(nonce)?;
        if plaintext.len() != ciphertext.len() {
            return Err(Error::InvalidArgument("plaintext length must equal ciphertext length"));
        }
        if tag.len() != TAG_SIZE {
            return Err(Error::InvalidArgument("tag must be 16 bytes"));
        }
        check_message_len(ciphertext.len())?;

        plaintext.copy_from_slice(ciphertext);
        let computed = crypt(
            &self.cipher,
            &mut self.ghash,
            self.width,
            nonce,
            associated_data,
            plaintext,
            Direction::Open,
        );
        verify(&computed, tag, plaintext)
    }
}

fn check_nonce(nonce: &[u8]) -> Result<()> {
    if nonce.len() != NONCE_SIZE {
        return Err(Error::InvalidArgument("nonce must be 12 bytes"));
    }
    Ok(())
}

fn check_message_len(len: usize) -> Result<()> {
    if len as u64 > MAX_MESSAGE_LEN {
        return Err(Error::InvalidArgument("message exceeds the GCM length limit"));
    }
    Ok(())
}

/// Constant-time tag check; wipes `buffer` on mismatch.
fn verify(computed: &[u8; TAG_SIZE], received: &[u8], buffer: &mut [u8]) -> Result<()> {
    if bool::from(computed[..].ct_eq(received)) {
        Ok(())
    } else {
        buffer.zeroize();
        Err(Error::AuthenticationTagMismatch)
    }
}

/// `len(A) ‖ len(C)` in bits, both 64-bit big-endian.
fn length_block(aad_len: usize, text_len: usize) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    block[..8].copy_from_slice(&((aad_len as u64) * 8).to_be_bytes());
    block[8..].copy_from_slice(&((text_len as u64) * 8).to_be_bytes());
    block
}

/// Smallest width covering `blocks`, capped at `widest`.
fn tail_width(blocks: usize, widest: BatchWidth) -> BatchWidth {
    BatchWidth::ALL
        .into_iter()
        .find(|w| w.blocks() >= blocks)
        .map_or(widest, |w| w.min(widest))
}

/// Runs the CTR body over `buffer` in place and returns the tag.
/// `nonce` is already validated to be 12 bytes.
fn crypt<C: BlockCipher>(
    cipher: &C,
    ghash: &mut GHash,
    width: BatchWidth,
    nonce: &[u8],
    associated_data: &[u8],
    buffer: &mut [u8],
    direction: Direction,
) -> [u8; TAG_SIZE] {
    // J0 = nonce ‖ 0x00000001
    let mut j0 = [0u8; BLOCK_SIZE];
    j0[..NONCE_SIZE].copy_from_slice(nonce);
    j0[BLOCK_SIZE - 1] = 1;

    let mut tag_mask = Zeroizing::new(j0);
    cipher.encrypt1(&mut tag_mask[..]);

    let mut counter = Zeroizing::new(j0);
    add32(&mut counter, 1);

    ghash.reset();
    ghash.update(associated_data);
    ghash.pad();

    let mut keystream = Zeroizing::new([0u8; MAX_BATCH_BYTES]);
    let batch_len = width.bytes(BLOCK_SIZE);
    for chunk in buffer.chunks_mut(batch_len) {
        let lanes = if chunk.len() == batch_len {
            width
        } else {
            tail_width(chunk.len().div_ceil(BLOCK_SIZE), width)
        };
        let ks = &mut keystream[..lanes.bytes(BLOCK_SIZE)];
        fill_counters(ks, &mut counter);
        cipher.encrypt_batch(lanes, ks);

        match direction {
            Direction::Seal => {
                xor_in_place(chunk, ks);
                ghash.update(chunk);
            }
            Direction::Open => {
                ghash.update(chunk);
                xor_in_place(chunk, ks);
            }
        }
    }

    ghash.pad();
    ghash.update(&length_block(associated_data.len(), buffer.len()));
    let mut tag = ghash.finalize_reset();
    xor_in_place(&mut tag, &tag_mask[..]);
    tag
}

// --- RustCrypto AEAD traits ---

impl<C: BlockCipher> AeadCore for Gcm<C> {
    type NonceSize = U12;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl<C: BlockCipher> AeadInPlace for Gcm<C> {
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        check_message_len(buffer.len()).map_err(|_| aead::Error)?;

        // The trait takes `&self`, so this call runs on its own GHASH copy.
        let mut ghash = self.ghash.clone();
        let tag = crypt(
            &self.cipher,
            &mut ghash,
            self.width,
            nonce.as_slice(),
            associated_data,
            buffer,
            Direction::Seal,
        );
        Ok(GenericArray::clone_from_slice(&tag))
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        check_message_len(buffer.len()).map_err(|_| aead::Error)?;

        let mut ghash = self.ghash.clone();
        let computed = crypt(
            &self.cipher,
            &mut ghash,
            self.width,
            nonce.as_slice(),
            associated_data,
            buffer,
            Direction::Open,
        );
        verify(&computed, tag.as_slice(), buffer).map_err(|_| aead::Error)
    }
}

impl<C: BlockCipher> core::fmt::Debug for Gcm<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gcm")
            .field("cipher", &self.cipher.name())
            .field("width", &self.width)
            .field("ghash", &self.ghash)
            .finish()
    }
}

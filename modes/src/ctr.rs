//======================================================================
// modes/src/ctr.rs
// CTR 스트림 모드. 암호가 광고하는 가장 넓은 배치 폭으로 키스트림을 생성합니다.
//======================================================================

use batchblock::{BatchWidth, BlockCipher, Error, Result};
use cipher::inout::InOutBuf;
use cipher::{StreamCipher, StreamCipherError};
use zeroize::{Zeroize, Zeroizing};

/// Counter block length handled by the modes in this crate.
pub const BLOCK_SIZE: usize = 16;

/// Adds `n` to the big-endian 32-bit counter in the last four bytes.
/// The upper 96 bits are never touched, so the field wraps modulo 2^32.
#[inline]
pub(crate) fn add32(block: &mut [u8; BLOCK_SIZE], n: u32) {
    let low = u32::from_be_bytes([block[12], block[13], block[14], block[15]]);
    block[12..].copy_from_slice(&low.wrapping_add(n).to_be_bytes());
}

/// Writes consecutive counter blocks into every lane of `lanes`, leaving
/// `counter` on the value after the last lane.
#[inline]
pub(crate) fn fill_counters(lanes: &mut [u8], counter: &mut [u8; BLOCK_SIZE]) {
    for lane in lanes.chunks_exact_mut(BLOCK_SIZE) {
        lane.copy_from_slice(counter);
        add32(counter, 1);
    }
}

#[inline]
pub(crate) fn xor_in_place(data: &mut [u8], keystream: &[u8]) {
    for (d, k) in data.iter_mut().zip(keystream) {
        *d ^= k;
    }
}

/// Counter mode over any 128-bit [`BlockCipher`].
///
/// Encryption and decryption are the same call. Keystream is produced one
/// batch at a time; bytes left over from a batch are used by the next
/// call before a new batch is generated.
pub struct Ctr<C: BlockCipher> {
    cipher: C,
    initial: [u8; BLOCK_SIZE],
    counter: [u8; BLOCK_SIZE],
    width: BatchWidth,
    keystream: Zeroizing<Vec<u8>>,
    /// Bytes of `keystream` already consumed; equal to its length when idle.
    used: usize,
}

impl<C: BlockCipher> Ctr<C> {
    /// Starts a stream at `iv`, left-aligned and zero-padded to a block.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self> {
        if C::BLOCK_SIZE != BLOCK_SIZE {
            return Err(Error::InvalidArgument("CTR requires a 16-byte block cipher"));
        }
        if iv.len() > BLOCK_SIZE {
            return Err(Error::InvalidArgument("IV longer than the cipher block"));
        }

        let mut initial = [0u8; BLOCK_SIZE];
        initial[..iv.len()].copy_from_slice(iv);

        let width = cipher.hardware_acceleration().widest();
        let len = width.bytes(BLOCK_SIZE);
        tracing::trace!(cipher = cipher.name(), width = width.blocks(), "ctr stream ready");

        Ok(Self {
            cipher,
            initial,
            counter: initial,
            width,
            keystream: Zeroizing::new(vec![0u8; len]),
            used: len,
        })
    }

    /// Batch width the keystream is generated with.
    pub fn batch_width(&self) -> BatchWidth {
        self.width
    }

    /// The counter block the next generated batch starts from.
    pub fn counter(&self) -> [u8; BLOCK_SIZE] {
        self.counter
    }

    /// XORs keystream into `source`, writing to `destination`.
    pub fn update(&mut self, source: &[u8], destination: &mut [u8]) -> Result<()> {
        Error::check_len(source.len(), destination.len())?;
        let out = &mut destination[..source.len()];
        out.copy_from_slice(source);
        self.update_in_place(out);
        Ok(())
    }

    /// XORs keystream into `buffer` in place.
    pub fn update_in_place(&mut self, buffer: &mut [u8]) {
        let mut offset = 0;
        while offset < buffer.len() {
            if self.used == self.keystream.len() {
                self.refill();
            }
            let n = (self.keystream.len() - self.used).min(buffer.len() - offset);
            xor_in_place(
                &mut buffer[offset..offset + n],
                &self.keystream[self.used..self.used + n],
            );
            self.used += n;
            offset += n;
        }
    }

    /// Rewinds to the initial counter and drops leftover keystream.
    pub fn reset(&mut self) {
        self.counter = self.initial;
        self.keystream.as_mut_slice().zeroize();
        self.used = self.keystream.len();
    }

    fn refill(&mut self) {
        fill_counters(&mut self.keystream, &mut self.counter);
        self.cipher.encrypt_batch(self.width, &mut self.keystream);
        self.used = 0;
    }
}

impl<C: BlockCipher> StreamCipher for Ctr<C> {
    fn try_apply_keystream_inout(
        &mut self,
        mut buf: InOutBuf<'_, '_, u8>,
    ) -> core::result::Result<(), StreamCipherError> {
        while !buf.is_empty() {
            if self.used == self.keystream.len() {
                self.refill();
            }
            let n = (self.keystream.len() - self.used).min(buf.len());
            let (mut head, tail) = buf.split_at(n);
            head.xor_in2out(&self.keystream[self.used..self.used + n]);
            self.used += n;
            buf = tail;
        }
        Ok(())
    }
}

impl<C: BlockCipher> Drop for Ctr<C> {
    fn drop(&mut self) {
        self.initial.zeroize();
        self.counter.zeroize();
    }
}

impl<C: BlockCipher> core::fmt::Debug for Ctr<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ctr")
            .field("cipher", &self.cipher.name())
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

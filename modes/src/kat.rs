//======================================================================
// modes/src/kat.rs
// Known-answer self test over the backends selected on this machine.
//======================================================================

//! Known Answer Tests
//!
//! Runs published vectors through the same code paths applications use,
//! with whatever backend CPU detection picked. Intended for start-up
//! checks.
//!
//! # Vector sources
//!
//! - AES block: FIPS-197 appendix C.1
//! - SM4 block: GB/T 32907-2016 example 1
//! - AES-128-CTR: NIST SP 800-38A F.5.1
//! - AES-128-GCM: McGrew/Viega GCM paper, test case 2
//!
//! ```
//! let results = batchblock_modes::kat::run_all();
//! assert!(results.all_passed());
//! ```

use crate::{Ctr, Gcm};
use batchblock::{Aes, BlockCipher, Sm4};

/// Outcome of one algorithm's vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KatTestResult {
    Passed,
    Failed,
}

impl From<bool> for KatTestResult {
    fn from(ok: bool) -> Self {
        if ok {
            KatTestResult::Passed
        } else {
            KatTestResult::Failed
        }
    }
}

/// Results of [`run_all`].
#[derive(Debug, Clone, Copy)]
pub struct KatResults {
    pub aes_128: KatTestResult,
    pub sm4: KatTestResult,
    pub aes_128_ctr: KatTestResult,
    pub aes_128_gcm: KatTestResult,
}

impl KatResults {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        [self.aes_128, self.sm4, self.aes_128_ctr, self.aes_128_gcm]
            .iter()
            .filter(|&&r| r == KatTestResult::Failed)
            .count()
    }
}

/// Runs every vector set.
pub fn run_all() -> KatResults {
    let results = KatResults {
        aes_128: kat_aes_128().into(),
        sm4: kat_sm4().into(),
        aes_128_ctr: kat_aes_128_ctr().into(),
        aes_128_gcm: kat_aes_128_gcm().into(),
    };
    if results.all_passed() {
        tracing::debug!("known-answer tests passed");
    } else {
        tracing::error!(?results, "known-answer tests failed");
    }
    results
}

// ============================================================================
// Vectors
// ============================================================================

mod vectors {
    pub const AES_KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    ];
    pub const AES_PLAINTEXT: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ];
    pub const AES_CIPHERTEXT: [u8; 16] = [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30,
        0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
    ];

    /// Key and plaintext are the same block.
    pub const SM4_KEY: [u8; 16] = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
        0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32, 0x10,
    ];
    pub const SM4_CIPHERTEXT: [u8; 16] = [
        0x68, 0x1e, 0xdf, 0x34, 0xd2, 0x06, 0x96, 0x5e,
        0x86, 0xb3, 0xe9, 0x4f, 0x53, 0x6e, 0x42, 0x46,
    ];

    pub const CTR_KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6,
        0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
    ];
    pub const CTR_IV: [u8; 16] = [
        0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7,
        0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff,
    ];
    pub const CTR_PLAINTEXT: [u8; 32] = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96,
        0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17, 0x2a,
        0xae, 0x2d, 0x8a, 0x57, 0x1e, 0x03, 0xac, 0x9c,
        0x9e, 0xb7, 0x6f, 0xac, 0x45, 0xaf, 0x8e, 0x51,
    ];
    pub const CTR_CIPHERTEXT: [u8; 32] = [
        0x87, 0x4d, 0x61, 0x91, 0xb6, 0x20, 0xe3, 0x26,
        0x1b, 0xef, 0x68, 0x64, 0x99, 0x0d, 0xb6, 0xce,
        0x98, 0x06, 0xf6, 0x6b, 0x79, 0x70, 0xfd, 0xff,
        0x86, 0x17, 0x18, 0x7b, 0xb9, 0xff, 0xfd, 0xff,
    ];

    /// GCM test case 2: zero key, zero nonce, one zero block.
    pub const GCM_CIPHERTEXT: [u8; 16] = [
        0x03, 0x88, 0xda, 0xce, 0x60, 0xb6, 0xa3, 0x92,
        0xf3, 0x28, 0xc2, 0xb9, 0x71, 0xb2, 0xfe, 0x78,
    ];
    pub const GCM_TAG: [u8; 16] = [
        0xab, 0x6e, 0x47, 0xd4, 0x2c, 0xec, 0x13, 0xbd,
        0xf5, 0x3a, 0x67, 0xb2, 0x12, 0x57, 0xbd, 0xdf,
    ];
}

// ============================================================================
// Individual checks
// ============================================================================

fn kat_aes_128() -> bool {
    let Ok(aes) = Aes::new(&vectors::AES_KEY) else {
        return false;
    };
    let mut block = vectors::AES_PLAINTEXT;
    aes.encrypt1(&mut block);
    let encrypted = block == vectors::AES_CIPHERTEXT;
    aes.decrypt1(&mut block);
    encrypted && block == vectors::AES_PLAINTEXT
}

fn kat_sm4() -> bool {
    let Ok(sm4) = Sm4::new(&vectors::SM4_KEY) else {
        return false;
    };
    let mut block = vectors::SM4_KEY;
    sm4.encrypt1(&mut block);
    let encrypted = block == vectors::SM4_CIPHERTEXT;
    sm4.decrypt1(&mut block);
    encrypted && block == vectors::SM4_KEY
}

fn kat_aes_128_ctr() -> bool {
    let Ok(aes) = Aes::new(&vectors::CTR_KEY) else {
        return false;
    };
    let Ok(mut ctr) = Ctr::new(aes, &vectors::CTR_IV) else {
        return false;
    };
    let mut buffer = vectors::CTR_PLAINTEXT;
    // Two calls so leftover keystream is exercised on narrow widths too.
    ctr.update_in_place(&mut buffer[..5]);
    ctr.update_in_place(&mut buffer[5..]);
    buffer == vectors::CTR_CIPHERTEXT
}

fn kat_aes_128_gcm() -> bool {
    let Ok(aes) = Aes::new(&[0u8; 16]) else {
        return false;
    };
    let Ok(mut gcm) = Gcm::new(aes) else {
        return false;
    };
    let nonce = [0u8; 12];
    let mut ciphertext = [0u8; 16];
    let mut tag = [0u8; 16];
    if gcm
        .encrypt(&nonce, &[0u8; 16], &mut ciphertext, &mut tag, &[])
        .is_err()
    {
        return false;
    }
    if ciphertext != vectors::GCM_CIPHERTEXT || tag != vectors::GCM_TAG {
        return false;
    }

    let mut plaintext = [0xffu8; 16];
    gcm.decrypt(&nonce, &ciphertext, &tag, &mut plaintext, &[]).is_ok() && plaintext == [0u8; 16]
}

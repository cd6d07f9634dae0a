//======================================================================
// src/error.rs
// 모든 크레이트가 공유하는 오류 분류.
//======================================================================

use thiserror::Error;

/// Errors raised by ciphers, modes and GHash.
///
/// Every variant is detected before any cryptographic work starts, except
/// [`Error::AuthenticationTagMismatch`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid key size: got {actual} bytes, expected {expected}")]
    InvalidKeySize {
        /// Accepted sizes, in bytes.
        expected: &'static str,
        actual: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("buffer too small: {required} bytes required, {actual} supplied")]
    SizeMismatch { required: usize, actual: usize },

    #[error("authentication tag mismatch")]
    AuthenticationTagMismatch,
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// `SizeMismatch` when `actual < required`.
    #[inline]
    pub fn check_len(required: usize, actual: usize) -> Result<()> {
        if actual < required {
            Err(Error::SizeMismatch { required, actual })
        } else {
            Ok(())
        }
    }
}

//======================================================================
// modes/src/lib.rs
// 크레이트의 진입점. CTR 스트림 모드와 GCM AEAD 를 공개합니다.
//======================================================================
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// --- Module declarations ---
pub mod ctr;
pub use crate::ctr::Ctr;

pub mod gcm;
pub use crate::gcm::Gcm;

pub mod kat;

// --- Convenience Type Aliases for Users ---
pub type AesCtr = Ctr<Aes>;
pub type Sm4Ctr = Ctr<Sm4>;
pub type AesGcm = Gcm<Aes>;
pub type Sm4Gcm = Gcm<Sm4>;

// --- Test Module ---
#[cfg(test)]
mod tests;

pub use aead as aead_api;
pub use batchblock::{self, Acceleration, Aes, BatchWidth, BlockCipher, Error, Result, Sm4};
pub use batchblock_ghash::{self, GHash};
pub use cipher;

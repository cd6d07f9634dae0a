//======================================================================
// src/lib.rs
// 크레이트의 진입점. 블록 암호 배치 계약과 AES/SM4 구현을 공개합니다.
//======================================================================
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// --- Module declarations ---
pub mod block;
pub mod cpu;
pub mod error;

mod backends;
mod consts;

pub mod aes;
pub mod sm4;

// --- Re-exports ---
pub use crate::aes::Aes;
pub use crate::block::{BatchWidth, BlockCipher, HardwareAcceleration};
pub use crate::cpu::Acceleration;
pub use crate::error::{Error, Result};
pub use crate::sm4::Sm4;

//======================================================================
// src/backends/mod.rs
// 블록 암호 커널. 이식 가능한 구현은 항상, AES-NI 는 x86_64 에서만 빌드합니다.
//======================================================================

use cfg_if::cfg_if;

pub(crate) mod soft;

cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub(crate) mod aesni;
    }
}

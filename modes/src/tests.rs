//======================================================================
// batchblock-modes Crate Test Suite
//======================================================================
#![cfg(test)]

use crate::{Acceleration, Aes, AesCtr, AesGcm, BatchWidth, BlockCipher, Ctr, Error, Gcm, Sm4, Sm4Gcm};
use aead::{generic_array::GenericArray, AeadInPlace, Payload};
use batchblock::HardwareAcceleration;
use cipher::StreamCipher;
use hex_literal::hex;
use proptest::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

const PLAINTEXT: &[u8] = b"This is a reasonably long test message for the batched GCM and CTR modes.";
const ASSOCIATED_DATA: &[u8] = b"Metadata that needs to be authenticated but not encrypted.";

/// Forwards to a real cipher but advertises a chosen batch width, so the
/// modes can be driven at every width on any machine.
#[derive(Clone)]
struct Advertised<C> {
    inner: C,
    width: BatchWidth,
}

impl<C: BlockCipher> BlockCipher for Advertised<C> {
    const BLOCK_SIZE: usize = C::BLOCK_SIZE;

    fn name(&self) -> &'static str {
        self.inner.name()
    }
    fn hardware_acceleration(&self) -> HardwareAcceleration {
        self.width.flag()
    }
    fn encrypt1(&self, block: &mut [u8]) {
        self.inner.encrypt1(block)
    }
    fn decrypt1(&self, block: &mut [u8]) {
        self.inner.decrypt1(block)
    }
    fn encrypt8(&self, blocks: &mut [u8]) {
        self.inner.encrypt8(blocks)
    }
    fn encrypt16(&self, blocks: &mut [u8]) {
        self.inner.encrypt16(blocks)
    }
    fn encrypt32(&self, blocks: &mut [u8]) {
        self.inner.encrypt32(blocks)
    }
}

/// A 64-bit block "cipher" the modes must refuse.
struct Narrow;

impl BlockCipher for Narrow {
    const BLOCK_SIZE: usize = 8;
    fn name(&self) -> &'static str {
        "narrow"
    }
    fn encrypt1(&self, _block: &mut [u8]) {}
    fn decrypt1(&self, _block: &mut [u8]) {}
}

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}

fn aes_gcm_variants(key: &[u8]) -> Vec<AesGcm> {
    vec![
        Gcm::with_acceleration(
            Aes::with_acceleration(key, Acceleration::Portable).unwrap(),
            Acceleration::Portable,
        )
        .unwrap(),
        Gcm::new(Aes::new(key).unwrap()).unwrap(),
    ]
}

fn seal(gcm: &mut AesGcm, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> (Vec<u8>, [u8; 16]) {
    let mut ciphertext = vec![0u8; plaintext.len()];
    let mut tag = [0u8; 16];
    gcm.encrypt(nonce, plaintext, &mut ciphertext, &mut tag, aad).unwrap();
    (ciphertext, tag)
}

//======================================================================
// GCM Known Answers
//======================================================================

struct GcmVector {
    key: &'static [u8],
    nonce: &'static [u8],
    plaintext: &'static [u8],
    aad: &'static [u8],
    ciphertext: &'static [u8],
    tag: [u8; 16],
}

const TC3_PLAINTEXT: [u8; 64] = hex!(
    "d9313225f88406e5a55909c5aff5269a86a7a9531534f7da2e4c303d8a318a72"
    "1c3c0c95956809532fcf0e2449a6b525b16aedf5aa0de657ba637b391aafd255"
);
const TC3_CIPHERTEXT: [u8; 64] = hex!(
    "42831ec2217774244b7221b784d0d49ce3aa212f2c02a4e035c17e2329aca12e"
    "21d514b25466931c7d8f6a5aac84aa051ba30b396a0aac973d58e091473f5985"
);

const GCM_VECTORS: &[GcmVector] = &[
    // Test case 1
    GcmVector {
        key: &[0u8; 16],
        nonce: &[0u8; 12],
        plaintext: &[],
        aad: &[],
        ciphertext: &[],
        tag: hex!("58e2fccefa7e3061367f1d57a4e7455a"),
    },
    // Test case 2
    GcmVector {
        key: &[0u8; 16],
        nonce: &[0u8; 12],
        plaintext: &[0u8; 16],
        aad: &[],
        ciphertext: &hex!("0388dace60b6a392f328c2b971b2fe78"),
        tag: hex!("ab6e47d42cec13bdf53a67b21257bddf"),
    },
    // Test case 3
    GcmVector {
        key: &hex!("feffe9928665731c6d6a8f9467308308"),
        nonce: &hex!("cafebabefacedbaddecaf888"),
        plaintext: &TC3_PLAINTEXT,
        aad: &[],
        ciphertext: &TC3_CIPHERTEXT,
        tag: hex!("4d5c2af327cd64a62cf35abd2ba6fab4"),
    },
    // Test case 4: partial final block plus AAD
    GcmVector {
        key: &hex!("feffe9928665731c6d6a8f9467308308"),
        nonce: &hex!("cafebabefacedbaddecaf888"),
        plaintext: TC3_PLAINTEXT.split_at(60).0,
        aad: &hex!("feedfacedeadbeeffeedfacedeadbeefabaddad2"),
        ciphertext: TC3_CIPHERTEXT.split_at(60).0,
        tag: hex!("5bc94fbc3221a5db94fae95ae7121a47"),
    },
    // Test cases 7 and 8 (AES-192)
    GcmVector {
        key: &[0u8; 24],
        nonce: &[0u8; 12],
        plaintext: &[],
        aad: &[],
        ciphertext: &[],
        tag: hex!("cd33b28ac773f74ba00ed1f312572435"),
    },
    GcmVector {
        key: &[0u8; 24],
        nonce: &[0u8; 12],
        plaintext: &[0u8; 16],
        aad: &[],
        ciphertext: &hex!("98e7247c07f0fe411c267e4384b0f600"),
        tag: hex!("2ff58d80033927ab8ef4d4587514f0fb"),
    },
    // Test cases 13 and 14 (AES-256)
    GcmVector {
        key: &[0u8; 32],
        nonce: &[0u8; 12],
        plaintext: &[],
        aad: &[],
        ciphertext: &[],
        tag: hex!("530f8afbc74536b9a963b4f1c4cb738b"),
    },
    GcmVector {
        key: &[0u8; 32],
        nonce: &[0u8; 12],
        plaintext: &[0u8; 16],
        aad: &[],
        ciphertext: &hex!("cea7403d4d606b6e074ec5d3baf39d18"),
        tag: hex!("d0d1c8a799996bf0265b98b5d48ab919"),
    },
];

#[test]
fn aes_gcm_published_vectors() {
    for (i, v) in GCM_VECTORS.iter().enumerate() {
        for mut gcm in aes_gcm_variants(v.key) {
            let (ciphertext, tag) = seal(&mut gcm, v.nonce, v.plaintext, v.aad);
            assert_eq!(ciphertext, v.ciphertext, "vector {i} ciphertext ({gcm:?})");
            assert_eq!(tag, v.tag, "vector {i} tag ({gcm:?})");

            let mut plaintext = vec![0u8; ciphertext.len()];
            gcm.decrypt(v.nonce, &ciphertext, &tag, &mut plaintext, v.aad).unwrap();
            assert_eq!(plaintext, v.plaintext, "vector {i} decrypt");
        }
    }
}

#[test]
fn sm4_gcm_vector() {
    let key = hex!("11754cd72aec309bf52f7687212e8957");
    let nonce = hex!("3c819d9a9bed087615030b65");
    let mut gcm = Sm4Gcm::new(Sm4::new(&key).unwrap()).unwrap();

    let mut ciphertext = [0u8; 9];
    let mut tag = [0u8; 16];
    gcm.encrypt(&nonce, b"plaintext", &mut ciphertext, &mut tag, &[]).unwrap();
    assert_eq!(ciphertext, hex!("6111f78f2f82b913c2"));
    assert_eq!(tag, hex!("9c2e12d652d7dd0d1930120b7788281d"));
}

//======================================================================
// GCM Behaviour
//======================================================================

#[test]
fn gcm_roundtrip_with_associated_data() {
    let key = random_bytes(1, 32);
    let nonce = random_bytes(2, 12);
    for mut gcm in aes_gcm_variants(&key) {
        let (ciphertext, tag) = seal(&mut gcm, &nonce, PLAINTEXT, ASSOCIATED_DATA);
        assert_ne!(ciphertext, PLAINTEXT, "Ciphertext should not match plaintext");

        let mut recovered = vec![0u8; ciphertext.len()];
        gcm.decrypt(&nonce, &ciphertext, &tag, &mut recovered, ASSOCIATED_DATA)
            .unwrap();
        assert_eq!(recovered, PLAINTEXT, "Decrypted text should match original");
    }
}

#[test]
fn gcm_session_is_reusable() {
    let mut gcm = AesGcm::new(Aes::new(&[9u8; 16]).unwrap()).unwrap();
    let first = seal(&mut gcm, &[1u8; 12], PLAINTEXT, ASSOCIATED_DATA);
    let _other = seal(&mut gcm, &[2u8; 12], b"something else", b"");
    let again = seal(&mut gcm, &[1u8; 12], PLAINTEXT, ASSOCIATED_DATA);
    assert_eq!(first, again, "Per-call state must not leak between calls");
}

#[test]
fn empty_message_tag_is_the_encrypted_initial_counter() {
    // With no AAD and no text, GHASH is zero and the tag is E(K, J0).
    let mut gcm = AesGcm::new(Aes::new(&[0x6bu8; 32]).unwrap()).unwrap();
    let nonce = [0x0cu8; 12];
    let (_, tag) = seal(&mut gcm, &nonce, &[], &[]);

    assert_eq!(gcm.cipher().name(), "AES-256");
    let mut j0 = [0u8; 16];
    j0[..12].copy_from_slice(&nonce);
    j0[15] = 1;
    gcm.cipher().encrypt1(&mut j0);
    assert_eq!(tag, j0);
}

#[test]
fn gcm_detects_tampering() {
    let mut gcm = AesGcm::new(Aes::new(&[7u8; 16]).unwrap()).unwrap();
    let nonce = [3u8; 12];
    let aad = &ASSOCIATED_DATA[..20];
    let (ciphertext, tag) = seal(&mut gcm, &nonce, &PLAINTEXT[..40], aad);
    let mut out = vec![0u8; ciphertext.len()];

    for bit in 0..ciphertext.len() * 8 {
        let mut bad = ciphertext.clone();
        bad[bit / 8] ^= 1 << (bit % 8);
        out.fill(0xee);
        assert_eq!(
            gcm.decrypt(&nonce, &bad, &tag, &mut out, aad),
            Err(Error::AuthenticationTagMismatch),
            "ciphertext bit {bit}"
        );
        assert!(out.iter().all(|&b| b == 0), "output must be wiped");
    }
    for bit in 0..128 {
        let mut bad = tag;
        bad[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            gcm.decrypt(&nonce, &ciphertext, &bad, &mut out, aad),
            Err(Error::AuthenticationTagMismatch),
            "tag bit {bit}"
        );
    }
    for bit in 0..aad.len() * 8 {
        let mut bad = aad.to_vec();
        bad[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            gcm.decrypt(&nonce, &ciphertext, &tag, &mut out, &bad),
            Err(Error::AuthenticationTagMismatch),
            "aad bit {bit}"
        );
    }
}

#[test]
fn gcm_rejects_bad_arguments() {
    let mut gcm = AesGcm::new(Aes::new(&[0u8; 16]).unwrap()).unwrap();
    let mut ciphertext = [0u8; 4];
    let mut tag = [0u8; 16];

    for nonce_len in [0usize, 8, 11, 13, 16] {
        assert!(matches!(
            gcm.encrypt(&vec![0u8; nonce_len], &[0u8; 4], &mut ciphertext, &mut tag, &[]),
            Err(Error::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        gcm.encrypt(&[0u8; 12], &[0u8; 5], &mut ciphertext, &mut tag, &[]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        gcm.encrypt(&[0u8; 12], &[0u8; 4], &mut ciphertext, &mut tag[..12], &[]),
        Err(Error::InvalidArgument(_))
    ));

    let mut plaintext = [0u8; 4];
    assert!(matches!(
        gcm.decrypt(&[0u8; 12], &ciphertext, &tag[..15], &mut plaintext, &[]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        Gcm::new(Narrow),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn gcm_output_is_independent_of_batch_width() {
    let key = random_bytes(11, 16);
    let nonce = random_bytes(12, 12);
    let plaintext = random_bytes(13, 40 * 16 + 7);

    let mut reference = AesGcm::new(Aes::new(&key).unwrap()).unwrap();
    let expected = seal(&mut reference, &nonce, &plaintext, ASSOCIATED_DATA);

    for width in BatchWidth::ALL {
        let cipher = Advertised {
            inner: Aes::new(&key).unwrap(),
            width,
        };
        let mut gcm = Gcm::new(cipher).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        let mut tag = [0u8; 16];
        gcm.encrypt(&nonce, &plaintext, &mut ciphertext, &mut tag, ASSOCIATED_DATA)
            .unwrap();
        assert_eq!((ciphertext, tag), expected, "width {width:?}");
    }
}

#[test]
fn aead_trait_matches_explicit_api() {
    let key = [0x42u8; 16];
    let nonce = [0x24u8; 12];
    let mut explicit = AesGcm::new(Aes::new(&key).unwrap()).unwrap();
    let (ciphertext, tag) = seal(&mut explicit, &nonce, PLAINTEXT, ASSOCIATED_DATA);

    let gcm = AesGcm::new(Aes::new(&key).unwrap()).unwrap();
    let nonce_array = GenericArray::from_slice(&nonce);
    let sealed = aead::Aead::encrypt(
        &gcm,
        nonce_array,
        Payload {
            msg: PLAINTEXT,
            aad: ASSOCIATED_DATA,
        },
    )
    .unwrap();
    assert_eq!(&sealed[..PLAINTEXT.len()], &ciphertext[..]);
    assert_eq!(&sealed[PLAINTEXT.len()..], &tag[..]);

    let opened = aead::Aead::decrypt(
        &gcm,
        nonce_array,
        Payload {
            msg: &sealed,
            aad: ASSOCIATED_DATA,
        },
    )
    .unwrap();
    assert_eq!(opened, PLAINTEXT);

    let mut buffer = ciphertext.clone();
    let mut bad_tag = tag;
    bad_tag[0] ^= 0x80;
    assert!(gcm
        .decrypt_in_place_detached(
            nonce_array,
            ASSOCIATED_DATA,
            &mut buffer,
            GenericArray::from_slice(&bad_tag),
        )
        .is_err());
    assert!(buffer.iter().all(|&b| b == 0));
}

//======================================================================
// CTR Mode
//======================================================================

const CTR_KEY: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");
const CTR_IV: [u8; 16] = hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
const CTR_PLAINTEXT: [u8; 64] = hex!(
    "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51"
    "30c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710"
);
const CTR_CIPHERTEXT: [u8; 64] = hex!(
    "874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff"
    "5ae4df3edbd5d35e5b4f09020db03eab1e031dda2fbe03d1792170a0f3009cee"
);

#[test]
fn ctr_sp800_38a_vector_at_every_width() {
    for acceleration in [Acceleration::Portable, Acceleration::Auto] {
        for width in BatchWidth::ALL {
            let cipher = Advertised {
                inner: Aes::with_acceleration(&CTR_KEY, acceleration).unwrap(),
                width,
            };
            let mut ctr = Ctr::new(cipher, &CTR_IV).unwrap();
            assert_eq!(ctr.batch_width(), width);

            let mut out = [0u8; 64];
            ctr.update(&CTR_PLAINTEXT, &mut out).unwrap();
            assert_eq!(out, CTR_CIPHERTEXT, "width {width:?} ({acceleration:?})");
        }
    }
}

#[test]
fn ctr_counter_carries_only_within_low_word() {
    let aes = Aes::new(&CTR_KEY).unwrap();
    let mut iv = [0x5au8; 16];
    iv[12..].copy_from_slice(&[0xff; 4]);

    let mut ctr = AesCtr::new(aes.clone(), &iv).unwrap();
    let mut keystream = [0u8; 32];
    ctr.update_in_place(&mut keystream);

    let mut first = iv;
    aes.encrypt1(&mut first);
    let mut wrapped = iv;
    wrapped[12..].copy_from_slice(&[0; 4]);
    let mut second = wrapped;
    aes.encrypt1(&mut second);

    assert_eq!(&keystream[..16], &first[..]);
    assert_eq!(&keystream[16..], &second[..], "high 96 bits must stay unchanged");
    assert_eq!(&ctr.counter()[..12], &iv[..12]);
}

#[test]
fn ctr_short_iv_is_left_aligned() {
    let aes = Aes::new(&CTR_KEY).unwrap();
    let mut short = AesCtr::new(aes.clone(), &CTR_IV[..8]).unwrap();
    let mut padded_iv = [0u8; 16];
    padded_iv[..8].copy_from_slice(&CTR_IV[..8]);
    let mut padded = AesCtr::new(aes, &padded_iv).unwrap();

    let mut a = [0u8; 48];
    let mut b = [0u8; 48];
    short.update_in_place(&mut a);
    padded.update_in_place(&mut b);
    assert_eq!(a, b);
}

#[test]
fn ctr_rejects_long_iv_and_short_output() {
    let aes = Aes::new(&CTR_KEY).unwrap();
    assert!(matches!(
        AesCtr::new(aes.clone(), &[0u8; 17]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(Ctr::new(Narrow, &[]), Err(Error::InvalidArgument(_))));

    let mut ctr = AesCtr::new(aes, &CTR_IV).unwrap();
    let mut out = [0u8; 10];
    assert_eq!(
        ctr.update(&[0u8; 11], &mut out),
        Err(Error::SizeMismatch {
            required: 11,
            actual: 10
        })
    );
}

#[test]
fn ctr_reset_replays_the_stream() {
    let mut ctr = Ctr::new(Sm4::new(&[0x11u8; 16]).unwrap(), &[0x22u8; 16]).unwrap();
    let mut first = PLAINTEXT.to_vec();
    ctr.update_in_place(&mut first[..7]);
    ctr.update_in_place(&mut first[7..]);

    ctr.reset();
    let mut second = PLAINTEXT.to_vec();
    ctr.update_in_place(&mut second);
    assert_eq!(first, second, "Reset should reproduce the keystream");

    ctr.reset();
    ctr.update_in_place(&mut second);
    assert_eq!(second, PLAINTEXT, "Applying twice should decrypt");
}

#[test]
fn ctr_stream_cipher_trait() {
    let aes = Aes::new(&CTR_KEY).unwrap();
    let mut ctr = AesCtr::new(aes, &CTR_IV).unwrap();
    let mut buffer = CTR_PLAINTEXT;
    ctr.apply_keystream(&mut buffer[..33]);
    ctr.apply_keystream(&mut buffer[33..]);
    assert_eq!(buffer, CTR_CIPHERTEXT);
}

#[test]
fn ctr_trait_and_inherent_calls_share_the_stream() {
    for width in BatchWidth::ALL {
        let cipher = Advertised {
            inner: Aes::new(&CTR_KEY).unwrap(),
            width,
        };
        let mut ctr = Ctr::new(cipher, &CTR_IV).unwrap();
        let mut out = [0u8; 64];
        out[..7].copy_from_slice(&CTR_PLAINTEXT[..7]);
        ctr.update_in_place(&mut out[..7]);
        ctr.apply_keystream_b2b(&CTR_PLAINTEXT[7..40], &mut out[7..40])
            .unwrap();
        out[40..].copy_from_slice(&CTR_PLAINTEXT[40..]);
        ctr.apply_keystream(&mut out[40..]);
        assert_eq!(out, CTR_CIPHERTEXT, "width {width:?}");
    }
}

//======================================================================
// Properties
//======================================================================

proptest! {
    #[test]
    fn gcm_roundtrip(key in any::<[u8; 16]>(),
                     nonce in any::<[u8; 12]>(),
                     plaintext in prop::collection::vec(any::<u8>(), 0..700),
                     aad in prop::collection::vec(any::<u8>(), 0..70)) {
        for mut gcm in aes_gcm_variants(&key) {
            let (ciphertext, tag) = seal(&mut gcm, &nonce, &plaintext, &aad);
            let mut recovered = vec![0u8; ciphertext.len()];
            gcm.decrypt(&nonce, &ciphertext, &tag, &mut recovered, &aad).unwrap();
            prop_assert_eq!(&recovered, &plaintext);
        }
    }

    #[test]
    fn ctr_chunking_is_irrelevant(data in prop::collection::vec(any::<u8>(), 0..1200),
                                  cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6)) {
        let mut whole = data.clone();
        AesCtr::new(Aes::new(&CTR_KEY).unwrap(), &CTR_IV).unwrap().update_in_place(&mut whole);

        let mut points: Vec<usize> = cuts.iter().map(|c| c.index(data.len() + 1)).collect();
        points.push(0);
        points.push(data.len());
        points.sort_unstable();

        let mut pieces = data;
        let mut ctr = AesCtr::new(Aes::new(&CTR_KEY).unwrap(), &CTR_IV).unwrap();
        for pair in points.windows(2) {
            ctr.update_in_place(&mut pieces[pair[0]..pair[1]]);
        }
        prop_assert_eq!(pieces, whole);
    }
}

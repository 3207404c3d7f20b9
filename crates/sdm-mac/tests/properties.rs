use sdm_mac::cmac::{BlockCmac, derive_subkeys};
use sdm_mac::{MasterKey, VerifierConfig, verify};

const UID: &str = "04112233445566";
const CTR: &str = "000001";
const KEY: [u8; 16] = [
    0x25, 0x6B, 0xC1, 0x07, 0x67, 0xBF, 0x9B, 0x68, 0xDA, 0x7E, 0x6F, 0x04, 0xFD, 0x44, 0x86, 0x52,
];

fn sdmmac_for(key: [u8; 16]) -> String {
    let config = VerifierConfig::new(MasterKey::from_bytes(key));
    verify(UID, CTR, "0000000000000000", &config)
        .unwrap()
        .sdmmac()
        .to_string()
}

#[test]
fn repeated_verification_is_identical() {
    let config = VerifierConfig::new(MasterKey::from_bytes(KEY)).with_trace(true);

    let first = verify(UID, CTR, "42D46985F711EB0B", &config).unwrap();
    let second = verify(UID, CTR, "42D46985F711EB0B", &config).unwrap();

    assert_eq!(first, second);
    assert!(first.matched());
}

#[test]
fn every_single_bit_key_flip_changes_the_sdmmac() {
    let baseline = sdmmac_for(KEY);

    for bit in 0..128 {
        let mut key = KEY;
        key[bit / 8] ^= 1 << (bit % 8);
        assert_ne!(sdmmac_for(key), baseline, "bit {} did not change the MAC", bit);
    }
}

#[test]
fn random_keys_produce_distinct_sdmmacs() {
    let a: [u8; 16] = rand::random();
    let mut b = a;
    b[0] ^= 0x01;
    assert_ne!(sdmmac_for(a), sdmmac_for(b));
}

#[test]
fn subkeys_are_recomputed_per_call() {
    let a = derive_subkeys(&KEY).unwrap();
    let b = derive_subkeys(&KEY).unwrap();
    assert_eq!(a.k1, b.k1);
    assert_eq!(a.k2, b.k2);

    let computation = BlockCmac::compute(&KEY, &[0u8; 16]).unwrap();
    assert_eq!(computation.subkeys.k1, a.k1);
}

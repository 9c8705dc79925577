//! Password digests and random codes.
//!
//! The digest is a single fast salted SHA-256 pass. It is not a password key
//! derivation function and gives no protection against offline guessing of a
//! leaked hash.
//!
//! Stored format: `sha256$<salt hex>$<digest hex>` where the digest covers the
//! salt followed by the password bytes.

use rand::{Rng, distributions::Alphanumeric};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Random alphanumeric string (invitation codes, placeholder passwords).
pub(crate) fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub(crate) fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::thread_rng().r#gen();
    format!(
        "{SCHEME}${}${}",
        hex::encode(salt),
        hex::encode(digest(&salt, password))
    )
}

pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(salt), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };

    digest(&salt, password).ct_eq(expected.as_slice()).into()
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .to_vec()
}

//! Base58 key decoding and the NaCl-style signed-message format.
//!
//! A signed message is the 64-byte Ed25519 signature followed by the
//! message itself, so the verifier can recover what was signed.

use crate::error::{BlinkError, Result};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use ed25519_dalek::{KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};

/// Decode a base58 private key.
///
/// Accepts either the 32-byte seed or the 64-byte `seed || public key`
/// form; the latter must agree with itself.
pub fn decode_signing_key(encoded: &str) -> Result<SigningKey> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| BlinkError::InvalidKey(format!("not base58: {e}")))?;

    match bytes.len() {
        SECRET_KEY_LENGTH => {
            let mut seed = [0u8; SECRET_KEY_LENGTH];
            seed.copy_from_slice(&bytes);
            Ok(SigningKey::from_bytes(&seed))
        }
        KEYPAIR_LENGTH => {
            let mut pair = [0u8; KEYPAIR_LENGTH];
            pair.copy_from_slice(&bytes);
            SigningKey::from_keypair_bytes(&pair)
                .map_err(|_| BlinkError::InvalidKey("public half does not match seed".into()))
        }
        n => Err(BlinkError::InvalidKey(format!(
            "expected {SECRET_KEY_LENGTH} or {KEYPAIR_LENGTH} bytes, got {n}"
        ))),
    }
}

/// Decode a base58 public key. Returns `None` for anything that is not a
/// valid 32-byte Ed25519 point.
pub fn decode_public_key(encoded: &str) -> Option<VerifyingKey> {
    let bytes = bs58::decode(encoded.trim()).into_vec().ok()?;
    let arr: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(&arr).ok()
}

/// Produce `signature || message`.
pub(crate) fn seal(key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let signature = key.sign(message);
    let mut out = Vec::with_capacity(SIGNATURE_LENGTH + message.len());
    out.extend_from_slice(&signature.to_bytes());
    out.extend_from_slice(message);
    out
}

/// Check the signature prefix of a signed message and return the message.
pub fn open<'a>(signed: &'a [u8], key: &VerifyingKey) -> Option<&'a [u8]> {
    if signed.len() < SIGNATURE_LENGTH {
        return None;
    }
    let (sig_bytes, message) = signed.split_at(SIGNATURE_LENGTH);
    let sig_array: [u8; SIGNATURE_LENGTH] = sig_bytes.try_into().ok()?;
    let signature = Signature::from_bytes(&sig_array);
    key.verify(message, &signature).ok()?;
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn test_decode_seed_form() {
        let sk = key(7);
        let encoded = bs58::encode(sk.to_bytes()).into_string();
        let decoded = decode_signing_key(&encoded).unwrap();
        assert_eq!(decoded.verifying_key(), sk.verifying_key());
    }

    #[test]
    fn test_decode_keypair_form() {
        let sk = key(7);
        let encoded = bs58::encode(sk.to_keypair_bytes()).into_string();
        let decoded = decode_signing_key(&encoded).unwrap();
        assert_eq!(decoded.to_bytes(), sk.to_bytes());
    }

    #[test]
    fn test_decode_inconsistent_keypair() {
        let mut pair = key(7).to_keypair_bytes();
        pair[32..].copy_from_slice(key(8).verifying_key().as_bytes());
        let encoded = bs58::encode(pair).into_string();
        assert!(matches!(
            decode_signing_key(&encoded),
            Err(BlinkError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_decode_bad_private_keys() {
        assert!(decode_signing_key("0OIl").is_err());
        let short = bs58::encode([1u8; 16]).into_string();
        assert!(decode_signing_key(&short).is_err());
    }

    #[test]
    fn test_decode_public_key() {
        let vk = key(3).verifying_key();
        let encoded = bs58::encode(vk.as_bytes()).into_string();
        assert_eq!(decode_public_key(&encoded), Some(vk));
        assert_eq!(decode_public_key("not-base58!"), None);
        assert_eq!(decode_public_key(&bs58::encode([1u8; 5]).into_string()), None);
    }

    #[test]
    fn test_seal_and_open() {
        let sk = key(1);
        let sealed = seal(&sk, b"payload");
        assert_eq!(sealed.len(), SIGNATURE_LENGTH + 7);
        assert_eq!(open(&sealed, &sk.verifying_key()), Some(&b"payload"[..]));
    }

    #[test]
    fn test_open_rejects_wrong_key_and_tampering() {
        let sk = key(1);
        let mut sealed = seal(&sk, b"payload");
        assert_eq!(open(&sealed, &key(2).verifying_key()), None);

        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert_eq!(open(&sealed, &sk.verifying_key()), None);

        assert_eq!(open(&sealed[..10], &sk.verifying_key()), None);
    }
}

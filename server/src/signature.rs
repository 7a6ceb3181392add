use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Verifies payment callback signatures: lowercase hex of
/// `HMAC-SHA256(key_secret, order_id + "|" + payment_id)`.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, order_id: &str, payment_id: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        mac
    }

    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        hex::encode(self.mac(order_id, payment_id).finalize().into_bytes())
    }

    /// Constant-time comparison against the exact lowercase hex encoding.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        if signature.bytes().any(|b| b.is_ascii_uppercase()) {
            return false;
        }
        match hex::decode(signature) {
            Ok(provided) => self.mac(order_id, payment_id).verify_slice(&provided).is_ok(),
            Err(_) => false,
        }
    }
}

/// Compares two secrets without leaking the position of the first difference.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let provided = Sha256::digest(provided.as_bytes());
    expected
        .iter()
        .zip(provided.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn known_vector() {
        // echo -n "order_1|pay_1" | openssl dgst -sha256 -hmac "s"
        let verifier = SignatureVerifier::new("s");
        let signature = verifier.expected_signature("order_1", "pay_1");
        assert_eq!(
            signature,
            "742a38a9b459999e738a2d54e89b9f64b144535a09efaf21054dc143460d16c7"
        );
        assert_eq!(signature, verifier.expected_signature("order_1", "pay_1"));
        assert!(verifier.verify("order_1", "pay_1", &signature));
    }

    #[test]
    pub fn tampered_ids_fail() {
        let verifier = SignatureVerifier::new("s");
        let signature = verifier.expected_signature("order_1", "pay_1");
        assert!(!verifier.verify("order_2", "pay_1", &signature));
        assert!(!verifier.verify("order_1", "pay_2", &signature));
        // The separator is part of the signed message.
        assert!(!verifier.verify("order_1|pay", "_1", &signature));
    }

    #[test]
    pub fn wrong_secret_fails() {
        let signature = SignatureVerifier::new("other").expected_signature("order_1", "pay_1");
        assert!(!SignatureVerifier::new("s").verify("order_1", "pay_1", &signature));
    }

    #[test]
    pub fn malformed_signature_fails() {
        let verifier = SignatureVerifier::new("s");
        let signature = verifier.expected_signature("order_1", "pay_1");
        assert!(!verifier.verify("order_1", "pay_1", ""));
        assert!(!verifier.verify("order_1", "pay_1", "not-hex"));
        assert!(!verifier.verify("order_1", "pay_1", &signature[..62]));
        assert!(!verifier.verify("order_1", "pay_1", &signature.to_uppercase()));
    }

    #[test]
    pub fn secrets_match_compares_whole_value() {
        assert!(secrets_match("token", "token"));
        assert!(!secrets_match("token", "token2"));
        assert!(!secrets_match("token", ""));
    }
}

//! License signing and verification.
//!
//! Tokens are signed with RSA-PSS using SHA-256 for both the message digest
//! and MGF1, with the maximum salt length the modulus allows
//! (`emLen - hLen - 2`). The same parameters are required on verification,
//! so tokens produced by any issuer using those parameters verify here.
//!
//! PSS is randomized: signing the same subject twice produces different
//! tokens, and both verify.

use std::fmt;

use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::errors::{LicenseError, LicenseResult};
use crate::token::{validate_subject, LicenseToken};

/// SHA-256 output size in bytes.
const DIGEST_LEN: usize = 32;

/// Maximum PSS salt length for a key of `modulus_bits` bits with SHA-256.
pub fn max_salt_len(modulus_bits: usize) -> usize {
    let em_len = (modulus_bits - 1).div_ceil(8);
    em_len.saturating_sub(DIGEST_LEN + 2)
}

fn pss_for(key: &RsaPublicKey) -> Pss {
    Pss::new_with_salt::<Sha256>(max_salt_len(key.n().bits()))
}

/// Verifies license tokens against an issuer's public key.
#[derive(Debug, Clone)]
pub struct LicenseVerifier {
    public_key: RsaPublicKey,
}

impl LicenseVerifier {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Verify a token string and return its subject.
    ///
    /// Returns [`LicenseError::MalformedToken`] when the string does not parse
    /// and [`LicenseError::InvalidSignature`] for every cryptographic failure.
    pub fn verify(&self, token: &str) -> LicenseResult<String> {
        let token = LicenseToken::parse(token)?;
        self.verify_token(&token)?;
        Ok(token.into_subject())
    }

    /// Verify an already parsed token.
    pub fn verify_token(&self, token: &LicenseToken) -> LicenseResult<()> {
        let hashed = Sha256::digest(token.subject().as_bytes());
        self.public_key
            .verify(pss_for(&self.public_key), &hashed, token.signature())
            .map_err(|_| LicenseError::InvalidSignature)
    }
}

/// Issues license tokens with an RSA private key.
#[derive(Clone)]
pub struct LicenseSigner {
    private_key: RsaPrivateKey,
    verifier: LicenseVerifier,
}

impl fmt::Debug for LicenseSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseSigner")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl LicenseSigner {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let verifier = LicenseVerifier::new(private_key.to_public_key());
        Self {
            private_key,
            verifier,
        }
    }

    /// Verifier for tokens produced by this signer.
    pub fn verifier(&self) -> &LicenseVerifier {
        &self.verifier
    }

    /// Sign `subject` and return the parsed token.
    pub fn sign(&self, subject: &str) -> LicenseResult<LicenseToken> {
        validate_subject(subject)?;

        let hashed = Sha256::digest(subject.as_bytes());
        let padding = pss_for(self.verifier.public_key());
        let signature = self
            .private_key
            .sign_with_rng(&mut OsRng, padding, &hashed)
            .map_err(|e| LicenseError::KeyError(format!("signing failed: {e}")))?;

        LicenseToken::new(subject, signature)
    }

    /// Sign `subject` and return the wire representation.
    pub fn issue(&self, subject: &str) -> LicenseResult<String> {
        Ok(self.sign(subject)?.encode())
    }
}

/// The key material a process holds for the lifetime of the service.
///
/// Always able to verify; able to issue only when a private key was loaded.
#[derive(Debug, Clone)]
pub struct LicenseAuthority {
    signer: Option<LicenseSigner>,
    verifier: LicenseVerifier,
}

impl LicenseAuthority {
    pub fn with_signer(signer: LicenseSigner) -> Self {
        let verifier = signer.verifier().clone();
        Self {
            signer: Some(signer),
            verifier,
        }
    }

    pub fn verify_only(verifier: LicenseVerifier) -> Self {
        Self {
            signer: None,
            verifier,
        }
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    pub fn verifier(&self) -> &LicenseVerifier {
        &self.verifier
    }

    /// Issue a token for `subject`.
    ///
    /// Fails with [`LicenseError::KeyNotLoaded`] on a verify-only authority.
    pub fn issue(&self, subject: &str) -> LicenseResult<String> {
        self.signer
            .as_ref()
            .ok_or(LicenseError::KeyNotLoaded)?
            .issue(subject)
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> LicenseResult<String> {
        self.verifier.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys;
    use crate::token::DELIMITER;
    use base64::engine::general_purpose::STANDARD as B64;
    use base64::Engine;

    fn signer() -> LicenseSigner {
        LicenseSigner::new(test_keys::primary().clone())
    }

    #[test]
    fn issue_then_verify_returns_subject() {
        let signer = signer();
        let token = signer.issue("12345").expect("issue");
        assert!(token.starts_with("12345::"));
        assert_eq!(signer.verifier().verify(&token).expect("verify"), "12345");
    }

    #[test]
    fn round_trip_varied_subjects() {
        let signer = signer();
        for subject in [
            "1",
            "buyer@example.com",
            "user:42",
            "名前",
            "with spaces and = signs",
            "trailing:",
        ] {
            let token = signer.issue(subject).expect("issue");
            assert_eq!(signer.verifier().verify(&token).expect("verify"), subject);
        }
    }

    #[test]
    fn signature_length_matches_modulus() {
        let signer = signer();
        let token = signer.sign("12345").expect("sign");
        assert_eq!(token.signature().len(), 256);
    }

    #[test]
    fn reissue_produces_distinct_valid_tokens() {
        let signer = signer();
        let first = signer.issue("12345").expect("issue");
        let second = signer.issue("12345").expect("issue");
        assert_ne!(first, second);
        assert_eq!(signer.verifier().verify(&first).expect("verify"), "12345");
        assert_eq!(signer.verifier().verify(&second).expect("verify"), "12345");
    }

    #[test]
    fn flipping_any_signature_bit_is_rejected() {
        let signer = signer();
        let token = signer.sign("12345").expect("sign");
        let signature = token.signature().to_vec();

        // Every byte, rotating through bit positions.
        for i in 0..signature.len() {
            let mut tampered = signature.clone();
            tampered[i] ^= 1 << (i % 8);
            let forged = format!("12345{DELIMITER}{}", B64.encode(&tampered));
            assert!(
                matches!(
                    signer.verifier().verify(&forged),
                    Err(LicenseError::InvalidSignature)
                ),
                "bit flip in byte {i} was accepted"
            );
        }
    }

    #[test]
    fn swapped_subject_is_rejected() {
        let signer = signer();
        let token = signer.sign("99999").expect("sign");
        let forged = format!("12345{DELIMITER}{}", B64.encode(token.signature()));
        assert!(matches!(
            signer.verifier().verify(&forged),
            Err(LicenseError::InvalidSignature)
        ));
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let signer = signer();
        let token = signer.sign("12345").expect("sign");
        let truncated = &token.signature()[..token.signature().len() - 1];
        let forged = format!("12345{DELIMITER}{}", B64.encode(truncated));
        assert!(matches!(
            signer.verifier().verify(&forged),
            Err(LicenseError::InvalidSignature)
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let verifier = signer().verifier().clone();
        assert!(matches!(
            verifier.verify("12345"),
            Err(LicenseError::MalformedToken(_))
        ));
        assert!(matches!(
            verifier.verify("12345::not-base64!!"),
            Err(LicenseError::MalformedToken(_))
        ));
    }

    #[test]
    fn key_isolation() {
        let a = signer();
        let b = LicenseSigner::new(test_keys::secondary().clone());
        let token = a.issue("12345").expect("issue");
        assert!(matches!(
            b.verifier().verify(&token),
            Err(LicenseError::InvalidSignature)
        ));
    }

    #[test]
    fn issue_rejects_invalid_subjects() {
        let signer = signer();
        assert!(matches!(
            signer.issue(""),
            Err(LicenseError::InvalidSubject(_))
        ));
        assert!(matches!(
            signer.issue("a::b"),
            Err(LicenseError::InvalidSubject(_))
        ));
    }

    #[test]
    fn verify_only_authority_cannot_issue() {
        let signer = signer();
        let token = signer.issue("12345").expect("issue");

        let authority = LicenseAuthority::verify_only(signer.verifier().clone());
        assert!(!authority.can_sign());
        assert!(matches!(
            authority.issue("12345"),
            Err(LicenseError::KeyNotLoaded)
        ));
        assert_eq!(authority.verify(&token).expect("verify"), "12345");
    }

    #[test]
    fn signing_authority_round_trip() {
        let authority = LicenseAuthority::with_signer(signer());
        assert!(authority.can_sign());
        let token = authority.issue("buyer@example.com").expect("issue");
        assert_eq!(
            authority.verify(&token).expect("verify"),
            "buyer@example.com"
        );
    }

    #[test]
    fn max_salt_len_matches_modulus() {
        assert_eq!(max_salt_len(2048), 222);
        assert_eq!(max_salt_len(3072), 350);
        assert_eq!(max_salt_len(4096), 478);
        // emLen comes from modBits - 1, so 2049 bits still encodes into 256 bytes.
        assert_eq!(max_salt_len(2049), 222);
    }

    #[test]
    fn authority_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LicenseAuthority>();
    }
}

//! Mural webhook signature verification.
//!
//! Mural signs every webhook delivery with ECDSA over P-256 and SHA-256. The signed message is
//! `"{timestamp}.{raw_body}"`, where the timestamp comes from the `x-mural-webhook-timestamp` header. The
//! DER-encoded signature is sent base64 encoded in `x-mural-webhook-signature`.
//!
//! The verification key is the PEM encoded public key Mural hands out when a webhook is registered.
//!
//! A delivery is only rejected when a key is configured *and* the delivery carries a signature that does not
//! verify. Deliveries that cannot be verified at all (no key configured, or no signature headers) are let through.
use log::*;
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-mural-webhook-signature";
pub const TIMESTAMP_HEADER: &str = "x-mural-webhook-timestamp";

/// DER header of a SubjectPublicKeyInfo holding an uncompressed P-256 point (id-ecPublicKey, prime256v1)
const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a, 0x86, 0x48, 0xce,
    0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];
const P256_POINT_LEN: usize = 65;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookKeyError {
    #[error("The webhook key is not valid PEM. {0}")]
    InvalidPem(String),
    #[error("Expected a PUBLIC KEY PEM block, got {0}")]
    UnexpectedTag(String),
    #[error("The webhook key is not an uncompressed P-256 public key")]
    UnsupportedKey,
}

/// The outcome of checking a webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid,
    /// No key is configured, or the delivery is not signed
    Unverifiable,
}

impl SignatureCheck {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WebhookVerifier {
    /// The raw uncompressed EC point
    public_key: Option<Vec<u8>>,
}

impl WebhookVerifier {
    /// A verifier that lets every delivery through
    pub fn disabled() -> Self {
        Self { public_key: None }
    }

    pub fn from_pem(pem_str: &str) -> Result<Self, WebhookKeyError> {
        let block = pem::parse(pem_str.trim()).map_err(|e| WebhookKeyError::InvalidPem(e.to_string()))?;
        if block.tag() != "PUBLIC KEY" {
            return Err(WebhookKeyError::UnexpectedTag(block.tag().to_string()));
        }
        let point = block.contents().strip_prefix(P256_SPKI_PREFIX.as_slice()).ok_or(WebhookKeyError::UnsupportedKey)?;
        if point.len() != P256_POINT_LEN || point[0] != 0x04 {
            return Err(WebhookKeyError::UnsupportedKey);
        }
        Ok(Self { public_key: Some(point.to_vec()) })
    }

    pub fn is_enabled(&self) -> bool {
        self.public_key.is_some()
    }

    pub fn check(&self, signature: Option<&str>, timestamp: Option<&str>, body: &[u8]) -> SignatureCheck {
        let Some(key) = &self.public_key else {
            return SignatureCheck::Unverifiable;
        };
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            debug!("💻️ Webhook delivery is not signed. Skipping signature verification.");
            return SignatureCheck::Unverifiable;
        };
        if body.is_empty() {
            return SignatureCheck::Unverifiable;
        }
        let signature = match base64::decode(signature.trim()) {
            Ok(sig) => sig,
            Err(e) => {
                warn!("💻️ Webhook signature is not valid base64. {e}");
                return SignatureCheck::Invalid;
            },
        };
        let mut message = Vec::with_capacity(timestamp.len() + 1 + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.push(b'.');
        message.extend_from_slice(body);
        match UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, key).verify(&message, &signature) {
            Ok(()) => SignatureCheck::Valid,
            Err(_) => SignatureCheck::Invalid,
        }
    }
}

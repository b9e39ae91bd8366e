// PKCE helpers for the S256 challenge method
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

/// Symbols a verifier is drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Random string of `length` alphanumeric characters.
///
/// Each character is one byte from the OS random source reduced modulo 62.
/// 256 is not a multiple of 62, so the first eight symbols come up slightly
/// more often; that bias is accepted here.
pub fn generate_random_string(length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| anyhow!("random source unavailable: {}", e))?;
    Ok(bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect())
}

pub fn sha256(plain: &str) -> [u8; 32] {
    Sha256::digest(plain.as_bytes()).into()
}

/// base64url without `=` padding.
pub fn base64encode(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn create_code_challenge(verifier: &str) -> String {
    base64encode(&sha256(verifier))
}

/// A verifier and the challenge derived from it.
#[derive(Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

// verifier is a secret; keep it out of `{:?}`
impl fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkcePair")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .finish()
    }
}

impl PkcePair {
    pub fn generate(length: usize) -> Result<Self> {
        let verifier = generate_random_string(length)?;
        Ok(Self::from_verifier(verifier))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = create_code_challenge(&verifier);
        Self { verifier, challenge }
    }
}

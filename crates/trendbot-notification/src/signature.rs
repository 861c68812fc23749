//! LINE 웹훅 서명 검증.
//!
//! `X-Line-Signature` = Base64(HMAC-SHA256(channel_secret, raw_body)).
//! `sha256=` 접두어가 붙은 값도 허용합니다.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// 서명 헤더 이름.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// 서명 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("서명 헤더가 없습니다")]
    Missing,

    #[error("서명 형식이 잘못되었습니다")]
    Malformed,

    #[error("서명이 일치하지 않습니다")]
    Mismatch,
}

/// 본문 서명 (Base64).
pub fn sign_body(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// 서명을 상수 시간으로 검증합니다.
pub fn verify_signature(
    channel_secret: &SecretString,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::Missing)?;
    let encoded = signature.strip_prefix("sha256=").unwrap_or(signature);
    let expected = STANDARD
        .decode(encoded)
        .map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

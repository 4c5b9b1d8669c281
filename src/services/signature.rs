use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Timestamp too old")]
    TimestampTooOld,
}

/// Generate HMAC-SHA256 signature for an outbound alert payload
pub fn generate_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let message = format!("{}.{}", timestamp, payload);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());

    let result = mac.finalize();
    format!("sha256={}", hex::encode(result.into_bytes()))
}

/// Verify HMAC-SHA256 signature on a received payload
pub fn verify_signature(
    secret: &str,
    signature: &str,
    timestamp: i64,
    payload: &str,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    // Check timestamp freshness (±5 minutes default)
    let now = chrono::Utc::now().timestamp();
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::TimestampTooOld);
    }

    let expected = generate_signature(secret, timestamp, payload);

    // Constant-time comparison to prevent timing attacks
    if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
        return Err(SignatureError::InvalidSignature);
    }

    Ok(())
}

/// Constant-time string comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

/// Generate cryptographically secure random secret key
pub fn generate_secret_key() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.random()).collect();
    hex::encode(bytes)
}

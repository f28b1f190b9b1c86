//! Payment lifecycle and gateway signature verification.
//!
//! A payment is created `pending` at order-creation time and transitions to
//! `completed`/`success` on verified capture or `failed` on signature
//! mismatch. All three outcomes are terminal; a failed payment is never
//! retried automatically.
//!
//! Capture verification recomputes an HMAC-SHA256 over
//! `"{order_id}|{payment_id}"` with the shared gateway secret and compares
//! it against the supplied signature in constant time.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix that marks a test-mode order. Test orders are accepted without
/// signature verification.
pub const TEST_ORDER_PREFIX: &str = "test_order_";

/// Prefix for locally generated test payment identifiers.
pub const TEST_PAYMENT_PREFIX: &str = "test_payment_";

/// Length of the random suffix on locally generated order identifiers.
const ORDER_SUFFIX_LENGTH: usize = 14;

/// Payment record status.
///
/// `Completed` and `Success` are equivalent captured states; both appear in
/// stored data and both count toward revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Success,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Success => "success",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "success" => Some(PaymentStatus::Success),
            _ => None,
        }
    }

    /// Whether this status counts as a captured payment.
    pub fn is_captured(self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Success)
    }

    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// Whether an order identifier carries the test-mode marker.
pub fn is_test_order(order_id: &str) -> bool {
    order_id.starts_with(TEST_ORDER_PREFIX)
}

/// Generate a test-mode order identifier.
///
/// Used when no payment gateway is configured; the random suffix keeps ids
/// unique without a gateway round-trip.
pub fn generate_test_order_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(ORDER_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{TEST_ORDER_PREFIX}{suffix}")
}

/// Generate a test-mode payment identifier for auto-verified test captures.
pub fn generate_test_payment_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(ORDER_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{TEST_PAYMENT_PREFIX}{suffix}")
}

/// Compute the hex-encoded capture signature for an (order, payment) pair.
pub fn compute_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex_encode(&mac.finalize().into_bytes())
}

/// Verify a capture signature in constant time.
///
/// The supplied signature is hex-decoded and checked with
/// [`Mac::verify_slice`], so a mismatch takes the same time regardless of
/// where the bytes diverge. Malformed hex fails verification.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Some(sig_bytes) = hex_decode(signature) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Encode bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string; returns `None` on odd length or non-hex characters.
fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

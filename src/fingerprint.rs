use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::normalize::normalize_text;

/// Duplicate key for a logical transaction: hex SHA-256 over the account id,
/// ISO date, normalized description and signed amount in cents.
pub fn fingerprint(date: NaiveDate, description: &str, amount: f64, account_id: Option<&str>) -> String {
    let cents = (amount * 100.0).round() as i64;
    let input = format!(
        "{}|{}|{}|{}",
        account_id.unwrap_or(""),
        date.format("%Y-%m-%d"),
        normalize_text(description),
        cents
    );
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

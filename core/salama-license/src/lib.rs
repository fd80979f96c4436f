//! License retrieval and display helpers for the account view.
//!
//! Licenses are owned entirely by the server; this crate only fetches and
//! formats them. The account page shows each license's masked key, state
//! and the payment it was issued against.

mod service;

pub use service::{LicenseOverview, LicenseService};

use chrono::{DateTime, NaiveDateTime, Utc};

/// Masks a license key for display, keeping the last visible group.
///
/// Used as a fallback when the server did not supply `masked_license_key`.
/// Keys shorter than one group are returned unchanged; there is nothing
/// meaningful to hide.
#[must_use]
pub fn mask_license_key(key: &str) -> String {
    match key.rsplit_once('-') {
        Some((prefix, last)) => {
            let masked: Vec<String> = prefix
                .split('-')
                .enumerate()
                .map(|(i, group)| {
                    if i == 0 {
                        group.to_string()
                    } else {
                        "*".repeat(group.len())
                    }
                })
                .collect();
            format!("{}-{last}", masked.join("-"))
        }
        None => key.to_string(),
    }
}

/// Parses a server-formatted payment date (`YYYY-MM-DD HH:MM:SS`).
#[must_use]
pub fn parse_payment_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whole days between now and the given expiry date; negative once past.
#[must_use]
pub fn days_until(expiry: DateTime<Utc>) -> i64 {
    (expiry - Utc::now()).num_days()
}

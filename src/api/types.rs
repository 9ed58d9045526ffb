//! Shared payload types that cross service boundaries.

use serde::{Deserialize, Serialize};

/// The authenticated user's profile, as returned inside a login session
/// and by the profile endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A successful login: a bearer token plus the profile it belongs to.
#[derive(Deserialize, Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub user: UserProfile,
}

/// Formats an amount held in kobo (minor units) as a naira display string.
///
/// All money in the API travels as integer kobo. Rendering to "₦1,234.56"
/// only ever happens at the display edge.
pub fn format_naira(kobo: i64) -> String {
    let sign = if kobo < 0 { "-" } else { "" };
    let abs = kobo.unsigned_abs();
    let naira = abs / 100;
    let minor = abs % 100;

    // Insert thousands separators from the right.
    let digits = naira.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}\u{20a6}{grouped}.{minor:02}")
}

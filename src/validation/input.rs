//! Input shaping used by form front-ends while the user types.

use std::time::Duration;

pub const PHONE_DIGITS: usize = 10;

/// How long the confirmation banner stays visible after a successful submit.
pub const CONFIRMATION_DISPLAY: Duration = Duration::from_secs(4);

/// Keep only digits and cut the result to ten characters.
pub fn sanitize_phone_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(PHONE_DIGITS)
        .collect()
}

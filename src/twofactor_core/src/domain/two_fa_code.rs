use std::fmt;

use rand::seq::SliceRandom;

use super::two_fa_error::TwoFaError;

/// Digits a code is drawn from. Non-zero digits appear twice and zero once, so a
/// code holds any digit at most twice and all-identical codes cannot be drawn.
const CODE_POOL: &[u8] = b"0123456789123456789";
const CODE_LENGTH: usize = 4;
const MAX_CODE: u16 = 9999;

/// Four-digit code sent to the user by email.
///
/// Stored as a number: a leading zero is part of the displayed code but users
/// typing it into a number field may drop it, so `"0123"` and `"123"` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TwoFaCode(u16);

impl TwoFaCode {
    /// Draw a fresh code.
    pub fn new() -> Self {
        let mut pool = CODE_POOL.to_vec();
        pool.shuffle(&mut rand::rng());
        let value = pool[..CODE_LENGTH]
            .iter()
            .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
        Self(value)
    }

    pub fn parse(raw: &str) -> Result<Self, TwoFaError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > CODE_LENGTH
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TwoFaError::InvalidCode);
        }
        trimmed
            .parse::<u16>()
            .map(Self)
            .map_err(|_| TwoFaError::InvalidCode)
    }

    pub fn from_value(value: u16) -> Result<Self, TwoFaError> {
        if value > MAX_CODE {
            return Err(TwoFaError::InvalidCode);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl Default for TwoFaCode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TwoFaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = CODE_LENGTH)
    }
}

use anyhow::bail;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

/// A three-letter currency code, such as `USD`.
///
/// Codes are stored in upper case, so `"usd".parse()` and `"USD".parse()`
/// give the same `Currency`.
#[derive(Clone, DeserializeFromStr, Eq, PartialEq, SerializeDisplay)]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Self = Self(*b"USD");

    #[must_use]
    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::USD
    }
}

impl Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        let Ok(bytes) = <[u8; 3]>::try_from(code.as_bytes()) else {
            bail!("currency code must be three letters: {s:?}");
        };
        if !bytes.iter().all(u8::is_ascii_uppercase) {
            bail!("currency code must be three letters: {s:?}");
        }
        Ok(Self(bytes))
    }
}

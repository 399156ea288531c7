use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// United Nations location code: two letters of country followed by three
/// letters or digits 2-9 naming the place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnLocode(String);

impl UnLocode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, AppError> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        let bytes = code.as_bytes();

        let valid = bytes.len() == 5
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..]
                .iter()
                .all(|b| b.is_ascii_uppercase() || (b'2'..=b'9').contains(b));

        if !valid {
            return Err(AppError::InvalidUnLocode(code));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnLocode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UnLocode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnLocode> for String {
    fn from(value: UnLocode) -> Self {
        value.0
    }
}

/// A port or terminal. Two locations are the same location when their codes
/// match; the display name is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub un_locode: UnLocode,
    pub name: String,
}

impl Location {
    pub fn new(un_locode: UnLocode, name: impl Into<String>) -> Self {
        Self {
            un_locode,
            name: name.into(),
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.un_locode == other.un_locode
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.un_locode.hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.un_locode)
    }
}

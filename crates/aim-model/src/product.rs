//! Product types and validation levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Product tag selecting a configuration set (e.g. `life`, `annuity`).
///
/// The set of products is open: any name with configuration behind it is a
/// product. Names are trimmed and lowercased on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductType(String);

impl ProductType {
    pub fn new(raw: &str) -> Result<Self, ModelError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ModelError::EmptyProductType);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProductType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.0
    }
}

/// Validation strictness. Each level runs every rule of the levels below it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Basic,
    #[default]
    Full,
    Strict,
}

impl ValidationLevel {
    pub const ALL: [ValidationLevel; 3] = [Self::Basic, Self::Full, Self::Strict];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Full => "full",
            Self::Strict => "strict",
        }
    }

    /// Levels whose rules apply when validating at `self`, lowest first.
    pub fn cumulative(self) -> impl Iterator<Item = ValidationLevel> {
        Self::ALL.into_iter().filter(move |level| *level <= self)
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "full" => Ok(Self::Full),
            "strict" => Ok(Self::Strict),
            _ => Err(ModelError::UnknownValidationLevel(s.to_string())),
        }
    }
}

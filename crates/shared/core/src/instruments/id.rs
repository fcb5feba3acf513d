use serde::{Deserialize, Serialize};

/// Unique identifier for an instrument
///
/// This provides a stable reference to an instrument that can be stored
/// in orders and used as map keys, without copying the full metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    /// Create a new instrument ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstrumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Exchange segment the instrument trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExchangeSegment {
    /// NSE cash market
    Nse,
    /// NSE futures & options
    Nfo,
    /// BSE cash market
    Bse,
    /// Commodities
    Mcx,
}

impl ExchangeSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Nfo => "NFO",
            Self::Bse => "BSE",
            Self::Mcx => "MCX",
        }
    }
}

impl std::fmt::Display for ExchangeSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniprotAccession(String);

impl UniprotAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniprotAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UniprotAccession {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let is_valid = (6..=10).contains(&normalized.len())
            && normalized.chars().all(|ch| ch.is_ascii_alphanumeric())
            && normalized
                .chars()
                .next()
                .map(|ch| ch.is_ascii_alphabetic())
                .unwrap_or(false);
        if !is_valid {
            return Err(ScanError::InvalidAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_accession_valid() {
        let acc: UniprotAccession = "q9x2h4".parse().unwrap();
        assert_eq!(acc.as_str(), "Q9X2H4");
    }

    #[test]
    fn parse_accession_long_form() {
        let acc: UniprotAccession = "A0A0H3JQ60".parse().unwrap();
        assert_eq!(acc.as_str(), "A0A0H3JQ60");
    }

    #[test]
    fn parse_accession_invalid() {
        let err = "not an accession".parse::<UniprotAccession>().unwrap_err();
        assert_matches!(err, ScanError::InvalidAccession(_));

        let err = "12345".parse::<UniprotAccession>().unwrap_err();
        assert_matches!(err, ScanError::InvalidAccession(_));
    }

    #[test]
    fn strand_display() {
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert_eq!(Strand::Unknown.to_string(), ".");
    }
}

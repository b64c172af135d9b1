//! Currency and display locale for monetary amounts.
//!
//! CRITICAL: Never use floating-point for money calculations. Amounts are
//! `rust_decimal::Decimal` in major units (kroner, not øre).

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Norwegian Krone
    Nok,
    /// Swedish Krona
    Sek,
    /// Danish Krone
    Dkk,
    /// Euro
    Eur,
    /// US Dollar
    Usd,
}

impl Currency {
    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Nok => "NOK",
            Self::Sek => "SEK",
            Self::Dkk => "DKK",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }

    /// Returns the symbol used as a suffix in Nordic locales.
    #[must_use]
    pub const fn local_symbol(&self) -> &'static str {
        match self {
            Self::Nok | Self::Sek | Self::Dkk => "kr",
            Self::Eur => "€",
            Self::Usd => "$",
        }
    }
}

/// Display locale for formatted amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Norwegian Bokmål: `1 234,56 kr`.
    #[default]
    #[serde(rename = "nb-NO")]
    NbNo,
    /// US English: `NOK 1,234.56`.
    #[serde(rename = "en-US")]
    EnUs,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NOK" => Ok(Self::Nok),
            "SEK" => Ok(Self::Sek),
            "DKK" => Ok(Self::Dkk),
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "nb-no" | "nb" | "no" => Ok(Self::NbNo),
            "en-us" | "en" => Ok(Self::EnUs),
            _ => Err(format!("Unknown locale: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Nok.to_string(), "NOK");
        assert_eq!(Currency::Sek.to_string(), "SEK");
        assert_eq!(Currency::Dkk.to_string(), "DKK");
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Usd.to_string(), "USD");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("NOK").unwrap(), Currency::Nok);
        assert_eq!(Currency::from_str("nok").unwrap(), Currency::Nok);
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);
        assert!(Currency::from_str("INVALID").is_err());
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!(Locale::from_str("nb-NO").unwrap(), Locale::NbNo);
        assert_eq!(Locale::from_str("nb_no").unwrap(), Locale::NbNo);
        assert_eq!(Locale::from_str("en-US").unwrap(), Locale::EnUs);
        assert!(Locale::from_str("fr-FR").is_err());
    }

    #[test]
    fn test_locale_serde() {
        let json = serde_json::to_string(&Locale::NbNo).unwrap();
        assert_eq!(json, "\"nb-NO\"");
        let parsed: Locale = serde_json::from_str("\"en-US\"").unwrap();
        assert_eq!(parsed, Locale::EnUs);
    }
}

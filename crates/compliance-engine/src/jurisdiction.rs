//! Jurisdiction types for EU loan compliance checking
//!
//! Rules are scoped either EU-wide or to a single member state. A document
//! analysis names up to two member states: the credit provider's and the
//! recipient's (borrower's).

use serde::{Deserialize, Serialize};

/// EU member state codes (ISO 3166-1 alpha-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    DE,
    FR,
    ES,
    IT,
    NL,
    BE,
    AT,
    PT,
    IE,
    GR,
    PL,
    SE,
    FI,
    DK,
    CZ,
    RO,
    HU,
    SK,
    BG,
    HR,
    SI,
    LT,
    LV,
    EE,
    LU,
    CY,
    MT,
}

impl Country {
    pub const ALL: [Country; 27] = [
        Country::DE,
        Country::FR,
        Country::ES,
        Country::IT,
        Country::NL,
        Country::BE,
        Country::AT,
        Country::PT,
        Country::IE,
        Country::GR,
        Country::PL,
        Country::SE,
        Country::FI,
        Country::DK,
        Country::CZ,
        Country::RO,
        Country::HU,
        Country::SK,
        Country::BG,
        Country::HR,
        Country::SI,
        Country::LT,
        Country::LV,
        Country::EE,
        Country::LU,
        Country::CY,
        Country::MT,
    ];

    /// English country name
    pub fn name(&self) -> &'static str {
        match self {
            Country::DE => "Germany",
            Country::FR => "France",
            Country::ES => "Spain",
            Country::IT => "Italy",
            Country::NL => "Netherlands",
            Country::BE => "Belgium",
            Country::AT => "Austria",
            Country::PT => "Portugal",
            Country::IE => "Ireland",
            Country::GR => "Greece",
            Country::PL => "Poland",
            Country::SE => "Sweden",
            Country::FI => "Finland",
            Country::DK => "Denmark",
            Country::CZ => "Czech Republic",
            Country::RO => "Romania",
            Country::HU => "Hungary",
            Country::SK => "Slovakia",
            Country::BG => "Bulgaria",
            Country::HR => "Croatia",
            Country::SI => "Slovenia",
            Country::LT => "Lithuania",
            Country::LV => "Latvia",
            Country::EE => "Estonia",
            Country::LU => "Luxembourg",
            Country::CY => "Cyprus",
            Country::MT => "Malta",
        }
    }

    /// Two-letter code
    pub fn code(&self) -> &'static str {
        match self {
            Country::DE => "DE",
            Country::FR => "FR",
            Country::ES => "ES",
            Country::IT => "IT",
            Country::NL => "NL",
            Country::BE => "BE",
            Country::AT => "AT",
            Country::PT => "PT",
            Country::IE => "IE",
            Country::GR => "GR",
            Country::PL => "PL",
            Country::SE => "SE",
            Country::FI => "FI",
            Country::DK => "DK",
            Country::CZ => "CZ",
            Country::RO => "RO",
            Country::HU => "HU",
            Country::SK => "SK",
            Country::BG => "BG",
            Country::HR => "HR",
            Country::SI => "SI",
            Country::LT => "LT",
            Country::LV => "LV",
            Country::EE => "EE",
            Country::LU => "LU",
            Country::CY => "CY",
            Country::MT => "MT",
        }
    }

    /// Parse from a country code or English name (case-insensitive)
    pub fn parse_code(s: &str) -> Option<Self> {
        let needle = s.trim();
        Country::ALL.into_iter().find(|c| {
            c.code().eq_ignore_ascii_case(needle) || c.name().eq_ignore_ascii_case(needle)
        })
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Code and name of a supported member state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    pub code: &'static str,
    pub name: &'static str,
}

/// Every supported EU member state
pub fn countries() -> Vec<CountryInfo> {
    Country::ALL
        .iter()
        .map(|c| CountryInfo {
            code: c.code(),
            name: c.name(),
        })
        .collect()
}

/// Scope a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    #[serde(rename = "EU")]
    EuWide,
    #[serde(untagged)]
    Country(Country),
}

impl Jurisdiction {
    /// Label stamped on issues ("EU-wide" or the country name)
    pub fn label(&self) -> &'static str {
        match self {
            Jurisdiction::EuWide => "EU-wide",
            Jurisdiction::Country(c) => c.name(),
        }
    }

    pub fn is_eu_wide(&self) -> bool {
        matches!(self, Jurisdiction::EuWide)
    }
}

/// Country hints supplied with an analysis request.
///
/// Unknown or blank codes resolve to `None` and are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionHints {
    #[serde(default)]
    pub provider_country: Option<String>,
    #[serde(default, alias = "getterCountry")]
    pub recipient_country: Option<String>,
}

impl JurisdictionHints {
    pub fn new(provider: Option<&str>, recipient: Option<&str>) -> Self {
        Self {
            provider_country: provider.map(str::to_string),
            recipient_country: recipient.map(str::to_string),
        }
    }

    pub fn provider(&self) -> Option<Country> {
        self.provider_country.as_deref().and_then(Country::parse_code)
    }

    pub fn recipient(&self) -> Option<Country> {
        self.recipient_country
            .as_deref()
            .and_then(Country::parse_code)
    }

    /// True when `jurisdiction` is selected by these hints
    pub fn selects(&self, jurisdiction: Jurisdiction) -> bool {
        match jurisdiction {
            Jurisdiction::EuWide => true,
            Jurisdiction::Country(c) => self.provider() == Some(c) || self.recipient() == Some(c),
        }
    }
}

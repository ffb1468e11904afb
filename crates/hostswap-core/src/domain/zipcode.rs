use crate::error::CoreError;
use crate::rules::validation::{Field, ValidationErrors};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

macro_rules! zip_pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("valid zipcode regex"));
    };
}

zip_pattern!(ES_RE, r"\A(?:0[1-9]|[1-4]\d|5[0-2])\d{3}\z");
zip_pattern!(US_RE, r"\A\d{5}(?:-\d{4})?\z");
zip_pattern!(FR_RE, r"\A(?:[0-8]\d|9[0-8])\d{3}\z");
zip_pattern!(DE_RE, r"\A\d{5}\z");
zip_pattern!(IT_RE, r"\A\d{5}\z");
zip_pattern!(PT_RE, r"\A\d{4}(?:-\d{3})?\z");
zip_pattern!(
    GB_RE,
    r"\A(?:GIR ?0AA|[A-Z]{1,2}\d[A-Z\d]? ?\d[ABD-HJLNP-UW-Z]{2})\z"
);
zip_pattern!(
    CA_RE,
    r"\A[ABCEGHJ-NPRSTVXY]\d[ABCEGHJ-NPRSTV-Z] ?\d[ABCEGHJ-NPRSTV-Z]\d\z"
);
zip_pattern!(NL_RE, r"\A[1-9]\d{3} ?[A-Z]{2}\z");
zip_pattern!(MX_RE, r"\A\d{5}\z");

/// Countries whose postal code format can be checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CountryCode {
    #[default]
    Es,
    Us,
    Fr,
    De,
    It,
    Pt,
    Gb,
    Ca,
    Nl,
    Mx,
}

impl CountryCode {
    pub fn as_str(self) -> &'static str {
        match self {
            CountryCode::Es => "ES",
            CountryCode::Us => "US",
            CountryCode::Fr => "FR",
            CountryCode::De => "DE",
            CountryCode::It => "IT",
            CountryCode::Pt => "PT",
            CountryCode::Gb => "GB",
            CountryCode::Ca => "CA",
            CountryCode::Nl => "NL",
            CountryCode::Mx => "MX",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            CountryCode::Es => &ES_RE,
            CountryCode::Us => &US_RE,
            CountryCode::Fr => &FR_RE,
            CountryCode::De => &DE_RE,
            CountryCode::It => &IT_RE,
            CountryCode::Pt => &PT_RE,
            CountryCode::Gb => &GB_RE,
            CountryCode::Ca => &CA_RE,
            CountryCode::Nl => &NL_RE,
            CountryCode::Mx => &MX_RE,
        }
    }

    /// Expects a value already passed through [`normalize_zipcode`].
    pub fn matches(self, zipcode: &str) -> bool {
        self.pattern().is_match(zipcode)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ES" => Ok(CountryCode::Es),
            "US" => Ok(CountryCode::Us),
            "FR" => Ok(CountryCode::Fr),
            "DE" => Ok(CountryCode::De),
            "IT" => Ok(CountryCode::It),
            "PT" => Ok(CountryCode::Pt),
            "GB" | "UK" => Ok(CountryCode::Gb),
            "CA" => Ok(CountryCode::Ca),
            "NL" => Ok(CountryCode::Nl),
            "MX" => Ok(CountryCode::Mx),
            _ => Err(CoreError::UnsupportedCountry(s.to_string())),
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.as_str().to_string()
    }
}

pub fn normalize_zipcode(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// A missing zip code is reported as invalid, the same as a malformed one.
pub fn validate_zipcode(
    zipcode: Option<&str>,
    country: CountryCode,
    errors: &mut ValidationErrors,
) {
    match zipcode {
        Some(value) if country.matches(value) => {}
        _ => errors.invalid(Field::Zipcode),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_zipcode, validate_zipcode, CountryCode};
    use crate::rules::validation::{ErrorKind, Field, ValidationErrors};

    #[test]
    fn spanish_codes_cover_provinces_01_to_52() {
        let es = CountryCode::Es;
        assert!(es.matches("28013"));
        assert!(es.matches("01001"));
        assert!(es.matches("52001"));
        assert!(!es.matches("00123"));
        assert!(!es.matches("53000"));
        assert!(!es.matches("2801"));
        assert!(!es.matches("280130"));
        assert!(!es.matches("28O13"));
    }

    #[test]
    fn other_countries_use_their_own_formats() {
        assert!(CountryCode::Us.matches("30301"));
        assert!(CountryCode::Us.matches("30301-1234"));
        assert!(CountryCode::Pt.matches("1100-148"));
        assert!(CountryCode::Gb.matches(&normalize_zipcode("sw1a 1aa")));
        assert!(CountryCode::Ca.matches("K1A 0B1"));
        assert!(CountryCode::Nl.matches("1012 AB"));
        assert!(!CountryCode::De.matches("1234"));
    }

    #[test]
    fn country_codes_parse_case_insensitively() {
        assert_eq!("es".parse::<CountryCode>().unwrap(), CountryCode::Es);
        assert_eq!("uk".parse::<CountryCode>().unwrap(), CountryCode::Gb);
        assert!("zz".parse::<CountryCode>().is_err());
    }

    #[test]
    fn missing_zipcode_is_invalid() {
        let mut errors = ValidationErrors::default();
        validate_zipcode(None, CountryCode::Es, &mut errors);
        assert!(errors.has_on(Field::Zipcode, ErrorKind::Invalid));
    }
}

//! FHIR-shaped datatypes used across Atria resources.
//!
//! These are not complete representations of the FHIR datatypes. They cover
//! the sub-structures the administrative resources actually store (coded
//! values, money amounts, periods, names, addresses) with FHIR's JSON casing,
//! so payloads round-trip unchanged through the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coding - a reference to a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// CodeableConcept - a coded value plus human-readable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CodeableConcept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
}

impl CodeableConcept {
    /// A concept is empty when it carries neither text nor a single coding.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().unwrap_or("").is_empty() && self.coding.is_empty()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            coding: Vec::new(),
        }
    }
}

/// Money - a monetary amount with an ISO 4217 currency code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    // Kept as a JSON number on the wire, with the decimal scale intact.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub value: Decimal,
    pub currency: String,
}

impl std::fmt::Display for Money {
    /// Renders as the list screens do: `$1250.00 USD`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2} {}", self.value, self.currency)
    }
}

/// Period - a time range bounded by optional start/end instants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// HumanName - family/given parts plus an optional pre-rendered text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
}

impl HumanName {
    /// The display form: explicit `text` if present, otherwise the joined parts.
    pub fn text_or_joined(&self) -> String {
        if let Some(text) = &self.text {
            if !text.is_empty() {
                return text.clone();
            }
        }
        let mut parts: Vec<&str> = self.prefix.iter().map(String::as_str).collect();
        parts.extend(self.given.iter().map(String::as_str));
        if let Some(family) = &self.family {
            parts.push(family);
        }
        parts.join(" ")
    }
}

/// Address - a postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Administrative gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn money_displays_with_two_decimals_and_currency() {
        let total = Money {
            value: Decimal::new(125000, 2),
            currency: "USD".to_string(),
        };
        assert_eq!(total.to_string(), "$1250.00 USD");

        let rounded = Money {
            value: Decimal::new(5, 0),
            currency: "EUR".to_string(),
        };
        assert_eq!(rounded.to_string(), "$5.00 EUR");
    }

    #[test]
    fn money_round_trips_through_json() {
        let total: Money = serde_json::from_value(json!({
            "value": 1250.00,
            "currency": "USD"
        }))
        .unwrap();
        assert_eq!(total.currency, "USD");
        assert_eq!(total.to_string(), "$1250.00 USD");
    }

    #[test]
    fn money_value_serializes_as_a_json_number() {
        let total: Money = serde_json::from_str(r#"{"value": 1250.00, "currency": "USD"}"#).unwrap();
        let value = serde_json::to_value(&total).unwrap();
        assert!(value["value"].is_number(), "got {:?}", value["value"]);
        assert_eq!(value["value"].as_f64(), Some(1250.0));
        // The decimal scale survives re-serialization.
        assert_eq!(serde_json::to_string(&total).unwrap(), r#"{"value":1250.00,"currency":"USD"}"#);
    }

    #[test]
    fn codeable_concept_omits_empty_fields() {
        let concept = CodeableConcept::from_text("Office visit");
        let value = serde_json::to_value(&concept).unwrap();
        assert_eq!(value, json!({ "text": "Office visit" }));
        assert!(!concept.is_empty());
        assert!(CodeableConcept::default().is_empty());
    }

    #[test]
    fn human_name_prefers_text_over_parts() {
        let name: HumanName = serde_json::from_value(json!({
            "family": "Rivera",
            "given": ["Ana", "Luz"],
            "prefix": ["Dr."]
        }))
        .unwrap();
        assert_eq!(name.text_or_joined(), "Dr. Ana Luz Rivera");

        let with_text: HumanName = serde_json::from_value(json!({
            "text": "Ana Rivera, MD",
            "family": "Rivera"
        }))
        .unwrap();
        assert_eq!(with_text.text_or_joined(), "Ana Rivera, MD");
    }

    #[test]
    fn gender_uses_lowercase_codes() {
        let gender: AdministrativeGender = serde_json::from_value(json!("unknown")).unwrap();
        assert_eq!(gender, AdministrativeGender::Unknown);
        assert!(serde_json::from_value::<AdministrativeGender>(json!("Robot")).is_err());
    }
}

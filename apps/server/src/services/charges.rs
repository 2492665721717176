//! Charge validation - billing-readiness checks
//!
//! Read-only: validating a charge reports issues without mutating the row.
//! A charge is billable when it carries a charge code, a positive quantity,
//! and a positive price in a supported currency.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

use crate::{
    db::ResourceStore,
    models::{resources::Charge, ResourceKind},
    services::crud::{not_found, parse_id},
    Error, Result,
};

const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "GBP"];

pub struct ChargeValidator {
    store: Arc<dyn ResourceStore>,
}

impl ChargeValidator {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Validate a charge for billing (POST /api/charges/{id}/validate).
    pub async fn validate(&self, id: &str) -> Result<JsonValue> {
        let id = parse_id(ResourceKind::Charge, id)?;
        let stored = self
            .store
            .get(ResourceKind::Charge, id)
            .await?
            .ok_or_else(|| not_found(ResourceKind::Charge, id))?;

        let charge: Charge = serde_json::from_value(stored.payload.clone())
            .map_err(|e| Error::Internal(format!("Stored charge {id} is not readable: {e}")))?;

        let issues = check(&charge);
        tracing::debug!(charge_id = %id, issue_count = issues.len(), "charge validated");

        Ok(json!({
            "valid": issues.is_empty(),
            "issues": issues,
        }))
    }
}

fn check(charge: &Charge) -> Vec<String> {
    let mut issues = Vec::new();

    match &charge.code {
        None => issues.push("Charge has no charge code".to_string()),
        Some(code) if code.is_empty() => issues.push("Charge has no charge code".to_string()),
        Some(_) => {}
    }

    match charge.quantity {
        None => issues.push("Charge has no quantity".to_string()),
        Some(quantity) if quantity <= Decimal::ZERO => {
            issues.push(format!("Quantity must be positive, got {quantity}"))
        }
        Some(_) => {}
    }

    match &charge.unit_price {
        None => issues.push("Charge has no unit price".to_string()),
        Some(price) => {
            if price.value <= Decimal::ZERO {
                issues.push(format!("Unit price must be positive, got {}", price.value));
            }
            if !SUPPORTED_CURRENCIES.contains(&price.currency.as_str()) {
                issues.push(format!("Unsupported currency: {}", price.currency));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn charge(payload: JsonValue) -> Charge {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn complete_charge_has_no_issues() {
        let charge = charge(json!({
            "fhirId": "charge-1",
            "status": "planned",
            "code": { "text": "99213" },
            "quantity": 1,
            "unitPrice": { "value": 125.00, "currency": "USD" }
        }));
        assert!(check(&charge).is_empty());
    }

    #[test]
    fn missing_fields_each_raise_an_issue() {
        let charge = charge(json!({
            "fhirId": "charge-1",
            "status": "planned"
        }));
        let issues = check(&charge);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.contains("charge code")));
        assert!(issues.iter().any(|i| i.contains("quantity")));
        assert!(issues.iter().any(|i| i.contains("unit price")));
    }

    #[test]
    fn non_positive_amounts_and_odd_currency_are_flagged() {
        let charge = charge(json!({
            "fhirId": "charge-1",
            "status": "planned",
            "code": { "text": "99213" },
            "quantity": 0,
            "unitPrice": { "value": -5.00, "currency": "JPY" }
        }));
        let issues = check(&charge);
        assert!(issues.iter().any(|i| i.contains("Quantity must be positive")));
        assert!(issues.iter().any(|i| i.contains("Unit price must be positive")));
        assert!(issues.iter().any(|i| i.contains("Unsupported currency: JPY")));
    }

    #[test]
    fn empty_code_counts_as_missing() {
        let charge = charge(json!({
            "fhirId": "charge-1",
            "status": "planned",
            "code": {},
            "quantity": 2,
            "unitPrice": { "value": 40.00, "currency": "EUR" }
        }));
        let issues = check(&charge);
        assert_eq!(issues, vec!["Charge has no charge code".to_string()]);
    }
}

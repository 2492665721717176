//! Typed resource payloads and boundary validation
//!
//! Every inbound payload is deserialized into the typed struct for its kind
//! and re-serialized to canonical JSON before it reaches the store. Missing
//! required fields and out-of-vocabulary enum values are rejected here, once,
//! instead of per-screen.

use atria_types::{
    Address, AdministrativeGender, CodeableConcept, HumanName, Money, Period,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{models::ResourceKind, Error, Result};

// ============================================================================
// Status vocabularies
// ============================================================================

/// Shared by Claim, ClaimResponse and Coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinancialStatus {
    Active,
    Draft,
    Cancelled,
    EnteredInError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimUse {
    Claim,
    Preauthorization,
    Predetermination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimOutcome {
    Queued,
    Complete,
    Error,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationStatus {
    Active,
    Inactive,
    EnteredInError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Requested,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    /// Terminal tasks cannot be executed again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskIntent {
    Order,
    Plan,
    Proposal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Proposed,
    Booked,
    Arrived,
    Fulfilled,
    Cancelled,
    Noshow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeStatus {
    Planned,
    Billable,
    Billed,
    Aborted,
    EnteredInError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Draft,
    Active,
    Retired,
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub fhir_id: String,
    pub status: FinancialStatus,
    #[serde(rename = "use")]
    pub use_: ClaimUse,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub fhir_id: String,
    pub status: FinancialStatus,
    pub outcome: ClaimOutcome,
    pub patient_id: String,
    /// Server id of the Claim this response answers. Nulled when the claim is
    /// deleted, so response history survives the claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub fhir_id: String,
    pub status: FinancialStatus,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<CodeableConcept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub fhir_id: String,
    pub status: MedicationStatus,
    pub code: CodeableConcept,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    pub fhir_id: String,
    pub npi: String,
    pub name: HumanName,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub fhir_id: String,
    pub mrn: String,
    pub name: HumanName,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub fhir_id: String,
    pub status: TaskStatus,
    pub intent: TaskIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Free-form input the task operates on; shape is task-defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<TaskExecution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecution {
    pub last_run_at: DateTime<Utc>,
    pub run_count: u32,
    pub outcome: TaskOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub fhir_id: String,
    pub status: AppointmentStatus,
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub fhir_id: String,
    pub status: ChargeStatus,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub fhir_id: String,
    pub status: SurveyStatus,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<SurveyQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuestion {
    pub link_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub type_: QuestionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Boolean,
    Choice,
    Integer,
}

fn default_active() -> bool {
    true
}

// ============================================================================
// Boundary validation
// ============================================================================

/// One unique identifier extracted from a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierValue {
    /// Database column name (`fhir_id`, `npi`, `mrn`).
    pub column: &'static str,
    /// JSON field name in the payload (`fhirId`, `npi`, `mrn`).
    pub field: &'static str,
    pub value: String,
}

/// A payload that passed schema-shape validation, in canonical JSON form.
#[derive(Debug, Clone)]
pub struct ValidatedResource {
    pub kind: ResourceKind,
    /// Unique identifiers, `fhir_id` first.
    pub identifiers: Vec<IdentifierValue>,
    /// ClaimResponse only: extracted claim reference for the FK column.
    pub request_id: Option<Uuid>,
    pub payload: JsonValue,
}

/// Validate a raw payload against the typed model for its kind.
///
/// Unknown top-level fields are dropped (payloads are schema-flexible, and
/// server-assigned fields like `id` must not be client-controlled); missing
/// required fields and invalid enum values are rejected.
pub fn validate_payload(kind: ResourceKind, payload: JsonValue) -> Result<ValidatedResource> {
    match kind {
        ResourceKind::Claim => canonicalize::<Claim>(kind, payload, |_, _| {}),
        ResourceKind::ClaimResponse => {
            canonicalize::<ClaimResponse>(kind, payload, |typed, out| {
                out.request_id = typed.request_id;
            })
        }
        ResourceKind::Coverage => canonicalize::<Coverage>(kind, payload, |_, _| {}),
        ResourceKind::Medication => canonicalize::<Medication>(kind, payload, |_, _| {}),
        ResourceKind::Practitioner => {
            canonicalize::<Practitioner>(kind, payload, |typed, out| {
                out.identifiers.push(IdentifierValue {
                    column: "npi",
                    field: "npi",
                    value: typed.npi.clone(),
                });
            })
        }
        ResourceKind::Patient => canonicalize::<Patient>(kind, payload, |typed, out| {
            out.identifiers.push(IdentifierValue {
                column: "mrn",
                field: "mrn",
                value: typed.mrn.clone(),
            });
        }),
        ResourceKind::Task => canonicalize::<Task>(kind, payload, |_, _| {}),
        ResourceKind::Appointment => canonicalize::<Appointment>(kind, payload, |_, _| {}),
        ResourceKind::Charge => canonicalize::<Charge>(kind, payload, |_, _| {}),
        ResourceKind::Survey => canonicalize::<Survey>(kind, payload, |_, _| {}),
    }
}

fn canonicalize<T>(
    kind: ResourceKind,
    payload: JsonValue,
    extract: impl FnOnce(&T, &mut ValidatedResource),
) -> Result<ValidatedResource>
where
    T: Serialize + DeserializeOwned,
{
    let typed: T = serde_json::from_value(payload)
        .map_err(|e| Error::InvalidPayload(format!("Invalid {} payload: {}", kind.name(), e)))?;

    let canonical = serde_json::to_value(&typed)
        .map_err(|e| Error::Internal(format!("Failed to serialize {}: {}", kind.name(), e)))?;

    let fhir_id = canonical
        .get("fhirId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            Error::InvalidPayload(format!("{} payload is missing fhirId", kind.name()))
        })?;
    if fhir_id.trim().is_empty() {
        return Err(Error::InvalidPayload(format!(
            "{} fhirId must not be empty",
            kind.name()
        )));
    }

    let mut validated = ValidatedResource {
        kind,
        identifiers: vec![IdentifierValue {
            column: "fhir_id",
            field: "fhirId",
            value: fhir_id.to_string(),
        }],
        request_id: None,
        payload: canonical,
    };

    extract(&typed, &mut validated);
    Ok(validated)
}

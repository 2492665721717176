//! Resource type registry
//!
//! Each administrative resource lives in its own table but follows one shape.
//! `ResourceKind` carries the per-type metadata the generic store and handlers
//! need: table name, URL path segment, unique identifier fields, and the
//! whitelists of filterable/searchable payload fields.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Claim,
    ClaimResponse,
    Coverage,
    Medication,
    Practitioner,
    Patient,
    Task,
    Appointment,
    Charge,
    Survey,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Claim,
        ResourceKind::ClaimResponse,
        ResourceKind::Coverage,
        ResourceKind::Medication,
        ResourceKind::Practitioner,
        ResourceKind::Patient,
        ResourceKind::Task,
        ResourceKind::Appointment,
        ResourceKind::Charge,
        ResourceKind::Survey,
    ];

    /// Parse the URL path segment (`/api/{segment}`).
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.path_segment() == segment)
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceKind::Claim => "claims",
            ResourceKind::ClaimResponse => "claim-responses",
            ResourceKind::Coverage => "coverages",
            ResourceKind::Medication => "medications",
            ResourceKind::Practitioner => "practitioners",
            ResourceKind::Patient => "patients",
            ResourceKind::Task => "tasks",
            ResourceKind::Appointment => "appointments",
            ResourceKind::Charge => "charges",
            ResourceKind::Survey => "surveys",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Claim => "Claim",
            ResourceKind::ClaimResponse => "ClaimResponse",
            ResourceKind::Coverage => "Coverage",
            ResourceKind::Medication => "Medication",
            ResourceKind::Practitioner => "Practitioner",
            ResourceKind::Patient => "Patient",
            ResourceKind::Task => "Task",
            ResourceKind::Appointment => "Appointment",
            ResourceKind::Charge => "Charge",
            ResourceKind::Survey => "Survey",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::Claim => "claims",
            ResourceKind::ClaimResponse => "claim_responses",
            ResourceKind::Coverage => "coverages",
            ResourceKind::Medication => "medications",
            ResourceKind::Practitioner => "practitioners",
            ResourceKind::Patient => "patients",
            ResourceKind::Task => "tasks",
            ResourceKind::Appointment => "appointments",
            ResourceKind::Charge => "charges",
            ResourceKind::Survey => "surveys",
        }
    }

    /// Unique identifier columns beyond `fhir_id`, as `(column, json_field)`.
    pub fn extra_identifier_columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ResourceKind::Practitioner => &[("npi", "npi")],
            ResourceKind::Patient => &[("mrn", "mrn")],
            _ => &[],
        }
    }

    /// Payload fields accepted as equality filters on list requests.
    pub fn equality_filter_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Claim => &["status", "use", "patientId", "providerId", "insurerId"],
            ResourceKind::ClaimResponse => &["status", "outcome", "patientId", "requestId"],
            ResourceKind::Coverage => &["status", "patientId", "payorId"],
            ResourceKind::Medication => &["status"],
            ResourceKind::Practitioner => &["active", "npi"],
            ResourceKind::Patient => &["active", "gender", "mrn"],
            ResourceKind::Task => &["status", "intent", "patientId", "ownerId"],
            ResourceKind::Appointment => &["status", "patientId", "practitionerId"],
            ResourceKind::Charge => &["status", "patientId"],
            ResourceKind::Survey => &["status"],
        }
    }

    /// Display fields matched by the free-text `q` parameter.
    /// Dotted entries address nested payload objects.
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Claim => &["fhirId", "type.text"],
            ResourceKind::ClaimResponse => &["fhirId", "disposition"],
            ResourceKind::Coverage => &["fhirId", "plan.text"],
            ResourceKind::Medication => &["fhirId", "code.text"],
            ResourceKind::Practitioner => &["npi", "name.text", "name.family"],
            ResourceKind::Patient => &["mrn", "name.text", "name.family"],
            ResourceKind::Task => &["fhirId", "description"],
            ResourceKind::Appointment => &["fhirId", "description"],
            ResourceKind::Charge => &["fhirId", "code.text"],
            ResourceKind::Survey => &["fhirId", "title"],
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

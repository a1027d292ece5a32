//! Draft status bookkeeping and the pre-publish gate.

use crate::error::{Error, Result};
use crate::parse::types::{WorkflowDefinition, WorkflowStatus};
use crate::validate::{FieldExtractor, ValidationResult, Validator};

/// Status a workflow should carry after being validated. Drafts flip between
/// `draft` and `invalid_draft`; published and archived workflows keep theirs.
pub fn status_after_validation(current: WorkflowStatus, result: &ValidationResult) -> WorkflowStatus {
    match current {
        WorkflowStatus::Draft | WorkflowStatus::InvalidDraft if result.valid => WorkflowStatus::Draft,
        WorkflowStatus::Draft | WorkflowStatus::InvalidDraft => WorkflowStatus::InvalidDraft,
        other => other,
    }
}

/// Gate for the draft → published transition. Returns the validation result
/// (which may still carry warnings) when publishing may proceed.
pub fn check_publishable<E: FieldExtractor>(
    workflow: &WorkflowDefinition,
    validator: &Validator<E>,
) -> Result<ValidationResult> {
    if !workflow.status.is_draft() {
        return Err(Error::InvalidTransition {
            workflow_id: workflow.id.clone(),
            from: workflow.status,
        });
    }

    let result = validator.validate(workflow);
    if !result.valid {
        tracing::debug!(
            workflow_id = %workflow.id,
            errors = result.errors.len(),
            "publish blocked by validation errors"
        );
        return Err(Error::NotPublishable {
            workflow_id: workflow.id.clone(),
            error_count: result.errors.len(),
        });
    }
    Ok(result)
}

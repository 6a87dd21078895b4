//! Operation validation
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. every exponent is +1 or -1
//! 2. every generator is `B<i>` with `1 <= i < event_count`
//! 3. `before` and `after` fusion paths have equal length
//! 4. an empty word leaves the lineage unchanged
//! 5. every attestation summary value is finite, shape or no shape
//! 6. the attestation matches the session's declared shape, if any
//!
//! ## Trust boundary
//!
//! The validator checks the *shape* of an operation, never its algebra.
//! Whether `after` really is the image of `before` under `word` is asserted
//! by the caller and stored as asserted.

use lineage_core::{Attestation, Lineage, ValidationError, Word};

use crate::config::{AttestationShape, SessionProfile};

/// Validate a proposed operation against a session profile.
pub fn validate(
    profile: &SessionProfile,
    word: &Word,
    before: &Lineage,
    after: &Lineage,
    attestation: Option<&Attestation>,
) -> Result<(), ValidationError> {
    validate_word(word, profile.event_count)?;
    validate_transition(word, before, after)?;
    if let Some(attestation) = attestation {
        validate_summary_values(attestation)?;
    }
    if let Some(shape) = &profile.attestation {
        let attestation = attestation.ok_or(ValidationError::MissingAttestation)?;
        validate_attestation(shape, attestation)?;
    }
    Ok(())
}

/// Exponent and generator checks, step by step.
pub fn validate_word(word: &Word, event_count: usize) -> Result<(), ValidationError> {
    for (position, step) in word.iter().enumerate() {
        if step.exponent != 1 && step.exponent != -1 {
            return Err(ValidationError::InvalidExponent {
                position,
                exponent: step.exponent,
            });
        }
        let index = step
            .generator_index()
            .ok_or_else(|| ValidationError::UnknownGenerator {
                position,
                generator: step.generator.clone(),
            })?;
        if index >= event_count {
            return Err(ValidationError::GeneratorOutOfRange {
                position,
                generator: step.generator.clone(),
                event_count,
            });
        }
    }
    Ok(())
}

/// Fusion length and empty-word checks.
pub fn validate_transition(
    word: &Word,
    before: &Lineage,
    after: &Lineage,
) -> Result<(), ValidationError> {
    if before.fusion_path.len() != after.fusion_path.len() {
        return Err(ValidationError::FusionLengthMismatch {
            before: before.fusion_path.len(),
            after: after.fusion_path.len(),
        });
    }
    if word.is_empty() && before != after {
        return Err(ValidationError::NonIdentityEmptyWord);
    }
    Ok(())
}

/// Summary values must be finite; JSON has no encoding for NaN or infinity.
pub fn validate_summary_values(attestation: &Attestation) -> Result<(), ValidationError> {
    match attestation.summary.iter().find(|(_, value)| !value.is_finite()) {
        Some((key, _)) => Err(ValidationError::NonFiniteSummaryValue { key: key.clone() }),
        None => Ok(()),
    }
}

/// Attestation shape check.
pub fn validate_attestation(
    shape: &AttestationShape,
    attestation: &Attestation,
) -> Result<(), ValidationError> {
    if shape.require_digest && attestation.digest.trim().is_empty() {
        return Err(ValidationError::EmptyDigest);
    }
    for key in &shape.required_keys {
        if !attestation.summary.contains_key(key) {
            return Err(ValidationError::MissingSummaryKey(key.clone()));
        }
    }
    validate_summary_values(attestation)?;
    for (key, value) in &attestation.summary {
        if let Some(range) = shape.ranges.get(key) {
            if !range.contains(*value) {
                return Err(ValidationError::SummaryValueOutOfRange {
                    key: key.clone(),
                    value: *value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
    }
    Ok(())
}

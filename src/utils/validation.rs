//! Validation utilities

use crate::types::*;

/// Validate that a business id is usable as a lookup key
pub fn validate_business_id(business_id: &str) -> ReconResult<()> {
    if business_id.trim().is_empty() {
        return Err(ReconError::Validation(
            "business id cannot be empty".to_string(),
        ));
    }

    if business_id.len() > 50 {
        return Err(ReconError::Validation(
            "business id cannot exceed 50 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate an ad hoc expense category
pub fn validate_category(category: &str) -> ReconResult<()> {
    if category.trim().is_empty() {
        return Err(ReconError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if category.len() > 100 {
        return Err(ReconError::Validation(
            "category cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a reconciliation description
pub fn validate_description(description: &str) -> ReconResult<()> {
    if description.trim().is_empty() {
        return Err(ReconError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    if description.len() > 500 {
        return Err(ReconError::Validation(
            "description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

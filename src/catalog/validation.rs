//! Input validation for the mutation boundary
//!
//! Checks run before a payload reaches the coordinator:
//! - Names must be non-empty
//! - Types must be non-empty strings (at least one on create)
//! - Image URLs must parse as absolute URLs

use super::model::{CreaturePatch, NewCreature};
use serde::Serialize;
use url::Url;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a create payload
pub fn validate_new(input: &NewCreature) -> ValidationResult {
    let mut errors = Vec::new();

    check_name(&input.name, &mut errors);
    check_types(&input.types, &mut errors);
    check_image_url(&input.image_url, &mut errors);

    finish(errors)
}

/// Validate a patch; absent fields are not checked
pub fn validate_patch(patch: &CreaturePatch) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(ref name) = patch.name {
        check_name(name, &mut errors);
    }
    if let Some(ref types) = patch.types {
        check_types(types, &mut errors);
    }
    if let Some(ref image_url) = patch.image_url {
        check_image_url(image_url, &mut errors);
    }

    finish(errors)
}

fn check_name(name: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError::new("name", "must not be empty"));
    }
}

fn check_types(types: &[String], errors: &mut Vec<ValidationError>) {
    if types.is_empty() {
        errors.push(ValidationError::new("types", "must contain at least one type"));
    }
    for (i, t) in types.iter().enumerate() {
        if t.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("types[{}]", i),
                "must not be empty",
            ));
        }
    }
}

fn check_image_url(image_url: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(image_url) {
        Ok(url) if url.has_host() => {}
        Ok(_) => errors.push(ValidationError::new("imageUrl", "must include a host")),
        Err(e) => errors.push(ValidationError::new(
            "imageUrl",
            format!("must be a valid URL ({})", e),
        )),
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_creature() {
        let input = NewCreature::new("eevee", ["normal"], "https://img.example/eevee.png");
        assert!(validate_new(&input).is_ok());
    }

    #[test]
    fn test_empty_name_and_bad_url() {
        let input = NewCreature::new("  ", ["normal"], "not a url");
        let errors = validate_new(&input).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].field, "imageUrl");
    }

    #[test]
    fn test_types_rules() {
        let none = NewCreature::new("eevee", Vec::<String>::new(), "https://img.example/e.png");
        let errors = validate_new(&none).unwrap_err();
        assert_eq!(errors[0].field, "types");

        let blank = NewCreature::new("eevee", ["normal", ""], "https://img.example/e.png");
        let errors = validate_new(&blank).unwrap_err();
        assert_eq!(errors[0].field, "types[1]");
    }

    #[test]
    fn test_url_without_host_rejected() {
        let input = NewCreature::new("eevee", ["normal"], "mailto:someone");
        let errors = validate_new(&input).unwrap_err();
        assert_eq!(errors[0].message, "must include a host");
    }

    #[test]
    fn test_patch_only_checks_present_fields() {
        let patch = CreaturePatch {
            name: Some("raichu".to_string()),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_ok());

        let patch = CreaturePatch {
            image_url: Some("ftp//broken".to_string()),
            ..Default::default()
        };
        let errors = validate_patch(&patch).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "imageUrl");
    }
}

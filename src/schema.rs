//! Schema collaborator boundary and a batteries-included validation kit.
//!
//! The engine consumes a schema only through [`InputSchema`]: an async
//! `parse` that turns raw JSON into a typed value or throws a recognizable
//! [`SchemaViolation`]. Anything implementing the trait plugs in; this module
//! also ships two ready-made implementations so common cases need no external
//! validation framework:
//!
//! - [`SerdeSchema`] parses purely by serde decoding.
//! - [`ValidatedSchema`] decodes, then runs the type's [`Validate`] rules.
//!
//! The [`RuleSet`] builder covers the usual field checks (required, length,
//! range, pattern, custom) with uniform [`FieldViolation`] reporting.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Serialize, Deserialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//!     age: i64,
//! }
//!
//! impl Validate for CreateUser {
//!     fn validate(&self) -> Result<(), SchemaViolation> {
//!         RuleSet::new()
//!             .required("name", &self.name)
//!             .min_length("name", &self.name, 2)
//!             .pattern("email", &self.email, r"^[^@\s]+@[^@\s]+$")
//!             .range("age", self.age, 0, 150)
//!             .finish()
//!     }
//! }
//!
//! let chain = ActionRouter::new().input(ValidatedSchema::<CreateUser>::new())?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

// =============================================================================
// Violations
// =============================================================================

/// Validation failure for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct FieldViolation {
    /// Name of the field that failed validation.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Code identifying the kind of check that failed.
    pub code: String,
}

impl FieldViolation {
    /// Creates a violation with an explicit code.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// A missing required field.
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(&field, format!("{} is required", field), "required")
    }

    /// A value shorter than the allowed minimum.
    pub fn min_length(field: impl Into<String>, min: usize) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must be at least {} characters", field, min),
            "min_length",
        )
    }

    /// A value longer than the allowed maximum.
    pub fn max_length(field: impl Into<String>, max: usize) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must be at most {} characters", field, max),
            "max_length",
        )
    }

    /// A number outside the allowed range.
    pub fn range(field: impl Into<String>, min: i64, max: i64) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must be between {} and {}", field, min, max),
            "range",
        )
    }

    /// A value that does not match the expected pattern.
    pub fn pattern(field: impl Into<String>, pattern: &str) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must match pattern: {}", field, pattern),
            "pattern",
        )
    }

    /// A violation with a caller-supplied message.
    pub fn custom(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, "custom")
    }
}

/// The recognizable validation error thrown by a schema's `parse`.
///
/// Carries an overall message plus any field-level detail. The terminal
/// boundary turns it into an `invalid-input` error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    message: String,
    fields: Vec<FieldViolation>,
}

impl SchemaViolation {
    /// Creates a violation with a message and no field detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a violation from field-level failures.
    pub fn from_fields(fields: Vec<FieldViolation>) -> Self {
        Self {
            message: "input validation failed".to_string(),
            fields,
        }
    }

    /// Creates a violation from a serde decoding failure.
    pub fn decode(err: serde_json::Error) -> Self {
        Self::new(format!("invalid input: {}", err))
    }

    /// The overall message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Field-level detail, empty for decode failures.
    pub fn fields(&self) -> &[FieldViolation] {
        &self.fields
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.fields.is_empty() {
            let detail: Vec<&str> = self.fields.iter().map(|v| v.message.as_str()).collect();
            write!(f, ": {}", detail.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaViolation {}

// =============================================================================
// Rule builder
// =============================================================================

/// Builder for common field checks, collecting violations as it goes.
///
/// Checks do not short-circuit: every failing rule contributes a violation so
/// the caller sees all problems at once.
#[derive(Debug, Default)]
pub struct RuleSet {
    violations: Vec<FieldViolation>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a non-blank value.
    #[must_use = "This method returns a new RuleSet and does not modify self"]
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.violations.push(FieldViolation::required(field));
        }
        self
    }

    /// Requires at least `min` characters.
    #[must_use = "This method returns a new RuleSet and does not modify self"]
    pub fn min_length(mut self, field: &str, value: &str, min: usize) -> Self {
        if value.chars().count() < min {
            self.violations.push(FieldViolation::min_length(field, min));
        }
        self
    }

    /// Requires at most `max` characters.
    #[must_use = "This method returns a new RuleSet and does not modify self"]
    pub fn max_length(mut self, field: &str, value: &str, max: usize) -> Self {
        if value.chars().count() > max {
            self.violations.push(FieldViolation::max_length(field, max));
        }
        self
    }

    /// Requires `min <= value <= max`.
    #[must_use = "This method returns a new RuleSet and does not modify self"]
    pub fn range(mut self, field: &str, value: i64, min: i64, max: i64) -> Self {
        if value < min || value > max {
            self.violations
                .push(FieldViolation::range(field, min, max));
        }
        self
    }

    /// Requires the value to match a regular expression.
    ///
    /// A pattern that fails to compile is itself reported as a violation
    /// rather than panicking mid-validation.
    #[must_use = "This method returns a new RuleSet and does not modify self"]
    pub fn pattern(mut self, field: &str, value: &str, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(value) {
                    self.violations.push(FieldViolation::pattern(field, pattern));
                }
            }
            Err(err) => {
                self.violations.push(FieldViolation::custom(
                    field,
                    format!("invalid validation pattern: {}", err),
                ));
            }
        }
        self
    }

    /// Records a violation unless the caller-evaluated condition holds.
    #[must_use = "This method returns a new RuleSet and does not modify self"]
    pub fn check(mut self, field: &str, valid: bool, message: &str) -> Self {
        if !valid {
            self.violations.push(FieldViolation::custom(field, message));
        }
        self
    }

    /// Number of violations collected so far.
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Finishes the rule set, failing if any check recorded a violation.
    pub fn finish(self) -> Result<(), SchemaViolation> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolation::from_fields(self.violations))
        }
    }
}

/// Rule-based validation for a decoded input type.
pub trait Validate {
    /// Checks the value, reporting every violated rule.
    fn validate(&self) -> Result<(), SchemaViolation>;
}

// =============================================================================
// Schema trait and bundled implementations
// =============================================================================

/// The schema collaborator consumed by the engine.
///
/// `parse` is async because real schema libraries may refine values with I/O
/// (uniqueness probes, remote rule sets). The parsed type must round-trip
/// through JSON: the engine stores it in the context's `inputs` slot as a
/// `serde_json::Value` and rehydrates it for the handler.
#[async_trait]
pub trait InputSchema: Send + Sync {
    /// The typed value produced on success.
    type Parsed: Serialize + DeserializeOwned + Send + 'static;

    /// Parses raw parameters, throwing a [`SchemaViolation`] on mismatch.
    async fn parse(&self, raw: serde_json::Value) -> Result<Self::Parsed, SchemaViolation>;
}

/// Schema that parses purely by serde decoding into `T`.
#[derive(Debug)]
pub struct SerdeSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    /// Creates the schema.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerdeSchema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> InputSchema for SerdeSchema<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Parsed = T;

    async fn parse(&self, raw: serde_json::Value) -> Result<T, SchemaViolation> {
        serde_json::from_value(raw).map_err(SchemaViolation::decode)
    }
}

/// Schema that decodes into `T`, then runs `T`'s [`Validate`] rules.
#[derive(Debug)]
pub struct ValidatedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValidatedSchema<T> {
    /// Creates the schema.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ValidatedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ValidatedSchema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> InputSchema for ValidatedSchema<T>
where
    T: Serialize + DeserializeOwned + Validate + Send + 'static,
{
    type Parsed = T;

    async fn parse(&self, raw: serde_json::Value) -> Result<T, SchemaViolation> {
        let value: T = serde_json::from_value(raw).map_err(SchemaViolation::decode)?;
        value.validate()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct SignUp {
        name: String,
        email: String,
        age: i64,
    }

    impl Validate for SignUp {
        fn validate(&self) -> Result<(), SchemaViolation> {
            RuleSet::new()
                .required("name", &self.name)
                .min_length("name", &self.name, 2)
                .max_length("name", &self.name, 50)
                .pattern("email", &self.email, r"^[^@\s]+@[^@\s]+$")
                .range("age", self.age, 0, 150)
                .finish()
        }
    }

    #[test]
    fn rule_set_collects_every_violation() {
        let result = RuleSet::new()
            .required("name", "  ")
            .range("age", 200, 0, 150)
            .min_length("code", "a", 3)
            .finish();

        let violation = result.unwrap_err();
        assert_eq!(violation.fields().len(), 3);
        let codes: Vec<&str> = violation.fields().iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, ["required", "range", "min_length"]);
    }

    #[test]
    fn rule_set_passes_clean_input() {
        let result = RuleSet::new()
            .required("name", "Ada")
            .min_length("name", "Ada", 2)
            .range("age", 36, 0, 150)
            .check("terms", true, "terms must be accepted")
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn invalid_pattern_is_reported_not_panicked() {
        let violation = RuleSet::new()
            .pattern("email", "a@b", "([unclosed")
            .finish()
            .unwrap_err();
        assert_eq!(violation.fields()[0].code, "custom");
    }

    #[test]
    fn violation_display_includes_field_detail() {
        let violation = SchemaViolation::from_fields(vec![
            FieldViolation::required("name"),
            FieldViolation::range("age", 0, 150),
        ]);
        assert_eq!(
            violation.to_string(),
            "input validation failed: name is required; age must be between 0 and 150"
        );
    }

    #[tokio::test]
    async fn serde_schema_decodes_matching_input() {
        let schema = SerdeSchema::<SignUp>::new();
        let parsed = schema
            .parse(json!({"name": "Ada", "email": "ada@example.com", "age": 36}))
            .await
            .unwrap();
        assert_eq!(parsed.name, "Ada");
    }

    #[tokio::test]
    async fn serde_schema_rejects_mismatched_shape() {
        let schema = SerdeSchema::<SignUp>::new();
        let violation = schema.parse(json!({"name": 7})).await.unwrap_err();
        assert!(violation.message().starts_with("invalid input:"));
        assert!(violation.fields().is_empty());
    }

    #[tokio::test]
    async fn validated_schema_runs_rules_after_decoding() {
        let schema = ValidatedSchema::<SignUp>::new();
        let violation = schema
            .parse(json!({"name": "A", "email": "not-an-email", "age": 200}))
            .await
            .unwrap_err();
        let codes: Vec<&str> = violation.fields().iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, ["min_length", "pattern", "range"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn range_rule_accepts_exactly_the_interval(value in -200i64..200) {
                let result = RuleSet::new().range("n", value, -10, 10).finish();
                prop_assert_eq!(result.is_ok(), (-10..=10).contains(&value));
            }

            #[test]
            fn required_rejects_only_blank_values(value in "[ a-z]{0,12}") {
                let result = RuleSet::new().required("field", &value).finish();
                prop_assert_eq!(result.is_ok(), !value.trim().is_empty());
            }
        }
    }
}

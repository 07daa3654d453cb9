//! Field-level validation errors for form inputs.
//!
//! Inputs derive `validator::Validate`; the resulting errors are flattened into
//! [`FieldErrors`] so a form can show one message list per field.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Key used by `validator` for struct-level (schema) errors.
pub const FORM_LEVEL: &str = "__all__";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        collect(&errors, None, &mut out);
        out
    }
}

/// Nested structs keep their leaf names (they are flattened into the form);
/// list entries are keyed `lines[2].quantity`.
fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.insert(name.clone(), describe(error));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, prefix, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect(inner, Some(&format!("{name}[{index}]")), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    }
}

/// Build a `ValidationError` with a human-readable message.
pub fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// `validator` custom check: amount must be zero or more.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("non_negative", "must not be negative"));
    }
    Ok(())
}

/// `validator` custom check: amount must be strictly positive.
pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(invalid("positive", "must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "code is required"))]
        code: String,
        #[validate(custom(function = "positive"))]
        price: Decimal,
    }

    #[test]
    fn collects_messages_per_field() {
        let form = Form {
            code: String::new(),
            price: dec!(0),
        };
        let errors: FieldErrors = form.validate().unwrap_err().into();
        assert_eq!(errors.get("code"), Some(&["code is required".to_string()][..]));
        assert_eq!(
            errors.get("price"),
            Some(&["must be greater than zero".to_string()][..])
        );
    }

    #[test]
    fn valid_form_passes() {
        let form = Form {
            code: "A1".into(),
            price: dec!(3.50),
        };
        assert!(form.validate().is_ok());
    }

    #[derive(Validate, Serialize)]
    struct Line {
        #[validate(custom(function = "positive"))]
        quantity: Decimal,
    }

    #[derive(Validate)]
    struct Order {
        #[validate(length(min = 1, message = "add at least one line"), nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn list_errors_are_keyed_by_index() {
        let order = Order {
            lines: vec![Line { quantity: dec!(1) }, Line { quantity: dec!(0) }],
        };
        let errors: FieldErrors = order.validate().unwrap_err().into();
        assert!(errors.contains("lines[1].quantity"));
        assert!(!errors.contains("lines[0].quantity"));
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(non_negative(&dec!(0)).is_ok());
        assert!(non_negative(&dec!(-0.01)).is_err());
    }
}

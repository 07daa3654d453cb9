use serde::{Deserialize, Serialize};
use validator::Validate;

/// Contact fields shared by customers and suppliers.
///
/// Stored as top-level columns; flattened into the row on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactInfo {
    #[serde(default)]
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 30, message = "phone is too long"))]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(max = 12, message = "postal code is too long"))]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl ContactInfo {
    /// Blank optional strings become `None` so the backend stores NULL.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            email: clean(self.email),
            phone: clean(self.phone),
            address: clean(self.address),
            city: clean(self.city),
            postal_code: clean(self.postal_code),
            country: clean(self.country),
        }
    }
}

//! Shipping address types.

use serde::{Deserialize, Serialize};

use bazaar_core::{AddressId, UserId};

use super::{ValidationError, optional_text, required_text};

/// The postal fields of an address.
///
/// Also embedded verbatim into orders as the shipping snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub street: String,
    pub city: String,
    pub state: String,
    pub phone_number: String,
    pub postal_code: String,
    pub country: String,
    /// Free-form label such as "Home" or "Work".
    #[serde(rename = "type")]
    pub kind: String,
}

impl AddressFields {
    /// Trim every field, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Blank` for the first empty field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            street: required_text("street", &self.street)?,
            city: required_text("city", &self.city)?,
            state: required_text("state", &self.state)?,
            phone_number: required_text("phoneNumber", &self.phone_number)?,
            postal_code: required_text("postalCode", &self.postal_code)?,
            country: required_text("country", &self.country)?,
            kind: required_text("type", &self.kind)?,
        })
    }
}

/// A saved address belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    #[sqlx(rename = "user_id")]
    pub user: UserId,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: AddressFields,
}

/// Request body for a partial address update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpdate {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone_number: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl AddressUpdate {
    /// Trim present fields, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Blank` for the first empty field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            street: optional_text("street", self.street.as_deref())?,
            city: optional_text("city", self.city.as_deref())?,
            state: optional_text("state", self.state.as_deref())?,
            phone_number: optional_text("phoneNumber", self.phone_number.as_deref())?,
            postal_code: optional_text("postalCode", self.postal_code.as_deref())?,
            country: optional_text("country", self.country.as_deref())?,
            kind: optional_text("type", self.kind.as_deref())?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields() -> AddressFields {
        AddressFields {
            street: "1 Main St".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            phone_number: "5550100".to_string(),
            postal_code: "411001".to_string(),
            country: "India".to_string(),
            kind: "Home".to_string(),
        }
    }

    #[test]
    fn test_address_json_is_flat() {
        let address = Address {
            id: AddressId::new(8),
            user: UserId::new(2),
            fields: fields(),
        };
        let json = serde_json::to_value(&address).unwrap();

        assert_eq!(json["_id"], 8);
        assert_eq!(json["user"], 2);
        assert_eq!(json["phoneNumber"], "5550100");
        assert_eq!(json["type"], "Home");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_validate_rejects_blank_field() {
        let mut f = fields();
        f.city = "  ".to_string();
        assert_eq!(f.validate().unwrap_err(), ValidationError::Blank("city"));
    }

    #[test]
    fn test_update_accepts_partial_body() {
        let update: AddressUpdate = serde_json::from_str(r#"{"type": " Work "}"#).unwrap();
        let update = update.validate().unwrap();
        assert_eq!(update.kind.as_deref(), Some("Work"));
        assert!(update.street.is_none());
    }
}

use crate::models::{Address, AddressPatch, AddressQuery, AddressType, State, DEFAULT_COUNTRY};
use crate::validation;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn street_address_rule(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_street_address(value) {
        Ok(())
    } else {
        Err(rule_error(
            "street_address",
            "streetAddress must be non-empty and may only contain letters, digits, spaces and - ' . , #",
        ))
    }
}

fn suburb_rule(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_suburb(value) {
        Ok(())
    } else {
        Err(rule_error(
            "suburb",
            "suburb must be non-empty and may only contain letters, digits, spaces and - ' .",
        ))
    }
}

fn state_rule(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_state(value) {
        Ok(())
    } else {
        Err(rule_error(
            "state",
            "state must be one of NSW, VIC, QLD, SA, WA, TAS, NT, ACT",
        ))
    }
}

fn postcode_rule(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_postcode(value) {
        Ok(())
    } else {
        Err(rule_error("postcode", "postcode must be exactly 4 digits"))
    }
}

fn country_rule(value: &str) -> Result<(), ValidationError> {
    if validation::is_valid_country(value) {
        Ok(())
    } else {
        Err(rule_error(
            "country",
            "country must be non-empty and may only contain letters, digits, spaces and - '",
        ))
    }
}

fn address_type_rule(value: &str) -> Result<(), ValidationError> {
    if AddressType::parse(value).is_some() {
        Ok(())
    } else {
        Err(rule_error(
            "address_type",
            "addressType must be one of home, work, other",
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    #[validate(custom(function = street_address_rule))]
    pub street_address: String,
    #[validate(custom(function = suburb_rule))]
    pub suburb: String,
    #[validate(custom(function = state_rule))]
    pub state: String,
    #[validate(custom(function = postcode_rule))]
    pub postcode: String,
    #[validate(custom(function = country_rule))]
    pub country: Option<String>,
    #[validate(custom(function = address_type_rule))]
    pub address_type: Option<String>,
}

impl CreateAddressRequest {
    /// Build the record to persist: trims string fields, canonicalizes the
    /// enumerated ones and fills in the default country.
    pub fn into_record(self, user_id: &str) -> Result<Address, AppError> {
        let state = State::parse(&self.state)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid state")))?;
        let address_type = self
            .address_type
            .as_deref()
            .map(|value| {
                AddressType::parse(value)
                    .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid addressType")))
            })
            .transpose()?;
        let country = self.country.map_or_else(
            || DEFAULT_COUNTRY.to_string(),
            |value| value.trim().to_string(),
        );

        Ok(Address::new(
            user_id.to_string(),
            self.street_address.trim().to_string(),
            self.suburb.trim().to_string(),
            state,
            self.postcode.trim().to_string(),
            country,
            address_type,
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    #[validate(custom(function = street_address_rule))]
    pub street_address: Option<String>,
    #[validate(custom(function = suburb_rule))]
    pub suburb: Option<String>,
    #[validate(custom(function = state_rule))]
    pub state: Option<String>,
    #[validate(custom(function = postcode_rule))]
    pub postcode: Option<String>,
    #[validate(custom(function = country_rule))]
    pub country: Option<String>,
    #[validate(custom(function = address_type_rule))]
    pub address_type: Option<String>,
}

impl UpdateAddressRequest {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.street_address.is_none()
            && self.suburb.is_none()
            && self.state.is_none()
            && self.postcode.is_none()
            && self.country.is_none()
            && self.address_type.is_none()
    }

    pub fn into_patch(self) -> Result<AddressPatch, AppError> {
        let state = self
            .state
            .as_deref()
            .map(|value| {
                State::parse(value)
                    .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid state")))
            })
            .transpose()?;
        let address_type = self
            .address_type
            .as_deref()
            .map(|value| {
                AddressType::parse(value)
                    .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid addressType")))
            })
            .transpose()?;

        Ok(AddressPatch {
            street_address: self.street_address.map(|value| value.trim().to_string()),
            suburb: self.suburb.map(|value| value.trim().to_string()),
            state,
            postcode: self.postcode.map(|value| value.trim().to_string()),
            country: self.country.map(|value| value.trim().to_string()),
            address_type,
            updated_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListAddressParams {
    pub suburb: Option<String>,
    pub postcode: Option<String>,
}

impl ListAddressParams {
    /// Filters go through the same predicates as writes before touching the
    /// store.
    pub fn into_query(self) -> Result<AddressQuery, AppError> {
        if let Some(suburb) = &self.suburb {
            if !validation::is_valid_suburb(suburb) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invalid suburb filter"
                )));
            }
        }
        if let Some(postcode) = &self.postcode {
            if !validation::is_valid_postcode(postcode) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invalid postcode filter"
                )));
            }
        }

        Ok(AddressQuery {
            suburb: self.suburb.map(|value| value.trim().to_string()),
            postcode: self.postcode,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub address_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub updated_at: String,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        fn present(value: String) -> Option<String> {
            if value.is_empty() { None } else { Some(value) }
        }

        Self {
            address_id: address.address_id,
            user_id: address.user_id,
            street_address: present(address.street_address),
            suburb: present(address.suburb),
            state: address.state.map(|state| state.to_string()),
            postcode: present(address.postcode),
            country: present(address.country),
            address_type: address.address_type.map(|t| t.to_string()),
            created_at: address.created_at.map(|t| t.to_rfc3339()),
            updated_at: address.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCreatedResponse {
    pub message: String,
    pub address_id: String,
    pub address: AddressResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressListResponse {
    pub message: String,
    pub addresses: Vec<AddressResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpdatedResponse {
    pub message: String,
    pub address: AddressResponse,
    pub address_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateAddressRequest {
        CreateAddressRequest {
            street_address: "123 Main Street".to_string(),
            suburb: "Sydney".to_string(),
            state: "NSW".to_string(),
            postcode: "2000".to_string(),
            country: None,
            address_type: None,
        }
    }

    #[test]
    fn create_request_validates() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn create_request_rejects_bad_postcode() {
        for postcode in ["200", "20000", "20ab"] {
            let mut request = create_request();
            request.postcode = postcode.to_string();
            assert!(request.validate().is_err(), "postcode {postcode} accepted");
        }
        for postcode in ["0000", "9999"] {
            let mut request = create_request();
            request.postcode = postcode.to_string();
            assert!(request.validate().is_ok(), "postcode {postcode} rejected");
        }
    }

    #[test]
    fn create_request_rejects_structural_characters() {
        let mut request = create_request();
        request.street_address = "123 Main'; DROP TABLE--".to_string();
        assert!(request.validate().is_err());

        let mut request = create_request();
        request.suburb = "<Sydney>".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn into_record_defaults_country_and_canonicalizes() {
        let mut request = create_request();
        request.state = "nsw".to_string();
        request.street_address = "  123 Main Street  ".to_string();
        request.address_type = Some("HOME".to_string());

        let record = request.into_record("user_test_123").unwrap();
        assert_eq!(record.user_id, "user_test_123");
        assert_eq!(record.country, "Australia");
        assert_eq!(record.state, Some(State::NSW));
        assert_eq!(record.street_address, "123 Main Street");
        assert_eq!(record.address_type, Some(AddressType::Home));
    }

    #[test]
    fn update_request_knows_when_it_is_empty() {
        let empty = UpdateAddressRequest {
            street_address: None,
            suburb: None,
            state: None,
            postcode: None,
            country: None,
            address_type: None,
        };
        assert!(empty.is_empty());

        let patch = UpdateAddressRequest {
            suburb: Some("Newtown".to_string()),
            ..empty
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn update_request_validates_present_fields_only() {
        let request = UpdateAddressRequest {
            street_address: None,
            suburb: None,
            state: None,
            postcode: Some("12".to_string()),
            country: None,
            address_type: None,
        };
        assert!(request.validate().is_err());

        let request = UpdateAddressRequest {
            street_address: None,
            suburb: Some("Newtown".to_string()),
            state: None,
            postcode: None,
            country: None,
            address_type: None,
        };
        assert!(request.validate().is_ok());

        let patch = request.into_patch().unwrap();
        assert_eq!(patch.suburb.as_deref(), Some("Newtown"));
        assert!(patch.street_address.is_none());
    }

    #[test]
    fn list_params_reject_invalid_filters() {
        let params = ListAddressParams {
            suburb: Some("Syd;ney".to_string()),
            postcode: None,
        };
        assert!(params.into_query().is_err());

        let params = ListAddressParams {
            suburb: None,
            postcode: Some("200".to_string()),
        };
        assert!(params.into_query().is_err());

        let params = ListAddressParams {
            suburb: Some("Sydney".to_string()),
            postcode: Some("2000".to_string()),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.suburb.as_deref(), Some("Sydney"));
        assert_eq!(query.postcode.as_deref(), Some("2000"));
    }

    #[test]
    fn response_omits_absent_attributes() {
        let address = Address {
            address_id: "c56a4180-65aa-42ec-a945-5fd21dec0538".to_string(),
            user_id: "user_test_123".to_string(),
            street_address: String::new(),
            suburb: "Glebe".to_string(),
            state: None,
            postcode: String::new(),
            country: String::new(),
            address_type: None,
            created_at: None,
            updated_at: Utc::now(),
        };

        let response = AddressResponse::from(address);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["suburb"], "Glebe");
        assert!(json.get("streetAddress").is_none());
        assert!(json.get("state").is_none());
        assert!(json.get("createdAt").is_none());
        assert!(json.get("updatedAt").is_some());
    }
}

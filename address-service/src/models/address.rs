use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Country stored when the client omits one.
pub const DEFAULT_COUNTRY: &str = "Australia";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum State {
    NSW,
    VIC,
    QLD,
    SA,
    WA,
    TAS,
    NT,
    ACT,
}

impl State {
    /// Case-insensitive parse of a region code; input is trimmed first.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NSW" => Some(State::NSW),
            "VIC" => Some(State::VIC),
            "QLD" => Some(State::QLD),
            "SA" => Some(State::SA),
            "WA" => Some(State::WA),
            "TAS" => Some(State::TAS),
            "NT" => Some(State::NT),
            "ACT" => Some(State::ACT),
            _ => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            State::NSW => write!(f, "NSW"),
            State::VIC => write!(f, "VIC"),
            State::QLD => write!(f, "QLD"),
            State::SA => write!(f, "SA"),
            State::WA => write!(f, "WA"),
            State::TAS => write!(f, "TAS"),
            State::NT => write!(f, "NT"),
            State::ACT => write!(f, "ACT"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Home,
    Work,
    Other,
}

impl AddressType {
    /// Case-insensitive parse; input is trimmed first.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "home" => Some(AddressType::Home),
            "work" => Some(AddressType::Work),
            "other" => Some(AddressType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressType::Home => write!(f, "home"),
            AddressType::Work => write!(f, "work"),
            AddressType::Other => write!(f, "other"),
        }
    }
}

/// A stored address.
///
/// Records materialized by a partial update against an unknown key carry
/// only the key pair, the patched attributes and `updated_at`; every other
/// attribute therefore tolerates absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "_id")]
    pub address_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suburb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postcode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(
        default,
        with = "optional_chrono_datetime_as_bson_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

pub mod optional_chrono_datetime_as_bson_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match val {
            Some(date) => {
                mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime::serialize(
                    date, serializer,
                )
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(
            #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
            DateTime<Utc>,
        );

        let wrapper = Option::<Wrapper>::deserialize(deserializer)?;
        Ok(wrapper.map(|w| w.0))
    }
}

impl Address {
    pub fn new(
        user_id: String,
        street_address: String,
        suburb: String,
        state: State,
        postcode: String,
        country: String,
        address_type: Option<AddressType>,
    ) -> Self {
        let now = Utc::now();
        Self {
            address_id: Uuid::new_v4().to_string(),
            user_id,
            street_address,
            suburb,
            state: Some(state),
            postcode,
            country,
            address_type,
            created_at: Some(now),
            updated_at: now,
        }
    }

    /// Whether two records describe the same physical address.
    ///
    /// The six comparable fields are matched trimmed and case-insensitively;
    /// a missing `address_type` matches only a missing `address_type`.
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        fn fields_match(a: &str, b: &str) -> bool {
            a.trim().eq_ignore_ascii_case(b.trim())
        }

        fields_match(&self.street_address, &other.street_address)
            && fields_match(&self.suburb, &other.suburb)
            && self.state == other.state
            && fields_match(&self.postcode, &other.postcode)
            && fields_match(&self.country, &other.country)
            && self.address_type == other.address_type
    }
}

/// Optional filters for listing a user's addresses. Values are matched
/// exactly, the way the store's secondary orderings match them.
#[derive(Debug, Clone, Default)]
pub struct AddressQuery {
    pub suburb: Option<String>,
    pub postcode: Option<String>,
}

/// Closed set of field changes for a partial update. Only present slots are
/// written; `updated_at` is always written.
#[derive(Debug, Clone)]
pub struct AddressPatch {
    pub street_address: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<State>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub address_type: Option<AddressType>,
    pub updated_at: DateTime<Utc>,
}

impl AddressPatch {
    pub fn apply_to(&self, address: &mut Address) {
        if let Some(value) = &self.street_address {
            address.street_address = value.clone();
        }
        if let Some(value) = &self.suburb {
            address.suburb = value.clone();
        }
        if let Some(state) = self.state {
            address.state = Some(state);
        }
        if let Some(value) = &self.postcode {
            address.postcode = value.clone();
        }
        if let Some(value) = &self.country {
            address.country = value.clone();
        }
        if let Some(address_type) = self.address_type {
            address.address_type = Some(address_type);
        }
        address.updated_at = self.updated_at;
    }
}

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::{Schema, Validator, Violation};

const CUSTOMER_FIELDS: &[&str] = &[
    "id",
    "name",
    "email",
    "phone",
    "address",
    "tags",
    "registrationDate",
    "lastLoginDate",
];

const ADDRESS_FIELDS: &[&str] = &["street", "city", "state", "zipCode", "country"];

/// A customer record pushed by an external system. Optional fields keep the
/// difference between absent and `null` so the record is echoed exactly as it
/// was received, unknown fields included.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIngestionPayload {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_date: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn parse_address(mut v: Validator<'_>) -> (Address, Validator<'_>) {
    let address = Address {
        street: v.nullable_string("street"),
        city: v.nullable_string("city"),
        state: v.nullable_string("state"),
        zip_code: v.nullable_string("zipCode"),
        country: v.nullable_string("country"),
        extra: v.extras(ADDRESS_FIELDS),
    };

    (address, v)
}

fn nullable_datetime(v: &mut Validator<'_>, key: &str) -> Option<Option<String>> {
    let value = v.nullable_string(key);
    v.datetime(key, value.as_ref().and_then(Option::as_deref));
    value
}

impl Schema for CustomerIngestionPayload {
    fn parse(value: &Value) -> Result<CustomerIngestionPayload, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let id = v.string("id");
        let name = v.string("name");
        let email = v.string("email");
        v.email("email", email.as_deref(), "Invalid email");
        let phone = v.nullable_string("phone");

        let address = match v.nullable_object("address") {
            Some(Some(av)) => {
                let (address, av) = parse_address(av);
                v.absorb(av);
                Some(Some(address))
            }
            Some(None) => Some(None),
            None => None,
        };

        let tags = v.nullable_string_list("tags");
        let registration_date = nullable_datetime(&mut v, "registrationDate");
        let last_login_date = nullable_datetime(&mut v, "lastLoginDate");
        let extra = v.extras(CUSTOMER_FIELDS);

        v.finish(CustomerIngestionPayload {
            id: id.unwrap_or_default(),
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone,
            address,
            tags,
            registration_date,
            last_login_date,
            extra,
        })
    }
}

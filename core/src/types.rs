//! Domain types for property records.
//!
//! # Design
//! The server and the client core share these types, so the JSON shape is
//! defined exactly once. Field names are camelCase on the wire. Optional
//! fields are omitted when absent rather than serialized as `null`.
//!
//! `rentalCost` and `directCost` accept free-form input (a number, a string,
//! or an arbitrary JSON structure). They are modeled as the [`Cost`] union,
//! untagged on the wire so existing payloads keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cost value as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cost {
    /// A plain numeric amount.
    Amount(f64),
    /// A free-text amount, e.g. `"1,200 / month"`.
    Text(String),
    /// Anything else: breakdowns, nested objects, arrays.
    Structured(serde_json::Value),
}

/// A stored property record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_cost: Option<Cost>,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, with = "contract_date", skip_serializing_if = "Option::is_none")]
    pub contract_start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "contract_date", skip_serializing_if = "Option::is_none")]
    pub contract_end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_cost: Option<Cost>,
    #[serde(deserialize_with = "coerce::string")]
    pub group: String,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number", skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<f64>,
}

/// Request payload for creating a property: every field except `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFields {
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_cost: Option<Cost>,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, with = "contract_date", skip_serializing_if = "Option::is_none")]
    pub contract_start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "contract_date", skip_serializing_if = "Option::is_none")]
    pub contract_end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_cost: Option<Cost>,
    #[serde(deserialize_with = "coerce::string")]
    pub group: String,
    #[serde(default, deserialize_with = "coerce::optional_string", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number", skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<f64>,
}

impl PropertyFields {
    /// Fields with only the required `group` set.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            address: None,
            rental_cost: None,
            property_name: None,
            tag: None,
            contract_start_date: None,
            contract_end_date: None,
            direct_cost: None,
            group: group.into(),
            city: None,
            fixed_cost: None,
        }
    }
}

impl Property {
    /// Attach an identifier to a set of fields.
    pub fn from_fields(id: impl Into<String>, fields: PropertyFields) -> Self {
        Self {
            id: id.into(),
            address: fields.address,
            rental_cost: fields.rental_cost,
            property_name: fields.property_name,
            tag: fields.tag,
            contract_start_date: fields.contract_start_date,
            contract_end_date: fields.contract_end_date,
            direct_cost: fields.direct_cost,
            group: fields.group,
            city: fields.city,
            fixed_cost: fields.fixed_cost,
        }
    }

    /// The text-indexed fields, in index order.
    pub fn searchable_text(&self) -> impl Iterator<Item = &str> {
        [&self.address, &self.property_name, &self.city, &self.tag]
            .into_iter()
            .filter_map(|field| field.as_deref())
    }
}

/// Request payload for `PUT /properties/{id}`. Only `group` is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroup {
    #[serde(deserialize_with = "coerce::string")]
    pub group: String,
}

/// `{"message": ...}` body used for confirmations and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Contract dates accept RFC 3339 timestamps or bare `YYYY-MM-DD` dates
/// (interpreted as midnight UTC) and are always emitted as RFC 3339.
pub mod contract_date {
    use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => {
                serializer.serialize_some(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).map_err(D::Error::custom)).transpose()
    }

    pub fn parse(input: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(date) = DateTime::parse_from_rfc3339(input) {
            return Ok(date.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .ok_or_else(|| format!("invalid date `{input}`, expected RFC 3339 or YYYY-MM-DD"))
    }
}

/// Scalar coercion for incoming fields: numbers and booleans become text
/// where text is expected, and numeric text becomes a number where a number
/// is expected. Empty text for a number means "absent".
pub mod coerce {
    use serde::{de::Error as _, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    impl Scalar {
        fn into_text(self) -> String {
            match self {
                Scalar::Text(text) => text,
                Scalar::Int(n) => n.to_string(),
                Scalar::Float(n) => n.to_string(),
                Scalar::Bool(b) => b.to_string(),
            }
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Scalar::deserialize(deserializer).map(Scalar::into_text)
    }

    pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
    }

    pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::Int(n)) => Ok(Some(n as f64)),
            Some(Scalar::Float(n)) => Ok(Some(n)),
            Some(Scalar::Bool(b)) => Ok(Some(if b { 1.0 } else { 0.0 })),
            Some(Scalar::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Scalar::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("cannot cast `{text}` to a number"))),
        }
    }
}

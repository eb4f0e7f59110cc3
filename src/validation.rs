//! Turns untyped procedure payloads into typed, normalized requests.
//!
//! Decoding (shape and type coercion) happens through serde; field bounds are
//! declared with `validator` rules on the request structs in [`crate::dto`].

use std::borrow::Cow;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned, de::Error as _};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, AppResult};

/// A value/display-label pair coming from a select input. Only `value` is used
/// by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectOption<T> {
    pub value: T,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl<T> SelectOption<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            extra: None,
        }
    }
}

/// Reference to an existing row by id.
impl Validate for SelectOption<i32> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.value < 1 {
            errors.add("value", rule_error("range", "must be a positive id"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Deserializes `input` into `T`. Missing fields and failed coercions are
/// reported as validation errors.
pub fn decode<T: DeserializeOwned>(input: Value) -> AppResult<T> {
    serde_json::from_value(input).map_err(|err| AppError::Validation(err.to_string()))
}

/// Checks the declared rules on an already decoded payload.
pub fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|errors| AppError::Validation(describe(&errors)))
}

/// Decodes and validates in one step.
pub fn parse_input<T: DeserializeOwned + Validate>(input: Value) -> AppResult<T> {
    let payload = decode(input)?;
    validate(&payload)?;
    Ok(payload)
}

/// Flattens nested validator output into `path: message` pairs joined by `; `,
/// sorted by path.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect(errors, "", &mut lines);
    lines.sort();
    lines.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    out.push(format!("{path}: {}", message_for(err)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn message_for(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    let param = |name: &str| err.params.get(name).map(|v| v.to_string());
    match err.code.as_ref() {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {min} and {max} characters"),
            (Some(min), None) => format!("must be at least {min} long"),
            (None, Some(max)) => format!("must be at most {max} long"),
            (None, None) => "has an invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {min} and {max}"),
            (Some(min), None) => format!("must be at least {min}"),
            (None, Some(max)) => format!("must be at most {max}"),
            (None, None) => "is out of range".to_string(),
        },
        code => format!("failed {code}"),
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects dates after today (local calendar).
pub fn not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Local::now().date_naive() {
        return Err(rule_error("future_date", "must be no later than today"));
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn coerce_number<E: serde::de::Error>(raw: NumberOrText) -> Result<f64, E> {
    match raw {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| E::custom(format!("invalid type: expected a number, got \"{s}\""))),
    }
}

/// Accepts `12.5` or `"12.5"`.
pub fn de_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrText::deserialize(deserializer)
        .map_err(|_| D::Error::custom("invalid type: expected a number or numeric string"))?;
    coerce_number(raw)
}

pub fn de_opt_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)
        .map_err(|_| D::Error::custom("invalid type: expected a number or numeric string"))?;
    raw.map(coerce_number).transpose()
}

/// Parses `yyyy-MM-dd`, or an RFC 3339 timestamp (a serialized `Date`).
/// Timestamps are instants; their UTC calendar day is the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

pub fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)
        .map_err(|_| D::Error::custom("invalid type: expected a date string"))?;
    parse_date(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid date \"{raw}\", expected yyyy-MM-dd")))
}

pub fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)
        .map_err(|_| D::Error::custom("invalid type: expected a date string"))?;
    raw.map(|raw| {
        parse_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid date \"{raw}\", expected yyyy-MM-dd")))
    })
    .transpose()
}

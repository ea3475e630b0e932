//! Domain payloads exchanged with the REST API
//!
//! The API is inconsistent about field names: older endpoints answer with
//! Portuguese names (`nome`, `quantidade`, `preco`), newer ones with English
//! names, and ids arrive either as numbers or as strings. Each payload shape
//! gets one typed struct here plus a table of [`FieldChain`]s listing the
//! names each field may arrive under. [`canonicalize`] folds every chain onto
//! its canonical name before deserializing, so the rest of the client only
//! ever sees the canonical fields.

pub mod cart;
pub mod ingredient;
pub mod order;
pub mod promotion;

pub use cart::{Cart, CartExtra, CartItem};
pub use ingredient::Ingredient;
pub use order::{Order, OrderStatus};
pub use promotion::Promotion;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DomainError;

/// A canonical field name and the names it may arrive under, in the order
/// they are tried
pub(crate) type FieldChain = (&'static str, &'static [&'static str]);

/// Fold every chained field of an API object onto its canonical name
///
/// The first name holding a non-null value wins and every other name of the
/// chain is dropped, so a payload carrying both `nome` and `nome_produto`
/// still deserializes. A chain whose names are all `null` keeps a single
/// `null` under the canonical name. Keys outside every chain pass through.
pub(crate) fn canonicalize(value: &Value, chains: &[FieldChain]) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    let mut out = map.clone();
    for (field, names) in chains {
        let picked = names
            .iter()
            .find_map(|name| map.get(*name).filter(|v| !v.is_null()))
            .or_else(|| names.iter().find_map(|name| map.get(*name)))
            .cloned();
        for name in names.iter() {
            out.remove(*name);
        }
        if let Some(v) = picked {
            out.insert((*field).to_string(), v);
        }
    }
    Value::Object(out)
}

/// Canonicalize each element of the array under `field`, if there is one
pub(crate) fn canonicalize_nested(value: &mut Value, field: &str, chains: &[FieldChain]) {
    if let Some(Value::Array(items)) = value.get_mut(field) {
        for item in items.iter_mut() {
            *item = canonicalize(item, chains);
        }
    }
}

/// Deserialize a typed payload from a loosely shaped JSON value
pub(crate) fn from_value<T: DeserializeOwned>(
    payload: &'static str,
    value: &Value,
) -> Result<T, DomainError> {
    T::deserialize(value).map_err(|e| {
        let reason = e.to_string();
        match reason
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            Some(field) => DomainError::MissingField {
                payload,
                field: canonical_field(field),
            },
            None => DomainError::Malformed { payload, reason },
        }
    })
}

/// Map a serde field name back onto a `'static` canonical name for errors
fn canonical_field(field: &str) -> &'static str {
    match field {
        "id" => "id",
        "name" => "name",
        "title" => "title",
        "quantity" => "quantity",
        "unit_price" => "unit_price",
        "status" => "status",
        "discount_percent" => "discount_percent",
        "product_id" => "product_id",
        _ => "unknown",
    }
}

/// Accept an id given as a JSON string or number
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Optional variant of [`flexible_id`]; `null` maps to `None`
pub(crate) fn flexible_id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Accept a number given as JSON number or numeric string ("12.50", "12,50")
pub(crate) fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        Value::String(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {:?}", s))),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "expected number, got {}",
            other
        ))),
    }
}

/// Accept a count given as JSON number or numeric string
pub(crate) fn flexible_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = flexible_f64(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            value
        )));
    }
    Ok(value as u32)
}

/// Accept a flag given as bool, 0/1, or "true"/"false"/"sim"/"nao"
pub(crate) fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "sim" | "s" | "yes" => Ok(true),
            "false" | "0" | "nao" | "não" | "n" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("not a flag: {:?}", other))),
        },
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected flag, got {}",
            other
        ))),
    }
}

pub(crate) fn default_true() -> bool {
    true
}

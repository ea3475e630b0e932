//! Promotion payloads for the promotions admin panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    canonicalize, default_true, flexible_bool, flexible_f64, flexible_id, flexible_id_opt,
    from_value, FieldChain,
};
use crate::error::DomainError;

const FIELDS: &[FieldChain] = &[
    ("id", &["id_promocao", "id"]),
    ("product_id", &["id_produto", "product_id"]),
    ("title", &["titulo", "nome", "name", "title"]),
    ("discount_percent", &["desconto", "percentual_desconto", "discount_percent"]),
    ("starts_at", &["inicio", "data_inicio", "starts_at"]),
    ("ends_at", &["fim", "data_fim", "ends_at"]),
    ("active", &["ativo", "ativa", "active"]),
];

/// A product promotion
///
/// Discount math happens server-side; the client shows the percentage and
/// the validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion id
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    /// Product the promotion applies to
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub product_id: Option<String>,
    /// Display title
    pub title: String,
    /// Discount in percent (0-100)
    #[serde(deserialize_with = "flexible_f64")]
    pub discount_percent: f64,
    /// Start of the validity window
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the validity window
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Whether the promotion is switched on
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub active: bool,
}

impl Promotion {
    /// Normalize an API promotion
    pub fn from_api(value: &Value) -> Result<Self, DomainError> {
        let promotion: Self = from_value("promotion", &canonicalize(value, FIELDS))?;
        promotion.validate()?;
        Ok(promotion)
    }

    /// Reject promotions the panel cannot display
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::invalid("title", "must not be empty"));
        }
        if !(0.0..=100.0).contains(&self.discount_percent) {
            return Err(DomainError::invalid(
                "discount_percent",
                format!("must be between 0 and 100, got {}", self.discount_percent),
            ));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end < start {
                return Err(DomainError::invalid("ends_at", "ends before it starts"));
            }
        }
        Ok(())
    }

    /// Whether the promotion is switched on and inside its window at `now`
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Promotion {
        Promotion::from_api(&json!({
            "id_promocao": 9,
            "id_produto": 2,
            "titulo": "Terça do burger",
            "desconto": "20",
            "inicio": "2026-10-01T00:00:00Z",
            "fim": "2026-10-31T23:59:59Z"
        }))
        .expect("valid promotion")
    }

    #[test]
    fn test_promotion_from_portuguese_payload() {
        let promotion = sample();
        assert_eq!(promotion.id, "9");
        assert_eq!(promotion.product_id.as_deref(), Some("2"));
        assert_eq!(promotion.discount_percent, 20.0);
        assert!(promotion.active);
    }

    #[test]
    fn test_promotion_window() {
        let promotion = sample();
        let inside = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();

        assert!(promotion.is_running(inside));
        assert!(!promotion.is_running(after));

        let paused = Promotion {
            active: false,
            ..promotion
        };
        assert!(!paused.is_running(inside));
    }

    #[test]
    fn test_promotion_rejects_bad_discount() {
        let err = Promotion::from_api(&json!({
            "id": 1, "title": "Too good", "discount_percent": 150
        }))
        .expect_err("discount over 100");
        assert!(matches!(
            err,
            DomainError::InvalidValue {
                field: "discount_percent",
                ..
            }
        ));
    }

    #[test]
    fn test_promotion_rejects_inverted_window() {
        let err = Promotion::from_api(&json!({
            "id": 1,
            "title": "Backwards",
            "discount_percent": 5,
            "starts_at": "2026-10-10T00:00:00Z",
            "ends_at": "2026-10-01T00:00:00Z"
        }))
        .expect_err("inverted window");
        assert_eq!(err, DomainError::invalid("ends_at", "ends before it starts"));
    }

    #[test]
    fn test_promotion_with_title_and_name() {
        let promotion = Promotion::from_api(&json!({
            "id_promocao": 3,
            "titulo": "Combo da casa",
            "nome": "combo-casa",
            "desconto": 10,
            "percentual_desconto": 15,
            "ativo": null,
            "ativa": true
        }))
        .expect("overlapping names");

        assert_eq!(promotion.title, "Combo da casa");
        assert_eq!(promotion.discount_percent, 10.0);
        assert!(promotion.active);
    }
}

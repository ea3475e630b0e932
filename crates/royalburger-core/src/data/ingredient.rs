//! Ingredient (stock item) payloads for the inventory admin panel

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    canonicalize, default_true, flexible_bool, flexible_f64, flexible_id, from_value, FieldChain,
};
use crate::error::DomainError;

const FIELDS: &[FieldChain] = &[
    ("id", &["id_ingrediente", "id"]),
    ("name", &["nome", "name"]),
    ("unit", &["unidade", "unidade_medida", "unit"]),
    ("current_stock", &["estoque_atual", "quantidade_estoque", "current_stock"]),
    ("min_stock", &["estoque_minimo", "min_stock"]),
    ("price", &["preco_custo", "preco", "cost", "price"]),
    ("active", &["ativo", "active"]),
];

/// A stock ingredient
///
/// Stock thresholds are evaluated by the API; the client only shows the
/// numbers it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient id
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Stock unit (kg, un, l, ...)
    #[serde(default)]
    pub unit: String,
    /// Units currently in stock
    #[serde(default, deserialize_with = "flexible_f64")]
    pub current_stock: f64,
    /// Stock level the API flags as low
    #[serde(default, deserialize_with = "flexible_f64")]
    pub min_stock: f64,
    /// Cost per stock unit
    #[serde(default, deserialize_with = "flexible_f64")]
    pub price: f64,
    /// Whether the ingredient can be used in products
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub active: bool,
}

impl Ingredient {
    /// Normalize an API ingredient
    pub fn from_api(value: &Value) -> Result<Self, DomainError> {
        let ingredient: Self = from_value("ingredient", &canonicalize(value, FIELDS))?;
        ingredient.validate()?;
        Ok(ingredient)
    }

    /// Normalize an API ingredient list, skipping entries that fail
    ///
    /// Admin lists stay usable when one row is broken; the failures are
    /// returned alongside so the panel can report them.
    pub fn list_from_api(value: &Value) -> (Vec<Self>, Vec<DomainError>) {
        let Some(rows) = value.as_array() else {
            return (
                Vec::new(),
                vec![DomainError::Malformed {
                    payload: "ingredient list",
                    reason: "expected an array".to_string(),
                }],
            );
        };

        let mut ingredients = Vec::with_capacity(rows.len());
        let mut failures = Vec::new();
        for row in rows {
            match Self::from_api(row) {
                Ok(ingredient) => ingredients.push(ingredient),
                Err(e) => {
                    tracing::warn!("Skipping ingredient row: {}", e);
                    failures.push(e);
                }
            }
        }
        (ingredients, failures)
    }

    /// Reject ingredients the panel cannot display
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid("name", "must not be empty"));
        }
        if self.current_stock < 0.0 {
            return Err(DomainError::invalid(
                "current_stock",
                format!("must not be negative, got {}", self.current_stock),
            ));
        }
        if self.min_stock < 0.0 {
            return Err(DomainError::invalid(
                "min_stock",
                format!("must not be negative, got {}", self.min_stock),
            ));
        }
        if self.price < 0.0 {
            return Err(DomainError::invalid(
                "price",
                format!("must not be negative, got {}", self.price),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ingredient_from_portuguese_payload() {
        let ingredient = Ingredient::from_api(&json!({
            "id_ingrediente": 4,
            "nome": "Queijo cheddar",
            "unidade_medida": "kg",
            "estoque_atual": "12.5",
            "estoque_minimo": 3,
            "preco_custo": 41.9,
            "ativo": 1
        }))
        .expect("valid ingredient");

        assert_eq!(ingredient.id, "4");
        assert_eq!(ingredient.name, "Queijo cheddar");
        assert_eq!(ingredient.unit, "kg");
        assert_eq!(ingredient.current_stock, 12.5);
        assert_eq!(ingredient.min_stock, 3.0);
        assert!(ingredient.active);
    }

    #[test]
    fn test_ingredient_defaults() {
        let ingredient =
            Ingredient::from_api(&json!({"id": "x", "name": "Salt"})).expect("defaults");
        assert!(ingredient.active);
        assert_eq!(ingredient.current_stock, 0.0);
        assert!(ingredient.unit.is_empty());
    }

    #[test]
    fn test_ingredient_rejects_negative_stock() {
        let err = Ingredient::from_api(&json!({
            "id": 1, "nome": "Pão", "estoque_atual": -2
        }))
        .expect_err("negative stock");
        assert!(matches!(
            err,
            DomainError::InvalidValue {
                field: "current_stock",
                ..
            }
        ));
    }

    #[test]
    fn test_list_skips_broken_rows() {
        let (ingredients, failures) = Ingredient::list_from_api(&json!([
            {"id": 1, "nome": "Alface"},
            {"nome": "Sem id"},
            {"id": 3, "name": "Tomate", "ativo": "nao"}
        ]));

        assert_eq!(ingredients.len(), 2);
        assert!(!ingredients[1].active);
        assert_eq!(failures.len(), 1);

        let (none, failures) = Ingredient::list_from_api(&json!({"oops": true}));
        assert!(none.is_empty());
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn test_ingredient_with_cost_and_price() {
        let ingredient = Ingredient::from_api(&json!({
            "id_ingrediente": 8,
            "nome": "Bacon",
            "preco_custo": "22,40",
            "preco": 30,
            "estoque_atual": 5,
            "quantidade_estoque": 50
        }))
        .expect("both price fields");

        assert_eq!(ingredient.price, 22.4);
        assert_eq!(ingredient.current_stock, 5.0);
    }
}

//! Cart payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    canonicalize, canonicalize_nested, flexible_f64, flexible_id, flexible_id_opt, flexible_u32,
    from_value, FieldChain,
};
use crate::error::DomainError;

const EXTRA_FIELDS: &[FieldChain] = &[
    ("id", &["id_ingrediente", "id"]),
    ("name", &["nome", "name"]),
    ("quantity", &["quantidade", "quantity"]),
    ("unit_price", &["preco", "price", "unit_price"]),
];

const ITEM_FIELDS: &[FieldChain] = &[
    ("id", &["id_item", "id"]),
    ("product_id", &["id_produto", "product_id"]),
    ("name", &["nome", "nome_produto", "name"]),
    ("quantity", &["quantidade", "quantity"]),
    ("unit_price", &["preco", "preco_unitario", "price", "unit_price"]),
    ("notes", &["observacao", "observacoes", "notes"]),
    ("extras", &["adicionais", "extras_adicionados", "extras"]),
];

/// An extra added to a cart line (additional cheese, bacon, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartExtra {
    /// Ingredient id of the extra
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Units of the extra per unit of the line
    #[serde(default = "one", deserialize_with = "flexible_u32")]
    pub quantity: u32,
    /// Price per unit of the extra
    #[serde(default, deserialize_with = "flexible_f64")]
    pub unit_price: f64,
}

impl CartExtra {
    /// Price of this extra for one unit of its line
    pub fn total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// One line of the shopping cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line id (stable render key)
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    /// Product the line refers to
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub product_id: Option<String>,
    /// Product display name
    pub name: String,
    /// Units ordered
    #[serde(deserialize_with = "flexible_u32")]
    pub quantity: u32,
    /// Price of one unit without extras
    #[serde(deserialize_with = "flexible_f64")]
    pub unit_price: f64,
    /// Free-text kitchen notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Extras added to every unit of the line
    #[serde(default)]
    pub extras: Vec<CartExtra>,
}

fn one() -> u32 {
    1
}

impl CartItem {
    /// Fold the line and its extras onto canonical field names
    pub(crate) fn canonical(value: &Value) -> Value {
        let mut line = canonicalize(value, ITEM_FIELDS);
        canonicalize_nested(&mut line, "extras", EXTRA_FIELDS);
        line
    }

    /// Normalize an API cart line
    pub fn from_api(value: &Value) -> Result<Self, DomainError> {
        let item: Self = from_value("cart item", &Self::canonical(value))?;
        item.validate()?;
        Ok(item)
    }

    /// Reject lines the cart cannot display
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid("name", "must not be empty"));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(DomainError::invalid(
                "unit_price",
                format!("must be a non-negative amount, got {}", self.unit_price),
            ));
        }
        if let Some(extra) = self
            .extras
            .iter()
            .find(|e| !e.unit_price.is_finite() || e.unit_price < 0.0)
        {
            return Err(DomainError::invalid(
                "extras",
                format!("extra {} has an invalid price {}", extra.id, extra.unit_price),
            ));
        }
        Ok(())
    }

    /// Price of one unit including extras
    pub fn unit_total(&self) -> f64 {
        self.unit_price + self.extras.iter().map(CartExtra::total).sum::<f64>()
    }

    /// Price of the whole line
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_total()
    }
}

/// The shopping cart as returned by the cart endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart lines in display order
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize an API cart
    ///
    /// Accepts either an object with an `items`/`itens` array or a bare
    /// array of lines. `null` is an empty cart.
    pub fn from_api(value: &Value) -> Result<Self, DomainError> {
        let items = match value {
            Value::Null => return Ok(Self::new()),
            Value::Array(lines) => lines,
            Value::Object(map) => match map.get("items").or_else(|| map.get("itens")) {
                Some(Value::Array(lines)) => lines,
                Some(Value::Null) | None => return Ok(Self::new()),
                Some(_) => {
                    return Err(DomainError::Malformed {
                        payload: "cart",
                        reason: "items is not an array".to_string(),
                    })
                }
            },
            _ => {
                return Err(DomainError::Malformed {
                    payload: "cart",
                    reason: "expected an array or an object".to_string(),
                })
            }
        };

        let items = items
            .iter()
            .map(CartItem::from_api)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    /// Serialize back into the array shape kept in the state store
    pub fn to_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(&self.items)?)
    }

    /// Parse and normalize a cart saved as JSON text
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_api(&value)?)
    }

    /// Find a line by id
    pub fn find(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Find a line by id for editing
    pub fn find_mut(&mut self, id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Remove a line by id
    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Total units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of all line totals
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart has no lines
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_item_from_portuguese_payload() {
        let item = CartItem::from_api(&json!({
            "id_item": 12,
            "id_produto": 3,
            "nome": "X-Burger",
            "quantidade": 2,
            "preco": "18.90",
            "observacao": "sem cebola",
            "adicionais": [{"id_ingrediente": 5, "nome": "Bacon", "preco": 3.5}]
        }))
        .expect("valid cart item");

        assert_eq!(item.id, "12");
        assert_eq!(item.product_id.as_deref(), Some("3"));
        assert_eq!(item.name, "X-Burger");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.notes.as_deref(), Some("sem cebola"));
        assert_eq!(item.extras[0].quantity, 1);
        assert!((item.line_total() - 44.8).abs() < 1e-9);
    }

    #[test]
    fn test_cart_item_from_english_payload() {
        let item = CartItem::from_api(&json!({
            "id": "a1",
            "name": "Fries",
            "quantity": 1,
            "unit_price": 9.5
        }))
        .expect("valid cart item");
        assert_eq!(item.product_id, None);
        assert!(item.extras.is_empty());
        assert_eq!(item.unit_total(), 9.5);
    }

    #[test]
    fn test_cart_item_rejects_empty_name() {
        let err = CartItem::from_api(&json!({
            "id": 1, "name": "  ", "quantity": 1, "unit_price": 1
        }))
        .expect_err("empty name");
        assert_eq!(err, DomainError::invalid("name", "must not be empty"));
    }

    #[test]
    fn test_cart_item_rejects_negative_quantity() {
        let err = CartItem::from_api(&json!({
            "id": 1, "name": "Soda", "quantity": -1, "unit_price": 5
        }))
        .expect_err("negative quantity");
        assert!(matches!(err, DomainError::Malformed { .. }));
    }

    #[test]
    fn test_cart_shapes() {
        assert!(Cart::from_api(&Value::Null).expect("null cart").is_empty());

        let lines = json!([
            {"id": 1, "name": "A", "quantity": 2, "unit_price": 10},
            {"id": 2, "name": "B", "quantity": 1, "unit_price": 5.5}
        ]);
        let cart = Cart::from_api(&lines).expect("array cart");
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), 25.5);

        let wrapped = Cart::from_api(&json!({ "itens": lines })).expect("object cart");
        assert_eq!(wrapped, cart);

        assert!(Cart::from_api(&json!("nope")).is_err());
        assert!(Cart::from_api(&json!({"items": 3})).is_err());
    }

    #[test]
    fn test_cart_edit_helpers() {
        let mut cart = Cart::from_api(&json!([
            {"id": 1, "name": "A", "quantity": 2, "unit_price": 10}
        ]))
        .expect("cart");

        cart.find_mut("1").expect("line").quantity = 4;
        assert_eq!(cart.find("1").map(|i| i.quantity), Some(4));

        let value = cart.to_value().expect("serializable cart");
        assert_eq!(value[0]["quantity"], 4);
        assert_eq!(Cart::from_api(&value).expect("round trip"), cart);

        assert!(cart.remove("1").is_some());
        assert!(cart.remove("1").is_none());
    }

    #[test]
    fn test_cart_item_with_both_name_fields() {
        let item = CartItem::from_api(&json!({
            "id_item": 7,
            "nome": "X-Salada",
            "nome_produto": "X-Salada (produto)",
            "quantidade": 1,
            "preco": 15,
            "preco_unitario": 99,
            "adicionais": [{"id_ingrediente": 2, "nome": "Ovo", "name": "Egg", "preco": 2}]
        }))
        .expect("both name fields");

        assert_eq!(item.name, "X-Salada");
        assert_eq!(item.unit_price, 15.0);
        assert_eq!(item.extras[0].name, "Ovo");
    }

    #[test]
    fn test_cart_item_name_falls_back_past_null() {
        let item = CartItem::from_api(&json!({
            "id": 1, "nome": null, "nome_produto": "Combo", "quantity": 1, "unit_price": 30
        }))
        .expect("fallback name");
        assert_eq!(item.name, "Combo");
    }

    #[test]
    fn test_cart_item_rejects_non_finite_extra_price() {
        let err = CartItem::from_api(&json!({
            "id": 1,
            "name": "Burger",
            "quantity": 1,
            "unit_price": 20,
            "extras": [{"id": 9, "name": "Queijo", "unit_price": "NaN"}]
        }))
        .expect_err("NaN extra price");
        assert!(matches!(err, DomainError::InvalidValue { field: "extras", .. }));
    }

    #[test]
    fn test_cart_from_json_str() {
        let text = r#"{"itens": [{"id": 1, "nome": "A", "quantidade": 1, "preco": 4}]}"#;
        let cart = Cart::from_json_str(text).expect("cart text");
        assert_eq!(cart.subtotal(), 4.0);

        let err = Cart::from_json_str("{not json").expect_err("bad text");
        assert!(!err.is_domain_error());

        let text = r#"[{"id": 1, "name": "", "quantity": 1, "unit_price": 1}]"#;
        let err = Cart::from_json_str(text).expect_err("empty name");
        assert!(err.is_domain_error());
    }
}

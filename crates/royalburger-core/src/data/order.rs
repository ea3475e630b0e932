//! Order payloads for the orders admin panel and the customer order list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::cart::CartItem;
use super::{canonicalize, flexible_f64, flexible_id, from_value, FieldChain};
use crate::error::DomainError;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet started
    Pending,
    /// In the kitchen
    Preparing,
    /// Ready for pickup or dispatch
    Ready,
    /// Out for delivery
    Delivering,
    /// Handed to the customer
    Delivered,
    /// Cancelled by the customer or the restaurant
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transition is expected
    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Canonical snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    /// Parse English or Portuguese status names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        let status = match normalized.as_str() {
            "pending" | "pendente" | "recebido" | "aguardando" => OrderStatus::Pending,
            "preparing" | "em_preparo" | "preparando" | "em_preparacao" => {
                OrderStatus::Preparing
            }
            "ready" | "pronto" => OrderStatus::Ready,
            "delivering" | "em_entrega" | "saiu_para_entrega" | "out_for_delivery" => {
                OrderStatus::Delivering
            }
            "delivered" | "entregue" | "concluido" | "concluído" | "completed" => {
                OrderStatus::Delivered
            }
            "cancelled" | "canceled" | "cancelado" => OrderStatus::Cancelled,
            _ => {
                return Err(DomainError::UnknownStatus {
                    status: s.to_string(),
                })
            }
        };
        Ok(status)
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

const FIELDS: &[FieldChain] = &[
    ("id", &["id_pedido", "id"]),
    ("status", &["situacao", "status"]),
    ("items", &["itens", "items"]),
    ("total", &["valor_total", "total_pedido", "total"]),
    ("created_at", &["data_pedido", "criado_em", "created_at"]),
    ("customer_name", &["nome_cliente", "cliente", "customer_name"]),
];

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Ordered lines
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Total charged, as computed by the API
    #[serde(default, deserialize_with = "flexible_f64")]
    pub total: f64,
    /// When the order was placed
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Customer display name
    #[serde(default)]
    pub customer_name: Option<String>,
}

impl Order {
    /// Normalize an API order
    pub fn from_api(value: &Value) -> Result<Self, DomainError> {
        let mut raw = canonicalize(value, FIELDS);
        if let Some(Value::Array(lines)) = raw.get_mut("items") {
            for line in lines.iter_mut() {
                *line = CartItem::canonical(line);
            }
        }
        let order: Self = from_value("order", &raw)?;
        order.validate()?;
        Ok(order)
    }

    /// Reject orders the panel cannot display
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(DomainError::invalid(
                "total",
                format!("must be a non-negative amount, got {}", self.total),
            ));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }

    /// Units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing() {
        assert_eq!("Em preparo".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert_eq!("saiu-para-entrega".parse::<OrderStatus>(), Ok(OrderStatus::Delivering));
        assert_eq!("CANCELED".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert_eq!(
            "lost".parse::<OrderStatus>(),
            Err(DomainError::UnknownStatus {
                status: "lost".to_string()
            })
        );
    }

    #[test]
    fn test_status_is_final() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Ready.is_final());
    }

    #[test]
    fn test_order_from_portuguese_payload() {
        let order = Order::from_api(&json!({
            "id_pedido": 1001,
            "situacao": "pronto",
            "valor_total": "52.30",
            "data_pedido": "2026-10-18T19:45:00Z",
            "nome_cliente": "Maria",
            "itens": [
                {"id": 1, "nome": "X-Salada", "quantidade": 2, "preco": 21.4},
                {"id": 2, "nome": "Suco", "quantidade": 1, "preco": 9.5}
            ]
        }))
        .expect("valid order");

        assert_eq!(order.id, "1001");
        assert_eq!(order.status, OrderStatus::Ready);
        assert_eq!(order.total, 52.3);
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.customer_name.as_deref(), Some("Maria"));
        assert!(order.created_at.is_some());

        let json = serde_json::to_value(&order).expect("serialize");
        assert_eq!(json["status"], "ready");
    }

    #[test]
    fn test_order_with_unknown_status_is_malformed() {
        let err = Order::from_api(&json!({"id": 1, "status": "lost"})).expect_err("status");
        assert!(matches!(err, DomainError::Malformed { payload: "order", .. }));
    }

    #[test]
    fn test_order_with_overlapping_field_names() {
        let order = Order::from_api(&json!({
            "id_pedido": 7,
            "id": 700,
            "situacao": "entregue",
            "valor_total": 30,
            "total_pedido": 31,
            "nome_cliente": "Ana",
            "cliente": {"id": 3},
            "itens": [
                {"id_item": 1, "nome": "X-Bacon", "nome_produto": "X-Bacon (produto)",
                 "quantidade": 1, "preco": 30}
            ]
        }))
        .expect("overlapping names");

        assert_eq!(order.id, "7");
        assert_eq!(order.total, 30.0);
        assert_eq!(order.customer_name.as_deref(), Some("Ana"));
        assert_eq!(order.items[0].name, "X-Bacon");
    }
}

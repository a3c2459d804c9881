//! Order projection.
//!
//! The order endpoint consumes `{name, code, qty, sum}` lines plus a grand
//! total and the customer's contact details. This module only builds that
//! payload from a cart; delivering it is the host's business.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub code: String,
    pub qty: u32,
    pub sum: f64,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name(),
            code: item.sku(),
            qty: item.qty(),
            sum: item.line_total(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(flatten)]
    pub contact: CustomerContact,
    pub items: Vec<OrderLine>,
    pub total: f64,
}

impl OrderPayload {
    pub fn from_cart(cart: &Cart, contact: CustomerContact) -> Self {
        Self {
            contact,
            items: cart.items().iter().map(OrderLine::from).collect(),
            total: cart.grand_total(),
        }
    }
}

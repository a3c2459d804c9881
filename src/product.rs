use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::price::{format_price, normalize_price_with, RawPrice};

lazy_static! {
    static ref WHITESPACE_RUN_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Product data resolved for an add-to-cart action.
///
/// Fields may be partial: an empty `name` or non-finite `price` means the
/// product could not be resolved, and the cart store rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub name: String,
    pub sku: String,
    pub price: f64,
}

impl ProductData {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            price,
        }
    }

    /// Product passed positionally from an inline `addToCart(name, code, price)`
    /// call. The key is synthesized from name and price so inline triggers and
    /// attribute-driven triggers for the same product share one cart line.
    pub fn from_inline_call<'a>(
        name: &str,
        price: impl Into<RawPrice<'a>>,
        currency_symbol: &str,
    ) -> Self {
        let name = name.trim().to_string();
        let price = normalize_price_with(price, currency_symbol);
        let sku = synthesize_sku(&name, price);
        Self { name, sku, price }
    }

    pub fn is_addable(&self) -> bool {
        !self.name.is_empty() && self.price.is_finite()
    }
}

/// Stable key for products without explicit markup: `name_price`, with
/// every whitespace run collapsed to `_`.
pub fn synthesize_sku(name: &str, price: f64) -> String {
    let raw = format!("{}_{}", name, format_price(price));
    WHITESPACE_RUN_RE.replace_all(&raw, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_sku() {
        assert_eq!(synthesize_sku("Gasket", 1500.0), "Gasket_1500");
        assert_eq!(synthesize_sku("Oil  filter\tkit", 99.5), "Oil_filter_kit_99.5");
        assert_eq!(synthesize_sku("", f64::NAN), "_NaN");
    }

    #[test]
    fn test_inline_call_product() {
        let product = ProductData::from_inline_call("  Gasket ", "1 500 ₽", "₽");
        assert_eq!(product.name, "Gasket");
        assert_eq!(product.price, 1500.0);
        assert_eq!(product.sku, "Gasket_1500");
        assert!(product.is_addable());

        let product = ProductData::from_inline_call("Gasket", "call us", "₽");
        assert!(product.price.is_nan());
        assert!(!product.is_addable());
    }
}

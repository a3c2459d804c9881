use serde::{Deserialize, Serialize};

use crate::price::DEFAULT_CURRENCY_SYMBOL;

/// Storage keys for the canonical cart and the legacy object-format cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageKeys {
    pub main: String,
    pub legacy: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            main: "ambertruck_cart".to_string(),
            legacy: "ambertruck_cart_v1".to_string(),
        }
    }
}

/// The floating "open cart" control appended to every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloatingControl {
    pub id: String,
    pub class: String,
    pub href: String,
    pub aria_label: String,
    pub icon: String,
    pub count_class: String,
}

impl Default for FloatingControl {
    fn default() -> Self {
        Self {
            id: "cart-fab".to_string(),
            class: "cart-fab".to_string(),
            href: "cart.html".to_string(),
            aria_label: "Открыть корзину".to_string(),
            icon: "🛒".to_string(),
            count_class: "cart-fab-count cart-count".to_string(),
        }
    }
}

/// Page-level cart configuration. Every field has a default, so hosts only
/// override what their markup does differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartConfig {
    pub storage_keys: StorageKeys,
    /// Class of add-to-cart trigger elements
    pub trigger_class: String,
    /// Elements receiving the item count
    pub counter_selector: String,
    /// Header cart controls superseded by the floating control
    pub legacy_control_selector: String,
    /// `<body>` class marking the cart page itself, where header controls stay
    pub cart_page_class: String,
    pub floating_control: FloatingControl,
    pub currency_symbol: String,
    /// Shown to the user when a product cannot be added
    pub add_failed_message: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_keys: StorageKeys::default(),
            trigger_class: "buy-btn".to_string(),
            counter_selector: "#cart-count, #cartCount, #cart-count-badge, .cart-count".to_string(),
            legacy_control_selector: ".cart-button, .cart-btn, #cartButton, #cart-btn, .header-cart"
                .to_string(),
            cart_page_class: "page-cart".to_string(),
            floating_control: FloatingControl::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            add_failed_message: "Не удалось добавить товар: нет названия или цены.".to_string(),
        }
    }
}

impl CartConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let config = CartConfig::from_json(
            r#"{"triggerClass": "add-btn", "storageKeys": {"main": "shop_cart"}}"#,
        )
        .unwrap();
        assert_eq!(config.trigger_class, "add-btn");
        assert_eq!(config.storage_keys.main, "shop_cart");
        assert_eq!(config.storage_keys.legacy, "ambertruck_cart_v1");
        assert_eq!(config.floating_control.id, "cart-fab");
        assert_eq!(config.currency_symbol, "₽");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(CartConfig::from_json("{").is_err());
        assert!(CartConfig::from_json(r#"{"triggerClass": 3}"#).is_err());
    }
}

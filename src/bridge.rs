//! Native bridge for JavaScript hosts.
//!
//! The host keeps the browser storage; these exports take the stored cart as
//! a string and hand back the updated one.

use napi_derive::napi;
use serde_json::json;

use crate::config::CartConfig;
use crate::price::normalize_price;
use crate::storefront::{add_to_stored_cart, locate_nth_trigger};

fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Host config as JSON; `None` keeps every default
fn host_config(config_json: Option<String>) -> napi::Result<CartConfig> {
    match config_json {
        Some(raw) => CartConfig::from_json(&raw).map_err(to_napi_error),
        None => Ok(CartConfig::default()),
    }
}

#[napi]
pub fn normalize_price_native(raw: String) -> f64 {
    normalize_price(raw.as_str())
}

/// Locate the product for the `trigger_index`-th add-to-cart trigger in `html`
#[napi]
pub fn locate_product_native(
    html: String,
    trigger_index: u32,
    config_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let config = host_config(config_json)?;
    let product = locate_nth_trigger(&html, trigger_index as usize, &config).ok_or_else(|| {
        napi::Error::from_reason(format!("No add-to-cart trigger at index {}", trigger_index))
    })?;
    serde_json::to_value(product).map_err(to_napi_error)
}

/// Inline `addToCart(name, code, price)` against a host-held cart.
/// Returns `{ ok, cart }` where `cart` is the canonical array as stored.
#[napi]
pub fn add_to_cart_native(
    cart_json: Option<String>,
    name: String,
    _code: String,
    price: String,
    config_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let config = host_config(config_json)?;
    let (ok, stored) = add_to_stored_cart(cart_json.as_deref(), &name, price.as_str(), &config)
        .map_err(to_napi_error)?;
    let cart: serde_json::Value = serde_json::from_str(&stored).unwrap_or_else(|_| json!([]));
    Ok(json!({ "ok": ok, "cart": cart }))
}

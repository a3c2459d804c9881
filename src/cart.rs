//! Cart data model.
//!
//! Stored carts are shared with other pages (the cart page itself, the
//! checkout flow) that may write loosely shaped items. Each item keeps the
//! object it was read from; typed fields are lenient views over it, and the
//! only write an add performs on an existing line is its `qty`. Entries that
//! are not objects are dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::price::{format_price, normalize_price};
use crate::product::ProductData;

/// One cart line, backed by its stored JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItem {
    fields: Map<String, Value>,
}

impl CartItem {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: f64, qty: u32) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        fields.insert("sku".to_string(), Value::String(sku.into()));
        fields.insert(
            "price".to_string(),
            Number::from_f64(price).map_or(Value::Null, Value::Number),
        );
        fields.insert("qty".to_string(), Value::from(qty.max(1)));
        Self { fields }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The stored object, including fields this crate does not interpret
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn name(&self) -> String {
        scalar_text(self.fields.get("name"))
    }

    pub fn sku(&self) -> String {
        scalar_text(self.fields.get("sku"))
    }

    /// Price as a number. Price text is read like markup prices (default
    /// currency symbol); a missing price is `NaN`.
    pub fn price(&self) -> f64 {
        match self.fields.get("price") {
            Some(Value::String(text)) => normalize_price(text.as_str()),
            other => coerce_number(other),
        }
    }

    pub fn qty(&self) -> u32 {
        coerce_qty(self.fields.get("qty"))
    }

    /// One more unit. Only `qty` is rewritten.
    pub fn increment(&mut self) {
        let qty = self.qty().saturating_add(1);
        self.fields.insert("qty".to_string(), Value::from(qty));
    }

    /// `price * qty`, or 0 when the stored price is unusable
    pub fn line_total(&self) -> f64 {
        let price = self.price();
        if price.is_finite() {
            price * f64::from(self.qty())
        } else {
            0.0
        }
    }

    fn has_sku(&self, sku: &str) -> bool {
        self.sku() == sku
    }
}

/// Ordered cart contents; at most one line per SKU.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the canonical JSON array. Returns `None` unless the payload is
    /// an array; entries that are not objects are skipped.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw).ok()? {
            Value::Array(entries) => Some(Self::from_entries(entries)),
            _ => None,
        }
    }

    fn from_entries(entries: Vec<Value>) -> Self {
        let items = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(fields) => Some(CartItem::from_map(fields)),
                _ => None,
            })
            .collect();
        Self { items }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, sku: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.has_sku(sku))
    }

    /// Number of units across all lines
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.qty())).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `product`: bump the matching SKU line or append a
    /// new one. Returns `false` (and leaves the cart untouched) when the
    /// product has no name or no finite price.
    pub fn insert(&mut self, product: &ProductData) -> bool {
        if !product.is_addable() {
            return false;
        }

        match self.items.iter_mut().find(|item| item.has_sku(&product.sku)) {
            Some(existing) => existing.increment(),
            None => self.items.push(CartItem::new(
                product.name.clone(),
                product.sku.clone(),
                product.price,
                1,
            )),
        }
        true
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COERCION
// ═══════════════════════════════════════════════════════════════════════════════

/// Number coercion for loosely typed stored values: numeric strings parse
/// (blank strings are 0), booleans are 0/1, null is 0, anything else is NaN.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// Quantity coercion: anything below one or not a number counts as one
pub fn coerce_qty(value: Option<&Value>) -> u32 {
    let qty = coerce_number(value);
    if qty.is_finite() && qty >= 1.0 {
        qty.floor().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Render a scalar as text; `None` for null, empty strings, false, zero,
/// and structured values.
pub fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            let f = n.as_f64().unwrap_or(0.0);
            (f != 0.0 && !f.is_nan()).then(|| number_text(n))
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

pub fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(format_price).unwrap_or_default()
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

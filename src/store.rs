//! Cart Store
//!
//! Owns the persisted cart. The canonical format is a JSON array of cart
//! items under `StorageKeys::main`; an older object-keyed format under
//! `StorageKeys::legacy` is migrated once and then left alone.
//!
//! Reads never fail: missing or corrupt data is an empty cart. Only storage
//! writes surface errors.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::cart::{coerce_number, coerce_qty, number_text, truthy_text, Cart, CartItem};
use crate::config::StorageKeys;
use crate::product::ProductData;
use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("missing product data (name: {:?}, price: {})", .0.name, .0.price)]
    MissingProductData(ProductData),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What `migrate_if_needed` found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Canonical data already present; nothing written
    AlreadyCanonical,
    /// Legacy records converted and persisted
    Migrated { items: usize, dropped: usize },
    /// No usable data anywhere; an empty cart was persisted
    Initialized,
}

pub struct CartStore<S> {
    storage: S,
    keys: StorageKeys,
}

impl<S: Storage> CartStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_keys(storage, StorageKeys::default())
    }

    pub fn with_keys(storage: S, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Convert the legacy cart into the canonical format, once.
    ///
    /// A canonical array already in storage makes this a no-op, so repeated
    /// calls leave storage exactly as the first call did.
    pub fn migrate_if_needed(&mut self) -> Result<MigrationOutcome, CartError> {
        let canonical = self
            .storage
            .get_item(&self.keys.main)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
        if matches!(canonical, Some(Value::Array(_))) {
            return Ok(MigrationOutcome::AlreadyCanonical);
        }

        let legacy = self
            .storage
            .get_item(&self.keys.legacy)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
        let records: Vec<Value> = match legacy {
            Some(Value::Object(map)) => map.into_iter().map(|(_, record)| record).collect(),
            Some(Value::Array(entries)) => entries,
            _ => {
                self.save(&Cart::new())?;
                debug!(key = %self.keys.main, "initialized empty cart");
                return Ok(MigrationOutcome::Initialized);
            }
        };

        let total = records.len();
        let cart: Cart = records
            .iter()
            .filter_map(Value::as_object)
            .filter_map(migrate_record)
            .collect();
        self.save(&cart)?;

        let outcome = MigrationOutcome::Migrated {
            items: cart.len(),
            dropped: total - cart.len(),
        };
        info!(?outcome, from = %self.keys.legacy, to = %self.keys.main, "migrated legacy cart");
        Ok(outcome)
    }

    /// Migrate if needed, then read the cart
    pub fn load(&mut self) -> Result<Cart, CartError> {
        self.migrate_if_needed()?;
        Ok(self.get_cart())
    }

    /// Current persisted cart; absent or corrupt data reads as empty
    pub fn get_cart(&self) -> Cart {
        let Some(raw) = self.storage.get_item(&self.keys.main) else {
            return Cart::new();
        };
        Cart::from_json(&raw).unwrap_or_else(|| {
            debug!(key = %self.keys.main, "corrupt cart data, treating as empty");
            Cart::new()
        })
    }

    /// Overwrite the persisted cart
    pub fn save(&mut self, cart: &Cart) -> Result<(), CartError> {
        let encoded = cart.to_json()?;
        self.storage.set_item(&self.keys.main, &encoded)?;
        Ok(())
    }

    /// Add one unit of `product` and persist the full cart.
    ///
    /// Products without a name or a finite price are rejected with
    /// [`CartError::MissingProductData`] and nothing is written.
    pub fn add(&mut self, product: &ProductData) -> Result<(), CartError> {
        let mut cart = self.get_cart();
        if !cart.insert(product) {
            return Err(CartError::MissingProductData(product.clone()));
        }
        self.save(&cart)
    }
}

/// Map one legacy record onto a cart item. Records without a name (or SKU
/// standing in for it) or without a finite price are dropped.
fn migrate_record(record: &Map<String, Value>) -> Option<CartItem> {
    let name = truthy_text(record.get("name"))
        .or_else(|| truthy_text(record.get("sku")))
        .unwrap_or_default();

    let sku = truthy_text(record.get("sku")).unwrap_or_else(|| {
        let base = truthy_text(record.get("name")).unwrap_or_default();
        let price_text = match record.get("price") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => number_text(n),
            Some(other) => other.to_string(),
        };
        format!("{}__{}", base, price_text)
    });

    let price = match coerce_number(record.get("price")) {
        p if p.is_nan() => 0.0,
        p => p,
    };
    let qty = coerce_qty(record.get("qty"));

    if name.is_empty() || !price.is_finite() {
        return None;
    }
    Some(CartItem::new(name, sku, price, qty))
}

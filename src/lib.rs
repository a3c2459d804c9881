//! # AmberTruck Cart Core
//!
//! Cart state management and product-data extraction for a static
//! storefront. Pages are parsed HTML documents; browser storage is an
//! injected [`Storage`] capability.
//!
//! ## Cart Invariants
//!
//! 1. **One Line per SKU**: repeated additions of the same SKU increment
//!    `qty`; a cart never holds two lines with the same key.
//!
//! 2. **Validated Inserts**: a product is only added with a non-empty name
//!    and a finite price. Rejections write nothing and reach the user.
//!
//! 3. **Deterministic Keys**: products without an explicit SKU get
//!    `name_price` with whitespace collapsed to `_`, so the same product
//!    always lands on the same line whichever path added it.
//!
//! 4. **One-Time Migration**: the legacy object-format cart is converted only
//!    while no canonical array exists. Running it again is a no-op.
//!
//! 5. **Never Fatal**: corrupt stored data reads as an empty cart; malformed
//!    prices read as `NaN`. Only storage write failures surface as errors.
//!
//! ## Resolution Priority
//!
//! Product fields are resolved independently, first hit wins:
//!    1. `data-name` / `data-sku` / `data-price` on the trigger
//!    2. the same attributes on the nearest carrier container
//!    3. visible text in the enclosing card or table row
//!    4. synthesized SKU

pub mod cart;
pub mod config;
pub mod counter;
pub mod dom;
pub mod locator;
pub mod order;
pub mod price;
pub mod product;
pub mod storage;
pub mod store;
pub mod storefront;

#[cfg(feature = "napi")]
mod bridge;

#[cfg(test)]
mod store_tests;

#[cfg(feature = "napi")]
pub use bridge::{add_to_cart_native, locate_product_native, normalize_price_native};

pub use cart::{Cart, CartItem};
pub use config::{CartConfig, FloatingControl, StorageKeys};
pub use counter::update_counters;
pub use dom::{Page, Selector};
pub use locator::{locate, PartialProduct, ProductLocator, ResolveContext, RESOLVERS};
pub use order::{CustomerContact, OrderLine, OrderPayload};
pub use price::{normalize_price, normalize_price_with, RawPrice};
pub use product::{synthesize_sku, ProductData};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CartError, CartStore, MigrationOutcome};
pub use storefront::{
    add_to_stored_cart, locate_nth_trigger, AddOutcome, ClickEvent, CollectedAlerts, Notifier,
    Storefront,
};

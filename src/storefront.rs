//! Storefront event binding.
//!
//! Ties a parsed page to a cart store: delegated click handling for
//! add-to-cart triggers, the positional `add_to_cart(name, code, price)`
//! entry point used by inline handlers on older pages, and the page-load
//! bootstrap. Both add paths end in the same sequence:
//! add → persist → counter sync → user-visible report on rejection.

use markup5ever_rcdom::Handle;
use tracing::{debug, warn};

use crate::cart::Cart;
use crate::config::CartConfig;
use crate::counter::update_counters;
use crate::dom::{
    append_child, closest, create_element, create_text, has_class, remove, Page, Selector,
};
use crate::locator::ProductLocator;
use crate::price::RawPrice;
use crate::product::ProductData;
use crate::storage::{MemoryStorage, Storage};
use crate::store::{CartError, CartStore, MigrationOutcome};

/// Sink for messages the end user must see
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Collects alerts for the host to display
#[derive(Debug, Clone, Default)]
pub struct CollectedAlerts {
    messages: Vec<String>,
}

impl CollectedAlerts {
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl Notifier for CollectedAlerts {
    fn alert(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// A click dispatched to the document
#[derive(Debug)]
pub struct ClickEvent {
    target: Handle,
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new(target: Handle) -> Self {
        Self {
            target,
            default_prevented: false,
        }
    }

    pub fn target(&self) -> &Handle {
        &self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Click outside any trigger; the default action proceeds
    Ignored,
    Added(ProductData),
    /// The product could not be resolved; the user was alerted
    Rejected(ProductData),
}

pub struct Storefront<S, N> {
    page: Page,
    store: CartStore<S>,
    notifier: N,
    config: CartConfig,
    locator: ProductLocator,
    trigger: Selector,
    counters: Selector,
}

impl<S: Storage, N: Notifier> Storefront<S, N> {
    pub fn new(page: Page, storage: S, notifier: N, config: CartConfig) -> Self {
        Self {
            page,
            store: CartStore::with_keys(storage, config.storage_keys.clone()),
            notifier,
            locator: ProductLocator::new(config.currency_symbol.clone()),
            trigger: Selector::class(&config.trigger_class),
            counters: Selector::parse(&config.counter_selector),
            config,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Page-load sequence: migrate storage, settle the floating cart control,
    /// then show the current count.
    pub fn bootstrap(&mut self) -> Result<MigrationOutcome, CartError> {
        let outcome = self.store.migrate_if_needed()?;
        self.ensure_floating_cart();
        self.sync_counters();
        Ok(outcome)
    }

    /// Leave exactly one floating cart control on the page. Header cart
    /// controls are removed everywhere except on the cart page.
    pub fn ensure_floating_cart(&mut self) {
        let body = self.page.body();
        let on_cart_page = body
            .as_ref()
            .map(|b| has_class(b, &self.config.cart_page_class))
            .unwrap_or(false);

        if !on_cart_page {
            let legacy = Selector::parse(&self.config.legacy_control_selector);
            for control in self.page.query_selector_all(&legacy) {
                remove(&control);
            }
        }

        let fab = &self.config.floating_control;
        if self.page.get_element_by_id(&fab.id).is_some() {
            return;
        }
        let Some(body) = body else {
            debug!("page has no body, skipping floating cart control");
            return;
        };

        let link = create_element(
            "a",
            &[
                ("id", fab.id.as_str()),
                ("class", fab.class.as_str()),
                ("href", fab.href.as_str()),
                ("aria-label", fab.aria_label.as_str()),
            ],
        );
        append_child(&link, create_text(&fab.icon));
        let count = create_element("span", &[("class", fab.count_class.as_str())]);
        append_child(&count, create_text("0"));
        append_child(&link, count);
        append_child(&body, link);
    }

    /// Project the persisted cart onto every counter element
    pub fn sync_counters(&self) {
        let cart = self.store.get_cart();
        update_counters(&self.page.document(), &cart, &self.counters);
    }

    /// Delegated click handler for add-to-cart triggers
    pub fn handle_click(&mut self, event: &mut ClickEvent) -> Result<AddOutcome, CartError> {
        let Some(trigger) = closest(event.target(), &self.trigger) else {
            return Ok(AddOutcome::Ignored);
        };
        // triggers are usually links; never navigate
        event.prevent_default();

        let product = self.locator.locate(&trigger);
        self.add_and_report(product)
    }

    /// Positional entry point for inline `addToCart(name, code, price)`
    /// handlers. The code is accepted for call compatibility; the cart key
    /// comes from name and price, as for unmarked triggers.
    pub fn add_to_cart<'a>(
        &mut self,
        name: &str,
        _code: &str,
        price: impl Into<RawPrice<'a>>,
    ) -> Result<AddOutcome, CartError> {
        let product = ProductData::from_inline_call(name, price, &self.config.currency_symbol);
        self.add_and_report(product)
    }

    fn add_and_report(&mut self, product: ProductData) -> Result<AddOutcome, CartError> {
        match self.store.add(&product) {
            Ok(()) => {
                debug!(sku = %product.sku, "added to cart");
                self.sync_counters();
                Ok(AddOutcome::Added(product))
            }
            Err(CartError::MissingProductData(product)) => {
                warn!(
                    name = %product.name,
                    sku = %product.sku,
                    price = product.price,
                    "Cart: missing product data"
                );
                self.notifier.alert(&self.config.add_failed_message);
                Ok(AddOutcome::Rejected(product))
            }
            Err(e) => Err(e),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve the product behind the `index`-th trigger of a rendered page,
/// using the configured trigger class and currency symbol.
pub fn locate_nth_trigger(html: &str, index: usize, config: &CartConfig) -> Option<ProductData> {
    let page = Page::parse(html);
    let triggers = page.query_selector_all(&Selector::class(&config.trigger_class));
    let trigger = triggers.get(index)?;
    Some(ProductLocator::new(config.currency_symbol.clone()).locate(trigger))
}

/// Apply an inline `addToCart(name, code, price)` to a cart held by the host.
/// Returns whether the product was added and the stored cart JSON after the
/// call; a rejected add hands back the cart unchanged.
pub fn add_to_stored_cart<'a>(
    cart_json: Option<&str>,
    name: &str,
    price: impl Into<RawPrice<'a>>,
    config: &CartConfig,
) -> Result<(bool, String), CartError> {
    let mut storage = MemoryStorage::new();
    if let Some(raw) = cart_json {
        storage = storage.with_item(&config.storage_keys.main, raw);
    }
    let mut store = CartStore::with_keys(storage, config.storage_keys.clone());
    if store.storage().get_item(&store.keys().main).is_none() {
        store.save(&Cart::new())?;
    }

    let product = ProductData::from_inline_call(name, price, &config.currency_symbol);
    let added = match store.add(&product) {
        Ok(()) => true,
        Err(CartError::MissingProductData(_)) => false,
        Err(e) => return Err(e),
    };

    let key = store.keys().main.clone();
    let stored = store.into_storage().get_item(&key).unwrap_or_default();
    Ok((added, stored))
}

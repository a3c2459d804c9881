//! Product Locator
//!
//! Resolves `{name, sku, price}` for an add-to-cart trigger. Storefront pages
//! mark products up inconsistently, so resolution runs an ordered table of
//! resolver strategies; for each field the first strategy that yields a
//! usable value wins:
//!
//! 1. `data-*` attributes on the trigger itself
//! 2. `data-*` attributes on the nearest carrier container
//! 3. visible text inside the enclosing card or table row
//!
//! A SKU that is still missing afterwards is synthesized from name and price.

use lazy_static::lazy_static;
use markup5ever_rcdom::Handle;
use regex::Regex;
use tracing::debug;

use crate::dom::{attr, closest, query_selector, text_content, Selector};
use crate::price::{normalize_price_with, DEFAULT_CURRENCY_SYMBOL};
use crate::product::{synthesize_sku, ProductData};

lazy_static! {
    /// Carrier containers, checked in priority order; the first match is used
    static ref CARRIERS: Vec<Selector> = [
        "[data-name][data-price]",
        "tr[data-price]",
        ".product-card[data-price]",
        ".product-info",
    ]
    .iter()
    .map(|s| Selector::parse(s))
    .collect();

    static ref CARD: Selector = Selector::parse(".product-card");
    static ref PRODUCT_INFO: Selector = Selector::parse(".product-info");
    static ref ROW: Selector = Selector::parse("tr");

    static ref CARD_NAME: Selector = Selector::parse(".product-name");
    static ref CARD_HEADING: Selector = Selector::parse("h3");
    static ref CARD_PRICE: Selector = Selector::parse(".product-price");
    static ref CARD_ARTICLE: Selector = Selector::parse(".product-article");
    static ref ROW_NAME: Selector = Selector::parse(".col-name");
    static ref ROW_PRICE: Selector = Selector::parse(".col-price");
    static ref ROW_SKU: Selector = Selector::parse(".col-sku");

    /// Localized "Article:" label preceding visible SKU text
    static ref ARTICLE_LABEL_RE: Regex = Regex::new(r"(?i)Артикул\s*:\s*").unwrap();
}

/// Fields found by one resolver. `None` means "not found here".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialProduct {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
}

impl PartialProduct {
    fn from_raw(name: Option<String>, sku: Option<String>, price: f64) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            sku: sku.filter(|s| !s.is_empty()),
            price: price.is_finite().then_some(price),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.sku.is_some() && self.price.is_some()
    }

    /// Fill fields still missing from a lower-priority source
    pub fn fill_from(&mut self, other: PartialProduct) {
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.sku.is_none() {
            self.sku = other.sku;
        }
        if self.price.is_none() {
            self.price = other.price;
        }
    }

    /// Settle into product data, synthesizing the SKU when unresolved
    pub fn finish(self) -> ProductData {
        let name = self.name.unwrap_or_default();
        let price = self.price.unwrap_or(f64::NAN);
        let sku = self.sku.unwrap_or_else(|| synthesize_sku(&name, price));
        ProductData { name, sku, price }
    }
}

/// Input shared by every resolver strategy
pub struct ResolveContext<'a> {
    pub trigger: &'a Handle,
    pub currency_symbol: &'a str,
}

impl ResolveContext<'_> {
    fn price_of(&self, raw: Option<String>) -> f64 {
        normalize_price_with(raw.as_deref(), self.currency_symbol)
    }
}

pub type Resolver = fn(&ResolveContext) -> PartialProduct;

/// Resolver strategies in priority order
pub const RESOLVERS: &[(&str, Resolver)] = &[
    ("trigger-attributes", from_trigger_attributes),
    ("container-attributes", from_container_attributes),
    ("visible-text", from_visible_text),
];

pub fn from_trigger_attributes(ctx: &ResolveContext) -> PartialProduct {
    data_attributes(ctx, ctx.trigger)
}

pub fn from_container_attributes(ctx: &ResolveContext) -> PartialProduct {
    CARRIERS
        .iter()
        .find_map(|selector| closest(ctx.trigger, selector))
        .map(|carrier| data_attributes(ctx, &carrier))
        .unwrap_or_default()
}

pub fn from_visible_text(ctx: &ResolveContext) -> PartialProduct {
    let card = closest(ctx.trigger, &CARD).or_else(|| closest(ctx.trigger, &PRODUCT_INFO));
    let row = closest(ctx.trigger, &ROW);
    let name = within(card.as_ref(), &CARD_NAME)
        .or_else(|| within(row.as_ref(), &ROW_NAME))
        .or_else(|| within(card.as_ref(), &CARD_HEADING))
        .map(|el| text_content(&el).trim().to_string());

    let price = within(card.as_ref(), &CARD_PRICE)
        .or_else(|| within(row.as_ref(), &ROW_PRICE))
        .map(|el| ctx.price_of(Some(text_content(&el))))
        .unwrap_or(f64::NAN);

    // article labels only appear on full product cards, not info panels
    let sku = within(closest(ctx.trigger, &CARD).as_ref(), &CARD_ARTICLE)
        .or_else(|| within(row.as_ref(), &ROW_SKU))
        .map(|el| strip_article_label(&text_content(&el)));

    PartialProduct::from_raw(name, sku, price)
}

fn within(container: Option<&Handle>, selector: &Selector) -> Option<Handle> {
    container.and_then(|c| query_selector(c, selector))
}

fn data_attributes(ctx: &ResolveContext, element: &Handle) -> PartialProduct {
    PartialProduct::from_raw(
        attr(element, "data-name"),
        attr(element, "data-sku"),
        ctx.price_of(attr(element, "data-price")),
    )
}

fn strip_article_label(text: &str) -> String {
    ARTICLE_LABEL_RE.replace(text, "").trim().to_string()
}

/// Locates product data for triggers on a storefront page
#[derive(Debug, Clone)]
pub struct ProductLocator {
    currency_symbol: String,
}

impl Default for ProductLocator {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl ProductLocator {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn locate(&self, trigger: &Handle) -> ProductData {
        let ctx = ResolveContext {
            trigger,
            currency_symbol: &self.currency_symbol,
        };

        let mut found = PartialProduct::default();
        for (source, resolve) in RESOLVERS {
            if found.is_complete() {
                break;
            }
            let partial = resolve(&ctx);
            debug!(source, ?partial, "product resolver");
            found.fill_from(partial);
        }
        found.finish()
    }
}

/// Locate with the default currency symbol
pub fn locate(trigger: &Handle) -> ProductData {
    ProductLocator::default().locate(trigger)
}

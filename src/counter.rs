use markup5ever_rcdom::Handle;

use crate::cart::Cart;
use crate::dom::{query_selector_all, set_text_content, Selector};

/// Write the cart's unit count into every counter element under `root`.
/// Pages without counters are fine; nothing is written.
pub fn update_counters(root: &Handle, cart: &Cart, counters: &Selector) {
    let total = cart.total_quantity().to_string();
    for counter in query_selector_all(root, counters) {
        set_text_content(&counter, &total);
    }
}

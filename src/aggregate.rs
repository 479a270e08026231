//! Derived-aggregate recomputation.
//!
//! Every write path that mutates a child collection (order items, recipe
//! ratings, restaurant reviews) calls back into these functions inside the
//! same transaction, then persists the result on the parent row. Stored
//! aggregates are never set directly.

/// A priced line item: unit price in minor units (cents) and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub price: i64,
    pub quantity: i32,
}

impl LineItem {
    pub fn new(price: i64, quantity: i32) -> Self {
        Self { price, quantity }
    }
}

/// Sum of `price * quantity` over all line items.
pub fn subtotal(items: &[LineItem]) -> i64 {
    items
        .iter()
        .map(|item| item.price * item.quantity as i64)
        .sum()
}

/// Order total: subtotal plus fixed surcharges supplied by the caller.
pub fn order_total(items: &[LineItem], tax: i64, delivery_fee: i64) -> i64 {
    subtotal(items) + tax + delivery_fee
}

/// Mean of a rating collection, rounded to one decimal place.
///
/// An empty collection yields `None` (the "no rating" sentinel) so a parent
/// whose last rating was removed does not keep a stale aggregate.
pub fn mean_rating(scores: &[i16]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|s| *s as i64).sum();
    let mean = sum as f64 / scores.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

use axum_food_delivery_api::aggregate::{LineItem, mean_rating, order_total, subtotal};

#[test]
fn order_total_sums_items_tax_and_delivery_fee() {
    // Two burgers at 14.99 and four fries at 3.99, 6.89 tax, 2.99 delivery:
    // 29.98 + 15.96 + 6.89 + 2.99 = 55.82.
    let items = vec![LineItem::new(1499, 2), LineItem::new(399, 4)];
    assert_eq!(subtotal(&items), 4594);
    assert_eq!(order_total(&items, 689, 299), 5582);
}

#[test]
fn order_total_is_independent_of_item_order() {
    let a = vec![LineItem::new(1499, 2), LineItem::new(399, 4), LineItem::new(350, 1)];
    let b = vec![LineItem::new(350, 1), LineItem::new(1499, 2), LineItem::new(399, 4)];
    assert_eq!(order_total(&a, 689, 299), order_total(&b, 689, 299));
}

#[test]
fn order_total_with_no_surcharges_equals_subtotal() {
    let items = vec![LineItem::new(1250, 3)];
    assert_eq!(order_total(&items, 0, 0), 3750);
}

#[test]
fn mean_rating_rounds_to_one_decimal() {
    // (5 + 4 + 5) / 3 = 4.666... -> 4.7
    assert_eq!(mean_rating(&[5, 4, 5]), Some(4.7));
    // (3 + 4) / 2 = 3.5, exact
    assert_eq!(mean_rating(&[3, 4]), Some(3.5));
    assert_eq!(mean_rating(&[2]), Some(2.0));
}

#[test]
fn mean_rating_of_empty_collection_is_none() {
    assert_eq!(mean_rating(&[]), None);
}

#[test]
fn mean_rating_is_idempotent_over_recomputation() {
    let scores = [1, 5, 3, 4];
    let first = mean_rating(&scores);
    assert_eq!(first, mean_rating(&scores));
    assert_eq!(first, Some(3.3));
}

#[test]
fn mean_rating_does_not_depend_on_insertion_order() {
    assert_eq!(mean_rating(&[5, 4, 5]), mean_rating(&[4, 5, 5]));
}

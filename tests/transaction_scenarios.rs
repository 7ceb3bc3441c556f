//! Buy and sell flows against a shop container.
use barterchest::barter::item::StaticCatalog;
use barterchest::barter::transaction::{buy, sell};
use barterchest::barter::{ItemContainer, ItemStack, Listing, ShopState, TransactionFailure};
use uuid::Uuid;

fn iron_shop(stacks: Vec<Option<ItemStack>>, buy_price: u32, sell_price: u32) -> (ShopState, Listing) {
    let mut shop = ShopState::new(Uuid::new_v4(), "Ada", ItemContainer::from_slots(stacks));
    let listing = Listing::configured(0, "iron_bar", "copper_bar", buy_price, sell_price);
    *shop.get_or_create_listing(0) = listing.clone();
    (shop, listing)
}

#[test]
fn test_buy_moves_items_and_payment() {
    let catalog = StaticCatalog::default();
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Iron_Bar", 10)), None], 2, 0);
    let mut buyer = ItemContainer::from_slots(vec![Some(ItemStack::new("Copper_Bar", 25)), None]);

    let result = buy(&mut shop, &listing, &mut buyer, 5, &catalog);

    assert!(result.is_success(), "{}", result);
    assert_eq!(result.quantity(), 5);
    assert_eq!(result.message(), "Bought 5x iron_bar for 10x copper_bar");
    assert_eq!(buyer.count("Copper_Bar"), 15);
    assert_eq!(buyer.count("Iron_Bar"), 5);
    assert_eq!(shop.container().count("Iron_Bar"), 5);
    assert_eq!(shop.container().count("Copper_Bar"), 10);
    assert_eq!(shop.total_earnings(), 10);
    assert!(shop.is_dirty());
}

#[test]
fn test_buy_with_insufficient_funds_changes_nothing() {
    let catalog = StaticCatalog::default();
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Iron_Bar", 10)), None], 2, 0);
    shop.clear_dirty();
    let mut buyer = ItemContainer::from_slots(vec![Some(ItemStack::new("Copper_Bar", 5)), None]);
    let shop_before = shop.container().clone();
    let buyer_before = buyer.clone();

    let result = buy(&mut shop, &listing, &mut buyer, 5, &catalog);

    assert_eq!(result.reason(), Some(TransactionFailure::InsufficientFunds));
    assert_eq!(result.message(), "You need 10 copper_bar but only have 5.");
    assert_eq!(shop.container(), &shop_before);
    assert_eq!(buyer, buyer_before);
    assert_eq!(shop.total_earnings(), 0);
    assert!(!shop.is_dirty());
}

#[test]
fn test_buy_rejects_full_inventory() {
    let catalog = StaticCatalog::default();
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Iron_Bar", 10)), None], 1, 0);
    shop.clear_dirty();
    let mut buyer = ItemContainer::from_slots(vec![Some(ItemStack::new("Copper_Bar", 64))]);
    let shop_before = shop.container().clone();
    let buyer_before = buyer.clone();

    let result = buy(&mut shop, &listing, &mut buyer, 1, &catalog);

    assert_eq!(result.reason(), Some(TransactionFailure::InventoryFull));
    assert_eq!(result.message(), "Not enough inventory space. You can only fit 0 more.");
    assert_eq!(buyer, buyer_before);
    assert_eq!(shop.container(), &shop_before);
    assert_eq!(shop.total_earnings(), 0);
    assert!(!shop.is_dirty());
}

#[test]
fn test_sell_restores_both_sides_when_payment_does_not_fit() {
    let catalog = StaticCatalog::default();
    // The seller's copper is spelled with a namespace, so it counts as room for the
    // payment but cannot absorb the shop's exact stack, and the seller has no free slot.
    let (mut shop, listing) = iron_shop(
        vec![
            Some(ItemStack::new("Iron_Bar", 5).with_meta("Quality", "Rusty")),
            Some(ItemStack::new("copper_bar", 10)),
            None,
        ],
        0,
        4,
    );
    shop.clear_dirty();
    let mut seller = ItemContainer::from_slots(vec![
        Some(ItemStack::new("Iron_Bar", 2).with_meta("Quality", "Fine")),
        Some(ItemStack::new("Hytale:copper_bar", 60)),
    ]);
    let shop_before = shop.container().clone();
    let seller_before = seller.clone();

    let result = sell(&mut shop, &listing, &mut seller, 1, &catalog);

    assert_eq!(result.reason(), Some(TransactionFailure::TransactionError));
    assert_eq!(result.message(), "Failed to get payment from shop.");
    assert_eq!(seller, seller_before);
    assert_eq!(shop.container(), &shop_before);
    assert_eq!(shop.container().get(2), None);
    assert!(!shop.is_dirty());
}

#[test]
fn test_buy_rolls_back_payment_when_items_do_not_fit() {
    let catalog = StaticCatalog::default();
    // The buyer's partial stack has a different id spelling, so it counts as room for
    // the listing item but cannot absorb the shop's exact stack.
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Iron_Bar", 10)), None], 2, 0);
    let mut buyer = ItemContainer::from_slots(vec![
        Some(ItemStack::new("Hytale:Iron_Bar", 60)),
        Some(ItemStack::new("copper_bar", 5)),
    ]);
    let shop_before = shop.container().clone();

    let result = buy(&mut shop, &listing, &mut buyer, 2, &catalog);

    assert_eq!(result.reason(), Some(TransactionFailure::TransactionError));
    assert_eq!(result.message(), "Failed to retrieve items from shop.");
    assert_eq!(buyer.count("copper_bar"), 5);
    assert_eq!(buyer.count("iron_bar"), 60);
    assert_eq!(shop.container(), &shop_before);
    assert_eq!(shop.total_earnings(), 0);
}

#[test]
fn test_sell_then_buy_back() {
    let catalog = StaticCatalog::default();
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Copper_Bar", 30)), None, None], 3, 2);
    let mut customer = ItemContainer::from_slots(vec![Some(ItemStack::new("Iron_Bar", 6)), None]);

    let sold = sell(&mut shop, &listing, &mut customer, 6, &catalog);
    assert!(sold.is_success(), "{}", sold);
    assert_eq!(customer.count("Copper_Bar"), 12);
    assert_eq!(customer.count("Iron_Bar"), 0);
    assert_eq!(shop.container().count("Iron_Bar"), 6);
    assert_eq!(shop.total_earnings(), 0);

    let bought = buy(&mut shop, &listing, &mut customer, 4, &catalog);
    assert!(bought.is_success(), "{}", bought);
    assert_eq!(customer.count("Iron_Bar"), 4);
    assert_eq!(customer.count("Copper_Bar"), 0);
    assert_eq!(shop.total_earnings(), 12);
}

#[test]
fn test_sell_without_enough_items() {
    let catalog = StaticCatalog::default();
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Copper_Bar", 30)), None], 0, 2);
    let mut seller = ItemContainer::from_slots(vec![Some(ItemStack::new("Iron_Bar", 2)), None]);

    let result = sell(&mut shop, &listing, &mut seller, 3, &catalog);

    assert_eq!(result.reason(), Some(TransactionFailure::InsufficientStock));
    assert_eq!(result.message(), "You don't have enough iron_bar. You have 2.");
}

#[test]
fn test_buy_disabled_when_price_is_zero() {
    let catalog = StaticCatalog::default();
    let (mut shop, listing) = iron_shop(vec![Some(ItemStack::new("Iron_Bar", 10))], 0, 2);
    let mut buyer = ItemContainer::from_slots(vec![Some(ItemStack::new("Copper_Bar", 10)), None]);

    let result = buy(&mut shop, &listing, &mut buyer, 1, &catalog);

    assert_eq!(result.reason(), Some(TransactionFailure::ShopDoesntSell));
    assert_eq!(result.message(), "This item is not for sale.");
}

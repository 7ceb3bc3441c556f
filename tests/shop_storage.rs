//! Sled persistence of shop records.
use barterchest::barter::{
    BarterStoreBuilder, BlockPos, BlockState, BlockWorld, ItemContainer, ItemStack, Listing,
    MemoryWorld, ShopState,
};
use tempfile::tempdir;
use uuid::Uuid;

fn sample_shop() -> ShopState {
    let mut container = ItemContainer::new(3);
    container.set(
        0,
        Some(ItemStack::new("Tool_Pickaxe_Iron", 1).with_durability(87).with_meta("Enchant", "Swift")),
    );
    container.set(2, Some(ItemStack::new("Gold_Bar", 9)));
    let mut shop = ShopState::new(Uuid::new_v4(), "Ada", container);
    shop.set_shop_name(Some("Ada's Tools".into()));
    *shop.get_or_create_listing(0) = Listing::configured(0, "Tool_Pickaxe_Iron", "Gold_Bar", 9, 4);
    shop.add_earnings(27);
    shop
}

#[test]
fn test_put_get_roundtrip_keeps_attributes() {
    let dir = tempdir().unwrap();
    let store = BarterStoreBuilder::new(dir.path()).open().unwrap();
    let pos = BlockPos::new(-12, 70, 300);
    let shop = sample_shop();

    store.put_shop("overworld", pos, &shop).unwrap();
    let loaded = store.get_shop("overworld", pos).unwrap();

    assert_eq!(loaded.owner_id(), shop.owner_id());
    assert_eq!(loaded.display_name(), "Ada's Tools");
    assert_eq!(loaded.total_earnings(), 27);
    assert_eq!(loaded.primary_listing(), shop.primary_listing());
    let tool = loaded.item_at_slot(0).unwrap();
    assert_eq!(tool.durability, Some(87));
    assert_eq!(tool.metadata.get("Enchant").map(String::as_str), Some("Swift"));
    assert!(!loaded.is_dirty());
}

#[test]
fn test_record_uses_pascal_case_fields() {
    let json = serde_json::to_value(sample_shop()).unwrap();
    assert_eq!(json["Custom"], serde_json::json!(true));
    assert_eq!(json["OwnerName"], serde_json::json!("Ada"));
    assert!(json.get("OwnerUUID").is_some());
    assert!(json.get("ItemContainer").is_some());
    assert_eq!(json["Listings"][0]["BuyPrice"], serde_json::json!(9));
    assert_eq!(json["TotalEarnings"], serde_json::json!(27));
}

#[test]
fn test_list_worlds_and_delete() {
    let dir = tempdir().unwrap();
    let store = BarterStoreBuilder::new(dir.path()).open().unwrap();
    let shop = sample_shop();
    store.put_shop("overworld", BlockPos::new(0, 64, 0), &shop).unwrap();
    store.put_shop("overworld", BlockPos::new(5, 64, 0), &shop).unwrap();
    store.put_shop("nether", BlockPos::new(1, 30, 1), &shop).unwrap();

    assert_eq!(store.list_worlds().unwrap(), vec!["nether".to_string(), "overworld".to_string()]);
    assert_eq!(store.list_shops("overworld").unwrap().len(), 2);

    assert!(store.delete_shop("overworld", BlockPos::new(0, 64, 0)).unwrap());
    assert!(!store.delete_shop("overworld", BlockPos::new(0, 64, 0)).unwrap());
    assert_eq!(store.list_shops("overworld").unwrap().len(), 1);
}

#[test]
fn test_save_and_load_world() {
    let dir = tempdir().unwrap();
    let store = BarterStoreBuilder::new(dir.path()).open().unwrap();
    let a = BlockPos::new(0, 64, 0);
    let b = BlockPos::new(8, 64, 0);

    let mut world = MemoryWorld::new("overworld");
    for pos in [a, b] {
        world.place_container(pos, "Furniture_Chest_Small", ItemContainer::new(3));
        world.replace_state(pos, BlockState::Shop(Box::new(sample_shop()))).unwrap();
    }

    let stats = store.save_world(&mut world).unwrap();
    assert_eq!((stats.written, stats.unchanged, stats.removed), (2, 0, 0));
    assert!(!world.shop(a).unwrap().is_dirty());

    let stats = store.save_world(&mut world).unwrap();
    assert_eq!((stats.written, stats.unchanged, stats.removed), (0, 2, 0));

    // Decommissioned shops disappear from the store on the next save.
    world.take_state(b);
    world.shop_mut(a).unwrap().add_earnings(3);
    let stats = store.save_world(&mut world).unwrap();
    assert_eq!((stats.written, stats.unchanged, stats.removed), (1, 0, 1));

    let mut fresh = MemoryWorld::new("overworld");
    fresh.place_container(a, "Furniture_Chest_Small", ItemContainer::new(3));
    assert_eq!(store.load_world(&mut fresh).unwrap(), 1);
    let restored = fresh.shop(a).unwrap();
    assert_eq!(restored.total_earnings(), 30);
    assert_eq!(restored.container().count("Gold_Bar"), 9);
}

#[test]
fn test_store_reopens_with_data() {
    let dir = tempdir().unwrap();
    let pos = BlockPos::new(1, 2, 3);
    {
        let store = BarterStoreBuilder::new(dir.path()).open().unwrap();
        store.put_shop("overworld", pos, &sample_shop()).unwrap();
        store.append_log("Ada sold 1x Tool_Pickaxe_Iron").unwrap();
    }
    let store = BarterStoreBuilder::new(dir.path()).open().unwrap();
    assert_eq!(store.get_shop("overworld", pos).unwrap().owner_name(), "Ada");
    assert_eq!(store.recent_logs(5).unwrap(), vec!["Ada sold 1x Tool_Pickaxe_Iron".to_string()]);
}

use boardgame_core::{AssociationKeys, Boardgame, Designer, Entity, Publisher};

#[test]
fn boardgame_serialization_uses_column_names() {
    let game = Boardgame::new("Gloomhaven", 2017)
        .with_publisher(3)
        .with_players(1, 4)
        .with_playing_time(120, 14)
        .with_pricing(140.0, 50_000, 35.5);

    let json = serde_json::to_value(&game).unwrap();
    for field in Boardgame::fields() {
        assert!(
            json.get(field.name).is_some(),
            "missing serialized field {}",
            field.name
        );
    }
    assert_eq!(json["id"], serde_json::Value::Null);
    assert_eq!(json["publisher_id"], 3);
    assert_eq!(json["title"], "Gloomhaven");

    let decoded: Boardgame = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, game);
}

#[test]
fn new_entities_start_without_identifier() {
    assert_eq!(Designer::new("Isaac", "Childres").id, None);
    assert_eq!(Publisher::new("Cephalofair Games").id, None);
    assert_eq!(Boardgame::new("Gloomhaven", 2017).id, None);
}

#[test]
fn association_keys_report_values_in_column_order() {
    let keys = AssociationKeys::new()
        .category("Adventure")
        .boardgame("Gloomhaven");

    assert_eq!(
        keys.values(),
        [Some("Gloomhaven"), None, None, None, Some("Adventure")]
    );
    assert!(!keys.is_empty());
    assert!(AssociationKeys::new().is_empty());
}

use super::*;

fn sample() -> CombinationCatalog {
    CombinationCatalog::from_scripts([
        ("drk_bottom_deck_passage_3.ahk", true),
        ("README.md", false),
        ("pal_bottom_deck_passage_3.ahk", false),
        ("nw_laboratory_behind_closed_door_3.ahk", false),
        ("nw_ludus_lake_12.ahk", false),
    ])
}

#[test]
fn keeps_discovery_order_and_skips_unparsable_names() {
    let ids: Vec<String> = sample().list().into_iter().map(|c| c.id.0).collect();
    assert_eq!(
        ids,
        vec![
            "drk_bottom_deck_passage_3",
            "nw_laboratory_behind_closed_door_3",
            "nw_ludus_lake_12",
        ]
    );
}

#[test]
fn resolve_returns_parsed_variants() {
    let catalog = sample();
    let entry = catalog
        .resolve(&CombinationId::new("drk_bottom_deck_passage_3"))
        .expect("entry");
    assert_eq!(entry.class, GameClass::DarkKnight);
    assert_eq!(entry.map, Some(KnownMap::BottomDeckPassage3));
    assert_eq!(entry.combination.class_name, "Dark Knight");
    assert_eq!(entry.combination.script_name, "drk_bottom_deck_passage_3.ahk");
    assert!(entry.combination.has_image);
}

#[test]
fn resolve_unknown_id_is_not_found() {
    let err = sample()
        .resolve(&CombinationId::new("pal_bottom_deck_passage_3"))
        .expect_err("should fail");
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[test]
fn duplicate_stems_keep_first_occurrence() {
    let catalog = CombinationCatalog::from_scripts([
        ("drk_bottom_deck_passage_3.ahk", false),
        ("drk_bottom_deck_passage_3.ahk", true),
    ]);
    assert_eq!(catalog.len(), 1);
    assert!(!catalog.list()[0].has_image);
}

use super::*;

#[test]
fn parses_known_class_and_map() {
    let parsed = parse_script_name("drk_bottom_deck_passage_3.ahk").expect("parsed");
    assert_eq!(parsed.stem, "drk_bottom_deck_passage_3");
    assert_eq!(parsed.class, GameClass::DarkKnight);
    assert_eq!(parsed.map, Some(KnownMap::BottomDeckPassage3));
    assert_eq!(parsed.map_name, "Bottom Deck Passage 3");
}

#[test]
fn unknown_map_gets_derived_name_and_no_route() {
    let parsed = parse_script_name("nw_ludus_lake_12.ahk").expect("parsed");
    assert_eq!(parsed.class, GameClass::NightWalker);
    assert_eq!(parsed.map, None);
    assert_eq!(parsed.map_name, "Ludus Lake 12");
}

#[test]
fn unknown_prefix_is_invisible() {
    assert!(parse_script_name("pal_bottom_deck_passage_3.ahk").is_none());
}

#[test]
fn malformed_names_are_rejected_quietly() {
    assert!(parse_script_name("drk.ahk").is_none());
    assert!(parse_script_name("drk_.ahk").is_none());
    assert!(parse_script_name("_bottom.ahk").is_none());
    assert!(parse_script_name("drk_bottom_deck_passage_3.txt").is_none());
}

#[test]
fn area_suffix_is_split_only_when_numeric() {
    assert_eq!(split_area("bottom_deck_passage_3"), ("bottom_deck_passage", Some(3)));
    assert_eq!(split_area("bottom_deck_passage"), ("bottom_deck_passage", None));
    assert_eq!(split_area("zone_3b"), ("zone_3b", None));
    assert_eq!(split_area("42"), ("42", None));
}

#[test]
fn unknown_prefix_still_has_a_display_name() {
    assert_eq!(class_display_name("pal"), "PAL");
    assert_eq!(class_display_name("nw"), "Night Walker");
}

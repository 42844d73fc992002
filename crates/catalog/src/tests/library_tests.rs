use super::*;

use std::time::Duration;

use shared::domain::CombinationId;
use tempfile::TempDir;

fn library() -> (TempDir, ScriptLibrary) {
    let root = tempfile::tempdir().expect("tempdir");
    let scripts = root.path().join("scripts");
    let images = root.path().join("images");
    fs::create_dir_all(scripts.join("old")).expect("scripts dir");
    fs::create_dir_all(&images).expect("images dir");
    let library = ScriptLibrary::new(scripts, images);
    (root, library)
}

fn write_script(library: &ScriptLibrary, name: &str, age_secs: u64) {
    let path = library.script_dir().join(name);
    fs::write(&path, "Send, {Space Down}\nSleep, 50\nSend, {Space Up}\n").expect("script");
    let modified = SystemTime::now() - Duration::from_secs(age_secs);
    fs::File::options()
        .write(true)
        .open(&path)
        .expect("open")
        .set_modified(modified)
        .expect("mtime");
}

#[test]
fn lists_scripts_newest_first_with_derived_names() {
    let (_root, library) = library();
    write_script(&library, "drk_bottom_deck_passage_3.ahk", 600);
    write_script(&library, "pal_sky_garden.ahk", 10);
    write_script(&library, "old/nw_ludus_lake_12.ahk", 0);
    fs::write(library.script_dir().join("notes.txt"), "skip").expect("notes");

    let scripts = library.list_scripts().expect("list");
    let names: Vec<&str> = scripts.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["pal_sky_garden.ahk", "drk_bottom_deck_passage_3.ahk"]);
    assert_eq!(scripts[0].class_name.as_deref(), Some("PAL"));
    assert_eq!(scripts[1].class_name.as_deref(), Some("Dark Knight"));
    assert_eq!(scripts[1].map_name.as_deref(), Some("Bottom Deck Passage 3"));
}

#[test]
fn catalog_marks_combinations_with_images() {
    let (_root, library) = library();
    write_script(&library, "nw_laboratory_behind_closed_door_3.ahk", 0);
    write_script(&library, "drk_bottom_deck_passage_3.ahk", 0);
    fs::write(
        library.images_dir().join("drk_bottom_deck_passage_3.png"),
        [0x89, b'P', b'N', b'G'],
    )
    .expect("image");

    let catalog = library.build_catalog().expect("catalog");
    let combos = catalog.list();
    assert_eq!(combos.len(), 2);
    assert_eq!(combos[0].id, CombinationId::new("drk_bottom_deck_passage_3"));
    assert!(combos[0].has_image);
    assert!(!combos[1].has_image);
}

#[test]
fn locate_rejects_traversal_and_missing_scripts() {
    let (_root, library) = library();
    write_script(&library, "drk_bottom_deck_passage_3.ahk", 0);

    assert!(library.locate("drk_bottom_deck_passage_3.ahk").is_some());
    assert!(library.locate("missing.ahk").is_none());
    assert!(library.locate("../scripts/drk_bottom_deck_passage_3.ahk").is_none());
    assert!(library.locate("old").is_none());
}

#[test]
fn find_image_strips_extension_and_reports_media_type() {
    let (_root, library) = library();
    fs::write(library.images_dir().join("nw_ludus_lake_12.webp"), b"RIFF").expect("image");

    let asset = library.find_image("nw_ludus_lake_12.ahk").expect("image");
    assert_eq!(asset.media_type, "image/webp");
    assert_eq!(asset.size_bytes, 4);

    let err = library.find_image("drk_nowhere").expect_err("missing");
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[test]
fn find_image_enforces_size_limit() {
    let (_root, library) = library();
    let library = library.with_max_image_bytes(2);
    fs::write(library.images_dir().join("drk_big.gif"), b"GIF89a").expect("image");

    let err = library.find_image("drk_big").expect_err("too large");
    assert!(matches!(err, CatalogError::TooLarge { .. }));
}

#[test]
fn media_type_defaults_to_jpeg() {
    assert_eq!(media_type("PNG"), "image/png");
    assert_eq!(media_type("tiff"), "image/jpeg");
}

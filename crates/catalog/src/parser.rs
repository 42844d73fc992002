//! Script-name parsing: `drk_bottom_deck_passage_3.ahk` is the Dark Knight
//! route for Bottom Deck Passage 3.

pub const SCRIPT_EXTENSION: &str = ".ahk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameClass {
    DarkKnight,
    NightWalker,
}

impl GameClass {
    pub const ALL: [GameClass; 2] = [GameClass::DarkKnight, GameClass::NightWalker];

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.prefix() == prefix)
    }

    pub fn prefix(self) -> &'static str {
        match self {
            GameClass::DarkKnight => "drk",
            GameClass::NightWalker => "nw",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GameClass::DarkKnight => "Dark Knight",
            GameClass::NightWalker => "Night Walker",
        }
    }
}

/// Maps that have hand-recorded navigation/positioning routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownMap {
    BottomDeckPassage3,
    LaboratoryBehindClosedDoor3,
}

impl KnownMap {
    pub const ALL: [KnownMap; 2] = [
        KnownMap::BottomDeckPassage3,
        KnownMap::LaboratoryBehindClosedDoor3,
    ];

    fn key(self) -> (&'static str, Option<u32>) {
        match self {
            KnownMap::BottomDeckPassage3 => ("bottom_deck_passage", Some(3)),
            KnownMap::LaboratoryBehindClosedDoor3 => ("laboratory_behind_closed_door", Some(3)),
        }
    }

    pub fn lookup(base: &str, area: Option<u32>) -> Option<Self> {
        Self::ALL.into_iter().find(|map| map.key() == (base, area))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            KnownMap::BottomDeckPassage3 => "Bottom Deck Passage 3",
            KnownMap::LaboratoryBehindClosedDoor3 => "Laboratory Behind Closed Door 3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    pub stem: String,
    pub class: GameClass,
    pub map_slug: String,
    pub map_name: String,
    pub map: Option<KnownMap>,
}

/// Splits a stem at the first underscore; `None` for names that are not
/// `.ahk` scripts or have an empty half.
pub fn split_script_name(script_name: &str) -> Option<(&str, &str)> {
    let stem = script_name.strip_suffix(SCRIPT_EXTENSION)?;
    let (prefix, map_slug) = stem.split_once('_')?;
    if prefix.is_empty() || map_slug.is_empty() {
        return None;
    }
    Some((prefix, map_slug))
}

/// Parses a script into a catalog-ready shape. Unknown class prefixes yield
/// `None` so the script simply stays out of the catalog.
pub fn parse_script_name(script_name: &str) -> Option<ParsedScript> {
    let (prefix, map_slug) = split_script_name(script_name)?;
    let class = GameClass::from_prefix(prefix)?;
    let (base, area) = split_area(map_slug);
    let map = KnownMap::lookup(base, area);
    let map_name = match map {
        Some(known) => known.display_name().to_string(),
        None => derive_map_name(map_slug),
    };
    Some(ParsedScript {
        stem: format!("{prefix}_{map_slug}"),
        class,
        map_slug: map_slug.to_string(),
        map_name,
        map,
    })
}

/// Strips a trailing `_<digits>` area suffix.
pub fn split_area(map_slug: &str) -> (&str, Option<u32>) {
    if let Some((base, suffix)) = map_slug.rsplit_once('_') {
        if !base.is_empty() && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(area) = suffix.parse() {
                return (base, Some(area));
            }
        }
    }
    (map_slug, None)
}

pub fn derive_map_name(map_slug: &str) -> String {
    map_slug
        .split('_')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name for any class prefix, including ones the catalog ignores.
pub fn class_display_name(prefix: &str) -> String {
    match GameClass::from_prefix(prefix) {
        Some(class) => class.display_name().to_string(),
        None => prefix.to_uppercase(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;

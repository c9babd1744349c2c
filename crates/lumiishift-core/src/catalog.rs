//! The fixed set of moods a user can pick from.
//!
//! Order matters: the UI lays moods out in a grid in exactly this order, so
//! the catalog keeps definition order and never sorts.

use std::collections::HashSet;
use std::fmt;

use crate::error::MoodError;

/// An sRGB color used for a mood's background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ThemeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Whether dark text reads better than light text on this color
    /// (relative luminance above the midpoint).
    pub fn is_light(&self) -> bool {
        let luminance =
            0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b);
        luminance > 140.0
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One selectable emotional state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodEntry {
    pub id: &'static str,
    pub theme_color: ThemeColor,
    pub acknowledgment: &'static str,
    pub icon: &'static str,
}

impl MoodEntry {
    /// Title-cased label, e.g. `so_so` becomes `So So`.
    pub fn display_name(&self) -> String {
        self.id
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const fn mood(
    id: &'static str,
    theme_color: ThemeColor,
    acknowledgment: &'static str,
    icon: &'static str,
) -> MoodEntry {
    MoodEntry {
        id,
        theme_color,
        acknowledgment,
        icon,
    }
}

const STANDARD_MOODS: &[MoodEntry] = &[
    mood("happy", ThemeColor::rgb(0xFF, 0xD7, 0x00), "You're glowing with happiness!", "😊"),
    mood("excited", ThemeColor::rgb(0xFF, 0x8C, 0x00), "Your excitement is contagious!", "🤩"),
    mood("overjoyed", ThemeColor::rgb(0xFF, 0x69, 0xB4), "Pure joy is radiating from you!", "🥳"),
    mood("joyful", ThemeColor::rgb(0xFF, 0xA5, 0x00), "What a joyful spirit you have!", "😄"),
    mood("grateful", ThemeColor::rgb(0xDA, 0xA5, 0x20), "Gratitude looks beautiful on you.", "🙏"),
    mood("calm", ThemeColor::rgb(0x87, 0xCE, 0xEB), "Enjoy this calm, steady moment.", "😌"),
    mood("peaceful", ThemeColor::rgb(0x98, 0xFB, 0x98), "Peace suits you wonderfully.", "🕊️"),
    mood("relaxed", ThemeColor::rgb(0xAF, 0xEE, 0xEE), "Nice and relaxed, just breathe.", "🧘"),
    mood("hopeful", ThemeColor::rgb(0x7F, 0xFF, 0xD4), "Hold on to that hope.", "🌱"),
    mood("content", ThemeColor::rgb(0xF5, 0xDE, 0xB3), "Contentment is a quiet gift.", "🙂"),
    mood("tired", ThemeColor::rgb(0x70, 0x80, 0x90), "Rest is part of the journey.", "😴"),
    mood("bored", ThemeColor::rgb(0xA9, 0xA9, 0xA9), "Maybe it's time for something new.", "😐"),
    mood("confused", ThemeColor::rgb(0x93, 0x70, 0xDB), "It's okay not to have all the answers.", "😕"),
    mood("lonely", ThemeColor::rgb(0x64, 0x95, 0xED), "You are not alone in this.", "🫂"),
    mood("sad", ThemeColor::rgb(0x41, 0x69, 0xE1), "It's okay to feel sad sometimes.", "😢"),
    mood("anxious", ThemeColor::rgb(0xBA, 0x55, 0xD3), "Take a slow, deep breath.", "😰"),
    mood("stressed", ThemeColor::rgb(0xCD, 0x5C, 0x5C), "One step at a time, you've got this.", "😣"),
    mood("nervous", ThemeColor::rgb(0xDD, 0xA0, 0xDD), "Nerves mean you care.", "😬"),
    mood("frustrated", ThemeColor::rgb(0xFF, 0x63, 0x47), "Frustration passes, you'll find a way.", "😤"),
    mood("angry", ThemeColor::rgb(0xDC, 0x14, 0x3C), "Your feelings are valid, let them out safely.", "😠"),
];

/// Immutable mood catalog, read-only for the lifetime of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodCatalog {
    entries: Vec<MoodEntry>,
}

impl MoodCatalog {
    /// Build a catalog from custom entries, rejecting duplicate ids.
    pub fn new(entries: Vec<MoodEntry>) -> Result<Self, MoodError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(MoodError::DuplicateMood(entry.id.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in catalog shipped with the app.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_MOODS.to_vec(),
        }
    }

    pub fn lookup(&self, id: &str) -> Result<&MoodEntry, MoodError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| MoodError::UnknownMood(id.to_string()))
    }

    /// Entry at a grid position.
    pub fn get(&self, index: usize) -> Option<&MoodEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoodEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MoodCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a MoodCatalog {
    type Item = &'a MoodEntry;
    type IntoIter = std::slice::Iter<'a, MoodEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trips_every_id() {
        let catalog = MoodCatalog::standard();
        for entry in &catalog {
            let found = catalog.lookup(entry.id).unwrap();
            assert_eq!(found.id, entry.id);
        }
    }

    #[test]
    fn test_lookup_unknown_mood_fails() {
        let catalog = MoodCatalog::standard();
        assert_eq!(
            catalog.lookup("melancholic"),
            Err(MoodError::UnknownMood("melancholic".to_string()))
        );
        // Lookup is exact, no case folding or trimming
        assert!(catalog.lookup("Happy").is_err());
        assert!(catalog.lookup(" happy").is_err());
        assert!(catalog.lookup("").is_err());
    }

    #[test]
    fn test_iteration_keeps_definition_order() {
        let catalog = MoodCatalog::standard();
        let first: Vec<&str> = catalog.ids().collect();
        let second: Vec<&str> = catalog.ids().collect();
        assert_eq!(first, second);

        assert_eq!(
            &first[..8],
            &["happy", "excited", "overjoyed", "joyful", "grateful", "calm", "peaceful", "relaxed"]
        );

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_ne!(first, sorted, "catalog must not be alphabetized");
    }

    #[test]
    fn test_custom_catalog_keeps_given_order() {
        let entries = vec![
            mood("zen", ThemeColor::rgb(1, 2, 3), "Zen.", "🧘"),
            mood("alert", ThemeColor::rgb(4, 5, 6), "Alert.", "👀"),
        ];
        let catalog = MoodCatalog::new(entries).unwrap();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(ids, vec!["zen", "alert"]);
        assert_eq!(catalog.get(1).map(|e| e.id), Some("alert"));
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let entries = vec![
            mood("happy", ThemeColor::rgb(0, 0, 0), "One.", "1"),
            mood("happy", ThemeColor::rgb(1, 1, 1), "Two.", "2"),
        ];
        assert_eq!(
            MoodCatalog::new(entries),
            Err(MoodError::DuplicateMood("happy".to_string()))
        );
    }

    #[test]
    fn test_standard_ids_unique_and_lowercase() {
        let catalog = MoodCatalog::standard();
        assert!(MoodCatalog::new(catalog.iter().copied().collect()).is_ok());
        for id in catalog.ids() {
            assert!(!id.is_empty());
            assert!(id.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{id}");
        }
    }

    #[test]
    fn test_every_entry_has_icon_and_acknowledgment() {
        for entry in MoodCatalog::standard().iter() {
            assert!(!entry.icon.is_empty(), "{} has no icon", entry.id);
            assert!(!entry.acknowledgment.is_empty(), "{} has no acknowledgment", entry.id);
        }
    }

    #[test]
    fn test_display_name() {
        let entry = mood("so_so", ThemeColor::rgb(0, 0, 0), "Meh.", "😐");
        assert_eq!(entry.display_name(), "So So");
        let catalog = MoodCatalog::standard();
        assert_eq!(catalog.lookup("overjoyed").unwrap().display_name(), "Overjoyed");
    }

    #[test]
    fn test_theme_color_hex_and_contrast() {
        let gold = ThemeColor::rgb(0xFF, 0xD7, 0x00);
        assert_eq!(gold.to_string(), "#FFD700");
        assert!(gold.is_light());
        assert!(!ThemeColor::rgb(0x41, 0x69, 0xE1).is_light());
    }
}

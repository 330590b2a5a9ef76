//! Test fixtures loader for JSON character records.
//!
//! Records live in the `test_data/` directory of this crate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::characters;
//!
//! #[test]
//! fn wizard_has_slots() {
//!     let record = characters::wizard_5();
//!     // ... test logic
//! }
//! ```

use std::path::PathBuf;

/// Load a JSON fixture from test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

/// Pre-built character records for testing.
pub mod characters {
    use super::*;
    use sheetport_domain::CharacterRecord;

    /// Elara Moonwhisper, Wizard 5 (Evocation).
    ///
    /// - High Elf, Sage
    /// - INT 18, STR 8
    /// - Proficient in Arcana, History, Investigation
    pub fn wizard_5() -> CharacterRecord {
        load_fixture("characters/wizard_5.json")
    }

    /// Quill Ashgrave, Warlock 3 (Fiend) / Sorcerer 3 (Draconic).
    ///
    /// - String id
    /// - Pact slots alongside a shared pool
    /// - Rare magic ring, ranged weapon, expertise in Persuasion
    pub fn warlock_sorcerer() -> CharacterRecord {
        load_fixture("characters/warlock_sorcerer.json")
    }

    /// Kael Stormborn, Fighter 3 (Eldritch Knight) / Wizard 2.
    ///
    /// - Chain mail and shield, versatile longsword
    /// - One homebrew feat
    pub fn fighter_wizard() -> CharacterRecord {
        load_fixture("characters/fighter_wizard.json")
    }

    /// Brakka, Fighter 5 with no subclass and only three ability scores.
    pub fn unclassified_fighter() -> CharacterRecord {
        load_fixture("characters/unclassified_fighter.json")
    }

    /// Record without a name; fails conversion preconditions.
    pub fn nameless() -> CharacterRecord {
        load_fixture("characters/nameless.json")
    }

    /// Every convertible fixture.
    pub fn all() -> Vec<CharacterRecord> {
        vec![
            wizard_5(),
            warlock_sorcerer(),
            fighter_wizard(),
            unclassified_fighter(),
        ]
    }
}

//! Character record - the normalized input the rules engine works on.
//!
//! These types mirror the character JSON handed over by the fetch layer
//! (camelCase keys, nested `definition` objects). Every collection defaults
//! to empty so partial records still parse; structural requirements are
//! checked separately by [`CharacterRecord::validate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::DomainError;
use crate::game_systems::{ClassInfo, ClassKind, MAX_CLASS_LEVEL};
use crate::value_objects::{Ability, AbilityScores, ProficiencyLevel};

/// Record ids arrive as numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// A text id that is empty or whitespace counts as missing.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// `{ "definition": { "name": ... } }` wrapper used for feats, traits, features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRef {
    pub definition: NamedDefinition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_homebrew: bool,
    /// Class features only: level the feature is gained at
    #[serde(default)]
    pub required_level: Option<i32>,
}

/// One ability score entry (`id` 1..=6, STR..CHA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub id: u8,
    #[serde(default)]
    pub value: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_homebrew: bool,
}

/// One class entry of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterClass {
    #[serde(default)]
    pub definition: ClassDefinition,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub subclass_definition: Option<NamedDefinition>,
    #[serde(default)]
    pub class_features: Vec<DefinitionRef>,
    #[serde(default)]
    pub is_starting_class: bool,
}

impl CharacterClass {
    /// Canonicalize into a [`ClassInfo`].
    pub fn to_class_info(&self) -> ClassInfo {
        ClassInfo::new(self.definition.name.clone(), self.level).with_optional_subclass(
            self.subclass_definition
                .as_ref()
                .map(|s| s.name.as_str()),
        )
    }

    pub fn is_homebrew(&self) -> bool {
        self.definition.is_homebrew
            || self
                .subclass_definition
                .as_ref()
                .is_some_and(|s| s.is_homebrew)
    }
}

/// Broad item category derived from the record's `filterType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Potion,
    Ring,
    Rod,
    Scroll,
    Staff,
    Wand,
    WondrousItem,
    Gear,
}

impl ItemKind {
    pub fn from_filter_type(filter_type: &str) -> Self {
        match filter_type.trim().to_lowercase().as_str() {
            "weapon" => Self::Weapon,
            "armor" => Self::Armor,
            "potion" => Self::Potion,
            "ring" => Self::Ring,
            "rod" => Self::Rod,
            "scroll" => Self::Scroll,
            "staff" => Self::Staff,
            "wand" => Self::Wand,
            "wondrous item" | "wondrous_item" => Self::WondrousItem,
            _ => Self::Gear,
        }
    }
}

/// Weapon damage as given by the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageDice {
    pub dice_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProperty {
    pub name: String,
}

/// Attack type code used by records: 1 melee, 2 ranged.
pub const ATTACK_TYPE_RANGED: u8 = 2;

/// Armor type code used by records: 1 light, 2 medium, 3 heavy, 4 shield.
pub const ARMOR_TYPE_SHIELD: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filter_type: String,
    #[serde(default)]
    pub magic: bool,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub is_homebrew: bool,
    #[serde(default)]
    pub properties: Vec<ItemProperty>,
    #[serde(default)]
    pub attack_type: Option<u8>,
    #[serde(default)]
    pub damage: Option<DamageDice>,
    #[serde(default)]
    pub damage_type: Option<String>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub armor_type_id: Option<u8>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Weapon properties that need more than a plain attack row to represent.
const COMPLEX_WEAPON_PROPERTIES: &[&str] = &["versatile", "two-handed", "special"];

impl ItemDefinition {
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_filter_type(&self.filter_type)
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.name.trim().eq_ignore_ascii_case(property))
    }

    pub fn is_ranged(&self) -> bool {
        self.attack_type == Some(ATTACK_TYPE_RANGED)
    }

    pub fn is_shield(&self) -> bool {
        self.armor_type_id == Some(ARMOR_TYPE_SHIELD)
    }

    /// Non-Common rarity or an explicit magic flag.
    pub fn is_magic(&self) -> bool {
        self.magic
            || self
                .rarity
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty() && !r.trim().eq_ignore_ascii_case("common"))
    }

    /// Magic, ranged, or carrying a versatile/two-handed/special property.
    pub fn has_complex_traits(&self) -> bool {
        self.is_magic()
            || self.is_ranged()
            || COMPLEX_WEAPON_PROPERTIES
                .iter()
                .any(|p| self.has_property(p))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default)]
    pub definition: ItemDefinition,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub equipped: bool,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceEntry {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_homebrew: bool,
    #[serde(default)]
    pub racial_traits: Vec<DefinitionRef>,
}

/// One proficiency grant from the `modifiers` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyGrant {
    #[serde(rename = "type")]
    pub grant_type: String,
    pub sub_type: String,
}

/// Modifier category keys used by records.
pub const SKILL_MODIFIERS: &str = "skill";
pub const SAVING_THROW_MODIFIERS: &str = "savingThrow";

/// A character record as supplied by the fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub feats: Vec<DefinitionRef>,
    #[serde(default)]
    pub race: Option<RaceEntry>,
    #[serde(default)]
    pub background: Option<DefinitionRef>,
    #[serde(default)]
    pub modifiers: BTreeMap<String, Vec<ProficiencyGrant>>,
    #[serde(default)]
    pub base_hit_points: Option<i32>,
    #[serde(default)]
    pub bonus_hit_points: Option<i32>,
    #[serde(default)]
    pub current_xp: Option<i32>,
    #[serde(default)]
    pub alignment: Option<String>,
}

impl CharacterRecord {
    /// Parse a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Display name, empty when missing.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Structural precondition for conversion: an id, a name and at least
    /// one ability score.
    pub fn validate(&self) -> Result<(), DomainError> {
        match &self.id {
            None => return Err(DomainError::missing_field("id")),
            Some(id) if id.is_blank() => {
                return Err(DomainError::validation("Character id is empty"))
            }
            Some(_) => {}
        }
        if self.name.is_none() {
            return Err(DomainError::missing_field("name"));
        }
        if self.display_name().is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        if self.ability_scores().is_empty() {
            return Err(DomainError::validation(
                "Character has no ability scores",
            ));
        }
        Ok(())
    }

    /// Ability scores keyed by the record's stat ids. Unknown ids are ignored.
    pub fn ability_scores(&self) -> AbilityScores {
        let mut scores = AbilityScores::new();
        for stat in &self.stats {
            if let (Some(ability), Some(value)) = (Ability::from_source_id(stat.id), stat.value) {
                scores.set(ability, value);
            }
        }
        scores
    }

    /// Canonicalized class entries.
    pub fn class_infos(&self) -> Vec<ClassInfo> {
        self.classes.iter().map(CharacterClass::to_class_info).collect()
    }

    /// Sum of class levels, clamped to 1..=20 for rules lookups.
    ///
    /// Each entry is clamped before adding, so absurd levels cannot overflow.
    pub fn total_level(&self) -> u8 {
        let total: u32 = self
            .classes
            .iter()
            .map(|c| u32::from(c.to_class_info().clamped_level()))
            .sum();
        total.clamp(1, u32::from(MAX_CLASS_LEVEL)) as u8
    }

    /// Grants in a modifier category.
    pub fn grants(&self, category: &str) -> &[ProficiencyGrant] {
        self.modifiers
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Best proficiency granted for a sub type slug in a category.
    pub fn proficiency_for(&self, category: &str, sub_type: &str) -> ProficiencyLevel {
        self.grants(category)
            .iter()
            .filter(|g| g.sub_type.trim().eq_ignore_ascii_case(sub_type))
            .filter_map(|g| ProficiencyLevel::from_grant_type(&g.grant_type))
            .max()
            .unwrap_or_default()
    }

    /// Whether the saving throw for `ability` is proficient, from grants
    /// ("dexterity-saving-throws") or the starting class.
    pub fn has_saving_throw_proficiency(&self, ability: Ability) -> bool {
        let prefix = ability.display_name().to_lowercase();
        let granted = self.grants(SAVING_THROW_MODIFIERS).iter().any(|g| {
            let sub = g.sub_type.trim().to_lowercase();
            (sub.starts_with(&prefix) || sub == ability.key())
                && ProficiencyLevel::from_grant_type(&g.grant_type).is_some()
        });
        granted || self.starting_class_saves().contains(&ability)
    }

    fn starting_class_saves(&self) -> &'static [Ability] {
        let starting = self
            .classes
            .iter()
            .find(|c| c.is_starting_class)
            .or_else(|| self.classes.first());
        starting
            .map(|c| ClassKind::from_name(&c.definition.name).saving_throws())
            .unwrap_or_default()
    }

    pub fn weapons(&self) -> impl Iterator<Item = &InventoryItem> {
        self.inventory
            .iter()
            .filter(|i| i.definition.kind() == ItemKind::Weapon)
    }

    pub fn armor(&self) -> impl Iterator<Item = &InventoryItem> {
        self.inventory
            .iter()
            .filter(|i| i.definition.kind() == ItemKind::Armor)
    }

    pub fn magic_items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.inventory.iter().filter(|i| i.definition.is_magic())
    }

    /// All class features across classes.
    pub fn class_features(&self) -> impl Iterator<Item = &NamedDefinition> {
        self.classes
            .iter()
            .flat_map(|c| c.class_features.iter().map(|f| &f.definition))
    }

    pub fn racial_traits(&self) -> impl Iterator<Item = &NamedDefinition> {
        self.race
            .iter()
            .flat_map(|r| r.racial_traits.iter().map(|t| &t.definition))
    }

    pub fn race_name(&self) -> Option<&str> {
        self.race
            .as_ref()
            .map(|r| r.full_name.trim())
            .filter(|n| !n.is_empty())
    }

    pub fn background_name(&self) -> Option<&str> {
        self.background
            .as_ref()
            .map(|b| b.definition.name.trim())
            .filter(|n| !n.is_empty())
    }

    /// Any class, subclass, race, feat or item flagged as homebrew.
    pub fn has_homebrew_content(&self) -> bool {
        self.classes.iter().any(CharacterClass::is_homebrew)
            || self.race.as_ref().is_some_and(|r| r.is_homebrew)
            || self.feats.iter().any(|f| f.definition.is_homebrew)
            || self.inventory.iter().any(|i| i.definition.is_homebrew)
    }
}

//! Feature extraction: which representable capabilities a character uses,
//! and how hard each one is to carry into another schema.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{CharacterRecord, SAVING_THROW_MODIFIERS, SKILL_MODIFIERS};
use crate::game_systems::{effective_caster_level, CasterType, ClassInfo};
use crate::value_objects::ProficiencyLevel;

/// Weighting bucket of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Basic,
    Spells,
    Equipment,
    Features,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

/// Named capability a character may use and an export format may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Abilities,
    Skills,
    SavingThrows,
    Spellcasting,
    Weapons,
    Armor,
    MagicItems,
    ClassFeatures,
    RacialTraits,
    Feats,
    HomebrewContent,
}

impl Feature {
    /// Every feature, in analysis order.
    pub const ALL: [Feature; 11] = [
        Self::Abilities,
        Self::Skills,
        Self::SavingThrows,
        Self::Spellcasting,
        Self::Weapons,
        Self::Armor,
        Self::MagicItems,
        Self::ClassFeatures,
        Self::RacialTraits,
        Self::Feats,
        Self::HomebrewContent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abilities => "abilities",
            Self::Skills => "skills",
            Self::SavingThrows => "saving_throws",
            Self::Spellcasting => "spellcasting",
            Self::Weapons => "weapons",
            Self::Armor => "armor",
            Self::MagicItems => "magic_items",
            Self::ClassFeatures => "class_features",
            Self::RacialTraits => "racial_traits",
            Self::Feats => "feats",
            Self::HomebrewContent => "homebrew_content",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Abilities => "Ability scores",
            Self::Skills => "Skills",
            Self::SavingThrows => "Saving throws",
            Self::Spellcasting => "Spellcasting",
            Self::Weapons => "Weapons",
            Self::Armor => "Armor",
            Self::MagicItems => "Magic items",
            Self::ClassFeatures => "Class features",
            Self::RacialTraits => "Racial traits",
            Self::Feats => "Feats",
            Self::HomebrewContent => "Homebrew content",
        }
    }

    pub fn category(&self) -> FeatureCategory {
        match self {
            Self::Abilities | Self::Skills | Self::SavingThrows => FeatureCategory::Basic,
            Self::Spellcasting => FeatureCategory::Spells,
            Self::Weapons | Self::Armor | Self::MagicItems => FeatureCategory::Equipment,
            Self::ClassFeatures | Self::RacialTraits | Self::Feats => FeatureCategory::Features,
            Self::HomebrewContent => FeatureCategory::Custom,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a feature is used by the character and how complex it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAnalysis {
    pub category: FeatureCategory,
    pub feature: Feature,
    pub present: bool,
    pub complexity: Complexity,
}

impl FeatureAnalysis {
    pub fn new(feature: Feature, present: bool, complexity: Complexity) -> Self {
        Self {
            category: feature.category(),
            feature,
            present,
            complexity,
        }
    }
}

/// Character-wide facts that make a conversion harder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityProfile {
    pub has_multiclass: bool,
    pub has_homebrew_content: bool,
    pub has_pact_magic: bool,
    pub has_multiple_spellcasting_classes: bool,
    pub spellcasting_class_count: usize,
    pub weapon_count: usize,
    pub magic_item_count: usize,
}

/// Above this many weapons the weapon list counts as moderate.
const MODERATE_WEAPON_COUNT: usize = 3;
/// Above this many magic items the item list counts as complex.
const COMPLEX_MAGIC_ITEM_COUNT: usize = 5;

/// Whether a class actually casts at its level.
fn grants_spellcasting(class: &ClassInfo) -> bool {
    match class.caster_type() {
        CasterType::Pact => class.clamped_level() > 0,
        caster_type => {
            effective_caster_level(caster_type, class.kind(), class.clamped_level()) > 0
        }
    }
}

pub fn complexity_profile(record: &CharacterRecord) -> ComplexityProfile {
    let classes = record.class_infos();
    let casting: Vec<&ClassInfo> = classes.iter().filter(|c| grants_spellcasting(c)).collect();
    let has_pact_magic = casting.iter().any(|c| c.caster_type() == CasterType::Pact);
    // Warlock entries share one pact pool
    let spellcasting_class_count = casting
        .iter()
        .filter(|c| c.caster_type() != CasterType::Pact)
        .count()
        + usize::from(has_pact_magic);

    ComplexityProfile {
        has_multiclass: classes.len() > 1,
        has_homebrew_content: record.has_homebrew_content(),
        has_pact_magic,
        has_multiple_spellcasting_classes: spellcasting_class_count > 1,
        spellcasting_class_count,
        weapon_count: record.weapons().count(),
        magic_item_count: record.magic_items().count(),
    }
}

/// Inspect a record for every [`Feature`], in [`Feature::ALL`] order.
pub fn analyze_features(record: &CharacterRecord) -> Vec<FeatureAnalysis> {
    let profile = complexity_profile(record);

    Feature::ALL
        .iter()
        .map(|&feature| {
            let (present, complexity) = match feature {
                Feature::Abilities => (!record.ability_scores().is_empty(), Complexity::Simple),
                Feature::Skills => {
                    let grants = record.grants(SKILL_MODIFIERS);
                    let beyond_proficient = grants.iter().any(|g| {
                        matches!(
                            ProficiencyLevel::from_grant_type(&g.grant_type),
                            Some(ProficiencyLevel::Expert | ProficiencyLevel::Half)
                        )
                    });
                    let complexity = if beyond_proficient {
                        Complexity::Moderate
                    } else {
                        Complexity::Simple
                    };
                    (!grants.is_empty(), complexity)
                }
                Feature::SavingThrows => {
                    let present = !record.classes.is_empty()
                        || !record.grants(SAVING_THROW_MODIFIERS).is_empty();
                    (present, Complexity::Simple)
                }
                Feature::Spellcasting => {
                    let complexity = if profile.has_multiple_spellcasting_classes
                        || profile.has_pact_magic
                    {
                        Complexity::Complex
                    } else {
                        Complexity::Moderate
                    };
                    (profile.spellcasting_class_count > 0, complexity)
                }
                Feature::Weapons => {
                    let complexity = if record
                        .weapons()
                        .any(|w| w.definition.has_complex_traits())
                    {
                        Complexity::Complex
                    } else if profile.weapon_count > MODERATE_WEAPON_COUNT {
                        Complexity::Moderate
                    } else {
                        Complexity::Simple
                    };
                    (profile.weapon_count > 0, complexity)
                }
                Feature::Armor => (record.armor().next().is_some(), Complexity::Simple),
                Feature::MagicItems => {
                    let complexity = if profile.magic_item_count > COMPLEX_MAGIC_ITEM_COUNT {
                        Complexity::Complex
                    } else {
                        Complexity::Moderate
                    };
                    (profile.magic_item_count > 0, complexity)
                }
                Feature::ClassFeatures => {
                    let complexity = if profile.has_multiclass {
                        Complexity::Complex
                    } else {
                        Complexity::Moderate
                    };
                    (record.class_features().next().is_some(), complexity)
                }
                Feature::RacialTraits => {
                    (record.racial_traits().next().is_some(), Complexity::Simple)
                }
                Feature::Feats => (!record.feats.is_empty(), Complexity::Simple),
                Feature::HomebrewContent => (profile.has_homebrew_content, Complexity::Complex),
            };
            FeatureAnalysis::new(feature, present, complexity)
        })
        .collect()
}

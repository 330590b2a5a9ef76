//! D&D 5th Edition derived statistics.
//!
//! Everything an export schema needs beyond the raw record: proficiency
//! bonus, skill and save modifiers, hit points, armor class, spellcasting
//! numbers and the spell slot pools.

use serde::Serialize;

use super::classes::{ClassInfo, ClassKind};
use super::spell_slots::{calculate_spell_slots, SpellSlotResult};
use crate::entities::{CharacterRecord, SKILL_MODIFIERS};
use crate::value_objects::{Ability, AbilityScores, ProficiencyLevel};

/// XP thresholds for each level in D&D 5e.
/// Index is level - 1 (so level 1 = index 0).
const XP_THRESHOLDS: [i32; 20] = [
    0,      // Level 1
    300,    // Level 2
    900,    // Level 3
    2700,   // Level 4
    6500,   // Level 5
    14000,  // Level 6
    23000,  // Level 7
    34000,  // Level 8
    48000,  // Level 9
    64000,  // Level 10
    85000,  // Level 11
    100000, // Level 12
    120000, // Level 13
    140000, // Level 14
    165000, // Level 15
    195000, // Level 16
    225000, // Level 17
    265000, // Level 18
    305000, // Level 19
    355000, // Level 20
];

/// Get XP required for the next level.
pub fn xp_for_next_level(current_level: u8) -> i32 {
    if current_level >= 20 {
        return XP_THRESHOLDS[19]; // Max level
    }
    XP_THRESHOLDS[current_level as usize]
}

/// Proficiency bonus for a total character level: ((level - 1) / 4) + 2.
pub fn proficiency_bonus(level: u8) -> i32 {
    ((level.clamp(1, 20) as i32 - 1) / 4) + 2
}

/// The eighteen 5e skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Self::Acrobatics,
        Self::AnimalHandling,
        Self::Arcana,
        Self::Athletics,
        Self::Deception,
        Self::History,
        Self::Insight,
        Self::Intimidation,
        Self::Investigation,
        Self::Medicine,
        Self::Nature,
        Self::Perception,
        Self::Performance,
        Self::Persuasion,
        Self::Religion,
        Self::SleightOfHand,
        Self::Stealth,
        Self::Survival,
    ];

    /// Record `subType` slug ("sleight-of-hand").
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Acrobatics => "acrobatics",
            Self::AnimalHandling => "animal-handling",
            Self::Arcana => "arcana",
            Self::Athletics => "athletics",
            Self::Deception => "deception",
            Self::History => "history",
            Self::Insight => "insight",
            Self::Intimidation => "intimidation",
            Self::Investigation => "investigation",
            Self::Medicine => "medicine",
            Self::Nature => "nature",
            Self::Perception => "perception",
            Self::Performance => "performance",
            Self::Persuasion => "persuasion",
            Self::Religion => "religion",
            Self::SleightOfHand => "sleight-of-hand",
            Self::Stealth => "stealth",
            Self::Survival => "survival",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Acrobatics => "Acrobatics",
            Self::AnimalHandling => "Animal Handling",
            Self::Arcana => "Arcana",
            Self::Athletics => "Athletics",
            Self::Deception => "Deception",
            Self::History => "History",
            Self::Insight => "Insight",
            Self::Intimidation => "Intimidation",
            Self::Investigation => "Investigation",
            Self::Medicine => "Medicine",
            Self::Nature => "Nature",
            Self::Perception => "Perception",
            Self::Performance => "Performance",
            Self::Persuasion => "Persuasion",
            Self::Religion => "Religion",
            Self::SleightOfHand => "Sleight of Hand",
            Self::Stealth => "Stealth",
            Self::Survival => "Survival",
        }
    }

    /// Governing ability.
    pub fn ability(&self) -> Ability {
        match self {
            Self::Athletics => Ability::Str,
            Self::Acrobatics | Self::SleightOfHand | Self::Stealth => Ability::Dex,
            Self::Arcana | Self::History | Self::Investigation | Self::Nature | Self::Religion => {
                Ability::Int
            }
            Self::AnimalHandling
            | Self::Insight
            | Self::Medicine
            | Self::Perception
            | Self::Survival => Ability::Wis,
            Self::Deception | Self::Intimidation | Self::Performance | Self::Persuasion => {
                Ability::Cha
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillValue {
    pub skill: Skill,
    pub proficiency: ProficiencyLevel,
    pub modifier: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingThrowValue {
    pub ability: Ability,
    pub proficient: bool,
    pub modifier: i32,
}

/// Spellcasting numbers for one casting class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellcastingStats {
    pub class_name: String,
    pub ability: Ability,
    pub save_dc: i32,
    pub attack_bonus: i32,
}

/// Spell save DC: 8 + proficiency + casting ability modifier.
pub fn spell_save_dc(scores: &AbilityScores, ability: Ability, proficiency_bonus: i32) -> i32 {
    8 + proficiency_bonus + scores.modifier(ability)
}

/// Spell attack bonus: proficiency + casting ability modifier.
pub fn spell_attack_bonus(scores: &AbilityScores, ability: Ability, proficiency_bonus: i32) -> i32 {
    proficiency_bonus + scores.modifier(ability)
}

/// Max HP from hit dice: the starting class's first level takes the full die,
/// every later level the rounded-up average. CON applies per level.
pub fn hit_dice_max_hp(classes: &[ClassInfo], starting: Option<ClassKind>, con_mod: i32) -> i32 {
    let mut total: i32 = 0;
    let mut first_taken = false;

    for class in classes {
        let die = class.kind().hit_die() as i32;
        let avg = (die / 2) + 1;
        let mut levels = class.clamped_level() as i32;
        if levels == 0 {
            continue;
        }
        let is_starting = starting.map_or(true, |k| k == class.kind());
        if !first_taken && is_starting {
            total = total.saturating_add(die.saturating_add(con_mod));
            levels -= 1;
            first_taken = true;
        }
        total = total.saturating_add(levels.saturating_mul(avg.saturating_add(con_mod)));
    }

    total.max(1)
}

/// Armor class from equipped gear.
///
/// Light armor adds full DEX, medium caps it at +2, heavy ignores it;
/// unarmored is 10 + DEX. An equipped shield adds its bonus (default 2).
pub fn armor_class(record: &CharacterRecord, scores: &AbilityScores) -> i32 {
    let dex_mod = scores.modifier(Ability::Dex);
    let equipped: Vec<_> = record.armor().filter(|i| i.equipped).collect();

    let body = equipped
        .iter()
        .map(|i| &i.definition)
        .find(|d| !d.is_shield() && d.armor_class.is_some());
    let base = match body {
        Some(armor) => {
            let ac = armor.armor_class.unwrap_or(10);
            match armor.armor_type_id {
                Some(2) => ac.saturating_add(dex_mod.min(2)),
                Some(3) => ac,
                _ => ac.saturating_add(dex_mod),
            }
        }
        None => dex_mod.saturating_add(10),
    };

    let shield = equipped
        .iter()
        .map(|i| &i.definition)
        .find(|d| d.is_shield())
        .map(|d| d.armor_class.unwrap_or(2))
        .unwrap_or(0);

    base.saturating_add(shield)
}

/// Everything derived from a record that export schemas need.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub level: u8,
    pub proficiency_bonus: i32,
    pub abilities: AbilityScores,
    pub max_hit_points: i32,
    pub armor_class: i32,
    pub initiative: i32,
    pub passive_perception: i32,
    pub skills: Vec<SkillValue>,
    pub saving_throws: Vec<SavingThrowValue>,
    pub spellcasting: Vec<SpellcastingStats>,
    pub spell_slots: SpellSlotResult,
}

impl DerivedStats {
    pub fn from_record(record: &CharacterRecord) -> Self {
        let abilities = record.ability_scores();
        let classes = record.class_infos();
        let level = record.total_level();
        let prof = proficiency_bonus(level);

        let skills: Vec<SkillValue> = Skill::ALL
            .iter()
            .map(|&skill| {
                let proficiency = record.proficiency_for(SKILL_MODIFIERS, skill.slug());
                SkillValue {
                    skill,
                    proficiency,
                    modifier: abilities.modifier(skill.ability()) + proficiency.apply(prof),
                }
            })
            .collect();

        let saving_throws = Ability::ALL
            .iter()
            .map(|&ability| {
                let proficient = record.has_saving_throw_proficiency(ability);
                SavingThrowValue {
                    ability,
                    proficient,
                    modifier: abilities.modifier(ability) + if proficient { prof } else { 0 },
                }
            })
            .collect();

        let spellcasting = classes
            .iter()
            .filter_map(|class| {
                class.spellcasting_ability().map(|ability| SpellcastingStats {
                    class_name: class.name().to_string(),
                    ability,
                    save_dc: spell_save_dc(&abilities, ability, prof),
                    attack_bonus: spell_attack_bonus(&abilities, ability, prof),
                })
            })
            .collect();

        let perception = skills
            .iter()
            .find(|s| s.skill == Skill::Perception)
            .map_or(abilities.modifier(Ability::Wis), |s| s.modifier);

        let con_mod = abilities.modifier(Ability::Con);
        let bonus_hp = record.bonus_hit_points.unwrap_or(0);
        let max_hit_points = match record.base_hit_points {
            Some(base) => base
                .saturating_add(con_mod.saturating_mul(i32::from(level)))
                .saturating_add(bonus_hp)
                .max(1),
            None => {
                let starting = record
                    .classes
                    .iter()
                    .find(|c| c.is_starting_class)
                    .map(|c| ClassKind::from_name(&c.definition.name));
                hit_dice_max_hp(&classes, starting, con_mod)
                    .saturating_add(bonus_hp)
                    .max(1)
            }
        };

        Self {
            level,
            proficiency_bonus: prof,
            max_hit_points,
            armor_class: armor_class(record, &abilities),
            initiative: abilities.modifier(Ability::Dex),
            passive_perception: 10 + perception,
            skills,
            saving_throws,
            spellcasting,
            spell_slots: calculate_spell_slots(&classes),
            abilities,
        }
    }

    pub fn saving_throw(&self, ability: Ability) -> Option<&SavingThrowValue> {
        self.saving_throws.iter().find(|s| s.ability == ability)
    }
}

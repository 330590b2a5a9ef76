//! Foundry VTT actor export (dnd5e system).

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sheetport_domain::{
    xp_for_next_level, Ability, CharacterRecord, DerivedStats, Feature, FormatCapability, ItemKind,
    ScoringWeights, Skill,
};

use super::document::{damage_dice, rejected, render_json, source_id};
use crate::infrastructure::config::ExportOptions;
use crate::infrastructure::ports::{AdapterMetadata, ConversionResult, FormatAdapter};

pub struct FoundryAdapter {
    metadata: AdapterMetadata,
    options: ExportOptions,
}

impl FoundryAdapter {
    pub const ID: &'static str = "foundry";

    pub fn new(options: ExportOptions) -> Self {
        Self {
            metadata: AdapterMetadata::new(
                Self::ID,
                "Foundry VTT",
                "Actor JSON for the Foundry VTT dnd5e system",
                "1.0.0",
                "json",
                "application/json",
            ),
            options,
        }
    }

    /// Build the actor document.
    pub fn build_actor(&self, character: &CharacterRecord) -> Value {
        let stats = DerivedStats::from_record(character);

        let mut abilities = Map::new();
        for ability in Ability::ALL {
            let proficient = stats
                .saving_throw(ability)
                .is_some_and(|save| save.proficient);
            abilities.insert(
                ability.key().to_string(),
                json!({
                    "value": stats.abilities.score(ability),
                    "proficient": u8::from(proficient),
                }),
            );
        }

        let mut skills = Map::new();
        for value in &stats.skills {
            skills.insert(
                skill_key(value.skill).to_string(),
                json!({
                    "value": value.proficiency.multiplier(),
                    "ability": value.skill.ability().key(),
                }),
            );
        }

        let mut spells = Map::new();
        for (level, count) in stats.spell_slots.slots.iter() {
            spells.insert(
                format!("spell{}", level),
                json!({ "value": count, "max": count }),
            );
        }
        let pact = &stats.spell_slots.pact_slots;
        spells.insert(
            "pact".to_string(),
            json!({
                "value": pact.total(),
                "max": pact.total(),
                "level": pact.highest_level().unwrap_or(0),
            }),
        );

        let spellcasting = stats
            .spellcasting
            .first()
            .map(|s| s.ability.key())
            .unwrap_or("");

        json!({
            "name": character.display_name(),
            "type": "character",
            "system": {
                "abilities": abilities,
                "attributes": {
                    "hp": { "value": stats.max_hit_points, "max": stats.max_hit_points },
                    "ac": { "flat": stats.armor_class, "calc": "flat" },
                    "init": { "bonus": 0 },
                    "prof": stats.proficiency_bonus,
                    "spellcasting": spellcasting,
                },
                "details": {
                    "level": stats.level,
                    "race": character.race_name().unwrap_or_default(),
                    "background": character.background_name().unwrap_or_default(),
                    "alignment": character.alignment.clone().unwrap_or_default(),
                    "xp": {
                        "value": character.current_xp.unwrap_or(0),
                        "max": xp_for_next_level(stats.level),
                    },
                },
                "skills": skills,
                "spells": spells,
            },
            "items": items(character),
            "flags": {
                "sheetport": {
                    "sourceId": source_id(character),
                    "homebrew": character.has_homebrew_content(),
                }
            },
        })
    }
}

#[async_trait]
impl FormatAdapter for FoundryAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    fn supported_features(&self) -> Vec<FormatCapability> {
        vec![
            FormatCapability::full(Feature::Abilities),
            FormatCapability::full(Feature::Skills),
            FormatCapability::full(Feature::SavingThrows),
            FormatCapability::full(Feature::Spellcasting),
            FormatCapability::full(Feature::Weapons),
            FormatCapability::full(Feature::Armor),
            FormatCapability::full(Feature::MagicItems),
            FormatCapability::full(Feature::ClassFeatures),
            FormatCapability::partial(
                Feature::RacialTraits,
                "Racial traits are exported as feat items",
            ),
            FormatCapability::full(Feature::Feats),
            FormatCapability::partial(
                Feature::HomebrewContent,
                "Homebrew content is exported without automation",
            ),
        ]
    }

    fn scoring_weights(&self) -> ScoringWeights {
        self.options.weights
    }

    async fn convert(&self, character: &CharacterRecord) -> ConversionResult {
        if !self.can_convert(character) {
            return rejected(Self::ID, character);
        }
        render_json(&self.build_actor(character), &self.options).into()
    }
}

fn items(character: &CharacterRecord) -> Vec<Value> {
    let mut items = Vec::new();

    for class in &character.classes {
        let info = class.to_class_info();
        items.push(json!({
            "name": info.name(),
            "type": "class",
            "system": {
                "levels": info.clamped_level(),
                "hitDice": format!("d{}", info.kind().hit_die()),
                "spellcasting": { "progression": info.caster_type().as_str() },
                "subclass": class
                    .subclass_definition
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            },
        }));
        for feature in &class.class_features {
            items.push(feat_item(&feature.definition.name, "class"));
        }
    }

    for item in &character.inventory {
        let def = &item.definition;
        let (item_type, mut system) = match def.kind() {
            ItemKind::Weapon => {
                let damage_part = [
                    damage_dice(item).unwrap_or("").to_string(),
                    def.damage_type.clone().unwrap_or_default(),
                ];
                let properties: Vec<String> =
                    def.properties.iter().map(|p| p.name.to_lowercase()).collect();
                (
                    "weapon",
                    json!({
                        "damage": { "parts": [damage_part] },
                        "actionType": if def.is_ranged() { "rwak" } else { "mwak" },
                        "properties": properties,
                    }),
                )
            }
            ItemKind::Armor => {
                let armor_type = if def.is_shield() { "shield" } else { "armor" };
                (
                    "equipment",
                    json!({
                        "armor": { "value": def.armor_class.unwrap_or(0), "type": armor_type },
                    }),
                )
            }
            ItemKind::Potion | ItemKind::Scroll => ("consumable", json!({})),
            _ => ("loot", json!({})),
        };
        if let Value::Object(map) = &mut system {
            map.insert("quantity".to_string(), json!(item.quantity));
            map.insert("equipped".to_string(), json!(item.equipped));
            map.insert(
                "rarity".to_string(),
                json!(def.rarity.clone().unwrap_or_default().to_lowercase()),
            );
            map.insert("weight".to_string(), json!(def.weight.unwrap_or(0.0)));
        }
        items.push(json!({ "name": def.name, "type": item_type, "system": system }));
    }

    for feat in &character.feats {
        items.push(feat_item(&feat.definition.name, "feat"));
    }
    for traits in character.racial_traits() {
        items.push(feat_item(&traits.name, "race"));
    }

    items
}

fn feat_item(name: &str, feat_type: &str) -> Value {
    json!({
        "name": name,
        "type": "feat",
        "system": { "type": { "value": feat_type } },
    })
}

fn skill_key(skill: Skill) -> &'static str {
    match skill {
        Skill::Acrobatics => "acr",
        Skill::AnimalHandling => "ani",
        Skill::Arcana => "arc",
        Skill::Athletics => "ath",
        Skill::Deception => "dec",
        Skill::History => "his",
        Skill::Insight => "ins",
        Skill::Intimidation => "itm",
        Skill::Investigation => "inv",
        Skill::Medicine => "med",
        Skill::Nature => "nat",
        Skill::Perception => "prc",
        Skill::Performance => "prf",
        Skill::Persuasion => "per",
        Skill::Religion => "rel",
        Skill::SleightOfHand => "slt",
        Skill::Stealth => "ste",
        Skill::Survival => "sur",
    }
}

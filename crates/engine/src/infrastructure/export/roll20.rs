//! Roll20 character attribute export (5th Edition OGL sheet).

use async_trait::async_trait;
use serde_json::{json, Value};
use sheetport_domain::{
    Ability, CharacterRecord, DerivedStats, Feature, FormatCapability, ItemKind, ProficiencyLevel,
    ScoringWeights,
};

use super::document::{class_summary, damage_dice, rejected, render_json};
use crate::infrastructure::config::ExportOptions;
use crate::infrastructure::ports::{AdapterMetadata, ConversionResult, FormatAdapter};

const SCHEMA_VERSION: u8 = 2;

pub struct Roll20Adapter {
    metadata: AdapterMetadata,
    options: ExportOptions,
}

impl Roll20Adapter {
    pub const ID: &'static str = "roll20";

    pub fn new(options: ExportOptions) -> Self {
        Self {
            metadata: AdapterMetadata::new(
                Self::ID,
                "Roll20",
                "Attribute JSON for the Roll20 5th Edition OGL sheet",
                "1.0.0",
                "json",
                "application/json",
            ),
            options,
        }
    }

    /// Flat attribute list. Pact slots are merged into the per-level totals
    /// since the sheet has no separate pool.
    pub fn build_character(&self, character: &CharacterRecord) -> Value {
        let stats = DerivedStats::from_record(character);
        let mut attribs = AttributeList::default();

        for ability in Ability::ALL {
            let name = ability.display_name().to_lowercase();
            attribs.push(&name, stats.abilities.score(ability));
            attribs.push(&format!("{}_mod", name), stats.abilities.modifier(ability));
            if let Some(save) = stats.saving_throw(ability) {
                attribs.push(&format!("{}_save_bonus", name), save.modifier);
                attribs.push(&format!("{}_save_prof", name), proficient_flag(save.proficient));
            }
        }

        let classes = character.class_infos();
        if let Some(primary) = classes.first() {
            attribs.push("class", primary.name());
            attribs.push("base_level", primary.clamped_level());
            attribs.push("subclass", primary.subclass().unwrap_or_default());
        }
        for (index, class) in classes.iter().skip(1).enumerate() {
            let slot = index + 1;
            attribs.push(&format!("multiclass{}_flag", slot), 1);
            attribs.push(&format!("multiclass{}", slot), class.name());
            attribs.push(&format!("multiclass{}_lvl", slot), class.clamped_level());
        }
        attribs.push("class_display", class_summary(character));
        attribs.push("level", stats.level);
        attribs.push("pb", stats.proficiency_bonus);
        attribs.push_with_max("hp", stats.max_hit_points, stats.max_hit_points);
        attribs.push("ac", stats.armor_class);
        attribs.push("initiative_bonus", stats.initiative);
        attribs.push("passive_wisdom", stats.passive_perception);
        attribs.push("race", character.race_name().unwrap_or_default());
        attribs.push("background", character.background_name().unwrap_or_default());
        attribs.push("alignment", character.alignment.as_deref().unwrap_or_default());
        attribs.push("experience", character.current_xp.unwrap_or(0));

        for value in &stats.skills {
            let slug = value.skill.slug();
            attribs.push(&format!("{}_bonus", slug), value.modifier);
            attribs.push(
                &format!("{}_prof", slug),
                proficient_flag(value.proficiency != ProficiencyLevel::None),
            );
            if value.proficiency == ProficiencyLevel::Expert {
                attribs.push(&format!("{}_type", slug), 2);
            }
        }

        if let Some(casting) = stats.spellcasting.first() {
            attribs.push(
                "spellcasting_ability",
                format!("@{{{}_mod}}+", casting.ability.display_name().to_lowercase()),
            );
            attribs.push("spell_save_dc", casting.save_dc);
            attribs.push("spell_attack_bonus", casting.attack_bonus);
        }
        let slots = &stats.spell_slots;
        for level in 1..=9u8 {
            let total = slots.slots.get(level) + slots.pact_slots.get(level);
            attribs.push_with_max(&format!("lvl{}_slots_total", level), total, total);
        }

        for (index, item) in character.inventory.iter().enumerate() {
            let row = row_id(index);
            let def = &item.definition;
            let prefix = format!("repeating_inventory_{}", row);
            attribs.push(&format!("{}_itemname", prefix), def.name.as_str());
            attribs.push(&format!("{}_itemcount", prefix), item.quantity);
            attribs.push(&format!("{}_equipped", prefix), proficient_flag(item.equipped));
            if let Some(weight) = def.weight {
                attribs.push(&format!("{}_itemweight", prefix), weight);
            }
            if def.kind() == ItemKind::Weapon {
                let attack = format!("repeating_attack_{}", row);
                attribs.push(&format!("{}_atkname", attack), def.name.as_str());
                attribs.push(
                    &format!("{}_dmgbase", attack),
                    damage_dice(item).unwrap_or_default(),
                );
                attribs.push(
                    &format!("{}_dmgtype", attack),
                    def.damage_type.as_deref().unwrap_or_default(),
                );
                let ability = if def.is_ranged() || def.has_property("finesse") {
                    "dexterity"
                } else {
                    "strength"
                };
                attribs.push(&format!("{}_atkattr_base", attack), format!("@{{{}_mod}}", ability));
            }
        }

        let mut traits = Vec::new();
        traits.extend(character.class_features().map(|f| (f.name.as_str(), "Class")));
        traits.extend(character.racial_traits().map(|t| (t.name.as_str(), "Racial")));
        traits.extend(
            character
                .feats
                .iter()
                .map(|f| (f.definition.name.as_str(), "Feat")),
        );
        for (index, (name, source)) in traits.into_iter().enumerate() {
            let prefix = format!("repeating_traits_{}", row_id(index));
            attribs.push(&format!("{}_name", prefix), name);
            attribs.push(&format!("{}_source", prefix), source);
        }

        json!({
            "schema_version": SCHEMA_VERSION,
            "name": character.display_name(),
            "attribs": attribs.into_inner(),
            "abilities": [],
        })
    }
}

#[async_trait]
impl FormatAdapter for Roll20Adapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    fn supported_features(&self) -> Vec<FormatCapability> {
        vec![
            FormatCapability::full(Feature::Abilities),
            FormatCapability::full(Feature::Skills),
            FormatCapability::full(Feature::SavingThrows),
            FormatCapability::partial(
                Feature::Spellcasting,
                "Pact magic slots are merged into the regular slot totals",
            ),
            FormatCapability::full(Feature::Weapons),
            FormatCapability::full(Feature::Armor),
            FormatCapability::partial(
                Feature::MagicItems,
                "Magic item effects are not applied to the sheet",
            ),
            FormatCapability::partial(
                Feature::ClassFeatures,
                "Class features are exported as text traits",
            ),
            FormatCapability::partial(
                Feature::RacialTraits,
                "Racial traits are exported as text traits",
            ),
            FormatCapability::partial(Feature::Feats, "Feats are exported as text traits"),
            FormatCapability::none(Feature::HomebrewContent),
        ]
    }

    fn scoring_weights(&self) -> ScoringWeights {
        self.options.weights
    }

    async fn convert(&self, character: &CharacterRecord) -> ConversionResult {
        if !self.can_convert(character) {
            return rejected(Self::ID, character);
        }
        render_json(&self.build_character(character), &self.options).into()
    }
}

fn proficient_flag(value: bool) -> u8 {
    u8::from(value)
}

/// Deterministic repeating-section row id.
fn row_id(index: usize) -> String {
    format!("-sp{:05}", index)
}

#[derive(Default)]
struct AttributeList(Vec<Value>);

impl AttributeList {
    fn push(&mut self, name: &str, current: impl Into<Value>) {
        self.push_with_max(name, current, "");
    }

    fn push_with_max(&mut self, name: &str, current: impl Into<Value>, max: impl Into<Value>) {
        self.0.push(json!({
            "name": name,
            "current": current.into(),
            "max": max.into(),
        }));
    }

    fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::characters;
    use sheetport_domain::validate_capabilities;

    fn adapter() -> Roll20Adapter {
        Roll20Adapter::new(ExportOptions::default())
    }

    fn attr<'a>(doc: &'a Value, name: &str) -> &'a Value {
        doc["attribs"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["name"] == name)
            .unwrap_or_else(|| panic!("missing attribute {}", name))
    }

    #[test]
    fn capabilities_are_unique() {
        assert!(validate_capabilities(&adapter().supported_features()).is_ok());
    }

    #[test]
    fn abilities_and_modifiers() {
        let doc = adapter().build_character(&characters::wizard_5());
        assert_eq!(doc["schema_version"], 2);
        assert_eq!(attr(&doc, "intelligence")["current"], 18);
        assert_eq!(attr(&doc, "intelligence_mod")["current"], 4);
        assert_eq!(attr(&doc, "intelligence_save_prof")["current"], 1);
        assert_eq!(attr(&doc, "strength_mod")["current"], -1);
        assert_eq!(attr(&doc, "spell_save_dc")["current"], 15);
        assert_eq!(attr(&doc, "hp")["max"], attr(&doc, "hp")["current"]);
    }

    #[test]
    fn pact_slots_merge_into_totals() {
        let doc = adapter().build_character(&characters::warlock_sorcerer());
        // Sorcerer 3: 4/2, Warlock 3: two 2nd-level pact slots
        assert_eq!(attr(&doc, "lvl1_slots_total")["current"], 4);
        assert_eq!(attr(&doc, "lvl2_slots_total")["current"], 4);
        assert_eq!(attr(&doc, "lvl3_slots_total")["current"], 0);
    }

    #[test]
    fn multiclass_rows() {
        let doc = adapter().build_character(&characters::fighter_wizard());
        assert_eq!(attr(&doc, "class")["current"], "Fighter");
        assert_eq!(attr(&doc, "multiclass1")["current"], "Wizard");
        assert_eq!(attr(&doc, "multiclass1_lvl")["current"], 2);
        assert_eq!(attr(&doc, "class_display")["current"], "Fighter 3 / Wizard 2");
        assert_eq!(
            attr(&doc, "repeating_attack_-sp00000_atkname")["current"],
            "Longsword"
        );
    }

    #[tokio::test]
    async fn homebrew_lowers_the_score() {
        let adapter = adapter();
        let plain = adapter
            .analyze_compatibility(&characters::wizard_5())
            .await
            .unwrap();
        let homebrew = adapter
            .analyze_compatibility(&characters::fighter_wizard())
            .await
            .unwrap();
        assert!(homebrew.score < plain.score);
        assert!(homebrew
            .limitations
            .contains(&"Homebrew content not supported".to_string()));
    }

    #[tokio::test]
    async fn configured_weights_are_used() {
        let lenient = Roll20Adapter::new(ExportOptions {
            weights: ScoringWeights {
                partial_support: 1.0,
                ..ScoringWeights::default()
            },
            ..ExportOptions::default()
        });
        let character = characters::wizard_5();
        let strict = adapter().analyze_compatibility(&character).await.unwrap();
        let relaxed = lenient.analyze_compatibility(&character).await.unwrap();
        assert!(relaxed.score > strict.score);
        assert_eq!(relaxed.data_loss, strict.data_loss);
    }
}

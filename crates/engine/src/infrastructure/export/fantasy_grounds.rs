//! Fantasy Grounds character XML export (5E ruleset).

use async_trait::async_trait;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use sheetport_domain::{
    Ability, CharacterRecord, DerivedStats, Feature, FormatCapability, ItemKind, ProficiencyLevel,
    ScoringWeights,
};

use super::document::{damage_dice, rejected};
use crate::infrastructure::config::ExportOptions;
use crate::infrastructure::ports::{AdapterError, AdapterMetadata, ConversionResult, FormatAdapter};

const ROOT_VERSION: &str = "4.1";
const RELEASE: &str = "8.1|CoreRPG:4.1";

pub struct FantasyGroundsAdapter {
    metadata: AdapterMetadata,
    options: ExportOptions,
}

impl FantasyGroundsAdapter {
    pub const ID: &'static str = "fantasy_grounds";

    pub fn new(options: ExportOptions) -> Self {
        Self {
            metadata: AdapterMetadata::new(
                Self::ID,
                "Fantasy Grounds",
                "Character XML for the Fantasy Grounds 5E ruleset",
                "1.0.0",
                "xml",
                "application/xml",
            ),
            options,
        }
    }

    /// Render the `<root><character>` document.
    pub fn build_document(&self, character: &CharacterRecord) -> Result<String, AdapterError> {
        let stats = DerivedStats::from_record(character);
        let mut xml = XmlDocument::new(self.options.pretty);

        xml.declaration()?;
        xml.open_with("root", &[("version", ROOT_VERSION), ("release", RELEASE)])?;
        xml.open("character")?;

        xml.string("name", character.display_name())?;
        xml.string("race", character.race_name().unwrap_or_default())?;
        xml.string("background", character.background_name().unwrap_or_default())?;
        xml.string("alignment", character.alignment.as_deref().unwrap_or_default())?;
        xml.number("level", i64::from(stats.level))?;
        xml.number("profbonus", i64::from(stats.proficiency_bonus))?;
        xml.open("exp")?;
        xml.number("value", i64::from(character.current_xp.unwrap_or(0)))?;
        xml.close("exp")?;

        xml.open("abilities")?;
        for ability in Ability::ALL {
            let tag = ability.display_name().to_lowercase();
            let save = stats.saving_throw(ability);
            xml.open(&tag)?;
            xml.number("score", i64::from(stats.abilities.score(ability)))?;
            xml.number("bonus", i64::from(stats.abilities.modifier(ability)))?;
            xml.number("save", i64::from(save.map_or(0, |s| s.modifier)))?;
            xml.number("saveprof", i64::from(save.is_some_and(|s| s.proficient)))?;
            xml.close(&tag)?;
        }
        xml.close("abilities")?;

        xml.open("classes")?;
        for (index, class) in character.classes.iter().enumerate() {
            let info = class.to_class_info();
            let id = record_id(index);
            xml.open(&id)?;
            xml.string("name", info.name())?;
            xml.number("level", i64::from(info.clamped_level()))?;
            xml.string(
                "specialization",
                class
                    .subclass_definition
                    .as_ref()
                    .map_or("", |s| s.name.as_str()),
            )?;
            xml.string("hddie", &format!("d{}", info.kind().hit_die()))?;
            xml.close(&id)?;
        }
        xml.close("classes")?;

        xml.open("hp")?;
        xml.number("total", i64::from(stats.max_hit_points))?;
        xml.close("hp")?;
        xml.open("defenses")?;
        xml.open("ac")?;
        xml.number("total", i64::from(stats.armor_class))?;
        xml.close("ac")?;
        xml.close("defenses")?;
        xml.number("initiative", i64::from(stats.initiative))?;
        xml.number("perception", i64::from(stats.passive_perception))?;

        xml.open("skilllist")?;
        for (index, skill) in stats.skills.iter().enumerate() {
            let id = record_id(index);
            xml.open(&id)?;
            xml.string("name", skill.skill.display_name())?;
            xml.string("stat", &skill.skill.ability().display_name().to_lowercase())?;
            xml.number("prof", proficiency_code(skill.proficiency))?;
            xml.number("total", i64::from(skill.modifier))?;
            xml.close(&id)?;
        }
        xml.close("skilllist")?;

        xml.open("powermeta")?;
        for (level, count) in stats.spell_slots.slots.iter() {
            let tag = format!("spellslots{}", level);
            xml.open(&tag)?;
            xml.number("max", i64::from(count))?;
            xml.close(&tag)?;
        }
        for (level, count) in stats.spell_slots.pact_slots.iter() {
            let tag = format!("pactmagicslots{}", level);
            xml.open(&tag)?;
            xml.number("max", i64::from(count))?;
            xml.close(&tag)?;
        }
        xml.close("powermeta")?;

        xml.open("inventorylist")?;
        for (index, item) in character.inventory.iter().enumerate() {
            let def = &item.definition;
            let id = record_id(index);
            xml.open(&id)?;
            xml.string("name", &def.name)?;
            xml.number("count", i64::from(item.quantity))?;
            // 2 = equipped, 1 = carried
            xml.number("carried", if item.equipped { 2 } else { 1 })?;
            xml.string("type", item_type(def.kind()))?;
            if let Some(rarity) = def.rarity.as_deref() {
                xml.string("rarity", rarity)?;
            }
            if let Some(dice) = damage_dice(item) {
                xml.string("damage", dice)?;
            }
            if let Some(ac) = def.armor_class {
                xml.number("ac", i64::from(ac))?;
            }
            xml.close(&id)?;
        }
        xml.close("inventorylist")?;

        let features: Vec<&str> = character
            .class_features()
            .map(|f| f.name.as_str())
            .collect();
        xml.name_list("featurelist", &features)?;

        let feats: Vec<&str> = character
            .feats
            .iter()
            .map(|f| f.definition.name.as_str())
            .collect();
        xml.name_list("featlist", &feats)?;

        let traits: Vec<&str> = character.racial_traits().map(|t| t.name.as_str()).collect();
        xml.name_list("traitlist", &traits)?;

        xml.close("character")?;
        xml.close("root")?;
        xml.finish()
    }
}

#[async_trait]
impl FormatAdapter for FantasyGroundsAdapter {
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
                "Pact magic slots are exported as a separate slot group",
            ),
            FormatCapability::partial(
                Feature::Weapons,
                "Weapon attacks must be rebuilt in the actions tab",
            ),
            FormatCapability::full(Feature::Armor),
            FormatCapability::partial(
                Feature::MagicItems,
                "Magic item properties are exported as names only",
            ),
            FormatCapability::full(Feature::ClassFeatures),
            FormatCapability::full(Feature::RacialTraits),
            FormatCapability::full(Feature::Feats),
            FormatCapability::none(Feature::HomebrewContent)
                .with_impact("Homebrew entries must be rebuilt from the module library"),
        ]
    }

    fn scoring_weights(&self) -> ScoringWeights {
        self.options.weights
    }

    async fn convert(&self, character: &CharacterRecord) -> ConversionResult {
        if !self.can_convert(character) {
            return rejected(Self::ID, character);
        }
        self.build_document(character).into()
    }
}

fn record_id(index: usize) -> String {
    format!("id-{:05}", index + 1)
}

/// 5E ruleset codes: 1 proficient, 2 expertise, 3 half.
fn proficiency_code(level: ProficiencyLevel) -> i64 {
    match level {
        ProficiencyLevel::None => 0,
        ProficiencyLevel::Proficient => 1,
        ProficiencyLevel::Expert => 2,
        ProficiencyLevel::Half => 3,
    }
}

fn item_type(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Weapon => "Weapon",
        ItemKind::Armor => "Armor",
        ItemKind::Potion => "Potion",
        ItemKind::Ring => "Ring",
        ItemKind::Rod => "Rod",
        ItemKind::Scroll => "Scroll",
        ItemKind::Staff => "Staff",
        ItemKind::Wand => "Wand",
        ItemKind::WondrousItem => "Wondrous Item",
        ItemKind::Gear => "Adventuring Gear",
    }
}

/// Typed-node writer over `quick_xml::Writer`.
struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    fn new(pretty: bool) -> Self {
        let writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        Self { writer }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), AdapterError> {
        self.writer.write_event(event).map_err(AdapterError::xml)
    }

    fn declaration(&mut self) -> Result<(), AdapterError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open(&mut self, name: &str) -> Result<(), AdapterError> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    fn open_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), AdapterError> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<(), AdapterError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn typed(&mut self, name: &str, node_type: &str, value: &str) -> Result<(), AdapterError> {
        self.open_with(name, &[("type", node_type)])?;
        self.write(Event::Text(BytesText::new(value)))?;
        self.close(name)
    }

    fn string(&mut self, name: &str, value: &str) -> Result<(), AdapterError> {
        self.typed(name, "string", value)
    }

    fn number(&mut self, name: &str, value: i64) -> Result<(), AdapterError> {
        self.typed(name, "number", &value.to_string())
    }

    fn name_list(&mut self, list: &str, names: &[&str]) -> Result<(), AdapterError> {
        self.open(list)?;
        for (index, name) in names.iter().enumerate() {
            let id = record_id(index);
            self.open(&id)?;
            self.string("name", name)?;
            self.close(&id)?;
        }
        self.close(list)
    }

    fn finish(self) -> Result<String, AdapterError> {
        String::from_utf8(self.writer.into_inner()).map_err(AdapterError::xml)
    }
}

//! Helpers shared by the built-in adapters.

use serde_json::Value;
use sheetport_domain::{CharacterRecord, InventoryItem};

use crate::infrastructure::config::ExportOptions;
use crate::infrastructure::ports::{AdapterError, ConversionResult};

pub(crate) fn render_json(value: &Value, options: &ExportOptions) -> Result<String, AdapterError> {
    let rendered = if options.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

/// Failure result for a record that does not pass `can_convert`.
pub(crate) fn rejected(adapter_id: &str, character: &CharacterRecord) -> ConversionResult {
    let reason = match character.validate() {
        Err(err) => err.to_string(),
        Ok(()) => format!("{} cannot convert this character", adapter_id),
    };
    tracing::debug!(adapter_id = %adapter_id, reason = %reason, "Conversion rejected");
    ConversionResult::failure(AdapterError::unsupported(reason))
}

/// Source id as a string, empty when missing.
pub(crate) fn source_id(character: &CharacterRecord) -> String {
    character
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Human readable class line, e.g. "Fighter 3 / Wizard 2".
pub(crate) fn class_summary(character: &CharacterRecord) -> String {
    character
        .class_infos()
        .iter()
        .map(|c| format!("{} {}", c.name().trim(), c.clamped_level()))
        .collect::<Vec<_>>()
        .join(" / ")
}

pub(crate) fn damage_dice(item: &InventoryItem) -> Option<&str> {
    item.definition
        .damage
        .as_ref()
        .map(|d| d.dice_string.as_str())
        .filter(|d| !d.is_empty())
}

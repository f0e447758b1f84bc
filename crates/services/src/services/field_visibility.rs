//! Which fields a workbook shows between mapping and submit.
//!
//! A field counts as mapped while its metadata carries `mapped: true`. The
//! flag is derived from the mapping job's execution plan every time the
//! table is narrowed and is stripped again once the data has been
//! submitted, so it never outlives one submit cycle. Nothing here touches
//! shared state: every function takes its inputs by reference and returns
//! new documents.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::services::platform::models::{
    ExecutionPlan, FieldConfig, MAPPED_METADATA_KEY, Sheet, SheetConfig, Workbook,
};

/// Destination field keys the mapping step matched.
pub fn mapped_field_keys(plan: &ExecutionPlan) -> BTreeSet<String> {
    plan.field_mapping
        .iter()
        .map(|entry| entry.destination_field.key.clone())
        .collect()
}

fn mapped_metadata() -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert(MAPPED_METADATA_KEY.to_string(), Value::Bool(true));
    metadata
}

/// Copy of `blueprint` where exactly the fields in `keys` carry the flag.
///
/// Flagged fields get `{ "mapped": true }` as their whole metadata; every
/// other field loses any `mapped` entry it had.
pub fn mark_mapped_fields(blueprint: &[SheetConfig], keys: &BTreeSet<String>) -> Vec<SheetConfig> {
    blueprint
        .iter()
        .map(|sheet| {
            let mut sheet = sheet.clone();
            for field in &mut sheet.fields {
                if keys.contains(&field.key) {
                    field.metadata = Some(mapped_metadata());
                } else if let Some(metadata) = field.metadata.as_mut() {
                    metadata.remove(MAPPED_METADATA_KEY);
                }
            }
            sheet
        })
        .collect()
}

/// Per sheet, the flagged fields; `None` when a sheet has none.
pub fn mapped_subsets(marked: &[SheetConfig]) -> Vec<Option<Vec<FieldConfig>>> {
    marked
        .iter()
        .map(|sheet| {
            let fields: Vec<FieldConfig> = sheet
                .fields
                .iter()
                .filter(|f| f.is_mapped())
                .cloned()
                .collect();
            (!fields.is_empty()).then_some(fields)
        })
        .collect()
}

/// Finds the blueprint sheet a live sheet was created from.
fn blueprint_position(blueprint: &[SheetConfig], sheet: &Sheet, index: usize) -> Option<usize> {
    match sheet.config.slug.as_deref() {
        Some(slug) => blueprint
            .iter()
            .position(|b| b.slug.as_deref() == Some(slug)),
        None => (index < blueprint.len()).then_some(index),
    }
}

/// Rewrites `workbook` so each sheet only lists its mapped fields.
///
/// Sheets without any mapped field, and sheets the blueprint does not know,
/// keep their field list but lose any `mapped` flag left from an earlier
/// cycle, so the flagged set afterwards is exactly `keys`. When a mapped key exists on the live sheet, the live
/// field object is kept (with the flag added) so attributes the platform
/// added after creation survive; otherwise the blueprint definition is used.
pub fn restrict_to_mapped(
    mut workbook: Workbook,
    blueprint: &[SheetConfig],
    keys: &BTreeSet<String>,
) -> Workbook {
    let subsets = mapped_subsets(&mark_mapped_fields(blueprint, keys));

    for (index, sheet) in workbook.sheets.iter_mut().enumerate() {
        let subset = blueprint_position(blueprint, sheet, index)
            .and_then(|position| subsets[position].as_ref());
        let Some(subset) = subset else {
            clear_mapped_flags(&mut sheet.config.fields);
            continue;
        };

        let fields: Vec<FieldConfig> = subset
            .iter()
            .map(|marked| {
                match sheet.config.fields.iter().find(|f| f.key == marked.key) {
                    Some(live) => {
                        let mut field = live.clone();
                        field
                            .metadata
                            .get_or_insert_with(Map::new)
                            .insert(MAPPED_METADATA_KEY.to_string(), Value::Bool(true));
                        field
                    }
                    None => marked.clone(),
                }
            })
            .collect();
        sheet.config.fields = fields;
    }

    workbook
}

pub fn sheet_has_mapped_fields(sheet: &Sheet) -> bool {
    sheet.config.fields.iter().any(FieldConfig::is_mapped)
}

/// Keys of the fields currently flagged on `sheet`.
pub fn mapped_keys_of(sheet: &Sheet) -> BTreeSet<String> {
    sheet
        .config
        .fields
        .iter()
        .filter(|f| f.is_mapped())
        .map(|f| f.key.clone())
        .collect()
}

/// Removes the `mapped` flag from every field that carries it.
///
/// Other metadata entries stay. Returns the cleaned workbook and the number
/// of flags removed.
pub fn strip_mapped_flag(mut workbook: Workbook) -> (Workbook, usize) {
    let removed: usize = workbook
        .sheets
        .iter_mut()
        .map(|sheet| clear_mapped_flags(&mut sheet.config.fields))
        .sum();
    (workbook, removed)
}

fn clear_mapped_flags(fields: &mut [FieldConfig]) -> usize {
    let mut removed = 0;
    for field in fields {
        if field.is_mapped()
            && let Some(metadata) = field.metadata.as_mut()
        {
            metadata.remove(MAPPED_METADATA_KEY);
            removed += 1;
        }
    }
    removed
}

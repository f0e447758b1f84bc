//! Static blueprint of the workbook created for every new space.

use serde_json::Map;

use crate::services::platform::models::{Action, ActionMode, FieldConfig, SheetConfig};

/// Operation name of the workbook-level Submit action.
pub const SUBMIT_OPERATION: &str = "submitAction";

pub fn contacts_sheet() -> SheetConfig {
    SheetConfig {
        name: "Contacts".to_string(),
        slug: Some("contacts".to_string()),
        fields: vec![
            FieldConfig::string("first_name", "First name"),
            FieldConfig::string("last_name", "Last name"),
            FieldConfig::string("full_name", "Full name (DO NOT MAP)"),
            FieldConfig::string("email", "Email"),
            FieldConfig::string("country_of_birth", "Country of birth (DO NOT MAP)"),
        ],
        extra: Map::new(),
    }
}

pub fn companies_sheet() -> SheetConfig {
    SheetConfig {
        name: "Companies".to_string(),
        slug: Some("companies".to_string()),
        fields: vec![
            FieldConfig::string("company_name", "Company name"),
            FieldConfig::string("address", "Address (DO NOT MAP)"),
        ],
        extra: Map::new(),
    }
}

/// Sheets of the workbook, in display order.
pub fn workbook_blueprint() -> Vec<SheetConfig> {
    vec![contacts_sheet(), companies_sheet()]
}

/// Primary Submit button; foreground so the user waits on a modal while it runs.
pub fn submit_action() -> Action {
    Action {
        operation: SUBMIT_OPERATION.to_string(),
        mode: ActionMode::Foreground,
        label: "Submit".to_string(),
        primary: true,
        extra: Map::new(),
    }
}

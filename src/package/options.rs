//! The stored user options: one record of the shared options schema.

use crate::config::DEFAULT_USER_NAME_CHARACTERS;
use crate::package::field::FieldSpec;
use crate::package::schema::Schema;
use std::sync::{Arc, OnceLock};

/// Identifier of the display-name field
pub const USER_NAME: &str = "user.name";

/// Identifier of the display-name color field (RGB)
pub const USER_NAME_COLOR: &str = "user.name.color";

/// Schema of the options file: `{user.name, user.name.color}`, both optional.
pub fn options_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| {
        let fields = [
            FieldSpec::user_name(USER_NAME, DEFAULT_USER_NAME_CHARACTERS).optional(),
            FieldSpec::color(USER_NAME_COLOR).optional(),
        ];
        // identifiers are distinct non-empty constants
        Schema::new(fields).unwrap_or_else(|_| Schema::empty())
    }))
}

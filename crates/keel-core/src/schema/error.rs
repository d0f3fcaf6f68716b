//! # Keel Core Schema Errors
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Table '{table}' is defined twice in the same metadata collection")]
    DuplicateTableDefinition { table: String },

    #[error("Table '{table}' of component '{second}' is already provided by component '{first}'")]
    DuplicateTable {
        table: String,
        first: String,
        second: String,
    },

    #[error("Column '{table}.{column}' has malformed reference '{reference}', expected 'table.column'")]
    MalformedReference {
        table: String,
        column: String,
        reference: String,
    },

    #[error("Column '{table}.{column}' references '{target}', which is not defined before it")]
    UnresolvedForeignKey {
        table: String,
        column: String,
        target: String,
    },
}

//! # Keel Core Schema Metadata
//!
//! Components that persist data describe their tables with a
//! [`SchemaMetadata`] collection. After the component initializes, the
//! environment binds that collection to the anchor's [`StoreHandle`].
//! [`SchemaCatalog`] is the combined view over all components, built in
//! initialization order.
//!
//! Nothing here talks to a database; the creation script is rendered for
//! inspection only.
pub mod error;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

pub use error::SchemaError;

/// Handle to the live data store that schema metadata is bound to.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreHandle {
    url: Arc<str>,
}

impl StoreHandle {
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self { url: Arc::from(url) }
    }

    /// Full connection URL, credentials included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connection URL with the password masked.
    pub fn redacted(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.to_string();
        };
        match rest.split_once('@') {
            Some((credentials, host)) => match credentials.split_once(':') {
                Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
                None => self.url.to_string(),
            },
            None => self.url.to_string(),
        }
    }
}

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreHandle").field(&self.redacted()).finish()
    }
}

/// A column of a table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    /// Foreign key target as `table.column`
    pub references: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            primary_key: false,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }
}

/// A table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub schema: Option<String>,
    pub columns: Vec<ColumnDef>,
    /// Statements to run right after the table is created
    pub after_create: Vec<String>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            after_create: Vec::new(),
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn after_create(mut self, statement: impl Into<String>) -> Self {
        self.after_create.push(statement.into());
        self
    }

    /// `schema.name`, or just `name` without a schema.
    pub fn fullname(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    fn create_statement(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut line = format!("    {} {}", c.name, c.sql_type);
                if !c.nullable {
                    line.push_str(" NOT NULL");
                }
                if let Some((table, column)) = c.references.as_deref().and_then(split_reference) {
                    line.push_str(&format!(" REFERENCES {} ({})", table, column));
                }
                line
            })
            .collect();
        let pk = self.primary_key();
        if !pk.is_empty() {
            lines.push(format!("    PRIMARY KEY ({})", pk.join(", ")));
        }
        format!("CREATE TABLE {} (\n{}\n)", self.fullname(), lines.join(",\n"))
    }
}

/// Split `table.column` (table names may carry a schema) at the last dot.
fn split_reference(reference: &str) -> Option<(&str, &str)> {
    reference
        .rsplit_once('.')
        .filter(|(table, column)| !table.is_empty() && !column.is_empty())
}

/// One component's table definitions plus the store they are bound to.
#[derive(Debug, Default)]
pub struct SchemaMetadata {
    tables: IndexMap<String, TableDef>,
    bind: RwLock<Option<StoreHandle>>,
}

impl SchemaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, keyed by its full name.
    pub fn add_table(&mut self, table: TableDef) -> Result<(), SchemaError> {
        let key = table.fullname();
        if self.tables.contains_key(&key) {
            return Err(SchemaError::DuplicateTableDefinition { table: key });
        }
        self.tables.insert(key, table);
        Ok(())
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    pub fn table(&self, fullname: &str) -> Option<&TableDef> {
        self.tables.get(fullname)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn bind(&self, store: StoreHandle) {
        *self.bind.write() = Some(store);
    }

    pub fn bound_store(&self) -> Option<StoreHandle> {
        self.bind.read().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.bind.read().is_some()
    }
}

/// A table in the combined catalog and the component that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTable {
    pub component: String,
    pub table: TableDef,
}

/// Tables of all components, in merge order.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: IndexMap<String, CatalogTable>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every table of `metadata` into the catalog on behalf of `component`.
    ///
    /// Each copy records the owning component as a table comment once created.
    pub fn merge(&mut self, component: &str, metadata: &SchemaMetadata) -> Result<(), SchemaError> {
        for table in metadata.tables() {
            let key = table.fullname();
            if let Some(existing) = self.tables.get(&key) {
                return Err(SchemaError::DuplicateTable {
                    table: key,
                    first: existing.component.clone(),
                    second: component.to_string(),
                });
            }

            let copy = table.clone().after_create(format!(
                "COMMENT ON TABLE {} IS '{}'",
                key,
                component.replace('\'', "''")
            ));
            self.tables.insert(
                key,
                CatalogTable {
                    component: component.to_string(),
                    table: copy,
                },
            );
        }
        Ok(())
    }

    pub fn tables(&self) -> impl Iterator<Item = &CatalogTable> {
        self.tables.values()
    }

    pub fn table(&self, fullname: &str) -> Option<&TableDef> {
        self.tables.get(fullname).map(|entry| &entry.table)
    }

    pub fn component_of(&self, fullname: &str) -> Option<&str> {
        self.tables.get(fullname).map(|entry| entry.component.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check that every foreign key targets a column of a table merged at or before
    /// the referencing table.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (index, entry) in self.tables.values().enumerate() {
            let table = &entry.table;
            for column in &table.columns {
                let Some(reference) = column.references.as_deref() else {
                    continue;
                };
                let (target_table, target_column) =
                    split_reference(reference).ok_or_else(|| SchemaError::MalformedReference {
                        table: table.fullname(),
                        column: column.name.clone(),
                        reference: reference.to_string(),
                    })?;

                let resolved = self
                    .tables
                    .get_full(target_table)
                    .filter(|(target_index, _, _)| *target_index <= index)
                    .and_then(|(_, _, target)| target.table.get_column(target_column));
                if resolved.is_none() {
                    return Err(SchemaError::UnresolvedForeignKey {
                        table: table.fullname(),
                        column: column.name.clone(),
                        target: reference.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render `CREATE TABLE` statements in merge order, each followed by its
    /// after-create statements.
    pub fn creation_script(&self) -> String {
        let mut statements = Vec::new();
        for entry in self.tables.values() {
            statements.push(format!("{};", entry.table.create_statement()));
            for hook in &entry.table.after_create {
                statements.push(format!("{};", hook));
            }
        }
        statements.join("\n")
    }
}

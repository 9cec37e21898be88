//! Schema snapshot types compared by the foreign key differ.
//!
//! A snapshot is an immutable description of a schema at one point in
//! time. Snapshots are usually produced by a reflection or declaration
//! layer outside this crate, either built in code or loaded from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// Foreign key referential action (ON DELETE / ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the keyword spelling of the action.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A snapshot of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    /// Column name.
    pub name: String,
    /// Declared type, as written by the schema source (e.g. `VARCHAR(10)`).
    pub data_type: String,
    /// Whether the column is nullable.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Server-side default expression, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_default: Option<String>,
    /// Whether this column is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnSnapshot {
    /// Creates a nullable column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            server_default: None,
            primary_key: false,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as primary key. Primary keys are never nullable.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Sets the server-side default expression.
    #[must_use]
    pub fn server_default(mut self, expr: impl Into<String>) -> Self {
        self.server_default = Some(expr.into());
        self
    }
}

/// A snapshot of a foreign key constraint.
///
/// Both column lists are ordered and paired by position: the n-th
/// constrained column refers to the n-th referred column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeySnapshot {
    /// Optional constraint name. Unnamed constraints are compared
    /// structurally only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Columns in the parent table.
    pub constrained_columns: Vec<String>,
    /// Referred table.
    pub referred_table: String,
    /// Referred columns.
    pub referred_columns: Vec<String>,
    /// ON DELETE action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKeySnapshot {
    /// Creates an unnamed constraint.
    #[must_use]
    pub fn new<C, R>(constrained: C, referred_table: impl Into<String>, referred: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            name: None,
            constrained_columns: constrained.into_iter().map(Into::into).collect(),
            referred_table: referred_table.into(),
            referred_columns: referred.into_iter().map(Into::into).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Builds a constraint from `table.column` references.
    ///
    /// The last dot separates the column, so `"audit.users.id"` refers to
    /// column `id` of table `audit.users`. Every reference must name the
    /// same table.
    ///
    /// # Errors
    ///
    /// Returns an error if no columns are given, if the two sides differ in
    /// length, or if a reference is malformed or names a different table.
    pub fn from_references<C, R>(constrained: C, references: R) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let constrained: Vec<String> = constrained.into_iter().map(Into::into).collect();

        let mut referred_table: Option<String> = None;
        let mut referred_columns = Vec::new();
        for reference in references {
            let reference = reference.as_ref();
            let (table, column) = split_reference(reference)?;
            match &referred_table {
                None => referred_table = Some(table.to_string()),
                Some(first) if first != table => {
                    return Err(SnapshotError::MixedReferredTables {
                        first: first.clone(),
                        other: table.to_string(),
                    });
                }
                Some(_) => {}
            }
            referred_columns.push(column.to_string());
        }

        if constrained.is_empty() || referred_columns.is_empty() {
            return Err(SnapshotError::EmptyColumns);
        }
        if constrained.len() != referred_columns.len() {
            return Err(SnapshotError::ColumnCountMismatch {
                constrained: constrained.len(),
                referred: referred_columns.len(),
            });
        }

        Ok(Self {
            name: None,
            constrained_columns: constrained,
            referred_table: referred_table.unwrap_or_default(),
            referred_columns,
            on_delete: None,
            on_update: None,
        })
    }

    /// Sets the constraint name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

fn split_reference(reference: &str) -> Result<(&str, &str)> {
    match reference.rsplit_once('.') {
        Some((table, column)) if !table.is_empty() && !column.is_empty() => Ok((table, column)),
        _ => Err(SnapshotError::MalformedReference(reference.to_string())),
    }
}

/// A snapshot of a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnSnapshot>,
    /// Foreign key constraints. Declaration order carries no meaning for
    /// equality.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeySnapshot>,
}

impl TableSnapshot {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnSnapshot) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn with_foreign_key(mut self, fk: ForeignKeySnapshot) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSnapshot> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A snapshot of an entire schema (multiple tables).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema", into = "RawSchema")]
pub struct SchemaSnapshot {
    /// Tables keyed by name, sorted for deterministic iteration.
    pub tables: BTreeMap<String, TableSnapshot>,
}

impl SchemaSnapshot {
    /// Creates an empty schema snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table snapshot, replacing any table with the same name.
    pub fn add_table(&mut self, table: TableSnapshot) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Adds a table snapshot.
    #[must_use]
    pub fn with_table(mut self, table: TableSnapshot) -> Self {
        self.add_table(table);
        self
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.get(name)
    }

    /// Returns table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Parses a snapshot from its JSON form, `{"tables": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a table name repeats.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Wire form of [`SchemaSnapshot`]: tables as a list.
#[derive(Serialize, Deserialize)]
struct RawSchema {
    #[serde(default)]
    tables: Vec<TableSnapshot>,
}

impl TryFrom<RawSchema> for SchemaSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawSchema) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for table in raw.tables {
            if tables.contains_key(&table.name) {
                return Err(SnapshotError::DuplicateTable(table.name));
            }
            tables.insert(table.name.clone(), table);
        }
        Ok(Self { tables })
    }
}

impl From<SchemaSnapshot> for RawSchema {
    fn from(schema: SchemaSnapshot) -> Self {
        Self {
            tables: schema.tables.into_values().collect(),
        }
    }
}

//! Foreign key diff engine.
//!
//! Compares the foreign keys of a "before" and an "after"
//! [`TableSnapshot`] and produces the [`DiffOperation`]s needed to go
//! from one to the other.
//!
//! Constraints are matched by structural [`Signature`] (constrained
//! columns, referred table, referred columns) rather than by name or by
//! position. A table's constraints form an unordered collection, while
//! the columns inside one constraint are ordered.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::operation::DiffOperation;
use crate::snapshot::{ForeignKeyAction, ForeignKeySnapshot, SchemaSnapshot, TableSnapshot};

/// How declared constraint names take part in equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Names are ignored. A pure rename produces no operation.
    #[default]
    Ignore,
    /// Names are compared. A pure rename produces a drop of the old
    /// constraint followed by an add of the new one.
    Compare,
}

/// Options for the differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffOptions {
    /// Whether declared names are part of constraint equality.
    pub name_policy: NamePolicy,
    /// Whether ON DELETE / ON UPDATE actions are part of constraint
    /// equality.
    pub compare_actions: bool,
}

impl DiffOptions {
    /// Creates default options: structural equality only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name policy.
    #[must_use]
    pub const fn with_name_policy(mut self, policy: NamePolicy) -> Self {
        self.name_policy = policy;
        self
    }

    /// Includes referential actions in constraint equality.
    #[must_use]
    pub const fn with_action_comparison(mut self) -> Self {
        self.compare_actions = true;
        self
    }

    /// Computes the equality key of a constraint under these options.
    #[must_use]
    pub fn signature<'a>(&self, fk: &'a ForeignKeySnapshot) -> Signature<'a> {
        let name = match self.name_policy {
            NamePolicy::Ignore => None,
            NamePolicy::Compare => fk.name.as_deref(),
        };
        let (on_delete, on_update) = if self.compare_actions {
            (fk.on_delete, fk.on_update)
        } else {
            (None, None)
        };
        Signature {
            constrained_columns: &fk.constrained_columns,
            referred_table: &fk.referred_table,
            referred_columns: &fk.referred_columns,
            name,
            on_delete,
            on_update,
        }
    }
}

/// Structural equality key of a foreign key constraint.
///
/// Column slices are compared as ordered sequences, so `(a, b) -> (x, y)`
/// and `(b, a) -> (y, x)` are different signatures. Fields disabled by
/// [`DiffOptions`] are always `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature<'a> {
    /// Local columns, in order.
    pub constrained_columns: &'a [String],
    /// Referred table.
    pub referred_table: &'a str,
    /// Referred columns, in order.
    pub referred_columns: &'a [String],
    /// Declared name, when names are compared.
    pub name: Option<&'a str>,
    /// ON DELETE action, when actions are compared.
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action, when actions are compared.
    pub on_update: Option<ForeignKeyAction>,
}

/// Detects foreign key changes between snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignKeyDiffer {
    options: DiffOptions,
}

impl ForeignKeyDiffer {
    /// Creates a differ with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a differ with custom options.
    #[must_use]
    pub const fn with_options(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compares the foreign keys of one table and returns the operations
    /// needed to turn `before` into `after`.
    ///
    /// All drops come first, in `before` declaration order, followed by
    /// all adds in `after` declaration order. Drops are tagged with the
    /// `before` table name and adds with the `after` table name; the two
    /// are expected to match.
    #[must_use]
    pub fn diff(&self, before: &TableSnapshot, after: &TableSnapshot) -> Vec<DiffOperation> {
        if before.name != after.name {
            warn!(
                before = %before.name,
                after = %after.name,
                "Diffing foreign keys of differently named tables"
            );
        }

        let before_keys: HashSet<Signature<'_>> = before
            .foreign_keys
            .iter()
            .map(|fk| self.options.signature(fk))
            .collect();
        let after_keys: HashSet<Signature<'_>> = after
            .foreign_keys
            .iter()
            .map(|fk| self.options.signature(fk))
            .collect();
        trace!(
            table = %after.name,
            before = before_keys.len(),
            after = after_keys.len(),
            "Comparing foreign key signatures"
        );

        let mut operations = Vec::new();

        // FKs present in before but not in after -> DropForeignKey.
        for fk in &before.foreign_keys {
            if !after_keys.contains(&self.options.signature(fk)) {
                let op = DiffOperation::drop_foreign_key(&before.name, fk.clone());
                debug!(operation = %op, "Foreign key removed");
                operations.push(op);
            }
        }

        // FKs present in after but not in before -> AddForeignKey.
        for fk in &after.foreign_keys {
            if !before_keys.contains(&self.options.signature(fk)) {
                let op = DiffOperation::add_foreign_key(&after.name, fk.clone());
                debug!(operation = %op, "Foreign key added");
                operations.push(op);
            }
        }

        operations
    }

    /// Diffs every table present in both schemas, in table name order,
    /// and concatenates the results.
    ///
    /// Tables present on one side only are skipped.
    #[must_use]
    pub fn diff_schema(
        &self,
        before: &SchemaSnapshot,
        after: &SchemaSnapshot,
    ) -> Vec<DiffOperation> {
        let mut operations = Vec::new();
        for (name, before_table) in &before.tables {
            match after.table(name) {
                Some(after_table) => operations.extend(self.diff(before_table, after_table)),
                None => debug!(table = %name, "Skipping table missing from after snapshot"),
            }
        }
        for name in after.table_names() {
            if before.table(name).is_none() {
                debug!(table = %name, "Skipping table missing from before snapshot");
            }
        }
        operations
    }
}

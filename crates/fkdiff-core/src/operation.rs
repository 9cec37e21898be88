//! Diff operations.
//!
//! Each operation carries the parent table name and the complete
//! constraint, so a downstream DDL generator never has to look anything
//! up again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::ForeignKeySnapshot;

/// One atomic foreign key change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffOperation {
    /// Add a foreign key constraint.
    AddForeignKey(AddForeignKeyOp),
    /// Drop a foreign key constraint.
    DropForeignKey(DropForeignKeyOp),
}

impl DiffOperation {
    /// Creates an add foreign key operation.
    #[must_use]
    pub fn add_foreign_key(table: impl Into<String>, constraint: ForeignKeySnapshot) -> Self {
        Self::AddForeignKey(AddForeignKeyOp {
            table: table.into(),
            constraint,
        })
    }

    /// Creates a drop foreign key operation.
    #[must_use]
    pub fn drop_foreign_key(table: impl Into<String>, constraint: ForeignKeySnapshot) -> Self {
        Self::DropForeignKey(DropForeignKeyOp {
            table: table.into(),
            constraint,
        })
    }

    /// Short tag for the operation, `"add_fk"` or `"drop_fk"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddForeignKey(_) => "add_fk",
            Self::DropForeignKey(_) => "drop_fk",
        }
    }

    /// Name of the table owning the constraint.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::AddForeignKey(op) => &op.table,
            Self::DropForeignKey(op) => &op.table,
        }
    }

    /// The constraint being added or dropped.
    #[must_use]
    pub const fn constraint(&self) -> &ForeignKeySnapshot {
        match self {
            Self::AddForeignKey(op) => &op.constraint,
            Self::DropForeignKey(op) => &op.constraint,
        }
    }

    /// Returns the operation that undoes this one.
    ///
    /// Drops keep the full constraint definition, so every operation
    /// can be reversed.
    #[must_use]
    pub fn reverse(&self) -> Self {
        match self {
            Self::AddForeignKey(op) => Self::drop_foreign_key(&op.table, op.constraint.clone()),
            Self::DropForeignKey(op) => Self::add_foreign_key(&op.table, op.constraint.clone()),
        }
    }
}

impl fmt::Display for DiffOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fk = self.constraint();
        write!(
            f,
            "{} {} ({}) -> {} ({})",
            self.kind(),
            self.table(),
            fk.constrained_columns.join(", "),
            fk.referred_table,
            fk.referred_columns.join(", ")
        )?;
        if let Some(action) = fk.on_delete {
            write!(f, " ON DELETE {}", action.keyword())?;
        }
        if let Some(action) = fk.on_update {
            write!(f, " ON UPDATE {}", action.keyword())?;
        }
        if let Some(ref name) = fk.name {
            write!(f, " [{name}]")?;
        }
        Ok(())
    }
}

/// Add foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddForeignKeyOp {
    /// Parent table name.
    pub table: String,
    /// The new constraint, carrying its declared name if any.
    pub constraint: ForeignKeySnapshot,
}

impl From<AddForeignKeyOp> for DiffOperation {
    fn from(op: AddForeignKeyOp) -> Self {
        Self::AddForeignKey(op)
    }
}

/// Drop foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropForeignKeyOp {
    /// Parent table name.
    pub table: String,
    /// The constraint as it existed before the change.
    pub constraint: ForeignKeySnapshot,
}

impl From<DropForeignKeyOp> for DiffOperation {
    fn from(op: DropForeignKeyOp) -> Self {
        Self::DropForeignKey(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ForeignKeyAction;

    fn composite() -> ForeignKeySnapshot {
        ForeignKeySnapshot::new(["other_id_1", "other_id_2"], "table", ["id_1", "id_2"])
            .named("fk_test_name")
    }

    #[test]
    fn kind_and_accessors() {
        let op = DiffOperation::add_foreign_key("user", composite());
        assert_eq!(op.kind(), "add_fk");
        assert_eq!(op.table(), "user");
        assert_eq!(op.constraint().name.as_deref(), Some("fk_test_name"));

        let op = DiffOperation::drop_foreign_key("user", composite());
        assert_eq!(op.kind(), "drop_fk");
    }

    #[test]
    fn reverse_swaps_add_and_drop() {
        let add = DiffOperation::add_foreign_key("user", composite());
        let drop = add.reverse();
        assert_eq!(drop, DiffOperation::drop_foreign_key("user", composite()));
        assert_eq!(drop.reverse(), add);
    }

    #[test]
    fn display_describes_constraint() {
        let op = DiffOperation::add_foreign_key(
            "user",
            composite().on_delete(ForeignKeyAction::Cascade),
        );
        assert_eq!(
            op.to_string(),
            "add_fk user (other_id_1, other_id_2) -> table (id_1, id_2) ON DELETE CASCADE [fk_test_name]"
        );

        let op = DiffOperation::drop_foreign_key(
            "user",
            ForeignKeySnapshot::new(["test2"], "table", ["test"]),
        );
        assert_eq!(op.to_string(), "drop_fk user (test2) -> table (test)");
    }

    #[test]
    fn serializes_with_op_tag() {
        let op = DiffOperation::drop_foreign_key(
            "user",
            ForeignKeySnapshot::new(["test2"], "table", ["test"]),
        );
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["op"], "drop_foreign_key");
        assert_eq!(value["table"], "user");
        assert_eq!(value["constraint"]["referred_table"], "table");

        let back: DiffOperation = serde_json::from_value(value).unwrap();
        assert_eq!(back, op);
    }
}

//! # fkdiff-core
//!
//! Foreign key diffing between two schema snapshots.
//!
//! Given a "before" and an "after" description of a table, the differ
//! reports which foreign key constraints must be dropped and which must
//! be added. Constraints are matched structurally: same local columns in
//! the same order, same referred table, same referred columns in the same
//! order. Declared names are carried through but, by default, do not take
//! part in equality.
//!
//! # Example
//!
//! ```rust
//! use fkdiff_core::prelude::*;
//!
//! let before = TableSnapshot::new("user")
//!     .with_column(ColumnSnapshot::new("id", "INTEGER").primary_key())
//!     .with_column(ColumnSnapshot::new("test2", "VARCHAR(10)"))
//!     .with_foreign_key(ForeignKeySnapshot::new(["test2"], "table", ["test"]));
//! let after = TableSnapshot::new("user")
//!     .with_column(ColumnSnapshot::new("id", "INTEGER").primary_key())
//!     .with_column(ColumnSnapshot::new("test2", "VARCHAR(10)"));
//!
//! let ops = ForeignKeyDiffer::new().diff(&before, &after);
//! assert_eq!(ops.len(), 1);
//! assert_eq!(ops[0].kind(), "drop_fk");
//! assert_eq!(ops[0].table(), "user");
//! assert_eq!(ops[0].constraint().referred_table, "table");
//! ```

pub mod diff;
pub mod error;
pub mod operation;
pub mod snapshot;

pub use diff::{DiffOptions, ForeignKeyDiffer, NamePolicy, Signature};
pub use error::{Result, SnapshotError};
pub use operation::{AddForeignKeyOp, DiffOperation, DropForeignKeyOp};
pub use snapshot::{
    ColumnSnapshot, ForeignKeyAction, ForeignKeySnapshot, SchemaSnapshot, TableSnapshot,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::diff::{DiffOptions, ForeignKeyDiffer, NamePolicy};
    pub use crate::error::{Result, SnapshotError};
    pub use crate::operation::{AddForeignKeyOp, DiffOperation, DropForeignKeyOp};
    pub use crate::snapshot::{
        ColumnSnapshot, ForeignKeyAction, ForeignKeySnapshot, SchemaSnapshot, TableSnapshot,
    };
}

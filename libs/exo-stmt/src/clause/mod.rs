// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The clauses a statement is composed of. Each clause validates its own arguments when it is
//! constructed; statement-wide rules live in [`crate::check`].

use crate::check_error::{CheckError, ClauseKind};

mod assignment;
mod for_update;
mod from;
mod group_by;
mod insert_values;
mod limit;
mod on_conflict;
mod order_by;
mod returning;
mod select_columns;
mod select_flags;
mod single_table;
mod union;
mod update_set;
mod where_clause;
mod with;

pub use assignment::{AssignValue, Assignment};
pub use for_update::ForUpdateClause;
pub use from::{FromClause, UsingClause};
pub use group_by::{GroupByClause, HavingClause};
pub use insert_values::InsertValues;
pub use limit::{LimitClause, OffsetClause};
pub use on_conflict::{ConflictAction, ConflictTarget, OnConflict, excluded, on_conflict};
pub use order_by::OrderByClause;
pub use returning::ReturningClause;
pub use select_columns::{ResultField, SelectColumn, SelectColumnList, all_of};
pub use select_flags::{SelectFlag, SelectFlagList};
pub use single_table::SingleTable;
pub use union::{UnionClause, UnionKind};
pub use update_set::UpdateSet;
pub use where_clause::WhereClause;
pub use with::WithClause;

pub(crate) use assignment::check_assignments;
pub(crate) use select_columns::{check_unique_names, fields_match};

/// Populate an absent statement slot
pub(crate) fn supply<T>(
    slot: &mut Option<T>,
    clause: ClauseKind,
    value: T,
) -> Result<(), CheckError> {
    if slot.is_some() {
        return Err(CheckError::ClauseAlreadySupplied { clause });
    }
    *slot = Some(value);
    Ok(())
}

pub(crate) fn non_empty<T>(items: Vec<T>, clause: ClauseKind) -> Result<Vec<T>, CheckError> {
    if items.is_empty() {
        Err(CheckError::EmptyArgumentList { clause })
    } else {
        Ok(items)
    }
}

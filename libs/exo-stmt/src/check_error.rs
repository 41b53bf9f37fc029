// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::value::ValueType;

/// The clause slots a statement can hold. Used to describe which clause a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    With,
    SelectFlags,
    SelectColumns,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Union,
    Into,
    InsertValues,
    UpdateTable,
    UpdateSet,
    DeleteFrom,
    Using,
    Returning,
    OnConflict,
    ForUpdate,
    CustomQuery,
    Join,
    Function,
}

impl Display for ClauseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClauseKind::With => "WITH",
            ClauseKind::SelectFlags => "select flags",
            ClauseKind::SelectColumns => "select columns",
            ClauseKind::From => "FROM",
            ClauseKind::Where => "WHERE",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::Having => "HAVING",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::Limit => "LIMIT",
            ClauseKind::Offset => "OFFSET",
            ClauseKind::Union => "UNION",
            ClauseKind::Into => "INTO",
            ClauseKind::InsertValues => "insert values",
            ClauseKind::UpdateTable => "UPDATE table",
            ClauseKind::UpdateSet => "SET",
            ClauseKind::DeleteFrom => "DELETE FROM",
            ClauseKind::Using => "USING",
            ClauseKind::Returning => "RETURNING",
            ClauseKind::OnConflict => "ON CONFLICT",
            ClauseKind::ForUpdate => "FOR UPDATE",
            ClauseKind::CustomQuery => "custom query parts",
            ClauseKind::Join => "JOIN",
            ClauseKind::Function => "function arguments",
        };
        write!(f, "{name}")
    }
}

/// Column operations that a column spec may prohibit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnOperation {
    Insert,
    Update,
}

impl Display for ColumnOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnOperation::Insert => write!(f, "inserted"),
            ColumnOperation::Update => write!(f, "updated"),
        }
    }
}

/// A statement that is ill-formed for composition, preparation, or execution.
///
/// Construction entry points report local violations immediately; statement-wide rules are
/// reported by [`crate::Statement::check_consistency`] and table/CTE closure by
/// [`crate::Statement::check_prepare`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("Missing required clause: {clause}")]
    MissingRequiredClause { clause: ClauseKind },

    #[error("Statement uses tables or CTEs that are not provided: {}", .names.join(", "))]
    UnknownTableOrCte { names: Vec<String> },

    #[error("Statement statically uses tables or CTEs that are only provided dynamically: {}", .names.join(", "))]
    StaticallyUnknownTableOrCte { names: Vec<String> },

    #[error("Table or CTE '{name}' is provided more than once")]
    DuplicateTableProvider { name: String },

    #[error("Output column name '{name}' is used more than once")]
    DuplicateOutputColumnName { name: String },

    #[error("Column '{column}' is assigned more than once")]
    DuplicateAssignmentColumn { column: String },

    #[error("Column '{column}' must not be {operation}")]
    ProhibitedColumnOperation {
        column: String,
        operation: ColumnOperation,
    },

    #[error("Incompatible operand types for '{operator}': {lhs} and {rhs}")]
    IncompatibleOperandTypes {
        operator: String,
        lhs: ValueType,
        rhs: ValueType,
    },

    #[error("Aggregate functions cannot be nested: {expression}")]
    AggregateNesting { expression: String },

    #[error("Expression '{expression}' in {clause} mixes aggregate and non-aggregate values")]
    AggregateConsistencyViolation { clause: ClauseKind, expression: String },

    #[error("Expression compares '{expression}' with itself")]
    SelfComparison { expression: String },

    #[error("At least one argument is required for {clause}")]
    EmptyArgumentList { clause: ClauseKind },

    #[error("{clause} requires an integral argument, found {found}")]
    NonIntegralLimitOffset { clause: ClauseKind, found: ValueType },

    #[error("Clause {clause} has already been supplied")]
    ClauseAlreadySupplied { clause: ClauseKind },

    #[error("Column '{column}' requires a value on insert")]
    MissingRequiredInsertColumn { column: String },

    #[error("Insert row does not match the declared columns ({expected})")]
    InsertRowMismatch { expected: String },

    #[error("UNION operands have different result rows")]
    UnionResultMismatch,

    #[error("Sub-select used as a value must select exactly one column (found {found})")]
    NotASingleColumnSelect { found: usize },

    #[error("Statement has unbound parameters: {}", .names.join(", "))]
    UnboundParameters { names: Vec<String> },

    #[error("Statement has no parameter named '{name}'")]
    UnknownParameter { name: String },

    #[error("{feature} is not supported by the {dialect} dialect")]
    UnsupportedByDialect {
        feature: &'static str,
        dialect: &'static str,
    },
}

impl CheckError {
    pub(crate) fn incompatible(
        operator: impl Into<String>,
        lhs: ValueType,
        rhs: ValueType,
    ) -> Self {
        CheckError::IncompatibleOperandTypes {
            operator: operator.into(),
            lhs,
            rhs,
        }
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind, ColumnOperation};
use crate::dependency::Node;
use crate::dynamic::MaybeDynamic;
use crate::schema::{Column, Table};
use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::{AssignValue, Assignment, check_assignments, non_empty};

/// What an INSERT inserts: default values only, one row of assignments, or a column list plus
/// any number of rows
#[derive(Debug, Clone, PartialEq)]
pub enum InsertValues {
    DefaultValues,
    Assignments(Vec<MaybeDynamic<Assignment>>),
    Rows {
        columns: Vec<Column>,
        rows: Vec<Vec<AssignValue>>,
    },
}

impl InsertValues {
    pub(crate) fn default_values(table: &Table) -> Result<Self, CheckError> {
        check_required_columns(table, &[])?;
        Ok(InsertValues::DefaultValues)
    }

    pub(crate) fn assignments(
        table: &Table,
        assignments: Vec<MaybeDynamic<Assignment>>,
    ) -> Result<Self, CheckError> {
        let assignments = non_empty(assignments, ClauseKind::InsertValues)?;
        check_assignments(&assignments, ColumnOperation::Insert)?;

        let assigned: Vec<&Column> = assignments
            .iter()
            .filter(|assignment| !assignment.is_dynamic())
            .map(|assignment| assignment.inner().column())
            .collect();
        check_required_columns(table, &assigned)?;

        Ok(InsertValues::Assignments(assignments))
    }

    pub(crate) fn columns(table: &Table, columns: Vec<Column>) -> Result<Self, CheckError> {
        let columns = non_empty(columns, ClauseKind::InsertValues)?;
        let defaults: Vec<MaybeDynamic<Assignment>> = columns
            .iter()
            .map(|column| MaybeDynamic::Static(column.assign_default()))
            .collect();
        check_assignments(&defaults, ColumnOperation::Insert)?;
        check_required_columns(table, &columns.iter().collect::<Vec<_>>())?;

        Ok(InsertValues::Rows {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row to a column list insert. The row must assign exactly the declared columns, in
    /// the declared order.
    pub(crate) fn add_row(self, row: Vec<Assignment>) -> Result<Self, CheckError> {
        match self {
            InsertValues::Rows { columns, mut rows } => {
                let matches = row.len() == columns.len()
                    && row
                        .iter()
                        .zip(&columns)
                        .all(|(assignment, column)| assignment.column() == column);
                if !matches {
                    return Err(CheckError::InsertRowMismatch {
                        expected: columns
                            .iter()
                            .map(|column| column.name())
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
                rows.push(row.into_iter().map(|assignment| assignment.value().clone()).collect());
                Ok(InsertValues::Rows { columns, rows })
            }
            _ => Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::InsertValues,
            }),
        }
    }

    /// A column list insert needs at least one row
    pub(crate) fn check(&self) -> Result<(), CheckError> {
        match self {
            InsertValues::Rows { rows, .. } if rows.is_empty() => {
                Err(CheckError::EmptyArgumentList {
                    clause: ClauseKind::InsertValues,
                })
            }
            _ => Ok(()),
        }
    }
}

fn check_required_columns(table: &Table, assigned: &[&Column]) -> Result<(), CheckError> {
    for required in table.required_insert_columns() {
        let present = assigned
            .iter()
            .any(|column| column.table_name() == table.name() && column.name() == required.name);
        if !present {
            return Err(CheckError::MissingRequiredInsertColumn {
                column: format!("{}.{}", table.name(), required.name),
            });
        }
    }
    Ok(())
}

impl Node for InsertValues {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match self {
            InsertValues::DefaultValues => vec![],
            InsertValues::Assignments(assignments) => assignments
                .iter()
                .map(|assignment| assignment as &dyn Node)
                .collect(),
            InsertValues::Rows { columns, rows } => columns
                .iter()
                .map(|column| column as &dyn Node)
                .chain(rows.iter().flatten().map(|value| value as &dyn Node))
                .collect(),
        }
    }
}

impl ExpressionBuilder for InsertValues {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            InsertValues::DefaultValues => builder.push_str(" DEFAULT VALUES"),
            InsertValues::Assignments(assignments) => {
                let active: Vec<&Assignment> =
                    assignments.iter().filter_map(MaybeDynamic::active).collect();
                if active.is_empty() {
                    builder.push_str(" DEFAULT VALUES");
                    return;
                }
                builder.push_str(" (");
                builder.without_fully_qualified_column_names(|builder| {
                    builder.push_iter(active.iter(), ", ", |builder, assignment| {
                        assignment.column().build(builder)
                    })
                });
                builder.push_str(") VALUES (");
                builder.push_iter(active.iter(), ", ", |builder, assignment| {
                    assignment.value().build(builder)
                });
                builder.push(')');
            }
            InsertValues::Rows { columns, rows } => {
                builder.push_str(" (");
                builder.without_fully_qualified_column_names(|builder| {
                    builder.push_elems(columns, ", ")
                });
                builder.push_str(") VALUES ");
                builder.push_iter(rows.iter(), ", ", |builder, row| {
                    builder.push('(');
                    builder.push_elems(row, ", ");
                    builder.push(')');
                });
            }
        }
    }
}

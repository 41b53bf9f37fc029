// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind, ColumnOperation};
use crate::dependency::{NameSet, Node, difference, name_set, union_of};
use crate::dynamic::MaybeDynamic;
use crate::schema::Column;
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::Expr;

use super::where_clause::check_condition;
use super::{Assignment, check_assignments, non_empty};

const EXCLUDED: &str = "excluded";

/// The row proposed for insertion, as seen from `ON CONFLICT ... DO UPDATE`
pub fn excluded(column: &Column) -> Column {
    Column::new(EXCLUDED, column.spec().clone())
}

/// Start an `ON CONFLICT` clause for the given conflict target (may be empty for `DO NOTHING`)
pub fn on_conflict(target: Vec<Column>) -> ConflictTarget {
    ConflictTarget { target }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictTarget {
    target: Vec<Column>,
}

impl ConflictTarget {
    pub fn do_nothing(self) -> OnConflict {
        OnConflict {
            target: self.target,
            action: ConflictAction::DoNothing,
        }
    }

    pub fn do_update<I, A>(self, assignments: I) -> Result<OnConflict, CheckError>
    where
        I: IntoIterator<Item = A>,
        A: Into<MaybeDynamic<Assignment>>,
    {
        let target = non_empty(self.target, ClauseKind::OnConflict)?;
        let assignments = non_empty(
            assignments.into_iter().map(Into::into).collect(),
            ClauseKind::OnConflict,
        )?;
        check_assignments(&assignments, ColumnOperation::Update)?;

        Ok(OnConflict {
            target,
            action: ConflictAction::DoUpdate {
                assignments,
                condition: None,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        assignments: Vec<MaybeDynamic<Assignment>>,
        condition: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    target: Vec<Column>,
    action: ConflictAction,
}

impl OnConflict {
    /// Restrict `DO UPDATE` to the rows matching `condition`
    pub fn where_(self, condition: impl Into<Expr>) -> Result<OnConflict, CheckError> {
        let condition = condition.into();
        match self.action {
            ConflictAction::DoUpdate {
                assignments,
                condition: None,
            } => {
                check_condition(&condition, ClauseKind::OnConflict)?;
                Ok(OnConflict {
                    target: self.target,
                    action: ConflictAction::DoUpdate {
                        assignments,
                        condition: Some(condition),
                    },
                })
            }
            _ => Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::Where,
            }),
        }
    }

    pub fn action(&self) -> &ConflictAction {
        &self.action
    }
}

impl Node for OnConflict {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = self
            .target
            .iter()
            .map(|column| column as &dyn Node)
            .collect();
        if let ConflictAction::DoUpdate {
            assignments,
            condition,
        } = &self.action
        {
            nodes.extend(assignments.iter().map(|assignment| assignment as &dyn Node));
            nodes.extend(condition.iter().map(|condition| condition as &dyn Node));
        }
        nodes
    }

    fn required_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_tables_of());
        difference(&required, &name_set([EXCLUDED]))
    }

    fn required_static_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_static_tables_of());
        difference(&required, &name_set([EXCLUDED]))
    }
}

impl ExpressionBuilder for OnConflict {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(" ON CONFLICT ");
        if !self.target.is_empty() {
            builder.push('(');
            builder.without_fully_qualified_column_names(|builder| {
                builder.push_elems(&self.target, ", ")
            });
            builder.push_str(") ");
        }
        match &self.action {
            ConflictAction::DoNothing => builder.push_str("DO NOTHING"),
            ConflictAction::DoUpdate {
                assignments,
                condition,
            } => {
                let active: Vec<&Assignment> =
                    assignments.iter().filter_map(MaybeDynamic::active).collect();
                builder.push_str("DO UPDATE SET ");
                builder.push_iter(active.into_iter(), ", ", |builder, assignment| {
                    assignment.build(builder)
                });
                if let Some(condition) = condition {
                    builder.push_str(" WHERE ");
                    condition.build(builder);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Standard;
    use crate::testing::{TableExt, foo};
    use crate::value::Comparable;

    #[test]
    fn do_nothing() {
        let foo = foo();
        assert_binding!(
            on_conflict(vec![]).do_nothing().to_sql(&Standard),
            " ON CONFLICT DO NOTHING"
        );
        assert_binding!(
            on_conflict(vec![foo.col("id")]).do_nothing().to_sql(&Standard),
            " ON CONFLICT (id) DO NOTHING"
        );
    }

    #[test]
    fn do_update_with_excluded_row() {
        let foo = foo();
        let name = foo.col("name");
        let clause = on_conflict(vec![foo.col("id")])
            .do_update([name.assign(excluded(&name)).unwrap()])
            .unwrap()
            .where_(name.clone().not_equal(excluded(&name)).unwrap())
            .unwrap();

        assert_eq!(clause.required_tables_of(), name_set(["foo"]));
        assert_binding!(
            clause.to_sql(&Standard),
            " ON CONFLICT (id) DO UPDATE SET name = excluded.name WHERE foo.name <> excluded.name"
        );
    }

    #[test]
    fn do_update_needs_target_and_assignments() {
        let foo = foo();
        let name = foo.col("name");

        assert_eq!(
            on_conflict(vec![])
                .do_update([name.assign("x").unwrap()])
                .map(|_| ()),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::OnConflict
            })
        );
        assert_eq!(
            on_conflict(vec![foo.col("id")])
                .do_update(Vec::<Assignment>::new())
                .map(|_| ()),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::OnConflict
            })
        );
        assert!(
            on_conflict(vec![foo.col("id")])
                .do_nothing()
                .where_(name.is_null())
                .is_err()
        );
    }
}

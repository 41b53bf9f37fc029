// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check::require;
use crate::check_error::{CheckError, ClauseKind};
use crate::clause::{
    Assignment, ResultField, ReturningClause, SelectColumn, SingleTable, UpdateSet, WhereClause,
    supply,
};
use crate::dependency::{NameSet, Node, difference, union_of};
use crate::dynamic::MaybeDynamic;
use crate::schema::Table;
use crate::sql::{Dialect, ExpressionBuilder, SQLBuilder};
use crate::value::Expr;

use super::Statement;

pub fn update(table: &Table) -> UpdateStatement {
    UpdateStatement {
        table: Some(SingleTable::new(table)),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateStatement {
    table: Option<SingleTable>,
    set: Option<UpdateSet>,
    where_: Option<WhereClause>,
    returning: Option<ReturningClause>,
}

impl UpdateStatement {
    pub fn table(mut self, table: &Table) -> Result<Self, CheckError> {
        supply(&mut self.table, ClauseKind::UpdateTable, SingleTable::new(table))?;
        Ok(self)
    }

    /// The assignments to make; at least one of them must be static
    pub fn set<I, A>(self, assignments: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = A>,
        A: Into<MaybeDynamic<Assignment>>,
    {
        self.supply_set(assignments, false)
    }

    /// Like [`UpdateStatement::set`], but all assignments may be dynamic. The statement fails its
    /// consistency check if none of them is active.
    pub fn dynamic_set<I, A>(self, assignments: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = A>,
        A: Into<MaybeDynamic<Assignment>>,
    {
        self.supply_set(assignments, true)
    }

    fn supply_set<I, A>(mut self, assignments: I, dynamic_only: bool) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = A>,
        A: Into<MaybeDynamic<Assignment>>,
    {
        let set = UpdateSet::new(assignments.into_iter().map(Into::into).collect(), dynamic_only)?;
        supply(&mut self.set, ClauseKind::UpdateSet, set)?;
        Ok(self)
    }

    pub fn where_(mut self, condition: impl Into<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        let where_ = WhereClause::new(condition.into())?;
        supply(&mut self.where_, ClauseKind::Where, where_)?;
        Ok(self)
    }

    /// Explicitly update every row
    pub fn unconditionally(mut self) -> Result<Self, CheckError> {
        supply(&mut self.where_, ClauseKind::Where, WhereClause::Unconditional)?;
        Ok(self)
    }

    pub fn returning(mut self, columns: Vec<SelectColumn>) -> Result<Self, CheckError> {
        let returning = ReturningClause::new(columns)?;
        supply(&mut self.returning, ClauseKind::Returning, returning)?;
        Ok(self)
    }
}

impl Statement for UpdateStatement {
    fn check_consistency(&self) -> Result<(), CheckError> {
        require(&self.table, ClauseKind::UpdateTable)?;
        require(&self.set, ClauseKind::UpdateSet)?;
        if let Some(set) = &self.set {
            set.check_active()?;
        }
        require(&self.where_, ClauseKind::Where)
    }

    fn result_fields(&self) -> Vec<ResultField> {
        self.returning
            .as_ref()
            .map(ReturningClause::fields)
            .unwrap_or_default()
    }

    fn check_dialect(&self, dialect: &dyn Dialect) -> Result<(), CheckError> {
        if self.returning.is_some() && !dialect.supports_returning() {
            return Err(CheckError::UnsupportedByDialect {
                feature: "RETURNING",
                dialect: dialect.name(),
            });
        }
        Ok(())
    }
}

impl Node for UpdateStatement {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = Vec::new();
        nodes.extend(self.table.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.set.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.where_.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.returning.iter().map(|clause| clause as &dyn Node));
        nodes
    }

    fn required_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_tables_of());
        difference(&required, &self.provided_tables_of())
    }

    fn required_static_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_static_tables_of());
        difference(&required, &self.provided_static_tables_of())
    }

    fn provided_tables_of(&self) -> NameSet {
        self.table.provided_tables_of()
    }
}

impl ExpressionBuilder for UpdateStatement {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("UPDATE ");
        self.table.build(builder);
        self.set.build(builder);
        self.where_.build(builder);
        self.returning.build(builder);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::columns;
    use crate::dynamic::dynamic;
    use crate::sql::{MySql, Postgres, Standard};
    use crate::statement::select;
    use crate::testing::{TableExt, bar, foo};
    use crate::value::{Comparable, DataType, parameter};

    #[test]
    fn update_with_where() {
        let foo = foo();
        let statement = update(&foo)
            .set([
                MaybeDynamic::from(foo.col("name").assign("x").unwrap()),
                dynamic(true, foo.col("age").assign(3).unwrap()).into(),
            ])
            .unwrap()
            .where_(foo.col("id").equal(17).unwrap())
            .unwrap();

        assert!(statement.check_run().is_ok());
        assert!(statement.result_fields().is_empty());
        assert_binding!(
            statement.to_sql(&Standard),
            "UPDATE foo SET name = 'x', age = 3 WHERE foo.id = 17"
        );
    }

    #[test]
    fn where_is_required() {
        let foo = foo();
        let statement = update(&foo)
            .set([foo.col("name").assign("x").unwrap()])
            .unwrap();

        assert_eq!(
            statement.check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::Where
            })
        );

        let statement = statement.unconditionally().unwrap();
        assert!(statement.check_run().is_ok());
        assert_binding!(statement.to_sql(&Standard), "UPDATE foo SET name = 'x'");

        assert_eq!(
            update(&foo).unconditionally().unwrap().check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::UpdateSet
            })
        );
        assert_eq!(
            UpdateStatement::default().check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::UpdateTable
            })
        );
    }

    #[test]
    fn slots_are_filled_once() {
        let foo = foo();
        let statement = update(&foo).unconditionally().unwrap();
        assert_eq!(
            statement.clone().where_(foo.col("id").equal(1).unwrap()),
            Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::Where
            })
        );
        assert_eq!(
            statement.table(&foo),
            Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::UpdateTable
            })
        );
    }

    #[test]
    fn dynamic_only_assignments() {
        let foo = foo();
        assert_eq!(
            update(&foo).set([dynamic(true, foo.col("name").assign("x").unwrap())]),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::UpdateSet
            })
        );

        let statement = update(&foo)
            .dynamic_set([dynamic(true, foo.col("name").assign("x").unwrap())])
            .unwrap()
            .unconditionally()
            .unwrap();
        assert_binding!(statement.to_sql(&Standard), "UPDATE foo SET name = 'x'");
    }

    #[test]
    fn no_active_assignment() {
        let foo = foo();
        let statement = update(&foo)
            .dynamic_set([
                dynamic(false, foo.col("name").assign("x").unwrap()),
                dynamic(false, foo.col("age").assign(3).unwrap()),
            ])
            .unwrap()
            .unconditionally()
            .unwrap();

        assert_eq!(
            statement.serialize(&Postgres),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::UpdateSet
            })
        );
    }

    #[test]
    fn where_uses_other_tables() {
        let (foo, bar) = (foo(), bar());
        let statement = update(&foo)
            .set([foo.col("name").assign("x").unwrap()])
            .unwrap()
            .where_(bar.col("id").equal(1).unwrap())
            .unwrap();

        assert_eq!(
            statement.check_prepare(),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["bar".to_string()]
            })
        );

        let statement = update(&foo)
            .set([foo.col("name").assign("x").unwrap()])
            .unwrap()
            .where_(
                foo.col("id")
                    .in_select(
                        select(columns![bar.col("foo_id")])
                            .unwrap()
                            .from(&bar)
                            .unwrap()
                            .unconditionally()
                            .unwrap(),
                    )
                    .unwrap(),
            )
            .unwrap();
        assert!(statement.check_prepare().is_ok());
        assert_binding!(
            statement.to_sql(&Standard),
            "UPDATE foo SET name = 'x' WHERE foo.id IN (SELECT bar.foo_id FROM bar)"
        );
    }

    #[test]
    fn parameters_and_returning() {
        let foo = foo();
        let statement = update(&foo)
            .set([foo
                .col("age")
                .assign(parameter("age", DataType::Integral))
                .unwrap()])
            .unwrap()
            .where_(foo.col("id").equal(parameter("id", DataType::Integral)).unwrap())
            .unwrap()
            .returning(columns![foo.col("age")])
            .unwrap();

        assert!(statement.check_prepare().is_ok());
        assert!(matches!(
            statement.check_run(),
            Err(CheckError::UnboundParameters { .. })
        ));

        let serialized = statement.serialize(&Postgres).unwrap();
        assert_eq!(
            serialized.sql,
            "UPDATE foo SET age = $1 WHERE foo.id = $2 RETURNING foo.age"
        );
        assert_params!(serialized.parameters, "age", "id");

        assert!(matches!(
            statement.serialize(&MySql),
            Err(CheckError::UnsupportedByDialect { .. })
        ));
    }
}

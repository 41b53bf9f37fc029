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
    Assignment, InsertValues, OnConflict, ResultField, ReturningClause, SelectColumn, SingleTable,
    supply,
};
use crate::dependency::{NameSet, Node, difference, union_of};
use crate::dynamic::MaybeDynamic;
use crate::schema::{Column, Table};
use crate::sql::{Dialect, ExpressionBuilder, SQLBuilder};

use super::Statement;

pub fn insert_into(table: &Table) -> InsertStatement {
    InsertStatement {
        into: Some(SingleTable::new(table)),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertStatement {
    into: Option<SingleTable>,
    values: Option<InsertValues>,
    on_conflict: Option<OnConflict>,
    returning: Option<ReturningClause>,
}

impl InsertStatement {
    pub fn into_table(mut self, table: &Table) -> Result<Self, CheckError> {
        supply(&mut self.into, ClauseKind::Into, SingleTable::new(table))?;
        Ok(self)
    }

    fn table(&self) -> Result<&Table, CheckError> {
        self.into
            .as_ref()
            .map(SingleTable::table)
            .ok_or(CheckError::MissingRequiredClause {
                clause: ClauseKind::Into,
            })
    }

    /// Insert a single row given as assignments; unassigned columns get their default
    pub fn set<I, A>(mut self, assignments: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = A>,
        A: Into<MaybeDynamic<Assignment>>,
    {
        let values = InsertValues::assignments(
            self.table()?,
            assignments.into_iter().map(Into::into).collect(),
        )?;
        supply(&mut self.values, ClauseKind::InsertValues, values)?;
        Ok(self)
    }

    pub fn default_values(mut self) -> Result<Self, CheckError> {
        let values = InsertValues::default_values(self.table()?)?;
        supply(&mut self.values, ClauseKind::InsertValues, values)?;
        Ok(self)
    }

    /// Declare the columns of a multi-row insert; rows follow with [`InsertStatement::add_values`]
    pub fn columns<I>(mut self, columns: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = Column>,
    {
        let values = InsertValues::columns(self.table()?, columns.into_iter().collect())?;
        supply(&mut self.values, ClauseKind::InsertValues, values)?;
        Ok(self)
    }

    pub fn add_values<I>(mut self, row: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = Assignment>,
    {
        let values = self.values.take().ok_or(CheckError::MissingRequiredClause {
            clause: ClauseKind::InsertValues,
        })?;
        self.values = Some(values.add_row(row.into_iter().collect())?);
        Ok(self)
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Result<Self, CheckError> {
        supply(&mut self.on_conflict, ClauseKind::OnConflict, on_conflict)?;
        Ok(self)
    }

    pub fn returning(mut self, columns: Vec<SelectColumn>) -> Result<Self, CheckError> {
        let returning = ReturningClause::new(columns)?;
        supply(&mut self.returning, ClauseKind::Returning, returning)?;
        Ok(self)
    }
}

impl Statement for InsertStatement {
    fn check_consistency(&self) -> Result<(), CheckError> {
        require(&self.into, ClauseKind::Into)?;
        require(&self.values, ClauseKind::InsertValues)?;
        if let Some(values) = &self.values {
            values.check()?;
        }
        Ok(())
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
        if self.on_conflict.is_some() && !dialect.supports_on_conflict() {
            return Err(CheckError::UnsupportedByDialect {
                feature: "ON CONFLICT",
                dialect: dialect.name(),
            });
        }
        Ok(())
    }
}

impl Node for InsertStatement {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = Vec::new();
        nodes.extend(self.into.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.values.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.on_conflict.iter().map(|clause| clause as &dyn Node));
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
        self.into.provided_tables_of()
    }
}

impl ExpressionBuilder for InsertStatement {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("INSERT INTO ");
        self.into.build(builder);
        self.values.build(builder);
        self.on_conflict.build(builder);
        self.returning.build(builder);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::clause::{excluded, on_conflict};
    use crate::columns;
    use crate::dynamic::dynamic;
    use crate::sql::{MySql, Postgres, Sqlite, Standard};
    use crate::testing::{TableExt, bar, baz, foo};
    use crate::value::{DataType, parameter};

    #[test]
    fn insert_with_assignments() {
        let foo = foo();
        let statement = insert_into(&foo)
            .set([
                MaybeDynamic::from(foo.col("name").assign("x").unwrap()),
                dynamic(false, foo.col("age").assign(3).unwrap()).into(),
            ])
            .unwrap();

        assert!(statement.check_run().is_ok());
        assert_binding!(
            statement.to_sql(&Standard),
            "INSERT INTO foo (name) VALUES ('x')"
        );
    }

    #[test]
    fn insert_rows() {
        let bar = bar();
        let id = bar.col("id");
        let statement = insert_into(&bar)
            .columns([id.clone()])
            .unwrap()
            .add_values([id.assign(17).unwrap()])
            .unwrap()
            .add_values([id.assign_default()])
            .unwrap();

        assert!(statement.check_prepare().is_ok());
        assert_binding!(
            statement.to_sql(&Standard),
            "INSERT INTO bar (id) VALUES (17), (DEFAULT)"
        );
    }

    #[test]
    fn values_are_required() {
        let bar = bar();
        assert_eq!(
            insert_into(&bar).check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::InsertValues
            })
        );
        assert_eq!(
            InsertStatement::default().set([bar.col("label").assign("x").unwrap()]),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::Into
            })
        );
        assert_eq!(
            insert_into(&bar).add_values([bar.col("id").assign(1).unwrap()]),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::InsertValues
            })
        );
        assert_eq!(
            insert_into(&bar)
                .columns([bar.col("id")])
                .unwrap()
                .check_consistency(),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::InsertValues
            })
        );
    }

    #[test]
    fn default_values_and_parameters() {
        let bar = bar();
        assert_binding!(
            insert_into(&bar).default_values().unwrap().to_sql(&Standard),
            "INSERT INTO bar DEFAULT VALUES"
        );

        let statement = insert_into(&bar)
            .set([bar.col("label").assign(parameter("label", DataType::Text)).unwrap()])
            .unwrap();
        assert_binding!(
            statement.to_sql(&Sqlite),
            "INSERT INTO bar (label) VALUES (?)",
            "label"
        );
        assert!(matches!(
            statement.check_run(),
            Err(CheckError::UnboundParameters { .. })
        ));
    }

    #[test]
    fn columns_of_other_tables() {
        let (foo, bar) = (foo(), bar());
        let statement = insert_into(&bar)
            .set([foo.col("name").assign("x").unwrap()])
            .unwrap();

        assert!(statement.check_consistency().is_ok());
        assert_eq!(
            statement.check_prepare(),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["foo".to_string()]
            })
        );
    }

    #[test]
    fn upsert_with_returning() {
        let foo = foo();
        let name = foo.col("name");
        let statement = insert_into(&foo)
            .set([name.assign("x").unwrap()])
            .unwrap()
            .on_conflict(
                on_conflict(vec![foo.col("id")])
                    .do_update([name.assign(excluded(&name)).unwrap()])
                    .unwrap(),
            )
            .unwrap()
            .returning(columns![foo.col("id")])
            .unwrap();

        assert!(statement.check_prepare().is_ok());
        assert_eq!(statement.result_fields().len(), 1);
        insta::assert_snapshot!(
            statement.serialize(&Postgres).unwrap().sql,
            @"INSERT INTO foo (name) VALUES ('x') ON CONFLICT (id) DO UPDATE SET name = excluded.name RETURNING foo.id"
        );
        assert_eq!(
            statement.serialize(&MySql),
            Err(CheckError::UnsupportedByDialect {
                feature: "RETURNING",
                dialect: "mysql"
            })
        );
    }

    #[test]
    fn prohibited_columns() {
        let baz = baz();
        assert!(matches!(
            insert_into(&baz).set([baz.col("computed").assign(1).unwrap()]),
            Err(CheckError::ProhibitedColumnOperation { .. })
        ));
    }
}

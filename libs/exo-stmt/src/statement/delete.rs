// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check::{check_providers, require};
use crate::check_error::{CheckError, ClauseKind};
use crate::clause::{
    ResultField, ReturningClause, SelectColumn, SingleTable, UsingClause, WhereClause, supply,
};
use crate::dependency::{NameSet, Node, difference, union_of};
use crate::dynamic::MaybeDynamic;
use crate::relation::{JoinKind, Relation};
use crate::schema::Table;
use crate::sql::{Dialect, ExpressionBuilder, SQLBuilder};
use crate::value::Expr;

use super::Statement;

pub fn delete_from(table: &Table) -> DeleteStatement {
    DeleteStatement {
        from: Some(SingleTable::new(table)),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteStatement {
    from: Option<SingleTable>,
    using: Option<UsingClause>,
    where_: Option<WhereClause>,
    returning: Option<ReturningClause>,
}

impl DeleteStatement {
    pub fn from(mut self, table: &Table) -> Result<Self, CheckError> {
        supply(&mut self.from, ClauseKind::DeleteFrom, SingleTable::new(table))?;
        Ok(self)
    }

    /// Further tables for the WHERE condition. They must not include the table rows are deleted
    /// from.
    pub fn using(mut self, relation: impl Into<Relation>) -> Result<Self, CheckError> {
        let using = UsingClause::new(relation.into());
        check_providers(&[&self.from, &using])?;
        supply(&mut self.using, ClauseKind::Using, using)?;
        Ok(self)
    }

    pub fn where_(mut self, condition: impl Into<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        let where_ = WhereClause::new(condition.into())?;
        supply(&mut self.where_, ClauseKind::Where, where_)?;
        Ok(self)
    }

    /// Explicitly delete every row
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

impl Statement for DeleteStatement {
    fn check_consistency(&self) -> Result<(), CheckError> {
        require(&self.from, ClauseKind::DeleteFrom)?;
        require(&self.where_, ClauseKind::Where)?;
        check_providers(&[&self.from, &self.using])
    }

    fn result_fields(&self) -> Vec<ResultField> {
        self.returning
            .as_ref()
            .map(ReturningClause::fields)
            .unwrap_or_default()
    }

    fn check_dialect(&self, dialect: &dyn Dialect) -> Result<(), CheckError> {
        let full_outer_join = self
            .using
            .as_ref()
            .is_some_and(|using| using.uses_join_kind(JoinKind::FullOuter));
        if full_outer_join && !dialect.supports_full_outer_join() {
            return Err(CheckError::UnsupportedByDialect {
                feature: "FULL OUTER JOIN",
                dialect: dialect.name(),
            });
        }
        if self.returning.is_some() && !dialect.supports_returning() {
            return Err(CheckError::UnsupportedByDialect {
                feature: "RETURNING",
                dialect: dialect.name(),
            });
        }
        Ok(())
    }
}

impl Node for DeleteStatement {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = Vec::new();
        nodes.extend(self.from.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.using.iter().map(|clause| clause as &dyn Node));
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
        let mut provided = self.from.provided_tables_of();
        provided.extend(self.using.provided_tables_of());
        provided
    }

    fn provided_static_tables_of(&self) -> NameSet {
        let mut provided = self.from.provided_static_tables_of();
        provided.extend(self.using.provided_static_tables_of());
        provided
    }
}

impl ExpressionBuilder for DeleteStatement {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("DELETE FROM ");
        self.from.build(builder);
        self.using.build(builder);
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
    use crate::relation::Joinable;
    use crate::sql::{MySql, Sqlite, Standard};
    use crate::testing::{TableExt, bar, baz, foo};
    use crate::value::{Comparable, Logical};

    #[test]
    fn delete_with_where() {
        let foo = foo();
        let statement = delete_from(&foo)
            .where_(foo.col("age").less(18).unwrap())
            .unwrap();

        assert!(statement.check_run().is_ok());
        assert_binding!(
            statement.to_sql(&Standard),
            "DELETE FROM foo WHERE foo.age < 18"
        );
    }

    #[test]
    fn where_is_required() {
        let foo = foo();
        assert_eq!(
            delete_from(&foo).check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::Where
            })
        );
        assert_eq!(
            DeleteStatement::default()
                .unconditionally()
                .unwrap()
                .check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::DeleteFrom
            })
        );

        let statement = delete_from(&foo).unconditionally().unwrap();
        assert!(statement.check_run().is_ok());
        assert_binding!(statement.to_sql(&Standard), "DELETE FROM foo");
    }

    #[test]
    fn delete_using() {
        let (foo, bar) = (foo(), bar());
        let statement = delete_from(&bar)
            .using(&foo)
            .unwrap()
            .where_(
                bar.col("foo_id")
                    .equal(foo.col("id"))
                    .unwrap()
                    .and(foo.col("name").equal("x").unwrap())
                    .unwrap(),
            )
            .unwrap();

        assert!(statement.check_prepare().is_ok());
        assert_binding!(
            statement.to_sql(&Standard),
            "DELETE FROM bar USING foo WHERE (bar.foo_id = foo.id) AND (foo.name = 'x')"
        );

        assert_eq!(
            delete_from(&bar).using(&bar),
            Err(CheckError::DuplicateTableProvider {
                name: "bar".to_string()
            })
        );
        assert_eq!(
            delete_from(&bar).unconditionally().unwrap().where_(foo.col("id").equal(1).unwrap()),
            Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::Where
            })
        );
    }

    #[test]
    fn where_needs_using() {
        let (foo, bar) = (foo(), bar());
        let statement = delete_from(&bar)
            .where_(bar.col("foo_id").equal(foo.col("id")).unwrap())
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
    fn dynamic_using_join() {
        let (foo, bar, baz) = (foo(), bar(), baz());
        let using = foo
            .clone()
            .left_outer_join(dynamic(true, &baz))
            .unwrap()
            .on(baz.col("id").equal(foo.col("id")).unwrap())
            .unwrap();

        // The condition uses baz statically but it is only provided dynamically
        let statement = delete_from(&bar)
            .using(using)
            .unwrap()
            .where_(baz.col("label").equal(bar.col("label")).unwrap())
            .unwrap();
        assert_eq!(
            statement.check_prepare(),
            Err(CheckError::StaticallyUnknownTableOrCte {
                names: vec!["baz".to_string()]
            })
        );
    }

    #[test]
    fn dialect_support() {
        let foo = foo();
        let statement = delete_from(&foo)
            .unconditionally()
            .unwrap()
            .returning(columns![foo.col("id")])
            .unwrap();

        assert_eq!(
            statement.serialize(&Sqlite).unwrap().sql,
            "DELETE FROM foo RETURNING foo.id"
        );
        assert_eq!(
            statement.serialize(&MySql),
            Err(CheckError::UnsupportedByDialect {
                feature: "RETURNING",
                dialect: "mysql"
            })
        );
    }
}

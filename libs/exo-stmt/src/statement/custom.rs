// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Statements assembled from parts the regular builders cannot express: dialect specific commands
//! (`PRAGMA ...`), statement prefixes (`INSERT INTO t (c)` followed by a select) and the like.
//! Statement parts keep their own checks; verbatim text is taken as is.

use crate::check_error::{CheckError, ClauseKind};
use crate::clause::non_empty;
use crate::dependency::Node;
use crate::sql::{Dialect, ExpressionBuilder, SQLBuilder};

use super::{
    DeleteStatement, InsertStatement, ResultField, SelectStatement, Statement, UpdateStatement,
};

/// One part of a custom query
#[derive(Debug, Clone, PartialEq)]
pub enum CustomPart {
    Verbatim(String),
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl CustomPart {
    fn statement(&self) -> Option<&dyn Statement> {
        match self {
            CustomPart::Verbatim(_) => None,
            CustomPart::Select(select) => Some(select),
            CustomPart::Insert(insert) => Some(insert),
            CustomPart::Update(update) => Some(update),
            CustomPart::Delete(delete) => Some(delete),
        }
    }
}

impl From<&str> for CustomPart {
    fn from(sql: &str) -> Self {
        CustomPart::Verbatim(sql.to_string())
    }
}

impl From<String> for CustomPart {
    fn from(sql: String) -> Self {
        CustomPart::Verbatim(sql)
    }
}

impl From<SelectStatement> for CustomPart {
    fn from(select: SelectStatement) -> Self {
        CustomPart::Select(select)
    }
}

impl From<InsertStatement> for CustomPart {
    fn from(insert: InsertStatement) -> Self {
        CustomPart::Insert(insert)
    }
}

impl From<UpdateStatement> for CustomPart {
    fn from(update: UpdateStatement) -> Self {
        CustomPart::Update(update)
    }
}

impl From<DeleteStatement> for CustomPart {
    fn from(delete: DeleteStatement) -> Self {
        CustomPart::Delete(delete)
    }
}

/// Parts are rendered in order, separated by a space
pub fn custom_query<I, P>(parts: I) -> Result<CustomQuery, CheckError>
where
    I: IntoIterator<Item = P>,
    P: Into<CustomPart>,
{
    let parts = non_empty(
        parts.into_iter().map(Into::into).collect(),
        ClauseKind::CustomQuery,
    )?;
    Ok(CustomQuery {
        parts,
        result_fields: None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomQuery {
    parts: Vec<CustomPart>,
    result_fields: Option<Vec<ResultField>>,
}

impl CustomQuery {
    /// Produce the rows of `statement` instead of the rows of the last statement part
    pub fn with_result_type_of(mut self, statement: &dyn Statement) -> Self {
        self.result_fields = Some(statement.result_fields());
        self
    }

    pub fn parts(&self) -> &[CustomPart] {
        &self.parts
    }

    fn statements(&self) -> impl Iterator<Item = &dyn Statement> {
        self.parts.iter().filter_map(CustomPart::statement)
    }
}

impl Statement for CustomQuery {
    fn check_consistency(&self) -> Result<(), CheckError> {
        self.statements()
            .try_for_each(|statement| statement.check_consistency())
    }

    fn result_fields(&self) -> Vec<ResultField> {
        match &self.result_fields {
            Some(fields) => fields.clone(),
            None => self
                .statements()
                .map(|statement| statement.result_fields())
                .filter(|fields| !fields.is_empty())
                .last()
                .unwrap_or_default(),
        }
    }

    fn check_dialect(&self, dialect: &dyn Dialect) -> Result<(), CheckError> {
        self.statements()
            .try_for_each(|statement| statement.check_dialect(dialect))
    }
}

/// Parts do not provide tables or CTEs to each other: every statement part must be closed on its
/// own, so the query requires what its parts leave unresolved
impl Node for CustomQuery {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                CustomPart::Verbatim(_) => None,
                CustomPart::Select(select) => Some(select as &dyn Node),
                CustomPart::Insert(insert) => Some(insert as &dyn Node),
                CustomPart::Update(update) => Some(update as &dyn Node),
                CustomPart::Delete(delete) => Some(delete as &dyn Node),
            })
            .collect()
    }

    fn contains_aggregate(&self) -> bool {
        false
    }
}

impl ExpressionBuilder for CustomQuery {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_iter(self.parts.iter(), " ", |builder, part| match part {
            CustomPart::Verbatim(sql) => builder.push_str(sql),
            CustomPart::Select(select) => select.build(builder),
            CustomPart::Insert(insert) => insert.build(builder),
            CustomPart::Update(update) => update.build(builder),
            CustomPart::Delete(delete) => delete.build(builder),
        });
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::columns;
    use crate::sql::{Postgres, Sqlite};
    use crate::statement::select;
    use crate::testing::{TableExt, bar, foo};
    use crate::value::{Aliasable, Comparable, DataType, Expr, ValueType, exists, not, parameter};

    #[test]
    fn pragma_with_result_type() {
        let query = custom_query(["PRAGMA user_version"])
            .unwrap()
            .with_result_type_of(&select(columns![Expr::from(1).as_("user_version")]).unwrap());

        assert!(query.check_run().is_ok());
        assert_eq!(
            query.serialize(&Sqlite).unwrap().sql,
            "PRAGMA user_version"
        );
        assert_eq!(
            query.result_fields(),
            vec![ResultField {
                name: "user_version".to_string(),
                value_type: ValueType::new(DataType::Integral)
            }]
        );
    }

    #[test]
    fn insert_from_select() {
        let foo = foo();
        let name = parameter("name", DataType::Text);
        let taken = select(columns![foo.col("id")])
            .unwrap()
            .from(&foo)
            .unwrap()
            .where_(foo.col("name").equal(name.clone()).unwrap())
            .unwrap();
        let copy = select(columns![name.as_("name")])
            .unwrap()
            .where_(not(exists(taken).unwrap()).unwrap())
            .unwrap();
        let query = custom_query([CustomPart::from("INSERT INTO foo (name)"), copy.into()]).unwrap();

        assert!(query.check_prepare().is_ok());
        let statement = query.serialize(&Postgres).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO foo (name) SELECT $1 AS name WHERE NOT (EXISTS (SELECT foo.id FROM foo WHERE foo.name = $2))"
        );
        assert_eq!(statement.parameters.len(), 2);
    }

    #[test]
    fn parts_do_not_resolve_each_other() {
        let (foo, bar) = (foo(), bar());
        let explain = |statement: SelectStatement| {
            custom_query([CustomPart::from("EXPLAIN"), statement.into()]).unwrap()
        };

        let labels = select(columns![bar.col("label")])
            .unwrap()
            .from(&bar)
            .unwrap()
            .unconditionally()
            .unwrap();
        assert_eq!(
            explain(labels).serialize(&Postgres).unwrap().sql,
            "EXPLAIN SELECT bar.label FROM bar"
        );

        let query = custom_query([
            CustomPart::from(
                select(columns![foo.col("id")])
                    .unwrap()
                    .from(&foo)
                    .unwrap()
                    .unconditionally()
                    .unwrap(),
            ),
            "UNION ALL".into(),
            select(columns![foo.col("id")]).unwrap().into(),
        ])
        .unwrap();
        assert_eq!(
            query.check_prepare(),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["foo".to_string()]
            })
        );
    }

    #[test]
    fn parts_keep_their_checks() {
        let foo = foo();
        assert_eq!(
            custom_query(Vec::<CustomPart>::new()),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::CustomQuery
            })
        );

        let unfinished = select(columns![foo.col("id")]).unwrap().from(&foo).unwrap();
        assert_eq!(
            custom_query([unfinished]).unwrap().check_consistency(),
            Err(CheckError::MissingRequiredClause {
                clause: ClauseKind::Where
            })
        );

        let locked = select(columns![foo.col("id")])
            .unwrap()
            .from(&foo)
            .unwrap()
            .unconditionally()
            .unwrap()
            .for_update()
            .unwrap();
        assert!(matches!(
            custom_query([locked]).unwrap().serialize(&Sqlite),
            Err(CheckError::UnsupportedByDialect { .. })
        ));
    }
}

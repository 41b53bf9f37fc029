// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind};
use crate::dependency::{NameSet, Node};
use crate::dynamic::{Dynamic, MaybeDynamic};
use crate::schema::{Column, Table};
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::{Aliased, Aliasable, Expr, Typed, ValueType};

use super::non_empty;

/// A named output column of a SELECT (or RETURNING) clause
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn(MaybeDynamic<Aliased>);

impl SelectColumn {
    pub fn name(&self) -> &str {
        self.0.inner().name()
    }

    pub fn expr(&self) -> &Expr {
        self.0.inner().expr()
    }

    pub fn is_dynamic(&self) -> bool {
        self.0.is_dynamic()
    }

    /// The type of the column in the result row. Dynamic columns and columns using tables from
    /// the optional side of an outer join may be `NULL`.
    pub(crate) fn field(&self, optional_tables: &NameSet) -> ResultField {
        let expr = self.expr();
        let uses_optional_table = expr
            .required_tables_of()
            .iter()
            .any(|table| optional_tables.contains(table));

        ResultField {
            name: self.name().to_string(),
            value_type: expr
                .value_type()
                .with_nullable(self.is_dynamic() || uses_optional_table),
        }
    }
}

impl From<Aliased> for SelectColumn {
    fn from(aliased: Aliased) -> Self {
        SelectColumn(MaybeDynamic::Static(aliased))
    }
}

impl From<Column> for SelectColumn {
    fn from(column: Column) -> Self {
        let name = column.name().to_string();
        SelectColumn::from(column.as_(name))
    }
}

impl From<&Column> for SelectColumn {
    fn from(column: &Column) -> Self {
        SelectColumn::from(column.clone())
    }
}

impl From<Dynamic<Aliased>> for SelectColumn {
    fn from(aliased: Dynamic<Aliased>) -> Self {
        SelectColumn(MaybeDynamic::Dynamic(aliased))
    }
}

impl From<Dynamic<Column>> for SelectColumn {
    fn from(column: Dynamic<Column>) -> Self {
        SelectColumn::from(column.map(|column| {
            let name = column.name().to_string();
            column.as_(name)
        }))
    }
}

impl From<Dynamic<&Column>> for SelectColumn {
    fn from(column: Dynamic<&Column>) -> Self {
        SelectColumn::from(column.map(Column::clone))
    }
}

impl Node for SelectColumn {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![&self.0]
    }
}

impl Node for Aliased {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![self.expr()]
    }
}

impl ExpressionBuilder for Aliased {
    fn build(&self, builder: &mut SQLBuilder) {
        self.expr().build(builder);

        let named_by_column = matches!(self.expr(), Expr::Column(column) if column.name() == self.name());
        if !named_by_column {
            builder.push_str(" AS ");
            builder.push_identifier(self.name());
        }
    }
}

impl ExpressionBuilder for SelectColumn {
    fn build(&self, builder: &mut SQLBuilder) {
        match self.0.active() {
            Some(aliased) => aliased.build(builder),
            None => {
                builder.push_str("NULL AS ");
                builder.push_identifier(self.name());
            }
        }
    }
}

/// Select columns from a list of expressions that convert into [`SelectColumn`]s
#[macro_export]
macro_rules! columns {
    ($($column:expr),* $(,)?) => {
        vec![$($crate::SelectColumn::from($column)),*]
    };
}

/// All columns of a table, in declaration order
pub fn all_of(table: &Table) -> Vec<SelectColumn> {
    table.all_columns().into_iter().map(SelectColumn::from).collect()
}

/// The name and type of a result row column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultField {
    pub name: String,
    pub value_type: ValueType,
}

/// Whether two result rows can be combined (UNION): same arity, pairwise comparable types
pub(crate) fn fields_match(lhs: &[ResultField], rhs: &[ResultField]) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(l, r)| l.value_type.is_comparable_with(&r.value_type))
}

pub(crate) fn check_unique_names(columns: &[SelectColumn]) -> Result<(), CheckError> {
    let mut names = NameSet::new();
    for column in columns {
        if !names.insert(column.name().to_string()) {
            return Err(CheckError::DuplicateOutputColumnName {
                name: column.name().to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumnList {
    columns: Vec<SelectColumn>,
}

impl SelectColumnList {
    pub(crate) fn new(columns: Vec<SelectColumn>) -> Result<Self, CheckError> {
        let columns = non_empty(columns, ClauseKind::SelectColumns)?;
        check_unique_names(&columns)?;
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[SelectColumn] {
        &self.columns
    }

    pub(crate) fn fields(&self, optional_tables: &NameSet) -> Vec<ResultField> {
        self.columns
            .iter()
            .map(|column| column.field(optional_tables))
            .collect()
    }
}

impl Node for SelectColumnList {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.columns.iter().map(|column| column as &dyn Node).collect()
    }
}

impl ExpressionBuilder for SelectColumnList {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_elems(&self.columns, ", ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::name_set;
    use crate::dynamic::dynamic;
    use crate::sql::Standard;
    use crate::testing::{TableExt, foo};
    use crate::value::{DataType, count_all};

    #[test]
    fn rendering() {
        let foo = foo();
        let list = SelectColumnList::new(columns![
            foo.col("id"),
            foo.col("name").as_("label"),
            count_all().as_("total"),
            dynamic(false, foo.col("age")),
            dynamic(true, foo.col("flag")),
        ])
        .unwrap();

        assert_binding!(
            list.to_sql(&Standard),
            "foo.id, foo.name AS label, COUNT(*) AS total, NULL AS age, foo.flag"
        );
    }

    #[test]
    fn names_must_be_unique() {
        let foo = foo();

        assert_eq!(
            SelectColumnList::new(columns![foo.col("id"), foo.col("age").as_("id")]),
            Err(CheckError::DuplicateOutputColumnName {
                name: "id".to_string()
            })
        );
        assert_eq!(
            SelectColumnList::new(vec![]),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::SelectColumns
            })
        );
    }

    #[test]
    fn result_fields() {
        let foo = foo();
        let list =
            SelectColumnList::new(columns![foo.col("id"), dynamic(true, foo.col("name"))]).unwrap();

        let plain = list.fields(&NameSet::new());
        assert_eq!(plain[0].value_type, ValueType::new(DataType::Integral));
        assert_eq!(plain[1].value_type, ValueType::nullable(DataType::Text));

        let optional = list.fields(&name_set(["foo"]));
        assert!(optional[0].value_type.nullable);
    }
}

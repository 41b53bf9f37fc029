// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Relations: everything that can appear in a FROM clause and provides table names to a
//! statement.

use crate::check_error::CheckError;
use crate::dependency::{NameSet, Node, name_set};
use crate::dynamic::maybe_dynamic_from;
use crate::schema::{Column, ColumnSpec, Table, TableAlias};
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::statement::{ResultField, SelectStatement};

mod cte;
mod join;

pub use cte::{Cte, CteBuilder, CteRef, cte};
pub use join::{Join, JoinKind, Joinable, PreJoin};

#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Table(Table),
    Alias(TableAlias),
    Join(Box<Join>),
    Derived(DerivedTable),
    Cte(CteRef),
    Verbatim(VerbatimTable),
}

impl Relation {
    fn as_node(&self) -> &dyn Node {
        match self {
            Relation::Table(table) => table,
            Relation::Alias(alias) => alias,
            Relation::Join(join) => join.as_ref(),
            Relation::Derived(derived) => derived,
            Relation::Cte(cte) => cte,
            Relation::Verbatim(verbatim) => verbatim,
        }
    }

    /// Whether a join of the given kind appears anywhere in the relation
    pub(crate) fn uses_join_kind(&self, kind: JoinKind) -> bool {
        match self {
            Relation::Join(join) => join.uses_join_kind(kind),
            _ => false,
        }
    }
}

impl Node for Relation {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![self.as_node()]
    }

    fn provided_tables_of(&self) -> NameSet {
        self.as_node().provided_tables_of()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        self.as_node().provided_static_tables_of()
    }

    fn provided_optional_tables_of(&self) -> NameSet {
        self.as_node().provided_optional_tables_of()
    }

    fn provided_ctes_of(&self) -> NameSet {
        self.as_node().provided_ctes_of()
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        self.as_node().provided_static_ctes_of()
    }
}

impl ExpressionBuilder for Relation {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Relation::Table(table) => table.build(builder),
            Relation::Alias(alias) => alias.build(builder),
            Relation::Join(join) => join.build(builder),
            Relation::Derived(derived) => derived.build(builder),
            Relation::Cte(cte) => cte.build(builder),
            Relation::Verbatim(verbatim) => verbatim.build(builder),
        }
    }
}

impl From<Table> for Relation {
    fn from(table: Table) -> Self {
        Relation::Table(table)
    }
}

impl From<&Table> for Relation {
    fn from(table: &Table) -> Self {
        Relation::Table(table.clone())
    }
}

impl From<TableAlias> for Relation {
    fn from(alias: TableAlias) -> Self {
        Relation::Alias(alias)
    }
}

impl From<Join> for Relation {
    fn from(join: Join) -> Self {
        Relation::Join(Box::new(join))
    }
}

impl From<DerivedTable> for Relation {
    fn from(derived: DerivedTable) -> Self {
        Relation::Derived(derived)
    }
}

impl From<CteRef> for Relation {
    fn from(cte: CteRef) -> Self {
        Relation::Cte(cte)
    }
}

impl From<VerbatimTable> for Relation {
    fn from(verbatim: VerbatimTable) -> Self {
        Relation::Verbatim(verbatim)
    }
}

maybe_dynamic_from!(Relation; Relation, Table, &Table, TableAlias, Join, DerivedTable, CteRef, VerbatimTable);

/// Columns of a relation that is defined by a select (derived tables, CTEs)
pub(crate) fn field_column(relation: &str, fields: &[ResultField], name: &str) -> Option<Column> {
    fields
        .iter()
        .find(|field| field.name == name)
        .map(|field| {
            let mut spec = ColumnSpec::new(&field.name, field.value_type.data_type);
            spec.flags.can_be_null = field.value_type.nullable;
            Column::new(relation, spec)
        })
}

/// A select used as a table: `(SELECT ...) AS name`
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    select: Box<SelectStatement>,
    alias: String,
    fields: Vec<ResultField>,
}

impl DerivedTable {
    pub(crate) fn new(select: SelectStatement, alias: String, fields: Vec<ResultField>) -> Self {
        Self {
            select: Box::new(select),
            alias,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.alias
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        field_column(&self.alias, &self.fields, name)
    }
}

impl Node for DerivedTable {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![self.select.as_ref()]
    }

    fn provided_tables_of(&self) -> NameSet {
        name_set([self.alias.as_str()])
    }
}

impl ExpressionBuilder for DerivedTable {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push('(');
        builder.with_fully_qualified_column_names(|builder| self.select.build(builder));
        builder.push_str(") AS ");
        builder.push_identifier(&self.alias);
    }
}

/// Raw SQL text used as a table under the given name
#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimTable {
    sql: String,
    name: String,
    columns: Vec<ColumnSpec>,
}

pub fn verbatim_table(
    sql: impl Into<String>,
    name: impl Into<String>,
    columns: Vec<ColumnSpec>,
) -> VerbatimTable {
    VerbatimTable {
        sql: sql.into(),
        name: name.into(),
        columns,
    }
}

impl VerbatimTable {
    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| Column::new(&self.name, spec.clone()))
    }
}

impl Node for VerbatimTable {
    fn provided_tables_of(&self) -> NameSet {
        name_set([self.name.as_str()])
    }
}

impl ExpressionBuilder for VerbatimTable {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(&self.sql);
        builder.push_str(" AS ");
        builder.push_identifier(&self.name);
    }
}

/// Fails with [`CheckError::DuplicateTableProvider`] if two provider sets share a name
pub(crate) fn check_disjoint_providers<'a>(
    providers: impl IntoIterator<Item = &'a NameSet>,
) -> Result<(), CheckError> {
    let mut seen = NameSet::new();
    for provided in providers {
        for name in provided {
            if !seen.insert(name.clone()) {
                return Err(CheckError::DuplicateTableProvider { name: name.clone() });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;
    use crate::sql::Standard;
    use crate::value::DataType;

    #[test]
    fn verbatim_table_provides_its_name() {
        let table = verbatim_table(
            "generate_series(1, 10)",
            "series",
            vec![ColumnSpec::new("series", DataType::Integral)],
        );

        assert_eq!(table.provided_tables_of(), name_set(["series"]));
        assert_eq!(
            table.column("series").unwrap().table_name(),
            "series"
        );
        assert_binding!(
            Relation::from(table).to_sql(&Standard),
            "generate_series(1, 10) AS series"
        );
    }

    #[test]
    fn disjoint_providers() {
        let a = name_set(["a", "b"]);
        let b = name_set(["c"]);
        let c = name_set(["b"]);

        assert!(check_disjoint_providers([&a, &b]).is_ok());
        assert_eq!(
            check_disjoint_providers([&a, &b, &c]),
            Err(CheckError::DuplicateTableProvider {
                name: "b".to_string()
            })
        );
    }
}

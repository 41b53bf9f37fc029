// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::dependency::{NameSet, Node, name_set};
use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::{Column, ColumnSpec};

/// A database table as described by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    columns: Vec<ColumnSpec>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns,
        }
    }

    pub fn with_schema(self, schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn column_specs(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| Column::new(&self.name, spec.clone()))
    }

    /// All columns in declaration order (the `table.*` selection)
    pub fn all_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|spec| Column::new(&self.name, spec.clone()))
            .collect()
    }

    pub fn alias(&self, alias: impl Into<String>) -> TableAlias {
        TableAlias {
            table: self.clone(),
            alias: alias.into(),
        }
    }

    pub(crate) fn required_insert_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|spec| spec.flags.requires_insert)
    }
}

impl Node for Table {
    fn provided_tables_of(&self) -> NameSet {
        name_set([self.name.as_str()])
    }
}

impl ExpressionBuilder for Table {
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(schema) = &self.schema {
            builder.push_identifier(schema);
            builder.push('.');
        }
        builder.push_identifier(&self.name);
    }
}

/// A table under another name, so that the same table can be used twice (e.g. a self join)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAlias {
    table: Table,
    alias: String,
}

impl TableAlias {
    pub fn name(&self) -> &str {
        &self.alias
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.table
            .column_specs()
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| Column::new(&self.alias, spec.clone()))
    }

    pub fn all_columns(&self) -> Vec<Column> {
        self.table
            .column_specs()
            .iter()
            .map(|spec| Column::new(&self.alias, spec.clone()))
            .collect()
    }
}

impl Node for TableAlias {
    fn provided_tables_of(&self) -> NameSet {
        name_set([self.alias.as_str()])
    }
}

impl ExpressionBuilder for TableAlias {
    fn build(&self, builder: &mut SQLBuilder) {
        self.table.build(builder);
        builder.push_str(" AS ");
        builder.push_identifier(&self.alias);
    }
}

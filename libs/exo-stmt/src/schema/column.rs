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
use crate::value::{DataType, Typed, ValueType};

/// Per-column constraints that drive the INSERT and UPDATE checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFlags {
    pub can_be_null: bool,
    pub has_default: bool,
    pub must_not_insert: bool,
    pub must_not_update: bool,
    /// The column must be assigned in every INSERT
    pub requires_insert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub flags: ColumnFlags,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            flags: ColumnFlags::default(),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.flags.can_be_null = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.flags.has_default = true;
        self
    }

    pub fn must_not_insert(mut self) -> Self {
        self.flags.must_not_insert = true;
        self
    }

    pub fn must_not_update(mut self) -> Self {
        self.flags.must_not_update = true;
        self
    }

    pub fn requires_insert(mut self) -> Self {
        self.flags.requires_insert = true;
        self
    }

    pub fn value_type(&self) -> ValueType {
        ValueType::new(self.data_type).with_nullable(self.flags.can_be_null)
    }
}

/// A column reference as used in expressions: a column spec reached through a table name (or
/// alias, CTE name, derived table name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    table: String,
    spec: ColumnSpec,
}

impl Column {
    pub(crate) fn new(table: impl Into<String>, spec: ColumnSpec) -> Self {
        Self {
            table: table.into(),
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    /// The column as `table.column`, used in diagnostics
    pub(crate) fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.spec.name)
    }
}

impl Typed for Column {
    fn value_type(&self) -> ValueType {
        self.spec.value_type()
    }
}

impl Node for Column {
    fn required_tables_of(&self) -> NameSet {
        name_set([self.table.as_str()])
    }

    fn required_static_tables_of(&self) -> NameSet {
        self.required_tables_of()
    }
}

impl ExpressionBuilder for Column {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_column(&self.table, &self.spec.name);
    }
}

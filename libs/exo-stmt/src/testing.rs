// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![cfg(test)]

//! Tables shared by the tests.

use crate::schema::{Column, ColumnSpec, Table, TableAlias};
use crate::value::DataType;

pub(crate) fn pk_column(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, DataType::Integral)
        .with_default()
        .must_not_update()
}

pub(crate) fn int_column(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, DataType::Integral)
}

pub(crate) fn string_column(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, DataType::Text)
}

/// `foo(id, name, age, flag, created, data)`; `name` is required on insert
pub(crate) fn foo() -> Table {
    Table::new(
        "foo",
        vec![
            pk_column("id"),
            string_column("name").requires_insert(),
            int_column("age").nullable(),
            ColumnSpec::new("flag", DataType::Boolean).nullable(),
            ColumnSpec::new("created", DataType::Timestamp)
                .nullable()
                .with_default(),
            ColumnSpec::new("data", DataType::Blob).nullable(),
        ],
    )
}

/// `bar(id, foo_id, label, amount)`
pub(crate) fn bar() -> Table {
    Table::new(
        "bar",
        vec![
            pk_column("id"),
            int_column("foo_id").nullable(),
            string_column("label").nullable(),
            ColumnSpec::new("amount", DataType::FloatingPoint).nullable(),
        ],
    )
}

/// `baz(id, label, computed)`; `computed` is maintained by the database
pub(crate) fn baz() -> Table {
    Table::new(
        "baz",
        vec![
            int_column("id"),
            string_column("label"),
            int_column("computed")
                .nullable()
                .must_not_insert()
                .must_not_update(),
        ],
    )
}

pub(crate) trait TableExt {
    /// The named column; panics if the table has no such column
    fn col(&self, name: &str) -> Column;
}

impl TableExt for Table {
    fn col(&self, name: &str) -> Column {
        self.column(name)
            .unwrap_or_else(|| panic!("no column {name} in {}", self.name()))
    }
}

impl TableExt for TableAlias {
    fn col(&self, name: &str) -> Column {
        self.column(name)
            .unwrap_or_else(|| panic!("no column {name} in {}", self.name()))
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::dependency::{NameSet, Node};
use crate::schema::Table;
use crate::sql::{ExpressionBuilder, SQLBuilder};

/// The target of INSERT INTO, UPDATE and DELETE FROM. Only base tables qualify: joins, aliases and
/// CTEs cannot be modified.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleTable {
    table: Table,
}

impl SingleTable {
    pub(crate) fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl Node for SingleTable {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![&self.table]
    }

    fn provided_tables_of(&self) -> NameSet {
        self.table.provided_tables_of()
    }
}

impl ExpressionBuilder for SingleTable {
    fn build(&self, builder: &mut SQLBuilder) {
        self.table.build(builder);
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Table and column descriptors supplied by the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod column;
mod table;

pub use column::{Column, ColumnFlags, ColumnSpec};
pub use table::{Table, TableAlias};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Table '{0}' is declared more than once")]
    DuplicateTable(String),

    #[error("Column '{column}' is declared more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },
}

/// A set of table descriptors, typically loaded from a JSON description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name() == name)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut table_names = std::collections::HashSet::new();
        for table in &self.tables {
            if !table_names.insert(table.name()) {
                return Err(SchemaError::DuplicateTable(table.name().to_string()));
            }

            let mut column_names = std::collections::HashSet::new();
            for column in table.column_specs() {
                if !column_names.insert(column.name.as_str()) {
                    return Err(SchemaError::DuplicateColumn {
                        table: table.name().to_string(),
                        column: column.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

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
use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::{ResultField, SelectColumn, check_unique_names, non_empty};

/// `RETURNING` of INSERT, UPDATE and DELETE
#[derive(Debug, Clone, PartialEq)]
pub struct ReturningClause {
    columns: Vec<SelectColumn>,
}

impl ReturningClause {
    pub(crate) fn new(columns: Vec<SelectColumn>) -> Result<Self, CheckError> {
        let columns = non_empty(columns, ClauseKind::Returning)?;
        check_unique_names(&columns)?;
        if let Some(aggregate) = columns
            .iter()
            .find(|column| column.expr().contains_aggregate())
        {
            return Err(CheckError::AggregateConsistencyViolation {
                clause: ClauseKind::Returning,
                expression: aggregate.expr().to_sql_text(),
            });
        }
        Ok(Self { columns })
    }

    pub(crate) fn fields(&self) -> Vec<ResultField> {
        self.columns
            .iter()
            .map(|column| column.field(&NameSet::new()))
            .collect()
    }
}

impl Node for ReturningClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.columns
            .iter()
            .map(|column| column as &dyn Node)
            .collect()
    }
}

impl ExpressionBuilder for ReturningClause {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(" RETURNING ");
        builder.push_elems(&self.columns, ", ");
    }
}

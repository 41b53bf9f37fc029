// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind};
use crate::dependency::Node;
use crate::dynamic::MaybeDynamic;
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::{Expr, Typed};

/// The WHERE slot: a (possibly dynamic) boolean condition, or an explicit "no condition"
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Condition(MaybeDynamic<Expr>),
    Unconditional,
}

impl WhereClause {
    pub(crate) fn new(condition: MaybeDynamic<Expr>) -> Result<Self, CheckError> {
        check_condition(condition.inner(), ClauseKind::Where)?;
        Ok(WhereClause::Condition(condition))
    }
}

/// Conditions must be boolean and, outside of HAVING, must not aggregate
pub(crate) fn check_condition(condition: &Expr, clause: ClauseKind) -> Result<(), CheckError> {
    let condition_type = condition.value_type();
    if !condition_type.data_type.is_boolean() {
        return Err(CheckError::incompatible(
            clause.to_string(),
            condition_type,
            condition_type,
        ));
    }
    if clause != ClauseKind::Having && condition.contains_aggregate() {
        return Err(CheckError::AggregateConsistencyViolation {
            clause,
            expression: condition.to_sql_text(),
        });
    }
    Ok(())
}

impl Node for WhereClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match self {
            WhereClause::Condition(condition) => vec![condition],
            WhereClause::Unconditional => vec![],
        }
    }
}

impl ExpressionBuilder for WhereClause {
    fn build(&self, builder: &mut SQLBuilder) {
        if let WhereClause::Condition(condition) = self {
            if let Some(condition) = condition.active() {
                builder.push_str(" WHERE ");
                condition.build(builder);
            }
        }
    }
}

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
use crate::value::Expr;

use super::non_empty;
use super::where_clause::check_condition;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    expressions: Vec<MaybeDynamic<Expr>>,
}

impl GroupByClause {
    pub(crate) fn new(expressions: Vec<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        let expressions = non_empty(expressions, ClauseKind::GroupBy)?;
        if let Some(aggregate) = expressions
            .iter()
            .find(|expression| expression.inner().contains_aggregate())
        {
            return Err(CheckError::AggregateConsistencyViolation {
                clause: ClauseKind::GroupBy,
                expression: aggregate.inner().to_sql_text(),
            });
        }
        Ok(Self { expressions })
    }

    /// All grouping expressions, including dynamic ones
    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.expressions.iter().map(MaybeDynamic::inner)
    }

    /// Grouping expressions that are present regardless of run-time conditions
    pub fn static_expressions(&self) -> impl Iterator<Item = &Expr> {
        self.expressions
            .iter()
            .filter(|expression| !expression.is_dynamic())
            .map(MaybeDynamic::inner)
    }
}

impl Node for GroupByClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.expressions
            .iter()
            .map(|expression| expression as &dyn Node)
            .collect()
    }
}

impl ExpressionBuilder for GroupByClause {
    fn build(&self, builder: &mut SQLBuilder) {
        let active: Vec<&Expr> = self
            .expressions
            .iter()
            .filter_map(MaybeDynamic::active)
            .collect();
        if active.is_empty() {
            return;
        }
        builder.push_str(" GROUP BY ");
        builder.push_iter(active.into_iter(), ", ", |builder, expression| {
            expression.build(builder)
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    condition: MaybeDynamic<Expr>,
}

impl HavingClause {
    pub(crate) fn new(condition: MaybeDynamic<Expr>) -> Result<Self, CheckError> {
        check_condition(condition.inner(), ClauseKind::Having)?;
        Ok(Self { condition })
    }

    pub fn condition(&self) -> &Expr {
        self.condition.inner()
    }
}

impl Node for HavingClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![&self.condition]
    }
}

impl ExpressionBuilder for HavingClause {
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(condition) = self.condition.active() {
            builder.push_str(" HAVING ");
            condition.build(builder);
        }
    }
}

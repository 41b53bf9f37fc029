// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind};
use crate::clause::{GroupByClause, HavingClause, OrderByClause, SelectColumnList};
use crate::dependency::Node;
use crate::value::Expr;

/// Whether `expr` has a single value per group: an aggregate, a grouping expression, a constant,
/// or composed only of such expressions
fn is_aggregate_expression(expr: &Expr, group_by: &[&Expr]) -> bool {
    if group_by.contains(&expr) {
        return true;
    }
    match expr {
        Expr::Aggregate(_) => true,
        Expr::Column(_) | Expr::Window(_) => false,
        Expr::Value(_) | Expr::Parameter(_) | Expr::Verbatim { .. } | Expr::Exists(_) => true,
        _ => expr
            .sub_expressions()
            .into_iter()
            .all(|sub_expression| is_aggregate_expression(sub_expression, group_by)),
    }
}

fn check_expression(expr: &Expr, group_by: &[&Expr], clause: ClauseKind) -> Result<(), CheckError> {
    if is_aggregate_expression(expr, group_by) {
        Ok(())
    } else {
        Err(CheckError::AggregateConsistencyViolation {
            clause,
            expression: expr.to_sql_text(),
        })
    }
}

/// A select that groups (GROUP BY), aggregates in its columns or ORDER BY, or filters groups
/// (HAVING) may only use aggregate expressions in its columns, HAVING and ORDER BY. Static
/// columns may only rely on static grouping expressions, since dynamic ones may be absent.
pub(crate) fn check_aggregates(
    columns: &SelectColumnList,
    group_by: Option<&GroupByClause>,
    having: Option<&HavingClause>,
    order_by: Option<&OrderByClause>,
) -> Result<(), CheckError> {
    let aggregating = group_by.is_some()
        || having.is_some()
        || columns
            .columns()
            .iter()
            .any(|column| column.expr().contains_aggregate())
        || order_by.is_some_and(|order_by| {
            order_by
                .expressions()
                .any(|expr| expr.contains_aggregate())
        });
    if !aggregating {
        return Ok(());
    }

    let all_groups: Vec<&Expr> = group_by
        .map(|group_by| group_by.expressions().collect())
        .unwrap_or_default();
    let static_groups: Vec<&Expr> = group_by
        .map(|group_by| group_by.static_expressions().collect())
        .unwrap_or_default();

    for column in columns.columns() {
        let groups = if column.is_dynamic() {
            &all_groups
        } else {
            &static_groups
        };
        check_expression(column.expr(), groups, ClauseKind::SelectColumns)?;
    }

    if let Some(having) = having {
        check_expression(having.condition(), &all_groups, ClauseKind::Having)?;
    }

    if let Some(order_by) = order_by {
        for expr in order_by.expressions() {
            check_expression(expr, &all_groups, ClauseKind::OrderBy)?;
        }
    }

    Ok(())
}

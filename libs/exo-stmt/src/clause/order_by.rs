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
use crate::dynamic::{MaybeDynamic, maybe_dynamic_from};
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::{Expr, SortOrder};

use super::non_empty;

maybe_dynamic_from!(SortOrder; SortOrder);

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    orders: Vec<MaybeDynamic<SortOrder>>,
}

impl OrderByClause {
    pub(crate) fn new(orders: Vec<MaybeDynamic<SortOrder>>) -> Result<Self, CheckError> {
        Ok(Self {
            orders: non_empty(orders, ClauseKind::OrderBy)?,
        })
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.orders.iter().map(|order| order.inner().expr())
    }
}

impl Node for OrderByClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.orders
            .iter()
            .map(|order| order as &dyn Node)
            .collect()
    }
}

impl ExpressionBuilder for OrderByClause {
    fn build(&self, builder: &mut SQLBuilder) {
        let active: Vec<&SortOrder> = self.orders.iter().filter_map(MaybeDynamic::active).collect();
        if active.is_empty() {
            return;
        }
        builder.push_str(" ORDER BY ");
        builder.push_iter(active.into_iter(), ", ", |builder, order| order.build(builder));
    }
}

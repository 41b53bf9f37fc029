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

fn integral(value: MaybeDynamic<Expr>, clause: ClauseKind) -> Result<MaybeDynamic<Expr>, CheckError> {
    let found = value.inner().value_type();
    if found.data_type.is_integral() {
        Ok(value)
    } else {
        Err(CheckError::NonIntegralLimitOffset { clause, found })
    }
}

macro_rules! row_count_clause {
    ($name:ident, $kind:expr, $keyword:literal) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            value: MaybeDynamic<Expr>,
        }

        impl $name {
            pub(crate) fn new(value: MaybeDynamic<Expr>) -> Result<Self, CheckError> {
                Ok(Self {
                    value: integral(value, $kind)?,
                })
            }

            pub fn value(&self) -> &Expr {
                self.value.inner()
            }
        }

        impl Node for $name {
            fn nodes_of(&self) -> Vec<&dyn Node> {
                vec![&self.value]
            }
        }

        impl ExpressionBuilder for $name {
            fn build(&self, builder: &mut SQLBuilder) {
                if let Some(value) = self.value.active() {
                    builder.push_str($keyword);
                    value.build(builder);
                }
            }
        }
    };
}

row_count_clause!(LimitClause, ClauseKind::Limit, " LIMIT ");
row_count_clause!(OffsetClause, ClauseKind::Offset, " OFFSET ");

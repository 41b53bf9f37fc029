// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::CheckError;
use crate::dependency::Node;
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::statement::SelectStatement;
use crate::Statement;

use super::{ResultField, fields_match};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    All,
    Distinct,
}

impl UnionKind {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            UnionKind::All => " UNION ALL ",
            UnionKind::Distinct => " UNION ",
        }
    }
}

/// `lhs UNION [ALL] rhs`. Both operands are complete statements on their own.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionClause {
    kind: UnionKind,
    lhs: Box<SelectStatement>,
    rhs: Box<SelectStatement>,
}

impl UnionClause {
    pub(crate) fn new(
        kind: UnionKind,
        lhs: SelectStatement,
        rhs: SelectStatement,
    ) -> Result<Self, CheckError> {
        lhs.check_prepare()?;
        rhs.check_prepare()?;
        if !fields_match(&lhs.result_fields(), &rhs.result_fields()) {
            return Err(CheckError::UnionResultMismatch);
        }
        Ok(Self {
            kind,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn kind(&self) -> UnionKind {
        self.kind
    }

    /// Names come from the left operand; a column is nullable if it is nullable on either side
    pub(crate) fn result_fields(&self) -> Vec<ResultField> {
        self.lhs
            .result_fields()
            .into_iter()
            .zip(self.rhs.result_fields())
            .map(|(lhs, rhs)| ResultField {
                name: lhs.name,
                value_type: lhs.value_type.with_nullable(rhs.value_type.nullable),
            })
            .collect()
    }
}

impl Node for UnionClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![self.lhs.as_ref(), self.rhs.as_ref()]
    }
}

impl ExpressionBuilder for UnionClause {
    fn build(&self, builder: &mut SQLBuilder) {
        self.lhs.build(builder);
        builder.push_str(self.kind.keyword());
        self.rhs.build(builder);
    }
}

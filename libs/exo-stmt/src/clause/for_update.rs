// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::dependency::Node;
use crate::sql::{ExpressionBuilder, SQLBuilder};

/// Row locking for a select: `FOR UPDATE`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForUpdateClause;

impl Node for ForUpdateClause {}

impl ExpressionBuilder for ForUpdateClause {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(" FOR UPDATE");
    }
}

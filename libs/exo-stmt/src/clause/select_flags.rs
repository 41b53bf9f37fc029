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

use super::non_empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectFlag {
    Distinct,
    All,
}

impl SelectFlag {
    fn keyword(&self) -> &'static str {
        match self {
            SelectFlag::Distinct => "DISTINCT",
            SelectFlag::All => "ALL",
        }
    }
}

impl Node for SelectFlag {}

impl ExpressionBuilder for SelectFlag {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(self.keyword());
    }
}

maybe_dynamic_from!(SelectFlag; SelectFlag);

/// Flags rendered between `SELECT` and the column list, each followed by a space
#[derive(Debug, Clone, PartialEq)]
pub struct SelectFlagList {
    flags: Vec<MaybeDynamic<SelectFlag>>,
}

impl SelectFlagList {
    pub(crate) fn new(flags: Vec<MaybeDynamic<SelectFlag>>) -> Result<Self, CheckError> {
        Ok(Self {
            flags: non_empty(flags, ClauseKind::SelectFlags)?,
        })
    }
}

impl Node for SelectFlagList {}

impl ExpressionBuilder for SelectFlagList {
    fn build(&self, builder: &mut SQLBuilder) {
        for flag in self.flags.iter().filter_map(MaybeDynamic::active) {
            flag.build(builder);
            builder.push_space();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::dynamic;
    use crate::sql::Standard;

    #[test]
    fn flags() {
        let flags = SelectFlagList::new(vec![SelectFlag::Distinct.into()]).unwrap();
        assert_binding!(flags.to_sql(&Standard), "DISTINCT ");

        let off = SelectFlagList::new(vec![dynamic(false, SelectFlag::Distinct).into()]).unwrap();
        assert_binding!(off.to_sql(&Standard), "");
    }
}

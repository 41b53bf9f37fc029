// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind};
use crate::dependency::{NameSet, Node, difference, union_of};
use crate::dynamic::{MaybeDynamic, maybe_dynamic_from};
use crate::relation::Cte;
use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::non_empty;

maybe_dynamic_from!(Cte; Cte);

/// `WITH [RECURSIVE] ...`. A CTE may only use the CTEs declared before it.
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    ctes: Vec<MaybeDynamic<Cte>>,
}

impl WithClause {
    pub(crate) fn new(ctes: Vec<MaybeDynamic<Cte>>) -> Result<Self, CheckError> {
        let ctes = non_empty(ctes, ClauseKind::With)?;

        let mut declared = NameSet::new();
        let mut declared_static = NameSet::new();
        for cte in &ctes {
            let unknown = difference(&cte.required_ctes_of(), &declared);
            if !unknown.is_empty() {
                return Err(CheckError::UnknownTableOrCte {
                    names: unknown.into_iter().collect(),
                });
            }
            let statically_unknown = difference(&cte.required_static_ctes_of(), &declared_static);
            if !statically_unknown.is_empty() {
                return Err(CheckError::StaticallyUnknownTableOrCte {
                    names: statically_unknown.into_iter().collect(),
                });
            }

            let name = cte.inner().name();
            if !declared.insert(name.to_string()) {
                return Err(CheckError::DuplicateTableProvider {
                    name: name.to_string(),
                });
            }
            if !cte.is_dynamic() {
                declared_static.insert(name.to_string());
            }
        }

        Ok(Self { ctes })
    }
}

impl Node for WithClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.ctes.iter().map(|cte| cte as &dyn Node).collect()
    }

    fn required_ctes_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_ctes_of());
        difference(&required, &self.provided_ctes_of())
    }

    fn required_static_ctes_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_static_ctes_of());
        difference(&required, &self.provided_static_ctes_of())
    }

    fn provided_ctes_of(&self) -> NameSet {
        union_of(self.nodes_of(), |node| node.provided_ctes_of())
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        union_of(self.nodes_of(), |node| node.provided_static_ctes_of())
    }
}

impl ExpressionBuilder for WithClause {
    fn build(&self, builder: &mut SQLBuilder) {
        let active: Vec<&Cte> = self.ctes.iter().filter_map(MaybeDynamic::active).collect();
        if active.is_empty() {
            return;
        }
        builder.push_str("WITH ");
        if active.iter().any(|cte| cte.is_recursive()) {
            builder.push_str("RECURSIVE ");
        }
        builder.push_iter(active.into_iter(), ", ", |builder, cte| cte.build(builder));
        builder.push_space();
    }
}

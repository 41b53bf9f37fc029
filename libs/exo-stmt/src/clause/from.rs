// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::dependency::{NameSet, Node};
use crate::relation::{JoinKind, Relation};
use crate::sql::{ExpressionBuilder, SQLBuilder};

/// `FROM <relation>`
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    relation: Relation,
}

impl FromClause {
    pub(crate) fn new(relation: Relation) -> Self {
        Self { relation }
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub(crate) fn uses_join_kind(&self, kind: JoinKind) -> bool {
        self.relation.uses_join_kind(kind)
    }
}

impl Node for FromClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![&self.relation]
    }

    fn provided_tables_of(&self) -> NameSet {
        self.relation.provided_tables_of()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        self.relation.provided_static_tables_of()
    }

    fn provided_optional_tables_of(&self) -> NameSet {
        self.relation.provided_optional_tables_of()
    }
}

impl ExpressionBuilder for FromClause {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(" FROM ");
        self.relation.build(builder);
    }
}

/// `USING <relation>` of a DELETE: further tables the WHERE condition may refer to
#[derive(Debug, Clone, PartialEq)]
pub struct UsingClause(FromClause);

impl UsingClause {
    pub(crate) fn new(relation: Relation) -> Self {
        Self(FromClause::new(relation))
    }

    pub(crate) fn uses_join_kind(&self, kind: JoinKind) -> bool {
        self.0.uses_join_kind(kind)
    }
}

impl Node for UsingClause {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.0.nodes_of()
    }

    fn provided_tables_of(&self) -> NameSet {
        self.0.provided_tables_of()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        self.0.provided_static_tables_of()
    }
}

impl ExpressionBuilder for UsingClause {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(" USING ");
        self.0.relation.build(builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::name_set;
    use crate::relation::Joinable;
    use crate::sql::Standard;
    use crate::testing::{bar, foo};

    #[test]
    fn from_provides_relation_tables() {
        let (foo, bar) = (foo(), bar());
        let clause = FromClause::new(foo.cross_join(&bar).unwrap().into());

        assert_eq!(clause.provided_tables_of(), name_set(["foo", "bar"]));
        assert!(clause.uses_join_kind(JoinKind::Cross));
        assert!(!clause.uses_join_kind(JoinKind::FullOuter));
        assert_binding!(clause.to_sql(&Standard), " FROM foo CROSS JOIN bar");

        let using = UsingClause::new(bar.into());
        assert_binding!(using.to_sql(&Standard), " USING bar");
    }
}

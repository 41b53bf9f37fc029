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
use crate::dynamic::MaybeDynamic;
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::{Expr, Parameter, Typed};

use super::{Relation, check_disjoint_providers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinKind {
    fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => " INNER JOIN ",
            JoinKind::LeftOuter => " LEFT OUTER JOIN ",
            JoinKind::RightOuter => " RIGHT OUTER JOIN ",
            JoinKind::FullOuter => " FULL OUTER JOIN ",
            JoinKind::Cross => " CROSS JOIN ",
        }
    }
}

/// Join construction, available on every relation
pub trait Joinable: Into<Relation> + Sized {
    /// Inner join; complete it with [`PreJoin::on`] or [`PreJoin::unconditionally`]
    fn join(self, rhs: impl Into<MaybeDynamic<Relation>>) -> Result<PreJoin, CheckError> {
        PreJoin::new(self.into(), JoinKind::Inner, rhs.into())
    }

    fn inner_join(self, rhs: impl Into<MaybeDynamic<Relation>>) -> Result<PreJoin, CheckError> {
        PreJoin::new(self.into(), JoinKind::Inner, rhs.into())
    }

    fn left_outer_join(
        self,
        rhs: impl Into<MaybeDynamic<Relation>>,
    ) -> Result<PreJoin, CheckError> {
        PreJoin::new(self.into(), JoinKind::LeftOuter, rhs.into())
    }

    fn right_outer_join(
        self,
        rhs: impl Into<MaybeDynamic<Relation>>,
    ) -> Result<PreJoin, CheckError> {
        PreJoin::new(self.into(), JoinKind::RightOuter, rhs.into())
    }

    fn full_outer_join(
        self,
        rhs: impl Into<MaybeDynamic<Relation>>,
    ) -> Result<PreJoin, CheckError> {
        PreJoin::new(self.into(), JoinKind::FullOuter, rhs.into())
    }

    fn cross_join(self, rhs: impl Into<MaybeDynamic<Relation>>) -> Result<Join, CheckError> {
        let pre_join = PreJoin::new(self.into(), JoinKind::Cross, rhs.into())?;
        Ok(Join {
            lhs: pre_join.lhs,
            kind: JoinKind::Cross,
            rhs: pre_join.rhs,
            condition: None,
        })
    }
}

impl<T: Into<Relation>> Joinable for T {}

/// A join that still needs its condition
#[derive(Debug, Clone, PartialEq)]
pub struct PreJoin {
    lhs: Relation,
    kind: JoinKind,
    rhs: MaybeDynamic<Relation>,
}

impl PreJoin {
    /// Neither side may require tables of its own: an ON condition can only see the tables
    /// joined so far, so a requirement left open by a nested join cannot be resolved later.
    fn new(lhs: Relation, kind: JoinKind, rhs: MaybeDynamic<Relation>) -> Result<Self, CheckError> {
        let mut unresolved = lhs.required_tables_of();
        unresolved.extend(rhs.required_tables_of());
        if !unresolved.is_empty() {
            return Err(CheckError::UnknownTableOrCte {
                names: unresolved.into_iter().collect(),
            });
        }
        check_disjoint_providers([&lhs.provided_tables_of(), &rhs.provided_tables_of()])?;
        Ok(Self { lhs, kind, rhs })
    }

    /// Complete the join with a boolean condition. Tables the condition uses beyond the two
    /// sides become requirements of the join.
    pub fn on(self, condition: impl Into<Expr>) -> Result<Join, CheckError> {
        let condition = condition.into();
        let condition_type = condition.value_type();
        if !condition_type.data_type.is_boolean() {
            return Err(CheckError::incompatible(
                "ON",
                condition_type,
                condition_type,
            ));
        }
        if condition.contains_aggregate() {
            return Err(CheckError::AggregateConsistencyViolation {
                clause: ClauseKind::Join,
                expression: condition.to_sql_text(),
            });
        }

        Ok(Join {
            lhs: self.lhs,
            kind: self.kind,
            rhs: self.rhs,
            condition: Some(condition),
        })
    }

    /// Complete the join without a restricting condition (`ON TRUE`)
    pub fn unconditionally(self) -> Join {
        Join {
            lhs: self.lhs,
            kind: self.kind,
            rhs: self.rhs,
            condition: Some(Expr::from(true)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    lhs: Relation,
    kind: JoinKind,
    rhs: MaybeDynamic<Relation>,
    condition: Option<Expr>,
}

impl Join {
    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub(crate) fn uses_join_kind(&self, kind: JoinKind) -> bool {
        self.kind == kind
            || self.lhs.uses_join_kind(kind)
            || self
                .rhs
                .active()
                .is_some_and(|rhs| rhs.uses_join_kind(kind))
    }

    fn condition_nodes(&self) -> Vec<&dyn Node> {
        self.condition
            .iter()
            .map(|condition| condition as &dyn Node)
            .collect()
    }
}

impl Node for Join {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = vec![&self.lhs, &self.rhs];
        nodes.extend(self.condition_nodes());
        nodes
    }

    fn required_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_tables_of());
        difference(&required, &self.provided_tables_of())
    }

    fn required_static_tables_of(&self) -> NameSet {
        let mut required = self.lhs.required_static_tables_of();
        // The condition of a dynamic join is only present together with its right-hand side
        if !self.rhs.is_dynamic() {
            required.extend(self.rhs.required_static_tables_of());
            for condition in &self.condition {
                required.extend(condition.required_static_tables_of());
            }
        }
        difference(&required, &self.provided_static_tables_of())
    }

    fn required_static_ctes_of(&self) -> NameSet {
        let mut required = self.lhs.required_static_ctes_of();
        if !self.rhs.is_dynamic() {
            required.extend(self.rhs.required_static_ctes_of());
            for condition in &self.condition {
                required.extend(condition.required_static_ctes_of());
            }
        }
        required
    }

    fn provided_tables_of(&self) -> NameSet {
        let mut provided = self.lhs.provided_tables_of();
        provided.extend(self.rhs.provided_tables_of());
        provided
    }

    fn provided_static_tables_of(&self) -> NameSet {
        let mut provided = self.lhs.provided_static_tables_of();
        provided.extend(self.rhs.provided_static_tables_of());
        provided
    }

    fn provided_optional_tables_of(&self) -> NameSet {
        let mut optional = self.lhs.provided_optional_tables_of();
        optional.extend(self.rhs.provided_optional_tables_of());
        match self.kind {
            JoinKind::LeftOuter => optional.extend(self.rhs.provided_tables_of()),
            JoinKind::RightOuter => optional.extend(self.lhs.provided_tables_of()),
            JoinKind::FullOuter => {
                optional.extend(self.lhs.provided_tables_of());
                optional.extend(self.rhs.provided_tables_of());
            }
            JoinKind::Inner | JoinKind::Cross => {}
        }
        optional
    }

    fn parameters_of(&self) -> Vec<Parameter> {
        let mut parameters = self.lhs.parameters_of();
        if self.rhs.active().is_some() {
            parameters.extend(self.rhs.parameters_of());
            for condition in &self.condition {
                parameters.extend(condition.parameters_of());
            }
        }
        parameters
    }
}

impl ExpressionBuilder for Join {
    fn build(&self, builder: &mut SQLBuilder) {
        self.lhs.build(builder);

        if let Some(rhs) = self.rhs.active() {
            builder.push_str(self.kind.keyword());
            if matches!(rhs, Relation::Join(_)) {
                builder.push('(');
                rhs.build(builder);
                builder.push(')');
            } else {
                rhs.build(builder);
            }
            if let Some(condition) = &self.condition {
                builder.push_str(" ON ");
                condition.build(builder);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::name_set;
    use crate::dynamic::dynamic;
    use crate::sql::Standard;
    use crate::testing::{TableExt, bar, baz, foo};
    use crate::value::Comparable;

    #[test]
    fn join_provides_both_sides() {
        let (foo, bar) = (foo(), bar());
        let join = foo
            .clone()
            .join(&bar)
            .unwrap()
            .on(foo.col("id").equal(bar.col("foo_id")).unwrap())
            .unwrap();

        assert_eq!(join.provided_tables_of(), name_set(["foo", "bar"]));
        assert!(join.required_tables_of().is_empty());
        assert!(join.provided_optional_tables_of().is_empty());
        assert_binding!(
            join.to_sql(&Standard),
            "foo INNER JOIN bar ON foo.id = bar.foo_id"
        );
    }

    #[test]
    fn duplicate_providers() {
        let foo = foo();

        assert_eq!(
            foo.clone().join(&foo).map(|_| ()),
            Err(CheckError::DuplicateTableProvider {
                name: "foo".to_string()
            })
        );
        assert!(foo.clone().join(foo.alias("f")).is_ok());
    }

    #[test]
    fn condition_on_foreign_table_leaks_requirement() {
        let (foo, bar, baz) = (foo(), bar(), baz());
        let join = foo
            .clone()
            .join(&bar)
            .unwrap()
            .on(baz.col("id").equal(bar.col("foo_id")).unwrap())
            .unwrap();

        assert_eq!(join.required_tables_of(), name_set(["baz"]));
    }

    #[test]
    fn nested_join_cannot_resolve_earlier_condition() {
        let (foo, bar, baz) = (foo(), bar(), baz());
        let inner = foo
            .clone()
            .join(&bar)
            .unwrap()
            .on(baz.col("id").equal(bar.col("foo_id")).unwrap())
            .unwrap();

        assert_eq!(
            inner.clone().join(&baz).map(|_| ()),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["baz".to_string()]
            })
        );
        assert_eq!(
            baz.clone().join(inner).map(|_| ()),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["baz".to_string()]
            })
        );

        let resolved = foo
            .clone()
            .join(&bar)
            .unwrap()
            .on(foo.col("id").equal(bar.col("foo_id")).unwrap())
            .unwrap()
            .join(&baz)
            .unwrap()
            .on(foo.col("id").equal(baz.col("id")).unwrap())
            .unwrap();
        assert!(resolved.required_tables_of().is_empty());
        assert_binding!(
            resolved.to_sql(&Standard),
            "foo INNER JOIN bar ON foo.id = bar.foo_id INNER JOIN baz ON foo.id = baz.id"
        );
    }

    #[test]
    fn outer_join_optional_sides() {
        let (foo, bar) = (foo(), bar());
        let condition = foo.col("id").equal(bar.col("foo_id")).unwrap();

        let left = foo
            .clone()
            .left_outer_join(&bar)
            .unwrap()
            .on(condition.clone())
            .unwrap();
        assert_eq!(left.provided_optional_tables_of(), name_set(["bar"]));

        let right = foo
            .clone()
            .right_outer_join(&bar)
            .unwrap()
            .on(condition.clone())
            .unwrap();
        assert_eq!(right.provided_optional_tables_of(), name_set(["foo"]));

        let full = foo
            .clone()
            .full_outer_join(&bar)
            .unwrap()
            .on(condition)
            .unwrap();
        assert_eq!(full.provided_optional_tables_of(), name_set(["foo", "bar"]));
        assert_binding!(
            full.to_sql(&Standard),
            "foo FULL OUTER JOIN bar ON foo.id = bar.foo_id"
        );
    }

    #[test]
    fn dynamic_join() {
        let (foo, bar) = (foo(), bar());
        let join = |flag| {
            foo.clone()
                .left_outer_join(dynamic(flag, &bar))
                .unwrap()
                .on(foo.col("id").equal(bar.col("foo_id")).unwrap())
                .unwrap()
        };

        assert_eq!(join(true).provided_static_tables_of(), name_set(["foo"]));
        assert_eq!(join(true).provided_tables_of(), name_set(["foo", "bar"]));
        assert!(join(true).required_static_tables_of().is_empty());
        assert_binding!(
            join(true).to_sql(&Standard),
            "foo LEFT OUTER JOIN bar ON foo.id = bar.foo_id"
        );
        assert_binding!(join(false).to_sql(&Standard), "foo");
    }

    #[test]
    fn cross_and_unconditional() {
        let (foo, bar) = (foo(), bar());

        assert_binding!(
            foo.clone().cross_join(&bar).unwrap().to_sql(&Standard),
            "foo CROSS JOIN bar"
        );
        assert_binding!(
            foo.clone()
                .join(&bar)
                .unwrap()
                .unconditionally()
                .to_sql(&Standard),
            "foo INNER JOIN bar ON TRUE"
        );
    }

    #[test]
    fn condition_must_be_boolean() {
        let (foo, bar) = (foo(), bar());

        assert!(matches!(
            foo.clone().join(&bar).unwrap().on(foo.col("id")),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));
    }
}

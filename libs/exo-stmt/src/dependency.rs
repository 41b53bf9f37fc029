// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Dependency analysis over the statement tree.
//!
//! Every node (value, relation, clause, statement) reports which tables and CTEs it requires and
//! which it provides. Requirements propagate upward through [`Node::nodes_of`]; provisions do not,
//! so a table provided deep inside a sub-select never satisfies a requirement of the enclosing
//! statement. Contributions that are only present when a dynamic condition holds count towards the
//! full sets but not towards the static ones.

use indexmap::IndexSet;

use crate::value::Parameter;

/// An ordered set of table or CTE names (aliases count as names)
pub type NameSet = IndexSet<String>;

pub trait Node {
    /// The immediate children whose requirements bubble up through this node
    fn nodes_of(&self) -> Vec<&dyn Node> {
        Vec::new()
    }

    fn required_tables_of(&self) -> NameSet {
        union_of(self.nodes_of(), |node| node.required_tables_of())
    }

    fn required_static_tables_of(&self) -> NameSet {
        union_of(self.nodes_of(), |node| node.required_static_tables_of())
    }

    fn provided_tables_of(&self) -> NameSet {
        NameSet::new()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        self.provided_tables_of()
    }

    /// Provided tables whose columns may be `NULL` because they sit on the optional side of an
    /// outer join
    fn provided_optional_tables_of(&self) -> NameSet {
        NameSet::new()
    }

    fn required_ctes_of(&self) -> NameSet {
        union_of(self.nodes_of(), |node| node.required_ctes_of())
    }

    fn required_static_ctes_of(&self) -> NameSet {
        union_of(self.nodes_of(), |node| node.required_static_ctes_of())
    }

    fn provided_ctes_of(&self) -> NameSet {
        NameSet::new()
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        self.provided_ctes_of()
    }

    /// Parameters in the order they are serialized
    fn parameters_of(&self) -> Vec<Parameter> {
        self.nodes_of()
            .into_iter()
            .flat_map(|node| node.parameters_of())
            .collect()
    }

    fn contains_aggregate(&self) -> bool {
        self.nodes_of()
            .into_iter()
            .any(|node| node.contains_aggregate())
    }
}

/// A snapshot of all dependency sets of a node. Mostly useful for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dependencies {
    pub required_tables: NameSet,
    pub required_static_tables: NameSet,
    pub provided_tables: NameSet,
    pub provided_static_tables: NameSet,
    pub provided_optional_tables: NameSet,
    pub required_ctes: NameSet,
    pub required_static_ctes: NameSet,
    pub provided_ctes: NameSet,
    pub provided_static_ctes: NameSet,
}

impl Dependencies {
    pub fn of(node: &dyn Node) -> Self {
        Self {
            required_tables: node.required_tables_of(),
            required_static_tables: node.required_static_tables_of(),
            provided_tables: node.provided_tables_of(),
            provided_static_tables: node.provided_static_tables_of(),
            provided_optional_tables: node.provided_optional_tables_of(),
            required_ctes: node.required_ctes_of(),
            required_static_ctes: node.required_static_ctes_of(),
            provided_ctes: node.provided_ctes_of(),
            provided_static_ctes: node.provided_static_ctes_of(),
        }
    }
}

pub(crate) fn union_of<'a>(
    nodes: impl IntoIterator<Item = &'a dyn Node>,
    sets: impl Fn(&'a dyn Node) -> NameSet,
) -> NameSet {
    let mut result = NameSet::new();
    for node in nodes {
        result.extend(sets(node));
    }
    result
}

pub(crate) fn difference(lhs: &NameSet, rhs: &NameSet) -> NameSet {
    lhs.difference(rhs).cloned().collect()
}

pub(crate) fn name_set<'a>(names: impl IntoIterator<Item = &'a str>) -> NameSet {
    names.into_iter().map(str::to_owned).collect()
}

impl<T: Node> Node for Box<T> {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.as_ref().nodes_of()
    }
    fn required_tables_of(&self) -> NameSet {
        self.as_ref().required_tables_of()
    }
    fn required_static_tables_of(&self) -> NameSet {
        self.as_ref().required_static_tables_of()
    }
    fn provided_tables_of(&self) -> NameSet {
        self.as_ref().provided_tables_of()
    }
    fn provided_static_tables_of(&self) -> NameSet {
        self.as_ref().provided_static_tables_of()
    }
    fn provided_optional_tables_of(&self) -> NameSet {
        self.as_ref().provided_optional_tables_of()
    }
    fn required_ctes_of(&self) -> NameSet {
        self.as_ref().required_ctes_of()
    }
    fn required_static_ctes_of(&self) -> NameSet {
        self.as_ref().required_static_ctes_of()
    }
    fn provided_ctes_of(&self) -> NameSet {
        self.as_ref().provided_ctes_of()
    }
    fn provided_static_ctes_of(&self) -> NameSet {
        self.as_ref().provided_static_ctes_of()
    }
    fn parameters_of(&self) -> Vec<Parameter> {
        self.as_ref().parameters_of()
    }
    fn contains_aggregate(&self) -> bool {
        self.as_ref().contains_aggregate()
    }
}

impl<T: Node> Node for Option<T> {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match self {
            Some(node) => vec![node as &dyn Node],
            None => Vec::new(),
        }
    }

    fn provided_tables_of(&self) -> NameSet {
        self.as_ref()
            .map(Node::provided_tables_of)
            .unwrap_or_default()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        self.as_ref()
            .map(Node::provided_static_tables_of)
            .unwrap_or_default()
    }

    fn provided_optional_tables_of(&self) -> NameSet {
        self.as_ref()
            .map(Node::provided_optional_tables_of)
            .unwrap_or_default()
    }

    fn provided_ctes_of(&self) -> NameSet {
        self.as_ref().map(Node::provided_ctes_of).unwrap_or_default()
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        self.as_ref()
            .map(Node::provided_static_ctes_of)
            .unwrap_or_default()
    }
}

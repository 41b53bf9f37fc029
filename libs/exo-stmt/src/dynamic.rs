// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Conditional statement parts.
//!
//! `dynamic(condition, part)` keeps the shape of a statement fixed while letting a runtime flag
//! decide whether the part is serialized. The consistency checks treat a dynamic part as possibly
//! absent: it counts towards the full dependency sets but never towards the static ones, and a
//! dynamic value is always nullable.

use crate::dependency::{NameSet, Node};
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::{Parameter, Typed, ValueType};

/// A part that is only rendered when `condition` is true
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamic<T> {
    condition: bool,
    inner: T,
}

pub fn dynamic<T>(condition: bool, inner: T) -> Dynamic<T> {
    Dynamic { condition, inner }
}

impl<T> Dynamic<T> {
    pub fn condition(&self) -> bool {
        self.condition
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Dynamic<U> {
        Dynamic {
            condition: self.condition,
            inner: f(self.inner),
        }
    }

    pub(crate) fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Dynamic<U>, E> {
        Ok(Dynamic {
            condition: self.condition,
            inner: f(self.inner)?,
        })
    }
}

impl<T: Typed> Typed for Dynamic<T> {
    fn value_type(&self) -> ValueType {
        self.inner.value_type().with_nullable(true)
    }
}

impl<T: Node> Node for Dynamic<T> {
    fn required_tables_of(&self) -> NameSet {
        self.inner.required_tables_of()
    }

    fn required_static_tables_of(&self) -> NameSet {
        NameSet::new()
    }

    fn provided_tables_of(&self) -> NameSet {
        self.inner.provided_tables_of()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        NameSet::new()
    }

    fn provided_optional_tables_of(&self) -> NameSet {
        self.inner.provided_optional_tables_of()
    }

    fn required_ctes_of(&self) -> NameSet {
        self.inner.required_ctes_of()
    }

    fn required_static_ctes_of(&self) -> NameSet {
        NameSet::new()
    }

    fn provided_ctes_of(&self) -> NameSet {
        self.inner.provided_ctes_of()
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        NameSet::new()
    }

    fn parameters_of(&self) -> Vec<Parameter> {
        if self.condition {
            self.inner.parameters_of()
        } else {
            Vec::new()
        }
    }

    fn contains_aggregate(&self) -> bool {
        self.inner.contains_aggregate()
    }
}

/// A slot element that is either always present or dynamic
#[derive(Debug, Clone, PartialEq)]
pub enum MaybeDynamic<T> {
    Static(T),
    Dynamic(Dynamic<T>),
}

impl<T> MaybeDynamic<T> {
    pub fn inner(&self) -> &T {
        match self {
            MaybeDynamic::Static(inner) => inner,
            MaybeDynamic::Dynamic(dynamic) => dynamic.inner(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, MaybeDynamic::Dynamic(_))
    }

    /// The part if it is going to be rendered
    pub fn active(&self) -> Option<&T> {
        match self {
            MaybeDynamic::Static(inner) => Some(inner),
            MaybeDynamic::Dynamic(dynamic) if dynamic.condition => Some(&dynamic.inner),
            MaybeDynamic::Dynamic(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MaybeDynamic<U> {
        match self {
            MaybeDynamic::Static(inner) => MaybeDynamic::Static(f(inner)),
            MaybeDynamic::Dynamic(dynamic) => MaybeDynamic::Dynamic(dynamic.map(f)),
        }
    }

    pub(crate) fn try_map<U, E>(
        self,
        f: impl FnOnce(T) -> Result<U, E>,
    ) -> Result<MaybeDynamic<U>, E> {
        Ok(match self {
            MaybeDynamic::Static(inner) => MaybeDynamic::Static(f(inner)?),
            MaybeDynamic::Dynamic(dynamic) => MaybeDynamic::Dynamic(dynamic.try_map(f)?),
        })
    }
}

impl<T: Node> Node for MaybeDynamic<T> {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match self {
            MaybeDynamic::Static(inner) => vec![inner as &dyn Node],
            MaybeDynamic::Dynamic(dynamic) => vec![dynamic as &dyn Node],
        }
    }

    fn provided_tables_of(&self) -> NameSet {
        match self {
            MaybeDynamic::Static(inner) => inner.provided_tables_of(),
            MaybeDynamic::Dynamic(dynamic) => dynamic.provided_tables_of(),
        }
    }

    fn provided_static_tables_of(&self) -> NameSet {
        match self {
            MaybeDynamic::Static(inner) => inner.provided_static_tables_of(),
            MaybeDynamic::Dynamic(dynamic) => dynamic.provided_static_tables_of(),
        }
    }

    fn provided_optional_tables_of(&self) -> NameSet {
        self.inner().provided_optional_tables_of()
    }

    fn provided_ctes_of(&self) -> NameSet {
        match self {
            MaybeDynamic::Static(inner) => inner.provided_ctes_of(),
            MaybeDynamic::Dynamic(dynamic) => dynamic.provided_ctes_of(),
        }
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        match self {
            MaybeDynamic::Static(inner) => inner.provided_static_ctes_of(),
            MaybeDynamic::Dynamic(dynamic) => dynamic.provided_static_ctes_of(),
        }
    }
}

impl<T: ExpressionBuilder> ExpressionBuilder for MaybeDynamic<T> {
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(inner) = self.active() {
            inner.build(builder)
        }
    }
}

/// Implements the conversions into `MaybeDynamic<$target>` from `$target`-convertible types and
/// from their dynamic wrappers.
macro_rules! maybe_dynamic_from {
    ($target:ty; $($source:ty),* $(,)?) => {
        $(
            impl From<$source> for $crate::dynamic::MaybeDynamic<$target> {
                fn from(value: $source) -> Self {
                    $crate::dynamic::MaybeDynamic::Static(value.into())
                }
            }

            impl From<$crate::dynamic::Dynamic<$source>> for $crate::dynamic::MaybeDynamic<$target> {
                fn from(value: $crate::dynamic::Dynamic<$source>) -> Self {
                    $crate::dynamic::MaybeDynamic::Dynamic(value.map(Into::into))
                }
            }
        )*
    };
}

pub(crate) use maybe_dynamic_from;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TableExt, foo};
    use crate::value::DataType;

    #[test]
    fn dynamic_adds_nullability() {
        let foo = foo();
        let id = foo.col("id");

        assert!(!id.value_type().nullable);
        assert_eq!(
            dynamic(true, id.clone()).value_type(),
            ValueType::nullable(DataType::Integral)
        );
    }

    #[test]
    fn dynamic_moves_requirements_out_of_static_set() {
        let foo = foo();
        let part = dynamic(false, foo.col("id"));

        assert_eq!(part.required_tables_of().len(), 1);
        assert!(part.required_static_tables_of().is_empty());
    }

    #[test]
    fn active_part() {
        let on: MaybeDynamic<i32> = MaybeDynamic::Dynamic(dynamic(true, 1));
        let off: MaybeDynamic<i32> = MaybeDynamic::Dynamic(dynamic(false, 1));

        assert_eq!(on.active(), Some(&1));
        assert_eq!(off.active(), None);
        assert_eq!(MaybeDynamic::Static(2).active(), Some(&2));
    }
}

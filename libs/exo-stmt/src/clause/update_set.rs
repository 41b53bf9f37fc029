// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind, ColumnOperation};
use crate::dependency::Node;
use crate::dynamic::MaybeDynamic;
use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::{Assignment, check_assignments, non_empty};

/// The SET clause of an UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSet {
    assignments: Vec<MaybeDynamic<Assignment>>,
}

impl UpdateSet {
    /// At least one assignment must be static unless `dynamic_only` is set, in which case the
    /// caller guarantees that at least one dynamic assignment is active at run time
    pub(crate) fn new(
        assignments: Vec<MaybeDynamic<Assignment>>,
        dynamic_only: bool,
    ) -> Result<Self, CheckError> {
        let assignments = non_empty(assignments, ClauseKind::UpdateSet)?;
        check_assignments(&assignments, ColumnOperation::Update)?;
        if !dynamic_only && assignments.iter().all(MaybeDynamic::is_dynamic) {
            return Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::UpdateSet,
            });
        }
        Ok(Self { assignments })
    }

    pub fn assignments(&self) -> &[MaybeDynamic<Assignment>] {
        &self.assignments
    }

    /// A SET clause whose assignments are all switched off would render as an empty ` SET `
    pub(crate) fn check_active(&self) -> Result<(), CheckError> {
        if self.assignments.iter().all(|assignment| assignment.active().is_none()) {
            return Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::UpdateSet,
            });
        }
        Ok(())
    }
}

impl Node for UpdateSet {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        self.assignments
            .iter()
            .map(|assignment| assignment as &dyn Node)
            .collect()
    }
}

impl ExpressionBuilder for UpdateSet {
    fn build(&self, builder: &mut SQLBuilder) {
        let active: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter_map(MaybeDynamic::active)
            .collect();
        builder.push_str(" SET ");
        builder.push_iter(active.into_iter(), ", ", |builder, assignment| {
            assignment.build(builder)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::dynamic;
    use crate::sql::Standard;
    use crate::testing::{TableExt, foo};

    #[test]
    fn set_rendering() {
        let foo = foo();
        let set = UpdateSet::new(
            vec![
                dynamic(false, foo.col("name").assign("x").unwrap()).into(),
                foo.col("age").assign(3).unwrap().into(),
                dynamic(true, foo.col("flag").assign(false).unwrap()).into(),
            ],
            false,
        )
        .unwrap();

        assert_binding!(set.to_sql(&Standard), " SET age = 3, flag = FALSE");
    }

    #[test]
    fn static_assignment_required() {
        let foo = foo();
        let only_dynamic = || -> Vec<MaybeDynamic<Assignment>> {
            vec![dynamic(true, foo.col("age").assign(3).unwrap()).into()]
        };

        assert_eq!(
            UpdateSet::new(only_dynamic(), false),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::UpdateSet
            })
        );
        assert!(UpdateSet::new(only_dynamic(), true).is_ok());
    }

    #[test]
    fn inactive_assignments() {
        let foo = foo();
        let set = |condition| {
            UpdateSet::new(
                vec![dynamic(condition, foo.col("age").assign(3).unwrap()).into()],
                true,
            )
            .unwrap()
        };

        assert!(set(true).check_active().is_ok());
        assert_eq!(
            set(false).check_active(),
            Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::UpdateSet
            })
        );
    }

    #[test]
    fn protected_columns() {
        let foo = foo();
        assert!(matches!(
            UpdateSet::new(vec![foo.col("id").assign(1).unwrap().into()], false),
            Err(CheckError::ProhibitedColumnOperation {
                operation: ColumnOperation::Update,
                ..
            })
        ));
    }
}

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

use super::{DataType, Typed, ValueType};

/// A named placeholder whose value is supplied when a prepared statement is executed.
///
/// Each occurrence in a statement is a separate positional parameter; binding follows the order in
/// which the occurrences appear in the serialized SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value_type: ValueType,
}

pub fn parameter(name: impl Into<String>, data_type: DataType) -> Parameter {
    Parameter {
        name: name.into(),
        value_type: ValueType::new(data_type),
    }
}

impl Parameter {
    /// Allow `NULL` to be bound to this parameter
    pub fn nullable(self) -> Self {
        Self {
            value_type: self.value_type.with_nullable(true),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Typed for Parameter {
    fn value_type(&self) -> ValueType {
        self.value_type
    }
}

impl Node for Parameter {
    fn parameters_of(&self) -> Vec<Parameter> {
        vec![self.clone()]
    }
}

impl ExpressionBuilder for Parameter {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_param(self.clone());
    }
}

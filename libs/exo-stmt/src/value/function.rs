// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind};
use crate::statement::SelectStatement;
use crate::Statement;

use super::{DataType, Expr, Typed, ValueType};

/// Scalar functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Lower,
    Upper,
    Trim,
    Coalesce,
}

impl Function {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Function::Lower => "LOWER",
            Function::Upper => "UPPER",
            Function::Trim => "TRIM",
            Function::Coalesce => "COALESCE",
        }
    }

    pub(crate) fn value_type(&self, args: &[Expr]) -> ValueType {
        match self {
            Function::Lower | Function::Upper | Function::Trim => ValueType::new(DataType::Text)
                .with_nullable(args.iter().any(|arg| arg.value_type().nullable)),
            Function::Coalesce => {
                let data_type = args
                    .iter()
                    .map(|arg| arg.value_type().data_type)
                    .find(|data_type| *data_type != DataType::Null)
                    .unwrap_or(DataType::Null);
                ValueType::new(data_type)
                    .with_nullable(args.iter().all(|arg| arg.value_type().nullable))
            }
        }
    }
}

fn text_function(function: Function, arg: Expr) -> Result<Expr, CheckError> {
    let arg_type = arg.value_type();
    if !arg_type.data_type.is_text() {
        return Err(CheckError::incompatible(function.name(), arg_type, arg_type));
    }

    Ok(Expr::Function {
        function,
        args: vec![arg],
    })
}

pub fn lower(arg: impl Into<Expr>) -> Result<Expr, CheckError> {
    text_function(Function::Lower, arg.into())
}

pub fn upper(arg: impl Into<Expr>) -> Result<Expr, CheckError> {
    text_function(Function::Upper, arg.into())
}

pub fn trim(arg: impl Into<Expr>) -> Result<Expr, CheckError> {
    text_function(Function::Trim, arg.into())
}

/// The first non-null argument. The result is only nullable if every argument is.
pub fn coalesce<I, E>(args: I) -> Result<Expr, CheckError>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let args: Vec<Expr> = args.into_iter().map(Into::into).collect();
    let Some(first) = args.first() else {
        return Err(CheckError::EmptyArgumentList {
            clause: ClauseKind::Function,
        });
    };

    let first_type = first.value_type();
    for arg in &args[1..] {
        let arg_type = arg.value_type();
        if !first_type.is_comparable_with(&arg_type) {
            return Err(CheckError::incompatible(
                Function::Coalesce.name(),
                first_type,
                arg_type,
            ));
        }
    }

    Ok(Expr::Function {
        function: Function::Coalesce,
        args,
    })
}

/// `EXISTS (<select>)`. The sub-select may refer to tables of the enclosing statement.
pub fn exists(select: SelectStatement) -> Result<Expr, CheckError> {
    select.check_consistency()?;
    Ok(Expr::Exists(Box::new(select)))
}

/// Raw SQL text with a caller-declared value type
pub fn verbatim(sql: impl Into<String>, value_type: ValueType) -> Expr {
    Expr::Verbatim {
        sql: sql.into(),
        value_type,
    }
}

/// Start a `CASE WHEN <condition> THEN ... ELSE ... END` expression
pub fn case_when(condition: impl Into<Expr>) -> Result<CaseWhen, CheckError> {
    let condition = condition.into();
    let condition_type = condition.value_type();
    if !condition_type.data_type.is_boolean() {
        return Err(CheckError::incompatible(
            "CASE WHEN",
            condition_type,
            condition_type,
        ));
    }

    Ok(CaseWhen { condition })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseWhen {
    condition: Expr,
}

impl CaseWhen {
    pub fn then(self, value: impl Into<Expr>) -> CaseThen {
        CaseThen {
            condition: self.condition,
            then: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseThen {
    condition: Expr,
    then: Expr,
}

impl CaseThen {
    pub fn else_(self, value: impl Into<Expr>) -> Result<Expr, CheckError> {
        let otherwise = value.into();
        let (then_type, otherwise_type) = (self.then.value_type(), otherwise.value_type());
        if !then_type.is_comparable_with(&otherwise_type) {
            return Err(CheckError::incompatible("CASE", then_type, otherwise_type));
        }

        Ok(Expr::Case {
            when: Box::new(self.condition),
            then: Box::new(self.then),
            otherwise: Box::new(otherwise),
        })
    }
}

//! Expression-based filtering
//!
//! This module provides an expression-based filtering system that
//! allows filtering Arrow record batches based on column values.

use std::fmt;

use arrow::array::{Array, BooleanArray, Datum, Float64Array, Scalar, StringArray};
use arrow::compute::kernels::boolean::{and, is_not_null, is_null, not, or};
use arrow::compute::kernels::cmp;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::core::{constant_mask, filter_record_batch};
use crate::utils::arrow::{get_column_by_name, key_column, numeric_column};

/// Represents a filter expression over the columns of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column equals a literal value
    Eq(String, LiteralValue),

    /// Column not equals a literal value
    NotEq(String, LiteralValue),

    /// Column is greater than a literal value
    Gt(String, LiteralValue),

    /// Column is greater than or equal to a literal value
    GtEq(String, LiteralValue),

    /// Column is less than a literal value
    Lt(String, LiteralValue),

    /// Column is less than or equal to a literal value
    LtEq(String, LiteralValue),

    /// Column is in a set of values
    In(String, Vec<LiteralValue>),

    /// Column is null
    IsNull(String),

    /// Column is not null
    IsNotNull(String),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Logical OR of expressions
    Or(Vec<Expr>),

    /// Logical NOT of an expression
    Not(Box<Expr>),

    /// Always evaluates to true
    AlwaysTrue,

    /// Always evaluates to false
    AlwaysFalse,
}

/// Represents a literal value that can be used in filter expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// Boolean value, compared as 0/1 against numeric columns
    Boolean(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// String value
    String(String),

    /// Null value
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl Expr {
    /// Column is within `[min, max]`, both ends inclusive
    #[must_use]
    pub fn between(column: &str, min: f64, max: f64) -> Self {
        Self::And(vec![
            Self::GtEq(column.to_string(), LiteralValue::Float(min)),
            Self::LtEq(column.to_string(), LiteralValue::Float(max)),
        ])
    }

    /// Evaluate the expression against a record batch
    ///
    /// # Returns
    /// A boolean array indicating which rows match; comparisons against null
    /// values yield null, which filtering treats as no match
    ///
    /// # Errors
    /// Returns an error if a column is missing or has an incomparable type
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        match self {
            Self::AlwaysTrue => Ok(constant_mask(true, batch.num_rows())),
            Self::AlwaysFalse => Ok(constant_mask(false, batch.num_rows())),
            Self::Eq(col, value) => evaluate_comparison(batch, col, CmpOp::Eq, value),
            Self::NotEq(col, value) => evaluate_comparison(batch, col, CmpOp::NotEq, value),
            Self::Gt(col, value) => evaluate_comparison(batch, col, CmpOp::Gt, value),
            Self::GtEq(col, value) => evaluate_comparison(batch, col, CmpOp::GtEq, value),
            Self::Lt(col, value) => evaluate_comparison(batch, col, CmpOp::Lt, value),
            Self::LtEq(col, value) => evaluate_comparison(batch, col, CmpOp::LtEq, value),
            Self::In(col, values) => {
                let alternatives: Vec<Self> = values
                    .iter()
                    .map(|value| Self::Eq(col.clone(), value.clone()))
                    .collect();
                Self::Or(alternatives).evaluate(batch)
            }
            Self::IsNull(col) => Ok(is_null(get_column_by_name(batch, col)?.as_ref())?),
            Self::IsNotNull(col) => Ok(is_not_null(get_column_by_name(batch, col)?.as_ref())?),
            Self::And(exprs) => {
                let mut result = constant_mask(true, batch.num_rows());
                for expr in exprs {
                    result = and(&result, &expr.evaluate(batch)?)?;
                }
                Ok(result)
            }
            Self::Or(exprs) => {
                let mut result = constant_mask(false, batch.num_rows());
                for expr in exprs {
                    result = or(&result, &expr.evaluate(batch)?)?;
                }
                Ok(result)
            }
            Self::Not(expr) => Ok(not(&expr.evaluate(batch)?)?),
        }
    }

    /// Keep the rows of `batch` matching the expression, preserving order
    ///
    /// # Errors
    /// Returns an error if evaluation or filtering fails
    pub fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }
}

/// Evaluates a comparison between a column and a literal
fn evaluate_comparison(
    batch: &RecordBatch,
    col_name: &str,
    op: CmpOp,
    literal_value: &LiteralValue,
) -> Result<BooleanArray> {
    match literal_value {
        LiteralValue::Null => match op {
            CmpOp::Eq => Ok(is_null(get_column_by_name(batch, col_name)?.as_ref())?),
            CmpOp::NotEq => Ok(is_not_null(get_column_by_name(batch, col_name)?.as_ref())?),
            _ => Err(Error::column(
                col_name,
                format!("cannot apply {op:?} to a null literal"),
            )),
        },
        LiteralValue::String(s) => {
            let column = key_column(batch, col_name)?;
            let literal = Scalar::new(StringArray::from(vec![s.as_str()]));
            apply_op(op, &column, &literal)
        }
        LiteralValue::Boolean(b) => {
            let column = get_column_by_name(batch, col_name)?;
            if column.data_type() == &DataType::Boolean {
                let literal = Scalar::new(BooleanArray::from(vec![*b]));
                return apply_op(op, &column, &literal);
            }
            evaluate_numeric(batch, col_name, op, if *b { 1.0 } else { 0.0 })
        }
        #[allow(clippy::cast_precision_loss)]
        LiteralValue::Int(n) => evaluate_numeric(batch, col_name, op, *n as f64),
        LiteralValue::Float(x) => evaluate_numeric(batch, col_name, op, *x),
    }
}

/// Evaluates a comparison on a numeric column viewed as `Float64`
fn evaluate_numeric(
    batch: &RecordBatch,
    col_name: &str,
    op: CmpOp,
    value: f64,
) -> Result<BooleanArray> {
    let column = numeric_column(batch, col_name)?;
    let literal = Scalar::new(Float64Array::from(vec![value]));
    apply_op(op, &column, &literal)
}

fn apply_op(op: CmpOp, lhs: &dyn Datum, rhs: &dyn Datum) -> Result<BooleanArray> {
    let result = match op {
        CmpOp::Eq => cmp::eq(lhs, rhs),
        CmpOp::NotEq => cmp::neq(lhs, rhs),
        CmpOp::Gt => cmp::gt(lhs, rhs),
        CmpOp::GtEq => cmp::gt_eq(lhs, rhs),
        CmpOp::Lt => cmp::lt(lhs, rhs),
        CmpOp::LtEq => cmp::lt_eq(lhs, rhs),
    }?;
    Ok(result)
}

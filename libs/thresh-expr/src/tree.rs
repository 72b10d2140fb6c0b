//! Readable n-ary boolean tree of an alarm expression

use std::fmt;

use crate::operator::BooleanOperator;
use crate::sub_expression::AlarmSubExpression;

/// Runs of the same connective are flattened into one node:
/// `a and b and c` becomes a single `AND` node with three operands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionTree {
    Leaf(AlarmSubExpression),
    Node {
        operator: BooleanOperator,
        operands: Vec<ExpressionTree>,
    },
}

impl ExpressionTree {
    pub fn is_leaf(&self) -> bool {
        matches!(self, ExpressionTree::Leaf(_))
    }

    /// Number of leaves below this tree
    pub fn leaf_count(&self) -> usize {
        match self {
            ExpressionTree::Leaf(_) => 1,
            ExpressionTree::Node { operands, .. } => {
                operands.iter().map(ExpressionTree::leaf_count).sum()
            },
        }
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionTree::Leaf(sub_expression) => write!(f, "{}", sub_expression),
            ExpressionTree::Node { operator, operands } => {
                f.write_str("(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", operator)?;
                    }
                    write!(f, "{}", operand)?;
                }
                f.write_str(")")
            },
        }
    }
}

//! AlarmExpression - compiled postfix program over sub-expressions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::compiler;
use crate::error::{ExprError, Result};
use crate::operator::BooleanOperator;
use crate::sub_expression::{AlarmSubExpression, DEFAULT_DETERMINISTIC};
use crate::tree::ExpressionTree;

/// One step of the postfix program
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    SubExpression(AlarmSubExpression),
    Operator(BooleanOperator),
}

/// Alarm expression compiled to Reverse-Polish order.
///
/// Equality and hashing compare the postfix elements only, so `a and b` and
/// `b and a` are different expressions even though they always evaluate alike.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use thresh_expr::AlarmExpression;
///
/// let expr = AlarmExpression::new("avg(cpu) > 90 and max(mem) > 80").unwrap();
/// let values: HashMap<_, _> = expr
///     .sub_expressions()
///     .iter()
///     .map(|sub| (sub.clone(), true))
///     .collect();
/// assert!(expr.evaluate(&values).unwrap());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmExpression {
    expression: String,
    elements: Vec<Element>,
    /// Leaves in order of appearance, one per position
    sub_expressions: Vec<AlarmSubExpression>,
}

impl AlarmExpression {
    pub fn new(expression: &str) -> Result<Self> {
        let elements = compiler::compile(expression)?;
        Ok(Self::build(expression.to_string(), elements))
    }

    pub fn of(expression: &str) -> Result<Self> {
        Self::new(expression)
    }

    /// Assemble an expression from a postfix program built in code.
    ///
    /// The program must reduce to exactly one value.
    pub fn from_elements(expression: impl Into<String>, elements: Vec<Element>) -> Result<Self> {
        let mut depth = 0usize;
        for element in &elements {
            match element {
                Element::SubExpression(_) => depth += 1,
                Element::Operator(operator) => {
                    if depth < 2 {
                        return Err(ExprError::malformed_program(format!(
                            "{} needs two operands",
                            operator
                        )));
                    }
                    depth -= 1;
                },
            }
        }
        if depth != 1 {
            return Err(ExprError::malformed_program(format!(
                "program leaves {} values instead of one",
                depth
            )));
        }
        Ok(Self::build(expression.into(), elements))
    }

    fn build(expression: String, elements: Vec<Element>) -> Self {
        let sub_expressions = elements
            .iter()
            .filter_map(|element| match element {
                Element::SubExpression(sub_expression) => Some(sub_expression.clone()),
                Element::Operator(_) => None,
            })
            .collect();
        Self {
            expression,
            elements,
            sub_expressions,
        }
    }

    /// Evaluate the program with one truth value per sub-expression.
    ///
    /// Every leaf must have an entry in `values`; a missing one is an error,
    /// never a default.
    pub fn evaluate<S: BuildHasher>(
        &self,
        values: &HashMap<AlarmSubExpression, bool, S>,
    ) -> Result<bool> {
        let mut stack: Vec<bool> = Vec::with_capacity(self.elements.len());

        for element in &self.elements {
            match element {
                Element::SubExpression(sub_expression) => {
                    let value = values
                        .get(sub_expression)
                        .copied()
                        .ok_or_else(|| ExprError::missing_value(sub_expression.to_string()))?;
                    stack.push(value);
                },
                Element::Operator(operator) => {
                    // Later operand first
                    let (Some(operand_a), Some(operand_b)) = (stack.pop(), stack.pop()) else {
                        return Err(self.malformed("operator without two operands"));
                    };
                    stack.push(operator.evaluate(operand_a, operand_b));
                },
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(result), true) => Ok(result),
            _ => Err(self.malformed("program did not reduce to one value")),
        }
    }

    /// N-ary boolean tree of the expression, for display.
    ///
    /// When the earlier operand of a connective is already a node with the same
    /// operator, the later operand joins that node instead of nesting.
    pub fn expression_tree(&self) -> Result<ExpressionTree> {
        let mut stack: Vec<ExpressionTree> = Vec::with_capacity(self.elements.len());

        for element in &self.elements {
            match element {
                Element::SubExpression(sub_expression) => {
                    stack.push(ExpressionTree::Leaf(sub_expression.clone()));
                },
                Element::Operator(operator) => {
                    let (Some(operand_a), Some(operand_b)) = (stack.pop(), stack.pop()) else {
                        return Err(self.malformed("operator without two operands"));
                    };
                    let node = match operand_b {
                        ExpressionTree::Node {
                            operator: existing,
                            mut operands,
                        } if existing == *operator => {
                            operands.push(operand_a);
                            ExpressionTree::Node {
                                operator: existing,
                                operands,
                            }
                        },
                        operand_b => ExpressionTree::Node {
                            operator: *operator,
                            operands: vec![operand_b, operand_a],
                        },
                    };
                    stack.push(node);
                },
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(tree), true) => Ok(tree),
            _ => Err(self.malformed("program did not reduce to one tree")),
        }
    }

    /// True when there is at least one leaf and every leaf is deterministic
    pub fn is_deterministic(&self) -> bool {
        if self.sub_expressions.is_empty() {
            return DEFAULT_DETERMINISTIC;
        }
        self.sub_expressions
            .iter()
            .all(AlarmSubExpression::is_deterministic)
    }

    pub fn sub_expressions(&self) -> &[AlarmSubExpression] {
        &self.sub_expressions
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Source text the expression was compiled from
    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn malformed(&self, reason: &str) -> ExprError {
        tracing::error!(expression = %self.expression, "Malformed alarm expression program: {}", reason);
        ExprError::malformed_program(format!("{} in '{}'", reason, self.expression))
    }
}

impl PartialEq for AlarmExpression {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Eq for AlarmExpression {}

impl Hash for AlarmExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state);
    }
}

impl fmt::Display for AlarmExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl std::str::FromStr for AlarmExpression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for AlarmExpression {
    type Error = ExprError;

    fn try_from(expression: String) -> Result<Self> {
        let elements = compiler::compile(&expression)?;
        Ok(Self::build(expression, elements))
    }
}

impl From<AlarmExpression> for String {
    fn from(expression: AlarmExpression) -> Self {
        expression.expression
    }
}

//! Expression compiler - recursive descent straight to postfix
//!
//! Grammar (keywords case-insensitive):
//!
//! ```text
//! expression  := and_expr ( OR and_expr )*
//! and_expr    := primary ( AND primary )*
//! primary     := "(" expression ")" | comparison
//! comparison  := metric_expr relop threshold [ "times" INTEGER ]
//!              | threshold relop metric_expr [ "times" INTEGER ]
//! metric_expr := function "(" metric ( "," param )* ")" | metric
//! param       := INTEGER | "deterministic"
//! metric      := namespace [ "{" [ dimension ( "," dimension )* ] "}" ]
//! dimension   := WORD+ "=" ( QUOTED | WORD+ )
//! relop       := "<" | "<=" | ">" | ">=" | lt | lte | gt | gte
//! AND         := "and" | "&&"
//! OR          := "or" | "||"
//! ```
//!
//! Every production appends its postfix elements as it returns, so a leaf is
//! always emitted before the operator that combines it.

use std::collections::BTreeMap;

use crate::error::{ExprError, Result};
use crate::expression::Element;
use crate::function::AggregateFunction;
use crate::lexer::{self, Spanned, Token, EOF};
use crate::metric::MetricDefinition;
use crate::operator::{AlarmOperator, BooleanOperator};
use crate::sub_expression::{
    AlarmSubExpression, DEFAULT_DETERMINISTIC, DEFAULT_PERIOD, DEFAULT_PERIODS,
};

const DETERMINISTIC: &str = "deterministic";
const TIMES: &str = "times";

/// Compile expression text into its postfix program
pub fn compile(text: &str) -> Result<Vec<Element>> {
    let tokens = lexer::tokenize(text)?;
    let mut parser = Parser::new(tokens, text.chars().count());
    let elements = parser.parse()?;

    tracing::debug!(
        expression = text,
        elements = elements.len(),
        "Compiled alarm expression"
    );
    Ok(elements)
}

/// Compile text holding exactly one comparison
pub fn compile_single(text: &str) -> Result<AlarmSubExpression> {
    let mut elements = compile(text)?;
    if elements.len() != 1 {
        return Err(ExprError::compound_expression(text));
    }
    match elements.pop() {
        Some(Element::SubExpression(sub_expression)) => Ok(sub_expression),
        _ => Err(ExprError::compound_expression(text)),
    }
}

/// Metric expression of a comparison before the operator is known
struct MetricExpr {
    function: Option<AggregateFunction>,
    metric: MetricDefinition,
    period: u32,
    deterministic: bool,
}

struct Parser {
    tokens: Vec<Spanned>,
    current: usize,
    /// Character length of the input, reported as the position of `<EOF>`
    end: usize,
    elements: Vec<Element>,
}

impl Parser {
    fn new(tokens: Vec<Spanned>, end: usize) -> Self {
        Self {
            tokens,
            current: 0,
            end,
            elements: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<Vec<Element>> {
        if self.tokens.is_empty() {
            return Err(ExprError::syntax(0, EOF, "empty expression"));
        }
        self.parse_or()?;
        if self.peek().is_some() {
            return Err(self.error("expected 'and', 'or' or end of expression"));
        }
        Ok(std::mem::take(&mut self.elements))
    }

    fn parse_or(&mut self) -> Result<()> {
        self.parse_and()?;
        while self.match_connective(BooleanOperator::Or) {
            self.parse_and()?;
            self.elements.push(Element::Operator(BooleanOperator::Or));
        }
        Ok(())
    }

    fn parse_and(&mut self) -> Result<()> {
        self.parse_primary()?;
        while self.match_connective(BooleanOperator::And) {
            self.parse_primary()?;
            self.elements.push(Element::Operator(BooleanOperator::And));
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> Result<()> {
        if self.match_token(&Token::LeftParen) {
            self.parse_or()?;
            self.expect(&Token::RightParen, "expected ')'")?;
            return Ok(());
        }
        let sub_expression = self.parse_comparison()?;
        self.elements.push(Element::SubExpression(sub_expression));
        Ok(())
    }

    fn parse_comparison(&mut self) -> Result<AlarmSubExpression> {
        let reversed = matches!(self.peek(), Some(Token::Word(word)) if lexer::is_number(word))
            && self.relop_at(self.current + 1).is_some();

        let (metric_expr, operator, threshold) = if reversed {
            let threshold = self.parse_threshold()?;
            let operator = self.parse_relop()?.reverse();
            (self.parse_metric_expr()?, operator, threshold)
        } else {
            let metric_expr = self.parse_metric_expr()?;
            let operator = self.parse_relop()?;
            (metric_expr, operator, self.parse_threshold()?)
        };

        let periods = if self.match_keyword(TIMES) {
            self.parse_integer("expected number of periods after 'times'")?
        } else {
            DEFAULT_PERIODS
        };

        // A bare metric compares its extreme value
        let function = metric_expr.function.unwrap_or(match operator {
            AlarmOperator::Gt | AlarmOperator::Gte => AggregateFunction::Max,
            AlarmOperator::Lt | AlarmOperator::Lte => AggregateFunction::Min,
        });

        Ok(AlarmSubExpression::new(
            function,
            metric_expr.metric,
            operator,
            threshold,
            metric_expr.period,
            periods,
            metric_expr.deterministic,
        ))
    }

    fn parse_metric_expr(&mut self) -> Result<MetricExpr> {
        let function = match self.peek() {
            Some(Token::Word(word)) if self.peek_at(self.current + 1) == Some(&Token::LeftParen) => {
                AggregateFunction::from_name(word)
            },
            _ => None,
        };

        let Some(function) = function else {
            return Ok(MetricExpr {
                function: None,
                metric: self.parse_metric()?,
                period: DEFAULT_PERIOD,
                deterministic: DEFAULT_DETERMINISTIC,
            });
        };

        self.advance();
        self.advance();
        let metric = self.parse_metric()?;

        let mut period = None;
        let mut deterministic = false;
        while self.match_token(&Token::Comma) {
            match self.peek() {
                Some(Token::Word(word)) if word.eq_ignore_ascii_case(DETERMINISTIC) => {
                    if deterministic {
                        return Err(self.error("'deterministic' given more than once"));
                    }
                    deterministic = true;
                    self.advance();
                },
                Some(Token::Word(word)) if lexer::is_integer(word) => {
                    if period.is_some() {
                        return Err(self.error("period given more than once"));
                    }
                    period = Some(self.parse_integer("expected period")?);
                },
                _ => return Err(self.error("expected period or 'deterministic'")),
            }
        }
        self.expect(&Token::RightParen, "expected ')' after function arguments")?;

        Ok(MetricExpr {
            function: Some(function),
            metric,
            period: period.unwrap_or(DEFAULT_PERIOD),
            deterministic,
        })
    }

    fn parse_metric(&mut self) -> Result<MetricDefinition> {
        let name = match self.peek() {
            Some(Token::Word(word)) => word.clone(),
            _ => return Err(self.error("expected metric name")),
        };
        self.advance();

        let mut dimensions = BTreeMap::new();
        if self.match_token(&Token::LeftBrace) && !self.match_token(&Token::RightBrace) {
            loop {
                let (key, value) = self.parse_dimension()?;
                if dimensions.contains_key(&key) {
                    return Err(ExprError::duplicate_dimension(key));
                }
                dimensions.insert(key, value);

                if self.match_token(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RightBrace, "expected ',' or '}'")?;
                break;
            }
        }

        Ok(MetricDefinition::new(name, dimensions))
    }

    fn parse_dimension(&mut self) -> Result<(String, String)> {
        let key = self
            .join_words()
            .ok_or_else(|| self.error("expected dimension name"))?;
        self.expect(&Token::Equals, "expected '=' after dimension name")?;

        if let Some(Token::Quoted(quoted)) = self.peek() {
            let value = quoted.clone();
            self.advance();
            return Ok((key, value));
        }
        let value = self
            .join_words()
            .ok_or_else(|| self.error("expected dimension value"))?;
        Ok((key, value))
    }

    /// Consecutive words joined by single spaces, `None` when there is none
    fn join_words(&mut self) -> Option<String> {
        let mut joined: Option<String> = None;
        while let Some(Token::Word(word)) = self.peek() {
            let word = word.clone();
            self.advance();
            match joined.as_mut() {
                Some(text) => {
                    text.push(' ');
                    text.push_str(&word);
                },
                None => joined = Some(word),
            }
        }
        joined
    }

    fn parse_relop(&mut self) -> Result<AlarmOperator> {
        let operator = self
            .relop_at(self.current)
            .ok_or_else(|| self.error("expected comparison operator"))?;
        self.advance();
        Ok(operator)
    }

    fn parse_threshold(&mut self) -> Result<f64> {
        let threshold = match self.peek() {
            Some(Token::Word(word)) if lexer::is_number(word) => word.parse::<f64>().ok(),
            _ => None,
        };
        let threshold = threshold.ok_or_else(|| self.error("expected numeric threshold"))?;
        // Too many digits parse to infinity, which has no text form
        if !threshold.is_finite() {
            return Err(self.error("threshold out of range"));
        }
        self.advance();
        Ok(threshold)
    }

    fn parse_integer(&mut self, message: &str) -> Result<u32> {
        let value = match self.peek() {
            Some(Token::Word(word)) if lexer::is_integer(word) => word.parse::<u32>().ok(),
            _ => None,
        };
        let value = value.ok_or_else(|| self.error(message))?;
        self.advance();
        Ok(value)
    }

    fn relop_at(&self, index: usize) -> Option<AlarmOperator> {
        match self.peek_at(index)? {
            Token::Less => Some(AlarmOperator::Lt),
            Token::LessEqual => Some(AlarmOperator::Lte),
            Token::Greater => Some(AlarmOperator::Gt),
            Token::GreaterEqual => Some(AlarmOperator::Gte),
            Token::Word(word) => word.parse().ok(),
            _ => None,
        }
    }

    fn match_connective(&mut self, operator: BooleanOperator) -> bool {
        let matched = match (self.peek(), operator) {
            (Some(Token::And), BooleanOperator::And) | (Some(Token::Or), BooleanOperator::Or) => {
                true
            },
            (Some(Token::Word(word)), _) => word.eq_ignore_ascii_case(operator.as_str()),
            _ => false,
        };
        if matched {
            self.advance();
        }
        matched
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        let matched = matches!(self.peek(), Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword));
        if matched {
            self.advance();
        }
        matched
    }

    fn expect(&mut self, expected: &Token, message: &str) -> Result<()> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Syntax error at the current token
    fn error(&self, message: &str) -> ExprError {
        match self.tokens.get(self.current) {
            Some(spanned) => ExprError::syntax(spanned.position, spanned.token.to_string(), message),
            None => ExprError::syntax(self.end, EOF, message),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(self.current)
    }

    fn peek_at(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index).map(|spanned| &spanned.token)
    }

    fn advance(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            return true;
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn leaves(elements: &[Element]) -> Vec<&AlarmSubExpression> {
        elements
            .iter()
            .filter_map(|element| match element {
                Element::SubExpression(sub_expression) => Some(sub_expression),
                Element::Operator(_) => None,
            })
            .collect()
    }

    /// Postfix shape: `S` for a leaf, `&` / `|` for operators
    fn shape(elements: &[Element]) -> String {
        elements
            .iter()
            .map(|element| match element {
                Element::SubExpression(_) => 'S',
                Element::Operator(BooleanOperator::And) => '&',
                Element::Operator(BooleanOperator::Or) => '|',
            })
            .collect()
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(shape(&compile("a > 1 or b > 1 and c > 1").unwrap()), "SSS&|");
        assert_eq!(shape(&compile("a > 1 and b > 1 or c > 1").unwrap()), "SS&S|");
        assert_eq!(shape(&compile("(a > 1 or b > 1) and c > 1").unwrap()), "SS|S&");
    }

    #[test]
    fn test_connectives_are_left_associative() {
        assert_eq!(shape(&compile("a > 1 and b > 1 and c > 1").unwrap()), "SS&S&");
        assert_eq!(shape(&compile("a > 1 || b > 1 OR c > 1").unwrap()), "SS|S|");
        assert_eq!(shape(&compile("a > 1 && b > 1 AnD c > 1").unwrap()), "SS&S&");
    }

    #[test]
    fn test_reversed_comparison() {
        let elements = compile("5 < avg(cpu) times 2").unwrap();
        let leaf = leaves(&elements)[0];
        assert_eq!(leaf.operator(), AlarmOperator::Gt);
        assert_eq!(leaf.function(), AggregateFunction::Avg);
        assert_eq!(leaf.threshold(), 5.0);
        assert_eq!(leaf.periods(), 2);

        // The reversed operator picks the default function
        let elements = compile("10 >= cpu{host=a}").unwrap();
        let leaf = leaves(&elements)[0];
        assert_eq!(leaf.operator(), AlarmOperator::Lte);
        assert_eq!(leaf.function(), AggregateFunction::Min);
    }

    #[test]
    fn test_numeric_namespace_is_not_reversed() {
        let elements = compile("5{k=v} > 3").unwrap();
        let leaf = leaves(&elements)[0];
        assert_eq!(leaf.metric_definition().name(), "5");
        assert_eq!(leaf.threshold(), 3.0);
    }

    #[test]
    fn test_textual_operators() {
        let elements = compile("avg(a) lt 1 or avg(b) LTE 2 or avg(c) gT 3 or avg(d) gte 4").unwrap();
        let operators: Vec<AlarmOperator> = leaves(&elements).iter().map(|l| l.operator()).collect();
        assert_eq!(
            operators,
            vec![AlarmOperator::Lt, AlarmOperator::Lte, AlarmOperator::Gt, AlarmOperator::Gte]
        );
    }

    #[test]
    fn test_function_parameters_any_order() {
        for text in [
            "count(log.error{},deterministic,20) > 5",
            "count(log.error{}, 20, deterministic) > 5",
            "count(log.error, DETERMINISTIC, 20) > 5",
        ] {
            let leaf = compile_single(text).unwrap();
            assert!(leaf.is_deterministic(), "{}", text);
            assert_eq!(leaf.period(), 20, "{}", text);
            assert_eq!(leaf.function(), AggregateFunction::Count, "{}", text);
        }
    }

    #[test]
    fn test_rejects_bad_parameters() {
        for text in [
            "count(log.error{},deterministic=foo,20) > 5",
            "count(log.error{},determ=true,20) > 5",
            "count(log.error{},20,30) > 5",
            "count(log.error{},deterministic,deterministic) > 5",
            "count(log.error{},-20) > 5",
            "count(log.error{},99999999999) > 5",
        ] {
            assert!(compile(text).is_err(), "{}", text);
        }
    }

    #[test]
    fn test_dimension_words_are_joined() {
        let leaf = compile_single("m{this is  also a test = a   b} > 1").unwrap();
        assert_eq!(
            leaf.metric_definition().dimension("this is also a test"),
            Some("a b")
        );
    }

    #[test]
    fn test_quoted_value_keeps_quotes() {
        let leaf = compile_single(r#"m{url="https://x/?a=3&b", k=v} > 1"#).unwrap();
        assert_eq!(
            leaf.metric_definition().dimension("url"),
            Some(r#""https://x/?a=3&b""#)
        );
    }

    #[test]
    fn test_syntax_error_position_and_token() {
        assert_eq!(
            compile("avg(cpu) > ").unwrap_err(),
            ExprError::syntax(11, EOF, "expected numeric threshold")
        );
        assert_eq!(
            compile("avg(cpu) ! 5").unwrap_err(),
            ExprError::syntax(9, "!", "expected comparison operator")
        );
        assert_eq!(
            compile("avg(cpu) > 5 xor mem > 1").unwrap_err(),
            ExprError::syntax(13, "xor", "expected 'and', 'or' or end of expression")
        );
        assert_eq!(
            compile("(avg(cpu) > 5").unwrap_err(),
            ExprError::syntax(13, EOF, "expected ')'")
        );
        assert_eq!(
            compile("   ").unwrap_err(),
            ExprError::syntax(0, EOF, "empty expression")
        );
    }

    #[test]
    fn test_threshold_must_be_finite() {
        let huge = format!("1{}", "0".repeat(400));
        let err = compile(&format!("avg(m) > {}", huge)).unwrap_err();
        assert_eq!(err, ExprError::syntax(9, huge.as_str(), "threshold out of range"));

        let reversed = format!("-{} < avg(m)", huge);
        assert!(matches!(
            compile(&reversed),
            Err(ExprError::Syntax { position: 0, .. })
        ));
        // Largest finite magnitudes still compile
        assert!(compile(&format!("avg(m) > {}", f64::MAX)).is_ok());
    }

    #[test]
    fn test_compile_single_rejects_compound() {
        assert_eq!(
            compile_single("a > 1 and b > 2").unwrap_err(),
            ExprError::CompoundExpressionNotAllowed("a > 1 and b > 2".to_string())
        );
        assert!(compile_single("(a > 1)").is_ok());
    }
}

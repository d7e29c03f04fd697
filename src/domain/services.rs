//! Expression evaluation services for the calculator.
//!
//! This module ties the lexer, parser and tree evaluator together and
//! applies the final rounding and display rules.

use log::debug;
use super::errors::EvalResult;
use super::models::EvaluatorConfig;
use super::parser::{ExpressionEvaluator, FunctionRegistry, Parser};

/// Decimal places kept in every final result.
pub const RESULT_DECIMALS: usize = 10;

/// Evaluation engine for calculator expressions.
///
/// Supported features:
/// - Arithmetic operations: +, -, *, / (and the × ÷ glyphs)
/// - Unary minus and parentheses
/// - Functions: sqrt, pow (one or two arguments), log (base 10), ln, sin, cos, tan
/// - Constants: π and e
///
/// The engine holds only its configuration and the function table; each
/// call is independent of every other.
///
/// # Examples
///
/// ```
/// use tcalc::domain::{ExpressionEngine, EvaluatorConfig};
///
/// let engine = ExpressionEngine::new(EvaluatorConfig::default());
///
/// assert_eq!(engine.evaluate("1+2*3"), Ok(7.0));
/// assert_eq!(engine.evaluate_to_string("1/3").unwrap(), "0.3333333333");
/// assert!(engine.evaluate("10/0").unwrap_err().is_domain());
/// assert!(engine.evaluate("2**3").unwrap_err().is_syntax());
/// ```
#[derive(Debug)]
pub struct ExpressionEngine {
    config: EvaluatorConfig,
    function_registry: FunctionRegistry,
}

impl ExpressionEngine {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            config,
            function_registry: FunctionRegistry::new(),
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates an expression and returns the value rounded to
    /// [`RESULT_DECIMALS`] places.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Syntax` for input that does not parse and
    /// `EvalError::Domain` for division by zero, non-finite values and
    /// wrong function arity.
    pub fn evaluate(&self, expression: &str) -> EvalResult<f64> {
        let outcome = self.parse_and_evaluate(expression);

        match &outcome {
            Ok(value) => debug!("evaluated {:?} = {}", expression, value),
            Err(err) => debug!("failed to evaluate {:?}: {}", expression, err),
        }

        outcome
    }

    /// Evaluates an expression and renders the result for display.
    pub fn evaluate_to_string(&self, expression: &str) -> EvalResult<String> {
        self.evaluate(expression).map(format_result)
    }

    fn parse_and_evaluate(&self, expression: &str) -> EvalResult<f64> {
        let mut parser = Parser::with_max_nesting(expression, self.config.max_nesting)?;
        let ast = parser.parse()?;

        let evaluator = ExpressionEvaluator::new(&self.function_registry, self.config.constant_precision);
        let value = evaluator.evaluate(&ast)?;

        Ok(round_result(value))
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

/// Evaluates an expression with the default configuration.
///
/// # Examples
///
/// ```
/// use tcalc::evaluate;
///
/// assert_eq!(evaluate("(1+2)*3"), Ok(9.0));
/// assert_eq!(evaluate("pow(3)"), Ok(9.0));
/// assert_eq!(evaluate("log(100)"), Ok(2.0));
/// assert!(evaluate("1/(1-1)").unwrap_err().is_domain());
/// ```
pub fn evaluate(expression: &str) -> EvalResult<f64> {
    ExpressionEngine::default().evaluate(expression)
}

/// Rounds a finite value to [`RESULT_DECIMALS`] decimal places.
///
/// Rounding goes through the decimal expansion of the exact binary value,
/// so `0.1 + 0.2` becomes exactly `0.3`. A value exactly halfway between two
/// candidates rounds away from zero. Negative zero is normalised to zero.
///
/// ```
/// use tcalc::round_result;
///
/// assert_eq!(round_result(0.1 + 0.2), 0.3);
/// assert_eq!(round_result(1.0 / 2048.0), 0.0004882813);
/// assert_eq!(round_result(-1.0 / 2048.0), -0.0004882813);
/// ```
pub fn round_result(value: f64) -> f64 {
    let magnitude = value.abs();
    let rounded = round_tie_up(magnitude).unwrap_or_else(|| {
        format!("{:.*}", RESULT_DECIMALS, magnitude)
            .parse::<f64>()
            .unwrap_or(magnitude)
    });

    if rounded == 0.0 {
        0.0
    } else {
        rounded.copysign(value)
    }
}

/// Rounds `magnitude` up when it lies exactly halfway between two
/// 10-place decimals, returning `None` for every other value.
///
/// Such a value is `j / 2^11` with `j` odd: its expansion ends in a `5` at
/// the 11th place and nothing follows.
fn round_tie_up(magnitude: f64) -> Option<f64> {
    const HALF_STEPS: f64 = 2048.0;
    const FIVE_POW_DECIMALS: u128 = 9_765_625;
    const UNIT: u128 = 10_000_000_000;

    let scaled = magnitude * HALF_STEPS;
    if scaled.fract() != 0.0 || scaled % 2.0 != 1.0 {
        return None;
    }

    // magnitude * 10^10 = j * 5^10 / 2, so rounding up gives (j * 5^10 + 1) / 2
    let units = (scaled as u128 * FIVE_POW_DECIMALS + 1) / 2;
    format!("{}.{:010}", units / UNIT, units % UNIT).parse().ok()
}

/// Renders a result as the shortest decimal string that reads back as the
/// same value: no trailing zeros, no `.0`, no exponent.
pub fn format_result(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstantPrecision, EvalError};
    use rstest::rstest;

    #[rstest]
    #[case("2+2", 4.0)]
    #[case("sqrt(16)", 4.0)]
    #[case("pow(2,10)", 1024.0)]
    #[case("pow(3)", 9.0)]
    #[case("log(100)", 2.0)]
    #[case("ln(1)", 0.0)]
    #[case("(1+2)*3", 9.0)]
    #[case("1+2*3", 7.0)]
    #[case("8-2-1", 5.0)]
    #[case("6×2÷4", 3.0)]
    #[case("-3+5", 2.0)]
    #[case("--4", 4.0)]
    #[case(".5+5.", 5.5)]
    #[case("1/3", 0.3333333333)]
    #[case("0.1+0.2", 0.3)]
    #[case("sqrt(2)", 1.4142135624)]
    #[case("sin(π)", 0.0)]
    #[case("ln(e)", 1.0)]
    #[case("2*π", 6.2831853072)]
    #[case(" 2 + 2 ", 4.0)]
    #[case("1/2048", 0.0004882813)]
    #[case("-1/2048", -0.0004882813)]
    #[case("3/2048", 0.0014648438)]
    #[case("1+1/2048", 1.0004882813)]
    fn test_evaluate_values(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(evaluate(input), Ok(expected));
    }

    #[rstest]
    #[case("10/0")]
    #[case("1/(1-1)")]
    #[case("sqrt(-4)")]
    #[case("ln(0)")]
    #[case("sin(1,2)")]
    #[case("pow(1,2,3)")]
    fn test_evaluate_domain_errors(#[case] input: &str) {
        assert!(matches!(evaluate(input), Err(EvalError::Domain(_))));
    }

    #[rstest]
    #[case("2**3")]
    #[case("(1+2")]
    #[case("1+2)")]
    #[case("")]
    #[case("2+")]
    #[case("sqrt()")]
    #[case("abc")]
    #[case("2^3")]
    fn test_evaluate_syntax_errors(#[case] input: &str) {
        assert!(matches!(evaluate(input), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let engine = ExpressionEngine::default();
        for input in ["1/3", "sqrt(2)*π", "10/0", "(("] {
            assert_eq!(engine.evaluate(input), engine.evaluate(input));
        }
    }

    #[test]
    fn test_evaluate_to_string() {
        let engine = ExpressionEngine::default();

        assert_eq!(engine.evaluate_to_string("1/3").unwrap(), "0.3333333333");
        assert_eq!(engine.evaluate_to_string("0.1+0.2").unwrap(), "0.3");
        assert_eq!(engine.evaluate_to_string("2+2").unwrap(), "4");
        assert_eq!(engine.evaluate_to_string("sin(π)").unwrap(), "0");
        assert_eq!(engine.evaluate_to_string("1-3.5").unwrap(), "-2.5");
    }

    #[test]
    fn test_round_result() {
        assert_eq!(round_result(1.0 / 3.0), 0.3333333333);
        assert_eq!(round_result(2.0 / 3.0), 0.6666666667);
        assert_eq!(round_result(1e-12), 0.0);
        assert!(round_result(-1e-12).is_sign_positive());
        assert_eq!(round_result(123456789.0), 123456789.0);
    }

    #[test]
    fn test_round_result_ties_away_from_zero() {
        assert_eq!(round_result(1.0 / 2048.0), 0.0004882813);
        assert_eq!(round_result(-1.0 / 2048.0), -0.0004882813);
        assert_eq!(round_result(5.0 / 2048.0), 0.0024414063);
        assert_eq!(round_result(1.0 + 1.0 / 2048.0), 1.0004882813);

        // Even multiples of 2^-11 have at most 10 decimals and are unchanged
        assert_eq!(round_result(2.0 / 2048.0), 0.0009765625);
        assert_eq!(round_result(0.5), 0.5);

        assert_eq!(format_result(round_result(1.0 / 2048.0)), "0.0004882813");
        assert_eq!(format_result(round_result(-1.0 / 2048.0)), "-0.0004882813");
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(4.0), "4");
        assert_eq!(format_result(1024.0), "1024");
        assert_eq!(format_result(-2.5), "-2.5");
        assert_eq!(format_result(0.3333333333), "0.3333333333");
        assert_eq!(format_result(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_constant_precision_changes_results() {
        let legacy = ExpressionEngine::default();
        let full = ExpressionEngine::new(EvaluatorConfig {
            constant_precision: ConstantPrecision::Full,
            ..EvaluatorConfig::default()
        });

        let legacy_value = legacy.evaluate("π*1000000").unwrap();
        let full_value = full.evaluate("π*1000000").unwrap();

        assert!((legacy_value - 3141592.6536).abs() < 1e-6);
        assert!((full_value - 3141592.653589793).abs() < 1e-6);
        assert_ne!(legacy_value, full_value);
    }

    #[test]
    fn test_long_inputs_evaluate_without_deep_recursion() {
        let sum = format!("{}1", "1+".repeat(100_000));
        assert_eq!(evaluate(&sum), Ok(100_001.0));

        let product = format!("{}1", "1*".repeat(20_000));
        assert_eq!(evaluate(&product), Ok(1.0));

        let signs = format!("{}1", "-1*".repeat(20_000));
        assert_eq!(evaluate(&signs), Ok(1.0));

        let mixed = format!("{}0", "2*3-4/2+".repeat(10_000));
        assert_eq!(evaluate(&mixed), Ok(40_000.0));

        // A huge configured limit is capped, so deep parentheses still fail cleanly
        let engine = ExpressionEngine::new(EvaluatorConfig {
            max_nesting: usize::MAX,
            ..EvaluatorConfig::default()
        });
        let nested = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(engine.evaluate(&nested).unwrap_err().is_syntax());
    }

    #[test]
    fn test_engine_respects_nesting_limit() {
        let engine = ExpressionEngine::new(EvaluatorConfig {
            max_nesting: 2,
            ..EvaluatorConfig::default()
        });

        assert_eq!(engine.evaluate("((1))"), Ok(1.0));
        assert!(engine.evaluate("(((1)))").unwrap_err().is_syntax());
        assert_eq!(engine.config().max_nesting, 2);
    }
}

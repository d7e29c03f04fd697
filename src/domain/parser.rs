//! Expression parser for calculator input.
//!
//! This module implements a recursive descent parser over a small, fixed
//! arithmetic grammar. Input is lexed into tokens, parsed into an AST and
//! then walked by [`ExpressionEvaluator`] to produce an `f64`. Nothing in
//! here executes code or consults global state.
//!
//! # BNF Grammar
//!
//! ```bnf
//! Expression   ::= Term ( ( "+" | "-" ) Term )*
//! Term         ::= Factor ( ( "*" | "/" ) Factor )*
//! Factor       ::= "-" Factor | Primary
//! Primary      ::= Number | Constant | FunctionCall | "(" Expression ")"
//! FunctionCall ::= FunctionName "(" Expression ( "," Expression )* ")"
//! FunctionName ::= "sqrt" | "pow" | "log" | "ln" | "sin" | "cos" | "tan"
//! Constant     ::= "π" | "e"
//! Number       ::= [0-9]* ( "." [0-9]* )?
//! ```
//!
//! `×` and `÷` are accepted as synonyms for `*` and `/`. Function names are
//! case-sensitive. Binary operators are left-associative; there is no unary
//! plus, no power operator and no implicit multiplication.

use std::collections::HashMap;
use super::errors::{EvalError, EvalResult};
use super::models::{ConstantPrecision, DEFAULT_MAX_NESTING, MAX_NESTING_CEILING};

/// Names the lexer recognises as function keywords.
pub const FUNCTION_NAMES: [&str; 7] = ["sqrt", "pow", "log", "ln", "sin", "cos", "tan"];

/// Named numeric constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    /// The symbol the constant is written as in an expression.
    pub fn symbol(self) -> char {
        match self {
            Constant::Pi => 'π',
            Constant::E => 'e',
        }
    }
}

/// Represents a token in the expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Constant(Constant),
    Function(String),

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,

    // End of input
    Eof,
}

/// Represents an Abstract Syntax Tree node for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),

    /// Unary minus
    Negate(Box<Expr>),

    /// Operands of one precedence level applied left to right, so
    /// `8-2-1` is `8` followed by `[(Subtract, 2), (Subtract, 1)]`.
    /// Always has at least one `rest` entry.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },

    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Builds a chain, or returns `first` alone when there are no operators.
    pub fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
        if rest.is_empty() {
            first
        } else {
            Expr::Chain {
                first: Box::new(first),
                rest,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Lexical analyzer for tokenizing expressions.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads a numeric literal: greedy digits with at most one decimal point.
    fn read_number(&mut self) -> EvalResult<f64> {
        let mut number_str = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some('.') {
            number_str.push('.');
            self.advance();

            while let Some(ch) = self.current_char {
                if ch.is_ascii_digit() {
                    number_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        number_str
            .parse::<f64>()
            .map_err(|_| EvalError::syntax(format!("Invalid number: {}", number_str)))
    }

    /// Reads a run of ASCII letters.
    fn read_word(&mut self) -> String {
        let mut word = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphabetic() {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        word
    }

    /// Maps a word to a function keyword or the `e` constant.
    fn classify_word(word: &str) -> EvalResult<Token> {
        if word == "e" {
            Ok(Token::Constant(Constant::E))
        } else if FUNCTION_NAMES.contains(&word) {
            Ok(Token::Function(word.to_string()))
        } else {
            Err(EvalError::syntax(format!("Unknown symbol: {}", word)))
        }
    }

    /// Gets the next token from the input.
    pub fn next_token(&mut self) -> EvalResult<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '0'..='9' | '.' => return self.read_number().map(Token::Number),
            'a'..='z' | 'A'..='Z' => {
                let word = self.read_word();
                return Self::classify_word(&word);
            }
            'π' => Token::Constant(Constant::Pi),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' | '×' => Token::Multiply,
            '/' | '÷' => Token::Divide,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ',' => Token::Comma,
            _ => return Err(EvalError::syntax(format!("Unexpected character: '{}'", ch))),
        };

        self.advance();
        Ok(token)
    }
}

/// Function signature for built-in calculator functions.
pub type FunctionImpl = fn(&[f64]) -> EvalResult<f64>;

/// Registry for calculator functions.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionImpl>,
}

impl FunctionRegistry {
    /// Creates a new function registry with the built-in functions.
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_builtin_functions();
        registry
    }

    pub fn register_function(&mut self, name: &str, func: FunctionImpl) {
        self.functions.insert(name.to_string(), func);
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionImpl> {
        self.functions.get(name)
    }

    /// Registers the built-in functions. `log` is base 10 and `ln` is the
    /// natural logarithm.
    fn register_builtin_functions(&mut self) {
        self.register_function("sqrt", |args| {
            let x = single_argument("sqrt", args)?;
            if x < 0.0 {
                Err(EvalError::domain("sqrt of negative number"))
            } else {
                Ok(x.sqrt())
            }
        });

        // pow(x) squares x, kept for compatibility with the x² key
        self.register_function("pow", |args| match args {
            [base] => Ok(base.powi(2)),
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(EvalError::domain(format!(
                "pow requires 1 or 2 arguments, got {}",
                args.len()
            ))),
        });

        self.register_function("log", |args| Ok(single_argument("log", args)?.log10()));
        self.register_function("ln", |args| Ok(single_argument("ln", args)?.ln()));
        self.register_function("sin", |args| Ok(single_argument("sin", args)?.sin()));
        self.register_function("cos", |args| Ok(single_argument("cos", args)?.cos()));
        self.register_function("tan", |args| Ok(single_argument("tan", args)?.tan()));
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn single_argument(name: &str, args: &[f64]) -> EvalResult<f64> {
    match args {
        [x] => Ok(*x),
        _ => Err(EvalError::domain(format!(
            "{} requires exactly 1 argument, got {}",
            name,
            args.len()
        ))),
    }
}

/// Recursive descent parser for calculator expressions.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
    max_nesting: usize,
}

impl Parser {
    /// Creates a new parser with the default nesting limit.
    pub fn new(input: &str) -> EvalResult<Self> {
        Self::with_max_nesting(input, DEFAULT_MAX_NESTING)
    }

    /// Creates a new parser that rejects input nested deeper than
    /// `max_nesting` levels of parentheses, calls and unary minus.
    /// Limits above [`MAX_NESTING_CEILING`] are lowered to it.
    pub fn with_max_nesting(input: &str, max_nesting: usize) -> EvalResult<Self> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;

        Ok(Self {
            lexer,
            current_token,
            depth: 0,
            max_nesting: max_nesting.min(MAX_NESTING_CEILING),
        })
    }

    fn advance(&mut self) -> EvalResult<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn enter_nested(&mut self) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > self.max_nesting {
            Err(EvalError::syntax(format!(
                "Expression nested deeper than {} levels",
                self.max_nesting
            )))
        } else {
            Ok(())
        }
    }

    fn leave_nested(&mut self) {
        self.depth -= 1;
    }

    /// Consumes the `)` closing a group or call.
    fn expect_closing_paren(&mut self) -> EvalResult<()> {
        match self.current_token {
            Token::RightParen => self.advance(),
            Token::Eof => Err(EvalError::syntax("Unmatched '('")),
            _ => Err(EvalError::syntax(format!(
                "Expected ')', found {:?}",
                self.current_token
            ))),
        }
    }

    /// Parses the whole input as one expression.
    pub fn parse(&mut self) -> EvalResult<Expr> {
        if self.current_token == Token::Eof {
            return Err(EvalError::syntax("Empty expression"));
        }

        let expr = self.parse_expression()?;

        match self.current_token {
            Token::Eof => Ok(expr),
            Token::RightParen => Err(EvalError::syntax("Unmatched ')'")),
            _ => Err(EvalError::syntax(format!(
                "Unexpected token at end: {:?}",
                self.current_token
            ))),
        }
    }

    /// Parses addition and subtraction.
    ///
    /// Operands are collected into a flat [`Expr::Chain`], so the tree depth
    /// does not grow with the number of operators.
    fn parse_expression(&mut self) -> EvalResult<Expr> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance()?;
            rest.push((op, self.parse_term()?));
        }

        Ok(Expr::chain(first, rest))
    }

    /// Parses multiplication and division.
    fn parse_term(&mut self) -> EvalResult<Expr> {
        let first = self.parse_factor()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token {
                Token::Multiply => BinaryOp::Multiply,
                Token::Divide => BinaryOp::Divide,
                _ => break,
            };
            self.advance()?;
            rest.push((op, self.parse_factor()?));
        }

        Ok(Expr::chain(first, rest))
    }

    fn parse_factor(&mut self) -> EvalResult<Expr> {
        if self.current_token == Token::Minus {
            self.advance()?;
            self.enter_nested()?;
            let operand = self.parse_factor()?;
            self.leave_nested();
            Ok(Expr::Negate(Box::new(operand)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        match &self.current_token {
            Token::Number(value) => {
                let value = *value;
                self.advance()?;
                Ok(Expr::Number(value))
            }

            Token::Constant(constant) => {
                let constant = *constant;
                self.advance()?;
                Ok(Expr::Constant(constant))
            }

            Token::Function(name) => {
                let name = name.clone();
                self.advance()?;

                if self.current_token != Token::LeftParen {
                    return Err(EvalError::syntax(format!("Expected '(' after {}", name)));
                }
                self.advance()?;
                self.enter_nested()?;
                let args = self.parse_argument_list(&name)?;
                self.expect_closing_paren()?;
                self.leave_nested();
                Ok(Expr::FunctionCall { name, args })
            }

            Token::LeftParen => {
                self.advance()?;
                if self.current_token == Token::RightParen {
                    return Err(EvalError::syntax("Empty parentheses"));
                }
                self.enter_nested()?;
                let expr = self.parse_expression()?;
                self.expect_closing_paren()?;
                self.leave_nested();
                Ok(expr)
            }

            Token::Eof => Err(EvalError::syntax("Missing operand at end of expression")),

            _ => Err(EvalError::syntax(format!(
                "Unexpected token: {:?}",
                self.current_token
            ))),
        }
    }

    /// Parses a non-empty, comma separated argument list.
    fn parse_argument_list(&mut self, name: &str) -> EvalResult<Vec<Expr>> {
        if self.current_token == Token::RightParen {
            return Err(EvalError::syntax(format!("{}() is missing its argument", name)));
        }

        let mut args = vec![self.parse_expression()?];

        while self.current_token == Token::Comma {
            self.advance()?;
            args.push(self.parse_expression()?);
        }

        Ok(args)
    }
}

/// Expression evaluator that walks the AST and computes results.
///
/// Every intermediate value is checked; NaN and infinities never escape as
/// successful results.
pub struct ExpressionEvaluator<'a> {
    function_registry: &'a FunctionRegistry,
    constants: ConstantPrecision,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(function_registry: &'a FunctionRegistry, constants: ConstantPrecision) -> Self {
        Self {
            function_registry,
            constants,
        }
    }

    /// Evaluates an expression AST to a finite numeric result.
    pub fn evaluate(&self, expr: &Expr) -> EvalResult<f64> {
        match expr {
            Expr::Number(value) => ensure_finite(*value, "number literal"),

            Expr::Constant(Constant::Pi) => Ok(self.constants.pi()),
            Expr::Constant(Constant::E) => Ok(self.constants.e()),

            Expr::Negate(operand) => Ok(-self.evaluate(operand)?),

            Expr::Chain { first, rest } => {
                let mut acc = self.evaluate(first)?;

                for (operator, operand) in rest {
                    let right_val = self.evaluate(operand)?;
                    let value = match operator {
                        BinaryOp::Add => acc + right_val,
                        BinaryOp::Subtract => acc - right_val,
                        BinaryOp::Multiply => acc * right_val,
                        BinaryOp::Divide => {
                            if right_val == 0.0 {
                                return Err(EvalError::domain("Division by zero"));
                            }
                            acc / right_val
                        }
                    };
                    acc = ensure_finite(value, "arithmetic")?;
                }

                Ok(acc)
            }

            Expr::FunctionCall { name, args } => {
                let func = self
                    .function_registry
                    .get_function(name)
                    .ok_or_else(|| EvalError::syntax(format!("Unknown function: {}", name)))?;

                let arg_values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<EvalResult<Vec<f64>>>()?;
                ensure_finite(func(&arg_values)?, name)
            }
        }
    }
}

fn ensure_finite(value: f64, context: &str) -> EvalResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::domain(format!("{} produced a non-finite result", context)))
    }
}

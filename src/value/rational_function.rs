use crate::value::polynomial::{Parameter, Polynomial};
use crate::value::parse_rational;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error produced when a textual value (number or rational function) cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot parse value `{text}`: {reason}.")]
pub struct ValueParseError {
    text: String,
    reason: String,
}

impl ValueParseError {
    pub fn new(text: &str, reason: &str) -> ValueParseError {
        ValueParseError {
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A fraction of two multivariate polynomials with rational coefficients.
///
/// Arithmetic does not cancel common factors; call [`RationalFunction::simplify`] to
/// obtain the canonical form (numerator and denominator coprime, denominator monic).
/// Equality is semantic, i.e. `a/b == c/d` iff `a*d == c*b`, so unsimplified values
/// still compare as expected.
#[derive(Clone, Debug)]
pub struct RationalFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

impl RationalFunction {
    pub fn zero() -> RationalFunction {
        RationalFunction::from(Polynomial::zero())
    }

    pub fn one() -> RationalFunction {
        RationalFunction::from(Polynomial::one())
    }

    pub fn constant(value: BigRational) -> RationalFunction {
        RationalFunction::from(Polynomial::constant(value))
    }

    pub fn parameter(name: &str) -> RationalFunction {
        RationalFunction::from(Polynomial::parameter(Parameter::new(name)))
    }

    /// Build `numerator / denominator`.
    ///
    /// # Panics
    ///
    /// The denominator must not be the zero polynomial.
    pub fn new(numerator: Polynomial, denominator: Polynomial) -> RationalFunction {
        assert!(
            !denominator.is_zero(),
            "Correctness violation: Rational function with zero denominator."
        );
        RationalFunction {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> &Polynomial {
        &self.numerator
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.denominator
    }

    pub fn parameters(&self) -> BTreeSet<Parameter> {
        let mut result = self.numerator.parameters();
        result.extend(self.denominator.parameters());
        result
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    /// The value of this function if it does not depend on any parameter (after
    /// cancellation of the constant factors).
    pub fn constant_value(&self) -> Option<BigRational> {
        if self.numerator.is_zero() {
            return Some(BigRational::zero());
        }
        if let (Some(n), Some(d)) = (
            self.numerator.constant_value(),
            self.denominator.constant_value(),
        ) {
            return Some(n / d);
        }
        let simplified = self.clone().simplify();
        match (
            simplified.numerator.constant_value(),
            simplified.denominator.constant_value(),
        ) {
            (Some(n), Some(d)) => Some(n / d),
            _ => None,
        }
    }

    pub fn add(&self, other: &RationalFunction) -> RationalFunction {
        if self.denominator == other.denominator {
            return RationalFunction::new(
                self.numerator.add(&other.numerator),
                self.denominator.clone(),
            );
        }
        RationalFunction::new(
            self.numerator
                .mul(&other.denominator)
                .add(&other.numerator.mul(&self.denominator)),
            self.denominator.mul(&other.denominator),
        )
    }

    pub fn sub(&self, other: &RationalFunction) -> RationalFunction {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> RationalFunction {
        RationalFunction::new(self.numerator.neg(), self.denominator.clone())
    }

    pub fn mul(&self, other: &RationalFunction) -> RationalFunction {
        RationalFunction::new(
            self.numerator.mul(&other.numerator),
            self.denominator.mul(&other.denominator),
        )
    }

    /// # Panics
    ///
    /// Division by a (syntactically) zero function is a correctness violation.
    pub fn div(&self, other: &RationalFunction) -> RationalFunction {
        assert!(
            !other.is_zero(),
            "Correctness violation: Division by zero rational function."
        );
        RationalFunction::new(
            self.numerator.mul(&other.denominator),
            self.denominator.mul(&other.numerator),
        )
    }

    /// Cancel the greatest common divisor of numerator and denominator and normalize the
    /// denominator to a monic polynomial.
    pub fn simplify(self) -> RationalFunction {
        if self.numerator.is_zero() {
            return RationalFunction::zero();
        }
        let (numerator, denominator) = if self.denominator.is_constant() {
            (self.numerator, self.denominator)
        } else {
            let gcd = Polynomial::gcd(&self.numerator, &self.denominator);
            if gcd.is_one() {
                (self.numerator, self.denominator)
            } else {
                (
                    self.numerator
                        .div_exact(&gcd)
                        .expect("Correctness violation: GCD must divide the numerator."),
                    self.denominator
                        .div_exact(&gcd)
                        .expect("Correctness violation: GCD must divide the denominator."),
                )
            }
        };
        let lead = denominator
            .leading_coefficient()
            .cloned()
            .expect("Correctness violation: Denominator must be non-zero.");
        let factor = lead.recip();
        RationalFunction {
            numerator: numerator.scale(&factor),
            denominator: denominator.scale(&factor),
        }
    }

    /// Substitute the parameters with the given values. Returns `None` if a parameter is
    /// missing from the `valuation` or the denominator evaluates to zero.
    pub fn evaluate(&self, valuation: &BTreeMap<Parameter, BigRational>) -> Option<BigRational> {
        let denominator = self.denominator.evaluate(valuation)?;
        if denominator.is_zero() {
            return None;
        }
        Some(self.numerator.evaluate(valuation)? / denominator)
    }

    /// Same as [`RationalFunction::evaluate`], but converted to a floating point value.
    pub fn evaluate_f64(&self, valuation: &BTreeMap<Parameter, BigRational>) -> Option<f64> {
        self.evaluate(valuation).and_then(|it| it.to_f64())
    }
}

impl PartialEq for RationalFunction {
    fn eq(&self, other: &Self) -> bool {
        if self.denominator == other.denominator {
            return self.numerator == other.numerator;
        }
        self.numerator.mul(&other.denominator) == other.numerator.mul(&self.denominator)
    }
}

impl From<Polynomial> for RationalFunction {
    fn from(value: Polynomial) -> Self {
        RationalFunction::new(value, Polynomial::one())
    }
}

impl From<BigRational> for RationalFunction {
    fn from(value: BigRational) -> Self {
        RationalFunction::constant(value)
    }
}

impl Display for RationalFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn write_part(f: &mut Formatter<'_>, part: &Polynomial) -> std::fmt::Result {
            if part.terms().count() > 1 {
                write!(f, "({part})")
            } else {
                write!(f, "{part}")
            }
        }

        if self.denominator.is_one() {
            return write!(f, "{}", self.numerator);
        }
        write_part(f, &self.numerator)?;
        write!(f, "/")?;
        write_part(f, &self.denominator)
    }
}

impl FromStr for RationalFunction {
    type Err = ValueParseError;

    /// Parse an arithmetic expression over numbers and parameter names using `+`, `-`, `*`,
    /// `/`, `^` (with a non-negative integer exponent) and parentheses. The result is
    /// simplified.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = ExpressionParser {
            text: s,
            tokens: tokenize(s)?,
            position: 0,
        };
        let result = parser.expression()?;
        if parser.position != parser.tokens.len() {
            return Err(ValueParseError::new(s, "unexpected trailing input"));
        }
        Ok(result.simplify())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(String),
    Identifier(String),
    Symbol(char),
}

fn tokenize(text: &str) -> Result<Vec<Token>, ValueParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Scientific notation, e.g. `1e-3`.
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '-' || chars[j] == '+') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Identifier(chars[start..i].iter().collect()));
        } else if "+-*/^()".contains(c) {
            tokens.push(Token::Symbol(c));
            i += 1;
        } else {
            return Err(ValueParseError::new(text, &format!("unexpected character `{c}`")));
        }
    }
    Ok(tokens)
}

/// Recursive descent parser for the grammar:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := unary (('*' | '/') unary)*
/// unary      := '-' unary | power
/// power      := atom ('^' number)?
/// atom       := number | identifier | '(' expression ')'
/// ```
struct ExpressionParser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl ExpressionParser<'_> {
    fn error(&self, reason: &str) -> ValueParseError {
        ValueParseError::new(self.text, reason)
    }

    fn peek_symbol(&self) -> Option<char> {
        match self.tokens.get(self.position) {
            Some(Token::Symbol(c)) => Some(*c),
            _ => None,
        }
    }

    fn expression(&mut self) -> Result<RationalFunction, ValueParseError> {
        let mut result = self.term()?;
        while let Some(c @ ('+' | '-')) = self.peek_symbol() {
            self.position += 1;
            let right = self.term()?;
            result = if c == '+' {
                result.add(&right)
            } else {
                result.sub(&right)
            };
        }
        Ok(result)
    }

    fn term(&mut self) -> Result<RationalFunction, ValueParseError> {
        let mut result = self.unary()?;
        while let Some(c @ ('*' | '/')) = self.peek_symbol() {
            self.position += 1;
            let right = self.unary()?;
            result = if c == '*' {
                result.mul(&right)
            } else {
                if right.clone().simplify().is_zero() {
                    return Err(self.error("division by zero"));
                }
                result.div(&right)
            };
        }
        Ok(result)
    }

    fn unary(&mut self) -> Result<RationalFunction, ValueParseError> {
        if self.peek_symbol() == Some('-') {
            self.position += 1;
            return Ok(self.unary()?.neg());
        }
        if self.peek_symbol() == Some('+') {
            self.position += 1;
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<RationalFunction, ValueParseError> {
        let base = self.atom()?;
        if self.peek_symbol() != Some('^') {
            return Ok(base);
        }
        self.position += 1;
        let exponent = match self.tokens.get(self.position) {
            Some(Token::Number(n)) => n
                .parse::<u32>()
                .map_err(|_| self.error("exponent must be a non-negative integer"))?,
            _ => return Err(self.error("expected an exponent")),
        };
        self.position += 1;
        let mut result = RationalFunction::one();
        for _ in 0..exponent {
            result = result.mul(&base);
        }
        Ok(result)
    }

    fn atom(&mut self) -> Result<RationalFunction, ValueParseError> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.position += 1;
        match token {
            Token::Number(n) => Ok(RationalFunction::constant(parse_rational(&n)?)),
            Token::Identifier(name) => Ok(RationalFunction::parameter(&name)),
            Token::Symbol('(') => {
                let inner = self.expression()?;
                if self.peek_symbol() != Some(')') {
                    return Err(self.error("missing `)`"));
                }
                self.position += 1;
                Ok(inner)
            }
            Token::Symbol(c) => Err(self.error(&format!("unexpected `{c}`"))),
        }
    }
}

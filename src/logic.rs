//! The property language understood by [`crate::modelchecker::EliminationModelChecker`].
//!
//! State formulas are propositional combinations of labels. A [`Property`] either asks
//! for the probability of a [`PathFormula`], or for the expected reward accumulated until
//! a state formula is reached.
//!
//! State formulas can be parsed from text: labels are identifiers or quoted strings,
//! combined with `!`, `&` and `|` (in decreasing order of precedence) and parentheses.
//!
//! ```rust
//! use dtmc_state_elimination::logic::StateFormula;
//!
//! let formula: StateFormula = "\"done\" & !(failed | true)".parse().unwrap();
//! assert_eq!(formula.to_string(), "(\"done\" & !(\"failed\" | true))");
//! ```

use crate::error::CheckError;
use crate::model::Dtmc;
use crate::storage::StateSet;
use crate::value::ValueOps;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StateFormula {
    True,
    False,
    Label(String),
    Not(Box<StateFormula>),
    And(Box<StateFormula>, Box<StateFormula>),
    Or(Box<StateFormula>, Box<StateFormula>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PathFormula {
    /// `F psi`, equivalent to `true U psi`.
    Eventually(StateFormula),
    /// `phi U psi`.
    Until(StateFormula, StateFormula),
    /// `P(left | right)`. Both sides must be [`PathFormula::Eventually`].
    Conditional(Box<PathFormula>, Box<PathFormula>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Property {
    /// `P=? [path]`
    Probability(PathFormula),
    /// `R=? [F target]`
    Reward(StateFormula),
}

impl StateFormula {
    pub fn label(name: &str) -> StateFormula {
        StateFormula::Label(name.to_string())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> StateFormula {
        StateFormula::Not(Box::new(self))
    }

    pub fn and(self, other: StateFormula) -> StateFormula {
        StateFormula::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: StateFormula) -> StateFormula {
        StateFormula::Or(Box::new(self), Box::new(other))
    }

    /// The states of `model` satisfying this formula.
    pub fn states<V: ValueOps>(&self, model: &Dtmc<V>) -> Result<StateSet, CheckError> {
        Ok(match self {
            StateFormula::True => StateSet::full(model.state_count()),
            StateFormula::False => StateSet::empty(model.state_count()),
            StateFormula::Label(name) => model
                .states_with_label(name)
                .cloned()
                .ok_or_else(|| CheckError::UnknownLabel(name.clone()))?,
            StateFormula::Not(inner) => inner.states(model)?.complement(),
            StateFormula::And(left, right) => left.states(model)?.intersect(&right.states(model)?),
            StateFormula::Or(left, right) => left.states(model)?.union(&right.states(model)?),
        })
    }
}

impl PathFormula {
    pub fn eventually(target: StateFormula) -> PathFormula {
        PathFormula::Eventually(target)
    }

    pub fn until(phi: StateFormula, psi: StateFormula) -> PathFormula {
        PathFormula::Until(phi, psi)
    }

    pub fn conditional(left: PathFormula, right: PathFormula) -> PathFormula {
        PathFormula::Conditional(Box::new(left), Box::new(right))
    }
}

impl Display for StateFormula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StateFormula::True => write!(f, "true"),
            StateFormula::False => write!(f, "false"),
            StateFormula::Label(name) => write!(f, "\"{name}\""),
            StateFormula::Not(inner) => write!(f, "!{inner}"),
            StateFormula::And(left, right) => write!(f, "({left} & {right})"),
            StateFormula::Or(left, right) => write!(f, "({left} | {right})"),
        }
    }
}

impl Display for PathFormula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathFormula::Eventually(target) => write!(f, "F {target}"),
            PathFormula::Until(phi, psi) => write!(f, "{phi} U {psi}"),
            PathFormula::Conditional(left, right) => write!(f, "{left} || {right}"),
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Probability(path) => write!(f, "P=? [{path}]"),
            Property::Reward(target) => write!(f, "R=? [F {target}]"),
        }
    }
}

impl FromStr for StateFormula {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
        };
        let formula = parser.disjunction()?;
        if let Some(token) = parser.tokens.get(parser.position) {
            return Err(CheckError::UnsupportedFormula(format!(
                "Unexpected `{token}` in `{s}`."
            )));
        }
        Ok(formula)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum Token {
    Not,
    And,
    Or,
    Open,
    Close,
    Name(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Not => write!(f, "!"),
            Token::And => write!(f, "&"),
            Token::Or => write!(f, "|"),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Name(name) => write!(f, "{name}"),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, CheckError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => (),
            '!' => tokens.push(Token::Not),
            '&' => tokens.push(Token::And),
            '|' => tokens.push(Token::Or),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '"' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(CheckError::UnsupportedFormula(format!(
                                "Unterminated label in `{text}`."
                            )));
                        }
                    }
                }
                tokens.push(Token::Name(name));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut name = String::from(c);
                while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
                    name.push(c);
                }
                tokens.push(Token::Name(name));
            }
            c => {
                return Err(CheckError::UnsupportedFormula(format!(
                    "Unexpected `{c}` in `{text}`."
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl Parser<'_> {
    fn next_if(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.position) == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn disjunction(&mut self) -> Result<StateFormula, CheckError> {
        let mut result = self.conjunction()?;
        while self.next_if(&Token::Or) {
            result = result.or(self.conjunction()?);
        }
        Ok(result)
    }

    fn conjunction(&mut self) -> Result<StateFormula, CheckError> {
        let mut result = self.unary()?;
        while self.next_if(&Token::And) {
            result = result.and(self.unary()?);
        }
        Ok(result)
    }

    fn unary(&mut self) -> Result<StateFormula, CheckError> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        match token {
            Some(Token::Not) => Ok(self.unary()?.not()),
            Some(Token::Open) => {
                let inner = self.disjunction()?;
                if self.next_if(&Token::Close) {
                    Ok(inner)
                } else {
                    Err(CheckError::UnsupportedFormula("Missing `)`.".to_string()))
                }
            }
            Some(Token::Name(name)) if name == "true" => Ok(StateFormula::True),
            Some(Token::Name(name)) if name == "false" => Ok(StateFormula::False),
            Some(Token::Name(name)) => Ok(StateFormula::Label(name)),
            Some(token) => Err(CheckError::UnsupportedFormula(format!(
                "Unexpected `{token}`."
            ))),
            None => Err(CheckError::UnsupportedFormula(
                "Unexpected end of formula.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CheckError;
    use crate::logic::StateFormula;
    use crate::model::DtmcBuilder;
    use crate::test_utils::collect_states;

    #[test]
    fn test_parse_precedence() {
        let formula: StateFormula = "a | b & !c".parse().unwrap();
        let expected = StateFormula::label("a")
            .or(StateFormula::label("b").and(StateFormula::label("c").not()));
        assert_eq!(formula, expected);

        let formula: StateFormula = "(a | \"b c\") & true".parse().unwrap();
        let expected = StateFormula::label("a")
            .or(StateFormula::label("b c"))
            .and(StateFormula::True);
        assert_eq!(formula, expected);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "a &".parse::<StateFormula>(),
            Err(CheckError::UnsupportedFormula(_))
        ));
        assert!(matches!(
            "(a".parse::<StateFormula>(),
            Err(CheckError::UnsupportedFormula(_))
        ));
        assert!(matches!(
            "a b".parse::<StateFormula>(),
            Err(CheckError::UnsupportedFormula(_))
        ));
        assert!(matches!(
            "\"a".parse::<StateFormula>(),
            Err(CheckError::UnsupportedFormula(_))
        ));
    }

    #[test]
    fn test_evaluate_state_formulas() {
        let mut builder = DtmcBuilder::<f64>::new(3);
        for state in 0..3 {
            builder.add_transition(state, state, 1.0).unwrap();
        }
        builder.add_initial_state(0).unwrap();
        builder.add_label("a", 1).unwrap();
        builder.add_label("b", 1).unwrap();
        builder.add_label("b", 2).unwrap();
        let model = builder.build().unwrap();

        let states = |text: &str| {
            let formula: StateFormula = text.parse().unwrap();
            formula.states(&model).map(|it| collect_states(&it))
        };
        assert_eq!(states("a").unwrap(), vec![1]);
        assert_eq!(states("!a & b").unwrap(), vec![2]);
        assert_eq!(states("a | init").unwrap(), vec![0, 1]);
        assert_eq!(states("false | !true").unwrap(), Vec::<usize>::new());
        assert!(matches!(states("c"), Err(CheckError::UnknownLabel(name)) if name == "c"));
    }
}

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// A named symbolic parameter of a parametric model.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Parameter(String);

impl Parameter {
    pub fn new(name: &str) -> Parameter {
        Parameter(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product of parameters with positive exponents (the empty product is `1`).
///
/// Factors are sorted by parameter. Monomials are ordered lexicographically: the monomial
/// with the higher exponent of the first (smallest) parameter on which they differ is greater.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Monomial(Vec<(Parameter, u32)>);

impl Monomial {
    pub fn one() -> Monomial {
        Monomial(Vec::new())
    }

    pub fn parameter(parameter: Parameter) -> Monomial {
        Monomial(vec![(parameter, 1)])
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn factors(&self) -> &[(Parameter, u32)] {
        &self.0
    }

    pub fn degree_in(&self, parameter: &Parameter) -> u32 {
        self.0
            .iter()
            .find(|(p, _)| p == parameter)
            .map(|(_, e)| *e)
            .unwrap_or(0)
    }

    fn mul(&self, other: &Monomial) -> Monomial {
        let mut result = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].0.cmp(&other.0[j].0) {
                Ordering::Less => {
                    result.push(self.0[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    result.push(other.0[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    result.push((self.0[i].0.clone(), self.0[i].1 + other.0[j].1));
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&self.0[i..]);
        result.extend_from_slice(&other.0[j..]);
        Monomial(result)
    }

    /// Compute `self / other`, if `other` divides `self`.
    fn div(&self, other: &Monomial) -> Option<Monomial> {
        let mut result = Vec::with_capacity(self.0.len());
        let mut j = 0;
        for (parameter, exponent) in &self.0 {
            let mut exponent = *exponent;
            if j < other.0.len() {
                match other.0[j].0.cmp(parameter) {
                    Ordering::Less => return None,
                    Ordering::Equal => {
                        if other.0[j].1 > exponent {
                            return None;
                        }
                        exponent -= other.0[j].1;
                        j += 1;
                    }
                    Ordering::Greater => {}
                }
            }
            if exponent > 0 {
                result.push((parameter.clone(), exponent));
            }
        }
        if j < other.0.len() {
            return None;
        }
        Some(Monomial(result))
    }

    /// Split off the factor of `parameter`, returning its exponent and the remaining monomial.
    fn split(&self, parameter: &Parameter) -> (u32, Monomial) {
        let mut exponent = 0;
        let mut rest = Vec::with_capacity(self.0.len());
        for (p, e) in &self.0 {
            if p == parameter {
                exponent = *e;
            } else {
                rest.push((p.clone(), *e));
            }
        }
        (exponent, Monomial(rest))
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        let (mut i, mut j) = (0, 0);
        loop {
            match (self.0.get(i), other.0.get(j)) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((p, e)), Some((q, f))) => match p.cmp(q) {
                    // `self` contains a smaller parameter which `other` lacks.
                    Ordering::Less => return Ordering::Greater,
                    Ordering::Greater => return Ordering::Less,
                    Ordering::Equal => {
                        if e != f {
                            return e.cmp(f);
                        }
                        i += 1;
                        j += 1;
                    }
                },
            }
        }
    }
}

impl Display for Monomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (parameter, exponent) in &self.0 {
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if *exponent == 1 {
                write!(f, "{parameter}")?;
            } else {
                write!(f, "{parameter}^{exponent}")?;
            }
        }
        Ok(())
    }
}

/// A multivariate polynomial with rational coefficients.
///
/// Terms are kept in a map ordered by [`Monomial`] order, so the leading term is always the
/// last entry. Zero coefficients are never stored.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Polynomial {
    pub fn zero() -> Polynomial {
        Polynomial::default()
    }

    pub fn one() -> Polynomial {
        Polynomial::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Polynomial {
        let mut result = Polynomial::zero();
        result.add_term(Monomial::one(), value);
        result
    }

    pub fn parameter(parameter: Parameter) -> Polynomial {
        let mut result = Polynomial::zero();
        result.add_term(Monomial::parameter(parameter), BigRational::one());
        result
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.constant_value().map(|it| it.is_one()).unwrap_or(false)
    }

    /// The value of this polynomial if it does not depend on any parameter.
    pub fn constant_value(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .terms
                .get(&Monomial::one())
                .cloned(),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constant_value().is_some()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn parameters(&self) -> BTreeSet<Parameter> {
        self.terms
            .keys()
            .flat_map(|m| m.factors().iter().map(|(p, _)| p.clone()))
            .collect()
    }

    pub fn degree_in(&self, parameter: &Parameter) -> u32 {
        self.terms
            .keys()
            .map(|m| m.degree_in(parameter))
            .max()
            .unwrap_or(0)
    }

    /// Coefficient of the greatest monomial, `None` for the zero polynomial.
    pub fn leading_coefficient(&self) -> Option<&BigRational> {
        self.leading_term().map(|(_, c)| c)
    }

    fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().next_back()
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(coefficient);
            }
            std::collections::btree_map::Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().is_zero() {
                    entry.remove();
                }
            }
        }
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut result = self.clone();
        for (m, c) in &other.terms {
            result.add_term(m.clone(), c.clone());
        }
        result
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        let mut result = self.clone();
        for (m, c) in &other.terms {
            result.add_term(m.clone(), -c.clone());
        }
        result
    }

    pub fn neg(&self) -> Polynomial {
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c.clone())).collect(),
        }
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        let mut result = Polynomial::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                result.add_term(m1.mul(m2), c1 * c2);
            }
        }
        result
    }

    pub fn scale(&self, factor: &BigRational) -> Polynomial {
        if factor.is_zero() {
            return Polynomial::zero();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    pub fn pow(&self, exponent: u32) -> Polynomial {
        let mut result = Polynomial::one();
        for _ in 0..exponent {
            result = result.mul(self);
        }
        result
    }

    /// Divide by the leading coefficient, making the polynomial monic.
    pub fn monic(&self) -> Polynomial {
        match self.leading_term() {
            None => Polynomial::zero(),
            Some((_, c)) => {
                let factor = c.recip();
                self.scale(&factor)
            }
        }
    }

    /// Compute `self / divisor` if the division is exact, `None` otherwise.
    pub fn div_exact(&self, divisor: &Polynomial) -> Option<Polynomial> {
        assert!(
            !divisor.is_zero(),
            "Correctness violation: Polynomial division by zero."
        );
        if let Some(c) = divisor.constant_value() {
            return Some(self.scale(&c.recip()));
        }
        let (lead_m, lead_c) = divisor.leading_term()?;
        let mut remainder = self.clone();
        let mut quotient = Polynomial::zero();
        while let Some((m, c)) = remainder.leading_term() {
            let factor_m = m.div(lead_m)?;
            let factor_c = c / lead_c;
            let mut factor = Polynomial::zero();
            factor.add_term(factor_m, factor_c);
            remainder = remainder.sub(&factor.mul(divisor));
            quotient = quotient.add(&factor);
        }
        Some(quotient)
    }

    /// Substitute values for all parameters. Returns `None` if some parameter is missing
    /// from the `valuation`.
    pub fn evaluate(&self, valuation: &BTreeMap<Parameter, BigRational>) -> Option<BigRational> {
        let mut result = BigRational::zero();
        for (m, c) in &self.terms {
            let mut term = c.clone();
            for (p, e) in m.factors() {
                let value = valuation.get(p)?;
                term *= num_traits::pow(value.clone(), *e as usize);
            }
            result += term;
        }
        Some(result)
    }

    /// Split into coefficients of `parameter`: `self = sum_i result[i] * parameter^i`.
    fn coefficients_in(&self, parameter: &Parameter) -> Vec<Polynomial> {
        let mut result = vec![Polynomial::zero(); self.degree_in(parameter) as usize + 1];
        for (m, c) in &self.terms {
            let (exponent, rest) = m.split(parameter);
            result[exponent as usize].add_term(rest, c.clone());
        }
        result
    }

    fn leading_coefficient_in(&self, parameter: &Parameter) -> Polynomial {
        self.coefficients_in(parameter)
            .pop()
            .unwrap_or_else(Polynomial::zero)
    }

    /// The (monic) greatest common divisor of all coefficients with respect to `parameter`.
    fn content_in(&self, parameter: &Parameter) -> Polynomial {
        self.coefficients_in(parameter)
            .iter()
            .fold(Polynomial::zero(), |acc, c| Polynomial::gcd(&acc, c))
    }

    fn primitive_part_in(&self, parameter: &Parameter) -> Polynomial {
        let content = self.content_in(parameter);
        if content.is_zero() {
            return Polynomial::zero();
        }
        self.div_exact(&content)
            .expect("Correctness violation: Content must divide the polynomial.")
    }

    /// Sparse pseudo-remainder of `self` divided by `divisor` with respect to `parameter`.
    fn pseudo_remainder(&self, divisor: &Polynomial, parameter: &Parameter) -> Polynomial {
        let divisor_degree = divisor.degree_in(parameter);
        let divisor_lead = divisor.leading_coefficient_in(parameter);
        let mut remainder = self.clone();
        while !remainder.is_zero() && remainder.degree_in(parameter) >= divisor_degree {
            let shift = remainder.degree_in(parameter) - divisor_degree;
            let remainder_lead = remainder.leading_coefficient_in(parameter);
            let shifted = Polynomial::parameter(parameter.clone())
                .pow(shift)
                .mul(&remainder_lead)
                .mul(divisor);
            remainder = divisor_lead.mul(&remainder).sub(&shifted);
        }
        remainder
    }

    /// The monic greatest common divisor of two polynomials over the rationals.
    ///
    /// Uses the recursive primitive polynomial remainder sequence: the main parameter is the
    /// smallest parameter present in either argument, the contents are handled recursively
    /// with one parameter less.
    pub fn gcd(a: &Polynomial, b: &Polynomial) -> Polynomial {
        if a.is_zero() {
            return b.monic();
        }
        if b.is_zero() {
            return a.monic();
        }
        if a.is_constant() || b.is_constant() {
            return Polynomial::one();
        }

        let parameters = a.parameters();
        let other = b.parameters();
        let main = parameters
            .iter()
            .chain(other.iter())
            .min()
            .cloned()
            .expect("Correctness violation: Non-constant polynomial without parameters.");

        let a_degree = a.degree_in(&main);
        let b_degree = b.degree_in(&main);
        if a_degree == 0 {
            return Polynomial::gcd(a, &b.content_in(&main));
        }
        if b_degree == 0 {
            return Polynomial::gcd(&a.content_in(&main), b);
        }

        let content = Polynomial::gcd(&a.content_in(&main), &b.content_in(&main));
        let (mut f, mut g) = if a_degree >= b_degree {
            (a.primitive_part_in(&main), b.primitive_part_in(&main))
        } else {
            (b.primitive_part_in(&main), a.primitive_part_in(&main))
        };

        loop {
            let remainder = f.pseudo_remainder(&g, &main);
            if remainder.is_zero() {
                break;
            }
            if remainder.degree_in(&main) == 0 {
                g = Polynomial::one();
                break;
            }
            f = g;
            g = remainder.primitive_part_in(&main);
        }

        content.mul(&g).monic()
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (m, c)) in self.terms.iter().rev().enumerate() {
            let magnitude = c.abs();
            if i == 0 {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            if m.is_one() {
                write!(f, "{magnitude}")?;
            } else if magnitude.is_one() {
                write!(f, "{m}")?;
            } else {
                write!(f, "{magnitude}*{m}")?;
            }
        }
        Ok(())
    }
}

impl From<BigRational> for Polynomial {
    fn from(value: BigRational) -> Self {
        Polynomial::constant(value)
    }
}

impl From<i64> for Polynomial {
    fn from(value: i64) -> Self {
        Polynomial::constant(BigRational::from_integer(BigInt::from(value)))
    }
}

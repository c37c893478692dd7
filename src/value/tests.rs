use crate::value::{Parameter, RationalFunction, ValueOps, parse_rational};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::collections::BTreeMap;

fn rf(text: &str) -> RationalFunction {
    text.parse().unwrap()
}

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

#[test]
fn parse_rational_forms() {
    assert_eq!(parse_rational("3/8").unwrap(), ratio(3, 8));
    assert_eq!(parse_rational("0.375").unwrap(), ratio(3, 8));
    assert_eq!(parse_rational("-1.5e-2").unwrap(), ratio(-3, 200));
    assert_eq!(parse_rational("12").unwrap(), ratio(12, 1));
    assert!(parse_rational("1/0").is_err());
    assert!(parse_rational("abc").is_err());
    assert!(parse_rational("").is_err());
}

#[test]
fn parse_float_values() {
    assert_eq!(f64::parse_value("0.25").unwrap(), 0.25);
    assert_eq!(f64::parse_value("1/4").unwrap(), 0.25);
    assert!(f64::parse_value("p").is_err());
}

#[test]
fn invert_complement() {
    assert_eq!(0.5f64.invert_complement(), 2.0);
    assert_eq!(ratio(1, 3).invert_complement(), ratio(3, 2));
    let p = rf("p");
    assert_eq!(p.invert_complement().simplify(), rf("1/(1-p)"));
}

#[test]
fn parse_rational_functions() {
    assert_eq!(rf("0.25").constant_value(), Some(ratio(1, 4)));
    assert_eq!(rf("2*(p+1) - 2*p").constant_value(), Some(ratio(2, 1)));
    assert_eq!(rf("p^2/p"), rf("p"));
    assert_eq!(rf("-p + 1"), rf("1 - p"));
    assert!("p +".parse::<RationalFunction>().is_err());
    assert!("p / (q - q)".parse::<RationalFunction>().is_err());
    assert!("p $ q".parse::<RationalFunction>().is_err());
    assert!("(p".parse::<RationalFunction>().is_err());
}

#[test]
fn simplify_cancels_common_factors() {
    // (p^2 - 1) / (2p + 2) = (p - 1) / 2
    let value = rf("p^2 - 1").div(&rf("2*p + 2")).simplify();
    assert_eq!(value.denominator().to_string(), "1");
    assert_eq!(value.numerator().to_string(), "1/2*p - 1/2");

    // p*q / (p*q + p) = q / (q + 1)
    let value = rf("p*q").div(&rf("p*q + p")).simplify();
    assert_eq!(value.to_string(), "q/(q + 1)");
}

#[test]
fn simplify_is_idempotent() {
    let inputs = [
        "p",
        "1/3",
        "(1-p)*(1-q)/((1-p)*q)",
        "p/(p+q) + q/(p+q)",
        "(p^2 - q^2)/(3*p - 3*q)",
        "(2*p*q + 4*q)/(6*q^2)",
    ];
    for input in inputs {
        let raw = rf(input);
        let once = raw.clone().simplify();
        let twice = once.clone().simplify();
        assert_eq!(once.numerator(), twice.numerator(), "{input}");
        assert_eq!(once.denominator(), twice.denominator(), "{input}");
        assert_eq!(once, raw);
    }
    assert!(rf("p/(p+q) + q/(p+q)").is_one());
}

#[test]
fn rational_simplify_is_idempotent() {
    let value = ratio(6, 8);
    assert_eq!(value.clone().simplify(), value.clone().simplify().simplify());
    assert_eq!(0.3f64.simplify(), 0.3f64.simplify().simplify());
}

#[test]
fn evaluate_rational_function() {
    let value = rf("p*q/(1+q)");
    let mut valuation = BTreeMap::new();
    valuation.insert(Parameter::new("p"), ratio(1, 2));
    assert_eq!(value.evaluate(&valuation), None);
    valuation.insert(Parameter::new("q"), ratio(1, 3));
    assert_eq!(value.evaluate(&valuation), Some(ratio(1, 8)));
    assert_eq!(value.evaluate_f64(&valuation), Some(0.125));

    let pole = rf("1/(1-p)");
    valuation.insert(Parameter::new("p"), ratio(1, 1));
    assert_eq!(pole.evaluate(&valuation), None);
}

#[test]
fn constant_functions_convert_to_f64() {
    assert_eq!(rf("3/4").to_f64(), Some(0.75));
    assert_eq!(rf("p").to_f64(), None);
}

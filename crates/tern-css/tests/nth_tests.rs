//! Tests for `An+B` parsing and evaluation.

use quickcheck_macros::quickcheck;
use tern_css::{CompileError, NthMatch, Syntax, compile, evaluate, parse_nth};

fn nth(expr: &str) -> NthMatch {
    parse_nth(expr).unwrap()
}

#[test]
fn test_keywords() {
    assert_eq!(nth("odd"), NthMatch::new(2, 1));
    assert_eq!(nth("even"), NthMatch::new(2, 0));
    assert_eq!(nth(" ODD "), NthMatch::new(2, 1));
}

#[test]
fn test_an_plus_b_forms() {
    assert_eq!(nth("3"), NthMatch::new(0, 3));
    assert_eq!(nth("n"), NthMatch::new(1, 0));
    assert_eq!(nth("+n"), NthMatch::new(1, 0));
    assert_eq!(nth("-n+3"), NthMatch::new(-1, 3));
    assert_eq!(nth("2n+1"), NthMatch::new(2, 1));
    assert_eq!(nth("2N-1"), NthMatch::new(2, -1));
    assert_eq!(nth("3n + 8"), NthMatch::new(3, 8));
    assert_eq!(nth("-2n+10"), NthMatch::new(-2, 10));
}

#[test]
fn test_from_end_shorthands() {
    assert_eq!(nth("-2"), NthMatch::new(0, 2).from_end());
    assert_eq!(nth("-0n+3"), NthMatch::new(-1, 3).from_end());
}

#[test]
fn test_invalid_expressions() {
    for expr in ["", "   ", "abc", "2n+", "n+-1", "2n1", "1.5", "nn"] {
        assert!(
            matches!(parse_nth(expr), Err(CompileError::Syntax { .. })),
            "{expr:?} should not parse"
        );
    }
}

#[test]
fn test_modular_matching() {
    assert!(evaluate(nth("even"), 4, 10));
    assert!(!evaluate(nth("odd"), 4, 10));
    assert!(evaluate(nth("3n+8"), 8, 20));
    assert!(!evaluate(nth("3n+8"), 9, 20));
    assert!(evaluate(nth("3n+8"), 11, 20));
    assert!(!evaluate(nth("3n+8"), 5, 20));
}

#[test]
fn test_negative_step_selects_the_first_few() {
    let first_three = nth("-n+3");
    let matched: Vec<usize> = (1..=6).filter(|&p| evaluate(first_three, p, 6)).collect();
    assert_eq!(matched, vec![1, 2, 3]);
}

#[test]
fn test_exact_index_needs_a_positive_index() {
    assert!(evaluate(NthMatch::new(0, 2), 2, 5));
    assert!(!evaluate(NthMatch::new(0, 0), 1, 5));
    assert!(!evaluate(NthMatch::new(0, -1), 1, 5));
    assert!(!evaluate(nth("0n+0"), 1, 5));
}

#[test]
fn test_counting_from_the_end() {
    let last_two = nth("-0n+2");
    let matched: Vec<usize> = (1..=5).filter(|&p| evaluate(last_two, p, 5)).collect();
    assert_eq!(matched, vec![4, 5]);

    let second_from_end = nth("-2");
    let matched: Vec<usize> = (1..=5).filter(|&p| evaluate(second_from_end, p, 5)).collect();
    assert_eq!(matched, vec![4]);

    assert!(NthMatch::LAST.matches(5, 5));
    assert!(NthMatch::FIRST.matches(1, 5));
    assert!(!NthMatch::LAST.matches(1, 5));
}

#[test]
fn test_extreme_negative_index_is_rejected() {
    assert!(matches!(
        parse_nth("-9223372036854775808"),
        Err(CompileError::Syntax { .. })
    ));
    assert!(matches!(
        compile("p:nth-child(-9223372036854775808)", Syntax::Css),
        Err(CompileError::Syntax { .. })
    ));
    assert_eq!(
        nth("-9223372036854775807"),
        NthMatch::new(0, isize::MAX).from_end()
    );
}

#[test]
fn test_extreme_steps_and_indices_evaluate() {
    let shifted = nth("2n-9223372036854775808");
    assert_eq!(shifted, NthMatch::new(2, isize::MIN));
    assert!(!evaluate(shifted, 1, 1));
    assert!(evaluate(shifted, 2, 2));

    let widest = NthMatch::new(isize::MIN, 1);
    assert!(evaluate(widest, 1, 3));
    assert!(!evaluate(widest, 2, 3));

    assert!(!evaluate(NthMatch::new(-1, isize::MIN), 1, 1));
    assert!(!evaluate(NthMatch::new(isize::MAX, isize::MAX).from_end(), 1, 1));
    assert!(!evaluate(NthMatch::new(0, isize::MAX), usize::MAX, usize::MAX));
}

#[quickcheck]
fn evaluate_agrees_with_enumeration(step: i8, index: i8, position: u8) -> bool {
    let nth = NthMatch::new(isize::from(step % 8), isize::from(index % 16));
    let position = usize::from(position % 40) + 1;
    let p = isize::try_from(position).unwrap();
    let expected = (0..=200_isize).any(|k| nth.step * k + nth.index == p);
    evaluate(nth, position, 40) == expected
}

#[quickcheck]
fn from_end_mirrors_position(step: i8, index: i8, position: u8, extra: u8) -> bool {
    let nth = NthMatch::new(isize::from(step % 8), isize::from(index % 16));
    let position = usize::from(position % 30) + 1;
    let count = position + usize::from(extra % 30);
    evaluate(nth.from_end(), position, count) == evaluate(nth, count - position + 1, count)
}

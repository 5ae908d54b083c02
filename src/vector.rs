//! Numeric vector literals of the form `[1,2.5,-3e2]` and their dot product.

use std::{iter, str};

use log::trace;

use crate::ReplError;

type CharStream<'a> = iter::Peekable<str::Chars<'a>>;

fn malformed(input: &str, reason: &str) -> ReplError {
    ReplError::MalformedVectorInput(format!("{}: `{}`", reason, input))
}

/// Lex a single number starting at the current position.
///
/// Accepts an optional sign, digits, an optional fraction and an optional
/// exponent. Anything `f64::from_str` would take beyond that (`inf`, `nan`)
/// is not a number here, and neither is a literal too large for `f64`.
fn lex_number(chars: &mut CharStream) -> Option<f64> {
    let mut num = String::new();

    if let Some(&ch) = chars.peek() {
        if ch == '-' || ch == '+' {
            num.push(ch);
            chars.next();
        }
    }

    while let Some(&ch) = chars.peek() {
        match ch {
            '0'..='9' | '.' => num.push(ch),

            // An exponent may carry its own sign.
            'e' | 'E' => {
                num.push(ch);
                chars.next();
                if let Some(&sign) = chars.peek() {
                    if sign == '-' || sign == '+' {
                        num.push(sign);
                        chars.next();
                    }
                }
                continue;
            }

            _ => break,
        }
        chars.next();
    }

    num.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Parse a bracketed, comma-separated list of numbers.
pub fn parse_vector(input: &str) -> Result<Vec<f64>, ReplError> {
    let mut chars = input.chars().peekable();
    let mut items = Vec::new();

    match chars.next() {
        Some('[') => {}
        _ => return Err(malformed(input, "expected '['")),
    }

    if chars.peek() == Some(&']') {
        chars.next();
    } else {
        loop {
            match lex_number(&mut chars) {
                Some(x) => items.push(x),
                None => return Err(malformed(input, "expected a number")),
            }

            match chars.next() {
                Some(',') => continue,
                Some(']') => break,
                Some(ch) => {
                    return Err(malformed(input, &format!("unexpected '{}'", ch)));
                }
                None => return Err(malformed(input, "eof while scanning for ']'")),
            }
        }
    }

    if chars.next().is_some() {
        return Err(malformed(input, "trailing input after ']'"));
    }

    trace!("parsed vector {:?} from {:?}", items, input);
    Ok(items)
}

/// Element-wise multiply and sum. Both sides must have the same length and
/// the sum must stay finite.
pub fn dot(lhs: &[f64], rhs: &[f64]) -> Result<f64, ReplError> {
    if lhs.len() != rhs.len() {
        return Err(ReplError::DimensionMismatch {
            left: lhs.len(),
            right: rhs.len(),
        });
    }

    let sum: f64 = lhs.iter().zip(rhs).map(|(x, y)| x * y).sum();
    if !sum.is_finite() {
        return Err(ReplError::Overflow);
    }

    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integers() {
        assert_eq!(parse_vector("[1,2,3]").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn parse_signed_and_fractional() {
        assert_eq!(parse_vector("[-1.5,+2,0.25]").unwrap(), vec![-1.5, 2.0, 0.25]);
    }

    #[test]
    fn parse_exponent() {
        assert_eq!(parse_vector("[1e2,2.5E-1]").unwrap(), vec![100.0, 0.25]);
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse_vector("[]").unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn parse_single() {
        assert_eq!(parse_vector("[7]").unwrap(), vec![7.0]);
    }

    #[test]
    fn reject_missing_brackets() {
        assert!(matches!(parse_vector("1,2,3"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[1,2,3"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector(""), Err(ReplError::MalformedVectorInput(_))));
    }

    #[test]
    fn reject_bad_elements() {
        assert!(matches!(parse_vector("[1,,2]"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[1,2,]"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[1,a]"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[nan]"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[1.2.3]"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[-]"), Err(ReplError::MalformedVectorInput(_))));
    }

    #[test]
    fn reject_overflowing_literal() {
        assert!(matches!(parse_vector("[1e999]"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[1,-1e400]"), Err(ReplError::MalformedVectorInput(_))));
        assert_eq!(parse_vector("[1e300]").unwrap(), vec![1e300]);
    }

    #[test]
    fn reject_trailing_input() {
        assert!(matches!(parse_vector("[1,2]x"), Err(ReplError::MalformedVectorInput(_))));
        assert!(matches!(parse_vector("[1][2]"), Err(ReplError::MalformedVectorInput(_))));
    }

    #[test]
    fn reject_expression_text() {
        assert!(matches!(
            parse_vector("__import__('os')"),
            Err(ReplError::MalformedVectorInput(_))
        ));
    }

    #[test]
    fn dot_matching() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert_eq!(dot(&[0.5, -2.0], &[4.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn dot_empty() {
        assert_eq!(dot(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn dot_overflow() {
        assert!(matches!(dot(&[1e300], &[1e300]), Err(ReplError::Overflow)));
        assert!(matches!(
            dot(&[f64::MAX, f64::MAX], &[1.0, 1.0]),
            Err(ReplError::Overflow)
        ));
    }

    #[test]
    fn dot_mismatch() {
        match dot(&[1.0, 2.0], &[1.0, 2.0, 3.0]) {
            Err(ReplError::DimensionMismatch { left, right }) => {
                assert_eq!((left, right), (2, 3));
            }
            x => panic!("expected dimension mismatch but found: {:?}", x),
        }
    }
}

//! Culture-invariant numeric field parsing.

use nom::{character::complete::i64 as signed, combinator::all_consuming, number::complete::double, IResult};

use crate::error::{MeshError, Result};

fn float_token(input: &str) -> IResult<&str, f64> {
    all_consuming(double)(input)
}

fn integer_token(input: &str) -> IResult<&str, i64> {
    all_consuming(signed)(input)
}

/// Parse a single floating point token, `None` if it is not a number.
pub fn float(token: &str) -> Option<f64> {
    float_token(token).ok().map(|(_, value)| value)
}

/// Parse a single integer token, `None` if it is not an integer.
pub fn integer(token: &str) -> Option<i64> {
    integer_token(token).ok().map(|(_, value)| value)
}

/// Parse every whitespace-separated field of `args` as a float.
///
/// Fails if any field is malformed or fewer than `required` fields are present.
pub fn floats(args: &str, line: usize, required: usize) -> Result<Vec<f64>> {
    let values = args
        .split_whitespace()
        .map(|token| {
            float(token).ok_or_else(|| MeshError::Number {
                line,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() < required {
        return Err(MeshError::Number {
            line,
            token: args.to_string(),
        });
    }
    Ok(values)
}

/// Parse an integer field, failing with a numeric error.
pub fn index(token: &str, line: usize) -> Result<i64> {
    integer(token).ok_or_else(|| MeshError::Number {
        line,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floats() {
        let values = floats("1  -2.5\t3e2 .5", 1, 3).unwrap();
        assert_eq!(values, vec![1.0, -2.5, 300.0, 0.5]);
    }

    #[test]
    fn test_comma_decimal_is_rejected() {
        let err = floats("1,5 2 3", 7, 3).unwrap_err();
        match err {
            MeshError::Number { line, token } => {
                assert_eq!(line, 7);
                assert_eq!(token, "1,5");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_too_few_fields() {
        assert!(matches!(floats("1 2", 2, 3), Err(MeshError::Number { line: 2, .. })));
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert_eq!(float("1.0abc"), None);
        assert_eq!(integer("12x"), None);
        assert_eq!(integer("-4"), Some(-4));
        assert_eq!(integer("1.5"), None);
    }
}

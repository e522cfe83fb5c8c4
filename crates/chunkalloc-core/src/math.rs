//! Overflow-checked arithmetic used to populate the demo containers.

use crate::error::OverflowError;

/// Largest input whose factorial fits in an `i32` (`12! = 479_001_600`).
pub const MAX_FACTORIAL_INPUT: i32 = 12;

/// Compute `n!` as an `i32`.
///
/// The running product is kept in an `i64` and compared against
/// `i32::MAX` after every multiplication, so the overflow is reported
/// before anything wraps. Inputs below 2 (including negatives) yield 1.
///
/// # Errors
///
/// Returns [`OverflowError::Factorial`] carrying `n` when the result
/// exceeds `i32::MAX`.
pub fn factorial(n: i32) -> Result<i32, OverflowError> {
    let mut result: i64 = 1;

    for i in 2..=n {
        result *= i64::from(i);
        if result > i64::from(i32::MAX) {
            return Err(OverflowError::Factorial { input: n });
        }
    }

    // Bounded by the check above.
    Ok(result as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values() {
        assert_eq!(factorial(0), Ok(1));
        assert_eq!(factorial(1), Ok(1));
        assert_eq!(factorial(2), Ok(2));
        assert_eq!(factorial(5), Ok(120));
        assert_eq!(factorial(10), Ok(3_628_800));
    }

    #[test]
    fn negative_input_is_empty_product() {
        assert_eq!(factorial(-4), Ok(1));
    }

    #[test]
    fn largest_representable_input() {
        assert_eq!(factorial(MAX_FACTORIAL_INPUT), Ok(479_001_600));
    }

    #[test]
    fn thirteen_overflows() {
        let err = factorial(13).unwrap_err();
        assert_eq!(err, OverflowError::Factorial { input: 13 });
        assert!(err.to_string().contains("13"));
    }

    #[test]
    fn large_input_reports_original_argument() {
        assert_eq!(
            factorial(i32::MAX),
            Err(OverflowError::Factorial { input: i32::MAX })
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn recurrence_holds(n in 1i32..=MAX_FACTORIAL_INPUT) {
                let prev = factorial(n - 1).unwrap();
                prop_assert_eq!(factorial(n).unwrap(), prev * n);
            }

            #[test]
            fn everything_past_twelve_overflows(n in (MAX_FACTORIAL_INPUT + 1)..200) {
                prop_assert_eq!(factorial(n), Err(OverflowError::Factorial { input: n }));
            }
        }
    }
}

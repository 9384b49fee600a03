//! Reset-code generation and well-formedness checks.

use rand::Rng;

/// Number of digits in a reset code.
pub const CODE_LEN: usize = 6;

/// Generate a reset code: 6 independent random decimal digits.
///
/// No uniqueness is enforced against other outstanding codes; lookups
/// resolve duplicates to the most recently issued one.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Whether a submitted code even has the right shape. Malformed codes
/// are rejected before any lookup.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..100 {
            let code = generate_code();
            assert!(is_well_formed(&code), "bad code: {code}");
        }
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("12345"));
        assert!(!is_well_formed("1234567"));
    }

    #[test]
    fn non_digits_rejected() {
        assert!(!is_well_formed("12a456"));
        assert!(!is_well_formed("12 456"));
        // Six bytes of non-ASCII must not pass the length check either.
        assert!(!is_well_formed("½23456"));
    }
}

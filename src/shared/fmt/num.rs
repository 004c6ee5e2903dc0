//! Digit grouping for already-rounded numeric strings.

/// Inserts `,` thousands separators into the integer part of a formatted number.
///
/// The fraction part is kept verbatim, so fixed-precision output such as
/// `"1234.50"` becomes `"1,234.50"` rather than losing its trailing zero.
pub fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let digits = integer.as_bytes();
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands_integers() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567890"), "1,234,567,890");
    }

    #[test]
    fn test_group_thousands_keeps_fraction() {
        assert_eq!(group_thousands("1234.50"), "1,234.50");
        assert_eq!(group_thousands("0.000123"), "0.000123");
        assert_eq!(group_thousands("98765.4321"), "98,765.4321");
    }

    #[test]
    fn test_group_thousands_negative() {
        assert_eq!(group_thousands("-1"), "-1");
        assert_eq!(group_thousands("-100"), "-100");
        assert_eq!(group_thousands("-1234.56"), "-1,234.56");
    }
}

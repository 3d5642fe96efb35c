//! Dimension ratio expressions using logos
//!
//! Accepted forms: `"1.5"`, `"16:9"`, `"W,16:9"`, `"h, 3:4"`. The optional
//! prefix names the side computed from the other one; with `H` a `a:b`
//! ratio is inverted so the stored value is always width over height.

use logos::Logos;

use super::widget::RatioSide;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum RatioToken {
    #[token("W", ignore(ascii_case))]
    Width,
    #[token("H", ignore(ascii_case))]
    Height,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+", |lex| lex.slice().parse::<f32>().ok())]
    Number(f32),
}

/// Parse a ratio expression into its value and driving side.
///
/// Returns `None` for malformed input and for ratios that are not positive.
pub fn parse_ratio(input: &str) -> Option<(f32, RatioSide)> {
    let tokens = RatioToken::lexer(input)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    let (side, rest) = match tokens.as_slice() {
        [RatioToken::Width, RatioToken::Comma, rest @ ..] => (RatioSide::Horizontal, rest),
        [RatioToken::Height, RatioToken::Comma, rest @ ..] => (RatioSide::Vertical, rest),
        rest => (RatioSide::Unknown, rest),
    };

    let value = match rest {
        [RatioToken::Number(value)] => *value,
        [RatioToken::Number(nominator), RatioToken::Colon, RatioToken::Number(denominator)] => {
            if *nominator <= 0.0 || *denominator <= 0.0 {
                return None;
            }
            if side == RatioSide::Vertical {
                denominator / nominator
            } else {
                nominator / denominator
            }
        }
        _ => return None,
    };

    if value > 0.0 && value.is_finite() {
        Some((value, side))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_plain_number() {
        let (value, side) = parse_ratio("1.5").unwrap();
        assert!(close(value, 1.5));
        assert_eq!(side, RatioSide::Unknown);
    }

    #[test]
    fn test_fraction() {
        let (value, side) = parse_ratio("16:9").unwrap();
        assert!(close(value, 16.0 / 9.0));
        assert_eq!(side, RatioSide::Unknown);
    }

    #[test]
    fn test_side_prefix() {
        let (value, side) = parse_ratio("w,2:1").unwrap();
        assert!(close(value, 2.0));
        assert_eq!(side, RatioSide::Horizontal);

        let (value, side) = parse_ratio("H, 2:1").unwrap();
        assert!(close(value, 0.5));
        assert_eq!(side, RatioSide::Vertical);
    }

    #[test]
    fn test_plain_number_not_inverted_for_height() {
        let (value, side) = parse_ratio("H,2").unwrap();
        assert!(close(value, 2.0));
        assert_eq!(side, RatioSide::Vertical);
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(parse_ratio(""), None);
        assert_eq!(parse_ratio("abc"), None);
        assert_eq!(parse_ratio("16:"), None);
        assert_eq!(parse_ratio("X,1:2"), None);
        assert_eq!(parse_ratio("-1"), None);
    }

    #[test]
    fn test_non_positive_ratio() {
        assert_eq!(parse_ratio("0"), None);
        assert_eq!(parse_ratio("0:5"), None);
        assert_eq!(parse_ratio("5:0"), None);
    }
}

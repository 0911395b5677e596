use rust_decimal::{Decimal, RoundingStrategy};

const NBSP: char = '\u{a0}';

/// Format an amount the way `es-ES` formats EUR: `1234,50 €`, `12.345,00 €`.
///
/// Spanish grouping only kicks in from five integer digits, so four-digit
/// amounts are printed without a thousands separator.
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let mut abs = rounded.abs();
    abs.rescale(2);
    let digits = abs.to_string();

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let grouped = if int_part.len() >= 5 {
        group_thousands(int_part)
    } else {
        int_part.to_string()
    };

    format!("{}{},{}{}€", if negative { "-" } else { "" }, grouped, frac_part, NBSP)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

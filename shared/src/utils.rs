// Brazilian display formatting for figures produced by the engine.
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Formats a currency amount as `R$ 1.234,56`. Negative amounts keep the
/// sign after the symbol (`R$ -20,00`).
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {}", format_decimal(value, 2))
}

/// Formats a quantity with no decimals and `.` thousands separators.
pub fn format_quantity(value: Decimal) -> String {
    format_decimal(value, 0)
}

pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Rounds to `decimals` places and renders with `.` thousands separators and
/// a `,` decimal separator.
pub fn format_decimal(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp(decimals);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.*}", decimals as usize, rounded.abs());

    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

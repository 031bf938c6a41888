/// Group an integer with commas: `650900000` -> `650,900,000`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Dong have no minor unit, amounts are rounded to the nearest whole dong.
pub fn format_vnd(amount: f64) -> String {
    let rounded = if amount.is_finite() { amount.round() as i64 } else { 0 };
    format!("₫{}", group_thousands(rounded))
}

pub fn format_rating(rating: f64) -> String {
    format!("{:.1}", rating)
}

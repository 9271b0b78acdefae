/// Groups the digits of an unsigned integer string in threes with commas.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Formats an amount as whole rupiah, e.g. `Rp 1,234,567` or `Rp -12,000`.
pub fn format_rupiah(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let grouped = group_thousands(&rounded);

    if value < 0.0 && rounded != "0" {
        format!("Rp -{}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Formats a labelled figure the way it appears in the summary document.
pub fn format_figure(label: &str, value: f64) -> String {
    format!("{}: {}", label, format_rupiah(value))
}

/// Format a score with thousands separators (e.g. `1,234,500`)
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Compose the human-readable report for a finished game
pub fn format_status(final_score: u64, is_new_high_score: bool, machine_name: &str) -> String {
    let status = format!(
        "Score of {} posted to {}",
        format_score(final_score),
        machine_name
    );
    if is_new_high_score {
        format!("HIGH {}", status)
    } else {
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1000), "1,000");
        assert_eq!(format_score(1_234_500), "1,234,500");
        assert_eq!(format_score(12_345_678_901), "12,345,678,901");
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status(1_234_500, false, "Twilight Zone"),
            "Score of 1,234,500 posted to Twilight Zone"
        );
    }

    #[test]
    fn test_format_status_high_score() {
        assert_eq!(
            format_status(98_000_000, true, "Twilight Zone"),
            "HIGH Score of 98,000,000 posted to Twilight Zone"
        );
    }
}

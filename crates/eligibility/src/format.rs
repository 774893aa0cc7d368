//! Display formatting for amounts and durations

/// Rupee amount with Indian digit grouping ("₹4,50,000")
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("₹{},{}", groups.join(","), last3)
}

/// "5 years", "1 year", "6 months", "1.5 years"
pub fn format_years(years: f32) -> String {
    if years < 1.0 {
        let months = (years * 12.0).round() as u32;
        return if months == 1 {
            "1 month".to_string()
        } else {
            format!("{} months", months)
        };
    }
    if years.fract() == 0.0 {
        let whole = years as u32;
        if whole == 1 {
            "1 year".to_string()
        } else {
            format!("{} years", whole)
        }
    } else {
        format!("{:.1} years", years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(750), "₹750");
        assert_eq!(format_rupees(45_000), "₹45,000");
        assert_eq!(format_rupees(450_000), "₹4,50,000");
        assert_eq!(format_rupees(10_000_000), "₹1,00,00,000");
    }

    #[test]
    fn test_format_years() {
        assert_eq!(format_years(5.0), "5 years");
        assert_eq!(format_years(1.0), "1 year");
        assert_eq!(format_years(0.5), "6 months");
        assert_eq!(format_years(1.5), "1.5 years");
    }
}

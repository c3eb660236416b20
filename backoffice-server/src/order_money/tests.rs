use super::*;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn test_round_money_half_up() {
    assert_eq!(round_money(d("1.005")), d("1.01"));
    assert_eq!(round_money(d("1.004")), d("1.00"));
    assert_eq!(round_money(d("2.675")), d("2.68"));
    assert_eq!(round_money(d("-1.005")), d("-1.01"));
}

#[test]
fn test_cents_conversion() {
    assert_eq!(to_cents(d("19.99")), Some(1999));
    assert_eq!(to_cents(d("19.995")), Some(2000));
    assert_eq!(to_cents(d("7")), Some(700));
    assert_eq!(from_cents(5997), d("59.97"));
    assert_eq!(from_cents(0).to_string(), "0.00");
    assert_eq!(from_cents(5400).to_string(), "54.00");
}

#[test]
fn test_line_total_rounding() {
    // 19.99 * 3 = 59.97 exactly
    assert_eq!(line_total(d("19.99"), 3), d("59.97"));
    // 0.333 * 3 = 0.999 -> 1.00
    assert_eq!(line_total(d("0.333"), 3), d("1.00"));
    assert_eq!(line_total(d("25.00"), 2), d("50.00"));
}

#[test]
fn test_subtotal_of_nothing_is_zero() {
    assert_eq!(subtotal(std::iter::empty()), Decimal::ZERO);
    assert_eq!(OrderTotals::from_line_totals(Vec::new(), d("8")), OrderTotals::ZERO);
}

#[test]
fn test_subtotal_rounds_only_at_the_end() {
    // Line totals are already 2dp; the sum is exact
    let lines = [d("59.97"), d("0.01"), d("10.10")];
    assert_eq!(subtotal(lines), d("70.08"));
}

#[test]
fn test_tax_amount() {
    assert_eq!(tax_amount(d("50.00"), d("8")), d("4.00"));
    assert_eq!(tax_amount(d("75.00"), d("8")), d("6.00"));
    // 10.05 * 8.25% = 0.829125 -> 0.83
    assert_eq!(tax_amount(d("10.05"), d("8.25")), d("0.83"));
    // 0.10 * 5% = 0.005 -> 0.01 (half-up)
    assert_eq!(tax_amount(d("0.10"), d("5")), d("0.01"));
    assert_eq!(tax_amount(d("123.45"), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn test_levy_is_consistent() {
    let totals = OrderTotals::levy(d("75.00"), d("8"));
    assert_eq!(totals.subtotal, d("75.00"));
    assert_eq!(totals.tax_amount, d("6.00"));
    assert_eq!(totals.total_amount, d("81.00"));
    assert!(totals.is_consistent());
}

#[test]
fn test_levy_is_idempotent() {
    let first = OrderTotals::levy(d("33.33"), d("7.5"));
    let second = OrderTotals::levy(first.subtotal, d("7.5"));
    assert_eq!(first, second);
}

#[test]
fn test_parse_rate() {
    assert_eq!(parse_rate_strict("8").unwrap(), d("8"));
    assert_eq!(parse_rate_strict(" 8.25 ").unwrap(), d("8.25"));
    assert_eq!(parse_rate_strict("10%").unwrap(), d("10"));
    assert!(parse_rate_strict("abc").is_err());
    assert!(parse_rate_strict("-5").is_err());
    assert!(parse_rate_strict("").is_err());
}

#[test]
fn test_parse_rate_lenient_defaults_to_zero() {
    assert_eq!(parse_rate_lenient(None), Decimal::ZERO);
    assert_eq!(parse_rate_lenient(Some("abc")), Decimal::ZERO);
    assert_eq!(parse_rate_lenient(Some("-1")), Decimal::ZERO);
    assert_eq!(parse_rate_lenient(Some("5")), d("5"));
}

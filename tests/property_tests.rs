//! Property-based tests for the value normalizer and period arithmetic.

use proptest::prelude::*;
use rental_bi::tier::{classify, Tier};
use rental_bi::util::{normalize_count, normalize_currency};
use rental_bi::Period;

fn period_strategy() -> impl Strategy<Value = Period> {
    (1900i32..2200, 1u32..=12).prop_map(|(y, m)| Period::new(y, m).unwrap())
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn brl_strings_parse_to_their_value(reais in 0u64..100_000_000, cents in 0u8..100) {
        let s = format!("R$ {},{:02}", group_thousands(reais), cents);
        let expected: f64 = format!("{}.{:02}", reais, cents).parse().unwrap();
        prop_assert_eq!(normalize_currency(&s), expected);
    }

    #[test]
    fn currency_never_fails(s in "\\PC*") {
        let v = normalize_currency(&s);
        prop_assert!(v.is_finite());
    }

    #[test]
    fn counts_never_fail(s in "\\PC*") {
        let _ = normalize_count(&s);
    }

    #[test]
    fn shift_round_trips(p in period_strategy(), k in -240i32..240) {
        prop_assert_eq!(p.add(1).add(-1), p);
        prop_assert_eq!(p.add(k).add(-k), p);
    }

    #[test]
    fn label_round_trips(p in period_strategy()) {
        prop_assert_eq!(Period::resolve(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn shifting_forward_orders_later(p in period_strategy(), k in 1i32..240) {
        prop_assert!(p.add(k) > p);
        prop_assert!(p.add(-k) < p);
    }

    #[test]
    fn month_lengths_are_calendar_lengths(p in period_strategy()) {
        let days = p.days_in_month();
        prop_assert!((28..=31).contains(&days));
    }

    #[test]
    fn tiers_are_monotonic(a in 0.0f64..3.0, b in 0.0f64..3.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let level = |t: Tier| t.level().unwrap();
        prop_assert!(level(classify(lo)) <= level(classify(hi)));
    }
}

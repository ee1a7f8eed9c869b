use core::cmp::Ordering;
use serde_json::Value;

/// Floating point type used for every numeric channel.
pub type Real = f64;

/// Read a value as a number, treating anything unusable as zero.
///
/// Numbers pass through, numeric strings are parsed, booleans become 0/1.
/// Missing, null, non-numeric text and non-finite results all yield `0.0`.
pub fn lenient_f64(value: Option<&Value>) -> Real {
    let v = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<Real>().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if v.is_finite() { v } else { 0.0 }
}

/// A lenient count: rounded, negatives and junk become 0.
pub fn lenient_u32(value: Option<&Value>) -> u32 {
    let v = lenient_f64(value);
    if v <= 0.0 { 0 } else { v.round().min(u32::MAX as Real) as u32 }
}

/// Like [`lenient_f64`] but returns `None` when the value is not numeric at all.
pub fn parse_f64(value: &Value) -> Option<Real> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<Real>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Total order over cell values used when sorting rows by a column.
///
/// Missing/null sort first, then numbers (numeric strings included) in
/// ascending order, then remaining text lexicographically.
pub fn value_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(v) if parse_f64(v).is_some() => 1,
            _ => 2,
        }
    }

    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Some(x), Some(y)) if ra == 1 => {
            let (fx, fy) = (parse_f64(x).unwrap_or(0.0), parse_f64(y).unwrap_or(0.0));
            fx.partial_cmp(&fy).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => display(x).cmp(&display(y)),
        _ => Ordering::Equal,
    }
}

/// Plain text rendering of a cell: strings without quotes, everything else as JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn counts_round_and_clamp() {
        assert_eq!(lenient_u32(Some(&json!("4.6"))), 5);
        assert_eq!(lenient_u32(Some(&json!(-3))), 0);
        assert_eq!(lenient_u32(Some(&json!("folds"))), 0);
        assert_eq!(lenient_u32(None), 0);
    }

    #[test]
    fn lenient_defaults_to_zero() {
        assert_eq!(lenient_f64(Some(&json!(2.5))), 2.5);
        assert_eq!(lenient_f64(Some(&json!(" 4 "))), 4.0);
        assert_eq!(lenient_f64(Some(&json!("abc"))), 0.0);
        assert_eq!(lenient_f64(Some(&Value::Null)), 0.0);
        assert_eq!(lenient_f64(None), 0.0);
        assert_eq!(lenient_f64(Some(&json!([1]))), 0.0);
    }

    #[test]
    fn value_cmp_orders_missing_then_numbers_then_text() {
        let mut values = vec![
            Some(json!("b")),
            Some(json!(3)),
            None,
            Some(json!("10")),
            Some(json!("a")),
            Some(json!(-1.5)),
        ];
        values.sort_by(|a, b| value_cmp(a.as_ref(), b.as_ref()));
        assert_eq!(
            values,
            vec![
                None,
                Some(json!(-1.5)),
                Some(json!(3)),
                Some(json!("10")),
                Some(json!("a")),
                Some(json!("b")),
            ]
        );
    }

    fn cell() -> impl Strategy<Value = Option<Value>> {
        prop_oneof![
            Just(None),
            Just(Some(Value::Null)),
            (-1e6f64..1e6).prop_map(|v| Some(json!(v))),
            (-1000i64..1000).prop_map(|v| Some(json!(v.to_string()))),
            "[a-z]{0,4}".prop_map(|s| Some(json!(s))),
        ]
    }

    proptest! {
        #[test]
        fn value_cmp_is_a_consistent_order(a in cell(), b in cell(), c in cell()) {
            let (a, b, c) = (a.as_ref(), b.as_ref(), c.as_ref());
            prop_assert_eq!(value_cmp(a, b), value_cmp(b, a).reverse());
            if value_cmp(a, b) != Ordering::Greater && value_cmp(b, c) != Ordering::Greater {
                prop_assert_ne!(value_cmp(a, c), Ordering::Greater);
            }
        }

        #[test]
        fn lenient_u32_rounds_the_lenient_reading(v in -1e6f64..1e6) {
            let value = json!(v);
            let expected = if v <= 0.0 { 0 } else { v.round() as u32 };
            prop_assert_eq!(lenient_u32(Some(&value)), expected);
        }
    }
}

//! Dummy-column expansion of categorical columns.

use std::collections::BTreeSet;

use cmv_core::{ComputedData, display};
use cmv_views::RequestData;
use serde_json::Value;

/// Replace each encoded column with one 0/1 column per category.
///
/// Untouched columns keep their order and come first. Dummy columns are
/// named `<column>_<category>` with categories in sorted display order;
/// `drop_first` omits the first category of every encoded column.
pub fn encode(data: &RequestData, encoded: &[String], drop_first: bool) -> ComputedData {
    let mut columns: Vec<String> = data
        .names()
        .filter(|name| !encoded.iter().any(|e| e == name))
        .map(str::to_string)
        .collect();
    let mut rows = data.rows();
    for row in &mut rows {
        row.retain(|name, _| !encoded.iter().any(|e| e == name));
    }

    for name in encoded {
        let Some(values) = data.get(name) else {
            continue;
        };
        let categories: BTreeSet<String> = values.iter().map(display).collect();
        let skip = usize::from(drop_first);
        for category in categories.iter().skip(skip) {
            let dummy = format!("{name}_{category}");
            for (row, value) in rows.iter_mut().zip(values) {
                let hit = display(value) == *category;
                row.insert(dummy.clone(), Value::from(u8::from(hit)));
            }
            columns.push(dummy);
        }
    }

    let mut out = ComputedData::new();
    out.insert(
        "columns",
        Value::Array(columns.into_iter().map(Value::String).collect()),
    );
    out.insert("data", Value::Array(rows.into_iter().map(Value::Object).collect()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> RequestData {
        let mut data = RequestData::new();
        data.insert("id", vec![json!(1), json!(2), json!(3)]);
        data.insert("metal", vec![json!("Pt"), json!("Au"), json!("Pt")]);
        data
    }

    #[test]
    fn expands_categories_in_sorted_order() {
        let out = encode(&data(), &["metal".into()], false);
        assert_eq!(out.get("columns"), Some(&json!(["id", "metal_Au", "metal_Pt"])));
        assert_eq!(
            out.get("data").unwrap()[0],
            json!({"id": 1, "metal_Au": 0, "metal_Pt": 1})
        );
    }

    #[test]
    fn drop_first_removes_a_category() {
        let out = encode(&data(), &["metal".into()], true);
        assert_eq!(out.get("columns"), Some(&json!(["id", "metal_Pt"])));
        assert_eq!(out.get("data").unwrap()[1], json!({"id": 2, "metal_Pt": 0}));
    }

    #[test]
    fn unknown_encoded_column_is_ignored() {
        let out = encode(&data(), &["missing".into()], false);
        assert_eq!(out.get("columns"), Some(&json!(["id", "metal"])));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::format;

// Finite numbers pass through, negatives included. Anything else is 0.0.
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };

    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

pub fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(number_or_zero(value.as_ref()))
}

pub fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(other) => Some(number_or_zero(Some(&other))),
    })
}

pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let n = number_or_zero(value.as_ref());
    Ok(if n <= 0.0 { 0 } else { n.min(u32::MAX as f64) as u32 })
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}

pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        other => number_or_zero(other.as_ref()) != 0.0,
    })
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => format::parse_date(&s),
        _ => None,
    })
}

pub fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    let mut parsed = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(value) => parsed.push(value),
            Err(err) => tracing::debug!(error = %err, "dropping malformed list element"),
        }
    }
    Ok(parsed)
}

pub fn deserialize_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value) => serde_json::from_value(value).unwrap_or_default(),
        None => T::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(number_or_zero(Some(&json!(42))), 42.0);
        assert_eq!(number_or_zero(Some(&json!(-5))), -5.0);
        assert_eq!(number_or_zero(Some(&json!(12.5))), 12.5);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(number_or_zero(Some(&json!("18"))), 18.0);
        assert_eq!(number_or_zero(Some(&json!("  7.5 "))), 7.5);
    }

    #[test]
    fn malformed_values_degrade_to_zero() {
        assert_eq!(number_or_zero(None), 0.0);
        assert_eq!(number_or_zero(Some(&Value::Null)), 0.0);
        assert_eq!(number_or_zero(Some(&json!(""))), 0.0);
        assert_eq!(number_or_zero(Some(&json!("abc"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!("NaN"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!([1, 2]))), 0.0);
        assert_eq!(number_or_zero(Some(&json!({"v": 1}))), 0.0);
        assert_eq!(number_or_zero(Some(&json!(false))), 0.0);
        assert_eq!(number_or_zero(Some(&json!(true))), 1.0);
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "deserialize_list")]
        values: Vec<u32>,
        #[serde(default, deserialize_with = "deserialize_count")]
        count: u32,
    }

    #[test]
    fn lists_drop_bad_elements_and_counts_floor_at_zero() {
        let sample: Sample =
            serde_json::from_value(json!({"values": [1, "x", 3], "count": -4})).unwrap();
        assert_eq!(sample.values, vec![1, 3]);
        assert_eq!(sample.count, 0);

        let empty: Sample = serde_json::from_value(json!({"values": null})).unwrap();
        assert!(empty.values.is_empty());
    }

    #[derive(Deserialize)]
    struct Labels {
        #[serde(default, deserialize_with = "deserialize_optional_text")]
        room: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_text")]
        teacher: Option<String>,
    }

    #[test]
    fn optional_text_accepts_numbers_and_blanks_out_empties() {
        let labels: Labels =
            serde_json::from_value(json!({"room": 12, "teacher": " أ. سارة "})).unwrap();
        assert_eq!(labels.room.as_deref(), Some("12"));
        assert_eq!(labels.teacher.as_deref(), Some("أ. سارة"));

        let labels: Labels =
            serde_json::from_value(json!({"room": "", "teacher": null})).unwrap();
        assert_eq!(labels.room, None);
        assert_eq!(labels.teacher, None);

        let labels: Labels = serde_json::from_value(json!({"room": [1]})).unwrap();
        assert_eq!(labels.room, None);
    }
}

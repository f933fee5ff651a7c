use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod catalog;
pub mod floor_plan;
pub mod kitchen;
pub mod orders;
pub mod sales;
pub mod users;

/// PINs arrive either as JSON strings or as bare numbers.
pub(crate) fn pin_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `None` for missing, null or blank strings.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct PinOnly {
        #[serde(default, deserialize_with = "pin_text")]
        pin: Option<String>,
    }

    #[test]
    fn pin_accepts_numbers_and_strings() {
        let numeric: PinOnly = serde_json::from_str(r#"{"pin": 12345}"#).unwrap();
        assert_eq!(numeric.pin.as_deref(), Some("12345"));

        let text: PinOnly = serde_json::from_str(r#"{"pin": "0042"}"#).unwrap();
        assert_eq!(text.pin.as_deref(), Some("0042"));

        let missing: PinOnly = serde_json::from_str("{}").unwrap();
        assert!(missing.pin.is_none());
    }

    #[test]
    fn blank_strings_are_missing() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Bar ".into())), Some("Bar".into()));
        assert_eq!(non_blank(None), None);
    }
}

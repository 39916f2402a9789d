//! Partial-update helpers
//!
//! Update payloads distinguish an absent field (keep the stored value) from
//! an explicit `null` (clear it). Nullable fields are `Option<Option<T>>`
//! deserialized with [`nullable`].

use serde::{Deserialize, Deserializer};

/// `#[serde(default, deserialize_with = "nullable")]`: absent → `None`,
/// `null` → `Some(None)`, value → `Some(Some(v))`
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrite `target` when the patch carries a value
pub fn apply<T>(target: &mut T, patch: Option<T>) {
    if let Some(value) = patch {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "nullable")]
        vj: Option<Option<String>>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let absent: Sample = serde_json::from_str("{}").unwrap();
        let null: Sample = serde_json::from_str(r#"{"vj": null}"#).unwrap();
        let value: Sample = serde_json::from_str(r#"{"vj": "mika"}"#).unwrap();

        assert_eq!(absent.vj, None);
        assert_eq!(null.vj, Some(None));
        assert_eq!(value.vj, Some(Some("mika".to_string())));
    }

    #[test]
    fn test_apply_keeps_value_without_patch() {
        let mut vj = Some("mika".to_string());
        apply(&mut vj, None);
        assert_eq!(vj.as_deref(), Some("mika"));
        apply(&mut vj, Some(None));
        assert_eq!(vj, None);
    }
}

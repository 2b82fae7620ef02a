//! Codecs for the beacon API's JSON, which encodes every integer as a decimal string.
use serde::{Deserialize, Deserializer};
use std::{fmt::Display, str::FromStr};

pub fn u64_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    from_string(deserializer)
}

pub fn from_string<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

pub fn vec_from_strings<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|text| text.parse().map_err(serde::de::Error::custom))
        .collect()
}

pub fn nested_vec_from_strings<'de, T, D>(deserializer: D) -> Result<Vec<Vec<T>>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    Vec::<Vec<String>>::deserialize(deserializer)?
        .iter()
        .map(|inner| {
            inner
                .iter()
                .map(|text| text.parse().map_err(serde::de::Error::custom))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Syncing {
        #[serde(deserialize_with = "u64_from_string")]
        sync_distance: u64,
        #[serde(deserialize_with = "vec_from_strings")]
        validators: Vec<u64>,
        #[serde(deserialize_with = "nested_vec_from_strings")]
        aggregates: Vec<Vec<u64>>,
    }

    #[test]
    fn decode_quoted_integers_test() {
        let syncing: Syncing = serde_json::from_str(
            r#"{"sync_distance":"12","validators":["1","2","3"],"aggregates":[["1"],["2","3"]]}"#,
        )
        .unwrap();
        assert_eq!(syncing.sync_distance, 12);
        assert_eq!(syncing.validators, vec![1, 2, 3]);
        assert_eq!(syncing.aggregates, vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn reject_unquoted_and_invalid_test() {
        let unquoted = serde_json::from_str::<Syncing>(
            r#"{"sync_distance":12,"validators":[],"aggregates":[]}"#,
        );
        assert!(unquoted.is_err());

        let invalid = serde_json::from_str::<Syncing>(
            r#"{"sync_distance":"12","validators":["x"],"aggregates":[]}"#,
        );
        assert!(invalid.is_err());
    }
}

/// Current UTC timestamp (millis)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Serialize an i64 id as a JSON string; accept either a string or a number.
pub mod id_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum RawId {
        Num(i64),
        Str(String),
    }

    pub(super) fn parse<E: de::Error>(raw: RawId) -> Result<i64, E> {
        match raw {
            RawId::Num(n) => Ok(n),
            RawId::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id: {s}"))),
        }
    }

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        parse(RawId::deserialize(deserializer)?)
    }
}

/// Optional variant of [`id_string`]; `null` maps to `None`.
pub mod opt_id_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::id_string::{RawId, parse};

    pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Option::<RawId>::deserialize(deserializer)?
            .map(parse::<D::Error>)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "id_string")]
        id: i64,
        #[serde(default, with = "opt_id_string")]
        parent: Option<i64>,
    }

    #[test]
    fn test_snowflake_id_is_positive_and_safe_for_js() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let json = serde_json::to_value(Holder {
            id: 7,
            parent: Some(9),
        })
        .unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["parent"], "9");
    }

    #[test]
    fn test_ids_accept_numbers_strings_and_null() {
        let a: Holder = serde_json::from_str(r#"{"id":"7","parent":null}"#).unwrap();
        let b: Holder = serde_json::from_str(r#"{"id":7}"#).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Holder>(r#"{"id":"x7"}"#).is_err());
    }
}

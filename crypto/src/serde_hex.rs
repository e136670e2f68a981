//! Serde adapter rendering byte vectors as `0x`-prefixed hex strings

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let stripped = raw.strip_prefix("0x").unwrap_or(&raw);
    hex::decode(stripped).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Blob {
        #[serde(with = "crate::serde_hex")]
        data: Vec<u8>,
    }

    #[test]
    fn test_hex_rendering() {
        let blob = Blob { data: vec![0xde, 0xad] };
        let json = serde_json::to_string(&blob).unwrap();
        assert_eq!(json, r#"{"data":"0xdead"}"#);
        assert_eq!(serde_json::from_str::<Blob>(&json).unwrap(), blob);
        assert_eq!(serde_json::from_str::<Blob>(r#"{"data":""}"#).unwrap().data, Vec::<u8>::new());
    }
}

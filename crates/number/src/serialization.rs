use {
    alloy_primitives::U256,
    serde::{Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::fmt,
};

/// Serializes a [`U256`] as a decimal string and deserializes it from either a
/// decimal string or a `0x` prefixed hex string.
///
/// Amounts are strings on the wire because JSON numbers lose precision past
/// 2^53 in most clients.
pub struct HexOrDecimalU256;

impl<'de> DeserializeAs<'de, U256> for HexOrDecimalU256 {
    fn deserialize_as<D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer)
    }
}

impl SerializeAs<U256> for HexOrDecimalU256 {
    fn serialize_as<S>(source: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(source, serializer)
    }
}

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl de::Visitor<'_> for Visitor {
        type Value = U256;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(
                formatter,
                "a u256 encoded either as 0x hex prefixed or decimal encoded string"
            )
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix("0x") {
                U256::from_str_radix(hex, 16)
                    .map_err(|err| E::custom(format!("failed to decode {s:?} as hex u256: {err}")))
            } else {
                U256::from_str_radix(s, 10).map_err(|err| {
                    E::custom(format!("failed to decode {s:?} as decimal u256: {err}"))
                })
            }
        }
    }

    deserializer.deserialize_str(Visitor)
}

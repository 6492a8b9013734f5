use crate::bn254::{BN254Gt, BN254Scalar, BN254G1, BN254G2};
use crate::prelude::*;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::de::{Error, SeqAccess, Visitor};

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Collects an encoding given as raw bytes, a byte sequence, or a base64
/// string.
pub struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("bytes or a base64 string")
    }

    fn visit_bytes<E: Error>(self, v: &[u8]) -> core::result::Result<Vec<u8>, E> {
        Ok(v.to_vec())
    }

    fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> core::result::Result<Vec<u8>, E> {
        Ok(v)
    }

    fn visit_str<E: Error>(self, v: &str) -> core::result::Result<Vec<u8>, E> {
        BASE64.decode(v).map_err(E::custom)
    }

    fn visit_seq<V: SeqAccess<'de>>(self, mut seq: V) -> core::result::Result<Vec<u8>, V::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(b) = seq.next_element()? {
            bytes.push(b);
        }
        Ok(bytes)
    }
}

// Human-readable formats get base64, binary ones the raw encoding.
macro_rules! serde_via_bytes {
    ($($t:ident),*) => {$(
        impl serde::Serialize for $t {
            fn serialize<S: serde::Serializer>(&self, s: S) -> core::result::Result<S::Ok, S::Error> {
                let bytes = self.to_bytes();
                if s.is_human_readable() {
                    s.serialize_str(&BASE64.encode(bytes))
                } else {
                    s.serialize_bytes(&bytes)
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $t {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> core::result::Result<Self, D::Error> {
                let bytes = if d.is_human_readable() {
                    d.deserialize_str(BytesVisitor)?
                } else {
                    d.deserialize_bytes(BytesVisitor)?
                };
                $t::from_bytes(&bytes).map_err(D::Error::custom)
            }
        }
    )*};
}

serde_via_bytes!(BN254Scalar, BN254G1, BN254G2, BN254Gt);

#[cfg(test)]
mod test {
    use crate::bn254::{BN254Scalar, BN254G1};
    use crate::prelude::*;

    #[test]
    fn json_uses_base64() {
        let v = BN254Scalar::from(255u32);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"_wAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=\"");
        let back: BN254Scalar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);

        // padding is optional when reading
        let unpadded: BN254Scalar = serde_json::from_str(&json.replace('=', "")).unwrap();
        assert_eq!(unpadded, v);
    }

    #[test]
    fn bincode_uses_raw_bytes() {
        let p = BN254G1::generator().double();
        let bytes = bincode::serialize(&p).unwrap();
        // u64 length prefix and the compressed point
        assert_eq!(bytes.len(), 8 + BN254G1::ENCODED_LEN);
        assert_eq!(bincode::deserialize::<BN254G1>(&bytes).unwrap(), p);
    }

    #[test]
    fn invalid_encodings_fail_to_deserialize() {
        let modulus = BN254Scalar::modulus().to_bytes_le();
        let bytes = bincode::serialize(&modulus).unwrap();
        assert!(bincode::deserialize::<BN254Scalar>(&bytes).is_err());
        assert!(serde_json::from_str::<BN254Scalar>("\"not base64!\"").is_err());
        assert!(serde_json::from_str::<BN254Scalar>("\"AAAA\"").is_err());
    }
}

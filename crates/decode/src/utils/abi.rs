use alloy_dyn_abi::{DynSolType, DynSolValue};
use tracing::trace;
use txlens_common::utils::hex::ToLowerHex;

use crate::error::Error;

/// Attempt to decode the given bytes as a tuple of the given types.
pub(crate) fn try_decode(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>, Error> {
    trace!("try_decode: types={:?}, data.len()={}", types, data.len());

    match DynSolType::Tuple(types.to_vec()).abi_decode_sequence(data) {
        Ok(DynSolValue::Tuple(values)) if values.len() == types.len() => Ok(values),
        Ok(other) => Err(Error::DecodeError(format!("unexpected decoded shape: {other:?}"))),
        Err(e) => Err(Error::DecodeError(e.to_string())),
    }
}

/// Attempt to decode a single 32-byte topic as the given type.
pub(crate) fn try_decode_word(ty: &DynSolType, word: &[u8]) -> Result<DynSolValue, Error> {
    ty.abi_decode(word).map_err(|e| Error::DecodeError(e.to_string()))
}

/// Renders decoded values as strings: integers in base 10, addresses checksummed, byte
/// strings as lowercase hex, and sequences as `[a, b]`.
pub(crate) trait Render {
    fn render(&self) -> String;
}

impl Render for DynSolValue {
    fn render(&self) -> String {
        match self {
            DynSolValue::Bool(val) => val.to_string(),
            DynSolValue::Int(val, _) => val.to_string(),
            DynSolValue::Uint(val, _) => val.to_string(),
            DynSolValue::Address(val) => val.to_checksum(None),
            DynSolValue::FixedBytes(val, size) => {
                alloy::primitives::Bytes::copy_from_slice(&val[..*size]).to_lower_hex()
            }
            DynSolValue::Bytes(val) => alloy::primitives::Bytes::copy_from_slice(val).to_lower_hex(),
            DynSolValue::String(val) => val.clone(),
            DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) | DynSolValue::Tuple(vals) => {
                format!("[{}]", vals.iter().map(Render::render).collect::<Vec<_>>().join(", "))
            }
            other => format!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, B256, I256, U256};

    use super::*;

    #[test]
    fn test_render_scalars() {
        assert_eq!(DynSolValue::Uint(U256::from(100000), 256).render(), "100000");
        assert_eq!(DynSolValue::Int(I256::try_from(-5).expect("fits"), 256).render(), "-5");
        assert_eq!(DynSolValue::Bool(true).render(), "true");
        assert_eq!(DynSolValue::String("hello".to_string()).render(), "hello");
        assert_eq!(DynSolValue::Bytes(vec![0xca, 0xfe]).render(), "0xcafe");
        assert_eq!(DynSolValue::FixedBytes(B256::repeat_byte(0x11), 2).render(), "0x1111");
        assert_eq!(
            DynSolValue::Address(address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")).render(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_render_nested_sequences() {
        let value = DynSolValue::Array(vec![
            DynSolValue::Uint(U256::from(1), 256),
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(2), 256),
                DynSolValue::Bool(false),
            ]),
        ]);
        assert_eq!(value.render(), "[1, [2, false]]");
        assert_eq!(DynSolValue::Array(vec![]).render(), "[]");
    }

    #[test]
    fn test_try_decode_rejects_short_data() {
        let types = vec![DynSolType::Address, DynSolType::Uint(256)];
        assert!(try_decode(&types, &[0u8; 32]).is_err());
        assert_eq!(try_decode(&types, &[0u8; 64]).expect("decodes").len(), 2);
    }
}

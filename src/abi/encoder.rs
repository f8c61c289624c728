//! ABI encoder
//!
//! Standard head/tail tuple encoding: static values inline in the head,
//! dynamic values as offsets into the tail. Offsets are relative to the
//! start of the enclosing tuple encoding.

use super::types::*;

pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode a sequence of values as a top-level tuple.
    pub fn encode(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        if values.len() != types.len() {
            return Err(AbiError::Encoding(format!(
                "value count {} does not match type count {}",
                values.len(),
                types.len()
            )));
        }
        Self::encode_tuple(values, types)
    }

    /// Encode a single value according to its type.
    pub fn encode_value(value: &AbiValue, abi_type: &AbiType) -> Result<Vec<u8>, AbiError> {
        match (value, abi_type) {
            (AbiValue::Uint(u), AbiType::Uint256) => Ok(u.to_be_bytes().to_vec()),

            (AbiValue::Address(addr), AbiType::Address) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(addr);
                Ok(word.to_vec())
            }

            (AbiValue::Bool(b), AbiType::Bool) => {
                let mut word = [0u8; 32];
                word[31] = *b as u8;
                Ok(word.to_vec())
            }

            (AbiValue::Bytes(bytes), AbiType::Bytes) => Ok(Self::encode_dynamic_bytes(bytes)),

            (AbiValue::String(s), AbiType::String) => Ok(Self::encode_dynamic_bytes(s.as_bytes())),

            (AbiValue::Array(values), AbiType::Array(inner)) => {
                let mut out = Vec::new();
                out.extend_from_slice(&U256::from(values.len() as u64).to_be_bytes());
                let types: Vec<AbiType> = vec![(**inner).clone(); values.len()];
                out.extend_from_slice(&Self::encode_tuple(values, &types)?);
                Ok(out)
            }

            (AbiValue::Tuple(values), AbiType::Tuple(types)) => {
                if values.len() != types.len() {
                    return Err(AbiError::TypeMismatch {
                        expected: format!("tuple of {} elements", types.len()),
                        got: format!("tuple of {} elements", values.len()),
                    });
                }
                Self::encode_tuple(values, types)
            }

            _ => Err(AbiError::TypeMismatch {
                expected: abi_type.canonical_type(),
                got: value.value_type().canonical_type(),
            }),
        }
    }

    fn encode_tuple(values: &[AbiValue], types: &[AbiType]) -> Result<Vec<u8>, AbiError> {
        let head_size: usize = types.iter().map(|t| t.head_size()).sum();

        let mut head = Vec::with_capacity(head_size);
        let mut tail = Vec::new();

        for (value, abi_type) in values.iter().zip(types.iter()) {
            if abi_type.is_dynamic() {
                let offset = head_size + tail.len();
                head.extend_from_slice(&U256::from(offset as u64).to_be_bytes());
                tail.extend_from_slice(&Self::encode_value(value, abi_type)?);
            } else {
                head.extend_from_slice(&Self::encode_value(value, abi_type)?);
            }
        }

        head.extend_from_slice(&tail);
        Ok(head)
    }

    /// Length word followed by the data padded to a 32-byte boundary.
    fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
        let padded_len = bytes.len().div_ceil(32) * 32;
        let mut out = Vec::with_capacity(32 + padded_len);
        out.extend_from_slice(&U256::from(bytes.len() as u64).to_be_bytes());
        out.extend_from_slice(bytes);
        out.resize(32 + padded_len, 0);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uint256() {
        let encoded = AbiEncoder::encode_value(&AbiValue::uint(256), &AbiType::Uint256).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[30], 1);
        assert_eq!(encoded[31], 0);
    }

    #[test]
    fn test_encode_address() {
        let mut addr = [0u8; 20];
        addr[0] = 0xde;
        addr[19] = 0xad;
        let encoded = AbiEncoder::encode_value(&AbiValue::Address(addr), &AbiType::Address).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[12], 0xde);
        assert_eq!(encoded[31], 0xad);
    }

    #[test]
    fn test_encode_dynamic_bytes() {
        let encoded =
            AbiEncoder::encode_value(&AbiValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]), &AbiType::Bytes)
                .unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 4);
        assert_eq!(&encoded[32..36], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_encode_empty_array_is_explicit() {
        let encoded = AbiEncoder::encode_value(
            &AbiValue::Array(vec![]),
            &AbiType::Array(Box::new(AbiType::String)),
        )
        .unwrap();
        // just the zero length word
        assert_eq!(encoded, U256::ZERO.to_be_bytes().to_vec());
    }

    #[test]
    fn test_encode_string_array() {
        let values = AbiValue::Array(vec![
            AbiValue::String("ab".to_string()),
            AbiValue::String("c".to_string()),
        ]);
        let encoded =
            AbiEncoder::encode_value(&values, &AbiType::Array(Box::new(AbiType::String))).unwrap();
        // length + 2 offsets + 2 * (length word + padded data)
        assert_eq!(encoded.len(), 32 + 64 + 128);
        assert_eq!(encoded[31], 2);
        // first element offset is 64, relative to the element area
        assert_eq!(encoded[63], 64);
    }

    #[test]
    fn test_encode_mixed_static_dynamic() {
        let values = vec![
            AbiValue::uint(42),
            AbiValue::String("test".to_string()),
            AbiValue::uint(100),
        ];
        let types = vec![AbiType::Uint256, AbiType::String, AbiType::Uint256];
        let encoded = AbiEncoder::encode(&values, &types).unwrap();

        assert_eq!(encoded.len(), 160);
        assert_eq!(encoded[31], 42);
        assert_eq!(encoded[63], 96); // offset to string tail
        assert_eq!(encoded[95], 100);
        assert_eq!(encoded[127], 4);
        assert_eq!(&encoded[128..132], b"test");
    }

    #[test]
    fn test_encode_type_mismatch() {
        let result = AbiEncoder::encode_value(&AbiValue::uint(1), &AbiType::String);
        assert!(matches!(result, Err(AbiError::TypeMismatch { .. })));
    }
}

//! ABI decoder
//!
//! Mirrors the encoder so test tooling and callers can recover exactly
//! the fields a layout encoded.

use super::types::*;

pub struct AbiDecoder;

impl AbiDecoder {
    /// Decode a top-level tuple into its component values.
    pub fn decode(data: &[u8], types: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
        let (value, _) = Self::decode_tuple(data, 0, types)?;
        match value {
            AbiValue::Tuple(values) => Ok(values),
            _ => Err(AbiError::Decoding("expected tuple".to_string())),
        }
    }

    /// Decode a single value at `offset`, returning it with the offset
    /// just past its head slot.
    pub fn decode_value(
        data: &[u8],
        abi_type: &AbiType,
        offset: usize,
    ) -> Result<(AbiValue, usize), AbiError> {
        Self::check_len(data, offset + 32)?;

        match abi_type {
            AbiType::Uint256 => {
                let value = U256::from_be_bytes(&data[offset..offset + 32]);
                Ok((AbiValue::Uint(value), offset + 32))
            }

            AbiType::Address => {
                if data[offset..offset + 12].iter().any(|&b| b != 0) {
                    return Err(AbiError::Decoding("dirty address padding".to_string()));
                }
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&data[offset + 12..offset + 32]);
                Ok((AbiValue::Address(addr), offset + 32))
            }

            AbiType::Bool => {
                let value = data[offset + 31] != 0;
                Ok((AbiValue::Bool(value), offset + 32))
            }

            AbiType::Bytes => Self::decode_dynamic_bytes(data, offset),

            AbiType::String => {
                let (value, next) = Self::decode_dynamic_bytes(data, offset)?;
                match value {
                    AbiValue::Bytes(bytes) => {
                        let s = String::from_utf8(bytes)
                            .map_err(|_| AbiError::Decoding("invalid utf-8 in string".to_string()))?;
                        Ok((AbiValue::String(s), next))
                    }
                    _ => Err(AbiError::Decoding("expected bytes".to_string())),
                }
            }

            AbiType::Array(inner) => {
                Self::check_len(data, offset + 32)?;
                let len = Self::read_usize(&data[offset..offset + 32])?;
                let element_types: Vec<AbiType> = vec![(**inner).clone(); len];
                let (tuple, next) = Self::decode_tuple(data, offset + 32, &element_types)?;
                match tuple {
                    AbiValue::Tuple(values) => Ok((AbiValue::Array(values), next)),
                    _ => Err(AbiError::Decoding("expected array elements".to_string())),
                }
            }

            AbiType::Tuple(types) => Self::decode_tuple(data, offset, types),
        }
    }

    fn decode_tuple(
        data: &[u8],
        base_offset: usize,
        types: &[AbiType],
    ) -> Result<(AbiValue, usize), AbiError> {
        let mut values = Vec::with_capacity(types.len());
        let mut head_offset = base_offset;

        for abi_type in types {
            if abi_type.is_dynamic() {
                Self::check_len(data, head_offset + 32)?;
                let relative = Self::read_usize(&data[head_offset..head_offset + 32])?;
                let data_offset = base_offset
                    .checked_add(relative)
                    .ok_or_else(|| AbiError::Decoding("offset overflow".to_string()))?;
                let (value, _) = Self::decode_value(data, abi_type, data_offset)?;
                values.push(value);
                head_offset += 32;
            } else {
                let (value, next) = Self::decode_value(data, abi_type, head_offset)?;
                values.push(value);
                head_offset = next;
            }
        }

        Ok((AbiValue::Tuple(values), head_offset))
    }

    fn decode_dynamic_bytes(data: &[u8], offset: usize) -> Result<(AbiValue, usize), AbiError> {
        Self::check_len(data, offset + 32)?;
        let len = Self::read_usize(&data[offset..offset + 32])?;
        Self::check_len(data, offset + 32 + len)?;
        let bytes = data[offset + 32..offset + 32 + len].to_vec();
        let padded = len.div_ceil(32) * 32;
        Ok((AbiValue::Bytes(bytes), offset + 32 + padded))
    }

    fn read_usize(word: &[u8]) -> Result<usize, AbiError> {
        U256::from_be_bytes(word)
            .try_to_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| AbiError::Decoding("length word out of range".to_string()))
    }

    fn check_len(data: &[u8], needed: usize) -> Result<(), AbiError> {
        if data.len() < needed {
            Err(AbiError::Decoding(format!(
                "insufficient data: need {} bytes, have {}",
                needed,
                data.len()
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encoder::AbiEncoder;

    fn roundtrip(values: Vec<AbiValue>, types: Vec<AbiType>) {
        let encoded = AbiEncoder::encode(&values, &types).unwrap();
        let decoded = AbiDecoder::decode(&encoded, &types).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_roundtrip_scalars() {
        let mut addr = [0u8; 20];
        addr[19] = 7;
        roundtrip(
            vec![AbiValue::uint(12345), AbiValue::Address(addr), AbiValue::Bool(true)],
            vec![AbiType::Uint256, AbiType::Address, AbiType::Bool],
        );
    }

    #[test]
    fn test_roundtrip_nested_string_arrays() {
        let values = vec![AbiValue::Array(vec![
            AbiValue::Array(vec![AbiValue::String("k1".into()), AbiValue::String("k2".into())]),
            AbiValue::Array(vec![]),
        ])];
        let types = vec![AbiType::Array(Box::new(AbiType::Array(Box::new(
            AbiType::String,
        ))))];
        roundtrip(values, types);
    }

    #[test]
    fn test_roundtrip_bytes() {
        roundtrip(
            vec![AbiValue::Bytes(vec![1u8; 65]), AbiValue::Bytes(vec![])],
            vec![AbiType::Bytes, AbiType::Bytes],
        );
    }

    #[test]
    fn test_decode_truncated_fails() {
        let encoded = AbiEncoder::encode(
            &[AbiValue::String("hello".into())],
            &[AbiType::String],
        )
        .unwrap();
        let result = AbiDecoder::decode(&encoded[..encoded.len() - 16], &[AbiType::String]);
        assert!(matches!(result, Err(AbiError::Decoding(_))));
    }

    #[test]
    fn test_decode_dirty_address_padding_fails() {
        let mut word = [0u8; 32];
        word[0] = 1;
        let result = AbiDecoder::decode(&word, &[AbiType::Address]);
        assert!(matches!(result, Err(AbiError::Decoding(_))));
    }
}

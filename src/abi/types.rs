//! ABI type and value definitions

use std::fmt;

use thiserror::Error;

/// The Solidity types the wire layouts are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Uint256,
    Address,
    Bool,
    /// Dynamic byte string
    Bytes,
    /// Dynamic UTF-8 string
    String,
    /// Dynamic array `T[]`
    Array(Box<AbiType>),
    /// Tuple (struct)
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Whether the type is encoded through an offset in the head.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::Tuple(components) => components.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Size this type occupies in the head of a tuple encoding.
    pub fn head_size(&self) -> usize {
        match self {
            AbiType::Tuple(components) if !self.is_dynamic() => {
                components.iter().map(|t| t.head_size()).sum()
            }
            _ => 32,
        }
    }

    /// Canonical type string, e.g. `string[][]`.
    pub fn canonical_type(&self) -> String {
        match self {
            AbiType::Uint256 => "uint256".to_string(),
            AbiType::Address => "address".to_string(),
            AbiType::Bool => "bool".to_string(),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::String => "string".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical_type()),
            AbiType::Tuple(components) => {
                let inner = components
                    .iter()
                    .map(|t| t.canonical_type())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({})", inner)
            }
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

/// Runtime representation of an ABI value.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiValue {
    Uint(U256),
    Address([u8; 20]),
    Bool(bool),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Uint256 value from a u64.
    pub fn uint(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }

    /// Address value from a hex string, with or without 0x prefix.
    pub fn address_from_str(s: &str) -> Result<Self, AbiError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 40 {
            return Err(AbiError::InvalidValue(format!(
                "address must be 20 bytes, got {} hex chars",
                s.len()
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| AbiError::InvalidValue(format!("invalid hex in address: {}", e)))?;
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&bytes);
        Ok(AbiValue::Address(addr))
    }

    /// The type this value encodes as. Empty arrays report a string
    /// element type; callers that need a different element type must
    /// pass the type explicitly to the encoder.
    pub fn value_type(&self) -> AbiType {
        match self {
            AbiValue::Uint(_) => AbiType::Uint256,
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::Bytes(_) => AbiType::Bytes,
            AbiValue::String(_) => AbiType::String,
            AbiValue::Array(values) => {
                let elem = values
                    .first()
                    .map(|v| v.value_type())
                    .unwrap_or(AbiType::String);
                AbiType::Array(Box::new(elem))
            }
            AbiValue::Tuple(values) => {
                AbiType::Tuple(values.iter().map(|v| v.value_type()).collect())
            }
        }
    }

    pub fn as_uint(&self) -> Option<&U256> {
        match self {
            AbiValue::Uint(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<[u8; 20]> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(values) => Some(values),
            _ => None,
        }
    }
}

/// 256-bit unsigned integer, big-endian word semantics.
///
/// Limbs are little-endian: `0[0]` is the least significant u64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256(pub [u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0, 0, 0, 0]);

    pub fn from(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    /// Big-endian bytes, at most 32; shorter inputs are left-padded.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let mut padded = [0u8; 32];
        let take = bytes.len().min(32);
        padded[32 - take..].copy_from_slice(&bytes[bytes.len() - take..]);

        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let offset = (3 - i) * 8;
            *limb = u64::from_be_bytes(padded[offset..offset + 8].try_into().unwrap());
        }
        U256(limbs)
    }

    /// 32-byte big-endian representation.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    /// Parse from a decimal string.
    pub fn from_dec(s: &str) -> Result<Self, AbiError> {
        if s.is_empty() {
            return Err(AbiError::InvalidValue("empty decimal string".to_string()));
        }
        let mut result = U256::ZERO;
        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| AbiError::InvalidValue(format!("invalid decimal digit: {}", c)))?;
            result = result
                .checked_mul_u64(10)
                .and_then(|r| r.checked_add(U256::from(digit as u64)))
                .ok_or(AbiError::Overflow)?;
        }
        Ok(result)
    }

    /// Parse from a hex string without 0x prefix.
    pub fn from_hex(s: &str) -> Result<Self, AbiError> {
        let padded = if s.len() % 2 == 1 {
            format!("0{}", s)
        } else {
            s.to_string()
        };
        let bytes = hex::decode(&padded)
            .map_err(|e| AbiError::InvalidValue(format!("invalid hex: {}", e)))?;
        if bytes.len() > 32 {
            return Err(AbiError::Overflow);
        }
        Ok(Self::from_be_bytes(&bytes))
    }

    pub fn checked_add(&self, other: U256) -> Option<U256> {
        let mut limbs = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let (sum, c1) = self.0[i].overflowing_add(other.0[i]);
            let (sum, c2) = sum.overflowing_add(carry);
            limbs[i] = sum;
            carry = (c1 as u64) + (c2 as u64);
        }
        if carry != 0 {
            None
        } else {
            Some(U256(limbs))
        }
    }

    pub fn checked_mul_u64(&self, other: u64) -> Option<U256> {
        let mut limbs = [0u64; 4];
        let mut carry = 0u128;
        for i in 0..4 {
            let product = (self.0[i] as u128) * (other as u128) + carry;
            limbs[i] = product as u64;
            carry = product >> 64;
        }
        if carry != 0 {
            None
        } else {
            Some(U256(limbs))
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }

    /// Value as u64 if it fits, None if any upper limb is set.
    pub fn try_to_u64(&self) -> Option<u64> {
        if self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0 {
            Some(self.0[0])
        } else {
            None
        }
    }

    pub fn to_dec_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        // repeated division by 10 over the limbs
        let mut limbs = self.0;
        let mut digits = Vec::new();
        while limbs != [0, 0, 0, 0] {
            let mut remainder = 0u64;
            for limb in limbs.iter_mut().rev() {
                let acc = ((remainder as u128) << 64) | (*limb as u128);
                *limb = (acc / 10) as u64;
                remainder = (acc % 10) as u64;
            }
            digits.push(b'0' + remainder as u8);
        }
        digits.reverse();
        String::from_utf8(digits).expect("digits are ascii")
    }
}

/// ABI codec errors.
#[derive(Debug, Clone, Error)]
pub enum AbiError {
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("decoding error: {0}")]
    Decoding(String),
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("numeric overflow")]
    Overflow,
}

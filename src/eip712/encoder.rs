//! EIP-712 canonical encoding
//!
//! Type-string construction and `encodeData` over JSON values guided by a
//! field table. Dependent types are appended exactly once in lexicographic
//! order, matching the receiving contract's own type-string construction.

use std::collections::{HashMap, HashSet};

use tiny_keccak::{Hasher, Keccak};

use super::types::*;
use crate::abi::U256;

/// Encode a type string for a struct type.
///
/// Format: the named type's own `TypeName(type1 name1,...)` signature in
/// declared field order, followed by every transitively referenced struct
/// type sorted by name. A type with no dependencies yields just its own
/// signature.
pub fn encode_type(
    type_name: &str,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<String, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::UnknownType(type_name.to_string()))?;

    let mut result = format_type_string(type_name, fields);

    let mut deps: Vec<_> = find_type_dependencies(type_name, types)
        .into_iter()
        .filter(|dep| dep != type_name)
        .collect();
    deps.sort();

    for dep in deps {
        if let Some(dep_fields) = types.get(&dep) {
            result.push_str(&format_type_string(&dep, dep_fields));
        }
    }

    Ok(result)
}

fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();
    format!("{}({})", type_name, field_strs.join(","))
}

/// All struct types reachable from `type_name`, including itself.
pub fn find_type_dependencies(
    type_name: &str,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> HashSet<String> {
    let mut found = HashSet::new();
    let mut to_visit = vec![type_name.to_string()];

    while let Some(current) = to_visit.pop() {
        if found.contains(&current) {
            continue;
        }
        if let Some(fields) = types.get(&current) {
            found.insert(current);
            for field in fields {
                let base = get_base_type(&field.type_name);
                if types.contains_key(base) && !found.contains(base) {
                    to_visit.push(base.to_string());
                }
            }
        }
    }

    found
}

/// Strip array suffixes: `MetadataEntry[]` -> `MetadataEntry`.
pub fn get_base_type(type_name: &str) -> &str {
    match type_name.find('[') {
        Some(pos) => &type_name[..pos],
        None => type_name,
    }
}

/// typeHash = keccak256(encodeType(typeName))
pub fn type_hash(
    type_name: &str,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<[u8; 32], Eip712Error> {
    Ok(keccak256(encode_type(type_name, types)?.as_bytes()))
}

/// Encode a value as its 32-byte-aligned `encodeData` form.
pub fn encode_value(
    type_name: &str,
    value: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<Vec<u8>, Eip712Error> {
    if type_name.contains('[') {
        return encode_array(type_name, value, types);
    }
    if type_name == "bytes" {
        return decode_hex_value(value, "bytes");
    }
    if type_name == "string" {
        let s = value.as_str().ok_or_else(|| invalid(type_name, value))?;
        return Ok(s.as_bytes().to_vec());
    }
    if types.contains_key(type_name) {
        return encode_struct(type_name, value, types);
    }
    encode_atomic(type_name, value)
}

/// typeHash || encoded fields, each reduced to one 32-byte word.
fn encode_struct(
    type_name: &str,
    value: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<Vec<u8>, Eip712Error> {
    let obj = value.as_object().ok_or_else(|| invalid(type_name, value))?;
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::UnknownType(type_name.to_string()))?;

    let mut encoded = Vec::new();
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let field_value = obj
            .get(&field.name)
            .ok_or_else(|| Eip712Error::MissingField(format!("{}.{}", type_name, field.name)))?;

        let encoded_field = encode_value(&field.type_name, field_value, types)?;

        // struct references, arrays, and dynamic types contribute their hash
        let is_struct = types.contains_key(get_base_type(&field.type_name));
        let is_dynamic = field.type_name == "bytes" || field.type_name == "string";
        if is_struct || is_dynamic || field.type_name.contains('[') {
            encoded.extend_from_slice(&keccak256(&encoded_field));
        } else {
            encoded.extend(encoded_field);
        }
    }

    Ok(encoded)
}

/// Concatenated per-element representations; the enclosing struct hashes
/// the whole blob, so an empty array reduces to keccak256 of nothing.
fn encode_array(
    type_name: &str,
    value: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<Vec<u8>, Eip712Error> {
    let arr = value.as_array().ok_or_else(|| invalid(type_name, value))?;
    let element_type = &type_name[..type_name
        .rfind('[')
        .ok_or_else(|| Eip712Error::UnknownType(type_name.to_string()))?];

    let mut encoded = Vec::new();
    for item in arr {
        let item_encoded = encode_value(element_type, item, types)?;
        let is_struct = types.contains_key(get_base_type(element_type));
        let is_dynamic = element_type == "bytes" || element_type == "string";
        if is_struct || is_dynamic || element_type.contains('[') {
            encoded.extend_from_slice(&keccak256(&item_encoded));
        } else {
            encoded.extend(item_encoded);
        }
    }

    Ok(encoded)
}

fn encode_atomic(type_name: &str, value: &serde_json::Value) -> Result<Vec<u8>, Eip712Error> {
    if type_name == "address" {
        let addr = value.as_str().ok_or_else(|| invalid(type_name, value))?;
        let bytes = parse_address(addr)?;
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&bytes);
        return Ok(word.to_vec());
    }

    if type_name == "bool" {
        let b = value.as_bool().ok_or_else(|| invalid(type_name, value))?;
        let mut word = [0u8; 32];
        word[31] = b as u8;
        return Ok(word.to_vec());
    }

    if type_name.starts_with("uint") {
        let parsed = parse_uint(value).map_err(|_| invalid(type_name, value))?;
        return Ok(parsed.to_be_bytes().to_vec());
    }

    Err(Eip712Error::UnknownType(type_name.to_string()))
}

/// Parse an Ethereum address from a hex string.
pub fn parse_address(addr: &str) -> Result<[u8; 20], Eip712Error> {
    let addr = addr.strip_prefix("0x").unwrap_or(addr);
    if addr.len() != 40 {
        return Err(Eip712Error::InvalidAddress(format!(
            "expected 40 hex chars, got {}",
            addr.len()
        )));
    }
    let bytes = hex::decode(addr)
        .map_err(|e| Eip712Error::InvalidAddress(format!("invalid hex: {}", e)))?;
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Accept a JSON number, decimal string, or 0x-hex string.
fn parse_uint(value: &serde_json::Value) -> Result<U256, Eip712Error> {
    match value {
        serde_json::Value::Number(n) => {
            let u = n
                .as_u64()
                .ok_or_else(|| invalid("uint256", value))?;
            Ok(U256::from(u))
        }
        serde_json::Value::String(s) => {
            let parsed = if let Some(hex_part) = s.strip_prefix("0x") {
                U256::from_hex(hex_part)
            } else {
                U256::from_dec(s)
            };
            parsed.map_err(|_| invalid("uint256", value))
        }
        _ => Err(invalid("uint256", value)),
    }
}

fn decode_hex_value(value: &serde_json::Value, type_name: &str) -> Result<Vec<u8>, Eip712Error> {
    let s = value.as_str().ok_or_else(|| invalid(type_name, value))?;
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| Eip712Error::Encoding(format!("invalid hex: {}", e)))
}

fn invalid(type_name: &str, value: &serde_json::Value) -> Eip712Error {
    Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}

/// Compute keccak256 hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(entries: &[(&str, &[(&str, &str)])]) -> HashMap<String, Vec<TypedDataField>> {
        entries
            .iter()
            .map(|(name, fields)| {
                (
                    name.to_string(),
                    fields.iter().map(|(n, t)| TypedDataField::new(n, t)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_encode_type_no_dependencies() {
        let types = table(&[("Delete", &[("id", "uint256")])]);
        assert_eq!(encode_type("Delete", &types).unwrap(), "Delete(uint256 id)");
    }

    #[test]
    fn test_encode_type_dependencies_sorted() {
        // dependents declared out of alphabetical order must come out sorted
        let types = table(&[
            ("Outer", &[("z", "Zeta[]"), ("a", "Alpha")]),
            ("Zeta", &[("v", "uint256")]),
            ("Alpha", &[("w", "string")]),
        ]);
        assert_eq!(
            encode_type("Outer", &types).unwrap(),
            "Outer(Zeta[] z,Alpha a)Alpha(string w)Zeta(uint256 v)"
        );
    }

    #[test]
    fn test_encode_type_dependency_appears_once() {
        // two fields of the same struct type: one trailing definition
        let types = table(&[
            ("Pair", &[("left", "Item"), ("right", "Item")]),
            ("Item", &[("id", "uint256")]),
        ]);
        assert_eq!(
            encode_type("Pair", &types).unwrap(),
            "Pair(Item left,Item right)Item(uint256 id)"
        );
    }

    #[test]
    fn test_keccak256_vector() {
        assert_eq!(
            hex::encode(keccak256(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_get_base_type() {
        assert_eq!(get_base_type("MetadataEntry[]"), "MetadataEntry");
        assert_eq!(get_base_type("uint256"), "uint256");
    }

    #[test]
    fn test_parse_uint_forms() {
        assert_eq!(parse_uint(&json!(12345)).unwrap(), U256::from(12345));
        assert_eq!(parse_uint(&json!("12345")).unwrap(), U256::from(12345));
        assert_eq!(parse_uint(&json!("0x3039")).unwrap(), U256::from(12345));
        assert!(parse_uint(&json!(-1)).is_err());
        assert!(parse_uint(&json!(true)).is_err());
    }

    #[test]
    fn test_encode_empty_struct_array_hashes_empty() {
        let types = table(&[
            ("Holder", &[("items", "Item[]")]),
            ("Item", &[("id", "uint256")]),
        ]);
        let encoded = encode_value("Holder", &json!({"items": []}), &types).unwrap();
        // typehash word then keccak256 of the empty concatenation
        assert_eq!(
            hex::encode(&encoded[32..]),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_missing_field_error() {
        let types = table(&[("Delete", &[("id", "uint256")])]);
        let result = encode_value("Delete", &json!({}), &types);
        assert!(matches!(result, Err(Eip712Error::MissingField(_))));
    }
}

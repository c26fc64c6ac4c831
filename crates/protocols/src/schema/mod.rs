//! Contract schemas.
//!
//! A deployed module embeds a description of every entrypoint's parameter
//! and return layout. Parsing and applying it is done by
//! `concordium-contracts-common`; this module pins the version a schema is
//! read at and maps the crate's failures into the per-stage error types.
//! Values cross the boundary as the crate's schema JSON.

use crate::error::{DecodingError, EncodingError, SchemaParseError};
use concordium_contracts_common::Cursor;
use serde_json::Value;
use std::fmt;

pub use concordium_contracts_common::schema::{Fields, SizeLength, Type, VersionedModuleSchema};

/// Longest array of zero-sized elements accepted when decoding.
pub const MAX_ZERO_SIZED_ARRAY: u32 = u16::MAX as u32;

/// Module schema format version.
///
/// Always chosen by the caller; never inferred from the bytes. A blob that
/// declares another version is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaVersion {
    /// Wasm V0 modules; parameter types only.
    V0,
    /// Parameter and return types per function.
    V1,
    /// Adds error types per function.
    V2,
    /// Adds event types per contract.
    #[default]
    V3,
}

impl SchemaVersion {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// Version a parsed schema was read as.
    pub fn of(schema: &VersionedModuleSchema) -> Self {
        match schema {
            VersionedModuleSchema::V0(_) => Self::V0,
            VersionedModuleSchema::V1(_) => Self::V1,
            VersionedModuleSchema::V2(_) => Self::V2,
            VersionedModuleSchema::V3(_) => Self::V3,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.as_u8())
    }
}

/// Schema bytes as found in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedSchema {
    pub bytes: Vec<u8>,
    /// Version implied by where the bytes were stored. `None` when the bytes
    /// start with their own `0xFFFF` version prefix.
    pub version: Option<u8>,
}

impl EmbeddedSchema {
    pub fn versioned(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            version: None,
        }
    }

    pub fn unversioned(bytes: Vec<u8>, version: SchemaVersion) -> Self {
        Self {
            bytes,
            version: Some(version.as_u8()),
        }
    }

    /// Parses the schema at `pinned`.
    ///
    /// # Errors
    /// Returns [`SchemaParseError::VersionMismatch`] if the bytes belong to
    /// another version, or [`SchemaParseError::Invalid`] if they are malformed.
    pub fn parse(&self, pinned: SchemaVersion) -> Result<VersionedModuleSchema, SchemaParseError> {
        let mismatch = |found: u8| SchemaParseError::VersionMismatch {
            pinned: pinned.as_u8(),
            found,
        };
        if let Some(found) = self.version {
            if found != pinned.as_u8() {
                return Err(mismatch(found));
            }
        }

        let schema = VersionedModuleSchema::new(&self.bytes, &Some(pinned.as_u8()))
            .map_err(|e| SchemaParseError::Invalid(format!("{e:?}")))?;
        let found = SchemaVersion::of(&schema);
        if found != pinned {
            return Err(mismatch(found.as_u8()));
        }
        Ok(schema)
    }
}

/// Serializes a schema JSON value as `ty`.
///
/// # Errors
/// Returns [`EncodingError::Value`] if the value does not fit the type.
pub fn encode_value(ty: &Type, value: &Value) -> Result<Vec<u8>, EncodingError> {
    ty.serial_value(value)
        .map_err(|e| EncodingError::Value(e.to_string()))
}

/// Deserializes `bytes` as `ty` into schema JSON. The whole input must be
/// consumed.
///
/// # Errors
/// Returns an error if the bytes are malformed, too short or too long.
pub fn decode_value(ty: &Type, bytes: &[u8]) -> Result<Value, DecodingError> {
    check_arrays(ty)?;
    let mut cursor = Cursor::new(bytes);
    let value = ty
        .to_json(&mut cursor)
        .map_err(|e| DecodingError::Malformed(e.to_string()))?;
    let remaining = bytes.len().saturating_sub(cursor.offset);
    if remaining > 0 {
        return Err(DecodingError::TrailingBytes(remaining));
    }
    Ok(value)
}

fn is_zero_sized(ty: &Type) -> bool {
    match ty {
        Type::Unit => true,
        Type::Array(len, inner) => *len == 0 || is_zero_sized(inner),
        Type::Struct(Fields::None) => true,
        Type::Struct(Fields::Unnamed(types)) => types.iter().all(is_zero_sized),
        Type::Struct(Fields::Named(fields)) => fields.iter().all(|(_, t)| is_zero_sized(t)),
        _ => false,
    }
}

fn check_fields(fields: &Fields) -> Result<(), DecodingError> {
    match fields {
        Fields::Named(fields) => fields.iter().try_for_each(|(_, t)| check_arrays(t)),
        Fields::Unnamed(types) => types.iter().try_for_each(check_arrays),
        Fields::None => Ok(()),
    }
}

// Zero-sized elements consume no input, so nothing else bounds the
// allocation for such an array.
fn check_arrays(ty: &Type) -> Result<(), DecodingError> {
    match ty {
        Type::Array(len, inner) => {
            if *len > MAX_ZERO_SIZED_ARRAY && is_zero_sized(inner) {
                return Err(DecodingError::ArrayTooLong(*len));
            }
            check_arrays(inner)
        }
        Type::Pair(first, second) | Type::Map(_, first, second) => {
            check_arrays(first)?;
            check_arrays(second)
        }
        Type::List(_, inner) | Type::Set(_, inner) => check_arrays(inner),
        Type::Struct(fields) => check_fields(fields),
        Type::Enum(variants) => variants.iter().try_for_each(|(_, f)| check_fields(f)),
        Type::TaggedEnum(variants) => variants.values().try_for_each(|(_, f)| check_fields(f)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concordium_contracts_common::schema::{ContractV3, FunctionV2, ModuleV3};
    use concordium_contracts_common::to_bytes;
    use std::collections::BTreeMap;

    fn module(parameter: Type, return_value: Option<Type>) -> ModuleV3 {
        let mut receive = BTreeMap::new();
        receive.insert(
            "e".to_string(),
            FunctionV2 {
                parameter: Some(parameter),
                return_value,
                error: None,
            },
        );
        let mut contracts = BTreeMap::new();
        contracts.insert(
            "c".to_string(),
            ContractV3 {
                init: None,
                receive,
                event: None,
            },
        );
        ModuleV3 { contracts }
    }

    fn versioned(module: &ModuleV3) -> EmbeddedSchema {
        let mut bytes = vec![0xff, 0xff, 3];
        bytes.extend(to_bytes(module));
        EmbeddedSchema::versioned(bytes)
    }

    #[test]
    fn test_v3_blob_parses_at_v3_pin() {
        let schema = versioned(&module(Type::U64, Some(Type::Bool)))
            .parse(SchemaVersion::V3)
            .unwrap();
        assert_eq!(SchemaVersion::of(&schema), SchemaVersion::V3);
        assert_eq!(schema.get_receive_param_schema("c", "e").unwrap(), Type::U64);
    }

    #[test]
    fn test_version_pin_rejects_other_version() {
        let blob = versioned(&module(Type::U64, None));
        assert_eq!(
            blob.parse(SchemaVersion::V1).unwrap_err(),
            SchemaParseError::VersionMismatch { pinned: 1, found: 3 }
        );

        let unversioned = EmbeddedSchema::unversioned(vec![0, 0, 0, 0], SchemaVersion::V1);
        assert_eq!(
            unversioned.parse(SchemaVersion::V3).unwrap_err(),
            SchemaParseError::VersionMismatch { pinned: 3, found: 1 }
        );
    }

    #[test]
    fn test_unversioned_blob_read_at_its_version() {
        // Zero contracts.
        let schema = EmbeddedSchema::unversioned(vec![0, 0, 0, 0], SchemaVersion::V1)
            .parse(SchemaVersion::V1)
            .unwrap();
        assert_eq!(SchemaVersion::of(&schema), SchemaVersion::V1);
    }

    #[test]
    fn test_name_and_tagged_enum_types_are_supported() {
        let mut tagged = BTreeMap::new();
        tagged.insert(7u8, ("Seven".to_string(), Fields::None));
        let schema = versioned(&module(
            Type::ContractName(SizeLength::U16),
            Some(Type::TaggedEnum(tagged.clone())),
        ))
        .parse(SchemaVersion::V3)
        .unwrap();
        assert_eq!(
            schema.get_receive_param_schema("c", "e").unwrap(),
            Type::ContractName(SizeLength::U16)
        );
        assert_eq!(
            schema.get_receive_return_value_schema("c", "e").unwrap(),
            Type::TaggedEnum(tagged)
        );

        let receive = versioned(&module(Type::ReceiveName(SizeLength::U16), None));
        assert!(receive.parse(SchemaVersion::V3).is_ok());
    }

    #[test]
    fn test_malformed_blob() {
        let mut blob = versioned(&module(Type::U64, None));
        blob.bytes.truncate(blob.bytes.len() - 1);
        assert!(matches!(
            blob.parse(SchemaVersion::V3),
            Err(SchemaParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_and_truncated_input() {
        let bytes = 500u64.to_le_bytes();
        assert_eq!(decode_value(&Type::U64, &bytes).unwrap(), serde_json::json!(500));

        let mut padded = bytes.to_vec();
        padded.push(0);
        assert_eq!(
            decode_value(&Type::U64, &padded),
            Err(DecodingError::TrailingBytes(1))
        );
        assert!(matches!(
            decode_value(&Type::U64, &bytes[..5]),
            Err(DecodingError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_corrupt_length_prefix_fails() {
        let ty = Type::List(SizeLength::U32, Box::new(Type::U64));
        assert!(matches!(
            decode_value(&ty, &[0xff, 0xff, 0xff, 0xff]),
            Err(DecodingError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_bounds_zero_sized_arrays() {
        let hostile = Type::Pair(
            Box::new(Type::Bool),
            Box::new(Type::Array(u32::MAX, Box::new(Type::Unit))),
        );
        assert_eq!(
            decode_value(&hostile, &[]),
            Err(DecodingError::ArrayTooLong(u32::MAX))
        );

        let small = Type::Array(3, Box::new(Type::Unit));
        assert!(decode_value(&small, &[]).is_ok());
    }

    #[test]
    fn test_encode_checks_numeric_width() {
        assert_eq!(
            encode_value(&Type::U8, &serde_json::json!(200)).unwrap(),
            vec![200]
        );
        assert!(matches!(
            encode_value(&Type::U8, &serde_json::json!(300)),
            Err(EncodingError::Value(_))
        ));
    }
}

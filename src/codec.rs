//! Wire codec between Courier JSON payloads and typed values.
//!
//! Every model in this crate implements [`FromWire`] and [`ToWire`]. Decoding
//! walks a parsed [`serde_json::Value`] and reports failures as
//! [`DecodeError`] values that name the offending field and its location.
//!
//! Most models are declared with the [`wire_struct!`] and [`wire_enum!`]
//! macros, which generate:
//!
//! - the struct/enum itself with public fields
//! - `new(required...)` plus by-value setters for every field
//! - `FromWire`/`ToWire` impls honoring required, optional and three-state
//!   nullable fields
//! - `serde::Serialize`/`serde::Deserialize` impls that delegate to the codec
//!
//! ## Field kinds
//!
//! | Kind | Rust type | Absent | `null` |
//! |------|-----------|--------|--------|
//! | `required` | `T` | `MissingField` | type error (unless `T` is `Option`) |
//! | `optional` | `Option<T>` | `None` | `None` |
//! | `nullable` | `Tristate<T>` | `Absent` | `Null` |

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::DecodeError;

/// Root of every decode path.
pub const ROOT: &str = "$";

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Decode a typed value out of wire JSON.
pub trait FromWire: Sized {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self>;

    /// Whether `value` carries every key this shape requires.
    ///
    /// Tag-less unions commit to the first candidate that claims a payload,
    /// so a claimed payload that fails to decode is an error, not a miss.
    fn claims(_value: &Value) -> bool {
        false
    }
}

/// Encode a typed value into wire JSON.
pub trait ToWire {
    fn to_wire(&self) -> Value;
}

/// Field-level codec for object shapes, used to embed one shape's fields into
/// another (shared message fields, shared Elemental node fields).
pub trait WireFields: Sized {
    fn decode_fields(
        obj: &Map<String, Value>,
        container: &'static str,
        path: &str,
    ) -> DecodeResult<Self>;

    fn encode_fields(&self, obj: &mut Map<String, Value>);

    /// Every required key of this shape, including embedded shapes, is present.
    fn has_required(obj: &Map<String, Value>) -> bool;
}

/// A field that distinguishes "absent" from "explicitly null".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tristate<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Tristate<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Tristate::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tristate::Null)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Tristate::Value(_))
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Tristate::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Collapse to an `Option`, treating `Absent` and `Null` alike.
    pub fn into_option(self) -> Option<T> {
        match self {
            Tristate::Value(value) => Some(value),
            _ => None,
        }
    }

    /// `None` becomes `Null`, never `Absent`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Tristate::Value(value),
            None => Tristate::Null,
        }
    }
}

impl<T> Default for Tristate<T> {
    fn default() -> Self {
        Tristate::Absent
    }
}

impl<T> From<T> for Tristate<T> {
    fn from(value: T) -> Self {
        Tristate::Value(value)
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Decode a typed value from raw JSON bytes.
pub fn decode<T: FromWire>(json: &[u8]) -> DecodeResult<T> {
    let value: Value = serde_json::from_slice(json).map_err(|err| DecodeError::MalformedJson {
        message: err.to_string(),
        path: ROOT.to_string(),
    })?;
    T::from_wire(&value, ROOT)
}

/// Decode a typed value from a JSON string.
pub fn decode_str<T: FromWire>(json: &str) -> DecodeResult<T> {
    decode(json.as_bytes())
}

/// Decode a typed value from an already-parsed JSON value.
pub fn decode_value<T: FromWire>(value: &Value) -> DecodeResult<T> {
    T::from_wire(value, ROOT)
}

/// Encode a typed value to a compact JSON string.
pub fn encode<T: ToWire + ?Sized>(value: &T) -> String {
    value.to_wire().to_string()
}

/// Encode a typed value to a JSON value.
pub fn encode_value<T: ToWire + ?Sized>(value: &T) -> Value {
    value.to_wire()
}

// ============================================================================
// Helpers shared by generated and hand-written impls
// ============================================================================

pub(crate) fn field_path(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn type_error(expected: &str, value: &Value, path: &str) -> DecodeError {
    DecodeError::MalformedJson {
        message: format!("expected {expected}, found {}", json_type(value)),
        path: path.to_string(),
    }
}

pub fn expect_object<'a>(value: &'a Value, path: &str) -> DecodeResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| type_error("object", value, path))
}

pub fn required<T: FromWire>(
    obj: &Map<String, Value>,
    key: &str,
    container: &str,
    path: &str,
) -> DecodeResult<T> {
    match obj.get(key) {
        Some(value) => T::from_wire(value, &field_path(path, key)),
        None => Err(DecodeError::MissingField {
            field: key.to_string(),
            container: container.to_string(),
            path: path.to_string(),
        }),
    }
}

pub fn optional<T: FromWire>(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> DecodeResult<Option<T>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_wire(value, &field_path(path, key)).map(Some),
    }
}

pub fn nullable<T: FromWire>(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> DecodeResult<Tristate<T>> {
    match obj.get(key) {
        None => Ok(Tristate::Absent),
        Some(Value::Null) => Ok(Tristate::Null),
        Some(value) => T::from_wire(value, &field_path(path, key)).map(Tristate::Value),
    }
}

pub fn put<T: ToWire + ?Sized>(obj: &mut Map<String, Value>, key: &str, value: &T) {
    obj.insert(key.to_string(), value.to_wire());
}

pub fn put_optional<T: ToWire>(obj: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        obj.insert(key.to_string(), value.to_wire());
    }
}

pub fn put_tristate<T: ToWire>(obj: &mut Map<String, Value>, key: &str, value: &Tristate<T>) {
    match value {
        Tristate::Absent => {}
        Tristate::Null => {
            obj.insert(key.to_string(), Value::Null);
        }
        Tristate::Value(value) => {
            obj.insert(key.to_string(), value.to_wire());
        }
    }
}

// ============================================================================
// Primitive and collection impls
// ============================================================================

impl FromWire for String {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_error("string", value, path))
    }
}

impl ToWire for String {
    fn to_wire(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToWire for str {
    fn to_wire(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromWire for bool {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| type_error("boolean", value, path))
    }
}

impl ToWire for bool {
    fn to_wire(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromWire for i64 {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        value
            .as_i64()
            .ok_or_else(|| type_error("integer", value, path))
    }
}

impl ToWire for i64 {
    fn to_wire(&self) -> Value {
        Value::from(*self)
    }
}

impl FromWire for u64 {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        value
            .as_u64()
            .ok_or_else(|| type_error("unsigned integer", value, path))
    }
}

impl ToWire for u64 {
    fn to_wire(&self) -> Value {
        Value::from(*self)
    }
}

impl FromWire for f64 {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        value
            .as_f64()
            .ok_or_else(|| type_error("number", value, path))
    }
}

impl ToWire for f64 {
    fn to_wire(&self) -> Value {
        Value::from(*self)
    }
}

impl FromWire for Value {
    fn from_wire(value: &Value, _path: &str) -> DecodeResult<Self> {
        Ok(value.clone())
    }
}

impl ToWire for Value {
    fn to_wire(&self) -> Value {
        self.clone()
    }
}

/// Unit responses accept any body (including an empty one).
impl FromWire for () {
    fn from_wire(_value: &Value, _path: &str) -> DecodeResult<Self> {
        Ok(())
    }
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_wire(other, path).map(Some),
        }
    }
}

impl<T: ToWire> ToWire for Option<T> {
    fn to_wire(&self) -> Value {
        match self {
            Some(value) => value.to_wire(),
            None => Value::Null,
        }
    }
}

impl<T: FromWire> FromWire for Box<T> {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        T::from_wire(value, path).map(Box::new)
    }

    fn claims(value: &Value) -> bool {
        T::claims(value)
    }
}

impl<T: ToWire + ?Sized> ToWire for Box<T> {
    fn to_wire(&self) -> Value {
        (**self).to_wire()
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| type_error("array", value, path))?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| T::from_wire(item, &index_path(path, idx)))
            .collect()
    }
}

impl<T: ToWire> ToWire for Vec<T> {
    fn to_wire(&self) -> Value {
        Value::Array(self.iter().map(ToWire::to_wire).collect())
    }
}

impl<T: FromWire> FromWire for BTreeMap<String, T> {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        let obj = expect_object(value, path)?;
        obj.iter()
            .map(|(key, item)| {
                T::from_wire(item, &field_path(path, key)).map(|decoded| (key.clone(), decoded))
            })
            .collect()
    }
}

impl<T: ToWire> ToWire for BTreeMap<String, T> {
    fn to_wire(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_wire()))
                .collect(),
        )
    }
}

impl FromWire for Map<String, Value> {
    fn from_wire(value: &Value, path: &str) -> DecodeResult<Self> {
        expect_object(value, path).cloned()
    }
}

impl ToWire for Map<String, Value> {
    fn to_wire(&self) -> Value {
        Value::Object(self.clone())
    }
}

// ============================================================================
// Declarative model macros
// ============================================================================

/// Implement `serde::Serialize`/`serde::Deserialize` by delegating to the wire codec.
macro_rules! wire_serde {
    ($name:ident) => {
        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                ::serde::Serialize::serialize(
                    &$crate::codec::ToWire::to_wire(self),
                    serializer,
                )
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let value = <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::codec::FromWire>::from_wire(&value, $crate::codec::ROOT)
                    .map_err(::serde::de::Error::custom)
            }
        }
    };
}

/// Declare an object model with required, optional, nullable and embedded fields.
///
/// ```ignore
/// wire_struct! {
///     /// A brand template.
///     pub struct BrandTemplate {
///         required { enabled: bool = "enabled" }
///         nullable { background_color: String = "backgroundColor" }
///     }
/// }
/// ```
macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(required {
                $( $(#[$rmeta:meta])* $rfield:ident : $rty:ty = $rwire:literal ),* $(,)?
            })?
            $(optional {
                $( $(#[$ometa:meta])* $ofield:ident : $oty:ty = $owire:literal ),* $(,)?
            })?
            $(nullable {
                $( $(#[$nmeta:meta])* $nfield:ident : $nty:ty = $nwire:literal ),* $(,)?
            })?
            $(flatten {
                $( $(#[$fmeta:meta])* $ffield:ident : $fty:ty ),* $(,)?
            })?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $($( $(#[$rmeta])* pub $rfield: $rty, )*)?
            $($( $(#[$ometa])* pub $ofield: ::std::option::Option<$oty>, )*)?
            $($( $(#[$nmeta])* pub $nfield: $crate::codec::Tristate<$nty>, )*)?
            $($( $(#[$fmeta])* pub $ffield: $fty, )*)?
        }

        #[allow(clippy::new_without_default, clippy::too_many_arguments)]
        impl $name {
            /// Create a value from its required fields; everything else starts absent.
            pub fn new($($( $rfield: impl Into<$rty> ),*)?) -> Self {
                Self {
                    $($( $rfield: $rfield.into(), )*)?
                    $($( $ofield: None, )*)?
                    $($( $nfield: $crate::codec::Tristate::Absent, )*)?
                    $($( $ffield: <$fty as ::std::default::Default>::default(), )*)?
                }
            }

            $($(
                pub fn $rfield(mut self, value: impl Into<$rty>) -> Self {
                    self.$rfield = value.into();
                    self
                }
            )*)?

            $($(
                pub fn $ofield(mut self, value: impl Into<$oty>) -> Self {
                    self.$ofield = Some(value.into());
                    self
                }
            )*)?

            $($(
                pub fn $nfield(mut self, value: impl Into<$crate::codec::Tristate<$nty>>) -> Self {
                    self.$nfield = value.into();
                    self
                }
            )*)?

            $($(
                pub fn $ffield(mut self, value: $fty) -> Self {
                    self.$ffield = value;
                    self
                }
            )*)?
        }

        impl $crate::codec::WireFields for $name {
            #[allow(unused_variables)]
            fn decode_fields(
                obj: &::serde_json::Map<String, ::serde_json::Value>,
                container: &'static str,
                path: &str,
            ) -> $crate::codec::DecodeResult<Self> {
                Ok(Self {
                    $($( $rfield: $crate::codec::required(obj, $rwire, container, path)?, )*)?
                    $($( $ofield: $crate::codec::optional(obj, $owire, path)?, )*)?
                    $($( $nfield: $crate::codec::nullable(obj, $nwire, path)?, )*)?
                    $($( $ffield: <$fty as $crate::codec::WireFields>::decode_fields(obj, container, path)?, )*)?
                })
            }

            #[allow(unused_variables)]
            fn encode_fields(&self, obj: &mut ::serde_json::Map<String, ::serde_json::Value>) {
                $($( $crate::codec::put(obj, $rwire, &self.$rfield); )*)?
                $($( $crate::codec::put_optional(obj, $owire, &self.$ofield); )*)?
                $($( $crate::codec::put_tristate(obj, $nwire, &self.$nfield); )*)?
                $($( $crate::codec::WireFields::encode_fields(&self.$ffield, obj); )*)?
            }

            #[allow(unused_variables)]
            fn has_required(obj: &::serde_json::Map<String, ::serde_json::Value>) -> bool {
                true
                    $($( && obj.contains_key($rwire) )*)?
                    $($( && <$fty as $crate::codec::WireFields>::has_required(obj) )*)?
            }
        }

        impl $crate::codec::FromWire for $name {
            fn from_wire(
                value: &::serde_json::Value,
                path: &str,
            ) -> $crate::codec::DecodeResult<Self> {
                let obj = $crate::codec::expect_object(value, path)?;
                <Self as $crate::codec::WireFields>::decode_fields(obj, stringify!($name), path)
            }

            fn claims(value: &::serde_json::Value) -> bool {
                value
                    .as_object()
                    .is_some_and(<Self as $crate::codec::WireFields>::has_required)
            }
        }

        impl $crate::codec::ToWire for $name {
            fn to_wire(&self) -> ::serde_json::Value {
                let mut obj = ::serde_json::Map::new();
                $crate::codec::WireFields::encode_fields(self, &mut obj);
                ::serde_json::Value::Object(obj)
            }
        }

        wire_serde!($name);
    };
}

/// Declare a closed string enum. Unlisted wire values fail with `InvalidEnumValue`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every declared value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }

            /// Look up a value by its exact wire string.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $( $wire => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::codec::FromWire for $name {
            fn from_wire(
                value: &::serde_json::Value,
                path: &str,
            ) -> $crate::codec::DecodeResult<Self> {
                let raw = value
                    .as_str()
                    .ok_or_else(|| $crate::codec::type_error("string", value, path))?;
                Self::parse(raw).ok_or_else(|| $crate::errors::DecodeError::InvalidEnumValue {
                    enum_name: stringify!($name).to_string(),
                    value: raw.to_string(),
                    path: path.to_string(),
                })
            }
        }

        impl $crate::codec::ToWire for $name {
            fn to_wire(&self) -> ::serde_json::Value {
                ::serde_json::Value::String(self.as_str().to_string())
            }
        }

        wire_serde!($name);
    };
}

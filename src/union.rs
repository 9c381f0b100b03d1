//! Tag-less union resolution.
//!
//! Recipient and profile unions (Slack, Discord, MS Teams, Expo, message
//! `to`) carry no discriminant field. A payload is resolved by trying each
//! candidate shape in declared order; the first candidate that decodes
//! cleanly wins. Candidates whose required-field sets overlap are resolved
//! in favor of the earlier declaration, so declaration order is part of each
//! union's contract.

use serde_json::Value;

use crate::codec::DecodeResult;
use crate::errors::DecodeError;

/// A candidate decoder for one alternative of a union.
pub(crate) struct Candidate<'a, T> {
    pub(crate) label: &'static str,
    /// The payload carries every key this candidate requires.
    pub(crate) claimed: bool,
    pub(crate) decode: &'a dyn Fn(&Value, &str) -> DecodeResult<T>,
}

/// Try `candidates` in order and return the first successful decode.
///
/// A candidate that claims the payload (all of its required keys are
/// present) ends the search: its decode error is returned and later
/// candidates are never tried. Otherwise failures are reported as follows:
///
/// - every candidate rejected the JSON type at `path` (for example a number
///   where an object was expected): that type error is returned as-is
/// - exactly one candidate got past the top level and failed on a nested
///   field: that nested error is returned, since it names the real problem
/// - anything else is `NoMatchingVariant`
pub(crate) fn first_match<T>(
    union: &'static str,
    candidates: &[Candidate<'_, T>],
    value: &Value,
    path: &str,
) -> DecodeResult<T> {
    let mut type_error = None;
    let mut all_type_errors = true;
    let mut nested = Vec::new();

    for candidate in candidates {
        match (candidate.decode)(value, path) {
            Ok(decoded) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(union, variant = candidate.label, path, "resolved tag-less union");
                return Ok(decoded);
            }
            Err(err) if candidate.claimed => {
                #[cfg(feature = "tracing")]
                tracing::trace!(union, variant = candidate.label, error = %err, "claimed union candidate failed");
                return Err(err);
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(union, variant = candidate.label, error = %err, "union candidate rejected");
                match &err {
                    DecodeError::MalformedJson { path: at, .. } if at == path => {
                        type_error.get_or_insert(err);
                    }
                    _ => {
                        all_type_errors = false;
                        if is_nested(&err, path) {
                            nested.push(err);
                        }
                    }
                }
            }
        }
    }

    if let Some(err) = type_error.filter(|_| all_type_errors) {
        return Err(err);
    }
    if nested.len() == 1 {
        if let Some(err) = nested.pop() {
            return Err(err);
        }
    }
    Err(DecodeError::NoMatchingVariant {
        union: union.to_string(),
        path: path.to_string(),
    })
}

fn is_nested(err: &DecodeError, path: &str) -> bool {
    err.path()
        .is_some_and(|at| at.len() > path.len() && at.starts_with(path))
}

/// Declare a tag-less union of candidate shapes, tried in the listed order.
///
/// Each variant names its predicate and narrowing accessor:
///
/// ```ignore
/// wire_union! {
///     pub enum ExpoRecipient {
///         Token(ExpoToken) [is_token, as_token],
///         MultipleTokens(ExpoMultipleTokens) [is_multiple_tokens, as_multiple_tokens],
///     }
/// }
/// ```
macro_rules! wire_union {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident($ty:ty) [$is:ident, $as_:ident] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant($ty), )+
        }

        impl $name {
            /// Candidate names in resolution order.
            pub const CANDIDATES: &'static [&'static str] = &[$(stringify!($variant)),+];

            /// Name of the active variant.
            pub fn variant_name(&self) -> &'static str {
                match self {
                    $( $name::$variant(_) => stringify!($variant), )+
                }
            }

            $(
                pub fn $is(&self) -> bool {
                    matches!(self, $name::$variant(_))
                }

                pub fn $as_(&self) -> $crate::codec::DecodeResult<&$ty> {
                    match self {
                        $name::$variant(inner) => Ok(inner),
                        #[allow(unreachable_patterns)]
                        other => Err($crate::errors::DecodeError::type_mismatch(
                            stringify!($variant),
                            other.variant_name(),
                        )),
                    }
                }
            )+
        }

        $(
            impl From<$ty> for $name {
                fn from(value: $ty) -> Self {
                    $name::$variant(value)
                }
            }
        )+

        impl $crate::codec::FromWire for $name {
            fn from_wire(
                value: &::serde_json::Value,
                path: &str,
            ) -> $crate::codec::DecodeResult<Self> {
                let candidates: &[$crate::union::Candidate<'_, Self>] = &[
                    $(
                        $crate::union::Candidate {
                            label: stringify!($variant),
                            claimed: <$ty as $crate::codec::FromWire>::claims(value),
                            decode: &|value: &::serde_json::Value, path: &str| {
                                <$ty as $crate::codec::FromWire>::from_wire(value, path)
                                    .map($name::$variant)
                            },
                        },
                    )+
                ];
                $crate::union::first_match(stringify!($name), candidates, value, path)
            }

            fn claims(value: &::serde_json::Value) -> bool {
                false $( || <$ty as $crate::codec::FromWire>::claims(value) )+
            }
        }

        impl $crate::codec::ToWire for $name {
            fn to_wire(&self) -> ::serde_json::Value {
                match self {
                    $( $name::$variant(inner) => $crate::codec::ToWire::to_wire(inner), )+
                }
            }
        }

        wire_serde!($name);
    };
}

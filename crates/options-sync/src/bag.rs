//! Settings values and bags.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// A single option value. Options are flat: no arrays or nested objects.
///
/// There is a single number type: `30` and `30.0` are the same value. Whole-number floats are
/// stored, compared and serialized as integers.
#[derive(Debug, Clone)]
pub enum OptionValue {
    #[allow(missing_docs)]
    Bool(bool),
    #[allow(missing_docs)]
    Number(Number),
    #[allow(missing_docs)]
    String(String),
}

/// A mapping from option name to value.
///
/// The same type holds defaults, the possibly partial stored bag, and effective settings. Keys are
/// sorted, so two equal bags always serialize identically.
pub type SettingsBag = BTreeMap<String, OptionValue>;

/// Whole-number floats within `i64` range become integers.
fn normalize_number(number: &Number) -> Number {
    match number.as_f64() {
        Some(value)
            if number.is_f64()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Number::from(value as i64)
        }
        _ => number.clone(),
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::String(a), OptionValue::String(b)) => a == b,
            (OptionValue::Number(a), OptionValue::Number(b)) => {
                match (a.as_i64(), b.as_i64(), a.as_u64(), b.as_u64()) {
                    (Some(a), Some(b), _, _) => a == b,
                    (_, _, Some(a), Some(b)) => a == b,
                    _ => a.as_f64() == b.as_f64(),
                }
            }
            _ => false,
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Bool(value) => serializer.serialize_bool(*value),
            OptionValue::Number(value) => normalize_number(value).serialize(serializer),
            OptionValue::String(value) => serializer.serialize_str(value),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptionValue {
    Bool(bool),
    Number(Number),
    String(String),
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawOptionValue::deserialize(deserializer)? {
            RawOptionValue::Bool(value) => OptionValue::Bool(value),
            RawOptionValue::Number(value) => OptionValue::Number(normalize_number(&value)),
            RawOptionValue::String(value) => OptionValue::String(value),
        })
    }
}

impl OptionValue {
    /// Create a number value. Returns `None` for NaN and infinities, which JSON cannot hold.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(|number| OptionValue::Number(normalize_number(&number)))
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as an `f64`, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(value) => value.as_f64(),
            _ => None,
        }
    }

    /// The value as an `i64`, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Number(value) => value.as_i64(),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64);

/// Build a [SettingsBag] from `key => value` pairs.
///
/// ```rust
/// use options_sync::settings;
///
/// let defaults = settings! { "color" => "red", "sound" => true, "size" => 30 };
/// assert_eq!(defaults.len(), 3);
/// ```
#[macro_export]
macro_rules! settings {
    () => {
        $crate::SettingsBag::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut bag = $crate::SettingsBag::new();
        $(
            bag.insert(::std::string::String::from($key), $crate::OptionValue::from($value));
        )+
        bag
    }};
}

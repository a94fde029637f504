//!
//! # Enum-String Mapping
//!
//! Defines the [enumstr] macro and paired [EnumStr] trait,
//! mapping field-less enums to the string values they take in circuit files.
//!
//! ```rust
//! use place21utils::{enumstr, EnumStr};
//!
//! enumstr!(
//!     /// # Pad Orientation
//!     PadSide {
//!         North: "N",
//!         South: "S",
//!     }
//! );
//! assert_eq!(PadSide::North.to_str(), "N");
//! assert_eq!(PadSide::from_str("S"), Some(PadSide::South));
//! assert_eq!(PadSide::variants().len(), 2);
//! ```
//!

///
/// # String-Enumeration Trait
///
/// * `to_str` converts the enum to its string value.
/// * `from_str` does the opposite, returning [None] for unrecognized strings.
///
pub trait EnumStr: std::marker::Sized + 'static {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
    /// All variants, in declaration order
    fn variants() -> &'static [Self];
}

///
/// # Enum-String Pairing Macro
///
/// Creates a field-less `enum` which:
/// * Implements [EnumStr], converting to and from the paired strings.
/// * Implements [std::fmt::Display], writing the paired strings.
/// * Derives `serde::{Serialize, Deserialize}`, using the paired strings as its serialized form.
///   The invoking crate must depend on `serde`.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: tt ),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, ::serde::Deserialize, ::serde::Serialize, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
               #[serde(rename = $strval)]
               $variant ),*
        }
        impl $crate::EnumStr for $enum_name {
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Case-sensitive match against the paired strings
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
            fn variants() -> &'static [Self] {
                &[ $( Self::$variant ),* ]
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", $crate::EnumStr::to_str(self))
            }
        }
    }
}

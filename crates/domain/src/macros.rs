//! Macro for implementing Display and FromStr for wire enums
//!
//! Backend payloads and configuration values carry small closed sets of
//! lowercase strings (`staff`/`admin`, `pretty`/`json`). This macro gives
//! those enums one canonical string form and case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use hotelops_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shift {
//!     Day,
//!     Night,
//! }
//!
//! impl_wire_enum_conversions!(Shift {
//!     Day => "day",
//!     Night => "night",
//! });
//!
//! assert_eq!("NIGHT".parse::<Shift>().unwrap(), Shift::Night);
//! ```

/// Implements Display and FromStr traits for wire enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

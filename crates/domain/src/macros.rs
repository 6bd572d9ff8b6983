//! Macro for implementing Display and FromStr for wire enums
//!
//! Status-like enums travel as fixed strings (`"IN_PROGRESS"`,
//! `"digital_presence"`). The macro keeps the string form in one place for
//! Display, FromStr and `as_str`.
//!
//! # Example
//!
//! ```rust
//! use adoptly_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Stage {
//!     Draft,
//!     Published,
//! }
//!
//! impl_domain_status_conversions!(Stage {
//!     Draft => "DRAFT",
//!     Published => "PUBLISHED",
//! });
//!
//! assert_eq!(Stage::Draft.to_string(), "DRAFT");
//! assert_eq!("published".parse::<Stage>(), Ok(Stage::Published));
//! ```

/// Implements `as_str`, Display and FromStr for wire enums
///
/// - Display and `as_str` emit the mapped string exactly
/// - FromStr accepts the mapped string in any ASCII case
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

//! Display/FromStr boilerplate for small status enums
//!
//! # Example
//!
//! ```rust
//! use snaptrack_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SyncState {
//!     Idle,
//!     Uploading,
//! }
//!
//! impl_domain_status_conversions!(SyncState {
//!     Idle => "idle",
//!     Uploading => "uploading",
//! });
//!
//! assert_eq!(SyncState::Uploading.to_string(), "uploading");
//! assert_eq!("IDLE".parse::<SyncState>(), Ok(SyncState::Idle));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a fieldless enum.
///
/// String representations must be lowercase; parsing lowercases its input
/// before matching.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Green,
        Amber,
        Red,
    }

    impl_domain_status_conversions!(Light {
        Green => "green",
        Amber => "amber",
        Red => "red",
    });

    #[test]
    fn display_uses_declared_names() {
        assert_eq!(Light::Green.to_string(), "green");
        assert_eq!(Light::Amber.to_string(), "amber");
        assert_eq!(format!("{:>5}", Light::Red.to_string()), "  red");
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!(Light::from_str("AMBER").unwrap(), Light::Amber);
        assert_eq!(Light::from_str("Red").unwrap(), Light::Red);
    }

    #[test]
    fn unknown_names_are_rejected_with_enum_name() {
        let err = Light::from_str("blue").unwrap_err();
        assert_eq!(err, "Invalid Light: blue");
        assert!(Light::from_str("").is_err());
    }

    mod with_crate_result_in_scope {
        use std::str::FromStr;

        use crate::errors::Result;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Phase {
            Idle,
            Busy,
        }

        impl_domain_status_conversions!(Phase {
            Idle => "idle",
            Busy => "busy",
        });

        #[test]
        fn expands_next_to_single_parameter_result_alias() {
            let parsed: Result<Phase> = Phase::from_str("BUSY")
                .map_err(crate::errors::SnaptrackError::InvalidInput);
            assert_eq!(parsed.unwrap(), Phase::Busy);
            assert_eq!(Phase::Idle.to_string(), "idle");
        }
    }
}

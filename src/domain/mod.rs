//! Domain types and DTOs
//!
//! These types define the records held by the entity store and the request
//! and response shapes exchanged with the HTTP layer.

pub mod analytics;
pub mod contractors;
pub mod emails;
pub mod notifications;
pub mod offers;
pub mod support;
pub mod tasks;
pub mod users;

/// Raised when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum that is
/// persisted as text.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::domain::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use text_enum;

/// Priority shared by tasks and support tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

text_enum!(Priority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// Replace `target` when the patch carries a value.
pub(crate) fn patch<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Like [`patch`], for optional fields. An empty string clears the field.
pub(crate) fn patch_opt(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *target = if value.trim().is_empty() {
            None
        } else {
            Some(value)
        };
    }
}

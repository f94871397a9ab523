//! Status enum scaffolding shared by the project and bid lifecycles.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` lookup table, and its label is the
//! snake_case name used on the wire.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant in seed-data order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> $crate::status::StatusId {
                self as $crate::status::StatusId
            }

            /// Snake_case label used in JSON and log output.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Map a database status ID back to the enum.
            pub fn from_id(
                id: $crate::status::StatusId,
            ) -> Result<Self, $crate::error::CoreError> {
                match id {
                    $( x if x == $val => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Internal(format!(
                        concat!("Unknown ", stringify!($name), " id {}"),
                        other
                    ))),
                }
            }

            /// Parse the snake_case label.
            pub fn from_label(label: &str) -> Result<Self, $crate::error::CoreError> {
                match label {
                    $( $label => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        concat!("Invalid ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for $crate::status::StatusId {
            fn from(value: $name) -> Self {
                value as $crate::status::StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use define_status_enum;

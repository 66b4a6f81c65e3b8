use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr + serde-as-string pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(
    /// Patient sex as accepted by the backend.
    Sex {
        Male => "M",
        Female => "F",
        Other => "O",
    }
);

str_enum!(
    /// Origin filter of the local catalog view. `All` sends no query parameter.
    OriginFilter {
        All => "all",
        Drive => "drive",
        Local => "local",
    }
);

impl OriginFilter {
    /// Value for `?filtro_origen=`, `None` for `All`.
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            other => Some(other.as_str()),
        }
    }
}

impl Default for OriginFilter {
    fn default() -> Self {
        Self::All
    }
}

/// Provenance of a prescription record.
///
/// Unknown tags are kept verbatim so a new backend origin does not break
/// decoding of the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Origin {
    Web,
    Drive,
    Local,
    Other(String),
}

impl Origin {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Web => "web",
            Self::Drive => "drive",
            Self::Local => "local",
            Self::Other(s) => s,
        }
    }

    /// True for records that arrived through the ingestion pipeline.
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Web)
    }
}

impl From<String> for Origin {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "web" => Self::Web,
            "drive" => Self::Drive,
            "local" => Self::Local,
            _ => Self::Other(raw),
        }
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.as_str().to_string()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

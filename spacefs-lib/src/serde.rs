use std::fmt;
use std::str::FromStr;

use mime::Mime;
use serde::de;

/// reads an optional content type. the store echoes whatever the uploader
/// sent, so a value that does not parse is treated as unknown instead of
/// failing the whole listing.
struct OptionMimeVisitor;

impl<'de> de::Visitor<'de> for OptionMimeVisitor {
    type Value = Option<Mime>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a mime type string or null")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Mime::from_str(s).ok())
    }

    fn visit_some<D>(self, d: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>
    {
        d.deserialize_str(OptionMimeVisitor)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error
    {
        Ok(None)
    }
}

pub mod mime_opt_str {
    use mime::Mime;
    use serde::{ser, de};

    use super::OptionMimeVisitor;

    pub fn serialize<S>(mime: &Option<Mime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer
    {
        match mime {
            Some(ref v) => serializer.serialize_some(v.essence_str()),
            None => serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Mime>, D::Error>
    where
        D: de::Deserializer<'de>
    {
        deserializer.deserialize_option(OptionMimeVisitor)
    }
}

//! Field type tags
//!
//! A closed set of tags. Each tag has a validity predicate here; the
//! best-effort coercion toward each tag lives in `blocksmith-repair`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::reference::ReferenceObject;
use crate::rich_text::{is_image, is_rich_text};

/// Declared type of a block field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldTypeTag {
    /// Plain string
    String,
    /// JSON number
    Number,
    /// Array of strings
    StringArray,
    /// Array of paragraph nodes holding inline text runs
    RichTextArray,
    /// Array of reference objects, no inline records
    ReferenceArray,
    /// Required image object
    ImageRef,
    /// Image object or null
    OptionalImageRef,
    /// Icon identifier
    IconRef,
    /// String constrained by the block's `fieldEnums`
    Enum,
}

impl FieldTypeTag {
    /// Manifest spelling of the tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::StringArray => "stringArray",
            Self::RichTextArray => "richTextArray",
            Self::ReferenceArray => "referenceArray",
            Self::ImageRef => "imageRef",
            Self::OptionalImageRef => "optionalImageRef",
            Self::IconRef => "iconRef",
            Self::Enum => "enum",
        }
    }

    /// Whether the tag describes an array value
    #[inline]
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::StringArray | Self::RichTextArray | Self::ReferenceArray
        )
    }

    /// Validity predicate
    ///
    /// `allowed` is the enum vocabulary for [`FieldTypeTag::Enum`] and is
    /// ignored by every other tag. An `Enum` without a vocabulary accepts
    /// nothing.
    #[must_use]
    pub fn accepts(self, value: &Value, allowed: Option<&[String]>) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::RichTextArray => is_rich_text(value),
            Self::ReferenceArray => value.as_array().is_some_and(|items| {
                items
                    .iter()
                    .all(|item| ReferenceObject::from_value(item).is_some())
            }),
            Self::ImageRef => is_image(value),
            Self::OptionalImageRef => value.is_null() || is_image(value),
            Self::IconRef => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            Self::Enum => match (value.as_str(), allowed) {
                (Some(s), Some(allowed)) => allowed.iter().any(|a| a == s),
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for FieldTypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use std::fmt;

use crate::GraftError;
use crate::kind::AttributeValueKind;

/// Typed failures of the attribute layer.
///
/// They travel inside `GraftError` like any other error and can be recovered
/// with `downcast_ref::<AttrError>()`, even through added context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrError {
    /// The accessor makes no sense for this framework, whatever the input.
    UnsupportedCapability { framework: &'static str, attribute: String, capability: &'static str },
    /// The accessor does not match the kind of the attribute, or the value
    /// record holds a payload of another kind than the definition declares.
    KindMismatch {
        attribute: Option<String>,
        expected: AttributeValueKind,
        found: AttributeValueKind,
    },
    /// The value record carries no payload at all.
    MissingValue { attribute: String, expected: AttributeValueKind },
    /// A required attribute is unusable and the import policy says abort.
    /// `declared` is `None` when the attribute is not there at all.
    InvalidAttribute { operation: String, attribute: String, declared: Option<String> },
}

impl AttrError {
    pub fn is_unsupported_capability(e: &GraftError) -> bool {
        matches!(e.downcast_ref::<AttrError>(), Some(AttrError::UnsupportedCapability { .. }))
    }

    pub fn is_kind_mismatch(e: &GraftError) -> bool {
        matches!(e.downcast_ref::<AttrError>(), Some(AttrError::KindMismatch { .. }))
    }

    pub fn is_invalid_attribute(e: &GraftError) -> bool {
        matches!(e.downcast_ref::<AttrError>(), Some(AttrError::InvalidAttribute { .. }))
    }

    /// Names the attribute a mismatch comes from, when the value was read
    /// detached from its adapter.
    pub fn for_attribute(self, name: &str) -> AttrError {
        match self {
            AttrError::KindMismatch { attribute: None, expected, found } => {
                AttrError::KindMismatch { attribute: Some(name.to_string()), expected, found }
            }
            other => other,
        }
    }
}

impl fmt::Display for AttrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttrError::UnsupportedCapability { framework, attribute, capability } => write!(
                f,
                "Attribute '{attribute}': {capability} are not supported by {framework}"
            ),
            AttrError::KindMismatch { attribute: Some(attribute), expected, found } => {
                write!(f, "Attribute '{attribute}': expected {expected}, found {found}")
            }
            AttrError::KindMismatch { attribute: None, expected, found } => {
                write!(f, "Expected {expected} attribute value, found {found}")
            }
            AttrError::MissingValue { attribute, expected } => {
                write!(f, "Attribute '{attribute}': expected {expected}, but no value is set")
            }
            AttrError::InvalidAttribute { operation, attribute, declared: Some(declared) } => {
                write!(f, "{operation}: required attribute '{attribute}' ")?;
                write!(f, "has unsupported type {declared:?}")
            }
            AttrError::InvalidAttribute { operation, attribute, declared: None } => {
                write!(f, "{operation}: required attribute '{attribute}' is missing")
            }
        }
    }
}

impl std::error::Error for AttrError {}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Context;

    #[test]
    fn recognizable_through_context() {
        let e: GraftError = AttrError::UnsupportedCapability {
            framework: "tensorflow",
            attribute: "body".into(),
            capability: "sub-graph attributes",
        }
        .into();
        let e = Err::<(), _>(e).context("Decoding node while_loop").unwrap_err();
        assert!(AttrError::is_unsupported_capability(&e));
        assert!(!AttrError::is_kind_mismatch(&e));
    }

    #[test]
    fn name_detached_mismatch() {
        let e = AttrError::KindMismatch {
            attribute: None,
            expected: AttributeValueKind::ScalarInt,
            found: AttributeValueKind::ListFloat,
        }
        .for_attribute("axis");
        assert_eq!(e.to_string(), "Attribute 'axis': expected int, found list(float)");
    }
}

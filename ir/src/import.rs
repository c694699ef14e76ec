//! Consumer side helpers: decode every attribute of one operation at once,
//! under a configurable policy for attributes the adapter cannot classify.

use std::collections::BTreeMap;
use std::collections::btree_map;

use anyhow::Context;

use crate::GraftResult;
use crate::attribute::{IrAttribute, SubgraphImporter};
use crate::errors::AttrError;
use crate::kind::AttributeValueKind;
use crate::value::AttrValue;
use tract_data::prelude::{DatumType, Tensor};

/// What to do when an attribute the target operation requires is `Invalid`
/// or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvalidAttributePolicy {
    /// Fail the whole import with [`AttrError::InvalidAttribute`].
    Abort,
    /// Give up on this operation only, and report it as skipped.
    SkipOperation,
    /// Drop the attribute and let the mapping deal with its absence.
    #[default]
    SkipAttribute,
}

/// Settings for [`decode_attributes`].
///
/// Attributes that are not required are always dropped quietly when they
/// are `Invalid`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportConfig {
    pub invalid_policy: InvalidAttributePolicy,
    pub required: Vec<String>,
}

impl ImportConfig {
    pub fn with_invalid_policy(self, invalid_policy: InvalidAttributePolicy) -> ImportConfig {
        ImportConfig { invalid_policy, ..self }
    }

    pub fn with_required<S: AsRef<str>>(mut self, names: &[S]) -> ImportConfig {
        self.required.extend(names.iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Decoded attributes of one operation, by name.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMap<G> {
    values: BTreeMap<String, AttrValue<G>>,
}

impl<G> Default for AttributeMap<G> {
    fn default() -> AttributeMap<G> {
        AttributeMap { values: BTreeMap::new() }
    }
}

impl<G> AttributeMap<G> {
    pub fn insert<S: Into<String>>(&mut self, name: S, value: AttrValue<G>) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AttrValue<G>> {
        self.values.iter()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue<G>> {
        self.values.get(name)
    }

    fn expect(&self, name: &str, expected: AttributeValueKind) -> GraftResult<&AttrValue<G>> {
        self.values
            .get(name)
            .ok_or_else(|| AttrError::MissingValue { attribute: name.to_string(), expected }.into())
    }

    pub fn get_float(&self, name: &str) -> GraftResult<f32> {
        let value = self.expect(name, AttributeValueKind::ScalarFloat)?;
        Ok(value.as_float().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_int(&self, name: &str) -> GraftResult<i64> {
        let value = self.expect(name, AttributeValueKind::ScalarInt)?;
        Ok(value.as_int().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_bool(&self, name: &str) -> GraftResult<bool> {
        let value = self.expect(name, AttributeValueKind::ScalarBool)?;
        Ok(value.as_bool().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_str(&self, name: &str) -> GraftResult<&str> {
        let value = self.expect(name, AttributeValueKind::ScalarString)?;
        Ok(value.as_str().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_shape(&self, name: &str) -> GraftResult<&[i64]> {
        let value = self.expect(name, AttributeValueKind::Shape)?;
        Ok(value.as_shape().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_ints(&self, name: &str) -> GraftResult<&[i64]> {
        let value = self.expect(name, AttributeValueKind::ListInt)?;
        Ok(value.as_ints().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_floats(&self, name: &str) -> GraftResult<&[f32]> {
        let value = self.expect(name, AttributeValueKind::ListFloat)?;
        Ok(value.as_floats().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_datum_type(&self, name: &str) -> GraftResult<DatumType> {
        let value = self.expect(name, AttributeValueKind::DataType)?;
        Ok(value.as_datum_type().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_tensor(&self, name: &str) -> GraftResult<&Tensor> {
        let value = self.expect(name, AttributeValueKind::Tensor)?;
        Ok(value.as_tensor().map_err(|e| e.for_attribute(name))?)
    }

    pub fn get_graph(&self, name: &str) -> GraftResult<&G> {
        let value = self.expect(name, AttributeValueKind::Graph)?;
        Ok(value.as_graph().map_err(|e| e.for_attribute(name))?)
    }
}

/// Outcome of decoding the attributes of one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedAttributes<G> {
    Decoded(AttributeMap<G>),
    /// The `SkipOperation` policy kicked in on `attribute`.
    Skipped { operation: String, attribute: String },
}

impl<G> DecodedAttributes<G> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, DecodedAttributes::Skipped { .. })
    }

    pub fn into_map(self) -> Option<AttributeMap<G>> {
        match self {
            DecodedAttributes::Decoded(map) => Some(map),
            DecodedAttributes::Skipped { .. } => None,
        }
    }
}

/// Decodes all `attributes` of `operation`.
///
/// Errors from the adapters (including
/// [`AttrError::UnsupportedCapability`]) always propagate. Only `Invalid`
/// or missing required attributes are subject to the policy.
pub fn decode_attributes<'a, A, R, I>(
    config: &ImportConfig,
    operation: &str,
    attributes: I,
    registry: &R,
) -> GraftResult<DecodedAttributes<R::Output>>
where
    A: IrAttribute<'a>,
    R: SubgraphImporter<A::Graph>,
    I: IntoIterator<Item = A>,
{
    let mut map = AttributeMap::default();
    let mut dropped: Vec<&str> = vec![];
    for attr in attributes {
        let name = attr.name();
        let decoded = attr
            .decode(registry)
            .with_context(|| format!("Decoding attribute '{name}' of {operation}"))?;
        match decoded {
            Some(value) => {
                trace!("{operation}: decoded '{name}' as {}", value.kind());
                map.insert(name, value);
            }
            None if config.is_required(name) => {
                let declared = Some(attr.declared_type().into_owned());
                if let Some(skipped) = apply_policy(config, operation, name, declared)? {
                    return Ok(skipped);
                }
                dropped.push(name);
            }
            None => {
                debug!(
                    "{operation}: ignoring attribute '{name}' of unknown type {:?}",
                    attr.declared_type()
                );
            }
        }
    }
    for required in &config.required {
        if !map.contains(required) && !dropped.contains(&required.as_str()) {
            if let Some(skipped) = apply_policy(config, operation, required, None)? {
                return Ok(skipped);
            }
        }
    }
    Ok(DecodedAttributes::Decoded(map))
}

fn apply_policy<G>(
    config: &ImportConfig,
    operation: &str,
    attribute: &str,
    declared: Option<String>,
) -> GraftResult<Option<DecodedAttributes<G>>> {
    match config.invalid_policy {
        InvalidAttributePolicy::Abort => Err(AttrError::InvalidAttribute {
            operation: operation.to_string(),
            attribute: attribute.to_string(),
            declared,
        }
        .into()),
        InvalidAttributePolicy::SkipOperation => {
            warn!("{operation}: skipping operation, required attribute '{attribute}' is unusable");
            Ok(Some(DecodedAttributes::Skipped {
                operation: operation.to_string(),
                attribute: attribute.to_string(),
            }))
        }
        InvalidAttributePolicy::SkipAttribute => {
            warn!("{operation}: required attribute '{attribute}' is unusable, dropping it");
            Ok(None)
        }
    }
}

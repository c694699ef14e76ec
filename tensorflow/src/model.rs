use std::collections::HashMap;
use std::fs;
use std::path::Path;

use graft_ir::internal::*;

use crate::attribute::TfAttribute;
use crate::tfpb::tensorflow::{GraphDef, NodeDef, OpDef, OpList};

/// Op definitions, by op name.
///
/// A `NodeDef` only carries the attributes its author set: the declared
/// types and the default values live in the `OpDef` of the node's op.
#[derive(Clone, Debug, Default)]
pub struct OpDefRegistry {
    ops: HashMap<String, OpDef>,
}

impl OpDefRegistry {
    pub fn insert(&mut self, op: OpDef) {
        if let Some(previous) = self.ops.insert(op.name.clone(), op) {
            debug!("Replacing op definition for {}", previous.name);
        }
    }

    pub fn from_op_list(list: OpList) -> OpDefRegistry {
        OpDefRegistry { ops: list.by_name() }
    }

    pub fn op_list_for_read(r: &mut dyn std::io::Read) -> GraftResult<OpDefRegistry> {
        let mut v = vec![];
        r.read_to_end(&mut v)?;
        Self::op_list_for_bytes(&v)
    }

    pub fn op_list_for_bytes(bytes: &[u8]) -> GraftResult<OpDefRegistry> {
        use prost::Message;
        let list = OpList::decode(bytes).context("Decoding OpList")?;
        Ok(Self::from_op_list(list))
    }

    pub fn for_path(p: impl AsRef<Path>) -> GraftResult<OpDefRegistry> {
        let file = fs::File::open(p.as_ref())
            .with_context(|| format!("Opening op list {:?}", p.as_ref()))?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::op_list_for_bytes(&mmap)
    }

    pub fn get(&self, op: &str) -> Option<&OpDef> {
        self.ops.get(op)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Pairs each attribute definition of the node's op with the value the
    /// node sets, or the definition default.
    ///
    /// Attributes with neither are left out. So are node attributes the op
    /// does not declare.
    pub fn attributes<'a>(&'a self, node: &'a NodeDef) -> GraftResult<Vec<TfAttribute<'a>>> {
        let Some(op) = self.ops.get(&node.op) else {
            bail!("No op definition for {} (node {})", node.op, node.name)
        };
        let mut attributes = Vec::with_capacity(op.attr.len());
        for def in &op.attr {
            match node.attr.get(&def.name).or(def.default_value.as_ref()) {
                Some(value) => attributes.push(TfAttribute::new(def, value)),
                None => debug!(
                    "{} ({}): no value nor default for attribute {}",
                    node.name, node.op, def.name
                ),
            }
        }
        for name in node.attr.keys() {
            if op.get_attr_def(name).is_none() {
                trace!("{} ({}): ignoring undeclared attribute {}", node.name, node.op, name);
            }
        }
        Ok(attributes)
    }
}

/// Reads TensorFlow graphs and decodes the attributes of their nodes.
#[derive(Clone, Debug, Default)]
pub struct Tensorflow {
    pub op_defs: OpDefRegistry,
    pub config: ImportConfig,
}

impl Tensorflow {
    pub fn with_op_defs(self, op_defs: OpDefRegistry) -> Tensorflow {
        Tensorflow { op_defs, ..self }
    }

    pub fn with_config(self, config: ImportConfig) -> Tensorflow {
        Tensorflow { config, ..self }
    }

    pub fn graph_for_path(&self, p: impl AsRef<Path>) -> GraftResult<GraphDef> {
        let file = fs::File::open(p.as_ref())
            .with_context(|| format!("Opening graph {:?}", p.as_ref()))?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        self.graph_for_bytes(&mmap)
    }

    pub fn graph_for_read(&self, r: &mut dyn std::io::Read) -> GraftResult<GraphDef> {
        let mut v = vec![];
        r.read_to_end(&mut v)?;
        self.graph_for_bytes(&v)
    }

    fn graph_for_bytes(&self, bytes: &[u8]) -> GraftResult<GraphDef> {
        use prost::Message;
        let graph = GraphDef::decode(bytes).context("Decoding GraphDef")?;
        trace!("Decoded graph with {} nodes", graph.node.len());
        Ok(graph)
    }

    pub fn node_attributes<'a>(&'a self, node: &'a NodeDef) -> GraftResult<Vec<TfAttribute<'a>>> {
        self.op_defs.attributes(node)
    }

    /// Decodes the attributes of a node, applying the import policy to the
    /// ones it can not read.
    pub fn decode_node_attributes(
        &self,
        node: &NodeDef,
    ) -> GraftResult<DecodedAttributes<GraphDef>> {
        let attributes = self.node_attributes(node)?;
        decode_attributes(&self.config, &node.name, attributes, &NativeSubgraphs)
            .with_context(|| format!("Decoding attributes of {} ({})", node.name, node.op))
    }
}

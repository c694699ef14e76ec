use std::fs;
use std::path::Path;

use graft_ir::internal::*;

use crate::attribute::OnnxAttribute;
use crate::pb::{GraphProto, ModelProto, NodeProto};

/// One adapter per attribute of the node, in the node's order.
pub fn node_attributes(node: &NodeProto) -> Vec<OnnxAttribute<'_>> {
    node.attribute.iter().map(OnnxAttribute::from_proto).collect()
}

/// Attributes of one node of a decoded graph.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedNode {
    pub name: String,
    pub op_type: String,
    pub attributes: DecodedAttributes<DecodedGraph>,
}

/// A graph whose node attributes are decoded, sub-graphs included.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DecodedGraph {
    pub name: String,
    pub nodes: Vec<DecodedNode>,
}

impl DecodedGraph {
    pub fn node(&self, name: &str) -> Option<&DecodedNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Reads ONNX models and decodes the attributes of their nodes.
///
/// `Onnx` is also the sub-graph importer for `GRAPH` and `GRAPHS`
/// attributes: they are decoded recursively with the same configuration.
#[derive(Clone, Debug, Default)]
pub struct Onnx {
    pub config: ImportConfig,
}

impl Onnx {
    pub fn with_config(self, config: ImportConfig) -> Onnx {
        Onnx { config }
    }

    pub fn model_for_path(&self, p: impl AsRef<Path>) -> GraftResult<ModelProto> {
        let file = fs::File::open(p.as_ref())
            .with_context(|| format!("Opening model {:?}", p.as_ref()))?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        self.model_for_bytes(&mmap)
    }

    pub fn model_for_read(&self, r: &mut dyn std::io::Read) -> GraftResult<ModelProto> {
        let mut v = vec![];
        r.read_to_end(&mut v)?;
        self.model_for_bytes(&v)
    }

    fn model_for_bytes(&self, bytes: &[u8]) -> GraftResult<ModelProto> {
        use prost::Message;
        let model = ModelProto::decode(bytes).context("Decoding ModelProto")?;
        trace!(
            "Decoded model from {:?} {:?} (ir version {})",
            model.producer_name,
            model.producer_version,
            model.ir_version
        );
        Ok(model)
    }

    pub fn decode_node_attributes<R>(
        &self,
        node: &NodeProto,
        registry: &R,
    ) -> GraftResult<DecodedAttributes<R::Output>>
    where
        R: SubgraphImporter<GraphProto>,
    {
        let operation = if node.name.is_empty() { &node.op_type } else { &node.name };
        decode_attributes(&self.config, operation, node_attributes(node), registry)
            .with_context(|| format!("Decoding attributes of {} ({})", operation, node.op_type))
    }

    pub fn decode_graph(&self, graph: &GraphProto) -> GraftResult<DecodedGraph> {
        let nodes = graph
            .node
            .iter()
            .map(|node| {
                Ok(DecodedNode {
                    name: node.name.clone(),
                    op_type: node.op_type.clone(),
                    attributes: self.decode_node_attributes(node, self)?,
                })
            })
            .collect::<GraftResult<Vec<_>>>()?;
        Ok(DecodedGraph { name: graph.name.clone(), nodes })
    }

    pub fn decode_model(&self, model: &ModelProto) -> GraftResult<DecodedGraph> {
        let graph = model.graph.as_ref().context("Model has no graph")?;
        self.decode_graph(graph)
    }
}

impl SubgraphImporter<GraphProto> for Onnx {
    type Output = DecodedGraph;

    fn import_subgraph(&self, graph: &GraphProto) -> GraftResult<DecodedGraph> {
        debug!("Decoding sub-graph {:?} ({} nodes)", graph.name, graph.node.len());
        self.decode_graph(graph)
    }
}

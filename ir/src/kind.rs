use std::fmt;

/// The kind of value an attribute holds.
///
/// Every attribute is assigned exactly one kind. `Invalid` is not an error:
/// it tells the consumer the declared type is unknown to the adapter, and
/// that the attribute should be ignored unless it is required.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeValueKind {
    ScalarFloat,
    ScalarInt,
    ScalarBool,
    ScalarString,
    Shape,
    Tensor,
    DataType,
    ListFloat,
    ListInt,
    ListBool,
    ListString,
    ListTensor,
    ListDataType,
    Graph,
    ListGraph,
    Invalid,
}

impl AttributeValueKind {
    pub const ALL: [AttributeValueKind; 16] = [
        AttributeValueKind::ScalarFloat,
        AttributeValueKind::ScalarInt,
        AttributeValueKind::ScalarBool,
        AttributeValueKind::ScalarString,
        AttributeValueKind::Shape,
        AttributeValueKind::Tensor,
        AttributeValueKind::DataType,
        AttributeValueKind::ListFloat,
        AttributeValueKind::ListInt,
        AttributeValueKind::ListBool,
        AttributeValueKind::ListString,
        AttributeValueKind::ListTensor,
        AttributeValueKind::ListDataType,
        AttributeValueKind::Graph,
        AttributeValueKind::ListGraph,
        AttributeValueKind::Invalid,
    ];

    pub fn is_valid(&self) -> bool {
        *self != AttributeValueKind::Invalid
    }

    pub fn is_list(&self) -> bool {
        use AttributeValueKind as K;
        matches!(
            self,
            K::ListFloat
                | K::ListInt
                | K::ListBool
                | K::ListString
                | K::ListTensor
                | K::ListDataType
                | K::ListGraph
        )
    }

    /// Kind of the items of a list kind. A shape is a list of ints. Other
    /// kinds are their own element kind.
    pub fn element_kind(&self) -> AttributeValueKind {
        use AttributeValueKind as K;
        match self {
            K::ListFloat => K::ScalarFloat,
            K::ListInt | K::Shape => K::ScalarInt,
            K::ListBool => K::ScalarBool,
            K::ListString => K::ScalarString,
            K::ListTensor => K::Tensor,
            K::ListDataType => K::DataType,
            K::ListGraph => K::Graph,
            other => *other,
        }
    }

    /// Can a value of this kind be read through the accessor of `requested`?
    ///
    /// Shapes and lists of ints are interchangeable, everything else must
    /// match exactly.
    pub fn reads_as(&self, requested: AttributeValueKind) -> bool {
        use AttributeValueKind as K;
        (*self == requested && *self != K::Invalid)
            || matches!((self, requested), (K::Shape, K::ListInt) | (K::ListInt, K::Shape))
    }

    pub fn tag(&self) -> &'static str {
        use AttributeValueKind as K;
        match self {
            K::ScalarFloat => "float",
            K::ScalarInt => "int",
            K::ScalarBool => "bool",
            K::ScalarString => "string",
            K::Shape => "shape",
            K::Tensor => "tensor",
            K::DataType => "type",
            K::ListFloat => "list(float)",
            K::ListInt => "list(int)",
            K::ListBool => "list(bool)",
            K::ListString => "list(string)",
            K::ListTensor => "list(tensor)",
            K::ListDataType => "list(type)",
            K::Graph => "graph",
            K::ListGraph => "list(graph)",
            K::Invalid => "invalid",
        }
    }
}

impl fmt::Display for AttributeValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

use crate::{Nature, NodeId, Type};

/// The literal payload carried by leaf nodes. Structural and operator nodes carry
/// [`Literal::None`].
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    None,
    /// 64-bit payload for `IntVal`/`BoolVal` (booleans are stored as `0`/`1`).
    Int(i64),
    Str(String),
    /// The spelling of an `Ident` node, or of a declarator under a `Decl`.
    Ident(String),
}

/// One node of a mini-C AST.
///
/// `operands` holds up to four child ids. A `None` entry models an absent optional operand
/// (e.g. the init/cond/step slots of a `For` node); `Decl`'s second operand is `None` when the
/// declaration has no initializer.
#[derive(Clone, Debug)]
pub struct Node {
    pub nature: Nature,
    pub lineno: u32,
    pub operands: Vec<Option<NodeId>>,
    pub literal: Literal,

    /// Resolved by pass 1. For expression nodes, the node's type. For a `TypeToken` node, the
    /// type it denotes (populated when the token is built, since that value is a literal of the
    /// surface grammar rather than something the analyzer infers).
    pub ty: Option<Type>,
    /// Resolved by pass 1: storage offset (global data-segment address, or frame displacement).
    pub offset: Option<i32>,
    /// Resolved by pass 1: whether the declaration this identifier denotes (or refers to) is global.
    pub global_decl: bool,
    /// Resolved by pass 1: non-owning back-reference from an `Ident` use to its declaration.
    pub decl_node: Option<NodeId>,
}

impl Node {
    pub fn new(nature: Nature, lineno: u32, operands: Vec<Option<NodeId>>) -> Node {
        Node {
            nature,
            lineno,
            operands,
            literal: Literal::None,
            ty: None,
            offset: None,
            global_decl: false,
            decl_node: None,
        }
    }

    pub fn opr(&self, index: usize) -> Option<NodeId> {
        self.operands.get(index).copied().flatten()
    }

    /// The declared/resolved type. Panics if pass 1 (or construction, for a `TypeToken`) has
    /// not populated it yet; callers in the generator rely on pass 1 having already run.
    pub fn ty(&self) -> Type {
        self.ty
            .unwrap_or_else(|| panic!("node at line {} has no resolved type", self.lineno))
    }

    pub fn ident(&self) -> &str {
        match &self.literal {
            Literal::Ident(name) => name,
            _ => panic!("node at line {} is not an identifier", self.lineno),
        }
    }

    pub fn int_value(&self) -> i64 {
        match self.literal {
            Literal::Int(v) => v,
            _ => panic!("node at line {} has no integer literal", self.lineno),
        }
    }

    pub fn str_value(&self) -> &str {
        match &self.literal {
            Literal::Str(s) => s,
            _ => panic!("node at line {} is not a string literal", self.lineno),
        }
    }
}

/// Discriminator for every kind of node that can appear in a mini-C AST.
///
/// One variant per nature, matched exhaustively by both passes — a nature added here without a
/// corresponding arm in the semantic pass or the generator fails to compile rather than silently
/// falling through a `default` case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Nature {
    // Structural
    List,
    Decls,
    Decl,
    Block,
    Print,

    // Statements
    If,
    While,
    For,
    DoWhile,

    // Arithmetic expressions
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    UMinus,

    // Relational
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,

    // Logical
    And,
    Or,
    Not,

    // Bitwise
    BAnd,
    BOr,
    BXor,
    BNot,
    Sll,
    Sra,
    Srl,

    // Assignment
    Affect,

    // Leaves
    Ident,
    IntVal,
    BoolVal,
    StringVal,

    /// Appears only as the first operand of a `Decls` node; carries the declared type in
    /// `Node::ty`, populated at construction time by [`Ast::type_token`](crate::Ast::type_token).
    TypeToken,
}

//! Rule codes attached to semantic diagnostics, matching the clauses of the language
//! specification this analyzer implements.

pub const MAIN_MISNAMED_OR_NOT_VOID: &str = "1.4";
pub const VOID_VARIABLE: &str = "1.8";
pub const DUPLICATE_DECLARATION: &str = "1.11";
pub const BAD_GLOBAL_INITIALIZER: &str = "1.12";
pub const BAD_LOCAL_INITIALIZER: &str = "1.13";
pub const NON_BOOLEAN_IF_CONDITION: &str = "1.18";
pub const NON_BOOLEAN_WHILE_CONDITION: &str = "1.20";
pub const NON_BOOLEAN_FOR_CONDITION: &str = "1.21";
pub const NON_BOOLEAN_DOWHILE_CONDITION: &str = "1.22";
pub const BINARY_TYPE_MISMATCH: &str = "1.30";
pub const UNARY_TYPE_MISMATCH: &str = "1.31";
pub const INVALID_ASSIGNMENT: &str = "1.32";
pub const UNDECLARED_IDENTIFIER: &str = "1.61";

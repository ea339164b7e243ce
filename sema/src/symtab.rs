use minicc_ast::NodeId;
use std::collections::HashMap;

/// The lexically-scoped symbol table driving pass 1: a stack of scopes, the bottom one global.
///
/// An explicit, independently-instantiable value rather than a process-wide singleton, so tests
/// (and, in principle, concurrent compilations of independent programs) never share state.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, NodeId>>,
    global_offset: i32,
    local_offset: i32,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Resets the table to a single, empty global scope.
    pub fn push_global_context(&mut self) {
        self.scopes.clear();
        self.scopes.push(HashMap::new());
        self.global_offset = 0;
        log::trace!("symbol table: opened global scope");
    }

    pub fn push_context(&mut self) {
        self.scopes.push(HashMap::new());
        log::trace!("symbol table: opened scope (depth {})", self.scopes.len());
    }

    pub fn pop_context(&mut self) {
        self.scopes
            .pop()
            .expect("pop_context called without a matching push_context");
        log::trace!("symbol table: closed scope (depth {})", self.scopes.len());
    }

    fn in_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Inserts `name` bound to `node` into the top scope and assigns its storage offset.
    ///
    /// Returns `Err(())` if `name` is already declared in the top scope; the caller attaches the
    /// `1.11` rule code, since this layer only knows about scoping, not diagnostics.
    pub fn env_add_element(&mut self, name: &str, node: NodeId) -> Result<i32, ()> {
        let is_global = self.in_global_scope();
        let offset = if is_global {
            self.global_offset
        } else {
            self.local_offset
        };

        {
            let top = self.scopes.last_mut().expect("no scope is open");
            if top.contains_key(name) {
                return Err(());
            }
            top.insert(name.to_owned(), node);
        }

        if is_global {
            self.global_offset += 4;
        } else {
            self.local_offset += 4;
        }

        log::debug!(
            "declared '{}' at offset {} ({})",
            name,
            offset,
            if is_global { "global" } else { "local" }
        );
        Ok(offset)
    }

    /// Looks up `name` from the top scope down to global. Shadowing is permitted across scopes.
    pub fn get_decl_node(&self, name: &str) -> Option<NodeId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).copied())
    }

    pub fn reset_env_current_offset(&mut self) {
        self.local_offset = 0;
    }

    pub fn get_env_current_offset(&self) -> i32 {
        self.local_offset
    }

    /// Total bytes consumed by global declarations so far. Read once, after the global
    /// declaration list has been fully processed, to give the code generator the data-segment
    /// byte count it needs to place the string pool right after the globals region.
    pub fn get_global_offset(&self) -> i32 {
        self.global_offset
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn global_offsets_increment_by_four() {
        let mut table = SymbolTable::new();
        table.push_global_context();

        assert_eq!(table.env_add_element("a", 0).unwrap(), 0);
        assert_eq!(table.env_add_element("b", 1).unwrap(), 4);
        assert_eq!(table.env_add_element("c", 2).unwrap(), 8);
    }

    #[test]
    fn duplicate_declaration_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.push_global_context();

        table.env_add_element("a", 0).unwrap();
        assert_eq!(table.env_add_element("a", 1), Err(()));
    }

    #[test]
    fn local_shadows_global_without_reusing_its_offset() {
        let mut table = SymbolTable::new();
        table.push_global_context();
        table.env_add_element("a", 0).unwrap();

        table.push_context();
        table.reset_env_current_offset();
        assert_eq!(table.env_add_element("a", 1).unwrap(), 0);
        assert_eq!(table.get_decl_node("a"), Some(1));

        table.pop_context();
        assert_eq!(table.get_decl_node("a"), Some(0));
    }

    #[test]
    fn nested_blocks_do_not_reset_the_local_offset() {
        let mut table = SymbolTable::new();
        table.push_global_context();
        table.push_context();
        table.reset_env_current_offset();

        table.env_add_element("a", 0).unwrap();
        table.push_context();
        assert_eq!(table.env_add_element("b", 1).unwrap(), 4);
        table.pop_context();

        assert_eq!(table.get_env_current_offset(), 8);
    }
}

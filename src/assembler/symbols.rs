//! The symbol table maps labels, variables and the predefined
//! register names to addresses for the duration of a single assembly run.
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Highest address an instruction can carry. The leading bit of
/// every 16 bit word is taken by the instruction tag.
pub const MAX_ADDRESS: u16 = 32767;

/// First RAM address handed out to variables.
pub const VARIABLE_BASE: u16 = 16;

const PREDEFINED: [(&str, u16); 23] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", 16384),
    ("KBD", 24576),
];

#[derive(Clone, Debug)]
pub struct SymbolTable {
    table: HashMap<String, u16>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table holding only the predefined symbols.
    pub fn new() -> Self {
        let table = PREDEFINED
            .iter()
            .map(|(name, address)| (name.to_string(), *address))
            .collect();
        SymbolTable { table, next_variable: VARIABLE_BASE }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.table.get(name).copied()
    }

    /// Binds a label to an instruction index.
    ///
    /// Fails if the name is already bound to anything, including address 0
    /// and the predefined symbols.
    pub fn bind_label(&mut self, name: &str, index: usize, line: usize) -> Result<()> {
        if self.contains(name) {
            return Err(Error::DuplicateLabel { label: name.to_owned(), line });
        }
        if index > usize::from(MAX_ADDRESS) {
            return Err(Error::AddressOverflow { value: index as u64, line });
        }
        self.table.insert(name.to_owned(), index as u16);
        Ok(())
    }

    /// Returns the address bound to `name`, allocating the next
    /// free variable address if the name has not been seen yet.
    pub fn resolve(&mut self, name: &str, line: usize) -> Result<u16> {
        if let Some(address) = self.get(name) {
            return Ok(address);
        }

        let address = self.next_variable;
        if address > MAX_ADDRESS {
            return Err(Error::AddressOverflow { value: u64::from(address), line });
        }
        debug!("allocated variable `{}` at {}", name, address);
        self.table.insert(name.to_owned(), address);
        self.next_variable += 1;
        Ok(address)
    }
}

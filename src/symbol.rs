//! Symbol and function tables shared between the pipeline stages.

use std::collections::HashMap;

use crate::interpreter::Value;
use crate::lexer::TypeName;

/// One declared variable: its current value and where it was declared.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub value: Value,
    pub declared_line: Option<usize>,
}

/// A flat name-to-entry table. The parser fills it with declarations, the
/// executor mutates values in place; function calls get their own table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: HashMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn declare(&mut self, name: impl Into<String>, value: Value, line: usize) {
        self.entries.insert(
            name.into(),
            SymbolEntry {
                value,
                declared_line: Some(line),
            },
        );
    }

    /// Insert without a declaration site (function parameters, `IT`).
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(
            name.into(),
            SymbolEntry {
                value,
                declared_line: None,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.value)
    }

    /// Overwrite an existing entry's value, keeping its declaration site.
    /// Returns false if the name was never declared.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name, for table rendering.
    pub fn sorted(&self) -> Vec<(&str, &SymbolEntry)> {
        let mut rows: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        rows.sort_by_key(|(name, _)| *name);
        rows
    }
}

/// A function parameter. The declared type starts as [`TypeName::Noob`]
/// and is refined by the analyzer once call sites are seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
}

/// A function's signature and the token range of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub name: String,
    pub params: Vec<Param>,
    pub declared_line: usize,
    /// Token index of the `HOW IZ I` keyword, filled by the executor's
    /// pre-pass so calls can jump straight to the body.
    pub body_start: Option<usize>,
}

impl FunctionSig {
    pub fn new(name: impl Into<String>, declared_line: usize) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            declared_line,
            body_start: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Look up a function by name.
pub fn find_function<'a>(functions: &'a [FunctionSig], name: &str) -> Option<&'a FunctionSig> {
    functions.iter().find(|f| f.name == name)
}

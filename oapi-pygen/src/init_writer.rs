use derive_more::{Display, Error};
use genco::{lang::python, quote};

use crate::python::string_literal;

#[derive(Debug, Display, Error)]
pub enum InitWriterError {}

/// Writes the package `__init__.py` re-exporting the client class.
pub struct InitWriter<'a> {
    client_class: &'a str,
}

impl<'a> InitWriter<'a> {
    pub fn new(client_class: &'a str) -> Self {
        InitWriter { client_class }
    }

    pub fn write(&self) -> Result<python::Tokens, InitWriterError> {
        let mut tokens = python::Tokens::new();
        // the name is only re-exported, so the import is written out by hand
        tokens.append(format!("from .client import {}", self.client_class));
        tokens.line();
        tokens.append(quote!(__all__ = [$(string_literal(self.client_class))]));
        Ok(tokens)
    }
}

use derive_more::{Display, Error};
use genco::{lang::python, quote};

use crate::{analyzer::AnalysisResult, python::string_literal};

#[derive(Debug, Display, Error)]
pub enum EndpointsWriterError {}

/// Writes the `Endpoints` registry: one path template per operation.
pub struct EndpointsWriter<'a> {
    analysis: &'a AnalysisResult,
    base_url: &'a str,
}

impl<'a> EndpointsWriter<'a> {
    pub fn new(analysis: &'a AnalysisResult, base_url: &'a str) -> Self {
        EndpointsWriter { analysis, base_url }
    }

    pub fn write(&self) -> Result<python::Tokens, EndpointsWriterError> {
        let endpoint = python::import("apiclient", "endpoint");
        let operations = self.analysis.operations();

        let mut tokens = python::Tokens::new();
        tokens.append(quote!(@$endpoint(base_url=$(string_literal(self.base_url)))));
        tokens.push();
        tokens.append(quote!(class Endpoints:));
        tokens.indent();
        if operations.is_empty() {
            tokens.append(quote!(pass));
        }
        for (idx, o) in operations.iter().enumerate() {
            if idx > 0 {
                tokens.push();
            }
            tokens.append(quote!($(o.name()) = $(string_literal(o.path()))));
        }
        tokens.unindent();

        Ok(tokens)
    }
}

use derive_more::{Display, Error};
use genco::{lang::python, quote};
use serde::Serialize;

use crate::{
    analyzer::{AnalysisResult, ArgumentKind, OperationDef},
    python::{docstring, HintContext, MODELS_MODULE},
};

#[derive(Debug, Display, Error)]
pub enum ClientWriterError {
    #[display(fmt = "Invalid base API client class `{}`", _0)]
    InvalidBaseClass(#[error(not(source))] String),
}

/// A class given by its dotted path, `apiclient.APIClient` or a bare `APIClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPath {
    pub module: Option<String>,
    pub name: String,
}

impl ClassPath {
    pub fn parse(path: &str) -> Result<Self, ClientWriterError> {
        let invalid = || ClientWriterError::InvalidBaseClass(path.to_owned());
        let (module, name) = match path.rsplit_once('.') {
            Some((module, name)) if !module.is_empty() => (Some(module.to_owned()), name),
            Some(_) => return Err(invalid()),
            None => (None, path),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(invalid());
        }
        Ok(ClassPath {
            module,
            name: name.to_owned(),
        })
    }

    fn to_tokens(&self) -> python::Tokens {
        match &self.module {
            Some(module) => quote!($(python::import(module.clone(), self.name.clone()))),
            None => quote!($(self.name.as_str())),
        }
    }
}

/// Writes `{prefix}APIClient` with one method per operation.
pub struct ClientWriter<'a> {
    analysis: &'a AnalysisResult,
    prefix: &'a str,
    base_class: &'a ClassPath,
}

impl<'a> ClientWriter<'a> {
    pub fn new(analysis: &'a AnalysisResult, prefix: &'a str, base_class: &'a ClassPath) -> Self {
        ClientWriter {
            analysis,
            prefix,
            base_class,
        }
    }

    pub fn class_name(&self) -> String {
        format!("{}APIClient", self.prefix)
    }

    pub fn write(&self) -> Result<python::Tokens, ClientWriterError> {
        let ctx = self.analysis.hint_context(Some(MODELS_MODULE));
        let serialize_all_methods = python::import("apiclient_pydantic", "serialize_all_methods");
        let operations = self.analysis.operations();

        let mut tokens = python::Tokens::new();
        tokens.append(quote!(@$serialize_all_methods()));
        tokens.push();
        tokens.append(quote!(class $(self.class_name())($(self.base_class.to_tokens())):));
        tokens.indent();
        if operations.is_empty() {
            tokens.append(quote!(pass));
        }
        for (idx, o) in operations.iter().enumerate() {
            if idx > 0 {
                tokens.line();
            }
            tokens.append(self.write_operation(&ctx, o));
        }
        tokens.unindent();

        Ok(tokens)
    }

    /// The method's `def` line, without the trailing colon.
    pub fn write_operation_function_signature(
        ctx: &HintContext<'_>,
        o: &OperationDef,
    ) -> python::Tokens {
        let mut tokens = python::Tokens::new();
        tokens.append(format!("def {}(self", o.name()));
        for a in o.arguments() {
            tokens.append(format!(", {}: ", a.name()));
            tokens.append(a.type_hint().to_tokens(ctx));
            if !a.required() {
                tokens.append(" = None");
            }
        }
        tokens.append(") -> ");
        tokens.append(o.response().to_tokens(ctx));
        tokens
    }

    fn write_operation(&self, ctx: &HintContext<'_>, o: &OperationDef) -> python::Tokens {
        let endpoints = python::import(".endpoints", "Endpoints");
        let endpoint = match o.path_params() {
            Some(_) => quote!($endpoints.$(o.name()).format(**path_params)),
            None => quote!($endpoints.$(o.name())),
        };

        let mut call_args = vec![endpoint];
        if o.sends_body() {
            let data = match o.request_body() {
                Some(_) => "body",
                None => "None",
            };
            call_args.push(quote!(data=$data));
        }
        if o.arguments().iter().any(|a| a.kind() == ArgumentKind::QueryParams) {
            call_args.push(quote!(params=query_params));
        }

        let mut tokens = python::Tokens::new();
        tokens.append(Self::write_operation_function_signature(ctx, o));
        tokens.append(":");
        tokens.indent();
        let text = match (o.summary(), o.description()) {
            (Some(summary), Some(description)) if summary != description => {
                Some(format!("{}\n\n{}", summary, description))
            }
            (Some(summary), _) => Some(summary.to_owned()),
            (None, description) => description.map(str::to_owned),
        };
        if let Some(text) = text {
            tokens.append(docstring(&text));
            tokens.push();
        }
        tokens.append(quote! {
            return self.$(o.http_method())($(for a in call_args join (, ) => $a))
        });
        tokens.unindent();
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Analyzer;

    const DOCUMENT: &str = r##"{
        "openapi": "3.0.0",
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "summary": "List all pets",
                    "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}}],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": {"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}}}
                        }
                    }
                },
                "post": {
                    "operationId": "createPet",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                    },
                    "responses": {"201": {"description": "created"}}
                }
            },
            "/pets/{petId}": {
                "delete": {
                    "operationId": "deletePet",
                    "parameters": [{"name": "petId", "in": "path", "required": true, "schema": {"type": "integer"}}],
                    "responses": {"204": {"description": "deleted"}}
                }
            }
        },
        "components": {
            "schemas": {
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}}
            }
        }
    }"##;

    fn render(document: &str, prefix: &str, base: &str) -> String {
        let analysis = Analyzer::new().run(document).expect("analysis");
        let base = ClassPath::parse(base).expect("class path");
        ClientWriter::new(&analysis, prefix, &base)
            .write()
            .expect("client")
            .to_file_string()
            .expect("render")
    }

    #[test]
    fn writes_one_method_per_operation() {
        let client = render(DOCUMENT, "Pet", "apiclient.APIClient");

        assert!(client.contains("from apiclient import APIClient"));
        assert!(client.contains("from apiclient_pydantic import serialize_all_methods"));
        assert!(client.contains("from .endpoints import Endpoints"));
        assert!(client.contains("@serialize_all_methods()\nclass PetAPIClient(APIClient):\n"));
        assert_eq!(client.matches("    def ").count(), 3);

        assert!(client.contains(
            "    def list_pets(self, query_params: Optional[ListPetsQueryParams] = None) -> List[Pet]:\n        \"\"\"List all pets\"\"\"\n        return self.get(Endpoints.list_pets, params=query_params)"
        ));
        assert!(client.contains(
            "    def create_pet(self, body: Pet) -> None:\n        return self.post(Endpoints.create_pet, data=body)"
        ));
        assert!(client.contains(
            "    def delete_pet(self, path_params: DeletePetPathParams) -> None:\n        return self.delete(Endpoints.delete_pet.format(**path_params))"
        ));
    }

    fn imports(source: &str, module: &str) -> Vec<String> {
        let prefix = format!("from {} import ", module);
        source
            .lines()
            .filter_map(|l| l.strip_prefix(prefix.as_str()))
            .flat_map(|names| names.split(", "))
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn imports_used_models_only_from_models_module() {
        let client = render(DOCUMENT, "My", "apiclient.APIClient");
        assert_eq!(
            imports(&client, ".models"),
            vec!["DeletePetPathParams", "ListPetsQueryParams", "Pet"]
        );
        assert_eq!(imports(&client, "typing"), vec!["List", "Optional"]);
    }

    #[test]
    fn empty_client_has_pass_body() {
        let client = render(r#"{"openapi": "3.0.0", "paths": {}}"#, "My", "Base");
        assert!(client.contains("class MyAPIClient(Base):\n    pass"));
        assert!(!client.contains("def "));
    }

    #[test]
    fn parses_class_paths() {
        assert_eq!(
            ClassPath::parse("my.pkg.Client").expect("valid"),
            ClassPath {
                module: Some("my.pkg".to_owned()),
                name: "Client".to_owned()
            }
        );
        assert!(ClassPath::parse(".Client").is_err());
        assert!(ClassPath::parse("pkg.").is_err());
        assert!(ClassPath::parse("pkg.Not-Valid").is_err());
    }
}

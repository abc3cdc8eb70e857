//! User supplied Handlebars templates standing in for the built-in writers of
//! `endpoints.py`, `client.py` and `__init__.py`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error};
use handlebars::{handlebars_helper, Handlebars};
use log::{debug, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::{
    analyzer::{AnalysisResult, OperationDef},
    client_writer::ClassPath,
    python::MODELS_MODULE,
    renamer::{camel_case, pascal_case, snake_case},
    spec::{Info, Server},
};

/// File always produced by the models writer.
const MODELS_FILE: &str = "models.py";

#[derive(Debug, Display, Error)]
pub enum TemplateError {
    #[display(fmt = "Failed to list templates: {}", _0)]
    Walk(walkdir::Error),

    #[display(fmt = "Failed to read template {:?}: {}", path, source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[display(fmt = "Invalid template: {}", _0)]
    Syntax(handlebars::TemplateError),

    #[display(fmt = "Failed to render template: {}", _0)]
    Render(handlebars::RenderError),
}

handlebars_helper!(snakecase: |s: str| snake_case(s));
handlebars_helper!(pascalcase: |s: str| pascal_case(s));
handlebars_helper!(camelcase: |s: str| camel_case(s));

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentView {
    pub name: &'static str,
    pub type_hint: String,
    pub required: bool,
    /// `name: Type` or `name: Optional[Type] = None`
    pub declaration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationView {
    pub name: String,
    pub method: String,
    pub path: String,
    pub snake_case_path: String,
    pub arguments: Vec<ArgumentView>,
    pub response: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub path_params: Option<String>,
    pub query_params: Option<String>,
    pub body: Option<String>,
    pub sends_body: bool,
}

impl OperationView {
    fn new(o: &OperationDef, standard_collections: bool) -> Self {
        OperationView {
            name: o.name().to_owned(),
            method: o.http_method(),
            path: o.path().to_owned(),
            snake_case_path: o.snake_case_path(),
            arguments: o
                .arguments()
                .iter()
                .map(|a| ArgumentView {
                    name: a.name(),
                    type_hint: a.type_hint().render(standard_collections),
                    required: a.required(),
                    declaration: a.render(standard_collections),
                })
                .collect(),
            response: o.response().render(standard_collections),
            summary: o.summary().map(str::to_owned),
            description: o.description().map(str::to_owned),
            tags: o.tags().to_vec(),
            path_params: o.path_params().map(|p| p.model().to_owned()),
            query_params: o.query_params().map(|p| p.model().to_owned()),
            body: o
                .request_body()
                .map(|b| b.type_hint().render(standard_collections)),
            sends_body: o.sends_body(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext<'a> {
    pub operations: Vec<OperationView>,
    /// `from module import A, B` lines for every type the operations mention
    pub imports: Vec<String>,
    pub info: &'a Info,
    pub servers: &'a [Server],
    pub base_url: &'a str,
    pub prefix_cls: &'a str,
    pub base_cls: &'a ClassPath,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        analysis: &'a AnalysisResult,
        base_url: &'a str,
        prefix_cls: &'a str,
        base_cls: &'a ClassPath,
    ) -> Self {
        let ctx = analysis.hint_context(Some(MODELS_MODULE));
        let mut imports: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for o in analysis.operations() {
            let hints = o
                .arguments()
                .into_iter()
                .map(|a| a.type_hint())
                .chain([o.response().clone()]);
            for hint in hints {
                for (module, name) in hint.imports(&ctx) {
                    let names = imports.entry(module).or_default();
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }

        TemplateContext {
            operations: analysis
                .operations()
                .iter()
                .map(|o| OperationView::new(o, ctx.standard_collections))
                .collect(),
            imports: imports
                .into_iter()
                .map(|(module, mut names)| {
                    names.sort();
                    format!("from {} import {}", module, names.join(", "))
                })
                .collect(),
            info: &analysis.spec().info,
            servers: &analysis.spec().servers,
            base_url,
            prefix_cls,
            base_cls,
        }
    }
}

pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    /// Registered template names with the file each one renders to.
    outputs: Vec<(String, PathBuf)>,
}

impl TemplateRenderer {
    /// Registers every file below `dir`, in file name order.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("snakecase", Box::new(snakecase));
        handlebars.register_helper("pascalcase", Box::new(pascalcase));
        handlebars.register_helper("camelcase", Box::new(camelcase));

        let mut outputs = vec![];
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(TemplateError::Walk)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            let output = relative.with_extension("py");
            if output == Path::new(MODELS_FILE) {
                warn!("ignoring template {}, models are always generated", relative.display());
                continue;
            }

            let name = relative.to_string_lossy().replace('\\', "/");
            let source = fs::read_to_string(entry.path()).map_err(|source| TemplateError::Read {
                path: entry.path().to_owned(),
                source,
            })?;
            handlebars
                .register_template_string(&name, source)
                .map_err(TemplateError::Syntax)?;
            debug!("registered template {} for {}", name, output.display());
            outputs.push((name, output));
        }

        Ok(TemplateRenderer {
            handlebars,
            outputs,
        })
    }

    /// Renders every template, keyed by output path relative to the package.
    pub fn render(
        &self,
        context: &TemplateContext<'_>,
    ) -> Result<BTreeMap<PathBuf, String>, TemplateError> {
        self.outputs
            .iter()
            .map(|(name, output)| {
                let rendered = self
                    .handlebars
                    .render(name, context)
                    .map_err(TemplateError::Render)?;
                Ok((output.clone(), rendered))
            })
            .collect()
    }
}

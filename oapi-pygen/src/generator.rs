use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error};
use genco::lang::python;
use log::{debug, info};

use crate::{
    analyzer::{AnalysisError, AnalysisResult, Analyzer},
    client_writer::{ClassPath, ClientWriter, ClientWriterError},
    config::CodegenConfig,
    endpoints_writer::{EndpointsWriter, EndpointsWriterError},
    format::{ensure_final_newline, CodeFormatter, FormatError, Passthrough},
    init_writer::{InitWriter, InitWriterError},
    models_writer::{ModelsWriter, ModelsWriterError},
    template::{TemplateContext, TemplateError, TemplateRenderer},
};

#[derive(Debug, Display, Error)]
pub enum GenerateError {
    #[display(fmt = "{}", _0)]
    Analysis(AnalysisError),

    #[display(fmt = "{}", _0)]
    Models(ModelsWriterError),

    #[display(fmt = "{}", _0)]
    Endpoints(EndpointsWriterError),

    #[display(fmt = "{}", _0)]
    Client(ClientWriterError),

    #[display(fmt = "{}", _0)]
    Init(InitWriterError),

    #[display(fmt = "{}", _0)]
    Template(TemplateError),

    #[display(fmt = "Failed to format {:?}: {}", path, source)]
    Format { path: PathBuf, source: FormatError },

    #[display(fmt = "Failed to render python code: {}", _0)]
    Render(std::fmt::Error),

    #[display(fmt = "Failed to write {:?}: {}", path, source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    /// Base URL given to the `Endpoints` registry.
    pub base_url: String,
    /// The client class is named `{prefix}APIClient`.
    pub prefix: String,
    /// Dotted path of the client's base class.
    pub base_api_cls: String,
    /// Templates replacing the built-in client, endpoints and package files.
    pub template_dir: Option<PathBuf>,
    pub config: CodegenConfig,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            base_url: String::new(),
            prefix: "My".to_owned(),
            base_api_cls: "apiclient.APIClient".to_owned(),
            template_dir: None,
            config: CodegenConfig::default(),
        }
    }
}

pub struct Generator {
    options: GeneratorOptions,
    formatter: Box<dyn CodeFormatter>,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Generator {
            options,
            formatter: Box::new(Passthrough),
        }
    }

    pub fn with_formatter(mut self, formatter: Box<dyn CodeFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Renders the package as file contents keyed by path relative to the output directory.
    pub fn render(
        &self,
        input_name: &str,
        text: &str,
    ) -> Result<BTreeMap<PathBuf, String>, GenerateError> {
        let analysis = Analyzer::with_config(self.options.config.clone())
            .run(text)
            .map_err(GenerateError::Analysis)?;
        info!(
            "{}: {} operations, {} models",
            input_name,
            analysis.operations().len(),
            analysis.models().len()
        );

        let mut files = BTreeMap::new();
        files.insert(PathBuf::from("models.py"), self.render_models(&analysis, input_name)?);

        let base_cls =
            ClassPath::parse(&self.options.base_api_cls).map_err(GenerateError::Client)?;
        match &self.options.template_dir {
            Some(dir) => {
                let context = TemplateContext::new(
                    &analysis,
                    &self.options.base_url,
                    &self.options.prefix,
                    &base_cls,
                );
                let rendered = TemplateRenderer::from_dir(dir)
                    .and_then(|r| r.render(&context))
                    .map_err(GenerateError::Template)?;
                files.extend(rendered);
            }
            None => {
                let client = ClientWriter::new(&analysis, &self.options.prefix, &base_cls);
                files.insert(
                    PathBuf::from("endpoints.py"),
                    file_string(
                        EndpointsWriter::new(&analysis, &self.options.base_url)
                            .write()
                            .map_err(GenerateError::Endpoints)?,
                    )?,
                );
                files.insert(
                    PathBuf::from("client.py"),
                    file_string(client.write().map_err(GenerateError::Client)?)?,
                );
                files.insert(
                    PathBuf::from("__init__.py"),
                    file_string(
                        InitWriter::new(&client.class_name())
                            .write()
                            .map_err(GenerateError::Init)?,
                    )?,
                );
            }
        }

        files
            .into_iter()
            .map(|(path, code)| {
                debug!("formatting {} with {}", path.display(), self.formatter.name());
                let code = self
                    .formatter
                    .format_code(&code)
                    .map_err(|source| GenerateError::Format {
                        path: path.clone(),
                        source,
                    })?;
                Ok((path, ensure_final_newline(&code)))
            })
            .collect()
    }

    /// Renders the package and writes it below `output_dir`, returning the written files.
    pub fn generate(
        &self,
        input_name: &str,
        text: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, GenerateError> {
        let files = self.render(input_name, text)?;

        let mut written = vec![];
        for (relative, code) in files {
            let path = output_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
                    path: parent.to_owned(),
                    source,
                })?;
            }
            fs::write(&path, code).map_err(|source| GenerateError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }

    fn render_models(
        &self,
        analysis: &AnalysisResult,
        input_name: &str,
    ) -> Result<String, GenerateError> {
        let tokens = ModelsWriter::new(analysis)
            .write()
            .map_err(GenerateError::Models)?;
        Ok(format!(
            "# generated by oapi-pygen\n#   filename:  {}\n\nfrom __future__ import annotations\n\n{}",
            input_name,
            file_string(tokens)?
        ))
    }
}

fn file_string(tokens: python::Tokens) -> Result<String, GenerateError> {
    tokens.to_file_string().map_err(GenerateError::Render)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_files_for_an_empty_document() {
        let files = Generator::new(GeneratorOptions::default())
            .render("empty.yaml", "openapi: 3.0.0\npaths: {}\n")
            .expect("render");

        assert_eq!(
            files.keys().cloned().collect::<Vec<_>>(),
            vec![
                PathBuf::from("__init__.py"),
                PathBuf::from("client.py"),
                PathBuf::from("endpoints.py"),
                PathBuf::from("models.py"),
            ]
        );
        assert!(files[Path::new("client.py")].contains("class MyAPIClient(APIClient):\n    pass\n"));
        assert!(files[Path::new("models.py")].starts_with(
            "# generated by oapi-pygen\n#   filename:  empty.yaml\n\nfrom __future__ import annotations\n"
        ));
        assert!(files.values().all(|code| code.ends_with('\n') && !code.ends_with("\n\n")));
    }

    #[test]
    fn reports_invalid_base_class() {
        let options = GeneratorOptions {
            base_api_cls: "apiclient.".to_owned(),
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            Generator::new(options).render("x.json", r#"{"openapi": "3.0.0", "paths": {}}"#),
            Err(GenerateError::Client(ClientWriterError::InvalidBaseClass(_)))
        ));
    }

    struct Upper;

    impl CodeFormatter for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn format_code(&self, code: &str) -> Result<String, FormatError> {
            Ok(code.to_uppercase())
        }
    }

    #[test]
    fn runs_the_formatter_over_every_file() {
        let files = Generator::new(GeneratorOptions::default())
            .with_formatter(Box::new(Upper))
            .render("x.json", r#"{"openapi": "3.0.0", "paths": {}}"#)
            .expect("render");
        assert!(files[Path::new("__init__.py")].contains("FROM .CLIENT IMPORT MYAPICLIENT"));
    }
}

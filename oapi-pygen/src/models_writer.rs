use std::collections::{BTreeMap, BTreeSet};

use derive_more::{Display, Error};
use genco::{lang::python, quote};

use crate::{
    analyzer::{AnalysisResult, FieldDef, ModelDef, ModelKind},
    python::{docstring, literal, string_literal, HintContext},
};

#[derive(Debug, Display, Error)]
pub enum ModelsWriterError {
    #[display(fmt = "Invalid base class `{}`, expected `module.Class`", _0)]
    InvalidBaseClass(#[error(not(source))] String),
}

pub struct ModelsWriter<'a> {
    analysis: &'a AnalysisResult,
}

impl<'a> ModelsWriter<'a> {
    pub fn new(analysis: &'a AnalysisResult) -> Self {
        ModelsWriter { analysis }
    }

    pub fn write(&self) -> Result<python::Tokens, ModelsWriterError> {
        let mut tokens = python::Tokens::new();
        let ctx = self.analysis.hint_context(None);
        let base_class = self.base_class()?;
        let (ordered, forward_refs) = dependency_order(self.analysis.models());

        for model in ordered {
            tokens.append(self.write_model(&ctx, &base_class, model));
            tokens.line();
        }

        for name in forward_refs {
            tokens.push();
            tokens.append(quote!($name.update_forward_refs()));
        }

        Ok(tokens)
    }

    fn base_class(&self) -> Result<python::Import, ModelsWriterError> {
        match &self.analysis.config().base_class {
            Some(path) => match path.rsplit_once('.') {
                Some((module, name)) if !module.is_empty() && !name.is_empty() => {
                    Ok(python::import(module.to_owned(), name.to_owned()))
                }
                _ => Err(ModelsWriterError::InvalidBaseClass(path.clone())),
            },
            None => Ok(python::import("pydantic", "BaseModel")),
        }
    }

    fn write_model(
        &self,
        ctx: &HintContext<'_>,
        base_class: &python::Import,
        model: &ModelDef,
    ) -> python::Tokens {
        let bases: Vec<python::Tokens> = match model.kind() {
            ModelKind::Enum(_) => vec![quote!($(python::import("enum", "Enum")))],
            ModelKind::Object { bases, .. } if !bases.is_empty() => {
                bases.iter().map(|b| quote!($(b.as_str()))).collect()
            }
            _ => vec![quote!($base_class)],
        };

        let mut body: Vec<python::Tokens> = vec![];
        if let Some(description) = model.description() {
            body.push(docstring(description));
        }
        match model.kind() {
            ModelKind::Object { fields, .. } => {
                body.extend(fields.iter().map(|f| self.write_field(ctx, f)));
            }
            ModelKind::Root(hint) => {
                body.push(quote!(__root__: $(hint.to_tokens(ctx))));
            }
            ModelKind::Enum(members) => {
                body.extend(
                    members
                        .iter()
                        .map(|(name, value)| quote!($(name.as_str()) = $(literal(value)))),
                );
            }
        }
        if body.is_empty() {
            body.push(quote!(pass));
        }

        let mut tokens = python::Tokens::new();
        tokens.append(quote!(class $(model.name())($(for b in bases join (, ) => $b)):));
        tokens.indent();
        for (idx, line) in body.into_iter().enumerate() {
            if idx > 0 {
                tokens.push();
            }
            tokens.append(line);
        }
        tokens.unindent();
        tokens
    }

    fn write_field(&self, ctx: &HintContext<'_>, field: &FieldDef) -> python::Tokens {
        let config = self.analysis.config();
        let hint = if field.required() {
            field.type_hint().clone()
        } else {
            field.type_hint().clone().optional()
        };

        // `None` for optional fields, `...` for required fields without a default
        let default = match (field.default(), field.required()) {
            (Some(value), _) => Some(literal(value)),
            (None, false) if !config.strip_default_none || field.alias().is_some() => {
                Some("None".to_owned())
            }
            (None, false) => None,
            (None, true) if field.alias().is_some() => Some("...".to_owned()),
            (None, true) => None,
        };

        let hint = hint.to_tokens(ctx);
        match (field.alias(), default) {
            (Some(alias), Some(default)) => {
                let field_fn = python::import("pydantic", "Field");
                let args = format!("{}, alias={}", default, string_literal(alias));
                quote!($(field.name()): $hint = $field_fn($args))
            }
            (None, Some(default)) => quote!($(field.name()): $hint = $default),
            (_, None) => quote!($(field.name()): $hint),
        }
    }
}

/// Orders models depth first so each one follows the models it uses. Base classes
/// always come first; a field type reached through a cycle may come later, and
/// models that still refer to a later model, or to themselves, are returned as
/// needing `update_forward_refs()`.
fn dependency_order(models: &[ModelDef]) -> (Vec<&ModelDef>, Vec<&str>) {
    fn bases(model: &ModelDef) -> &[String] {
        match model.kind() {
            ModelKind::Object { bases, .. } => bases,
            _ => &[],
        }
    }

    /// Every model `model` inherits from, directly or not.
    fn ancestors<'a>(
        model: &'a ModelDef,
        by_name: &BTreeMap<&'a str, &'a ModelDef>,
    ) -> BTreeSet<&'a str> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![model];
        while let Some(current) = stack.pop() {
            for base in bases(current) {
                if let Some(base) = by_name.get(base.as_str()).copied() {
                    if seen.insert(base.name()) {
                        stack.push(base);
                    }
                }
            }
        }
        seen
    }

    fn visit<'a>(
        model: &'a ModelDef,
        by_name: &BTreeMap<&'a str, &'a ModelDef>,
        visiting: &mut BTreeSet<&'a str>,
        done: &mut BTreeSet<&'a str>,
        ordered: &mut Vec<&'a ModelDef>,
    ) {
        if done.contains(model.name()) || !visiting.insert(model.name()) {
            return;
        }
        for base in bases(model) {
            if let Some(base) = by_name.get(base.as_str()).copied() {
                visit(base, by_name, visiting, done, ordered);
            }
        }
        for dependency in model.dependencies() {
            let Some(dependency) = by_name.get(dependency).copied() else {
                continue;
            };
            // a model whose base is still being ordered cannot be written yet
            if ancestors(dependency, by_name)
                .iter()
                .any(|base| visiting.contains(base))
            {
                continue;
            }
            visit(dependency, by_name, visiting, done, ordered);
        }
        visiting.remove(model.name());
        done.insert(model.name());
        ordered.push(model);
    }

    let by_name: BTreeMap<&str, &ModelDef> = models.iter().map(|m| (m.name(), m)).collect();
    let mut visiting = BTreeSet::new();
    let mut done = BTreeSet::new();
    let mut ordered = vec![];
    for model in models {
        visit(model, &by_name, &mut visiting, &mut done, &mut ordered);
    }

    let position: BTreeMap<&str, usize> = ordered
        .iter()
        .copied()
        .enumerate()
        .map(|(idx, m)| (m.name(), idx))
        .collect();
    let forward_refs = ordered
        .iter()
        .copied()
        .enumerate()
        .filter(|(idx, m)| {
            m.dependencies()
                .into_iter()
                .any(|d| position.get(d).is_some_and(|p| p >= idx))
        })
        .map(|(_, m)| m.name())
        .collect();

    (ordered, forward_refs)
}

use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    sync::LazyLock,
};

use derive_more::{Display, Error};
use http::Method;
use indexmap::IndexMap;
use jsonptr::{Pointer, Resolve};
use log::{debug, trace, warn};
use regex::Regex;
use serde_json::Value;

use crate::{
    config::{CodegenConfig, LiteralType},
    join_ptr, ptr,
    python::{self, HintContext, TypeHint},
    renamer::{pascal_case, snake_case_path},
    spec::{
        AdditionalProperties, MediaType, ObjectOrReference, Parameter, ParameterLocation,
        RefError, RequestBody, Response, Schema, SchemaType, Spec,
    },
    DefaultRenamer, Renamer,
};

static RE_APPLICATION_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^application/.*json$").expect("RE_APPLICATION_JSON"));

/// Status codes whose body becomes an operation's return type, by priority.
const SUCCESS_STATUS_CODES: [&str; 3] = ["200", "201", "202"];

/// Schema `$ref` chains longer than this are treated as cycles.
const MAX_REF_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct CollectedSchema {
    location: Pointer,
    name: String,
    schema: Schema,
    alias_of: Option<Pointer>,
}

impl CollectedSchema {
    pub fn location(&self) -> &Pointer {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Target of a component that is nothing but a `$ref` to another schema.
    pub fn alias_of(&self) -> Option<&Pointer> {
        self.alias_of.as_ref()
    }
}

/// A piece of an endpoint path template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathPart {
    Literal(String),
    Parameter(String),
}

impl PathPart {
    pub fn as_parameter(&self) -> Option<&String> {
        match self {
            PathPart::Parameter(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    alias: Option<String>,
    type_hint: TypeHint,
    required: bool,
    default: Option<Value>,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the field in the document when it differs from the Python name.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn type_hint(&self) -> &TypeHint {
        &self.type_hint
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    /// A `BaseModel` subclass; `bases` are other generated models.
    Object {
        bases: Vec<String>,
        fields: Vec<FieldDef>,
    },
    /// A `__root__` model wrapping a single type.
    Root(TypeHint),
    /// An `Enum` with `(member name, value)` pairs.
    Enum(Vec<(String, Value)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    name: String,
    description: Option<String>,
    kind: ModelKind,
}

impl ModelDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    /// Other models that must be defined before this one can be used.
    pub fn dependencies(&self) -> BTreeSet<&str> {
        match &self.kind {
            ModelKind::Object { bases, fields } => bases
                .iter()
                .map(String::as_str)
                .chain(fields.iter().flat_map(|f| f.type_hint.model_names()))
                .collect(),
            ModelKind::Root(hint) => hint.model_names(),
            ModelKind::Enum(_) => BTreeSet::new(),
        }
    }
}

/// The model holding an operation's path or query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamsDef {
    model: String,
    fields: Vec<FieldDef>,
}

impl ParamsDef {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn required(&self) -> bool {
        self.fields.iter().any(|f| f.required)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyDef {
    type_hint: TypeHint,
    required: bool,
}

impl RequestBodyDef {
    pub fn type_hint(&self) -> &TypeHint {
        &self.type_hint
    }

    pub fn required(&self) -> bool {
        self.required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    PathParams,
    QueryParams,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    kind: ArgumentKind,
    type_hint: TypeHint,
    required: bool,
}

impl Argument {
    pub fn name(&self) -> &'static str {
        match self.kind {
            ArgumentKind::PathParams => "path_params",
            ArgumentKind::QueryParams => "query_params",
            ArgumentKind::Body => "body",
        }
    }

    pub fn kind(&self) -> ArgumentKind {
        self.kind
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// The annotation as written in the signature; optional arguments admit `None`.
    pub fn type_hint(&self) -> TypeHint {
        if self.required {
            self.type_hint.clone()
        } else {
            self.type_hint.clone().optional()
        }
    }

    /// `name: Type` or `name: Optional[Type] = None`.
    pub fn render(&self, standard_collections: bool) -> String {
        let hint = self.type_hint().render(standard_collections);
        if self.required {
            format!("{}: {}", self.name(), hint)
        } else {
            format!("{}: {} = None", self.name(), hint)
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperationDef {
    name: String,
    method: Method,
    path: String,
    parts: Vec<PathPart>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
    path_params: Option<ParamsDef>,
    query_params: Option<ParamsDef>,
    request_body: Option<RequestBodyDef>,
    /// Return type taken from the first successful JSON response
    response: TypeHint,
}

impl OperationDef {
    /// The Python method name, also the key in the endpoint registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Lowercase method name, as the API client base class spells it.
    pub fn http_method(&self) -> String {
        self.method.as_str().to_lowercase()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    pub fn snake_case_path(&self) -> String {
        snake_case_path(&self.path)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn path_params(&self) -> Option<&ParamsDef> {
        self.path_params.as_ref()
    }

    pub fn query_params(&self) -> Option<&ParamsDef> {
        self.query_params.as_ref()
    }

    pub fn request_body(&self) -> Option<&RequestBodyDef> {
        self.request_body.as_ref()
    }

    pub fn response(&self) -> &TypeHint {
        &self.response
    }

    /// Whether the client base class sends a body for this method.
    pub fn sends_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    /// Method arguments: path params, query params and body, required ones first.
    pub fn arguments(&self) -> Vec<Argument> {
        let mut arguments = vec![];
        if let Some(p) = &self.path_params {
            arguments.push(Argument {
                kind: ArgumentKind::PathParams,
                type_hint: TypeHint::Model(p.model.clone()),
                required: true,
            });
        }
        if let Some(q) = &self.query_params {
            arguments.push(Argument {
                kind: ArgumentKind::QueryParams,
                type_hint: TypeHint::Model(q.model.clone()),
                required: q.required(),
            });
        }
        if let Some(b) = &self.request_body {
            arguments.push(Argument {
                kind: ArgumentKind::Body,
                type_hint: b.type_hint.clone(),
                required: b.required,
            });
        }
        arguments.sort_by_key(|a| !a.required);
        arguments
    }
}

pub struct Analyzer {
    renamer: Box<dyn Renamer>,
    config: CodegenConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: CodegenConfig) -> Self {
        Self {
            renamer: Box::new(DefaultRenamer::new(
                config.snake_case_field,
                config.field_aliases.clone(),
            )),
            config,
        }
    }

    /// Analyzes an OpenAPI document given as JSON or YAML text.
    pub fn run(self, document: &str) -> Result<AnalysisResult, AnalysisError> {
        let raw = parse_document(document)?;
        check_version(&raw)?;
        let spec: Spec =
            serde_json::from_value(raw.clone()).map_err(AnalysisError::Deserialization)?;
        let schemas = collect_types_to_generate(&spec, &raw, self.renamer.as_ref(), &self.config);
        debug!("collected {} schemas", schemas.len());

        let mut result = AnalysisResult {
            renamer: self.renamer,
            config: self.config,
            spec,
            raw,
            schemas,
            operations: vec![],
            models: vec![],
        };

        let mut model_names: BTreeSet<String> =
            result.schemas.iter().map(|s| s.name.clone()).collect();
        result.operations = result.analyze_operations(&mut model_names)?;
        debug!("derived {} operations", result.operations.len());
        result.models = result.build_models()?;

        Ok(result)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_config(CodegenConfig::default())
    }
}

pub struct AnalysisResult {
    renamer: Box<dyn Renamer>,
    config: CodegenConfig,
    spec: Spec,
    raw: Value,
    schemas: Vec<CollectedSchema>,
    operations: Vec<OperationDef>,
    models: Vec<ModelDef>,
}

impl AnalysisResult {
    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// The document as parsed, before deserialization into [`Spec`].
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn schemas(&self) -> &[CollectedSchema] {
        &self.schemas
    }

    /// Operations sorted by path.
    pub fn operations(&self) -> &[OperationDef] {
        &self.operations
    }

    /// Every model of `models.py`, in collection order.
    pub fn models(&self) -> &[ModelDef] {
        &self.models
    }

    pub fn find_schema(&self, ptr: &Pointer) -> Option<&CollectedSchema> {
        self.schemas().iter().find(|s| s.location() == ptr)
    }

    /// How hints are spelled in a file importing models from `models_module`.
    pub fn hint_context<'a>(&self, models_module: Option<&'a str>) -> HintContext<'a> {
        HintContext {
            models_module,
            standard_collections: self.config.use_standard_collections,
            literal_module: self.config.target_python_version.literal_module(),
        }
    }

    fn enum_as_literal(&self, schema: &Schema) -> bool {
        enum_as_literal(&self.config, schema)
    }

    pub fn name_type(
        &self,
        ptr: &Pointer,
        schema: &ObjectOrReference<Schema>,
    ) -> Result<TypeHint, AnalysisError> {
        if let Some(ty) = self.find_schema(ptr) {
            let hint = TypeHint::Model(ty.name.clone());
            return Ok(if ty.schema.is_nullable() {
                hint.optional()
            } else {
                hint
            });
        }

        match schema {
            ObjectOrReference::Ref { ref_path } => self.ref_type(ref_path),
            ObjectOrReference::Object(schema) => self.structural_type(ptr, schema),
        }
    }

    /// The hint of a referenced schema: the model generated for its target, or the
    /// target's shape when it is a nested schema without a model of its own.
    fn ref_type(&self, ref_path: &Pointer) -> Result<TypeHint, AnalysisError> {
        if let Some(target) = self.find_schema(ref_path) {
            trace!("{} refers to {}", ref_path, target.name);
            return Ok(TypeHint::Model(target.name.clone()));
        }
        let (target_ptr, schema) = self.resolve_schema(ref_path)?;
        match self.find_schema(&target_ptr) {
            Some(target) => Ok(TypeHint::Model(target.name.clone())),
            None => {
                trace!("{} is typed by the shape of {}", ref_path, target_ptr);
                self.structural_type(&target_ptr, &schema)
            }
        }
    }

    /// Follows a schema `$ref` through the document. Any local pointer is accepted,
    /// not only named components.
    fn resolve_schema(&self, ref_path: &Pointer) -> Result<(Pointer, Schema), AnalysisError> {
        let mut target = ref_path.clone();
        for _ in 0..MAX_REF_DEPTH {
            let value = self
                .raw
                .resolve(&target)
                .map_err(|_| AnalysisError::UnknownSchema(target.to_string()))?;
            let schema: ObjectOrReference<Schema> = serde_json::from_value(value.clone())
                .map_err(|_| AnalysisError::UnknownSchema(target.to_string()))?;
            match schema {
                ObjectOrReference::Ref { ref_path } => target = ref_path,
                ObjectOrReference::Object(schema) => return Ok((target, schema)),
            }
        }
        Err(AnalysisError::Reference(RefError::Cycle(ref_path.to_string())))
    }

    /// The hint of a schema from its shape alone, without looking it up as a model.
    fn structural_type(&self, ptr: &Pointer, schema: &Schema) -> Result<TypeHint, AnalysisError> {
        let hint = if schema.is_enum() && self.enum_as_literal(schema) {
            TypeHint::Literal(schema.enum_values.iter().map(python::literal).collect())
        } else if schema.is_composite() {
            self.union_type(ptr, schema)?
        } else {
            match schema.schema_type() {
                Some(SchemaType::Array) => match &schema.items {
                    Some(items) => TypeHint::List(Box::new(
                        self.name_type(&join_ptr!(ptr, "items"), items)?,
                    )),
                    None => TypeHint::List(Box::new(TypeHint::Any)),
                },
                Some(SchemaType::Integer) => TypeHint::Int,
                Some(SchemaType::Number) => TypeHint::Float,
                Some(SchemaType::Boolean) => TypeHint::Bool,
                Some(SchemaType::Null) => TypeHint::None,
                Some(SchemaType::String) => string_type(schema.format.as_deref()),
                Some(SchemaType::Object) | None if !schema.properties.is_empty() => {
                    warn!("object at {} was not collected as a model", ptr);
                    TypeHint::Dict(Box::new(TypeHint::Any))
                }
                Some(SchemaType::Object) => match &schema.additional_properties {
                    Some(AdditionalProperties::Schema(values)) => TypeHint::Dict(Box::new(
                        self.name_type(&join_ptr!(ptr, "additionalProperties"), values)?,
                    )),
                    _ => TypeHint::Dict(Box::new(TypeHint::Any)),
                },
                None => TypeHint::Any,
            }
        };

        Ok(if schema.is_nullable() {
            hint.optional()
        } else {
            hint
        })
    }

    fn union_type(&self, ptr: &Pointer, schema: &Schema) -> Result<TypeHint, AnalysisError> {
        let mut members = vec![];
        for (keyword, parts) in [
            ("anyOf", &schema.any_of),
            ("oneOf", &schema.one_of),
            ("allOf", &schema.all_of),
        ] {
            for (idx, part) in parts.iter().enumerate() {
                let hint = self.name_type(&join_ptr!(ptr, keyword, idx.to_string()), part)?;
                if !members.contains(&hint) {
                    members.push(hint);
                }
            }
        }
        Ok(match members.len() {
            0 => TypeHint::Any,
            1 => members.remove(0),
            _ => TypeHint::Union(members),
        })
    }

    fn fields(&self, ptr: &Pointer, schema: &Schema) -> Result<Vec<FieldDef>, AnalysisError> {
        let required_properties: HashSet<_> = schema.required.iter().collect();
        let mut names = BTreeSet::new();
        schema
            .properties
            .iter()
            .map(|(json_name, property)| {
                let ptr = join_ptr!(ptr, "properties", json_name);
                let name = unique_name(&mut names, self.renamer.name_property(json_name), "_");
                Ok(FieldDef {
                    alias: (&name != json_name).then(|| json_name.clone()),
                    type_hint: self.name_type(&ptr, property)?,
                    required: required_properties.contains(json_name) && !self.config.force_optional,
                    default: property.object().and_then(|s| s.default.clone()),
                    name,
                })
            })
            .collect()
    }

    fn model_def(&self, collected: &CollectedSchema) -> Result<ModelDef, AnalysisError> {
        let ptr = &collected.location;
        let schema = &collected.schema;

        let kind = if let Some(target) = &collected.alias_of {
            ModelKind::Root(self.ref_type(target)?)
        } else if schema.is_enum() && !self.enum_as_literal(schema) {
            let mut names = BTreeSet::new();
            ModelKind::Enum(
                schema
                    .enum_values
                    .iter()
                    .map(|v| (unique_name(&mut names, self.renamer.name_enum_member(v), "_"), v.clone()))
                    .collect(),
            )
        } else if !schema.all_of.is_empty() {
            let mut bases = vec![];
            let mut fields = vec![];
            for (idx, part) in schema.all_of.iter().enumerate() {
                let part_ptr = join_ptr!(ptr, "allOf", idx.to_string());
                match part {
                    ObjectOrReference::Object(inline) => {
                        fields.extend(self.fields(&part_ptr, inline)?)
                    }
                    ObjectOrReference::Ref { .. } => match self.name_type(&part_ptr, part)? {
                        TypeHint::Model(name) => bases.push(name),
                        other => debug!("ignoring part {} of {}", other, collected.name),
                    },
                }
            }
            fields.extend(self.fields(ptr, schema)?);
            ModelKind::Object { bases, fields }
        } else if schema.is_composite() {
            ModelKind::Root(self.structural_type(ptr, schema)?)
        } else if schema.is_object() {
            match &schema.additional_properties {
                Some(AdditionalProperties::Schema(values)) if schema.properties.is_empty() => {
                    let values =
                        self.name_type(&join_ptr!(ptr, "additionalProperties"), values)?;
                    ModelKind::Root(TypeHint::Dict(Box::new(values)))
                }
                _ => ModelKind::Object {
                    bases: vec![],
                    fields: self.fields(ptr, schema)?,
                },
            }
        } else {
            ModelKind::Root(self.structural_type(ptr, schema)?)
        };

        Ok(ModelDef {
            name: collected.name.clone(),
            description: self
                .config
                .use_schema_description
                .then(|| schema.description.clone())
                .flatten(),
            kind,
        })
    }

    fn build_models(&self) -> Result<Vec<ModelDef>, AnalysisError> {
        let mut models = self
            .schemas
            .iter()
            .map(|s| self.model_def(s))
            .collect::<Result<Vec<_>, _>>()?;

        for operation in &self.operations {
            for params in [&operation.path_params, &operation.query_params]
                .into_iter()
                .flatten()
            {
                models.push(ModelDef {
                    name: params.model.clone(),
                    description: None,
                    kind: ModelKind::Object {
                        bases: vec![],
                        fields: params.fields.clone(),
                    },
                });
            }
        }

        Ok(models)
    }

    fn parameter_field(
        &self,
        parameter: &Parameter,
        ptr: &Pointer,
        names: &mut BTreeSet<String>,
    ) -> Result<Option<FieldDef>, AnalysisError> {
        let (schema_ptr, schema) = match &parameter.schema {
            Some(schema) => (join_ptr!(ptr, "schema"), schema),
            None => match first_media_schema(&parameter.content, false) {
                Some((media_type, schema)) => {
                    (join_ptr!(ptr, "content", media_type, "schema"), schema)
                }
                None => {
                    warn!("parameter `{}` at {} has no schema, skipping", parameter.name, ptr);
                    return Ok(None);
                }
            },
        };
        let name = unique_name(names, self.renamer.name_parameter(&parameter.name), "_");
        let default = match schema {
            ObjectOrReference::Object(s) => s.default.clone(),
            ObjectOrReference::Ref { ref_path } => self.resolve_schema(ref_path)?.1.default,
        };

        Ok(Some(FieldDef {
            alias: (name != parameter.name).then(|| parameter.name.clone()),
            type_hint: self.name_type(&schema_ptr, schema)?,
            required: parameter.required || parameter.location == ParameterLocation::Path,
            default,
            name,
        }))
    }

    fn analyze_operations(
        &self,
        model_names: &mut BTreeSet<String>,
    ) -> Result<Vec<OperationDef>, AnalysisError> {
        let mut function_names = BTreeSet::new();
        let mut operations = vec![];

        for (path, method, operation) in self.spec.operations() {
            let ptr = ptr!("paths", path, method.as_str().to_lowercase());
            if operation.deprecated && self.config.skip_deprecated {
                debug!("skipping deprecated operation {} {}", method, path);
                continue;
            }

            let name = unique_name(
                &mut function_names,
                self.renamer.name_function(&self.raw, &ptr),
                "_",
            );
            let type_name = pascal_case(&name);
            let parts = parse_path(path)?;

            // path level parameters first, so the operation's own override them
            let mut parameters: IndexMap<(String, ParameterLocation), (Parameter, Pointer)> =
                IndexMap::new();
            let path_item = &self.spec.paths[path];
            let declared = path_item
                .parameters
                .iter()
                .enumerate()
                .map(|(i, p)| (p, ptr!("paths", path, "parameters", i.to_string())))
                .chain(
                    operation
                        .parameters
                        .iter()
                        .enumerate()
                        .map(|(i, p)| (p, join_ptr!(ptr, "parameters", i.to_string()))),
                );
            for (p_or_ref, p_ptr) in declared {
                let parameter = p_or_ref.resolve(&self.spec)?;
                let p_ptr = match p_or_ref {
                    ObjectOrReference::Ref { ref_path } => ref_path.clone(),
                    ObjectOrReference::Object(_) => p_ptr,
                };
                parameters.insert(
                    (parameter.name.clone(), parameter.location),
                    (parameter, p_ptr),
                );
            }

            let mut path_names = BTreeSet::new();
            let mut query_names = BTreeSet::new();
            let mut path_fields = vec![];
            let mut query_fields = vec![];
            for (parameter, p_ptr) in parameters.values() {
                match parameter.location {
                    ParameterLocation::Path => path_fields
                        .extend(self.parameter_field(parameter, p_ptr, &mut path_names)?),
                    ParameterLocation::Query => query_fields
                        .extend(self.parameter_field(parameter, p_ptr, &mut query_names)?),
                    ParameterLocation::Header | ParameterLocation::Cookie => {
                        trace!("ignoring {:?} parameter `{}`", parameter.location, parameter.name)
                    }
                }
            }

            for placeholder in parts.iter().filter_map(PathPart::as_parameter) {
                if !parameters.contains_key(&(placeholder.clone(), ParameterLocation::Path)) {
                    warn!("`{}` of {} {} is not declared, assuming a string", placeholder, method, path);
                    let name = unique_name(&mut path_names, self.renamer.name_parameter(placeholder), "_");
                    path_fields.push(FieldDef {
                        alias: (&name != placeholder).then(|| placeholder.clone()),
                        type_hint: TypeHint::Str,
                        required: true,
                        default: None,
                        name,
                    });
                }
            }

            let path_params = (!path_fields.is_empty()).then(|| ParamsDef {
                model: unique_name(model_names, format!("{}PathParams", type_name), ""),
                fields: path_fields,
            });
            let query_params = (!query_fields.is_empty()).then(|| ParamsDef {
                model: unique_name(model_names, format!("{}QueryParams", type_name), ""),
                fields: query_fields,
            });

            let mut request_body = match &operation.request_body {
                Some(body) => self.request_body(body, &ptr)?,
                None => None,
            };
            if request_body.is_some() && !matches!(method, Method::POST | Method::PUT | Method::PATCH) {
                warn!("{} {} declares a request body the client cannot send, dropping it", method, path);
                request_body = None;
            }

            operations.push(OperationDef {
                name,
                method: method.clone(),
                path: path.clone(),
                parts,
                summary: operation.summary.clone(),
                description: operation.description.clone(),
                tags: operation.tags.clone(),
                deprecated: operation.deprecated,
                path_params,
                query_params,
                request_body,
                response: self.response(&operation.responses, &ptr)?,
            });
        }

        operations.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(operations)
    }

    fn request_body(
        &self,
        body: &ObjectOrReference<RequestBody>,
        operation_ptr: &Pointer,
    ) -> Result<Option<RequestBodyDef>, AnalysisError> {
        let base = match body {
            ObjectOrReference::Ref { ref_path } => ref_path.clone(),
            ObjectOrReference::Object(_) => join_ptr!(operation_ptr, "requestBody"),
        };
        let body = body.resolve(&self.spec)?;
        match first_media_schema(&body.content, true) {
            Some((media_type, schema)) => Ok(Some(RequestBodyDef {
                type_hint: self.name_type(&join_ptr!(base, "content", media_type, "schema"), schema)?,
                required: body.required,
            })),
            None => Ok(None),
        }
    }

    fn response(
        &self,
        responses: &IndexMap<String, ObjectOrReference<Response>>,
        operation_ptr: &Pointer,
    ) -> Result<TypeHint, AnalysisError> {
        for status_code in SUCCESS_STATUS_CODES {
            let Some(r_or_ref) = responses.get(status_code) else {
                continue;
            };
            let base = match r_or_ref {
                ObjectOrReference::Ref { ref_path } => ref_path.clone(),
                ObjectOrReference::Object(_) => join_ptr!(operation_ptr, "responses", status_code),
            };
            let response = r_or_ref.resolve(&self.spec)?;
            if let Some((media_type, schema)) = first_media_schema(&response.content, true) {
                return self.name_type(&join_ptr!(base, "content", media_type, "schema"), schema);
            }
        }
        Ok(TypeHint::None)
    }
}

#[derive(Debug, Display, Error)]
pub enum AnalysisError {
    #[display(fmt = "Failed to deserialize openapi spec: {}", _0)]
    Deserialization(serde_json::Error),

    #[display(fmt = "Failed to parse YAML document: {}", _0)]
    Yaml(serde_yaml::Error),

    #[display(fmt = "Unsupported OpenAPI version `{}`, expected 3.x", _0)]
    UnsupportedVersion(#[error(not(source))] String),

    #[display(fmt = "Failed to resolve reference: {}", _0)]
    Reference(RefError),

    #[display(fmt = "Reference `{}` does not point at a schema", _0)]
    UnknownSchema(#[error(not(source))] String),

    #[display(fmt = "Malformed path template `{}`: {}", path, reason)]
    MalformedPath { path: String, reason: &'static str },
}

impl From<RefError> for AnalysisError {
    fn from(e: RefError) -> Self {
        AnalysisError::Reference(e)
    }
}

fn enum_as_literal(config: &CodegenConfig, schema: &Schema) -> bool {
    match config.enum_field_as_literal {
        Some(LiteralType::All) => true,
        Some(LiteralType::One) => schema.enum_values.len() == 1,
        None => false,
    }
}

fn string_type(format: Option<&str>) -> TypeHint {
    match format {
        Some("date-time") => TypeHint::DateTime,
        Some("date") => TypeHint::Date,
        Some("time") => TypeHint::Time,
        Some("uuid" | "uuid1" | "uuid3" | "uuid4" | "uuid5") => TypeHint::Uuid,
        Some("email") => TypeHint::Email,
        Some("uri" | "url") => TypeHint::Url,
        Some("binary") => TypeHint::Bytes,
        _ => TypeHint::Str,
    }
}

/// Returns `name`, or `name` with the smallest numeric suffix not yet taken.
fn unique_name(taken: &mut BTreeSet<String>, name: String, separator: &str) -> String {
    let name = if taken.contains(&name) {
        (if separator.is_empty() { 1 } else { 2 }..)
            .map(|n| format!("{}{}{}", name, separator, n))
            .find(|candidate| !taken.contains(candidate))
            .expect("unbounded range")
    } else {
        name
    };
    taken.insert(name.clone());
    name
}

fn first_media_schema(
    content: &IndexMap<String, MediaType>,
    json_only: bool,
) -> Option<(&String, &ObjectOrReference<Schema>)> {
    content
        .iter()
        .filter(|(media_type, _)| !json_only || RE_APPLICATION_JSON.is_match(media_type))
        .find_map(|(media_type, m)| m.schema.as_ref().map(|s| (media_type, s)))
}

/// Splits a path template into literal text and `{parameter}` placeholders.
pub fn parse_path(path: &str) -> Result<Vec<PathPart>, AnalysisError> {
    let malformed = |reason| AnalysisError::MalformedPath {
        path: path.to_owned(),
        reason,
    };
    let mut parts = vec![];
    let mut literal = String::new();
    let mut parameter: Option<String> = None;

    for c in path.chars() {
        match (c, parameter.as_mut()) {
            ('{', None) => {
                if !literal.is_empty() {
                    parts.push(PathPart::Literal(std::mem::take(&mut literal)));
                }
                parameter = Some(String::new());
            }
            ('{', Some(_)) => return Err(malformed("nested `{`")),
            ('}', Some(name)) => {
                let name = std::mem::take(name);
                if name.is_empty() {
                    return Err(malformed("empty parameter name"));
                }
                parts.push(PathPart::Parameter(name));
                parameter = None;
            }
            ('}', None) => return Err(malformed("unmatched `}`")),
            (c, Some(name)) => name.push(c),
            (c, None) => literal.push(c),
        }
    }

    if parameter.is_some() {
        return Err(malformed("unclosed `{`"));
    }
    if !literal.is_empty() {
        parts.push(PathPart::Literal(literal));
    }
    Ok(parts)
}

/// Parses JSON or YAML text into a JSON value.
fn parse_document(document: &str) -> Result<Value, AnalysisError> {
    if document.trim_start().starts_with('{') {
        return serde_json::from_str(document).map_err(AnalysisError::Deserialization);
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(document).map_err(AnalysisError::Yaml)?;
    Ok(yaml_to_json(yaml))
}

/// Converts YAML to JSON, stringifying mapping keys such as unquoted status codes.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_owned(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_owned())
            .unwrap_or_default(),
    }
}

fn check_version(raw: &Value) -> Result<(), AnalysisError> {
    let version = match (raw.get("openapi"), raw.get("swagger")) {
        (Some(Value::String(v)), _) => v.clone(),
        (_, Some(v)) => return Err(AnalysisError::UnsupportedVersion(v.to_string())),
        _ => return Err(AnalysisError::UnsupportedVersion("<missing>".to_owned())),
    };
    // `3.1` is as valid as `3.1.0`
    let padded = match version.matches('.').count() {
        0 => format!("{}.0.0", version),
        1 => format!("{}.0", version),
        _ => version.clone(),
    };
    match semver::Version::parse(&padded) {
        Ok(v) if v.major == 3 => Ok(()),
        _ => Err(AnalysisError::UnsupportedVersion(version)),
    }
}

fn collect_initial_types_to_generate(spec: &Spec, config: &CodegenConfig) -> Vec<Pointer> {
    let mut types_to_check = vec![];
    let components_ptr = ptr!("components");

    spec.components.schemas.iter().for_each(|(name, _)| {
        let type_path = join_ptr!(components_ptr, "schemas", name);
        types_to_check.push(type_path);
    });
    spec.components
        .responses
        .iter()
        .flat_map(|(name, response)| response.object().map(|r| (name, r)))
        .for_each(|(name, r)| {
            json_media_types(&r.content).for_each(|media_type| {
                types_to_check.push(join_ptr!(
                    components_ptr,
                    "responses",
                    name,
                    "content",
                    media_type,
                    "schema"
                ));
            })
        });
    spec.components
        .parameters
        .iter()
        .flat_map(|(name, parameter)| parameter.object().map(|o| (name, o)))
        .filter(|(_, p)| p.schema.as_ref().and_then(|s| s.object()).is_some())
        .for_each(|(name, _)| {
            let type_path = join_ptr!(components_ptr, "parameters", name, "schema");
            types_to_check.push(type_path);
        });
    spec.components
        .request_bodies
        .iter()
        .flat_map(|(name, body)| body.object().map(|o| (name, o)))
        .for_each(|(name, r)| {
            json_media_types(&r.content).for_each(|media_type| {
                types_to_check.push(join_ptr!(
                    components_ptr,
                    "requestBodies",
                    name,
                    "content",
                    media_type,
                    "schema"
                ));
            })
        });

    for (path, item) in &spec.paths {
        item.parameters
            .iter()
            .enumerate()
            .flat_map(|(i, p)| p.object().map(|o| (i, o)))
            .filter(|(_, p)| p.schema.as_ref().and_then(|s| s.object()).is_some())
            .for_each(|(i, _)| {
                types_to_check.push(ptr!("paths", path, "parameters", i.to_string(), "schema"));
            });
    }

    spec.operations()
        .filter(|(_, _, operation)| !(operation.deprecated && config.skip_deprecated))
        .for_each(|(path, method, operation)| {
            let operation_ptr = ptr!("paths", path, method.as_str().to_lowercase());

            operation
                .parameters
                .iter()
                .enumerate()
                .flat_map(|(i, p)| p.object().map(|o| (i, o)))
                .filter(|(_, p)| p.schema.as_ref().and_then(|s| s.object()).is_some())
                .for_each(|(i, _)| {
                    let type_path =
                        join_ptr!(operation_ptr, "parameters", i.to_string(), "schema");
                    types_to_check.push(type_path);
                });

            operation
                .request_body
                .as_ref()
                .and_then(|r| r.object())
                .into_iter()
                .flat_map(|r| json_media_types(&r.content))
                .for_each(|media_type| {
                    types_to_check.push(join_ptr!(
                        operation_ptr,
                        "requestBody",
                        "content",
                        media_type,
                        "schema"
                    ));
                });

            operation
                .responses
                .iter()
                .flat_map(|(s, r)| r.object().map(|o| (s, o)))
                .for_each(|(status_code, r)| {
                    json_media_types(&r.content).for_each(|media_type| {
                        types_to_check.push(join_ptr!(
                            operation_ptr,
                            "responses",
                            status_code,
                            "content",
                            media_type,
                            "schema"
                        ));
                    })
                });
        });

    types_to_check
}

/// JSON media types that carry an inline schema.
fn json_media_types(m: &IndexMap<String, MediaType>) -> impl Iterator<Item = &String> {
    m.iter()
        .filter(|(media_type, _)| RE_APPLICATION_JSON.is_match(media_type))
        .filter(|(_, o)| o.schema.as_ref().and_then(|s| s.object()).is_some())
        .map(|(media_type, _)| media_type)
}

/// Queues the inline schemas nested in `schema`. Inline `allOf` parts are merged
/// into their parent, so their own children are queued instead.
fn push_children(types_to_check: &mut VecDeque<Pointer>, ptr: &Pointer, schema: &Schema) {
    for (name, property) in &schema.properties {
        if let ObjectOrReference::Object(_) = property {
            types_to_check.push_back(join_ptr!(ptr, "properties", name));
        }
    }
    if let Some(ObjectOrReference::Object(_)) = schema.items.as_deref() {
        types_to_check.push_back(join_ptr!(ptr, "items"));
    }
    if let Some(AdditionalProperties::Schema(values)) = &schema.additional_properties {
        if values.object().is_some() {
            types_to_check.push_back(join_ptr!(ptr, "additionalProperties"));
        }
    }
    for (keyword, parts) in [("anyOf", &schema.any_of), ("oneOf", &schema.one_of)] {
        for (i, part) in parts.iter().enumerate() {
            if part.object().is_some() {
                types_to_check.push_back(join_ptr!(ptr, keyword, i.to_string()));
            }
        }
    }
    for (i, part) in schema.all_of.iter().enumerate() {
        if let ObjectOrReference::Object(part) = part {
            push_children(types_to_check, &join_ptr!(ptr, "allOf", i.to_string()), part);
        }
    }
}

fn collect_types_to_generate(
    spec: &Spec,
    raw: &Value,
    renamer: &dyn Renamer,
    config: &CodegenConfig,
) -> Vec<CollectedSchema> {
    let mut types_to_check: VecDeque<_> = collect_initial_types_to_generate(spec, config).into();
    let mut visited = HashSet::new();
    let mut names = BTreeSet::new();
    let mut collected_types = vec![];

    while let Some(type_ptr) = types_to_check.pop_front() {
        if !visited.insert(type_ptr.to_string()) {
            continue;
        }
        let Ok(schema) = raw.resolve(&type_ptr) else {
            warn!("schema at {} is not resolvable", type_ptr);
            continue;
        };
        let schema: ObjectOrReference<Schema> = match serde_json::from_value(schema.clone()) {
            Ok(schema) => schema,
            Err(e) => {
                warn!("unsupported schema at {}: {}", type_ptr, e);
                continue;
            }
        };
        let is_component = type_ptr.starts_with("/components/schemas/")
            && type_ptr.as_str().matches('/').count() == 3;
        let schema = match schema {
            ObjectOrReference::Object(schema) => schema,
            ObjectOrReference::Ref { ref_path } => {
                types_to_check.push_back(ref_path.clone());
                if is_component {
                    collected_types.push(CollectedSchema {
                        name: unique_name(&mut names, renamer.name_type(raw, &type_ptr), ""),
                        location: type_ptr,
                        schema: Schema::default(),
                        alias_of: Some(ref_path),
                    });
                }
                continue;
            }
        };
        let collect = is_component
            || (schema.is_enum() && !enum_as_literal(config, &schema))
            || schema.is_composite()
            || (schema.is_object() && !schema.properties.is_empty());

        push_children(&mut types_to_check, &type_ptr, &schema);

        if collect {
            collected_types.push(CollectedSchema {
                name: unique_name(&mut names, renamer.name_type(raw, &type_ptr), ""),
                location: type_ptr,
                schema,
                alias_of: None,
            });
        }
    }

    collected_types
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PETSTORE: &str = r#"
openapi: 3.0.0
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        200:
          description: A list of pets
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pets'
    post:
      operationId: createPets
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        201:
          description: Created
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema:
          type: string
    get:
      operationId: showPetById
      parameters:
        - name: petId
          in: query
          schema:
            type: string
      responses:
        200:
          description: Expected response to a valid request
          content:
            application/json:
              schema:
                type: object
                properties:
                  pet:
                    $ref: '#/components/schemas/Pet'
    delete:
      deprecated: true
      responses:
        204:
          description: Deleted
components:
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id:
          type: integer
          format: int64
        name:
          type: string
        tag:
          type: string
        status:
          type: string
          enum: [available, sold]
    Pets:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
"#;

    fn analyze(document: &str) -> AnalysisResult {
        Analyzer::new().run(document).expect("analysis should succeed")
    }

    #[test]
    fn derives_one_operation_per_non_deprecated_operation() {
        let analysis = analyze(PETSTORE);
        let names: Vec<_> = analysis.operations().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["list_pets", "create_pets", "show_pet_by_id"]);
    }

    #[test]
    fn keeps_deprecated_operations_on_request() {
        let config = CodegenConfig {
            skip_deprecated: false,
            ..CodegenConfig::default()
        };
        let analysis = Analyzer::with_config(config).run(PETSTORE).expect("analysis");
        assert!(analysis
            .operations()
            .iter()
            .any(|o| o.name() == "delete_pets_pet_id" && o.deprecated()));
    }

    #[test]
    fn separates_path_and_query_parameters() {
        let analysis = analyze(PETSTORE);
        let show = &analysis.operations()[2];

        let path_params = show.path_params().expect("path params");
        let query_params = show.query_params().expect("query params");
        assert_eq!(path_params.model(), "ShowPetByIdPathParams");
        assert_eq!(query_params.model(), "ShowPetByIdQueryParams");
        assert_ne!(path_params.model(), query_params.model());
        assert!(path_params.fields()[0].required());
        assert!(!query_params.fields()[0].required());
    }

    #[test]
    fn picks_response_and_body_types() {
        let analysis = analyze(PETSTORE);
        let ops = analysis.operations();

        assert_eq!(ops[0].response(), &TypeHint::Model("Pets".to_owned()));
        assert_eq!(ops[1].response(), &TypeHint::None);
        assert_eq!(
            ops[1].request_body().map(|b| b.type_hint()),
            Some(&TypeHint::Model("Pet".to_owned()))
        );
        assert_eq!(
            ops[2].response(),
            &TypeHint::Model("ShowPetByIdResponse200".to_owned())
        );
    }

    #[test]
    fn drops_bodies_of_methods_without_payload() {
        let analysis = analyze(
            r#"{
                "openapi": "3.0.0",
                "paths": {
                    "/search": {
                        "get": {
                            "operationId": "search",
                            "requestBody": {"content": {"application/json": {"schema": {"type": "string"}}}},
                            "responses": {}
                        }
                    }
                }
            }"#,
        );
        let search = &analysis.operations()[0];
        assert!(search.request_body().is_none());
        assert!(search.arguments().is_empty());
    }

    #[test]
    fn follows_component_aliases() {
        let analysis = analyze(
            r##"{
                "openapi": "3.0.0",
                "paths": {
                    "/pets": {
                        "get": {
                            "operationId": "listPets",
                            "responses": {
                                "200": {
                                    "description": "ok",
                                    "content": {"application/json": {"schema": {"$ref": "#/components/schemas/PetList"}}}
                                }
                            }
                        }
                    }
                },
                "components": {
                    "schemas": {
                        "PetList": {"$ref": "#/components/schemas/Pets"},
                        "Pets": {"type": "array", "items": {"type": "string"}}
                    }
                }
            }"##,
        );

        assert_eq!(
            analysis.operations()[0].response(),
            &TypeHint::Model("PetList".to_owned())
        );
        let alias = analysis
            .models()
            .iter()
            .find(|m| m.name() == "PetList")
            .expect("PetList");
        assert_eq!(alias.kind(), &ModelKind::Root(TypeHint::Model("Pets".to_owned())));
    }

    #[test]
    fn resolves_references_into_nested_schemas() {
        let analysis = analyze(
            r##"{
                "openapi": "3.0.0",
                "paths": {
                    "/pets/{id}": {
                        "get": {
                            "operationId": "showPet",
                            "parameters": [
                                {"name": "id", "in": "path", "required": true, "schema": {"$ref": "#/components/schemas/Pet/properties/id"}},
                                {"name": "owner", "in": "query", "schema": {"$ref": "#/components/schemas/Pet/properties/owner"}},
                                {"name": "limit", "in": "query", "schema": {"$ref": "#/components/schemas/Page/properties/limit"}}
                            ],
                            "responses": {}
                        }
                    }
                },
                "components": {
                    "schemas": {
                        "Pet": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "integer"},
                                "owner": {"type": "object", "properties": {"name": {"type": "string"}}}
                            }
                        },
                        "Page": {"type": "object", "properties": {"limit": {"type": "integer", "default": 20}}}
                    }
                }
            }"##,
        );

        let operation = &analysis.operations()[0];
        let path_params = operation.path_params().expect("path params");
        assert_eq!(path_params.fields()[0].type_hint(), &TypeHint::Int);

        let query = operation.query_params().expect("query params").fields();
        assert_eq!(query[0].type_hint(), &TypeHint::Model("PetOwner".to_owned()));
        assert_eq!(query[1].type_hint(), &TypeHint::Int);
        assert_eq!(query[1].default(), Some(&serde_json::json!(20)));
    }

    #[test]
    fn reports_references_to_missing_schemas() {
        let result = Analyzer::new().run(
            r##"{
                "openapi": "3.0.0",
                "paths": {
                    "/pets": {
                        "get": {
                            "parameters": [{"name": "q", "in": "query", "schema": {"$ref": "#/components/schemas/Missing"}}],
                            "responses": {}
                        }
                    }
                }
            }"##,
        );
        assert!(matches!(result, Err(AnalysisError::UnknownSchema(path)) if path == "/components/schemas/Missing"));
    }

    #[test]
    fn orders_arguments_required_first() {
        let analysis = analyze(PETSTORE);
        let args: Vec<_> = analysis.operations()[2]
            .arguments()
            .iter()
            .map(|a| a.render(false))
            .collect();
        assert_eq!(
            args,
            vec![
                "path_params: ShowPetByIdPathParams",
                "query_params: Optional[ShowPetByIdQueryParams] = None",
            ]
        );
    }

    #[test]
    fn collects_components_inline_objects_and_enums() {
        let analysis = analyze(PETSTORE);
        let names: Vec<_> = analysis.schemas().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["Pet", "Pets", "ShowPetByIdResponse200", "PetStatus"]
        );

        let pets = analysis.models().iter().find(|m| m.name() == "Pets").expect("Pets");
        assert_eq!(
            pets.kind(),
            &ModelKind::Root(TypeHint::List(Box::new(TypeHint::Model("Pet".to_owned()))))
        );

        let status = analysis
            .models()
            .iter()
            .find(|m| m.name() == "PetStatus")
            .expect("PetStatus");
        assert!(matches!(status.kind(), ModelKind::Enum(members) if members.len() == 2));
    }

    #[test]
    fn optional_fields_and_required_fields() {
        let analysis = analyze(PETSTORE);
        let pet = analysis.models().iter().find(|m| m.name() == "Pet").expect("Pet");
        let ModelKind::Object { fields, .. } = pet.kind() else {
            panic!("Pet should be an object model");
        };
        let summary: Vec<_> = fields.iter().map(|f| (f.name(), f.required())).collect();
        assert_eq!(
            summary,
            vec![("id", true), ("name", true), ("tag", false), ("status", false)]
        );
        assert_eq!(fields[3].type_hint(), &TypeHint::Model("PetStatus".to_owned()));
    }

    #[test]
    fn enums_become_literals_when_configured() {
        let config = CodegenConfig {
            enum_field_as_literal: Some(LiteralType::All),
            ..CodegenConfig::default()
        };
        let analysis = Analyzer::with_config(config).run(PETSTORE).expect("analysis");
        assert!(analysis.schemas().iter().all(|s| s.name() != "PetStatus"));
        let pet = analysis.models().iter().find(|m| m.name() == "Pet").expect("Pet");
        let ModelKind::Object { fields, .. } = pet.kind() else {
            panic!("Pet should be an object model");
        };
        assert_eq!(
            fields[3].type_hint(),
            &TypeHint::Literal(vec!["'available'".to_owned(), "'sold'".to_owned()])
        );
    }

    #[test]
    fn empty_documents_have_no_operations() {
        let analysis = analyze("openapi: 3.1.0\ninfo:\n  title: Empty\n  version: '1'\npaths: {}\n");
        assert!(analysis.operations().is_empty());
        assert!(analysis.models().is_empty());
    }

    #[test]
    fn duplicate_function_names_are_disambiguated() {
        let analysis = analyze(
            r#"{
                "openapi": "3.0.0",
                "paths": {
                    "/a": { "get": { "operationId": "fetch", "responses": {} } },
                    "/b": { "get": { "operationId": "fetch", "responses": {} } }
                }
            }"#,
        );
        let names: Vec<_> = analysis.operations().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["fetch", "fetch_2"]);
    }

    #[test]
    fn undeclared_path_parameters_default_to_strings() {
        let analysis = analyze(
            r#"{ "openapi": "3.0.0", "paths": { "/files/{name}.json": { "get": { "responses": {} } } } }"#,
        );
        let op = &analysis.operations()[0];
        assert_eq!(op.name(), "get_files_name_json");
        let fields = op.path_params().expect("path params").fields();
        assert_eq!(fields[0].name(), "name");
        assert_eq!(fields[0].type_hint(), &TypeHint::Str);
    }

    #[test]
    fn rejects_swagger_documents_and_bad_paths() {
        assert!(matches!(
            Analyzer::new().run(r#"{"swagger": "2.0", "paths": {}}"#),
            Err(AnalysisError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            Analyzer::new().run(r#"{"openapi": "3.0.0", "paths": {"/a/{b": {"get": {"responses": {}}}}}"#),
            Err(AnalysisError::MalformedPath { .. })
        ));
    }

    #[test]
    fn parses_path_templates() {
        assert_eq!(
            parse_path("/pets/{petId}/photo.{ext}").expect("valid"),
            vec![
                PathPart::Literal("/pets/".to_owned()),
                PathPart::Parameter("petId".to_owned()),
                PathPart::Literal("/photo.".to_owned()),
                PathPart::Parameter("ext".to_owned()),
            ]
        );
        assert!(parse_path("/a/}").is_err());
        assert!(parse_path("/a/{}").is_err());
        assert!(parse_path("/a/{{b}}").is_err());
    }
}

use std::{collections::BTreeMap, str::FromStr, sync::LazyLock};

use convert_case::{Boundary, Case, Converter};
use jsonptr::{Pointer, Resolve};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::python::{self, is_builtin, is_client_attribute, is_keyword, is_model_attribute};

static OPERATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/paths/([^/]+)/([^/]+)").expect("OPERATION_REGEX"));
static OPERATION_REQUEST_BODY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/paths/([^/]+)/([^/]+)/requestBody/content/([^/]+)/schema$")
        .expect("OPERATION_REQUEST_BODY_REGEX")
});
static OPERATION_PARAMETER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/paths/([^/]+)/([^/]+)/parameters/([^/]+)/schema$")
        .expect("OPERATION_PARAMETER_REGEX")
});
static OPERATION_RESPONSE_BODY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/paths/([^/]+)/([^/]+)/responses/([^/]+)/content/([^/]+)/schema$")
        .expect("OPERATION_RESPONSE_BODY_REGEX")
});
static PATH_PARAMETER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/paths/([^/]+)/parameters/([^/]+)/schema$").expect("PATH_PARAMETER_REGEX")
});

static SCHEMA_COMPONENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/components/schemas/([^/]+)$").expect("SCHEMA_COMPONENT_REGEX"));
static REQUEST_BODY_COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/components/requestBodies/([^/]+)/content/([^/]+)/schema$")
        .expect("REQUEST_BODY_COMPONENT_REGEX")
});
static PARAMETER_COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/components/parameters/([^/]+)/schema$").expect("PARAMETER_COMPONENT_REGEX")
});
static RESPONSE_COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/components/responses/([^/]+)/content/([^/]+)/schema$")
        .expect("RESPONSE_COMPONENT_REGEX")
});

static SCHEMA_PROPERTY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(.+)/properties/([^/]+)$").expect("SCHEMA_PROPERTY_REGEX"));
static SCHEMA_ITEMS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(.+)/items$").expect("SCHEMA_ITEMS_REGEX"));
static SCHEMA_ADDITIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(.+)/additionalProperties$").expect("SCHEMA_ADDITIONAL_REGEX")
});
static SCHEMA_COMPOSITE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(.+)/(anyOf|allOf|oneOf)/([0-9]+)$").expect("SCHEMA_COMPOSITE_REGEX")
});

static PATH_TEMPLATE_PARAMETER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("PATH_TEMPLATE_PARAMETER_REGEX"));
static PATH_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\{|/").expect("PATH_SEPARATOR_REGEX"));

const WORD_BOUNDARIES: [Boundary; 5] = [
    Boundary::Underscore,
    Boundary::Hyphen,
    Boundary::Space,
    Boundary::LowerUpper,
    Boundary::Acronym,
];

pub fn snake_case(s: &str) -> String {
    Converter::new()
        .set_boundaries(&WORD_BOUNDARIES)
        .to_case(Case::Snake)
        .convert(s)
}

pub fn pascal_case(s: &str) -> String {
    Converter::new()
        .set_boundaries(&WORD_BOUNDARIES)
        .to_case(Case::Pascal)
        .convert(s)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

pub fn camel_case(s: &str) -> String {
    Converter::new()
        .set_boundaries(&WORD_BOUNDARIES)
        .to_case(Case::Camel)
        .convert(s)
}

/// Replaces path parameter names with their snake_case form:
/// `/pets/{petId}` becomes `/pets/{pet_id}`.
pub fn snake_case_path(path: &str) -> String {
    PATH_TEMPLATE_PARAMETER_REGEX
        .replace_all(path, |c: &Captures| format!("{{{}}}", snake_case(&c[1])))
        .into_owned()
}

fn decode_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

pub trait Renamer {
    /// Class name of the model generated for the schema at `ptr`.
    fn name_type(&self, spec: &Value, ptr: &Pointer) -> String;
    /// PascalCase name of the operation at `ptr`, used to prefix its models.
    fn name_operation(&self, spec: &Value, ptr: &Pointer) -> String;
    /// Python method name of the operation at `ptr`.
    fn name_function(&self, spec: &Value, ptr: &Pointer) -> String;
    fn name_property(&self, name: &str) -> String;
    fn name_parameter(&self, name: &str) -> String;
    fn name_enum_member(&self, value: &Value) -> String;
}

#[derive(Default)]
pub struct DefaultRenamer {
    snake_case_field: bool,
    aliases: BTreeMap<String, String>,
}

impl DefaultRenamer {
    pub fn new(snake_case_field: bool, aliases: BTreeMap<String, String>) -> Self {
        Self {
            snake_case_field,
            aliases,
        }
    }

    fn operation_name_from_captures(&self, spec: &Value, m: &Captures) -> String {
        let path = m.get(1).expect("group").as_str();
        let method = m.get(2).expect("group").as_str();
        let operation =
            Pointer::from_str(&format!("/paths/{}/{}", path, method)).expect("operations");
        self.name_operation(spec, &operation)
    }

    fn parent_name(&self, spec: &Value, m: &Captures) -> String {
        let parent = m.get(1).expect("group").as_str();
        self.name_type(spec, &Pointer::from_str(parent).expect("should be a pointer"))
    }

    fn safe_field_name(&self, name: &str) -> String {
        if let Some(alias) = self.aliases.get(name) {
            return alias.clone();
        }
        let name = if self.snake_case_field {
            snake_case(name)
        } else {
            name.to_owned()
        };
        let name = python::identifier(&name, "field_");
        let name = match name.strip_prefix('_') {
            Some(rest) if !rest.is_empty() => format!("field_{}", rest.trim_start_matches('_')),
            _ => name,
        };
        if is_keyword(&name) || is_model_attribute(&name) {
            format!("{}_", name)
        } else {
            name
        }
    }
}

fn name_from_nth_match(m: &Captures, n: usize) -> String {
    let name = pascal_case(&decode_token(m.get(n).expect("group").as_str()));
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("Model{}", name),
        None => "Model".to_owned(),
        Some(_) => name,
    }
}

impl Renamer for DefaultRenamer {
    fn name_operation(&self, spec: &Value, ptr: &Pointer) -> String {
        pascal_case(&self.name_function(spec, ptr))
    }

    fn name_function(&self, spec: &Value, ptr: &Pointer) -> String {
        let operation_id = spec
            .resolve(ptr)
            .ok()
            .and_then(|v: &Value| v.get("operationId"))
            .and_then(|id| id.as_str());

        let name = match operation_id {
            Some(operation_id) => snake_case(operation_id),
            None => {
                let c = OPERATION_REGEX
                    .captures(ptr.as_str())
                    .expect("should be in correct format");
                let path = decode_token(c.get(1).expect("group").as_str());
                let method = c.get(2).expect("group").as_str();
                let path = PATH_SEPARATOR_REGEX
                    .replace_all(&snake_case_path(&path), "_")
                    .replace('}', "");
                snake_case(&format!("{}{}", method, path))
            }
        };

        let name = python::identifier(&name, "op_");
        if is_keyword(&name) || is_builtin(&name) || is_client_attribute(&name) {
            format!("{}_", name)
        } else {
            name
        }
    }

    fn name_type(&self, spec: &Value, ptr: &Pointer) -> String {
        // First handle all components
        if ptr.starts_with("/components/") {
            if let Some(m) = SCHEMA_COMPONENT_REGEX.captures(ptr.as_str()) {
                return name_from_nth_match(&m, 1);
            }

            if let Some(m) = REQUEST_BODY_COMPONENT_REGEX.captures(ptr.as_str()) {
                return name_from_nth_match(&m, 1);
            }

            if let Some(m) = PARAMETER_COMPONENT_REGEX.captures(ptr.as_str()) {
                return name_from_nth_match(&m, 1);
            }

            if let Some(m) = RESPONSE_COMPONENT_REGEX.captures(ptr.as_str()) {
                return name_from_nth_match(&m, 1);
            }
        }

        // request bodies
        if let Some(m) = OPERATION_REQUEST_BODY_REGEX.captures(ptr.as_str()) {
            let operation_name = self.operation_name_from_captures(spec, &m);

            return format!("{}Request", operation_name);
        }

        // parameters shared by every operation of a path
        if let Some(m) = PATH_PARAMETER_REGEX.captures(ptr.as_str()) {
            let path_name = name_from_nth_match(&m, 1);
            let parameter_id = m.get(2).expect("group").as_str();

            return format!("{}Parameter{}", path_name, parameter_id);
        }

        // parameters
        if let Some(m) = OPERATION_PARAMETER_REGEX.captures(ptr.as_str()) {
            let operation_name = self.operation_name_from_captures(spec, &m);
            let parameter_id = m.get(3).expect("group").as_str();

            return format!("{}Parameter{}", operation_name, parameter_id);
        }

        // response bodies
        if let Some(m) = OPERATION_RESPONSE_BODY_REGEX.captures(ptr.as_str()) {
            let response_code = pascal_case(m.get(3).expect("group").as_str());
            let operation_name = self.operation_name_from_captures(spec, &m);

            return format!("{}Response{}", operation_name, response_code);
        }

        // properties
        if let Some(m) = SCHEMA_PROPERTY_REGEX.captures(ptr.as_str()) {
            let attribute_name = decode_token(m.get(2).expect("group").as_str());
            return format!("{}{}", self.parent_name(spec, &m), pascal_case(&attribute_name));
        }

        // items
        if let Some(m) = SCHEMA_ITEMS_REGEX.captures(ptr.as_str()) {
            return format!("{}Item", self.parent_name(spec, &m));
        }

        // values of free-form objects
        if let Some(m) = SCHEMA_ADDITIONAL_REGEX.captures(ptr.as_str()) {
            return format!("{}Value", self.parent_name(spec, &m));
        }

        if let Some(m) = SCHEMA_COMPOSITE_REGEX.captures(ptr.as_str()) {
            let index = m.get(3).expect("group").as_str();
            return format!("{}V{}", self.parent_name(spec, &m), index);
        }

        // anything else is named after its last token
        let last = ptr.as_str().rsplit('/').next().unwrap_or_default();
        let name = pascal_case(&decode_token(last));
        if name.is_empty() {
            "Model".to_owned()
        } else {
            name
        }
    }

    fn name_property(&self, name: &str) -> String {
        self.safe_field_name(name)
    }

    fn name_parameter(&self, name: &str) -> String {
        self.safe_field_name(name)
    }

    fn name_enum_member(&self, value: &Value) -> String {
        let name = match value {
            Value::String(s) if s.is_empty() => "_".to_owned(),
            Value::String(s) => python::identifier(s, "field_"),
            Value::Number(n) => {
                let prefix = if n.is_f64() { "number" } else { "integer" };
                let n = n.to_string().replace('-', "minus_").replace(['.', '+'], "_");
                format!("{}_{}", prefix, n)
            }
            Value::Bool(b) => format!("bool_{}", b),
            Value::Null => "none".to_owned(),
            _ => "value".to_owned(),
        };
        if is_keyword(&name) {
            format!("{}_", name)
        } else {
            name
        }
    }
}

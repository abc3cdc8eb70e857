//! Python-side vocabulary shared by the analyzer and the writers: type hints,
//! literals and identifier rules.

use std::{collections::BTreeSet, fmt};

use genco::{lang::python, quote};
use serde_json::Value;

/// Module the generated models live in, relative to the generated package.
pub const MODELS_MODULE: &str = ".models";

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

const BUILTINS: &[&str] = &[
    "abs", "all", "any", "ascii", "bin", "bool", "breakpoint", "bytearray", "bytes",
    "callable", "chr", "classmethod", "compile", "complex", "copyright", "credits", "delattr",
    "dict", "dir", "divmod", "enumerate", "eval", "exec", "exit", "filter", "float", "format",
    "frozenset", "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input", "int",
    "isinstance", "issubclass", "iter", "len", "license", "list", "locals", "map", "max",
    "memoryview", "min", "next", "object", "oct", "open", "ord", "pow", "print", "property",
    "quit", "range", "repr", "reversed", "round", "set", "setattr", "slice", "sorted",
    "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip",
];

/// Attributes of pydantic's `BaseModel` a field must not shadow.
const MODEL_ATTRIBUTES: &[&str] = &[
    "construct", "copy", "dict", "fields", "json", "parse_file", "parse_obj", "parse_raw",
    "schema", "schema_json", "update_forward_refs", "validate",
];

/// Methods of the API client base class an operation must not shadow.
const CLIENT_ATTRIBUTES: &[&str] = &[
    "delete", "get", "get_default_headers", "get_default_query_params",
    "get_default_username_password_authentication", "get_request_timeout", "patch", "post",
    "put", "request",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

pub fn is_model_attribute(name: &str) -> bool {
    MODEL_ATTRIBUTES.contains(&name)
}

pub fn is_client_attribute(name: &str) -> bool {
    CLIENT_ATTRIBUTES.contains(&name)
}

/// Replaces every character that cannot appear in an identifier with `_` and
/// guards against a leading digit.
pub fn identifier(name: &str, digit_prefix: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match name.chars().next() {
        None => "_".to_owned(),
        Some(c) if c.is_ascii_digit() => format!("{}{}", digit_prefix, name),
        Some(_) => name,
    }
}

/// A Python string literal in the style `repr()` produces.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// A triple-quoted docstring. Continuation lines are separate token lines, so
/// they pick up the indentation of the surrounding block.
pub fn docstring(text: &str) -> python::Tokens {
    let escaped = text
        .trim()
        .replace('\\', "\\\\")
        .replace("\"\"\"", "\\\"\\\"\\\"");
    let lines: Vec<&str> = escaped.lines().map(str::trim_end).collect();

    let mut tokens = python::Tokens::new();
    match lines.as_slice() {
        [] => tokens.append("\"\"\"\"\"\""),
        [line] => tokens.append(format!("\"\"\"{}\"\"\"", line)),
        [first, rest @ ..] => {
            tokens.append(format!("\"\"\"{}", first));
            for line in rest {
                if line.is_empty() {
                    tokens.line();
                } else {
                    tokens.push();
                    tokens.append(line.to_string());
                }
            }
            tokens.push();
            tokens.append("\"\"\"");
        }
    }
    tokens
}

/// Renders a JSON value as the equivalent Python literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string_literal(s),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", string_literal(k), literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// How type hints are spelled in a particular generated file.
#[derive(Debug, Clone, Copy)]
pub struct HintContext<'a> {
    /// Module models are imported from, or `None` inside the models module itself.
    pub models_module: Option<&'a str>,
    /// Use `list[...]`/`dict[...]` instead of `typing.List`/`typing.Dict`.
    pub standard_collections: bool,
    /// Module providing `Literal` (`typing` or `typing_extensions`).
    pub literal_module: &'a str,
}

impl Default for HintContext<'_> {
    fn default() -> Self {
        Self {
            models_module: None,
            standard_collections: false,
            literal_module: "typing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeHint {
    Any,
    None,
    Str,
    Int,
    Float,
    Bool,
    Bytes,
    DateTime,
    Date,
    Time,
    Uuid,
    Email,
    Url,
    Model(String),
    List(Box<TypeHint>),
    Dict(Box<TypeHint>),
    Optional(Box<TypeHint>),
    Union(Vec<TypeHint>),
    /// Already rendered Python literals.
    Literal(Vec<String>),
}

impl TypeHint {
    pub fn optional(self) -> Self {
        match self {
            TypeHint::Optional(_) | TypeHint::Any | TypeHint::None => self,
            other => TypeHint::Optional(Box::new(other)),
        }
    }

    /// Names of every model this hint refers to.
    pub fn model_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_model_names(&mut names);
        names
    }

    fn collect_model_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            TypeHint::Model(name) => {
                names.insert(name);
            }
            TypeHint::List(inner) | TypeHint::Dict(inner) | TypeHint::Optional(inner) => {
                inner.collect_model_names(names)
            }
            TypeHint::Union(members) => {
                members.iter().for_each(|m| m.collect_model_names(names))
            }
            _ => {}
        }
    }

    /// `(module, name)` pairs the rendered hint needs imported.
    pub fn imports(&self, ctx: &HintContext<'_>) -> BTreeSet<(String, String)> {
        let mut imports = BTreeSet::new();
        self.collect_imports(ctx, &mut imports);
        imports
    }

    fn collect_imports(&self, ctx: &HintContext<'_>, imports: &mut BTreeSet<(String, String)>) {
        fn add(imports: &mut BTreeSet<(String, String)>, module: &str, name: &str) {
            imports.insert((module.to_owned(), name.to_owned()));
        }
        match self {
            TypeHint::Any => add(imports, "typing", "Any"),
            TypeHint::DateTime => add(imports, "datetime", "datetime"),
            TypeHint::Date => add(imports, "datetime", "date"),
            TypeHint::Time => add(imports, "datetime", "time"),
            TypeHint::Uuid => add(imports, "uuid", "UUID"),
            TypeHint::Email => add(imports, "pydantic", "EmailStr"),
            TypeHint::Url => add(imports, "pydantic", "AnyUrl"),
            TypeHint::Literal(_) => add(imports, ctx.literal_module, "Literal"),
            TypeHint::Model(name) => {
                if let Some(module) = ctx.models_module {
                    add(imports, module, name);
                }
            }
            TypeHint::List(inner) => {
                if !ctx.standard_collections {
                    add(imports, "typing", "List");
                }
                inner.collect_imports(ctx, imports);
            }
            TypeHint::Dict(inner) => {
                if !ctx.standard_collections {
                    add(imports, "typing", "Dict");
                }
                inner.collect_imports(ctx, imports);
            }
            TypeHint::Optional(inner) => {
                add(imports, "typing", "Optional");
                inner.collect_imports(ctx, imports);
            }
            TypeHint::Union(members) => {
                add(imports, "typing", "Union");
                members.iter().for_each(|m| m.collect_imports(ctx, imports));
            }
            TypeHint::None
            | TypeHint::Str
            | TypeHint::Int
            | TypeHint::Float
            | TypeHint::Bool
            | TypeHint::Bytes => {}
        }
    }

    /// Renders the hint, registering its imports with the token stream.
    pub fn to_tokens(&self, ctx: &HintContext<'_>) -> python::Tokens {
        let typing = |name: &'static str| python::import("typing", name);
        match self {
            TypeHint::Any => quote!($(typing("Any"))),
            TypeHint::None => quote!(None),
            TypeHint::Str => quote!(str),
            TypeHint::Int => quote!(int),
            TypeHint::Float => quote!(float),
            TypeHint::Bool => quote!(bool),
            TypeHint::Bytes => quote!(bytes),
            TypeHint::DateTime => quote!($(python::import("datetime", "datetime"))),
            TypeHint::Date => quote!($(python::import("datetime", "date"))),
            TypeHint::Time => quote!($(python::import("datetime", "time"))),
            TypeHint::Uuid => quote!($(python::import("uuid", "UUID"))),
            TypeHint::Email => quote!($(python::import("pydantic", "EmailStr"))),
            TypeHint::Url => quote!($(python::import("pydantic", "AnyUrl"))),
            TypeHint::Model(name) => match ctx.models_module {
                Some(module) => quote!($(python::import(module.to_owned(), name.clone()))),
                None => quote!($(name.as_str())),
            },
            TypeHint::List(inner) => {
                let inner = inner.to_tokens(ctx);
                if ctx.standard_collections {
                    quote!(list[$inner])
                } else {
                    quote!($(typing("List"))[$inner])
                }
            }
            TypeHint::Dict(inner) => {
                let inner = inner.to_tokens(ctx);
                if ctx.standard_collections {
                    quote!(dict[str, $inner])
                } else {
                    quote!($(typing("Dict"))[str, $inner])
                }
            }
            TypeHint::Optional(inner) => {
                let inner = inner.to_tokens(ctx);
                quote!($(typing("Optional"))[$inner])
            }
            TypeHint::Union(members) => {
                let members = members.iter().map(|m| m.to_tokens(ctx));
                quote!($(typing("Union"))[$(for m in members join (, ) => $m)])
            }
            TypeHint::Literal(values) => {
                let literal = python::import(ctx.literal_module.to_owned(), "Literal");
                quote!($literal[$(for v in values join (, ) => $(v.as_str()))])
            }
        }
    }
}

impl TypeHint {
    /// The hint as it reads once its imports are in scope.
    pub fn render(&self, standard_collections: bool) -> String {
        let render = |inner: &TypeHint| inner.render(standard_collections);
        match self {
            TypeHint::Any => "Any".to_owned(),
            TypeHint::None => "None".to_owned(),
            TypeHint::Str => "str".to_owned(),
            TypeHint::Int => "int".to_owned(),
            TypeHint::Float => "float".to_owned(),
            TypeHint::Bool => "bool".to_owned(),
            TypeHint::Bytes => "bytes".to_owned(),
            TypeHint::DateTime => "datetime".to_owned(),
            TypeHint::Date => "date".to_owned(),
            TypeHint::Time => "time".to_owned(),
            TypeHint::Uuid => "UUID".to_owned(),
            TypeHint::Email => "EmailStr".to_owned(),
            TypeHint::Url => "AnyUrl".to_owned(),
            TypeHint::Model(name) => name.clone(),
            TypeHint::List(inner) if standard_collections => format!("list[{}]", render(inner)),
            TypeHint::List(inner) => format!("List[{}]", render(inner)),
            TypeHint::Dict(inner) if standard_collections => {
                format!("dict[str, {}]", render(inner))
            }
            TypeHint::Dict(inner) => format!("Dict[str, {}]", render(inner)),
            TypeHint::Optional(inner) => format!("Optional[{}]", render(inner)),
            TypeHint::Union(members) => {
                let members: Vec<_> = members.iter().map(render).collect();
                format!("Union[{}]", members.join(", "))
            }
            TypeHint::Literal(values) => format!("Literal[{}]", values.join(", ")),
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literals_follow_python_repr() {
        assert_eq!(literal(&json!(null)), "None");
        assert_eq!(literal(&json!(true)), "True");
        assert_eq!(literal(&json!(3)), "3");
        assert_eq!(literal(&json!("it's")), "'it\\'s'");
        assert_eq!(literal(&json!(["a", 1])), "['a', 1]");
        assert_eq!(literal(&json!({"k": false})), "{'k': False}");
    }

    #[test]
    fn docstrings_escape_quotes_and_keep_lines() {
        let rendered = docstring("Say \"\"\"hi\"\"\"").to_string().expect("render");
        assert_eq!(rendered.trim_end(), "\"\"\"Say \\\"\\\"\\\"hi\\\"\\\"\\\"\"\"\"");

        let rendered = docstring("Summary\n\nDetails").to_string().expect("render");
        assert_eq!(rendered.trim_end(), "\"\"\"Summary\n\nDetails\n\"\"\"");
    }

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(identifier("x-rate.limit", "field_"), "x_rate_limit");
        assert_eq!(identifier("2fa", "field_"), "field_2fa");
        assert_eq!(identifier("", "field_"), "_");
    }

    #[test]
    fn optional_does_not_nest() {
        let hint = TypeHint::Str.optional().optional();
        assert_eq!(hint.to_string(), "Optional[str]");
        assert_eq!(TypeHint::Any.optional(), TypeHint::Any);
    }

    #[test]
    fn imports_depend_on_context() {
        let hint = TypeHint::List(Box::new(TypeHint::Model("Pet".to_owned())));

        let inside_models = hint.imports(&HintContext::default());
        assert_eq!(
            inside_models.into_iter().collect::<Vec<_>>(),
            vec![("typing".to_owned(), "List".to_owned())]
        );

        let ctx = HintContext {
            models_module: Some(MODELS_MODULE),
            standard_collections: true,
            literal_module: "typing",
        };
        assert_eq!(
            hint.imports(&ctx).into_iter().collect::<Vec<_>>(),
            vec![(".models".to_owned(), "Pet".to_owned())]
        );
    }

    #[test]
    fn collects_nested_model_names() {
        let hint = TypeHint::Union(vec![
            TypeHint::Model("Cat".to_owned()),
            TypeHint::Dict(Box::new(TypeHint::Model("Dog".to_owned()))),
        ]);
        assert_eq!(
            hint.model_names().into_iter().collect::<Vec<_>>(),
            vec!["Cat", "Dog"]
        );
    }
}

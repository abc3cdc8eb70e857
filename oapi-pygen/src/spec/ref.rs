use std::{str::FromStr, sync::LazyLock};

use derive_more::{Display, Error};
use jsonptr::Pointer;
use log::trace;
use regex::Regex;
use serde::{de::Error, Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, RequestBody, Response, Schema, Spec};

static RE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^/components/(?P<type>[^/]+)/(?P<name>[^/]+)$").expect("RE_REF")
});

/// References are followed at most this many times before giving up on a cycle.
const MAX_REF_DEPTH: usize = 32;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ObjectOrReference<T>
where
    T: serde::de::DeserializeOwned,
{
    Ref {
        #[serde(rename = "$ref", serialize_with = "serialize_ref")]
        ref_path: Pointer,
    },
    Object(T),
}

fn serialize_ref<S: serde::Serializer>(ptr: &Pointer, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("#{}", ptr))
}

impl<'de, T: serde::de::DeserializeOwned> serde::de::Deserialize<'de> for ObjectOrReference<T> {
    fn deserialize<D>(deserializer: D) -> Result<ObjectOrReference<T>, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let s: Value = Deserialize::deserialize(deserializer)?;
        if let Some(ref_path) = s.get("$ref") {
            match ref_path {
                Value::String(ref_path) => {
                    let local = ref_path.strip_prefix('#').ok_or_else(|| {
                        D::Error::custom(format!("only local references are supported: {}", ref_path))
                    })?;
                    Pointer::from_str(local)
                        .map(|ref_path| ObjectOrReference::Ref { ref_path })
                        .map_err(D::Error::custom)
                }
                _ => Err(D::Error::custom("$ref is not of type string")),
            }
        } else {
            serde_json::from_value(s)
                .map(|v| ObjectOrReference::Object(v))
                .map_err(D::Error::custom)
        }
    }
}

impl<T: serde::de::DeserializeOwned> ObjectOrReference<T>
where
    T: FromRef,
{
    pub fn resolve(&self, spec: &Spec) -> Result<T, RefError> {
        match self {
            Self::Object(component) => Ok(component.clone()),
            Self::Ref { ref_path } => T::from_ref(spec, ref_path),
        }
    }
}

impl<T: serde::de::DeserializeOwned> ObjectOrReference<T> {
    pub fn object(&self) -> Option<&T> {
        match self {
            ObjectOrReference::Object(v) => Some(v),
            ObjectOrReference::Ref { .. } => None,
        }
    }

    pub fn reference(&self) -> Option<&Pointer> {
        match self {
            ObjectOrReference::Ref { ref_path } => Some(ref_path),
            ObjectOrReference::Object(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Display, Error)]
pub enum RefError {
    #[display(fmt = "Invalid type: {}", _0)]
    InvalidType(#[error(not(source))] String),

    #[display(fmt = "Mismatched type: cannot reference a {} as a {}", _0, _1)]
    MismatchedType(RefType, RefType),

    #[display(fmt = "Unresolvable path: {}", _0)]
    Unresolvable(#[error(not(source))] String),

    #[display(fmt = "Reference cycle at: {}", _0)]
    Cycle(#[error(not(source))] String),
}

#[derive(Copy, Clone, Debug, PartialEq, Display)]
pub enum RefType {
    Schema,
    Response,
    Parameter,
    Example,
    RequestBody,
    Header,
    SecurityScheme,
    Link,
    Callback,
}

impl FromStr for RefType {
    type Err = RefError;

    fn from_str(typ: &str) -> Result<Self, Self::Err> {
        Ok(match typ {
            "schemas" => Self::Schema,
            "responses" => Self::Response,
            "parameters" => Self::Parameter,
            "examples" => Self::Example,
            "requestBodies" => Self::RequestBody,
            "headers" => Self::Header,
            "securitySchemes" => Self::SecurityScheme,
            "links" => Self::Link,
            "callbacks" => Self::Callback,
            typ => return Err(RefError::InvalidType(typ.to_owned())),
        })
    }
}

/// A local reference to a named component, e.g. `#/components/schemas/Pet`.
#[derive(Debug, Clone)]
pub struct Ref {
    pub kind: RefType,
    pub name: String,
}

impl FromStr for Ref {
    type Err = RefError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let parts = RE_REF
            .captures(path)
            .ok_or_else(|| RefError::Unresolvable(path.to_owned()))?;

        trace!("creating Ref: {}/{}", &parts["type"], &parts["name"]);

        Ok(Self {
            kind: parts["type"].parse()?,
            name: parts["name"].replace("~1", "/").replace("~0", "~"),
        })
    }
}

pub trait FromRef: Clone {
    fn from_ref(spec: &Spec, path: &str) -> Result<Self, RefError>;
}

fn component<'a, T, F>(
    spec: &'a Spec,
    path: &str,
    expected: RefType,
    lookup: F,
) -> Result<T, RefError>
where
    T: serde::de::DeserializeOwned + Clone + 'a,
    F: Fn(&'a Spec, &str) -> Option<&'a ObjectOrReference<T>>,
{
    let mut path = path.to_owned();
    for _ in 0..MAX_REF_DEPTH {
        let r: Ref = path.parse()?;
        if r.kind != expected {
            return Err(RefError::MismatchedType(r.kind, expected));
        }
        match lookup(spec, &r.name) {
            Some(ObjectOrReference::Object(o)) => return Ok(o.clone()),
            Some(ObjectOrReference::Ref { ref_path }) => path = ref_path.to_string(),
            None => return Err(RefError::Unresolvable(path)),
        }
    }
    Err(RefError::Cycle(path))
}

impl FromRef for Schema {
    fn from_ref(spec: &Spec, path: &str) -> Result<Self, RefError> {
        component(spec, path, RefType::Schema, |s, n| s.components.schemas.get(n))
    }
}

impl FromRef for Parameter {
    fn from_ref(spec: &Spec, path: &str) -> Result<Self, RefError> {
        component(spec, path, RefType::Parameter, |s, n| s.components.parameters.get(n))
    }
}

impl FromRef for RequestBody {
    fn from_ref(spec: &Spec, path: &str) -> Result<Self, RefError> {
        component(spec, path, RefType::RequestBody, |s, n| {
            s.components.request_bodies.get(n)
        })
    }
}

impl FromRef for Response {
    fn from_ref(spec: &Spec, path: &str) -> Result<Self, RefError> {
        component(spec, path, RefType::Response, |s, n| s.components.responses.get(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> Spec {
        serde_json::from_value(serde_json::json!({
            "openapi": "3.0.3",
            "components": {
                "schemas": {
                    "Pet": { "type": "object" },
                    "Alias": { "$ref": "#/components/schemas/Pet" },
                    "Loop": { "$ref": "#/components/schemas/Loop" }
                }
            }
        }))
        .expect("valid document")
    }

    #[test]
    fn follows_chained_references() {
        let schema = Schema::from_ref(&spec(), "/components/schemas/Alias").expect("resolvable");
        assert!(schema.is_object());
    }

    #[test]
    fn rejects_mismatched_kinds() {
        let err = Parameter::from_ref(&spec(), "/components/schemas/Pet").unwrap_err();
        assert_eq!(err, RefError::MismatchedType(RefType::Schema, RefType::Parameter));
    }

    #[test]
    fn reports_missing_and_cyclic_references() {
        assert!(matches!(
            Schema::from_ref(&spec(), "/components/schemas/Nope"),
            Err(RefError::Unresolvable(_))
        ));
        assert!(matches!(
            Schema::from_ref(&spec(), "/components/schemas/Loop"),
            Err(RefError::Cycle(_))
        ));
    }

    #[test]
    fn remote_references_fail_to_deserialize() {
        let parsed: Result<ObjectOrReference<Schema>, _> =
            serde_json::from_value(serde_json::json!({ "$ref": "other.yaml#/components/schemas/Pet" }));
        assert!(parsed.is_err());
    }
}

//! Serializable view of a parsed registry.

use argbind_core::{Bound, Kind, OptionDescriptor, Registry, SchemaError, TypeTag, Value, ValueSource};
use serde::Serialize;
use serde_json::Value as Json;

/// One option after a parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionReport {
    pub option: String,
    pub kind: Kind,
    pub source: ValueSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parm: Option<String>,
    pub count: usize,
    pub value: Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub options: Vec<OptionReport>,
}

impl ParseReport {
    /// Builds the report from a registry's output fields and slots.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a descriptor's arity has no kind.
    pub fn from_registry(registry: &Registry) -> Result<Self, SchemaError> {
        let options = registry
            .options()
            .iter()
            .map(|opt| {
                Ok(OptionReport {
                    option: opt.ident(),
                    kind: opt.kind()?,
                    source: opt.output.source,
                    parm: opt.output.parm_str.clone(),
                    count: opt.output.count,
                    value: bound_json(opt),
                })
            })
            .collect::<Result<_, SchemaError>>()?;
        Ok(Self { options })
    }
}

fn bound_json(opt: &OptionDescriptor) -> Json {
    let Some(slot) = &opt.storage else {
        return Json::Null;
    };
    match &*slot.borrow() {
        Bound::Unset | Bound::Null => Json::Null,
        Bound::One(value) => value_json(opt, value),
        Bound::Many(values) => Json::Array(
            values
                .iter()
                .take_while(|v| !matches!(v, Value::Str(None)))
                .map(|v| value_json(opt, v))
                .collect(),
        ),
    }
}

fn value_json(opt: &OptionDescriptor, value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::from(*b),
        Value::Short(n) => Json::from(*n),
        Value::UShort(n) => Json::from(*n),
        Value::Int(n) => Json::from(*n),
        Value::UInt(n) => Json::from(*n),
        Value::Long(n) => Json::from(*n),
        Value::ULong(n) => Json::from(*n),
        Value::Size(n) => Json::from(*n),
        Value::Float(x) => Json::from(*x),
        Value::Double(x) => Json::from(*x),
        Value::Char(c) => Json::from(c.to_string()),
        Value::Str(s) => s.as_deref().map_or(Json::Null, Json::from),
        Value::Enum(n) => match (&opt.enum_table, opt.value_type) {
            (Some(table), TypeTag::Enum) => table.name_of(*n).map_or_else(|| Json::from(*n), Json::from),
            _ => Json::from(*n),
        },
        Value::Other(_) => Json::from(format!(
            "<{}>",
            opt.codec.as_ref().map_or("other", |c| c.type_name.as_str())
        )),
    }
}

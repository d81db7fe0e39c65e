//! Runtime values and captured frames.

use std::fmt;
use std::sync::Arc;

use vigil_engine::RuntimeValue;

use crate::ast::FunctionDef;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `print(..)` collects its arguments into the engine's output.
    Print,
    /// `Point(x, y)` builds a record with fields `x` and `y`.
    Point,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Point => "Point",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    Str(String),
    Record(Vec<(String, Value)>),
    Function(Arc<FunctionDef>),
    Builtin(Builtin),
}

impl Value {
    pub fn meta_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Int(_) => "Int",
            Value::Str(_) => "String",
            Value::Record(_) => "Record",
            Value::Function(_) | Value::Builtin(Builtin::Print) => "Function",
            Value::Builtin(Builtin::Point) => "Class",
        }
    }

    /// Member lookup.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.properties()
            .into_iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Function(def) => write!(f, "fn {}({})", def.name, def.params.join(", ")),
            Value::Builtin(Builtin::Print) => f.write_str("fn print"),
            Value::Builtin(Builtin::Point) => f.write_str("class Point"),
        }
    }
}

impl RuntimeValue for Value {
    fn has_properties(&self) -> bool {
        matches!(self, Value::Record(_) | Value::Str(_))
    }

    fn properties(&self) -> Vec<(String, Self)> {
        match self {
            Value::Record(fields) => fields.clone(),
            Value::Str(s) => {
                let length = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
                vec![("length".to_owned(), Value::Int(length))]
            }
            _ => Vec::new(),
        }
    }

    fn is_executable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(Builtin::Print))
    }

    fn is_instantiable(&self) -> bool {
        matches!(self, Value::Builtin(Builtin::Point))
    }
}

/// Variables visible at an executed section, outermost binding first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptFrame {
    pub variables: Vec<(String, Value)>,
}

impl ScriptFrame {
    /// The innermost binding of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

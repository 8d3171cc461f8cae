pub mod amf0;
pub mod errors;

pub use amf0::Value;

pub fn number<T: Into<f64>>(value: T) -> Value {
    Value::Number(value.into())
}

pub fn boolean(value: bool) -> Value {
    Value::Boolean(value)
}

pub fn string<T: Into<String>>(value: T) -> Value {
    Value::String(value.into())
}

pub fn object(entries: Vec<(String, Value)>) -> Value {
    Value::Object(entries)
}

pub fn null() -> Value {
    Value::Null
}

pub fn ecma_array(entries: Vec<(String, Value)>) -> Value {
    Value::EcmaArray(entries)
}

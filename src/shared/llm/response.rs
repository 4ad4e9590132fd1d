use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::Value;

/// Response schema for structured-output requests.
///
/// Generation APIs accept only an OpenAPI subset: subschemas are inlined and
/// `$schema`, `title` and `definitions` keys are stripped.
pub fn response_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root).unwrap_or(Value::Null);
    strip_unsupported(&mut value);
    value
}

fn strip_unsupported(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("$schema");
            map.remove("title");
            map.remove("definitions");
            for child in map.values_mut() {
                strip_unsupported(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_unsupported),
        _ => {}
    }
}

use serde::de::DeserializeOwned;
use serde_json::Value;

// Reads an optional field, treating a missing or malformed value as absent.
pub fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

// Reads a list field element by element. Entries that don't match the
// expected shape are dropped instead of failing the whole list.
pub fn list_field<T: DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

// Overlays the top level keys of `update` on `base`. Nested values are
// replaced wholesale.
pub fn merge_shallow(base: &mut Value, update: &serde_json::Map<String, Value>) {
    match base.as_object_mut() {
        Some(object) => {
            for (key, value) in update {
                object.insert(key.clone(), value.clone());
            }
        }
        None => *base = Value::Object(update.clone()),
    }
}

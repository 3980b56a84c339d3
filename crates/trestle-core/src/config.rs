use serde_json::{Map, Value};

/// Loosely typed editor configuration: a JSON object addressed by dotted paths
/// (`"canvas.diagram.flow.direction"`).
///
/// Typed views such as the canvas sizing config read from this value with their own defaults,
/// so a host only needs to provide the keys it wants to override.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue(Value);

impl Default for ConfigValue {
    fn default() -> Self {
        Self::empty_object()
    }
}

fn pointer(dotted_path: &str) -> String {
    dotted_path
        .split('.')
        .map(|seg| format!("/{}", seg.replace('~', "~0").replace('/', "~1")))
        .collect()
}

impl ConfigValue {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        self.0.pointer(&pointer(dotted_path))
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path).and_then(Value::as_bool)
    }

    /// Numbers only; non-finite or non-numeric values read as `None`.
    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)
            .and_then(Value::as_f64)
            .filter(|f| f.is_finite())
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get(dotted_path).and_then(Value::as_u64)
    }

    /// Writes `value` at `dotted_path`, replacing any non-object on the way with an object.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let (parents, leaf) = match dotted_path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, dotted_path),
        };
        let mut slot = &mut self.0;
        for seg in parents.into_iter().flat_map(|p| p.split('.')) {
            let Some(map) = object_mut(slot) else {
                return;
            };
            slot = map.entry(seg.to_string()).or_insert(Value::Null);
        }
        if let Some(map) = object_mut(slot) {
            map.insert(leaf.to_string(), value);
        }
    }

    /// Merges `other` into this value: objects merge key by key, anything else replaces.
    pub fn deep_merge(&mut self, other: &Value) {
        merge_into(&mut self.0, other);
    }
}

fn object_mut(slot: &mut Value) -> Option<&mut Map<String, Value>> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

fn merge_into(target: &mut Value, overlay: &Value) {
    if let (Some(target), Some(overlay)) = (target.as_object_mut(), overlay.as_object()) {
        for (key, value) in overlay {
            match target.get_mut(key) {
                Some(existing) => merge_into(existing, value),
                None => {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        return;
    }
    *target = overlay.clone();
}

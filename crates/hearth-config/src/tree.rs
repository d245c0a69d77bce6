use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Immutable configuration tree with dotted-key lookup.
///
/// The root is always a JSON object. Each file in the config directory
/// contributes one top-level key named after its file stem.
///
/// # Example
///
/// ```
/// use hearth_config::ConfigTree;
/// use serde_json::json;
///
/// let tree = ConfigTree::new(json!({ "app": { "http": { "port": 3333 } } }));
/// assert_eq!(tree.get_as::<u16>("app.http.port"), Some(3333));
/// assert!(tree.has("app.http"));
/// assert!(!tree.has("app.https"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }
}

impl ConfigTree {
    /// Wraps `root`. Non-object roots are replaced by an empty object.
    #[must_use]
    pub fn new(root: Value) -> Self {
        match root {
            Value::Object(_) => Self { root },
            _ => Self::default(),
        }
    }

    /// Looks up a dotted key such as `database.connection`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.root, |node, segment| node.get(segment))
    }

    /// Looks up and deserialises a dotted key, returning `None` when the
    /// key is missing or has the wrong shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Returns `true` when `key` resolves to a value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Fills in keys of `defaults` missing from the tree, recursing into
    /// nested objects. Existing values always win.
    #[must_use]
    pub fn merge_defaults(mut self, defaults: Value) -> Self {
        merge_missing(&mut self.root, defaults);
        self
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.root
    }

    /// Inserts a top-level section, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        if let Value::Object(map) = &mut self.root {
            map.insert(key.into(), value);
        }
    }
}

fn merge_missing(target: &mut Value, defaults: Value) {
    let (Value::Object(target_map), Value::Object(default_map)) = (target, defaults) else {
        return;
    };
    for (key, default) in default_map {
        match target_map.get_mut(&key) {
            Some(existing) => merge_missing(existing, default),
            None => {
                target_map.insert(key, default);
            }
        }
    }
}

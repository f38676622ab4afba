//! Record instances.
//!
//! A `RecordValue` is a handle to field storage plus the shared, immutable
//! `RecordType`. Fields are kept in declaration order and indexed by their
//! lower-cased name. Records without metadata are anonymous: they back JSON
//! objects and call-stack frames and print as `record(...)`.

use std::fmt;
use std::sync::Arc;

use dws_types::RecordType;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::visit::Visit;
use super::Value;

struct RecordData {
    record_type: Option<Arc<RecordType>>,
    /// `(declared name, value)` in declaration order.
    fields: Vec<(String, Value)>,
    /// Lower-cased name -> index into `fields`.
    index: FxHashMap<String, usize>,
}

/// Handle to a record instance.
#[derive(Clone)]
pub struct RecordValue(Arc<RwLock<RecordData>>);

impl RecordValue {
    /// Build a typed record from fully populated fields.
    pub fn new(record_type: Arc<RecordType>, fields: Vec<(String, Value)>) -> Self {
        Self::build(Some(record_type), fields)
    }

    /// Build a record with no type metadata.
    pub fn anonymous(fields: Vec<(String, Value)>) -> Self {
        Self::build(None, fields)
    }

    fn build(record_type: Option<Arc<RecordType>>, fields: Vec<(String, Value)>) -> Self {
        let mut data = RecordData {
            record_type,
            fields: Vec::with_capacity(fields.len()),
            index: FxHashMap::default(),
        };
        for (name, value) in fields {
            data.insert(name, value);
        }
        RecordValue(Arc::new(RwLock::new(data)))
    }

    /// Declared type name, or `None` for anonymous records.
    pub fn type_name(&self) -> Option<String> {
        self.0
            .read()
            .record_type
            .as_ref()
            .map(|ty| ty.name().to_string())
    }

    pub fn record_type(&self) -> Option<Arc<RecordType>> {
        self.0.read().record_type.clone()
    }

    /// Case-insensitive field read.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        let data = self.0.read();
        data.index
            .get(&name.to_lowercase())
            .and_then(|&i| data.fields.get(i))
            .map(|(_, value)| value.clone())
    }

    /// Case-insensitive field write.
    ///
    /// Typed records only accept declared fields and return `false`
    /// otherwise. Anonymous records grow a new field.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        let mut data = self.0.write();
        if let Some(&i) = data.index.get(&name.to_lowercase()) {
            if let Some(slot) = data.fields.get_mut(i) {
                slot.1 = value;
                return true;
            }
        }
        if data.record_type.is_some() {
            return false;
        }
        data.insert(name.to_string(), value);
        true
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.0
            .read()
            .fields
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// `(declared name, value)` pairs in declaration order.
    pub fn fields(&self) -> Vec<(String, Value)> {
        self.0.read().fields.clone()
    }

    pub fn field_count(&self) -> usize {
        self.0.read().fields.len()
    }

    /// Independent copy. Nested records are copied recursively; other
    /// composite fields (arrays) keep sharing their storage. A record that
    /// is reached again from inside itself is kept as a handle.
    pub fn deep_copy(&self) -> RecordValue {
        let Some(_visit) = Visit::enter(Arc::as_ptr(&self.0)) else {
            return self.clone();
        };
        let data = self.0.read();
        let fields = data
            .fields
            .iter()
            .map(|(name, value)| {
                let copied = match value {
                    Value::Record(nested) => Value::Record(nested.deep_copy()),
                    other => other.clone(),
                };
                (name.clone(), copied)
            })
            .collect();
        Self::build(data.record_type.clone(), fields)
    }

    /// Returns `true` if both handles share one instance.
    #[inline]
    pub fn ptr_eq(&self, other: &RecordValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Structural equality: same type name (case-insensitive) and every
    /// field equal by `Value::equals`. A field missing on either side makes
    /// the records unequal. Once a walk comes back to a record it is
    /// already comparing, only identity counts.
    pub fn equals(&self, other: &RecordValue) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let Some(_visit) = Visit::enter(Arc::as_ptr(&self.0)) else {
            return false;
        };
        let same_type = match (self.type_name(), other.type_name()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
            (None, None) => true,
            _ => false,
        };
        if !same_type || self.field_count() != other.field_count() {
            return false;
        }
        self.fields().iter().all(|(name, value)| {
            other
                .get_field(name)
                .is_some_and(|theirs| value.equals(&theirs))
        })
    }
}

impl RecordData {
    fn insert(&mut self, name: String, value: Value) {
        let key = name.to_lowercase();
        match self.index.get(&key) {
            Some(&i) => {
                if let Some(slot) = self.fields.get_mut(i) {
                    slot.1 = value;
                }
            }
            None => {
                self.index.insert(key, self.fields.len());
                self.fields.push((name, value));
            }
        }
    }
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(_visit) = Visit::enter(Arc::as_ptr(&self.0)) else {
            return f.write_str("RecordValue(..)");
        };
        let data = self.0.read();
        let name = data.record_type.as_ref().map_or("record", |ty| ty.name());
        let mut s = f.debug_struct(name);
        for (field, value) in &data.fields {
            s.field(field, value);
        }
        s.finish()
    }
}

/// `TPoint(X: 1, Y: 2)`, fields sorted by name.
impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        match &data.record_type {
            Some(ty) => write!(f, "{}(", ty.name())?,
            None => f.write_str("record(")?,
        }
        let Some(_visit) = Visit::enter(Arc::as_ptr(&self.0)) else {
            return f.write_str("...)");
        };
        let mut sorted: Vec<&(String, Value)> = data.fields.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for (i, (name, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str(")")
    }
}

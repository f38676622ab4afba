//! Record type metadata.
//!
//! A `RecordType` is built once by the record engine and then frozen behind
//! an `Arc`. Instances share it and own only their field values.
//!
//! Field and method tables are keyed by the lower-cased name. The declared
//! spelling is kept alongside for diagnostics and display.

use std::sync::Arc;

use dws_ir::{FieldDecl, MethodDecl};
use rustc_hash::FxHashMap;

use crate::{Type, TypeError};

/// A resolved record field.
#[derive(Clone, Debug)]
pub struct RecordField {
    /// Declared spelling.
    pub name: String,
    pub ty: Type,
    /// The originating declaration, carrying the optional initializer.
    pub decl: FieldDecl,
}

/// All declared overloads of one method name.
///
/// Records currently declare a single overload per name; the table shape
/// leaves room for real overloading.
#[derive(Clone, Debug)]
pub struct MethodOverloads {
    /// Declared spelling of the first overload.
    pub name: String,
    pub overloads: Vec<Arc<MethodDecl>>,
}

impl MethodOverloads {
    fn seeded(decl: Arc<MethodDecl>) -> Self {
        MethodOverloads {
            name: decl.name.clone(),
            overloads: vec![decl],
        }
    }
}

/// Metadata for a declared record type.
#[derive(Clone, Debug)]
pub struct RecordType {
    name: String,
    /// Fields in declaration order.
    fields: Vec<RecordField>,
    /// Lower-cased field name -> index into `fields`.
    field_index: FxHashMap<String, usize>,
    methods: FxHashMap<String, MethodOverloads>,
    class_methods: FxHashMap<String, MethodOverloads>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        RecordType {
            name: name.into(),
            fields: Vec::new(),
            field_index: FxHashMap::default(),
            methods: FxHashMap::default(),
            class_methods: FxHashMap::default(),
        }
    }

    /// Append a field. Fails if a field of the same (case-insensitive)
    /// name already exists.
    pub fn add_field(&mut self, field: RecordField) -> Result<(), TypeError> {
        let key = field.name.to_lowercase();
        if self.field_index.contains_key(&key) {
            return Err(TypeError::DuplicateField {
                field: field.name,
                record: self.name.clone(),
            });
        }
        self.field_index.insert(key, self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Add a method to the instance or class table, depending on its flag.
    pub fn add_method(&mut self, decl: Arc<MethodDecl>) {
        let key = decl.name.to_lowercase();
        let table = if decl.is_class_method {
            &mut self.class_methods
        } else {
            &mut self.methods
        };
        match table.get_mut(&key) {
            Some(existing) => existing.overloads.push(decl),
            None => {
                table.insert(key, MethodOverloads::seeded(decl));
            }
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Case-insensitive field lookup.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.field_index
            .get(&name.to_lowercase())
            .and_then(|&i| self.fields.get(i))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index.contains_key(&name.to_lowercase())
    }

    /// Instance method overloads, case-insensitive.
    pub fn method(&self, name: &str) -> Option<&MethodOverloads> {
        self.methods.get(&name.to_lowercase())
    }

    /// Class (static) method overloads, case-insensitive.
    pub fn class_method(&self, name: &str) -> Option<&MethodOverloads> {
        self.class_methods.get(&name.to_lowercase())
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn class_method_count(&self) -> usize {
        self.class_methods.len()
    }
}

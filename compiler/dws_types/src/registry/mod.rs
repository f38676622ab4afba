//! The type registry.
//!
//! # Resolution order
//!
//! 1. Scalar keywords (`integer`, `float`, `string`, `boolean`, `variant`);
//!    these cannot be shadowed
//! 2. The pseudo type `const` (resolves to `Variant`)
//! 3. Inline `array ...` and `function(..)` / `procedure(..)` signatures
//! 4. Enums, records, arrays, aliases, subranges, classes, interfaces,
//!    function pointers, in that order
//!
//! Aliases are transparent: resolving one yields the aliased type, so an
//! alias is never observable at runtime. Classes only need a name, which
//! lets a field refer to a class that is declared further down.

mod inline;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{
    ArrayType, ClassType, EnumType, FunctionPointerType, InterfaceType, RecordType, SubrangeType,
    Type, TypeError,
};

/// Lower-case a type name and strip a parent-class qualifier.
///
/// `"TSub(TBase)"` becomes `"tsub"`.
pub fn normalize_type_name(name: &str) -> String {
    let name = name.trim();
    let base = match name.find('(') {
        Some(open) if name.ends_with(')') => name[..open].trim_end(),
        _ => name,
    };
    base.to_lowercase()
}

/// Case-insensitive multi-namespace type table.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    enums: FxHashMap<String, Arc<EnumType>>,
    records: FxHashMap<String, Arc<RecordType>>,
    arrays: FxHashMap<String, Arc<ArrayType>>,
    aliases: FxHashMap<String, Type>,
    subranges: FxHashMap<String, Arc<SubrangeType>>,
    classes: FxHashMap<String, Arc<ClassType>>,
    interfaces: FxHashMap<String, Arc<InterfaceType>>,
    function_pointers: FxHashMap<String, Arc<FunctionPointerType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a type name to its descriptor.
    pub fn resolve(&self, name: &str) -> Result<Type, TypeError> {
        let trimmed = name.trim();
        let lowered = trimmed.to_ascii_lowercase();

        if let Some(scalar) = scalar_keyword(&lowered) {
            return Ok(scalar);
        }
        if lowered == "const" {
            return Ok(Type::Variant);
        }
        if lowered.starts_with("function(")
            || lowered.starts_with("procedure(")
            || lowered.starts_with("function (")
            || lowered.starts_with("procedure (")
        {
            return self.resolve_inline_function_pointer(trimmed);
        }
        if lowered.starts_with("array of ") || lowered.starts_with("array[") {
            return self.resolve_inline_array(trimmed);
        }

        let key = normalize_type_name(trimmed);
        self.lookup_named(&key).ok_or_else(|| {
            tracing::debug!(name = trimmed, "type resolution failed");
            TypeError::unknown(trimmed)
        })
    }

    /// Probe the custom namespaces in priority order.
    fn lookup_named(&self, key: &str) -> Option<Type> {
        if let Some(e) = self.enums.get(key) {
            return Some(Type::Enum(Arc::clone(e)));
        }
        if let Some(r) = self.records.get(key) {
            return Some(Type::Record(Arc::clone(r)));
        }
        if let Some(a) = self.arrays.get(key) {
            return Some(Type::Array(Arc::clone(a)));
        }
        if let Some(target) = self.aliases.get(key) {
            return Some(target.clone());
        }
        if let Some(s) = self.subranges.get(key) {
            return Some(Type::Subrange(Arc::clone(s)));
        }
        if let Some(c) = self.classes.get(key) {
            return Some(Type::Class(Arc::clone(c)));
        }
        if let Some(i) = self.interfaces.get(key) {
            return Some(Type::Interface(Arc::clone(i)));
        }
        self.function_pointers
            .get(key)
            .map(|f| Type::FunctionPointer(Arc::clone(f)))
    }

    /// Returns `true` if `name` resolves.
    pub fn has_type(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    // Registration

    pub fn register_enum(&mut self, enum_type: EnumType) -> Arc<EnumType> {
        let key = normalize_type_name(&enum_type.name);
        let shared = Arc::new(enum_type);
        self.enums.insert(key, Arc::clone(&shared));
        shared
    }

    /// Register a record type. Record names may only be declared once.
    pub fn register_record(&mut self, record: RecordType) -> Result<Arc<RecordType>, TypeError> {
        let key = normalize_type_name(record.name());
        if self.records.contains_key(&key) {
            return Err(TypeError::DuplicateType {
                name: record.name().to_string(),
            });
        }
        let shared = Arc::new(record);
        self.records.insert(key, Arc::clone(&shared));
        Ok(shared)
    }

    /// `type TIntArray = array of Integer;`
    pub fn register_array(&mut self, name: &str, array: ArrayType) -> Arc<ArrayType> {
        let shared = Arc::new(array);
        self.arrays
            .insert(normalize_type_name(name), Arc::clone(&shared));
        shared
    }

    /// `type TCount = Integer;`
    pub fn register_alias(&mut self, name: &str, target: Type) {
        self.aliases.insert(normalize_type_name(name), target);
    }

    pub fn register_subrange(&mut self, subrange: SubrangeType) -> Arc<SubrangeType> {
        let key = normalize_type_name(&subrange.name);
        let shared = Arc::new(subrange);
        self.subranges.insert(key, Arc::clone(&shared));
        shared
    }

    /// Register a class by name. Re-registering replaces a forward
    /// declaration.
    pub fn register_class(&mut self, class: ClassType) -> Arc<ClassType> {
        let key = normalize_type_name(&class.name);
        let shared = Arc::new(class);
        self.classes.insert(key, Arc::clone(&shared));
        shared
    }

    pub fn register_interface(&mut self, interface: InterfaceType) -> Arc<InterfaceType> {
        let key = normalize_type_name(&interface.name);
        let shared = Arc::new(interface);
        self.interfaces.insert(key, Arc::clone(&shared));
        shared
    }

    /// `type TCallback = function(x: Integer): Boolean;`
    pub fn register_function_pointer(
        &mut self,
        name: &str,
        fp: FunctionPointerType,
    ) -> Arc<FunctionPointerType> {
        let shared = Arc::new(fp);
        self.function_pointers
            .insert(normalize_type_name(name), Arc::clone(&shared));
        shared
    }

    // Direct lookups

    pub fn lookup_enum(&self, name: &str) -> Option<&Arc<EnumType>> {
        self.enums.get(&normalize_type_name(name))
    }

    pub fn lookup_record(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.records.get(&normalize_type_name(name))
    }

    pub fn lookup_class(&self, name: &str) -> Option<&Arc<ClassType>> {
        self.classes.get(&normalize_type_name(name))
    }
}

/// Built-in scalar keywords.
fn scalar_keyword(lowered: &str) -> Option<Type> {
    match lowered {
        "integer" => Some(Type::Integer),
        "float" => Some(Type::Float),
        "string" => Some(Type::String),
        "boolean" => Some(Type::Boolean),
        "variant" => Some(Type::Variant),
        _ => None,
    }
}

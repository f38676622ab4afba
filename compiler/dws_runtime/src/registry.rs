//! Built-in function catalogue.
//!
//! # Architecture
//!
//! ```text
//! Registry
//!     └── RwLock<Tables>
//!             ├── functions:  lower-cased name -> FunctionInfo
//!             └── categories: Category -> [lower-cased name]
//! ```
//!
//! One lock covers both tables, so a lookup never observes a function that
//! is missing from its category (or the reverse). Registration takes the
//! write lock; lookups and enumeration share the read lock.
//!
//! Names are case-insensitive. `FunctionInfo::name` keeps the spelling of
//! the most recent registration.

use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::BuiltinFn;

/// Grouping used for documentation and discovery.
///
/// Variants are declared in the alphabetical order of their names, so the
/// derived `Ord` sorts categories by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Array,
    Collections,
    Conversion,
    DateTime,
    Encoding,
    IO,
    JSON,
    Math,
    String,
    System,
    Type,
    Variant,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Array => "array",
            Category::Collections => "collections",
            Category::Conversion => "conversion",
            Category::DateTime => "datetime",
            Category::Encoding => "encoding",
            Category::IO => "io",
            Category::JSON => "json",
            Category::Math => "math",
            Category::String => "string",
            Category::System => "system",
            Category::Type => "type",
            Category::Variant => "variant",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional call signature of a built-in, for tooling and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub min_args: usize,
    /// `None` for variadic functions.
    pub max_args: Option<usize>,
    /// Declared parameter type names, e.g. `["array", "Integer"]`.
    pub param_types: Vec<String>,
    pub return_type: Option<String>,
}

impl Signature {
    /// Fixed-arity signature.
    pub fn exact(param_types: &[&str], return_type: Option<&str>) -> Self {
        Signature {
            min_args: param_types.len(),
            max_args: Some(param_types.len()),
            param_types: param_types.iter().map(ToString::to_string).collect(),
            return_type: return_type.map(ToString::to_string),
        }
    }

    /// Signature whose trailing parameters may be omitted.
    #[must_use]
    pub fn with_min_args(mut self, min_args: usize) -> Self {
        self.min_args = min_args;
        self
    }

    /// Signature accepting any number of arguments beyond the declared ones.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.max_args = None;
        self
    }

    /// Returns `true` if `argc` arguments satisfy the signature.
    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min_args && self.max_args.is_none_or(|max| argc <= max)
    }
}

/// A registered built-in.
#[derive(Clone, Debug)]
pub struct FunctionInfo {
    /// Spelling used at registration.
    pub name: String,
    pub function: BuiltinFn,
    pub category: Category,
    pub description: String,
    pub signature: Option<Signature>,
}

impl FunctionInfo {
    pub fn new(
        name: impl Into<String>,
        function: BuiltinFn,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        FunctionInfo {
            name: name.into(),
            function,
            category,
            description: description.into(),
            signature: None,
        }
    }

    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }
}

#[derive(Default)]
struct Tables {
    functions: FxHashMap<String, FunctionInfo>,
    categories: FxHashMap<Category, Vec<String>>,
}

impl Tables {
    fn insert(&mut self, info: FunctionInfo) {
        let key = info.name.to_lowercase();
        let category = info.category;

        match self.functions.insert(key.clone(), info) {
            Some(previous) if previous.category == category => {
                tracing::debug!(name = %key, %category, "built-in replaced");
                return;
            }
            Some(previous) => {
                tracing::debug!(
                    name = %key,
                    from = %previous.category,
                    to = %category,
                    "built-in moved to another category"
                );
                if let Some(names) = self.categories.get_mut(&previous.category) {
                    names.retain(|n| *n != key);
                }
            }
            None => tracing::debug!(name = %key, %category, "built-in registered"),
        }
        self.categories.entry(category).or_default().push(key);
    }
}

/// Thread-safe, case-insensitive built-in catalogue.
#[derive(Default)]
pub struct Registry {
    tables: RwLock<Tables>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a built-in.
    ///
    /// Re-registering a name replaces the implementation without adding a
    /// second category entry.
    pub fn register(
        &self,
        name: &str,
        function: BuiltinFn,
        category: Category,
        description: &str,
    ) {
        self.tables
            .write()
            .insert(FunctionInfo::new(name, function, category, description));
    }

    /// Register a built-in together with its call signature.
    pub fn register_with_signature(
        &self,
        name: &str,
        function: BuiltinFn,
        category: Category,
        description: &str,
        signature: Signature,
    ) {
        self.tables.write().insert(
            FunctionInfo::new(name, function, category, description).with_signature(signature),
        );
    }

    /// Register several built-ins under one write lock.
    pub fn register_batch(&self, entries: impl IntoIterator<Item = FunctionInfo>) {
        let mut tables = self.tables.write();
        for info in entries {
            tables.insert(info);
        }
    }

    /// Case-insensitive lookup of the implementation.
    pub fn lookup(&self, name: &str) -> Option<BuiltinFn> {
        self.tables
            .read()
            .functions
            .get(&name.to_lowercase())
            .map(|info| info.function)
    }

    /// Case-insensitive lookup of the full entry.
    pub fn get(&self, name: &str) -> Option<FunctionInfo> {
        self.tables
            .read()
            .functions
            .get(&name.to_lowercase())
            .cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tables
            .read()
            .functions
            .contains_key(&name.to_lowercase())
    }

    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.tables
            .read()
            .functions
            .get(&name.to_lowercase())
            .and_then(|info| info.signature.clone())
    }

    /// Functions of one category, sorted by name.
    pub fn get_by_category(&self, category: Category) -> Vec<FunctionInfo> {
        let tables = self.tables.read();
        let mut infos: Vec<FunctionInfo> = tables
            .categories
            .get(&category)
            .into_iter()
            .flatten()
            .filter_map(|key| tables.functions.get(key).cloned())
            .collect();
        infos.sort_by_key(|info| info.name.to_lowercase());
        infos
    }

    /// Every function, sorted by name.
    pub fn all_functions(&self) -> Vec<FunctionInfo> {
        let mut infos: Vec<FunctionInfo> =
            self.tables.read().functions.values().cloned().collect();
        infos.sort_by_key(|info| info.name.to_lowercase());
        infos
    }

    /// Categories with at least one function, sorted by name.
    pub fn all_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .tables
            .read()
            .categories
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(category, _)| *category)
            .collect();
        categories.sort();
        categories
    }

    pub fn count(&self) -> usize {
        self.tables.read().functions.len()
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.tables
            .read()
            .categories
            .get(&category)
            .map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        let mut tables = self.tables.write();
        tables.functions.clear();
        tables.categories.clear();
    }
}

/// Process-wide registry holding the full built-in catalogue, built on
/// first use.
pub fn default_registry() -> &'static Registry {
    static DEFAULT: OnceLock<Registry> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        let registry = Registry::new();
        crate::builtins::register_all(&registry);
        registry
    })
}

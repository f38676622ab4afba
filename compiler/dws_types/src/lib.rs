//! DWS Types - Semantic type descriptors and the type registry.
//!
//! # Architecture
//!
//! ```text
//! TypeRegistry (one normalized-key map per namespace)
//!     ├── scalar keywords (fixed, checked first)
//!     ├── enums ─ records ─ arrays ─ aliases ─ subranges
//!     └── classes ─ interfaces ─ function pointers
//! ```
//!
//! Every lookup lower-cases the name and strips a `TSub(TBase)` parent
//! qualifier before probing the namespaces in a fixed order. An unresolved
//! name is a `TypeError::UnknownType`, never a silent default.
//!
//! Descriptors are immutable once registered and shared through `Arc`, so
//! record metadata can be referenced from every instance without copying.

mod error;
mod record;
mod registry;
mod ty;

pub use error::TypeError;
pub use record::{MethodOverloads, RecordField, RecordType};
pub use registry::{normalize_type_name, TypeRegistry};
pub use ty::{
    ArrayType, ClassType, EnumMember, EnumType, FunctionPointerType, InterfaceType,
    SubrangeType, Type,
};

//! Semantic type descriptors.

use std::fmt;
use std::sync::Arc;

use crate::RecordType;

/// A resolved DWScript type.
///
/// Scalar kinds are inline. Named and structured kinds point at immutable
/// descriptors shared through `Arc`.
#[derive(Clone, Debug)]
pub enum Type {
    Integer,
    Float,
    String,
    Boolean,
    Variant,
    Nil,
    Enum(Arc<EnumType>),
    Record(Arc<RecordType>),
    Array(Arc<ArrayType>),
    Subrange(Arc<SubrangeType>),
    Class(Arc<ClassType>),
    Interface(Arc<InterfaceType>),
    FunctionPointer(Arc<FunctionPointerType>),
}

impl Type {
    /// Display name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Type::Integer => "Integer".to_string(),
            Type::Float => "Float".to_string(),
            Type::String => "String".to_string(),
            Type::Boolean => "Boolean".to_string(),
            Type::Variant => "Variant".to_string(),
            Type::Nil => "Nil".to_string(),
            Type::Enum(e) => e.name.clone(),
            Type::Record(r) => r.name().to_string(),
            Type::Array(a) => a.to_string(),
            Type::Subrange(s) => s.name.clone(),
            Type::Class(c) => c.name.clone(),
            Type::Interface(i) => i.name.clone(),
            Type::FunctionPointer(f) => f.to_string(),
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&Arc<RecordType>> {
        match self {
            Type::Record(r) => Some(r),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Arc<ArrayType>> {
        match self {
            Type::Array(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            Type::Enum(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        matches!(self, Type::Interface(_))
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Integer, Type::Integer)
            | (Type::Float, Type::Float)
            | (Type::String, Type::String)
            | (Type::Boolean, Type::Boolean)
            | (Type::Variant, Type::Variant)
            | (Type::Nil, Type::Nil) => true,
            // Named types are nominal
            (Type::Enum(a), Type::Enum(b)) => a.name.eq_ignore_ascii_case(&b.name),
            (Type::Record(a), Type::Record(b)) => a.name().eq_ignore_ascii_case(b.name()),
            (Type::Class(a), Type::Class(b)) => a.name.eq_ignore_ascii_case(&b.name),
            (Type::Interface(a), Type::Interface(b)) => a.name.eq_ignore_ascii_case(&b.name),
            (Type::Subrange(a), Type::Subrange(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a == b,
            (Type::FunctionPointer(a), Type::FunctionPointer(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// Enum

/// One named value of an enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub ordinal: i64,
}

/// `type TColor = (Red, Green, Blue);`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    /// Members in declaration order.
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Build an enum whose ordinals count up from zero.
    pub fn sequential<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        let members = members
            .into_iter()
            .zip(0_i64..)
            .map(|(name, ordinal)| EnumMember {
                name: name.into(),
                ordinal,
            })
            .collect();
        EnumType {
            name: name.into(),
            members,
        }
    }

    pub fn first(&self) -> Option<&EnumMember> {
        self.members.first()
    }

    pub fn last(&self) -> Option<&EnumMember> {
        self.members.last()
    }

    /// Case-insensitive member lookup.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn member_by_ordinal(&self, ordinal: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.ordinal == ordinal)
    }
}

// Array

/// Array descriptor. `bounds` is `Some((low, high))` for static arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayType {
    pub element: Type,
    pub bounds: Option<(i64, i64)>,
}

impl ArrayType {
    /// `array of T`
    pub fn dynamic(element: Type) -> Self {
        ArrayType {
            element,
            bounds: None,
        }
    }

    /// `array[low..high] of T`
    pub fn fixed(element: Type, low: i64, high: i64) -> Self {
        ArrayType {
            element,
            bounds: Some((low, high)),
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.bounds.is_some()
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.bounds.is_none()
    }

    /// First valid index: the declared low bound, or 0 for dynamic arrays.
    #[inline]
    pub fn low_bound(&self) -> i64 {
        self.bounds.map_or(0, |(low, _)| low)
    }

    /// Declared high bound of a static array.
    #[inline]
    pub fn high_bound(&self) -> Option<i64> {
        self.bounds.map(|(_, high)| high)
    }

    /// Element count of a static array. Inverted bounds count as empty.
    pub fn static_len(&self) -> Option<usize> {
        self.bounds.map(|(low, high)| {
            if high < low {
                0
            } else {
                usize::try_from(high.abs_diff(low)).map_or(usize::MAX, |d| d.saturating_add(1))
            }
        })
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some((low, high)) => write!(f, "array[{low}..{high}] of {}", self.element),
            None => write!(f, "array of {}", self.element),
        }
    }
}

// Subrange

/// `type TDigit = 0..9;`
#[derive(Clone, Debug, PartialEq)]
pub struct SubrangeType {
    pub name: String,
    pub base: Type,
    pub low: i64,
    pub high: i64,
}

impl SubrangeType {
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

// Class and interface

/// Nominal class reference. Members are owned by the object model, which
/// lives outside this crate; the registry only needs the name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassType {
    pub name: String,
    pub parent: Option<String>,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        ClassType {
            name: name.into(),
            parent: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceType {
    pub name: String,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceType { name: name.into() }
    }
}

// Function pointer

/// `function(Integer, String): Boolean` or `procedure(x: Integer) of object`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionPointerType {
    pub params: Vec<Type>,
    /// `None` for procedures.
    pub return_type: Option<Type>,
    /// Method pointer (`of object`).
    pub of_object: bool,
}

impl FunctionPointerType {
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for FunctionPointerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.return_type.is_some() {
            "function"
        } else {
            "procedure"
        };
        write!(f, "{keyword}(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        if let Some(ret) = &self.return_type {
            write!(f, ": {ret}")?;
        }
        if self.of_object {
            f.write_str(" of object")?;
        }
        Ok(())
    }
}

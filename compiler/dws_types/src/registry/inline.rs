//! Inline type signatures: `array of T`, `array[lo..hi] of T`,
//! `function(..): R` and `procedure(..)`, optionally `of object`.

use std::sync::Arc;

use super::TypeRegistry;
use crate::{ArrayType, FunctionPointerType, Type, TypeError};

/// Parameter modifiers that do not affect the parameter type.
const PARAM_MODIFIERS: [&str; 3] = ["const ", "var ", "lazy "];

fn strip_modifiers(mut s: &str) -> &str {
    loop {
        let lowered = s.to_ascii_lowercase();
        match PARAM_MODIFIERS.iter().find(|m| lowered.starts_with(*m)) {
            Some(m) => s = s[m.len()..].trim_start(),
            None => return s,
        }
    }
}

fn array_error(signature: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidArrayType {
        signature: signature.to_string(),
        reason: reason.into(),
    }
}

fn fp_error(signature: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidFunctionPointer {
        signature: signature.to_string(),
        reason: reason.into(),
    }
}

fn parse_bound(text: &str, signature: &str, which: &str) -> Result<i64, TypeError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| array_error(signature, format!("invalid {which} bound '{}'", text.trim())))
}

impl TypeRegistry {
    pub(super) fn resolve_inline_array(&self, signature: &str) -> Result<Type, TypeError> {
        // "array" is ASCII, so byte offsets from the lowered copy are valid
        let lowered = signature.to_ascii_lowercase();
        let (bounds, rest) = if lowered.starts_with("array[") {
            let close = signature
                .find(']')
                .ok_or_else(|| array_error(signature, "missing ']'"))?;
            let inner = &signature["array[".len()..close];
            let (low, high) = inner
                .split_once("..")
                .ok_or_else(|| array_error(signature, "bounds must be 'low..high'"))?;
            let low = parse_bound(low, signature, "low")?;
            let high = parse_bound(high, signature, "high")?;
            (Some((low, high)), &signature[close + 1..])
        } else {
            (None, &signature["array".len()..])
        };

        let rest_lowered = rest.to_ascii_lowercase();
        if !rest_lowered.starts_with(" of ") {
            return Err(array_error(signature, "expected ' of '"));
        }
        let element_name = rest[" of ".len()..].trim();
        let element = self.resolve(element_name).map_err(|_| {
            array_error(signature, format!("unknown element type '{element_name}'"))
        })?;

        let array = match bounds {
            Some((low, high)) => ArrayType::fixed(element, low, high),
            None => ArrayType::dynamic(element),
        };
        Ok(Type::Array(Arc::new(array)))
    }

    pub(super) fn resolve_inline_function_pointer(
        &self,
        signature: &str,
    ) -> Result<Type, TypeError> {
        let mut sig = signature.trim();
        let of_object = sig.to_ascii_lowercase().ends_with(" of object");
        if of_object {
            sig = sig[..sig.len() - " of object".len()].trim_end();
        }
        let is_function = sig.to_ascii_lowercase().starts_with("function");

        let open = sig
            .find('(')
            .ok_or_else(|| fp_error(signature, "missing '('"))?;
        let close = sig
            .rfind(')')
            .filter(|&close| close > open)
            .ok_or_else(|| fp_error(signature, "missing ')'"))?;

        let params = self.parse_params(&sig[open + 1..close], signature)?;

        let mut return_type = None;
        if is_function {
            let remainder = sig[close + 1..].trim();
            if let Some(ret) = remainder.strip_prefix(':') {
                let ret = ret.trim();
                if !ret.is_empty() {
                    let resolved = self.resolve(ret).map_err(|_| {
                        fp_error(signature, format!("unknown return type '{ret}'"))
                    })?;
                    return_type = Some(resolved);
                }
            }
        }

        Ok(Type::FunctionPointer(Arc::new(FunctionPointerType {
            params,
            return_type,
            of_object,
        })))
    }

    /// Parse either `a, b: Integer; c: String` groups or a shorthand
    /// `Integer, String` type list.
    fn parse_params(&self, params: &str, signature: &str) -> Result<Vec<Type>, TypeError> {
        let params = params.trim();
        if params.is_empty() {
            return Ok(Vec::new());
        }

        let mut types = Vec::new();
        if !params.contains(':') {
            for name in params.split([',', ';']) {
                let name = strip_modifiers(name.trim());
                if name.is_empty() {
                    continue;
                }
                types.push(self.resolve_param(name, signature)?);
            }
            return Ok(types);
        }

        for group in params.split(';') {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }
            let (names, type_name) = group
                .split_once(':')
                .ok_or_else(|| fp_error(signature, format!("invalid parameter group '{group}'")))?;
            let ty = self.resolve_param(type_name.trim(), signature)?;
            let count = strip_modifiers(names.trim()).split(',').count();
            types.extend(std::iter::repeat_n(ty, count));
        }
        Ok(types)
    }

    fn resolve_param(&self, type_name: &str, signature: &str) -> Result<Type, TypeError> {
        self.resolve(type_name)
            .map_err(|_| fp_error(signature, format!("unknown parameter type '{type_name}'")))
    }
}

//! Parser resolution — maps a destination field type to the function that
//! turns saved text back into a typed value.
//!
//! Resolutions are cached per `(type key, property name)` with a `"*"`
//! slot for the property-independent path. A type with no parser resolves
//! as unsupported; callers treat that as "skip this field", never as a
//! failure.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::value::{
    parse_boolean, parse_date, parse_datetime, parse_float, parse_integer, parse_text,
    parse_unsigned, FieldType, ParseFn,
};

// ---------------------------------------------------------------------------
// ParserRegistry
// ---------------------------------------------------------------------------

/// Caching resolver from `FieldType` to parse function.
///
/// Built-in scalar types always resolve. `Named` types resolve only if a
/// parser was registered for the name beforehand — register custom parsers
/// before the first load. `Optional` wrappers resolve against their inner
/// type.
#[derive(Debug)]
pub struct ParserRegistry {
    /// Resolution cache, including negative results. One lock covers the
    /// whole lookup-then-insert sequence.
    cache: Mutex<HashMap<(String, String), Option<ParseFn>>>,
    /// Parsers registered for application-defined type names.
    named: Mutex<HashMap<String, ParseFn>>,
}

impl ParserRegistry {
    /// Create a registry with no custom parsers.
    pub fn new() -> Self {
        ParserRegistry {
            cache: Mutex::new(HashMap::new()),
            named: Mutex::new(HashMap::new()),
        }
    }

    /// Register a parser for a `FieldType::Named` type name.
    pub fn register_named(&self, type_name: &str, parser: ParseFn) {
        self.named
            .lock()
            .unwrap()
            .insert(type_name.to_string(), parser);
    }

    /// Resolve the parse function for a destination type, or `None` if the
    /// type is unsupported.
    pub fn resolve(&self, ty: &FieldType) -> Option<ParseFn> {
        self.resolve_for(ty, "*")
    }

    /// Per-property resolve variant. Behaviorally identical to
    /// [`resolve`](Self::resolve) — the property name only scopes the cache
    /// slot — but kept so per-property overrides have somewhere to live.
    pub fn resolve_for(&self, ty: &FieldType, property: &str) -> Option<ParseFn> {
        let underlying = ty.unwrap_optional();
        let key = (underlying.key(), property.to_string());

        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.get(&key) {
            return *cached;
        }
        let parser = self.lookup(underlying);
        cache.insert(key, parser);
        parser
    }

    fn lookup(&self, ty: &FieldType) -> Option<ParseFn> {
        match ty {
            FieldType::Text => Some(parse_text),
            FieldType::Integer => Some(parse_integer),
            FieldType::Unsigned => Some(parse_unsigned),
            FieldType::Float => Some(parse_float),
            FieldType::Boolean => Some(parse_boolean),
            FieldType::Date => Some(parse_date),
            FieldType::DateTime => Some(parse_datetime),
            FieldType::Named(name) => self.named.lock().unwrap().get(name.as_str()).copied(),
            FieldType::Optional(inner) => self.lookup(inner.unwrap_optional()),
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        ParserRegistry::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn builtin_types_all_resolve() {
        let registry = ParserRegistry::new();
        for ty in [
            FieldType::Text,
            FieldType::Integer,
            FieldType::Unsigned,
            FieldType::Float,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::DateTime,
        ] {
            assert!(registry.resolve(&ty).is_some(), "no parser for {:?}", ty);
        }
    }

    #[test]
    fn optional_resolves_against_inner_type() {
        let registry = ParserRegistry::new();
        let parser = registry
            .resolve(&FieldType::optional(FieldType::Integer))
            .unwrap();
        assert_eq!(parser("5"), Some(FieldValue::Integer(5)));
    }

    #[test]
    fn unknown_named_type_is_unsupported() {
        let registry = ParserRegistry::new();
        assert!(registry.resolve(&FieldType::Named("Color".into())).is_none());
    }

    #[test]
    fn registered_named_type_resolves() {
        fn parse_color(raw: &str) -> Option<FieldValue> {
            raw.strip_prefix('#').map(|hex| FieldValue::Text(hex.into()))
        }

        let registry = ParserRegistry::new();
        registry.register_named("Color", parse_color);
        let parser = registry.resolve(&FieldType::Named("Color".into())).unwrap();
        assert_eq!(parser("#a0a0a0"), Some(FieldValue::Text("a0a0a0".into())));
        assert_eq!(parser("plain"), None);
    }

    #[test]
    fn negative_result_is_cached() {
        let registry = ParserRegistry::new();
        let ty = FieldType::Named("Missing".into());
        assert!(registry.resolve(&ty).is_none());
        // Second resolve hits the cached miss.
        assert!(registry.resolve(&ty).is_none());
    }

    #[test]
    fn per_property_resolve_matches_type_resolve() {
        let registry = ParserRegistry::new();
        let by_type = registry.resolve(&FieldType::Boolean).unwrap();
        let by_prop = registry.resolve_for(&FieldType::Boolean, "AutoSync").unwrap();
        assert_eq!(by_type("true"), by_prop("true"));
    }

    #[test]
    fn resolved_boolean_parser_normalizes_case() {
        let registry = ParserRegistry::new();
        let parser = registry.resolve(&FieldType::Boolean).unwrap();
        assert_eq!(parser("True"), Some(FieldValue::Boolean(true)));
    }
}

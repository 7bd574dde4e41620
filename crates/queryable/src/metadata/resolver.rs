//! Field resolution.
//!
//! Decides whether a node of a predicate tree names a field of the entity
//! under query (or of the element bound by an enclosing collection lambda)
//! and, if so, what the service calls it.

use std::sync::Arc;

use crate::expr::{EnumDescriptor, Expr, Param};

use super::entity::{EntityMetadata, KeyRole};

/// Name given to the element of a collection lambda on the wire.
pub const RANGE_VARIABLE: &str = "item";

/// What a field access node resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// Field name as the service knows it.
    pub wire_name: String,
    /// Set when the field stands in for a storage key column.
    pub substitute_key: Option<KeyRole>,
    /// Set when the field is enumerated.
    pub enum_type: Option<Arc<EnumDescriptor>>,
    /// Set when the field is a collection of complex elements.
    pub element: Option<Arc<EntityMetadata>>,
}

impl ResolvedField {
    fn plain(wire_name: impl Into<String>) -> Self {
        Self {
            wire_name: wire_name.into(),
            substitute_key: None,
            enum_type: None,
            element: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RangeVariable<'a> {
    param: &'a Param,
    element: Option<&'a EntityMetadata>,
}

/// Resolves field access nodes against entity metadata.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    metadata: &'a EntityMetadata,
    root: &'a Param,
    range: Option<RangeVariable<'a>>,
}

impl<'a> FieldResolver<'a> {
    /// Creates a resolver for predicates over `root`.
    pub fn new(metadata: &'a EntityMetadata, root: &'a Param) -> Self {
        Self {
            metadata,
            root,
            range: None,
        }
    }

    /// Returns a resolver that also treats `param` as the lambda element.
    pub fn with_range_variable(
        &self,
        param: &'a Param,
        element: Option<&'a EntityMetadata>,
    ) -> Self {
        Self {
            range: Some(RangeVariable { param, element }),
            ..*self
        }
    }

    /// Returns true inside a collection lambda.
    pub fn in_range(&self) -> bool {
        self.range.is_some()
    }

    /// Returns the entity metadata.
    pub fn metadata(&self) -> &'a EntityMetadata {
        self.metadata
    }

    /// Resolves `expr` to a field, or `None` if it is not a field access.
    ///
    /// Enum-to-integer conversions are looked through.
    pub fn resolve(&self, expr: &Expr) -> Option<ResolvedField> {
        match expr {
            Expr::Convert(inner) => self.resolve(inner),
            Expr::Member { target, field } if target == self.root => {
                Some(Self::resolve_in(self.metadata, field, None))
            }
            Expr::Member { target, field } => {
                let range = self.range.filter(|r| r.param == target)?;
                let element = range
                    .element
                    .map(|meta| Self::resolve_in(meta, field, Some(RANGE_VARIABLE)))
                    .unwrap_or_else(|| {
                        ResolvedField::plain(format!("{}/{}", RANGE_VARIABLE, field))
                    });
                Some(element)
            }
            Expr::Parameter(param) => self
                .range
                .filter(|r| r.param == param)
                .map(|_| ResolvedField::plain(RANGE_VARIABLE)),
            _ => None,
        }
    }

    fn resolve_in(metadata: &EntityMetadata, field: &str, prefix: Option<&str>) -> ResolvedField {
        let qualify = |name: &str| match prefix {
            Some(prefix) => format!("{}/{}", prefix, name),
            None => name.to_string(),
        };

        match metadata.field(field) {
            Some(declared) => ResolvedField {
                wire_name: qualify(declared.wire_name()),
                substitute_key: declared.key_role(),
                enum_type: declared.enum_type().cloned(),
                element: declared.element().cloned(),
            },
            None => ResolvedField::plain(qualify(&metadata.wire_name(field))),
        }
    }
}

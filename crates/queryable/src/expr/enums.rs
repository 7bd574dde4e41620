//! Enumeration descriptors.
//!
//! Enumerated fields are compared by their wire string, not their numeric
//! value. A descriptor lists the members of one enumeration together with an
//! optional per-member alias that overrides the member name on the wire.

use serde::{Deserialize, Serialize};

use super::value::Value;

/// One member of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name.
    pub name: String,
    /// Numeric value.
    pub value: i64,
    /// Wire string overriding the name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl EnumMember {
    /// Returns the string sent to the remote service for this member.
    pub fn wire_string(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The members of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    name: String,
    members: Vec<EnumMember>,
}

impl EnumDescriptor {
    /// Creates an empty descriptor for the named enumeration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member that goes over the wire under its own name.
    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
            alias: None,
        });
        self
    }

    /// Adds a member with a wire-string alias.
    pub fn with_aliased_member(
        mut self,
        name: impl Into<String>,
        value: i64,
        alias: impl Into<String>,
    ) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
            alias: Some(alias.into()),
        });
        self
    }

    /// Returns the enumeration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared members.
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Looks up a member by numeric value.
    ///
    /// When several members share a value, the first declared wins.
    pub fn member_by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    /// Looks up a member by name.
    pub fn member_by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Looks up a member by the string it goes over the wire as.
    pub fn member_by_wire_string(&self, wire: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.wire_string() == wire)
    }

    /// Maps a comparison constant to the member's wire string.
    ///
    /// Integers and enum values are matched by ordinal, strings by member
    /// name or wire string. Anything naming no member yields `None`.
    pub fn wire_string(&self, value: &Value) -> Option<String> {
        let member = match value {
            Value::String(s) => self
                .member_by_name(s)
                .or_else(|| self.member_by_wire_string(s)),
            other => other
                .as_i64()
                .and_then(|ordinal| self.member_by_value(ordinal)),
        };
        member.map(|m| m.wire_string().to_string())
    }
}

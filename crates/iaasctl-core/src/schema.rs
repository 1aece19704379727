//! Static field descriptors for request and response types
//!
//! Every Input/Output type carries one [`StructSchema`]: an ordered table of
//! [`FieldSchema`] entries describing the wire name, placement, required flag,
//! default, allowed values and shape of each field. Tables are plain `static`
//! data, so they are built at compile time and shared by every call.
//!
//! # Example
//!
//! ```rust
//! use iaasctl_core::schema::{FieldSchema, Schema, StructSchema};
//!
//! static PING_INPUT: StructSchema = StructSchema {
//!     type_name: "PingInput",
//!     fields: &[
//!         FieldSchema::param("target").required(),
//!         FieldSchema::param("mode").one_of(&["fast", "slow"]).default_value("fast"),
//!     ],
//! };
//!
//! assert_eq!(PING_INPUT.params().count(), 2);
//! assert!(PING_INPUT.field("target").unwrap().required);
//! ```

/// Which side of the exchange a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Outgoing request parameter
    Params,
    /// Incoming response element
    Elements,
}

/// Wire convention for flattening an array of scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStyle {
    /// `key.1=a&key.2=b`
    Indexed,
    /// `key=a&key=b`
    Repeated,
}

/// Shape of a field's value
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// String, number or boolean
    Scalar,
    /// Point in time, sent as ISO-8601 UTC
    Timestamp,
    /// Single nested record, flattened as `key.subfield`
    Struct(&'static StructSchema),
    /// List of scalars
    ScalarArray(ArrayStyle),
    /// List of records, flattened as `key.N.subfield`
    StructArray(&'static StructSchema),
    /// String-keyed map of scalars, flattened as `key.mapKey`
    Map,
}

impl FieldKind {
    /// True for kinds whose "present" means "non-empty"
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            FieldKind::ScalarArray(_) | FieldKind::StructArray(_) | FieldKind::Map
        )
    }

    /// Short name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Struct(_) => "object",
            FieldKind::ScalarArray(_) => "array",
            FieldKind::StructArray(_) => "array of objects",
            FieldKind::Map => "map",
        }
    }
}

/// Descriptor for one field
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// Key used on the wire
    pub name: &'static str,
    pub location: Location,
    pub required: bool,
    /// Wire value sent when the caller leaves the field unset
    pub default: Option<&'static str>,
    /// Closed set of accepted values; empty means unconstrained
    pub allowed_values: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldSchema {
    /// Scalar request parameter
    pub const fn param(name: &'static str) -> Self {
        Self {
            name,
            location: Location::Params,
            required: false,
            default: None,
            allowed_values: &[],
            kind: FieldKind::Scalar,
        }
    }

    /// Scalar response element
    pub const fn element(name: &'static str) -> Self {
        Self {
            name,
            location: Location::Elements,
            required: false,
            default: None,
            allowed_values: &[],
            kind: FieldKind::Scalar,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = values;
        self
    }

    #[must_use]
    pub const fn timestamp(mut self) -> Self {
        self.kind = FieldKind::Timestamp;
        self
    }

    #[must_use]
    pub const fn nested(mut self, schema: &'static StructSchema) -> Self {
        self.kind = FieldKind::Struct(schema);
        self
    }

    /// Indexed array of scalars (`key.1`, `key.2`, ...)
    #[must_use]
    pub const fn list(mut self) -> Self {
        self.kind = FieldKind::ScalarArray(ArrayStyle::Indexed);
        self
    }

    /// Repeated array of scalars (`key=a&key=b`)
    #[must_use]
    pub const fn repeated(mut self) -> Self {
        self.kind = FieldKind::ScalarArray(ArrayStyle::Repeated);
        self
    }

    #[must_use]
    pub const fn list_of(mut self, schema: &'static StructSchema) -> Self {
        self.kind = FieldKind::StructArray(schema);
        self
    }

    #[must_use]
    pub const fn map(mut self) -> Self {
        self.kind = FieldKind::Map;
        self
    }

    /// Whether `value` is in the allowed set (always true when unconstrained)
    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.is_empty() || self.allowed_values.contains(&value)
    }
}

/// Descriptor table for one struct type
#[derive(Debug)]
pub struct StructSchema {
    /// Rust-level type name, reported as the owning type in errors
    pub type_name: &'static str,
    pub fields: &'static [FieldSchema],
}

impl StructSchema {
    /// Look up a field by wire name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Request parameters in declaration order
    pub fn params(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields
            .iter()
            .filter(|f| f.location == Location::Params)
    }

    /// Response elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields
            .iter()
            .filter(|f| f.location == Location::Elements)
    }

    /// Wire names declared more than once. Empty for a well-formed table.
    pub fn duplicate_names(&self) -> Vec<&'static str> {
        let mut seen: Vec<&'static str> = Vec::with_capacity(self.fields.len());
        let mut duplicates = Vec::new();
        for field in self.fields {
            if seen.contains(&field.name) {
                if !duplicates.contains(&field.name) {
                    duplicates.push(field.name);
                }
            } else {
                seen.push(field.name);
            }
        }
        duplicates
    }
}

/// Types described by a static [`StructSchema`]
pub trait Schema {
    fn schema() -> &'static StructSchema;
}

#[cfg(test)]
mod tests {
    use super::*;

    static CHILD: StructSchema = StructSchema {
        type_name: "Child",
        fields: &[FieldSchema::param("name").required()],
    };

    static PARENT: StructSchema = StructSchema {
        type_name: "Parent",
        fields: &[
            FieldSchema::param("id").required(),
            FieldSchema::param("mode")
                .one_of(&["a", "b"])
                .default_value("a"),
            FieldSchema::param("children").list_of(&CHILD),
            FieldSchema::param("ids").repeated(),
            FieldSchema::element("created").timestamp(),
        ],
    };

    #[test]
    fn test_builders_compose() {
        let mode = PARENT.field("mode").unwrap();
        assert_eq!(mode.default, Some("a"));
        assert_eq!(mode.allowed_values, &["a", "b"]);
        assert!(!mode.required);
        assert!(mode.allows("b"));
        assert!(!mode.allows("c"));

        let children = PARENT.field("children").unwrap();
        match children.kind {
            FieldKind::StructArray(schema) => assert_eq!(schema.type_name, "Child"),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(children.kind.is_collection());

        let ids = PARENT.field("ids").unwrap();
        assert!(matches!(
            ids.kind,
            FieldKind::ScalarArray(ArrayStyle::Repeated)
        ));
    }

    #[test]
    fn test_placement_filters() {
        let params: Vec<_> = PARENT.params().map(|f| f.name).collect();
        assert_eq!(params, vec!["id", "mode", "children", "ids"]);

        let elements: Vec<_> = PARENT.elements().map(|f| f.name).collect();
        assert_eq!(elements, vec!["created"]);
    }

    #[test]
    fn test_unconstrained_field_allows_anything() {
        let id = PARENT.field("id").unwrap();
        assert!(id.allows("whatever"));
    }

    #[test]
    fn test_duplicate_names() {
        assert!(PARENT.duplicate_names().is_empty());

        static BROKEN: StructSchema = StructSchema {
            type_name: "Broken",
            fields: &[
                FieldSchema::param("x"),
                FieldSchema::param("x"),
                FieldSchema::param("x"),
            ],
        };
        assert_eq!(BROKEN.duplicate_names(), vec!["x"]);
    }
}

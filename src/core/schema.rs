//! Schema model: object types, fields, arguments and the immutable schema
//!
//! Schemas are assembled with [`SchemaBuilder`] and never mutated afterwards.
//! A changed record set produces a new [`Schema`] that replaces the old one
//! wholesale (see [`crate::reload`]).

use super::error::SchemaError;
use super::field::FieldValue;
use super::resolver::{KeyResolver, SharedResolver};
use super::scalar::ScalarType;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Write as _};
use std::sync::{Arc, OnceLock};

/// Name of the implicit field every object type answers
pub const TYPENAME_FIELD: &str = "__typename";

/// Type of a field or argument
///
/// The executor dispatches on this tag explicitly: `NonNull` enforces
/// presence, `List` maps over elements, `Named` resolves to a scalar or an
/// object type of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Named(String),
    NonNull(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        FieldType::Named(name.into())
    }

    pub fn non_null(inner: FieldType) -> Self {
        FieldType::NonNull(Box::new(inner))
    }

    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            FieldType::Named(name) => name,
            FieldType::NonNull(inner) | FieldType::List(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Named(name) => write!(f, "{}", name),
            FieldType::NonNull(inner) => write!(f, "{}!", inner),
            FieldType::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

/// Declared argument of a field
#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: FieldType,
    pub default: Option<FieldValue>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Non-null without a default value
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default.is_none()
    }
}

/// Declared field of an object type
#[derive(Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: FieldType,
    arguments: IndexMap<String, ArgumentDefinition>,
    duplicate_arguments: Vec<String>,
    resolver: SharedResolver,
}

impl FieldDefinition {
    /// Create a field resolved by reading the key of the same name off its parent
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        Self {
            resolver: KeyResolver::shared(name.clone()),
            name,
            description: None,
            ty,
            arguments: IndexMap::new(),
            duplicate_arguments: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare an argument; a repeated name is kept out and rejected when the schema is built
    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        if self.arguments.contains_key(&argument.name) {
            self.duplicate_arguments.push(argument.name);
        } else {
            self.arguments.insert(argument.name.clone(), argument);
        }
        self
    }

    pub fn resolver(mut self, resolver: SharedResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentDefinition> {
        self.arguments.values()
    }

    pub fn get_argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.get(name)
    }

    pub fn bound_resolver(&self) -> &SharedResolver {
        &self.resolver
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Named object type with uniquely named fields
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    fields: IndexMap<String, FieldDefinition>,
    duplicate_fields: Vec<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            duplicate_fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field; a repeated name is rejected when the schema is built
    pub fn field(mut self, field: FieldDefinition) -> Self {
        if self.fields.contains_key(&field.name) {
            self.duplicate_fields.push(field.name.clone());
        } else {
            self.fields.insert(field.name.clone(), field);
        }
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A type looked up by name
#[derive(Debug, Clone, Copy)]
pub enum NamedType<'a> {
    Scalar(&'a ScalarType),
    Object(&'a ObjectType),
}

/// Immutable closure of the types reachable from the query root
#[derive(Debug)]
pub struct Schema {
    query: Arc<ObjectType>,
    objects: HashMap<String, Arc<ObjectType>>,
    scalars: HashMap<String, ScalarType>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// The query root type
    pub fn query_type(&self) -> &ObjectType {
        &self.query
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name).map(Arc::as_ref)
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarType> {
        self.scalars.get(name)
    }

    pub fn named_type(&self, name: &str) -> Option<NamedType<'_>> {
        if let Some(scalar) = self.scalars.get(name) {
            return Some(NamedType::Scalar(scalar));
        }
        self.object_type(name).map(NamedType::Object)
    }

    /// Names of all object types, root first, then alphabetical
    pub fn object_type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .objects
            .keys()
            .map(String::as_str)
            .filter(|name| *name != self.query.name)
            .collect();
        names.sort_unstable();
        names.insert(0, &self.query.name);
        names
    }

    /// Render the schema in SDL form
    pub fn to_sdl(&self) -> String {
        let mut sdl = String::new();
        let mut custom_scalars: Vec<&ScalarType> = self
            .scalars
            .values()
            .filter(|s| !is_builtin_scalar(s.name()))
            .collect();
        custom_scalars.sort_by(|a, b| a.name().cmp(b.name()));

        for scalar in custom_scalars {
            write_description(&mut sdl, scalar.description(), "");
            let _ = writeln!(sdl, "scalar {}\n", scalar.name());
        }

        for name in self.object_type_names() {
            let Some(object) = self.object_type(name) else {
                continue;
            };
            write_description(&mut sdl, object.description.as_deref(), "");
            let _ = writeln!(sdl, "type {} {{", object.name);
            for field in object.fields() {
                write_description(&mut sdl, field.description.as_deref(), "  ");
                let args: Vec<String> = field
                    .arguments()
                    .map(|arg| format!("{}: {}", arg.name, arg.ty))
                    .collect();
                if args.is_empty() {
                    let _ = writeln!(sdl, "  {}: {}", field.name, field.ty);
                } else {
                    let _ = writeln!(sdl, "  {}({}): {}", field.name, args.join(", "), field.ty);
                }
            }
            sdl.push_str("}\n\n");
        }

        let _ = writeln!(sdl, "schema {{\n  query: {}\n}}", self.query.name);
        sdl
    }
}

fn write_description(sdl: &mut String, description: Option<&str>, indent: &str) {
    if let Some(description) = description {
        let _ = writeln!(sdl, "{}\"{}\"", indent, description.replace('"', "\\\""));
    }
}

fn is_builtin_scalar(name: &str) -> bool {
    ScalarType::builtins().iter().any(|s| s.name() == name)
}

fn is_valid_name(name: &str) -> bool {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("name pattern is valid")
    });
    regex.is_match(name)
}

/// Fluent schema construction
///
/// # Example
///
/// ```rust,ignore
/// let schema = SchemaBuilder::new()
///     .query(
///         ObjectType::new("Query").field(
///             FieldDefinition::new("hello", FieldType::named("String"))
///                 .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world")))),
///         ),
///     )
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    query: Option<ObjectType>,
    types: Vec<ObjectType>,
    scalars: Vec<ScalarType>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query root type
    pub fn query(mut self, root: ObjectType) -> Self {
        self.query = Some(root);
        self
    }

    pub fn register_type(mut self, object: ObjectType) -> Self {
        self.types.push(object);
        self
    }

    pub fn register_scalar(mut self, scalar: ScalarType) -> Self {
        self.scalars.push(scalar);
        self
    }

    /// Check every definition and keep the types reachable from the root
    pub fn build(self) -> Result<Schema, SchemaError> {
        let root = self.query.ok_or(SchemaError::MissingRoot)?;

        let mut scalars: HashMap<String, ScalarType> = ScalarType::builtins()
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        for scalar in self.scalars {
            if !is_valid_name(scalar.name()) {
                return Err(SchemaError::InvalidName {
                    name: scalar.name().to_string(),
                });
            }
            // A custom scalar may replace a built-in, but not another custom scalar
            if scalars.contains_key(scalar.name()) && !is_builtin_scalar(scalar.name()) {
                return Err(SchemaError::DuplicateType {
                    name: scalar.name().to_string(),
                });
            }
            scalars.insert(scalar.name().to_string(), scalar);
        }

        let mut declared: HashMap<String, ObjectType> = HashMap::new();
        for object in std::iter::once(root.clone()).chain(self.types) {
            check_object(&object)?;
            if scalars.contains_key(&object.name) || declared.contains_key(&object.name) {
                return Err(SchemaError::DuplicateType { name: object.name });
            }
            declared.insert(object.name.clone(), object);
        }

        // Walk the closure from the root; unreachable declarations are dropped
        let mut objects: HashMap<String, Arc<ObjectType>> = HashMap::new();
        let mut queue = VecDeque::from([root.name.clone()]);
        while let Some(name) = queue.pop_front() {
            if objects.contains_key(&name) {
                continue;
            }
            let Some(object) = declared.remove(&name) else {
                continue;
            };
            for field in object.fields() {
                let referenced = field.ty.base_name();
                if declared.contains_key(referenced) {
                    queue.push_back(referenced.to_string());
                } else if !scalars.contains_key(referenced)
                    && !objects.contains_key(referenced)
                    && referenced != object.name
                {
                    return Err(SchemaError::UnknownType {
                        type_name: object.name.clone(),
                        field: field.name.clone(),
                        referenced: referenced.to_string(),
                    });
                }

                for argument in field.arguments() {
                    let arg_type = argument.ty.base_name();
                    if scalars.contains_key(arg_type) {
                        continue;
                    }
                    if declared.contains_key(arg_type)
                        || objects.contains_key(arg_type)
                        || arg_type == object.name
                    {
                        return Err(SchemaError::ArgumentNotScalar {
                            type_name: object.name.clone(),
                            field: field.name.clone(),
                            argument: argument.name.clone(),
                        });
                    }
                    return Err(SchemaError::UnknownType {
                        type_name: object.name.clone(),
                        field: field.name.clone(),
                        referenced: arg_type.to_string(),
                    });
                }
            }
            objects.insert(name, Arc::new(object));
        }

        let query = objects
            .get(&root.name)
            .cloned()
            .ok_or(SchemaError::MissingRoot)?;

        Ok(Schema {
            query,
            objects,
            scalars,
        })
    }
}

fn check_object(object: &ObjectType) -> Result<(), SchemaError> {
    if !is_valid_name(&object.name) {
        return Err(SchemaError::InvalidName {
            name: object.name.clone(),
        });
    }
    if let Some(field) = object.duplicate_fields.first() {
        return Err(SchemaError::DuplicateField {
            type_name: object.name.clone(),
            field: field.clone(),
        });
    }
    if object.fields.is_empty() {
        return Err(SchemaError::EmptyObject {
            type_name: object.name.clone(),
        });
    }
    for field in object.fields() {
        if !is_valid_name(&field.name) || field.name.starts_with("__") {
            return Err(SchemaError::InvalidName {
                name: field.name.clone(),
            });
        }
        if let Some(argument) = field.duplicate_arguments.first() {
            return Err(SchemaError::DuplicateArgument {
                type_name: object.name.clone(),
                field: field.name.clone(),
                argument: argument.clone(),
            });
        }
        for argument in field.arguments() {
            if !is_valid_name(&argument.name) {
                return Err(SchemaError::InvalidName {
                    name: argument.name.clone(),
                });
            }
        }
    }
    Ok(())
}

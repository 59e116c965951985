//! Insertion-only registry of type declarations.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ConvertError;
use crate::types::TypeDeclaration;

/// Name -> declaration, in insertion order.
///
/// Entries are never replaced or removed: inserting a name twice is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    declarations: IndexMap<String, TypeDeclaration>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from declarations, failing on the first repeated name.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NameCollision` for a repeated name.
    pub fn from_declarations(
        declarations: impl IntoIterator<Item = TypeDeclaration>,
    ) -> Result<Self, ConvertError> {
        let mut registry = Self::new();
        for declaration in declarations {
            registry.insert(declaration)?;
        }
        Ok(registry)
    }

    /// Insert one declaration.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NameCollision` if the name is already declared.
    pub fn insert(&mut self, declaration: TypeDeclaration) -> Result<(), ConvertError> {
        if self.declarations.contains_key(&declaration.name) {
            return Err(ConvertError::NameCollision {
                name: declaration.name,
            });
        }
        self.declarations
            .insert(declaration.name.clone(), declaration);
        Ok(())
    }

    /// Insert a batch of declarations, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NameCollision` if any name is already declared
    /// or appears twice in the batch; the registry is left unchanged.
    pub fn extend(
        &mut self,
        declarations: impl IntoIterator<Item = TypeDeclaration>,
    ) -> Result<(), ConvertError> {
        let batch: Vec<TypeDeclaration> = declarations.into_iter().collect();
        let mut seen = HashSet::with_capacity(batch.len());
        for declaration in &batch {
            let repeated = !seen.insert(declaration.name.as_str());
            if repeated || self.declarations.contains_key(&declaration.name) {
                return Err(ConvertError::NameCollision {
                    name: declaration.name.clone(),
                });
            }
        }
        for declaration in batch {
            self.declarations
                .insert(declaration.name.clone(), declaration);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.declarations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.declarations.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    /// Every (declaring type, missing name) pair whose reference has no
    /// declaration in this registry.
    pub fn unresolved_references(&self) -> Vec<(&str, &str)> {
        let mut missing = Vec::new();
        for declaration in self.declarations.values() {
            for name in declaration.referenced_names() {
                if !self.contains(name) {
                    missing.push((declaration.name.as_str(), name));
                }
            }
        }
        missing
    }

    /// Check that every named reference resolves.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::UnresolvedReference` for the first miss.
    pub fn check_references(&self) -> Result<(), ConvertError> {
        match self.unresolved_references().first() {
            Some((referenced_by, name)) => Err(ConvertError::UnresolvedReference {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectProperty, TypeReference, TypeShape};

    fn alias(name: &str, target: &str) -> TypeDeclaration {
        TypeDeclaration::new(
            name,
            TypeShape::Alias {
                alias_of: TypeReference::list(TypeReference::named(target)),
            },
        )
    }

    #[test]
    fn insert_rejects_collisions() {
        let mut registry = TypeRegistry::new();
        registry
            .insert(TypeDeclaration::new("Post", TypeShape::empty_object()))
            .unwrap();
        let result = registry.insert(TypeDeclaration::new(
            "Post",
            TypeShape::Enum { values: vec![] },
        ));
        assert!(matches!(result, Err(ConvertError::NameCollision { name }) if name == "Post"));
        assert_eq!(registry.get("Post").unwrap().shape, TypeShape::empty_object());
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut registry = TypeRegistry::new();
        registry
            .insert(TypeDeclaration::new("Existing", TypeShape::empty_object()))
            .unwrap();

        let result = registry.extend(vec![
            TypeDeclaration::new("Fresh", TypeShape::empty_object()),
            TypeDeclaration::new("Existing", TypeShape::empty_object()),
        ]);
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("Fresh"));

        let result = registry.extend(vec![
            TypeDeclaration::new("Twice", TypeShape::empty_object()),
            TypeDeclaration::new("Twice", TypeShape::empty_object()),
        ]);
        assert!(matches!(result, Err(ConvertError::NameCollision { name }) if name == "Twice"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn extend_handles_large_batches() {
        let batch = |extra: Option<&str>| {
            (0..5000)
                .map(|i| format!("Type{}", i))
                .chain(extra.map(str::to_string))
                .map(|name| TypeDeclaration::new(name, TypeShape::empty_object()))
                .collect::<Vec<_>>()
        };

        let mut registry = TypeRegistry::new();
        let result = registry.extend(batch(Some("Type17")));
        assert!(matches!(result, Err(ConvertError::NameCollision { name }) if name == "Type17"));
        assert!(registry.is_empty());

        registry.extend(batch(None)).unwrap();
        assert_eq!(registry.len(), 5000);
        assert_eq!(registry.names().last(), Some("Type4999"));
    }

    #[test]
    fn preserves_insertion_order() {
        let registry = TypeRegistry::from_declarations(
            ["B", "A", "C"]
                .into_iter()
                .map(|name| TypeDeclaration::new(name, TypeShape::empty_object())),
        )
        .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["B", "A", "C"]);
    }

    #[test]
    fn recursive_references_resolve() {
        let mut registry = TypeRegistry::new();
        registry
            .insert(TypeDeclaration::new(
                "Node",
                TypeShape::Object {
                    extends: vec![],
                    properties: vec![ObjectProperty::new(
                        "children",
                        TypeReference::list(TypeReference::named("Node")),
                    )],
                },
            ))
            .unwrap();
        assert!(registry.check_references().is_ok());
    }

    #[test]
    fn unresolved_references_are_reported() {
        let mut registry = TypeRegistry::new();
        registry.insert(alias("Posts", "Post")).unwrap();
        assert_eq!(registry.unresolved_references(), vec![("Posts", "Post")]);
        assert!(matches!(
            registry.check_references(),
            Err(ConvertError::UnresolvedReference { name, referenced_by })
                if name == "Post" && referenced_by == "Posts"
        ));
    }

    #[test]
    fn serializes_as_name_map() {
        let mut registry = TypeRegistry::new();
        registry.insert(alias("Posts", "Post")).unwrap();
        let value = serde_json::to_value(&registry).unwrap();
        assert_eq!(value["Posts"]["shape"]["aliasOf"], "list<Post>");
    }
}

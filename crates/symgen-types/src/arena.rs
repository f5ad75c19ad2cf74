//! Arena storage for the UserType graph.
//!
//! Parent/child links are integer ids into the arena, which keeps the graph
//! trivially acyclic to construct and cheap to traverse during
//! post-processing and emission.

use crate::user_type::{UserType, UserTypeKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserTypeId(pub u32);

#[derive(Debug, Default)]
pub struct UserTypeArena {
    types: Vec<UserType>,
}

impl UserTypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, user_type: UserType) -> UserTypeId {
        let id = UserTypeId(self.types.len() as u32);
        self.types.push(user_type);
        id
    }

    pub fn get(&self, id: UserTypeId) -> &UserType {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: UserTypeId) -> &mut UserType {
        &mut self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = UserTypeId> + use<> {
        (0..self.types.len() as u32).map(UserTypeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserTypeId, &UserType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| (UserTypeId(i as u32), ty))
    }

    /// The emitted fully-qualified name: constructor names along the
    /// `declared_in` chain, outermost first. A namespace ancestor contributes
    /// its own (possibly dotted) name.
    pub fn full_class_name(&self, id: UserTypeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id);
            parts.push(node.constructor_name.as_str());
            current = node.declared_in;
        }
        // Fall back to the target namespace for types not yet linked into
        // the graph.
        let node = self.get(id);
        if node.declared_in.is_none()
            && !matches!(node.kind, UserTypeKind::Namespace)
            && !node.namespace.is_empty()
        {
            parts.push(node.namespace.as_str());
        }
        parts.reverse();
        parts.join(".")
    }

    /// True when every ancestor of `id` is a namespace node, i.e. the type
    /// is not nested inside another generated class.
    pub fn has_only_namespace_ancestors(&self, id: UserTypeId) -> bool {
        let mut current = self.get(id).declared_in;
        while let Some(node_id) = current {
            let node = self.get(node_id);
            if !matches!(node.kind, UserTypeKind::Namespace) {
                return false;
            }
            current = node.declared_in;
        }
        true
    }
}

impl std::ops::Index<UserTypeId> for UserTypeArena {
    type Output = UserType;

    fn index(&self, id: UserTypeId) -> &UserType {
        self.get(id)
    }
}

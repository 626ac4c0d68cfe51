//! Object arena backing a project file.
//!
//! The arena is shared by reference between generation passes. Insertions
//! are synchronized so targets can be generated in parallel, and storage is
//! a `BTreeMap` so iteration order never depends on insertion order.

use std::collections::BTreeMap;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Serialize, Serializer};

use crate::project_file::object::{Object, ObjectId};

pub struct ObjectArena {
    scope: String,
    objects: Mutex<BTreeMap<ObjectId, Object>>,
}

impl ObjectArena {
    /// Create an empty arena whose ids are derived within `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        ObjectArena {
            scope: scope.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ObjectId, Object>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The id an object registered under `key` has (or would have).
    pub fn id_for(&self, key: &str) -> ObjectId {
        ObjectId::derive(&self.scope, key)
    }

    /// Register an object under a semantic key and return its id.
    ///
    /// An object of the same kind already registered under the key is
    /// replaced. An object of a different kind is kept and the new one is
    /// dropped.
    pub fn add(&self, key: &str, object: Object) -> ObjectId {
        let id = self.id_for(key);
        let mut objects = self.lock();
        if let Some(existing) = objects.get(&id) {
            if mem::discriminant(existing) != mem::discriminant(&object) {
                tracing::warn!(
                    "refusing to replace {} registered under `{}` with {}",
                    existing.isa(),
                    key,
                    object.isa()
                );
                return id;
            }
            tracing::debug!("replaced object registered under `{}`", key);
        }
        objects.insert(id.clone(), object);
        id
    }

    pub fn get(&self, id: &ObjectId) -> Option<Object> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.lock().contains_key(id)
    }

    /// Patch an object in place. Returns `None` if the id is unknown.
    pub fn update<R>(&self, id: &ObjectId, f: impl FnOnce(&mut Object) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    pub fn remove(&self, id: &ObjectId) -> Option<Object> {
        self.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every object, ordered by id.
    pub fn snapshot(&self) -> BTreeMap<ObjectId, Object> {
        self.lock().clone()
    }

    /// Ids of all objects matching a predicate, ordered by id.
    pub fn ids_where(&self, predicate: impl Fn(&Object) -> bool) -> Vec<ObjectId> {
        self.lock()
            .iter()
            .filter(|(_, object)| predicate(object))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl Clone for ObjectArena {
    fn clone(&self) -> Self {
        ObjectArena {
            scope: self.scope.clone(),
            objects: Mutex::new(self.snapshot()),
        }
    }
}

impl std::fmt::Debug for ObjectArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectArena")
            .field("scope", &self.scope)
            .field("objects", &self.len())
            .finish()
    }
}

impl Serialize for ObjectArena {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lock().serialize(serializer)
    }
}

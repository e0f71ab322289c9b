use std::collections::BTreeMap;
use std::path::PathBuf;

use glam::Vec3;
use log::warn;

/// Handle to a renderable model owned by the scene's [`ModelLibrary`].
///
/// Decoding the referenced asset is the host's job; the simulation only
/// passes these handles through to the render snapshot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ModelId(pub(crate) usize);

/// Where a model comes from and how large it should be drawn.
#[derive(Debug, Clone)]
pub struct ModelSource {
    pub name: String,
    pub path: PathBuf,
    /// Base display scale, multiplied with the owning entity's scale.
    pub scale: Vec3,
}

/// Named registry of model handles, insert-once.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    models: Vec<ModelSource>,
    by_name: BTreeMap<String, ModelId>,
}

impl ModelLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model under `name`. Re-registering a name is a host bug;
    /// it is logged and the existing handle is returned unchanged.
    pub fn insert(&mut self, name: &str, path: impl Into<PathBuf>, scale: Vec3) -> ModelId {
        if let Some(&existing) = self.by_name.get(name) {
            warn!("model {name:?} registered twice, keeping the first one");
            return existing;
        }
        let id = ModelId(self.models.len());
        self.models.push(ModelSource {
            name: name.to_owned(),
            path: path.into(),
            scale,
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    #[must_use]
    pub fn get(&self, id: ModelId) -> &ModelSource {
        &self.models[id.0]
    }

    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ModelId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_keep_the_first_handle() {
        let mut library = ModelLibrary::new();
        let first = library.insert("tree", "models/tree/tree.obj", Vec3::ONE);
        let second = library.insert("tree", "models/tree/other.obj", Vec3::splat(2.0));
        assert_eq!(first, second);
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(first).path, PathBuf::from("models/tree/tree.obj"));
    }

    #[test]
    fn lookup_by_name() {
        let mut library = ModelLibrary::new();
        let id = library.insert("road_section", "models/road/road.obj", Vec3::ONE);
        assert_eq!(library.id_of("road_section"), Some(id));
        assert_eq!(library.id_of("missing"), None);
    }
}

use std::any::TypeId;

use crate::error::{EngineError, EngineResult};

use super::{AnyManaged, LoadCtx, LoadState, Managed, Resource};

/// Which discovery pass picks a resource up.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadTag {
    /// Loaded synchronously, before the loading scene's first frame.
    Priority,
    /// Loaded on the background worker.
    Bulk,
}

type Constructor = fn(LoadCtx) -> Box<dyn AnyManaged>;

#[derive(Clone)]
struct Registration {
    tag: LoadTag,
    id: TypeId,
    name: &'static str,
    construct: Constructor,
}

fn construct<R: Resource + Default>(ctx: LoadCtx) -> Box<dyn AnyManaged> {
    Box::new(Managed::new(R::default(), ctx))
}

/// Startup-time list of resource types, each tagged with its pass.
///
/// ```ignore
/// let manifest = ResourceManifest::new()
///     .priority::<LoaderFont>()
///     .bulk::<CubeModel>()
///     .bulk::<TerrainModel>();
/// ```
#[derive(Clone, Default)]
pub struct ResourceManifest {
    entries: Vec<Registration>,
}

impl ResourceManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority<R: Resource + Default>(mut self) -> Self {
        self.register::<R>(LoadTag::Priority);
        self
    }

    pub fn bulk<R: Resource + Default>(mut self) -> Self {
        self.register::<R>(LoadTag::Bulk);
        self
    }

    /// Adds `R` under `tag`. A type already listed keeps its first tag.
    pub fn register<R: Resource + Default>(&mut self, tag: LoadTag) -> bool {
        let id = TypeId::of::<R>();
        let name = std::any::type_name::<R>();

        if let Some(existing) = self.entries.iter().find(|e| e.id == id) {
            log::warn!(
                "resource {name} already listed as {:?}; ignoring {tag:?}",
                existing.tag
            );
            return false;
        }

        self.entries.push(Registration {
            tag,
            id,
            name,
            construct: construct::<R>,
        });
        true
    }

    pub fn count(&self, tag: LoadTag) -> usize {
        self.entries.iter().filter(|e| e.tag == tag).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Live resources keyed by concrete type, in gather order.
///
/// Dropping the registry unloads everything, last gathered first.
#[derive(Default)]
pub struct ResourceRegistry {
    entries: Vec<(TypeId, Box<dyn AnyManaged>)>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates every `tag` entry of `manifest` not already present and
    /// passes it to `each` (normally a load).
    ///
    /// Returns the number of newly instantiated resources. The first failing
    /// callback aborts the pass; the failing resource stays registered, in
    /// whatever state the callback left it.
    pub fn gather<F>(
        &mut self,
        manifest: &ResourceManifest,
        tag: LoadTag,
        ctx: &LoadCtx,
        mut each: F,
    ) -> EngineResult<usize>
    where
        F: FnMut(&mut dyn AnyManaged) -> anyhow::Result<()>,
    {
        let mut added = 0;

        for reg in manifest.entries.iter().filter(|e| e.tag == tag) {
            if self.contains_id(reg.id) {
                continue;
            }

            self.entries.push((reg.id, (reg.construct)(ctx.clone())));
            added += 1;

            if let Some((_, resource)) = self.entries.last_mut() {
                each(resource.as_mut()).map_err(|source| EngineError::Resource {
                    name: reg.name,
                    source,
                })?;
            }
        }

        log::debug!("{tag:?} pass: {added} resource(s)");
        Ok(added)
    }

    /// Gathers `tag` and loads each new entry.
    pub fn load_all(
        &mut self,
        manifest: &ResourceManifest,
        tag: LoadTag,
        ctx: &LoadCtx,
    ) -> EngineResult<usize> {
        self.gather(manifest, tag, ctx, |r| r.load())
    }

    pub fn contains<R: Resource>(&self) -> bool {
        self.contains_id(TypeId::of::<R>())
    }

    pub fn get<R: Resource>(&self) -> Option<&Managed<R>> {
        let id = TypeId::of::<R>();
        self.entries
            .iter()
            .find(|(e, _)| *e == id)
            .and_then(|(_, r)| r.as_any().downcast_ref::<Managed<R>>())
    }

    pub fn state_of<R: Resource>(&self) -> Option<LoadState> {
        self.get::<R>().map(|m| m.state())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unload_all(&mut self) {
        for (_, resource) in self.entries.iter_mut().rev() {
            resource.unload();
        }
    }

    fn contains_id(&self, id: TypeId) -> bool {
        self.entries.iter().any(|(e, _)| *e == id)
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.unload_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::resource::GpuTasks;

    static MESH_LOADS: AtomicUsize = AtomicUsize::new(0);
    static MESH_CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Mesh;

    impl Default for Mesh {
        fn default() -> Self {
            MESH_CREATED.fetch_add(1, Ordering::SeqCst);
            Mesh
        }
    }

    impl Resource for Mesh {
        fn load(&mut self, _ctx: &mut LoadCtx) -> anyhow::Result<()> {
            MESH_LOADS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {}
    }

    #[derive(Default)]
    struct Font;

    impl Resource for Font {
        fn load(&mut self, _ctx: &mut LoadCtx) -> anyhow::Result<()> {
            Ok(())
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {}
    }

    #[derive(Default)]
    struct Broken;

    impl Resource for Broken {
        fn load(&mut self, _ctx: &mut LoadCtx) -> anyhow::Result<()> {
            anyhow::bail!("missing data")
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {}
    }

    fn ctx() -> LoadCtx {
        let (tasks, _queue) = GpuTasks::channel();
        LoadCtx::new(tasks)
    }

    #[test]
    fn gather_picks_only_the_requested_tag() {
        let manifest = ResourceManifest::new().priority::<Font>().bulk::<Broken>();
        let mut reg = ResourceRegistry::new();

        let added = reg.load_all(&manifest, LoadTag::Priority, &ctx()).unwrap();
        assert_eq!(added, 1);
        assert!(reg.contains::<Font>());
        assert!(!reg.contains::<Broken>());
        assert_eq!(reg.state_of::<Font>(), Some(LoadState::Loaded));
    }

    #[test]
    fn repeated_gather_instantiates_each_type_once() {
        let manifest = ResourceManifest::new().bulk::<Mesh>();
        let mut reg = ResourceRegistry::new();
        let ctx = ctx();

        reg.load_all(&manifest, LoadTag::Bulk, &ctx).unwrap();
        let again = reg.load_all(&manifest, LoadTag::Bulk, &ctx).unwrap();

        assert_eq!(again, 0);
        assert_eq!(reg.len(), 1);
        assert_eq!(MESH_CREATED.load(Ordering::SeqCst), 1);
        assert_eq!(MESH_LOADS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_registration_is_skipped() {
        let mut manifest = ResourceManifest::new().priority::<Font>();
        assert!(!manifest.register::<Font>(LoadTag::Bulk));
        assert_eq!(manifest.count(LoadTag::Priority), 1);
        assert_eq!(manifest.count(LoadTag::Bulk), 0);
    }

    #[test]
    fn failed_load_names_the_resource() {
        let manifest = ResourceManifest::new().bulk::<Broken>();
        let mut reg = ResourceRegistry::new();

        let err = reg
            .load_all(&manifest, LoadTag::Bulk, &ctx())
            .unwrap_err();
        assert!(err.to_string().contains("Broken"));
        assert_eq!(reg.state_of::<Broken>(), Some(LoadState::Unloaded));
    }

    #[test]
    fn unload_all_leaves_entries_unloaded() {
        let manifest = ResourceManifest::new().priority::<Font>();
        let mut reg = ResourceRegistry::new();
        reg.load_all(&manifest, LoadTag::Priority, &ctx()).unwrap();

        reg.unload_all();
        assert_eq!(reg.state_of::<Font>(), Some(LoadState::Unloaded));
    }
}

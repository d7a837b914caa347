use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` is how shared engine state (the chunk store, the mesh store) is
/// handed to worker tasks. Cloning only clones the `Arc`, so every clone sees
/// the same value.
///
/// # Examples
///
/// ```
/// use voxel_world::core::MtResource;
///
/// let loaded_chunks = MtResource::new(Vec::<(i32, i32)>::new());
/// let worker_view = loaded_chunks.clone();
///
/// let handle = std::thread::spawn(move || {
///     worker_view.get_mut().push((0, 0));
/// });
///
/// handle.join().unwrap();
/// assert_eq!(loaded_chunks.get().len(), 1);
/// ```
///
/// # Lock discipline
/// - Readers (`get()`) may run concurrently
/// - Writers (`get_mut()`) are exclusive
/// - Guards should be dropped before doing long-running work such as terrain
///   generation or meshing, so that other workers are never starved
pub struct MtResource<T: Send + Sync> {
    pub resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard over the contained value.
    ///
    /// A poisoned lock is recovered rather than propagated: a worker that
    /// panicked mid-task never leaves the chunk map structurally invalid,
    /// because every mutation is a single map insert or remove.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard over the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

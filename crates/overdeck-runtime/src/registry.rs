#![forbid(unsafe_code)]

//! The overlay registry: named kinds, each with its own store and renderer.
//!
//! A [`RegistryContext`] is built once at application start, every kind is
//! registered into it, and then it is handed by reference to the root mount
//! and to whatever code needs an [`OverlayKind`]. Kinds are write-once: no
//! re-registration and no removal.
//!
//! Kinds are described by the [`KindDescriptor`] trait. The registry erases the
//! content type so kinds with different payloads can share one registry, while
//! [`RegistryContext::get`] restores it with a checked downcast.

use std::any::{Any, type_name};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use indexmap::IndexMap;
use overdeck_core::{KindState, OverlayError, Result};

use crate::binding::ViewBinding;
use crate::kind::OverlayKind;

/// Static description of one overlay kind.
///
/// `V` is the view type every renderer in a registry produces.
pub trait KindDescriptor<V>: 'static {
    /// Payload carried by each item of this kind.
    type Content: Clone + 'static;

    fn name(&self) -> &str;

    fn initial_state(&self) -> KindState<Self::Content> {
        Vec::new()
    }

    /// Map the kind's whole state to its rendered output.
    fn render(&self, state: &KindState<Self::Content>) -> V;
}

/// Descriptor assembled from a name, an initial state, and a closure.
pub struct FnKind<C, V, F> {
    name: String,
    initial: KindState<C>,
    renderer: F,
    _view: PhantomData<fn() -> V>,
}

impl<C, V, F> FnKind<C, V, F>
where
    F: Fn(&KindState<C>) -> V,
{
    pub fn new(name: impl Into<String>, initial: KindState<C>, renderer: F) -> Self {
        Self {
            name: name.into(),
            initial,
            renderer,
            _view: PhantomData,
        }
    }
}

impl<C, V, F> KindDescriptor<V> for FnKind<C, V, F>
where
    C: Clone + 'static,
    V: 'static,
    F: Fn(&KindState<C>) -> V + 'static,
{
    type Content = C;

    fn name(&self) -> &str {
        &self.name
    }

    fn initial_state(&self) -> KindState<C> {
        self.initial.clone()
    }

    fn render(&self, state: &KindState<C>) -> V {
        (self.renderer)(state)
    }
}

/// Type-erased view of a registered kind.
pub(crate) trait RegisteredKind<V> {
    fn bind(&self) -> ViewBinding<V>;
    fn content_type(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

struct Registered<D: KindDescriptor<V>, V> {
    descriptor: Rc<D>,
    kind: OverlayKind<D::Content>,
    _view: PhantomData<fn() -> V>,
}

impl<D, V> RegisteredKind<V> for Registered<D, V>
where
    D: KindDescriptor<V>,
    V: 'static,
{
    fn bind(&self) -> ViewBinding<V> {
        let descriptor = Rc::clone(&self.descriptor);
        ViewBinding::attach(self.kind.name(), self.kind.store(), move |state| {
            descriptor.render(state)
        })
    }

    fn content_type(&self) -> &'static str {
        type_name::<D::Content>()
    }

    fn as_any(&self) -> &dyn Any {
        &self.kind
    }
}

/// Process-wide set of overlay kinds, in registration order.
pub struct RegistryContext<V> {
    kinds: IndexMap<Rc<str>, Box<dyn RegisteredKind<V>>>,
    mount_active: Rc<Cell<bool>>,
}

impl<V> Default for RegistryContext<V> {
    fn default() -> Self {
        Self {
            kinds: IndexMap::new(),
            mount_active: Rc::new(Cell::new(false)),
        }
    }
}

impl<V> fmt::Debug for RegistryContext<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryContext")
            .field("kinds", &self.kinds.keys().collect::<Vec<_>>())
            .field("mount_active", &self.mount_active.get())
            .finish()
    }
}

impl<V: 'static> RegistryContext<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind and return its instance API.
    ///
    /// # Errors
    ///
    /// [`OverlayError::DuplicateKind`] if the name is taken. The existing
    /// kind and its store are left untouched.
    pub fn register<D>(&mut self, descriptor: D) -> Result<OverlayKind<D::Content>>
    where
        D: KindDescriptor<V>,
    {
        let name: Rc<str> = Rc::from(descriptor.name());
        if self.kinds.contains_key(&name) {
            tracing::warn!(message = "registry.duplicate_kind", kind = &*name);
            return Err(OverlayError::duplicate(&*name));
        }
        if self.mount_active.get() {
            tracing::warn!(message = "registry.late_register", kind = &*name);
        }

        let kind = OverlayKind::new(Rc::clone(&name), descriptor.initial_state());
        tracing::debug!(
            message = "registry.register",
            kind = &*name,
            content = type_name::<D::Content>(),
            initial_len = kind.len()
        );
        self.kinds.insert(
            Rc::clone(&name),
            Box::new(Registered {
                descriptor: Rc::new(descriptor),
                kind: kind.clone(),
                _view: PhantomData,
            }),
        );
        Ok(kind)
    }

    /// Register a kind from a name, an initial state, and a renderer closure.
    ///
    /// # Errors
    ///
    /// [`OverlayError::DuplicateKind`] if the name is taken.
    pub fn register_fn<C, F>(
        &mut self,
        name: impl Into<String>,
        initial: KindState<C>,
        renderer: F,
    ) -> Result<OverlayKind<C>>
    where
        C: Clone + 'static,
        F: Fn(&KindState<C>) -> V + 'static,
    {
        self.register(FnKind::new(name, initial, renderer))
    }

    /// Look up a kind's instance API.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnknownKind`] if nothing is registered under `name`,
    /// [`OverlayError::KindTypeMismatch`] if it holds a different content type.
    pub fn get<C: Clone + 'static>(&self, name: &str) -> Result<OverlayKind<C>> {
        let Some(entry) = self.kinds.get(name) else {
            tracing::warn!(message = "registry.unknown_kind", kind = name);
            return Err(OverlayError::unknown(name));
        };
        entry
            .as_any()
            .downcast_ref::<OverlayKind<C>>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!(
                    message = "registry.kind_type_mismatch",
                    kind = name,
                    registered = entry.content_type(),
                    expected = type_name::<C>()
                );
                OverlayError::KindTypeMismatch {
                    kind: name.to_string(),
                    expected: type_name::<C>(),
                }
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Kind names in registration order.
    pub fn all_kinds(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.kinds.keys().map(|name| &**name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Whether a root mount built from this registry is currently active.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mount_active.get()
    }

    pub(crate) fn bind_all(&self) -> Vec<ViewBinding<V>> {
        self.kinds.values().map(|kind| kind.bind()).collect()
    }

    pub(crate) fn mount_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.mount_active)
    }
}

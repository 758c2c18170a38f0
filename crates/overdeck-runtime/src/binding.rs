#![forbid(unsafe_code)]

//! View bindings and the root mount.
//!
//! A [`ViewBinding`] reads a store once, renders it, and then re-renders on
//! every notification until it is detached. The [`RootMount`] owns one
//! binding per registered kind and hands their outputs, in registration
//! order, to an [`OverlayHost`]. Kinds stay independent: each has its own
//! binding and its own layer, never a shared item list.
//!
//! Kinds registered after the mount activates are not discovered.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use overdeck_core::{OverlayError, Result};

use crate::host::{ContainerId, KindLayer, OverlayHost};
use crate::reactive::{Store, Subscription};
use crate::registry::RegistryContext;

/// Live link between one store and its rendered output.
pub struct ViewBinding<V> {
    kind: Rc<str>,
    output: Rc<RefCell<V>>,
    dirty: Rc<Cell<bool>>,
    renders: Rc<Cell<u64>>,
    subscription: Subscription,
}

impl<V: fmt::Debug> fmt::Debug for ViewBinding<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBinding")
            .field("kind", &self.kind)
            .field("output", &self.output)
            .field("dirty", &self.dirty.get())
            .field("renders", &self.renders.get())
            .field("active", &self.subscription.is_active())
            .finish()
    }
}

impl<V: 'static> ViewBinding<V> {
    /// Render the current state of `store` and subscribe for changes.
    pub fn attach<T: 'static>(
        kind: &str,
        store: &Store<T>,
        render: impl Fn(&T) -> V + 'static,
    ) -> Self {
        let output = Rc::new(RefCell::new(store.with(&render)));
        let dirty = Rc::new(Cell::new(true));
        let renders = Rc::new(Cell::new(1));

        let weak_output = Rc::downgrade(&output);
        let sub_dirty = Rc::clone(&dirty);
        let sub_renders = Rc::clone(&renders);
        let subscription = store.subscribe(move |state| {
            if let Some(output) = weak_output.upgrade() {
                *output.borrow_mut() = render(state);
                sub_dirty.set(true);
                sub_renders.set(sub_renders.get() + 1);
            }
        });

        Self {
            kind: Rc::from(kind),
            output,
            dirty,
            renders,
            subscription,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Read the latest rendered output.
    pub fn with_output<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.output.borrow())
    }

    #[must_use]
    pub fn snapshot(&self) -> V
    where
        V: Clone,
    {
        self.output.borrow().clone()
    }

    /// Whether the output changed since the last [`take_dirty`](Self::take_dirty).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    /// Number of times the renderer ran, including the initial render.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders.get()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Release the store subscription. The last output stays readable.
    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }
}

/// The single mount point rendering every registered kind.
pub struct RootMount<V> {
    container: ContainerId,
    anchor: String,
    bindings: Vec<ViewBinding<V>>,
    mount_active: Rc<Cell<bool>>,
    released: bool,
}

impl<V: fmt::Debug> fmt::Debug for RootMount<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootMount")
            .field("container", &self.container)
            .field("anchor", &self.anchor)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + 'static> RootMount<V> {
    /// Activate the mount: insert the overlay container next to `anchor` and
    /// bind every kind registered so far.
    ///
    /// # Errors
    ///
    /// - [`OverlayError::AlreadyMounted`] if another mount from `ctx` is active.
    /// - [`OverlayError::MissingAnchor`] if `host` has no element `anchor`.
    pub fn mount<H>(ctx: &RegistryContext<V>, host: &mut H, anchor: &str) -> Result<Self>
    where
        H: OverlayHost<V> + ?Sized,
    {
        if ctx.is_mounted() {
            return Err(OverlayError::AlreadyMounted);
        }
        if !host.has_anchor(anchor) {
            return Err(OverlayError::MissingAnchor {
                anchor: anchor.to_string(),
            });
        }

        let container = host.insert_after(anchor);
        let bindings = ctx.bind_all();
        let mount_active = ctx.mount_flag();
        mount_active.set(true);

        tracing::debug!(
            message = "mount.activate",
            anchor,
            container = container.get(),
            kinds = bindings.len()
        );

        Ok(Self {
            container,
            anchor: anchor.to_string(),
            bindings,
            mount_active,
            released: false,
        })
    }

    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Kind names this mount renders, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.bindings.iter().map(ViewBinding::kind)
    }

    #[must_use]
    pub fn binding(&self, kind: &str) -> Option<&ViewBinding<V>> {
        self.bindings.iter().find(|binding| binding.kind() == kind)
    }

    /// Latest output of every kind, in registration order.
    #[must_use]
    pub fn layers(&self) -> Vec<KindLayer<V>> {
        self.bindings
            .iter()
            .map(|binding| KindLayer {
                kind: binding.kind().to_string(),
                view: binding.snapshot(),
            })
            .collect()
    }

    /// Whether any kind re-rendered since the last present.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.bindings.iter().any(ViewBinding::is_dirty)
    }

    /// Hand all layers to `host` if anything changed. Returns whether it did.
    pub fn present<H>(&self, host: &mut H) -> bool
    where
        H: OverlayHost<V> + ?Sized,
    {
        let span = tracing::debug_span!("mount.render", container = self.container.get());
        let _enter = span.enter();

        let mut dirty = false;
        for binding in &self.bindings {
            dirty |= binding.take_dirty();
        }
        if !dirty {
            return false;
        }
        host.present(self.container, &self.layers());
        true
    }

    /// Deactivate: release every subscription and remove the container.
    pub fn unmount<H>(mut self, host: &mut H)
    where
        H: OverlayHost<V> + ?Sized,
    {
        self.release();
        host.remove(self.container);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        for binding in &self.bindings {
            binding.detach();
        }
        self.mount_active.set(false);
        self.released = true;
        tracing::debug!(
            message = "mount.deactivate",
            anchor = self.anchor.as_str(),
            container = self.container.get()
        );
    }
}

impl<V> Drop for RootMount<V> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Subscriptions release with the bindings; the host container cannot
        // be removed without the host.
        self.mount_active.set(false);
        tracing::warn!(
            message = "mount.dropped_without_unmount",
            container = self.container.get()
        );
    }
}

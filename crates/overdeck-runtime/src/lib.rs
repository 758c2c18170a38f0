#![forbid(unsafe_code)]

//! Runtime: observable stores, the overlay registry, per-instance handles,
//! and the bindings that keep rendered output in sync with state.
//!
//! ```
//! use overdeck_runtime::{HeadlessHost, RegistryContext, RootMount};
//! use overdeck_core::KindState;
//!
//! let mut ctx = RegistryContext::new();
//! let toast = ctx
//!     .register_fn("toast", Vec::new(), |state: &KindState<String>| state.len())
//!     .unwrap();
//!
//! let mut host = HeadlessHost::new("content");
//! let mount = RootMount::mount(&ctx, &mut host, "content").unwrap();
//!
//! let handle = toast.open(|h| format!("saved ({})", h.id()));
//! assert_eq!(mount.layers()[0].view, 1);
//! handle.close();
//! assert_eq!(mount.layers()[0].view, 0);
//! mount.unmount(&mut host);
//! ```

pub mod binding;
pub mod dismiss;
pub mod host;
pub mod kind;
pub mod reactive;
pub mod registry;

pub use binding::{RootMount, ViewBinding};
pub use dismiss::{DismissTimers, TimerToken};
pub use host::{ContainerId, HeadlessHost, KindLayer, OverlayHost};
pub use kind::{Handle, OverlayKind};
pub use reactive::{Store, Subscription, WeakStore};
pub use registry::{FnKind, KindDescriptor, RegistryContext};

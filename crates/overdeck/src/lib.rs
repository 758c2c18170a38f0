#![forbid(unsafe_code)]

//! overdeck public facade crate.
//!
//! Registry-driven overlays: register named kinds once, open instances from
//! anywhere through handles, and render every kind from a single root mount.

pub use overdeck_core::{OverlayError, OverlayId, Result, Visibility};
pub use overdeck_runtime::{
    Handle, HeadlessHost, KindDescriptor, OverlayHost, OverlayKind, RegistryContext, RootMount,
};

pub mod prelude {
    pub use overdeck_core as core;
    pub use overdeck_runtime as runtime;
    #[cfg(feature = "widgets")]
    pub use overdeck_widgets as widgets;

    pub use overdeck_core::{ItemProps, KindState, OverlayError, OverlayId, Visibility};
    pub use overdeck_runtime::{
        DismissTimers, Handle, HeadlessHost, KindDescriptor, OverlayHost, OverlayKind,
        RegistryContext, RootMount, Store, Subscription,
    };
    #[cfg(feature = "widgets")]
    pub use overdeck_widgets::{
        Canvas, Layer, ModalConfig, ModalContent, Modals, ToastConfig, ToastLevel, Toasts,
    };
}

#![forbid(unsafe_code)]

//! Concrete overlay kinds for overdeck.
//!
//! Both kinds render into [`Layer`], so they can share one
//! `RegistryContext<Layer>` and one root mount. [`Canvas`] rasterizes the
//! presented layers into text.
//!
//! ```
//! use overdeck_runtime::{HeadlessHost, RegistryContext, RootMount};
//! use overdeck_widgets::{Canvas, ModalConfig, ModalContent, Modals, ToastConfig, Toasts};
//!
//! let mut ctx = RegistryContext::new();
//! let toasts = Toasts::register(&mut ctx, ToastConfig::default()).unwrap();
//! let modals = Modals::register(&mut ctx, ModalConfig::default()).unwrap();
//!
//! let mut host = HeadlessHost::new("content");
//! let mount = RootMount::mount(&ctx, &mut host, "content").unwrap();
//!
//! toasts.open(|_| "saved".to_string());
//! let confirm = modals.open(|_| ModalContent::new("Quit?", "Unsaved work will be lost."));
//!
//! let mut canvas = Canvas::new(60, 16);
//! canvas.draw_layers(mount.layers().iter().map(|layer| &layer.view));
//! assert!(canvas.to_text().contains("Quit? [x]"));
//!
//! confirm.close();
//! mount.unmount(&mut host);
//! ```

pub mod layer;
pub mod modal;
pub mod toast;

pub use layer::{Block, Canvas, Layer, Placement, display_width, truncate_to_width};
pub use modal::{MODAL_KIND, ModalConfig, ModalContent, ModalKind, Modals};
pub use toast::{LEVEL_PROP, TOAST_KIND, ToastConfig, ToastKind, ToastLevel, Toasts};

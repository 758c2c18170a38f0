#![forbid(unsafe_code)]

//! Toast notifications stacked in the bottom-right corner.
//!
//! The newest visible toast sits closest to the corner; older ones stack
//! upward. Hidden toasts keep their slot in the state but take no space.

use overdeck_core::{ItemProps, KindState, Result};
use overdeck_runtime::{
    DismissTimers, Handle, KindDescriptor, OverlayKind, RegistryContext, TimerToken,
};
use web_time::{Duration, Instant};

use crate::layer::{Block, Layer, Placement, truncate_to_width};

/// Registry name of the toast kind.
pub const TOAST_KIND: &str = "toast";

/// Item prop naming the toast level.
pub const LEVEL_PROP: &str = "level";

/// Severity shown as a leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Info => "i",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }
}

/// Layout knobs for the toast stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastConfig {
    /// Newest visible toasts to render; older ones wait off-screen.
    pub max_visible: usize,
    /// Blank rows between stacked toasts.
    pub gap: u16,
    /// Maximum text width inside a toast.
    pub width: u16,
    /// Distance from the right and bottom edges.
    pub margin: u16,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            max_visible: 5,
            gap: 0,
            width: 32,
            margin: 1,
        }
    }
}

impl ToastConfig {
    #[must_use]
    pub fn max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible;
        self
    }

    #[must_use]
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: u16) -> Self {
        self.margin = margin;
        self
    }
}

/// Descriptor registering the toast kind.
#[derive(Debug, Clone, Default)]
pub struct ToastKind {
    config: ToastConfig,
}

impl ToastKind {
    #[must_use]
    pub fn new(config: ToastConfig) -> Self {
        Self { config }
    }
}

impl KindDescriptor<Layer> for ToastKind {
    type Content = String;

    fn name(&self) -> &str {
        TOAST_KIND
    }

    fn render(&self, state: &KindState<String>) -> Layer {
        let width = usize::from(self.config.width);
        let mut bottom = self.config.margin;
        let mut blocks = Vec::new();

        for item in state
            .iter()
            .rev()
            .filter(|item| item.is_shown())
            .take(self.config.max_visible)
        {
            let level = item
                .props
                .get(LEVEL_PROP)
                .and_then(|level| ToastLevel::parse(level));
            let lines: Vec<String> = item
                .content
                .lines()
                .enumerate()
                .map(|(row, line)| match level {
                    Some(level) if row == 0 => {
                        truncate_to_width(&format!("{} {line}", level.marker()), width)
                    }
                    _ => truncate_to_width(line, width),
                })
                .collect();
            let block = Block {
                id: item.id,
                placement: Placement::BottomRight {
                    right: self.config.margin,
                    bottom,
                },
                lines,
            };
            bottom = bottom
                .saturating_add(block.outer_size().1)
                .saturating_add(self.config.gap);
            blocks.push(block);
        }

        // Oldest first so the newest draws last.
        blocks.reverse();
        Layer {
            backdrop: false,
            blocks,
        }
    }
}

/// Instance API for toasts.
#[derive(Debug, Clone)]
pub struct Toasts {
    kind: OverlayKind<String>,
}

impl Toasts {
    /// Register the toast kind.
    ///
    /// # Errors
    ///
    /// `DuplicateKind` if a toast kind is already registered.
    pub fn register(ctx: &mut RegistryContext<Layer>, config: ToastConfig) -> Result<Self> {
        let kind = ctx.register(ToastKind::new(config))?;
        Ok(Self { kind })
    }

    /// Bind to an already registered toast kind.
    ///
    /// # Errors
    ///
    /// `UnknownKind` if no toast kind was registered.
    pub fn from_registry(ctx: &RegistryContext<Layer>) -> Result<Self> {
        let kind = ctx.get::<String>(TOAST_KIND)?;
        Ok(Self { kind })
    }

    #[must_use]
    pub fn kind(&self) -> &OverlayKind<String> {
        &self.kind
    }

    pub fn open(&self, content: impl FnOnce(&Handle<String>) -> String) -> Handle<String> {
        self.kind.open(content)
    }

    pub fn open_with_level(
        &self,
        level: ToastLevel,
        content: impl FnOnce(&Handle<String>) -> String,
    ) -> Handle<String> {
        let mut props = ItemProps::new();
        props.insert(LEVEL_PROP.to_string(), level.as_str().to_string());
        self.kind.open_with_props(props, content)
    }

    /// Open a toast that closes itself once `ttl` has elapsed on `timers`.
    pub fn open_for(
        &self,
        ttl: Duration,
        timers: &mut DismissTimers,
        now: Instant,
        content: impl FnOnce(&Handle<String>) -> String,
    ) -> (Handle<String>, TimerToken) {
        let handle = self.kind.open(content);
        let token = timers.schedule(&handle, ttl, now);
        tracing::debug!(
            message = "toast.auto_dismiss",
            id = handle.id().get(),
            ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
        );
        (handle, token)
    }
}

#![forbid(unsafe_code)]

//! Modal dialogs over a shared backdrop.
//!
//! Modals cascade downward: the item at position `i` in the kind's state is
//! centred `step * (i + 1)` percent from the top. Hidden modals keep their
//! slot so showing them again does not shift their siblings. The backdrop is
//! drawn only while at least one modal is visible.

use overdeck_core::{KindState, Result};
use overdeck_runtime::{Handle, KindDescriptor, OverlayKind, RegistryContext};

use crate::layer::{Block, Layer, Placement, display_width, truncate_to_width};

/// Registry name of the modal kind.
pub const MODAL_KIND: &str = "modal";

const CLOSE_AFFORDANCE: &str = "[x]";

/// Payload of one modal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalContent {
    pub title: String,
    pub body: String,
}

impl ModalContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Layout knobs for the modal cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig {
    /// Vertical distance between consecutive modals, in percent.
    pub step_pct: u16,
    /// Horizontal centre of every modal, in percent.
    pub left_pct: u16,
    /// Maximum text width inside a modal.
    pub width: u16,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            step_pct: 20,
            left_pct: 50,
            width: 40,
        }
    }
}

impl ModalConfig {
    #[must_use]
    pub fn step_pct(mut self, step_pct: u16) -> Self {
        self.step_pct = step_pct;
        self
    }

    #[must_use]
    pub fn left_pct(mut self, left_pct: u16) -> Self {
        self.left_pct = left_pct;
        self
    }

    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Vertical centre of the modal at `index`.
    #[must_use]
    pub fn top_for(&self, index: usize) -> u16 {
        let slot = u16::try_from(index.saturating_add(1)).unwrap_or(u16::MAX);
        self.step_pct.saturating_mul(slot)
    }
}

/// Descriptor registering the modal kind.
#[derive(Debug, Clone, Default)]
pub struct ModalKind {
    config: ModalConfig,
}

impl ModalKind {
    #[must_use]
    pub fn new(config: ModalConfig) -> Self {
        Self { config }
    }

    fn lines(&self, content: &ModalContent) -> Vec<String> {
        let width = usize::from(self.config.width);
        let title_room = width.saturating_sub(CLOSE_AFFORDANCE.len() + 1);
        let title = format!(
            "{} {CLOSE_AFFORDANCE}",
            truncate_to_width(&content.title, title_room)
        );
        let body: Vec<String> = content
            .body
            .lines()
            .map(|line| truncate_to_width(line, width))
            .collect();

        let widest = body
            .iter()
            .chain(std::iter::once(&title))
            .map(|line| display_width(line))
            .max()
            .unwrap_or(0);
        let rule = "─".repeat(widest);

        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(title);
        lines.push(rule);
        lines.extend(body);
        lines
    }
}

impl KindDescriptor<Layer> for ModalKind {
    type Content = ModalContent;

    fn name(&self) -> &str {
        MODAL_KIND
    }

    fn render(&self, state: &KindState<ModalContent>) -> Layer {
        let blocks: Vec<Block> = state
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_shown())
            .map(|(index, item)| Block {
                id: item.id,
                placement: Placement::Percent {
                    top: self.config.top_for(index),
                    left: self.config.left_pct,
                },
                lines: self.lines(&item.content),
            })
            .collect();

        if blocks.is_empty() {
            return Layer::empty();
        }
        Layer {
            backdrop: true,
            blocks,
        }
    }
}

/// Instance API for modals.
#[derive(Debug, Clone)]
pub struct Modals {
    kind: OverlayKind<ModalContent>,
}

impl Modals {
    /// Register the modal kind.
    ///
    /// # Errors
    ///
    /// `DuplicateKind` if a modal kind is already registered.
    pub fn register(ctx: &mut RegistryContext<Layer>, config: ModalConfig) -> Result<Self> {
        let kind = ctx.register(ModalKind::new(config))?;
        Ok(Self { kind })
    }

    /// Bind to an already registered modal kind.
    ///
    /// # Errors
    ///
    /// `UnknownKind` if no modal kind was registered.
    pub fn from_registry(ctx: &RegistryContext<Layer>) -> Result<Self> {
        let kind = ctx.get::<ModalContent>(MODAL_KIND)?;
        Ok(Self { kind })
    }

    #[must_use]
    pub fn kind(&self) -> &OverlayKind<ModalContent> {
        &self.kind
    }

    pub fn open(
        &self,
        content: impl FnOnce(&Handle<ModalContent>) -> ModalContent,
    ) -> Handle<ModalContent> {
        self.kind.open(content)
    }

    /// Close the most recently opened modal. Returns whether one was open.
    pub fn close_last(&self) -> bool {
        let last = self.kind.store().with(|state| state.last().map(|item| item.id));
        match last {
            Some(id) => {
                self.kind.close(id);
                true
            }
            None => false,
        }
    }
}

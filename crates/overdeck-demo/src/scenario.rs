//! The scripted scenarios behind each subcommand.
//!
//! Every scenario builds its own registry, mounts it on a [`HeadlessHost`]
//! whose document holds a single `content` anchor, drives handles, and writes
//! one frame per step that changed the overlays.

use std::io::Write;

use overdeck_runtime::{DismissTimers, HeadlessHost, RegistryContext, RootMount};
use overdeck_widgets::{
    Canvas, Layer, ModalConfig, ModalContent, Modals, ToastConfig, ToastLevel, Toasts,
};
use serde::Serialize;
use web_time::{Duration, Instant};

use crate::cli::{Cli, ModalArgs, OutputFormat, ToastArgs};
use crate::error::Result;

/// The only element the demo document contains.
pub const DOCUMENT_ANCHOR: &str = "content";

const LEVELS: [ToastLevel; 4] = [
    ToastLevel::Info,
    ToastLevel::Success,
    ToastLevel::Warning,
    ToastLevel::Error,
];

#[derive(Debug, Serialize)]
struct KindSummary<'a> {
    kind: &'a str,
    backdrop: bool,
    blocks: usize,
}

#[derive(Debug, Serialize)]
struct FrameReport<'a> {
    frame: usize,
    step: &'a str,
    kinds: Vec<KindSummary<'a>>,
    rows: Vec<String>,
}

#[derive(Debug, Serialize)]
struct KindList<'a> {
    kinds: Vec<&'a str>,
}

/// A mounted registry plus the sink frames are written to.
struct Session<'w, W: Write> {
    host: HeadlessHost<Layer>,
    mount: Option<RootMount<Layer>>,
    width: u16,
    height: u16,
    format: OutputFormat,
    frames: usize,
    out: &'w mut W,
}

impl<'w, W: Write> Session<'w, W> {
    fn start(ctx: &RegistryContext<Layer>, cli: &Cli, out: &'w mut W) -> Result<Self> {
        let mut host = HeadlessHost::new(DOCUMENT_ANCHOR);
        let mount = RootMount::mount(ctx, &mut host, &cli.anchor)?;
        Ok(Self {
            host,
            mount: Some(mount),
            width: cli.width,
            height: cli.height,
            format: cli.format,
            frames: 0,
            out,
        })
    }

    /// Present the mount and write a frame if anything changed.
    fn step(&mut self, step: &str) -> Result<()> {
        let Some(mount) = &self.mount else {
            return Ok(());
        };
        if !mount.present(&mut self.host) {
            tracing::debug!(message = "demo.unchanged", step);
            return Ok(());
        }
        let Some(layers) = self.host.last_frame() else {
            return Ok(());
        };

        let mut canvas = Canvas::new(self.width, self.height);
        canvas.draw_layers(layers.iter().map(|layer| &layer.view));
        self.frames += 1;

        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "== {} · {step} ==", self.frames)?;
                writeln!(self.out, "{}", canvas.to_text())?;
            }
            OutputFormat::Json => {
                let report = FrameReport {
                    frame: self.frames,
                    step,
                    kinds: layers
                        .iter()
                        .map(|layer| KindSummary {
                            kind: &layer.kind,
                            backdrop: layer.view.backdrop,
                            blocks: layer.view.blocks.len(),
                        })
                        .collect(),
                    rows: canvas.rows(),
                };
                serde_json::to_writer(&mut *self.out, &report)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(mount) = self.mount.take() {
            mount.unmount(&mut self.host);
        }
        self.out.flush()?;
        Ok(())
    }
}

pub fn run_toast<W: Write>(cli: &Cli, args: &ToastArgs, out: &mut W) -> Result<()> {
    let mut ctx = RegistryContext::new();
    let toasts = Toasts::register(
        &mut ctx,
        ToastConfig::default().max_visible(args.max_visible),
    )?;
    let mut session = Session::start(&ctx, cli, out)?;
    session.step("mounted")?;

    let mut timers = DismissTimers::new();
    let t0 = Instant::now();
    let mut handles = Vec::new();
    for (i, level) in LEVELS.iter().cycle().take(args.count).enumerate() {
        let handle = toasts.open_with_level(*level, |h| format!("{} #{}", level.as_str(), h.id()));
        if let Some(ttl) = args.ttl_ms {
            let slot = u32::try_from(i + 1).unwrap_or(u32::MAX);
            timers.schedule(&handle, Duration::from_millis(ttl).saturating_mul(slot), t0);
        }
        session.step(&format!("open toast {}", i + 1))?;
        handles.push(handle);
    }

    if args.ttl_ms.is_some() {
        while let Some(deadline) = timers.next_deadline() {
            timers.fire_due(deadline);
            session.step(&format!("+{}ms", (deadline - t0).as_millis()))?;
        }
    } else {
        if let Some(first) = handles.first() {
            first.update("updated in place".to_string());
            session.step("update toast 1")?;
        }
        for (i, handle) in handles.iter().enumerate() {
            handle.close();
            session.step(&format!("close toast {}", i + 1))?;
        }
    }
    session.finish()
}

pub fn run_modal<W: Write>(cli: &Cli, args: &ModalArgs, out: &mut W) -> Result<()> {
    let mut ctx = RegistryContext::new();
    let modals = Modals::register(&mut ctx, ModalConfig::default().step_pct(args.step))?;
    let mut session = Session::start(&ctx, cli, out)?;
    session.step("mounted")?;

    let mut handles = Vec::new();
    for i in 0..args.count {
        let handle = modals.open(|h| {
            ModalContent::new(format!("Dialog {}", i + 1), format!("overlay id {}", h.id()))
        });
        session.step(&format!("open dialog {}", i + 1))?;
        handles.push(handle);
    }

    if let Some(first) = handles.first() {
        first.hide();
        session.step("hide dialog 1")?;
        first.show();
        session.step("show dialog 1")?;
    }
    let mut remaining = handles.len();
    while modals.close_last() {
        session.step(&format!("close dialog {remaining}"))?;
        remaining = remaining.saturating_sub(1);
    }
    session.finish()
}

pub fn run_mixed<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let mut ctx = RegistryContext::new();
    let toasts = Toasts::register(&mut ctx, ToastConfig::default())?;
    let modals = Modals::register(&mut ctx, ModalConfig::default())?;
    let mut session = Session::start(&ctx, cli, out)?;

    toasts.open_with_level(ToastLevel::Success, |_| "draft saved".to_string());
    session.step("toast")?;

    let confirm = modals.open(|_| ModalContent::new("Publish?", "Readers will see it at once."));
    session.step("modal over toast")?;

    let pending = toasts.open_with_level(ToastLevel::Info, |_| "publishing…".to_string());
    session.step("toast under backdrop")?;

    confirm.close();
    session.step("modal closed")?;

    pending.update("published".to_string());
    session.step("toast updated")?;
    session.finish()
}

pub fn list_kinds<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let mut ctx = RegistryContext::<Layer>::new();
    Toasts::register(&mut ctx, ToastConfig::default())?;
    Modals::register(&mut ctx, ModalConfig::default())?;

    match cli.format {
        OutputFormat::Text => {
            for kind in ctx.all_kinds() {
                writeln!(out, "{kind}")?;
            }
        }
        OutputFormat::Json => {
            let list = KindList {
                kinds: ctx.all_kinds().collect(),
            };
            serde_json::to_writer(&mut *out, &list)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

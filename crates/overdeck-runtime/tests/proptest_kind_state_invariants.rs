//! Property-based invariant tests for kind state driven through handles.
//!
//! These tests verify:
//!
//! 1. Length equals opens minus completed closes.
//! 2. Still-open items keep their open order.
//! 3. Closing twice yields the same state as closing once.
//! 4. Actions on closed handles leave the state unchanged.
//! 5. hide/show never touch content or order.
//! 6. Released listeners are never notified; live ones always are.

use std::cell::Cell;
use std::rc::Rc;

use overdeck_core::{KindState, Visibility};
use overdeck_runtime::{Handle, OverlayKind, RegistryContext, Store};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Open(u16),
    Close(usize),
    Update(usize, u16),
    Hide(usize),
    Show(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u16>().prop_map(Op::Open),
        2 => any::<usize>().prop_map(Op::Close),
        1 => (any::<usize>(), any::<u16>()).prop_map(|(i, c)| Op::Update(i, c)),
        1 => any::<usize>().prop_map(Op::Hide),
        1 => any::<usize>().prop_map(Op::Show),
    ]
}

/// Expected state of one handle.
struct Model {
    content: u16,
    visibility: Visibility,
    open: bool,
}

fn toast_kind() -> OverlayKind<u16> {
    let mut ctx = RegistryContext::<usize>::new();
    ctx.register_fn("toast", Vec::new(), |state: &KindState<u16>| state.len())
        .expect("register toast")
}

fn pick(handles: &[Handle<u16>], index: usize) -> Option<usize> {
    (!handles.is_empty()).then(|| index % handles.len())
}

// ═════════════════════════════════════════════════════════════════════════
// 1–5. Handle actions against a reference model
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn state_matches_model(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        let kind = toast_kind();
        let mut handles: Vec<Handle<u16>> = Vec::new();
        let mut model: Vec<Model> = Vec::new();
        let mut opens = 0usize;
        let mut closes = 0usize;

        for op in ops {
            match op {
                Op::Open(content) => {
                    handles.push(kind.open(|_| content));
                    model.push(Model { content, visibility: Visibility::Shown, open: true });
                    opens += 1;
                }
                Op::Close(i) => {
                    if let Some(i) = pick(&handles, i) {
                        handles[i].close();
                        if model[i].open {
                            model[i].open = false;
                            closes += 1;
                        }
                    }
                }
                Op::Update(i, content) => {
                    if let Some(i) = pick(&handles, i) {
                        handles[i].update(content);
                        if model[i].open {
                            model[i].content = content;
                        }
                    }
                }
                Op::Hide(i) => {
                    if let Some(i) = pick(&handles, i) {
                        handles[i].hide();
                        if model[i].open {
                            model[i].visibility = Visibility::Hidden;
                        }
                    }
                }
                Op::Show(i) => {
                    if let Some(i) = pick(&handles, i) {
                        handles[i].show();
                        if model[i].open {
                            model[i].visibility = Visibility::Shown;
                        }
                    }
                }
            }
        }

        let state = kind.items();
        prop_assert_eq!(state.len(), opens - closes);

        let expected: Vec<_> = handles
            .iter()
            .zip(&model)
            .filter(|(_, m)| m.open)
            .map(|(h, m)| (h.id(), m.content, m.visibility))
            .collect();
        let actual: Vec<_> = state
            .iter()
            .map(|item| (item.id, item.content, item.visibility))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn double_close_equals_single_close(
        contents in proptest::collection::vec(any::<u16>(), 1..16),
        victim in any::<usize>(),
    ) {
        let once = toast_kind();
        let twice = toast_kind();
        let a: Vec<_> = contents.iter().map(|c| once.open(|_| *c)).collect();
        let b: Vec<_> = contents.iter().map(|c| twice.open(|_| *c)).collect();
        let i = victim % contents.len();

        a[i].close();
        b[i].close();
        b[i].close();

        let strip = |state: KindState<u16>| -> Vec<u16> {
            state.into_iter().map(|item| item.content).collect()
        };
        prop_assert_eq!(strip(once.items()), strip(twice.items()));
    }

    #[test]
    fn closed_handle_actions_are_noops(
        contents in proptest::collection::vec(any::<u16>(), 1..16),
        victim in any::<usize>(),
        replacement in any::<u16>(),
    ) {
        let kind = toast_kind();
        let handles: Vec<_> = contents.iter().map(|c| kind.open(|_| *c)).collect();
        let closed = &handles[victim % handles.len()];
        closed.close();

        let before = kind.items();
        let version = kind.store().version();
        closed.update(replacement);
        closed.hide();
        closed.show();
        closed.close();
        prop_assert_eq!(kind.items(), before);
        prop_assert_eq!(kind.store().version(), version);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Subscription release
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn released_listeners_never_fire(
        listeners in 1usize..8,
        released in proptest::collection::vec(any::<bool>(), 8),
        sets in 1usize..8,
    ) {
        let store = Store::new(0u32);
        let counters: Vec<Rc<Cell<usize>>> =
            (0..listeners).map(|_| Rc::new(Cell::new(0))).collect();
        let subs: Vec<_> = counters
            .iter()
            .map(|counter| {
                let counter = Rc::clone(counter);
                store.subscribe(move |_| counter.set(counter.get() + 1))
            })
            .collect();

        for (sub, release) in subs.iter().zip(&released) {
            if *release {
                sub.unsubscribe();
            }
        }
        for _ in 0..sets {
            store.set(|v| v + 1);
        }

        for (i, counter) in counters.iter().enumerate() {
            let expected = if released[i] { 0 } else { sets };
            prop_assert_eq!(counter.get(), expected);
        }
    }
}

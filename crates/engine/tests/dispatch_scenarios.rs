//! End-to-end dispatch scenarios for overlapping Escape handlers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::bail;
use chordchain_engine::{ChainAction, ChainDispatcher, Chord, KeyPress, RegionProvider};

fn escape() -> Chord {
    Chord::plain("Escape")
}

fn stopper(id: &str, priority: i32, ran: &Rc<RefCell<Vec<String>>>) -> Rc<RegionProvider> {
    let ran = Rc::clone(ran);
    let owner = id.to_string();
    Rc::new(
        RegionProvider::builder(id)
            .priority(priority)
            .on(escape(), "close and stop", move |ctx| {
                ran.borrow_mut().push(owner.clone());
                ctx.break_chain();
                Ok(())
            })
            .build(),
    )
}

#[tokio::test]
async fn highest_priority_stop_wins() {
    let ran = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = ChainDispatcher::new();
    dispatcher.register(stopper("A", 1000, &ran));
    dispatcher.register(stopper("B", 500, &ran));

    let result = dispatcher.dispatch_key(&KeyPress::plain("Escape")).await;
    assert_eq!(result.handlers_executed, 1);
    assert_eq!(*ran.borrow(), vec!["A".to_string()]);
    assert_eq!(result.final_action, ChainAction::Stop);
    assert_eq!(serde_json::to_value(&result).unwrap()["finalAction"], "stop");
}

#[tokio::test]
async fn enabled_flags_shape_the_chain() {
    let ran = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = ChainDispatcher::new();

    let a = {
        let ran = Rc::clone(&ran);
        Rc::new(
            RegionProvider::builder("A")
                .priority(800)
                .on(escape(), "pass along", move |ctx| {
                    ran.borrow_mut().push("A".to_string());
                    ctx.next();
                    Ok(())
                })
                .build(),
        )
    };
    let b = stopper("B", 600, &ran);
    dispatcher.register(a.clone());
    dispatcher.register(b.clone());

    let set_flags = |flag_a: bool, flag_b: bool| {
        a.set_enabled(flag_a);
        b.set_enabled(flag_b);
    };

    set_flags(true, true);
    let both = dispatcher.dispatch_key(&KeyPress::plain("Escape")).await;
    assert_eq!(both.handlers_executed, 2);
    assert_eq!(*ran.borrow(), vec!["A".to_string(), "B".to_string()]);

    ran.borrow_mut().clear();
    set_flags(false, true);
    let only_b = dispatcher.dispatch_key(&KeyPress::plain("Escape")).await;
    assert_eq!(only_b.handlers_executed, 1);
    assert_eq!(*ran.borrow(), vec!["B".to_string()]);

    ran.borrow_mut().clear();
    set_flags(false, false);
    let none = dispatcher.dispatch_key(&KeyPress::plain("Escape")).await;
    assert!(!none.executed);
    assert_eq!(none.handlers_executed, 0);
    assert_eq!(none.total_handlers, 0);
    assert!(ran.borrow().is_empty());
}

#[tokio::test]
async fn broken_region_does_not_swallow_escape() {
    let closed = Rc::new(Cell::new(false));
    let dispatcher = ChainDispatcher::new();
    dispatcher.register(Rc::new(
        RegionProvider::builder("C")
            .priority(800)
            .on(escape(), "throws", |_| bail!("menu element detached"))
            .build(),
    ));
    dispatcher.register(Rc::new(
        RegionProvider::builder("D")
            .priority(600)
            .on(escape(), "close drawer", {
                let closed = Rc::clone(&closed);
                move |ctx| {
                    closed.set(true);
                    ctx.break_chain();
                    Ok(())
                }
            })
            .build(),
    ));

    let result = dispatcher.dispatch_key(&KeyPress::plain("Escape")).await;
    assert!(closed.get());
    assert!(result.executed);
    assert_eq!(result.handlers_executed, 2);
    assert_eq!(result.log.len(), 2);
    assert_eq!(result.log[0].provider_id, "C");
    assert_eq!(result.log[0].error.as_deref(), Some("menu element detached"));
    assert_eq!(result.log[1].provider_id, "D");
    assert!(result.log[1].error.is_none());
    assert_eq!(result.final_action, ChainAction::Stop);
}

#[test]
fn second_registration_under_same_id_replaces_the_first() {
    let first_unregistered = Rc::new(Cell::new(0));
    let dispatcher = ChainDispatcher::new();
    dispatcher.register(Rc::new(
        RegionProvider::builder("X")
            .on(escape(), "first", |_| Ok(()))
            .on_unregistered({
                let count = Rc::clone(&first_unregistered);
                move || count.set(count.get() + 1)
            })
            .build(),
    ));
    dispatcher.register(Rc::new(RegionProvider::builder("X").on(escape(), "second", |_| Ok(())).build()));

    assert_eq!(dispatcher.provider_ids(), vec!["X".to_string()]);
    let info = dispatcher.debug_info(&escape());
    assert_eq!(info.participants[0].description.as_deref(), Some("second"));
    assert_eq!(first_unregistered.get(), 0);
}

#[tokio::test]
async fn set_provider_enabled_round_trip() {
    let dispatcher = ChainDispatcher::new();
    let ctrl_k: Chord = "ctrl+k".parse().unwrap();
    dispatcher.register(Rc::new(
        RegionProvider::builder("X")
            .priority(10)
            .on(ctrl_k.clone(), "open search", |_| Ok(()))
            .on(escape(), "close search", |_| Ok(()))
            .build(),
    ));
    dispatcher.register(Rc::new(RegionProvider::builder("Y").on(ctrl_k.clone(), "other", |_| Ok(())).build()));

    let event = KeyPress::plain("k").with_ctrl();
    assert_eq!(dispatcher.dispatch(&ctrl_k, &event).await.total_handlers, 2);

    dispatcher.set_provider_enabled("X", false);
    let disabled = dispatcher.dispatch(&ctrl_k, &event).await;
    assert_eq!(disabled.total_handlers, 1);
    assert_eq!(disabled.visited_providers(), vec!["Y"]);
    assert!(!dispatcher.dispatch(&escape(), &KeyPress::plain("Escape")).await.executed);

    dispatcher.set_provider_enabled("X", true);
    assert_eq!(dispatcher.dispatch(&ctrl_k, &event).await.total_handlers, 2);
}

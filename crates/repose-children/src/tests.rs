#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use crate::*;
    use insta::assert_debug_snapshot;
    use repose_core::{Scope, compose, keyed};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Elem = u32;
    type Reg = ChildRegistry<Elem, String>;
    type Record = ChildRecord<Elem, String>;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Add(Option<String>),
        Update(usize, Option<Elem>, Option<String>),
        Remove(usize),
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn recorder() -> (Rc<RefCell<Vec<Event>>>, ChildrenHooks<Elem, String>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let hooks = ChildrenHooks::new()
            .on_add({
                let events = events.clone();
                move |c: &Record| events.borrow_mut().push(Event::Add(c.data.clone()))
            })
            .on_update({
                let events = events.clone();
                move |i, c: &Record| {
                    events
                        .borrow_mut()
                        .push(Event::Update(i, c.node_ref, c.data.clone()))
                }
            })
            .on_remove({
                let events = events.clone();
                move |i| events.borrow_mut().push(Event::Remove(i))
            });
        (events, hooks)
    }

    fn record(node_ref: Option<Elem>, data: Option<&str>) -> Record {
        ChildRecord {
            node_ref,
            data: data.map(str::to_string),
        }
    }

    fn take(events: &Rc<RefCell<Vec<Event>>>) -> Vec<Event> {
        std::mem::take(&mut *events.borrow_mut())
    }

    fn upd(i: usize, node_ref: Elem, data: &str) -> Event {
        Event::Update(i, Some(node_ref), Some(data.to_string()))
    }

    fn provide(
        root: &Scope,
        tracking: ChildTracking<Elem, String>,
        content: impl FnOnce() -> Result<(), ChildrenError>,
    ) -> Result<(), ChildrenError> {
        compose(root, || ChildrenProvider(tracking, content))?
    }

    fn Item(id: Elem, key: &str, data: Option<&str>) -> Result<(), ChildrenError> {
        keyed(key, || {
            use_child_element(id, data.map(str::to_string), ChildOptions::new())
        })
    }

    fn Items(items: &[(Elem, &str)]) -> Result<(), ChildrenError> {
        for &(id, label) in items {
            Item(id, label, Some(label))?;
        }
        Ok(())
    }

    fn ResyncedItems(items: &[(Elem, &str)]) -> Result<(), ChildrenError> {
        let order: Vec<Elem> = items.iter().map(|(id, _)| *id).collect();
        use_resync::<Elem, String, _>(&order, ResyncOptions::new())?;
        Items(items)
    }

    #[test]
    fn test_mount_registers_in_render_order_and_unmount_clears() -> anyhow::Result<()> {
        init_logger();
        let registry = Reg::new();
        let root = Scope::new();

        provide(&root, ChildTracking::new().registry(registry.clone()), || {
            Item(1, "Hi", None)?;
            Item(2, "Ho", None)
        })?;
        assert_eq!(
            registry.snapshot(),
            vec![record(Some(1), None), record(Some(2), None)]
        );

        root.dispose();
        assert!(registry.snapshot().is_empty());
        Ok(())
    }

    #[test]
    fn test_on_add_follows_declared_order() -> anyhow::Result<()> {
        let (events, hooks) = recorder();
        let root = Scope::new();
        let items = [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")];

        provide(&root, ChildTracking::new().hooks(hooks), || Items(&items))?;

        let added: Vec<_> = take(&events)
            .into_iter()
            .filter_map(|e| match e {
                Event::Add(data) => data,
                _ => None,
            })
            .collect();
        assert_eq!(added, vec!["a", "b", "c", "d", "e"]);
        Ok(())
    }

    #[test]
    fn test_children_behind_wrappers_still_register() -> anyhow::Result<()> {
        let registry = Reg::new();
        let root = Scope::new();

        provide(&root, ChildTracking::new().registry(registry.clone()), || {
            keyed("toolbar", || {
                keyed("group", || Item(1, "bold", Some("bold")))?;
                Item(2, "italic", Some("italic"))
            })?;
            keyed("footer", || keyed("inner", || Item(3, "status", Some("status"))))
        })?;

        let labels: Vec<_> = registry.snapshot().into_iter().map(|c| c.data).collect();
        assert_debug_snapshot!(labels, @r#"
        [
            Some(
                "bold",
            ),
            Some(
                "italic",
            ),
            Some(
                "status",
            ),
        ]
        "#);
        Ok(())
    }

    #[test]
    fn test_unmount_removes_own_record_and_shifts_later_ones() -> anyhow::Result<()> {
        let (events, hooks) = recorder();
        let root = Scope::new();
        let render = |items: &[(Elem, &str, &str)]| {
            provide(&root, ChildTracking::new().hooks(hooks.clone()), || {
                for &(id, key, data) in items {
                    Item(id, key, Some(data))?;
                }
                Ok(())
            })
        };

        render(&[(1, "a", "a"), (2, "b", "b"), (3, "c", "c")])?;
        assert_eq!(
            take(&events),
            vec![
                Event::Add(Some("a".into())),
                upd(0, 1, "a"),
                Event::Add(Some("b".into())),
                upd(1, 2, "b"),
                Event::Add(Some("c".into())),
                upd(2, 3, "c"),
            ]
        );

        render(&[(1, "a", "a"), (3, "c", "c")])?;
        // Reference detached first, then the record goes.
        assert_eq!(
            take(&events),
            vec![Event::Update(1, None, Some("b".into())), Event::Remove(1)]
        );

        render(&[(1, "a", "a"), (3, "c", "c!")])?;
        assert_eq!(take(&events), vec![upd(1, 3, "c!")]);
        Ok(())
    }

    #[test]
    fn test_data_changes_announced_once_and_not_on_first_evaluation() -> anyhow::Result<()> {
        let (events, hooks) = recorder();
        let root = Scope::new();
        let render = |data: &str| {
            provide(&root, ChildTracking::new().hooks(hooks.clone()), || {
                keyed("only", || {
                    use_child::<Elem, String>(Some(data.to_string()), ChildOptions::new())
                        .map(|_| ())
                })
            })
        };

        render("first")?;
        assert_eq!(take(&events), vec![Event::Add(Some("first".into()))]);

        render("first")?;
        assert!(take(&events).is_empty());

        render("second")?;
        assert_eq!(
            take(&events),
            vec![Event::Update(0, None, Some("second".into()))]
        );
        Ok(())
    }

    #[test]
    fn test_ref_attached_then_detached_before_removal() -> anyhow::Result<()> {
        let registry = Reg::new();
        let seen_on_remove = Rc::new(RefCell::new(Vec::new()));
        registry.set_hooks(ChildrenHooks::new().on_remove({
            let registry = registry.clone();
            let seen = seen_on_remove.clone();
            // The removed record is already gone; everything left is visible.
            move |i| seen.borrow_mut().push((i, registry.snapshot()))
        }));
        let root = Scope::new();

        provide(&root, ChildTracking::new().registry(registry.clone()), || {
            Item(7, "x", None)
        })?;
        assert_eq!(registry.snapshot(), vec![record(Some(7), None)]);

        let refs_before_remove = Rc::new(RefCell::new(Vec::new()));
        registry.set_on_update(Some(Rc::new({
            let refs = refs_before_remove.clone();
            move |_: usize, c: &Record| refs.borrow_mut().push(c.node_ref)
        })));

        provide(&root, ChildTracking::new().registry(registry.clone()), || Ok(()))?;
        assert_eq!(*refs_before_remove.borrow(), vec![None]);
        assert_eq!(*seen_on_remove.borrow(), vec![(0, vec![])]);
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_reorder_without_resync_keeps_registration_order() -> anyhow::Result<()> {
        let registry = Reg::new();
        let root = Scope::new();
        let render = |items: &[(Elem, &str)]| {
            provide(&root, ChildTracking::new().registry(registry.clone()), || Items(items))
        };

        render(&[(1, "Hi"), (2, "Ho")])?;
        render(&[(2, "Ho"), (1, "Hi")])?;

        let refs: Vec<_> = registry.snapshot().iter().map(|c| c.node_ref).collect();
        assert_eq!(refs, vec![Some(1), Some(2)]);
        Ok(())
    }

    #[test]
    fn test_resync_after_keyed_reorder() -> anyhow::Result<()> {
        init_logger();
        let (events, hooks) = recorder();
        let registry = Reg::with_hooks(hooks);
        let root = Scope::new();
        let render = |items: &[(Elem, &str)]| {
            provide(&root, ChildTracking::new().registry(registry.clone()), || {
                ResyncedItems(items)
            })
        };

        render(&[(1, "Hi"), (2, "Ho")])?;
        let keys = registry.keys();
        take(&events);

        render(&[(2, "Ho"), (1, "Hi")])?;
        assert_eq!(
            registry.snapshot(),
            vec![record(Some(2), Some("Ho")), record(Some(1), Some("Hi"))]
        );
        // Same records, not re-registered.
        assert_eq!(registry.keys(), vec![keys[1], keys[0]]);
        assert_eq!(take(&events), vec![upd(0, 2, "Ho"), upd(1, 1, "Hi")]);

        // Same order again: nothing to resync.
        render(&[(2, "Ho"), (1, "Hi")])?;
        assert!(take(&events).is_empty());
        assert_eq!(registry.len(), 2);
        Ok(())
    }

    #[test]
    fn test_resync_places_late_mounts_in_render_order() -> anyhow::Result<()> {
        let registry = Reg::new();
        let root = Scope::new();
        let render = |items: &[(Elem, &str)]| {
            provide(&root, ChildTracking::new().registry(registry.clone()), || {
                ResyncedItems(items)
            })
        };

        render(&[(1, "a"), (3, "c")])?;
        render(&[(1, "a"), (2, "b"), (3, "c")])?;

        let refs: Vec<_> = registry.snapshot().iter().map(|c| c.node_ref).collect();
        assert_eq!(refs, vec![Some(1), Some(2), Some(3)]);
        Ok(())
    }

    #[test]
    fn test_resync_reports_each_remaining_child_after_unmount() -> anyhow::Result<()> {
        let (events, hooks) = recorder();
        let root = Scope::new();
        let render = |items: &[(Elem, &str)]| {
            provide(&root, ChildTracking::new().hooks(hooks.clone()), || {
                ResyncedItems(items)
            })
        };

        render(&[(1, "Hi"), (2, "Ho"), (3, "Hey")])?;
        take(&events);

        render(&[(3, "Hey"), (1, "Hi")])?;
        assert_eq!(
            take(&events),
            vec![
                Event::Update(1, None, Some("Ho".into())),
                Event::Remove(1),
                upd(0, 3, "Hey"),
                upd(1, 1, "Hi"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_resync_initial_evaluation_is_configurable() -> anyhow::Result<()> {
        let (events, hooks) = recorder();
        let root = Scope::new();

        provide(&root, ChildTracking::new().hooks(hooks), || {
            let scheduled = use_resync::<Elem, String, _>(
                &["x"],
                ResyncOptions::new().ignore_initial(false),
            )?;
            assert!(scheduled);
            Items(&[(1, "Hi"), (2, "Ho")])
        })?;

        let events = take(&events);
        assert_eq!(events[events.len() - 2..], [upd(0, 1, "Hi"), upd(1, 2, "Ho")]);
        assert_eq!(events.len(), 6);
        Ok(())
    }

    #[test]
    fn test_resync_skips_first_evaluation_by_default() -> anyhow::Result<()> {
        let root = Scope::new();
        let scheduled = Rc::new(RefCell::new(Vec::new()));
        for deps in [[1, 2], [1, 2], [2, 1]] {
            let scheduled = scheduled.clone();
            provide(&root, ChildTracking::new(), move || {
                let s = use_resync::<Elem, String, _>(&deps, ResyncOptions::new())?;
                scheduled.borrow_mut().push(s);
                Ok(())
            })?;
        }
        assert_eq!(*scheduled.borrow(), vec![false, false, true]);
        Ok(())
    }

    #[test]
    fn test_missing_provider_errors_unless_optional() -> anyhow::Result<()> {
        let root = Scope::new();
        let err = compose(&root, || {
            use_child::<Elem, String>(None, ChildOptions::new())
        })
        .unwrap_err();
        assert_eq!(err, ChildrenError::MissingProvider);
        assert!(err.to_string().contains("within a ChildrenProvider"));

        let other = Scope::new();
        let node_ref = compose(&other, || {
            use_child::<Elem, String>(None, ChildOptions::new().optional(true))
        })?;
        node_ref.attach(3);
        node_ref.detach();

        let ctl = compose(&Scope::new(), || {
            use_child_controller::<Elem, String>(ChildOptions::new().optional(true))
        })?;
        ctl.set_data(Some("ignored".into()));
        assert!(!ctl.is_registered());
        assert_eq!(ctl.key(), None);
        Ok(())
    }

    #[test]
    fn test_resync_outside_provider_errors() {
        let err = compose(&Scope::new(), || {
            use_resync::<Elem, String, u8>(&[1], ResyncOptions::new())
        })
        .unwrap_err();
        assert_eq!(err, ChildrenError::MissingResyncProvider);
        assert!(err.to_string().contains("use_resync"));
    }

    #[test]
    fn test_resync_outside_compose_runs_immediately() {
        init_logger();
        let (events, hooks) = recorder();
        let ctx = ChildrenContext::new(Reg::with_hooks(hooks));
        let _child = ctx.register(Some("only".into()));
        take(&events);

        let scheduled = default_children_local().provide(ctx, || {
            use_resync::<Elem, String, u8>(&[1], ResyncOptions::new().ignore_initial(false))
        });
        assert_eq!(scheduled, Ok(true));
        assert_eq!(
            take(&events),
            vec![Event::Update(0, None, Some("only".into()))]
        );
    }

    #[test]
    fn test_registry_and_callbacks_conflict() {
        let ran = Cell::new(false);
        let result = compose(&Scope::new(), || {
            ChildrenProvider(
                ChildTracking::new().registry(Reg::new()).on_add(|_| {}),
                || ran.set(true),
            )
        });
        assert_eq!(result.unwrap_err(), ChildrenError::ConflictingTracking);
        assert!(!ran.get());
    }

    #[test]
    fn test_provider_rerender_keeps_context_and_rebinds_hooks() -> anyhow::Result<()> {
        let root = Scope::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut ids = Vec::new();

        for (tag, data) in [("first", "a"), ("first", "a"), ("second", "b")] {
            let tracking = ChildTracking::new()
                .on_add({
                    let calls = calls.clone();
                    move |_| calls.borrow_mut().push(format!("{tag}: add"))
                })
                .on_update({
                    let calls = calls.clone();
                    move |i, c: &Record| {
                        calls
                            .borrow_mut()
                            .push(format!("{tag}: update {i} {:?}", c.data))
                    }
                });
            let mut id = None;
            provide(&root, tracking, || {
                id = default_children_local::<Elem, String>()
                    .current()
                    .map(|ctx| ctx.id());
                keyed("child", || {
                    use_child::<Elem, String>(Some(data.into()), ChildOptions::new()).map(|_| ())
                })
            })?;
            ids.push(id);
        }

        assert!(ids[0].is_some());
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(
            *calls.borrow(),
            vec!["first: add", "second: update 0 Some(\"b\")"]
        );
        Ok(())
    }

    #[test]
    fn test_custom_context_keeps_coordinators_apart() -> anyhow::Result<()> {
        let outer = Reg::new();
        let inner = Reg::new();
        let panel = ChildrenLocal::<Elem, String>::new();
        let root = Scope::new();

        provide(&root, ChildTracking::new().registry(outer.clone()), || {
            Item(10, "outer-first", None)?;
            keyed("panel", || {
                ChildrenProvider(
                    ChildTracking::new().registry(inner.clone()).context(panel),
                    || -> Result<(), ChildrenError> {
                        keyed("panel-item", || {
                            use_child_element(20, None::<String>, ChildOptions::new().context(panel))
                        })?;
                        Item(11, "outer-nested", None)
                    },
                )?
            })
        })?;

        let refs = |r: &Reg| r.snapshot().iter().map(|c| c.node_ref).collect::<Vec<_>>();
        assert_eq!(refs(&outer), vec![Some(10), Some(11)]);
        assert_eq!(refs(&inner), vec![Some(20)]);
        Ok(())
    }

    #[test]
    fn test_context_change_moves_record_and_rearms_first_evaluation() -> anyhow::Result<()> {
        init_logger();
        let (events_a, hooks_a) = recorder();
        let (events_b, hooks_b) = recorder();
        let reg_a = Reg::with_hooks(hooks_a);
        let reg_b = Reg::with_hooks(hooks_b);
        let root = Scope::new();
        let render = |registry: &Reg, data: &str| {
            provide(&root, ChildTracking::new().registry(registry.clone()), || {
                keyed("child", || {
                    use_child_element::<Elem, String>(1, Some(data.to_string()), ChildOptions::new())
                })
            })
        };

        render(&reg_a, "x")?;
        assert_eq!(
            take(&events_a),
            vec![Event::Add(Some("x".into())), upd(0, 1, "x")]
        );

        // The old coordinator sees the reference detached before the removal.
        render(&reg_b, "x")?;
        assert!(reg_a.is_empty());
        assert_eq!(
            take(&events_a),
            vec![Event::Update(0, None, Some("x".into())), Event::Remove(0)]
        );
        assert_eq!(
            take(&events_b),
            vec![Event::Add(Some("x".into())), upd(0, 1, "x")]
        );

        render(&reg_b, "y")?;
        assert_eq!(take(&events_b), vec![upd(0, 1, "y")]);
        assert!(take(&events_a).is_empty());
        Ok(())
    }

    #[test]
    fn test_controller_publishes_imperatively() -> anyhow::Result<()> {
        let (events, hooks) = recorder();
        let root = Scope::new();
        let controller = Rc::new(RefCell::new(None));

        provide(&root, ChildTracking::new().hooks(hooks.clone()), || {
            let ctl = keyed("ctl", || use_child_controller::<Elem, String>(ChildOptions::new()))?;
            ctl.set_data(Some("a".into()));
            ctl.set_data(Some("a".into()));
            ctl.set_ref(Some(9));
            *controller.borrow_mut() = Some(ctl);
            Ok(())
        })?;
        assert_eq!(
            take(&events),
            vec![
                Event::Add(None),
                Event::Update(0, None, Some("a".into())),
                upd(0, 9, "a"),
            ]
        );

        // Re-composing does not republish.
        provide(&root, ChildTracking::new().hooks(hooks), || {
            keyed("ctl", || use_child_controller::<Elem, String>(ChildOptions::new())).map(|_| ())
        })?;
        assert!(take(&events).is_empty());

        let ctl = controller.borrow_mut().take();
        if let Some(ctl) = ctl {
            assert!(ctl.is_registered());
            ctl.set_data(Some("b".into()));
        }
        assert_eq!(take(&events), vec![upd(0, 9, "b")]);
        Ok(())
    }

    #[test]
    fn test_observer_may_read_controller_while_it_publishes() -> anyhow::Result<()> {
        let root = Scope::new();
        let slot: Rc<RefCell<Option<ChildController<Elem, String>>>> = Rc::new(RefCell::new(None));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let tracking = || {
            ChildTracking::new().on_update({
                let slot = slot.clone();
                let seen = seen.clone();
                move |i, c: &Record| {
                    let key = slot.borrow().as_ref().and_then(|ctl| ctl.key());
                    seen.borrow_mut().push((i, key.is_some(), c.node_ref, c.data.clone()));
                }
            })
        };

        provide(&root, tracking(), || {
            let ctl = keyed("ctl", || use_child_controller::<Elem, String>(ChildOptions::new()))?;
            *slot.borrow_mut() = Some(ctl);
            Ok(())
        })?;

        let ctl = slot.borrow().clone();
        let Some(ctl) = ctl else {
            anyhow::bail!("controller was not stored");
        };
        ctl.set_data(Some("x".into()));
        ctl.set_ref(Some(3));
        assert_eq!(
            *seen.borrow(),
            vec![
                (0, true, None, Some("x".to_string())),
                (0, true, Some(3), Some("x".to_string())),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_remember_registry_is_stable_and_rebinds() -> anyhow::Result<()> {
        let root = Scope::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let registries = RefCell::new(Vec::new());

        for tag in ["first", "second"] {
            compose(&root, || -> Result<(), ChildrenError> {
                let registry = remember_registry(ChildrenHooks::<Elem, String>::new().on_update({
                    let seen = seen.clone();
                    move |_, c| seen.borrow_mut().push((tag, c.data.clone()))
                }));
                registries.borrow_mut().push(registry.clone());
                ChildrenProvider(ChildTracking::new().registry(registry), || {
                    keyed("child", || {
                        use_child::<Elem, String>(Some(tag.into()), ChildOptions::new())
                            .map(|_| ())
                    })
                })?
            })?;
        }

        let registries = registries.into_inner();
        assert!(registries[0].ptr_eq(&registries[1]));
        assert_eq!(registries[0].len(), 1);
        assert_eq!(*seen.borrow(), vec![("second", Some("second".to_string()))]);
        Ok(())
    }

    #[test]
    fn test_registry_lookups_are_identity_based_and_forgiving() {
        let (events, hooks) = recorder();
        let registry = Reg::with_hooks(hooks);

        let a = registry.add(ChildRecord::new(Some("same".into())));
        let b = registry.add(ChildRecord::new(Some("same".into())));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(a).is_some());
        assert_eq!(registry.index_of(b), Some(0));

        // Second removal and updates of a removed record are silent no-ops.
        assert!(registry.remove(a).is_none());
        registry.update(a);
        registry.set_data(a, Some("late".into()));
        registry.set_ref(a, Some(1));
        assert!(!registry.contains(a));
        assert_eq!(registry.get(a), None);

        assert_eq!(
            take(&events),
            vec![
                Event::Add(Some("same".into())),
                Event::Add(Some("same".into())),
                Event::Remove(0),
            ]
        );
    }

    #[test]
    fn test_registry_without_observers_still_tracks() {
        let registry = Reg::new();
        let key = registry.add(ChildRecord::default());
        registry.update(key);
        registry.notify_all();
        registry.set_ref(key, Some(4));
        assert_eq!(registry.get(key), Some(record(Some(4), None)));
    }

    #[test]
    fn test_registry_reorder_is_stable() {
        let registry = Reg::new();
        let a = registry.add(ChildRecord::default());
        let b = registry.add(ChildRecord::default());
        let c = registry.add(ChildRecord::default());
        let gone = registry.add(ChildRecord::default());
        registry.remove(gone);

        assert!(registry.reorder(&[c, gone, a, c]));
        assert_eq!(registry.keys(), vec![c, a, b]);
        assert!(!registry.reorder(&[c]));
        assert!(!registry.reorder(&[]));
    }

    #[test]
    fn test_observers_may_read_registry() {
        let registry = Reg::new();
        let lengths = Rc::new(RefCell::new(Vec::new()));
        registry.set_on_add(Some(Rc::new({
            let registry = registry.clone();
            let lengths = lengths.clone();
            move |_: &Record| lengths.borrow_mut().push(registry.len())
        })));

        registry.add(ChildRecord::default());
        registry.add(ChildRecord::default());
        assert_eq!(*lengths.borrow(), vec![1, 2]);
        registry.set_on_add(None);
    }

    #[test]
    fn test_handle_update_data_and_unregister() {
        let (events, hooks) = recorder();
        let ctx = ChildrenContext::new(Reg::with_hooks(hooks));

        let handle = ctx.register(None);
        handle.update_data(Some("d".into()));
        let node_ref = handle.node_ref();
        node_ref.attach(2);
        node_ref.detach();
        handle.unregister();
        // Reference callback outliving its record does nothing.
        node_ref.attach(5);

        assert_eq!(
            take(&events),
            vec![
                Event::Add(None),
                Event::Update(0, None, Some("d".into())),
                upd(0, 2, "d"),
                Event::Update(0, None, Some("d".into())),
                Event::Remove(0),
            ]
        );
        assert!(ctx.registry().is_empty());
    }

    #[test]
    fn test_context_update_notifies_in_current_order() {
        let (events, hooks) = recorder();
        let ctx = ChildrenContext::new(Reg::with_hooks(hooks));
        let first = ctx.register(Some("1".into()));
        let second = ctx.register(Some("2".into()));
        take(&events);

        ctx.update();
        assert_eq!(
            take(&events),
            vec![
                Event::Update(0, None, Some("1".into())),
                Event::Update(1, None, Some("2".into())),
            ]
        );

        ctx.begin_pass();
        ctx.mark_rendered(second.key());
        ctx.mark_rendered(first.key());
        ctx.update();
        assert_eq!(
            take(&events),
            vec![
                Event::Update(0, None, Some("2".into())),
                Event::Update(1, None, Some("1".into())),
            ]
        );
        assert_eq!(ctx.registry().len(), 2);
    }
}

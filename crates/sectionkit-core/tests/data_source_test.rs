//! Committing transactions and forwarding them to the renderer.

use std::cell::Cell;
use std::pin::pin;
use std::rc::Rc;
use std::task::Poll;

use sectionkit_core::{
    AllDividersStrategy, Axis, CalculationContext, DataSource, DataSourceConfig, DividerModel,
    DividerStrategy, ElementKind, EntityKind, EnvironmentFingerprint, FixedEnvironment, Item,
    PrefetchStrategy, ScrollDirection, Section, SectionDividers, Sizable, SnapshotError,
    SupplementaryItem, Transaction,
};
use sectionkit_testing::prelude::*;

fn environment() -> FixedEnvironment {
    FixedEnvironment(EnvironmentFingerprint::of("compact"))
}

fn data_source(renderer: RecordingRenderer) -> DataSource<RecordingRenderer> {
    let mut data_source = DataSource::new(renderer, environment());
    data_source
        .apply_sections(vec![section(1, &[1, 2])], false, || {})
        .expect("initial sections");
    data_source
}

#[derive(Hash)]
struct Banner;

impl Sizable for Banner {
    fn measure(&self, _context: &CalculationContext, _axis: Axis) -> f32 {
        120.0
    }
}

#[test]
fn successful_transaction_reaches_the_renderer_once() {
    let mut data_source = data_source(RecordingRenderer::new());
    let completed = Rc::new(Cell::new(false));

    let flag = Rc::clone(&completed);
    data_source
        .apply(
            Transaction::new()
                .append_items(vec![item(3)], Some(section_id(1)))
                .insert_items_after_item(vec![item(4)], item_id(3)),
            true,
            move || flag.set(true),
        )
        .unwrap();

    assert!(completed.get());
    assert_eq!(data_source.renderer().update_count(), 2);
    let update = data_source.renderer().last_update().unwrap();
    assert!(update.animated);
    assert_eq!(update.changes.inserted_items, vec![item_id(3), item_id(4)]);
    assert_item_order(&update.snapshot, 1, &[1, 2, 3, 4]);
    assert_item_order(data_source.snapshot(), 1, &[1, 2, 3, 4]);
}

#[test]
fn rejected_transaction_leaves_everything_alone() {
    let mut data_source = data_source(RecordingRenderer::new());
    let before = data_source.shared_snapshot();
    let completed = Rc::new(Cell::new(false));

    let flag = Rc::clone(&completed);
    let err = data_source
        .apply(
            Transaction::new().insert_items_after_item(vec![item(4)], item_id(9)),
            false,
            move || flag.set(true),
        )
        .unwrap_err();

    assert_eq!(err, SnapshotError::NotExistingItem { item: item_id(9) });
    assert_eq!(*data_source.snapshot(), *before);
    assert_eq!(data_source.renderer().update_count(), 1);
    assert!(!completed.get());
}

#[test]
fn empty_operands_never_reach_the_renderer() {
    let mut data_source = data_source(RecordingRenderer::new());
    let before = data_source.shared_snapshot();

    data_source.append_items(Vec::new(), None, true).unwrap();
    data_source.delete_items(Vec::new(), true).unwrap();
    data_source.reload_items(Vec::new(), true).unwrap();

    let completed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&completed);
    data_source
        .apply(
            Transaction::new()
                .append_sections(Vec::new())
                .delete_sections(Vec::new())
                .reconfigure_items(Vec::new()),
            true,
            move || flag.set(true),
        )
        .unwrap();

    assert!(completed.get());
    assert_eq!(*data_source.snapshot(), *before);
    assert_eq!(data_source.renderer().update_count(), 1);
}

#[test]
fn reconfigure_or_reload_resolves_per_renderer() {
    let mut supporting = data_source(RecordingRenderer::new());
    supporting.reconfigure_or_reload_items(vec![item_id(1)], false).unwrap();
    let changes = &supporting.renderer().last_update().unwrap().changes;
    assert_eq!(changes.reconfigured_items, vec![item_id(1)]);
    assert!(changes.reloaded_items.is_empty());

    let mut reloading = data_source(RecordingRenderer::new().without_reconfigure());
    reloading.reconfigure_or_reload_items(vec![item_id(1)], false).unwrap();
    let changes = &reloading.renderer().last_update().unwrap().changes;
    assert!(changes.reconfigured_items.is_empty());
    assert_eq!(changes.reloaded_items, vec![item_id(1)]);
}

#[test]
fn kinds_are_registered_once_before_first_use() {
    let mut data_source = data_source(RecordingRenderer::new());
    assert_eq!(data_source.renderer().registered_kinds(), &[EntityKind::of::<Row>()]);

    let banner = Section::with_id(section_id(2), vec![item(20)])
        .unwrap()
        .with_supplementary_item(SupplementaryItem::new(ElementKind::HEADER, Banner))
        .unwrap();
    data_source.append_sections(vec![banner], false).unwrap();
    data_source.append_items(vec![item(21)], Some(section_id(2)), false).unwrap();

    assert_eq!(
        data_source.renderer().registered_kinds(),
        &[EntityKind::of::<Row>(), EntityKind::of::<Banner>()]
    );
}

#[test]
fn async_apply_resumes_only_after_completion() {
    let renderer = RecordingRenderer::deferring();
    let pending = renderer.pending_completions();
    let mut data_source = DataSource::new(renderer, environment());
    let waker = CountingWaker::new();

    {
        let mut apply = pin!(data_source.apply_async(
            Transaction::new().set_sections(vec![section(1, &[1, 2])]),
            true,
        ));

        assert!(poll_once(apply.as_mut(), &waker.waker()).is_pending());
        assert!(poll_once(apply.as_mut(), &waker.waker()).is_pending());
        assert_eq!(pending.len(), 1);

        assert_eq!(pending.complete_all(), 1);
        assert_eq!(waker.wakes(), 1);
        assert_eq!(poll_once(apply.as_mut(), &waker.waker()), Poll::Ready(Ok(())));
    }

    assert_item_order(data_source.snapshot(), 1, &[1, 2]);
}

#[test]
fn async_apply_reports_rejection_immediately() {
    let mut data_source = data_source(RecordingRenderer::deferring());
    let pending = data_source.renderer().pending_completions();
    pending.complete_all();

    let result = pollster::block_on(
        data_source.apply_async(Transaction::new().delete_items(vec![item_id(1), item_id(2)]), true),
    );

    assert_eq!(result, Err(SnapshotError::EmptyItems { section: Some(section_id(1)) }));
    assert!(pending.is_empty());
}

#[test]
fn sequential_async_applies_observe_each_other() {
    let mut data_source = data_source(RecordingRenderer::new());

    pollster::block_on(async {
        data_source
            .apply_async(Transaction::new().append_items(vec![item(3)], None), false)
            .await?;
        data_source
            .apply_async(Transaction::new().insert_items_before_item(vec![item(4)], item_id(3)), false)
            .await
    })
    .unwrap();

    assert_item_order(data_source.snapshot(), 1, &[1, 2, 4, 3]);
}

#[test]
fn default_dividers_follow_the_last_item() {
    let divided = |n| item(n).with_divider(DividerModel::default());
    let mut data_source = DataSource::new(RecordingRenderer::new(), environment());
    data_source
        .apply_sections(
            vec![Section::with_id(section_id(1), vec![divided(1), divided(2)]).unwrap()],
            false,
            || {},
        )
        .unwrap();

    let visible = |data_source: &DataSource<RecordingRenderer>, n| {
        data_source
            .snapshot()
            .item(item_id(n))
            .map(|item| item.capabilities().has_visible_divider())
    };
    assert_eq!(visible(&data_source, 1), Some(true));
    assert_eq!(visible(&data_source, 2), Some(false));

    data_source.append_items(vec![divided(3)], None, false).unwrap();

    assert_eq!(visible(&data_source, 2), Some(true));
    assert_eq!(visible(&data_source, 3), Some(false));
    let changes = &data_source.renderer().last_update().unwrap().changes;
    assert_eq!(changes.inserted_items, vec![item_id(3)]);
    assert_eq!(changes.updated_items, vec![item_id(2)]);
}

#[test]
fn divider_strategy_is_configurable() {
    let mut data_source =
        DataSource::new(RecordingRenderer::new(), environment()).with_divider_strategy(AllDividersStrategy);
    data_source
        .apply_sections(vec![section(1, &[1])], false, || {})
        .unwrap();
    data_source
        .append_items(vec![item(2).with_divider(DividerModel::inset(16.0, 0.0))], None, false)
        .unwrap();

    let last: &Item = data_source.snapshot().item(item_id(2)).unwrap();
    assert!(last.capabilities().has_visible_divider());
}

/// Hides every second divider, except in section 2.
struct AlternatingDividers;

impl DividerStrategy for AlternatingDividers {
    fn separate_items(&self, dividers: &mut SectionDividers<'_>) {
        let show_all = dividers.section().id() == section_id(2);
        for index in 0..=dividers.len() {
            dividers.set_hidden(index, index % 2 == 1 && !show_all);
        }
    }
}

#[test]
fn custom_divider_strategy_keeps_the_snapshot_consistent() {
    let divided = |n| item(n).with_divider(DividerModel::default());
    let mut data_source =
        DataSource::new(RecordingRenderer::new(), environment()).with_divider_strategy(AlternatingDividers);
    data_source
        .apply_sections(
            vec![
                Section::with_id(section_id(1), vec![divided(1), divided(2), divided(3)]).unwrap(),
                Section::with_id(section_id(2), vec![divided(4), divided(5)]).unwrap(),
            ],
            false,
            || {},
        )
        .unwrap();
    data_source.append_items(vec![divided(6)], Some(section_id(1)), false).unwrap();

    let snapshot = data_source.snapshot();
    assert_snapshot_invariants(snapshot);
    assert_item_order(snapshot, 1, &[1, 2, 3, 6]);
    assert_item_order(snapshot, 2, &[4, 5]);
    let visible: Vec<bool> = (1..=6)
        .map(|n| snapshot.item(item_id(n)).unwrap().capabilities().has_visible_divider())
        .collect();
    assert_eq!(visible, vec![true, false, true, true, true, false]);
}

#[test]
fn visible_range_prefetches_across_sections() {
    let config = DataSourceConfig {
        prefetch: PrefetchStrategy::new(3),
        ..DataSourceConfig::default()
    };
    let mut data_source = DataSource::with_config(RecordingRenderer::new(), environment(), config);
    data_source
        .apply_sections(vec![section(1, &[1, 2]), section(2, &[3, 4, 5])], false, || {})
        .unwrap();

    assert_eq!(
        data_source.update_visible_range(item_id(1), item_id(2), ScrollDirection::Forward),
        vec![item_id(3), item_id(4), item_id(5)]
    );
    assert_eq!(data_source.next_prefetch(), Some(item_id(3)));
    assert_eq!(
        data_source.update_visible_range(item_id(4), item_id(5), ScrollDirection::Backward),
        vec![item_id(3), item_id(2), item_id(1)]
    );
}

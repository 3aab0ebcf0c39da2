#![forbid(unsafe_code)]

use criterion::{Criterion, criterion_group, criterion_main};
use navguard_core::harness::{MemoryClick, MemoryDom};
use navguard_core::{GuardConfig, ModalProps, NavigationGuard};
use std::hint::black_box;

const HERE: &str = "https://app.test/drafts/42";

fn dom_with_anchors(count: usize) -> MemoryDom {
    let dom = MemoryDom::new(HERE);
    for index in 0..count {
        dom.add_anchor(&format!("/page/{index}"));
    }
    dom
}

fn bench_guard_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("navguard/lifecycle");

    for count in [16usize, 256] {
        let dom = dom_with_anchors(count);
        group.bench_function(format!("activate_refresh_drop_{count}"), |b| {
            b.iter(|| {
                let mut guard = NavigationGuard::activate(dom.clone(), GuardConfig::default());
                guard.refresh();
                black_box(guard.listeners().len());
            });
        });
    }

    let dom = MemoryDom::new(HERE);
    let anchors: Vec<_> = (0..32)
        .map(|index| dom.add_anchor(&format!("https://site{index}.test/")))
        .collect();
    group.bench_function("click_32_then_cancel", |b| {
        let mut guard = NavigationGuard::activate(dom.clone(), GuardConfig::default())
            .with_modal(|props: ModalProps<'_>| {
                black_box(props.is_pending);
            });
        b.iter(|| {
            for anchor in &anchors {
                let mut event = MemoryClick::default();
                black_box(guard.handle_click(anchor, &mut event).outcome);
            }
            black_box(guard.cancel());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_guard_lifecycle);
criterion_main!(benches);

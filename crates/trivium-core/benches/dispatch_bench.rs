//! Benchmarks for notification dispatch and registry churn.
//!
//! Run with: `cargo bench --package trivium-core --bench dispatch_bench`
//!
//! Dispatch clones the interest list before walking it, so the cost of a
//! send grows with the number of observers for that name. These benches
//! track that cost along with mediator registration and command execution.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;
use trivium_core::{
    CoreConfig, CoreRegistry, Command, Facade, HandlerResult, Mediator, Notification,
};

// ============================================================================
// Fixtures
// ============================================================================

struct Counter {
    name: String,
    hits: Cell<u64>,
}

impl Mediator for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn notification_interests(&self) -> Vec<String> {
        vec!["tick".into(), "tock".into()]
    }

    fn handle_notification(&self, note: &Notification, _facade: &Facade) -> HandlerResult {
        self.hits
            .set(self.hits.get() + note.body::<u64>().copied().unwrap_or(1));
        Ok(())
    }
}

#[derive(Default)]
struct Noop;

impl Command for Noop {
    fn execute(&self, note: &Notification, _facade: &Facade) -> HandlerResult {
        black_box(note.name());
        Ok(())
    }
}

fn core_with_mediators(count: usize) -> Facade {
    let facade = Facade::new("bench", CoreConfig::default());
    for i in 0..count {
        facade.register_mediator(Rc::new(Counter {
            name: format!("m{i}"),
            hits: Cell::new(0),
        }));
    }
    facade
}

// ============================================================================
// Dispatch
// ============================================================================

fn bench_send(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/send");

    for observers in [1, 8, 64, 512] {
        let facade = core_with_mediators(observers);
        group.throughput(Throughput::Elements(observers as u64));
        group.bench_with_input(
            BenchmarkId::new("observers", observers),
            &facade,
            |b, facade| {
                let note = Notification::new("tick").with_body(1_u64);
                b.iter(|| facade.notify_observers(black_box(&note)))
            },
        );
    }

    group.finish();
}

fn bench_no_observers(c: &mut Criterion) {
    let facade = core_with_mediators(64);
    c.bench_function("dispatch/unobserved", |b| {
        b.iter(|| facade.send_notification(black_box("nobody"), None, None))
    });
}

fn bench_command(c: &mut Criterion) {
    let facade = Facade::new("bench", CoreConfig::default());
    facade.register_command_type::<Noop>("run");
    c.bench_function("dispatch/command", |b| {
        b.iter(|| facade.send_notification(black_box("run"), None, None))
    });
}

// ============================================================================
// Registry churn
// ============================================================================

fn bench_mediator_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/mediator_churn");

    for resident in [0, 64] {
        let facade = core_with_mediators(resident);
        group.bench_with_input(
            BenchmarkId::new("resident", resident),
            &facade,
            |b, facade| {
                b.iter(|| {
                    facade.register_mediator(Rc::new(Counter {
                        name: "churn".into(),
                        hits: Cell::new(0),
                    }));
                    facade.remove_mediator(black_box("churn"))
                })
            },
        );
    }

    group.finish();
}

fn bench_core_lifecycle(c: &mut Criterion) {
    let registry = CoreRegistry::default();
    c.bench_function("registry/core_lifecycle", |b| {
        b.iter(|| {
            let facade = registry.facade(black_box("short-lived"));
            facade.register_command_type::<Noop>("run");
            registry.remove_core("short-lived")
        })
    });
}

criterion_group!(
    benches,
    bench_send,
    bench_no_observers,
    bench_command,
    bench_mediator_churn,
    bench_core_lifecycle,
);
criterion_main!(benches);

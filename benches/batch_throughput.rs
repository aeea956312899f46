//! Batch throughput benchmark suite.
//!
//! Benchmarks the CPU-bound parts of a batch run:
//! - Response framing at different body sizes
//! - Scheduling over an instant in-process transport at different pool sizes
//!
//! Run with: cargo bench --bench batch_throughput
//! Results saved to: target/criterion/

use std::collections::VecDeque;
use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use multicurl::{
    Completion, Progress, RequestBatch, RequestDescriptor, RequestOptions, Result, Scheduler,
    Transport, WorkerSlot, response,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const BODY_SIZES: &[usize] = &[256, 16 * 1024, 512 * 1024];
const BATCH_SIZE: usize = 1_000;
const POOL_SIZES: &[usize] = &[1, 10, 100];

// ============================================================================
// Instant Transport
// ============================================================================

/// Transport that completes every transfer on the next advance.
struct InstantTransport {
    raw: Vec<u8>,
    in_flight: Vec<WorkerSlot>,
    finished: VecDeque<Completion>,
}

impl InstantTransport {
    fn new() -> Self {
        Self {
            raw: b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"ok\":true}".to_vec(),
            in_flight: Vec::new(),
            finished: VecDeque::new(),
        }
    }
}

impl Transport for InstantTransport {
    fn allocate(&mut self, _slot: WorkerSlot) -> Result<()> {
        Ok(())
    }

    fn submit(&mut self, slot: WorkerSlot, _request: &RequestDescriptor) -> Result<()> {
        self.in_flight.push(slot);
        Ok(())
    }

    fn perform(&mut self) -> Result<Progress> {
        for slot in self.in_flight.drain(..) {
            self.finished.push_back(Completion {
                slot,
                outcome: Ok(self.raw.clone()),
            });
        }
        Ok(Progress::Running(0))
    }

    fn wait(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn next_completion(&mut self) -> Option<Completion> {
        self.finished.pop_front()
    }
}

fn batch(size: usize) -> RequestBatch {
    (0..size)
        .map(|i| {
            RequestDescriptor::new(
                i.into(),
                format!("http://bench.test/{i}"),
                Vec::new(),
                None,
                RequestOptions::new(),
            )
            .expect("valid descriptor")
        })
        .collect()
}

// ============================================================================
// Benchmark: Response Framing
// ============================================================================

fn bench_framer(c: &mut Criterion) {
    let mut group = c.benchmark_group("framer");

    for &size in BODY_SIZES {
        let payload = format!("{{\"data\":\"{}\"}}", "x".repeat(size));
        let raw = format!(
            "HTTP/1.1 100 Continue\r\n\r\n\
             HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nX-Size: {size}\r\n\r\n{payload}"
        )
        .into_bytes();

        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::new("json", size), &raw, |b, raw| {
            b.iter(|| response::parse(black_box(raw)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Scheduling
// ============================================================================

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");
    group.throughput(Throughput::Elements(BATCH_SIZE as u64));

    for &pool in POOL_SIZES {
        group.bench_with_input(BenchmarkId::new("pool", pool), &pool, |b, &pool| {
            b.iter_batched(
                || batch(BATCH_SIZE),
                |batch| {
                    Scheduler::new(pool)
                        .run(batch, || Ok(InstantTransport::new()))
                        .expect("run")
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_framer, bench_scheduler);
criterion_main!(benches);

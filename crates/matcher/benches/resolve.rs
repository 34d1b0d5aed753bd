use std::hint::black_box;

use callbook_matcher::{Config, resolve};
use callbook_primitives::{CacheSnapshot, MatchHint, Query, RawContact};
use criterion::{Criterion, criterion_group, criterion_main};

const FAMILY: [&str; 8] = ["김", "이", "박", "최", "정", "강", "조", "윤"];
const GIVEN: [&str; 8] = ["민준", "서연", "도윤", "하은", "지호", "수아", "예준", "지우"];

fn address_book(size: usize) -> CacheSnapshot {
	let entries = (0..size).map(|idx| {
		let family = FAMILY[idx % FAMILY.len()];
		let given = format!("{}{}", GIVEN[(idx / FAMILY.len()) % GIVEN.len()], idx / 64);
		RawContact::new(family, given).with_phone("mobile", format!("010-{:04}-{:04}", idx / 10_000, idx % 10_000))
	});
	CacheSnapshot::build(1, entries)
}

fn bench_resolve(c: &mut Criterion) {
	let config = Config::default();
	for size in [1_000, 10_000] {
		let snapshot = address_book(size);

		let exact = Query::new(["김민준0"], MatchHint::AutoFallback);
		c.bench_function(&format!("resolve/exact/{size}"), |b| b.iter(|| resolve(black_box(&snapshot), black_box(&exact), &config)));

		let partial = Query::new(["김 민준"], MatchHint::AutoFallback);
		c.bench_function(&format!("resolve/partial/{size}"), |b| b.iter(|| resolve(black_box(&snapshot), black_box(&partial), &config)));
	}
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);

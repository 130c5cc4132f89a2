use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jobly::models::{COMPANY_CRITERIA, USER_FIELDS};
use jobly::{FilterCriteria, UpdatePayload, build_filter, sql, sql_for_partial_update};

/// A payload of `n` distinct fields; the first three go through the user field map.
fn payload(n: usize) -> UpdatePayload {
    let mapped = ["firstName", "lastName", "isAdmin"];
    (0..n)
        .map(|i| {
            let field = mapped
                .get(i)
                .map_or_else(|| format!("field{i}"), |name| name.to_string());
            (field, i as i64)
        })
        .collect()
}

fn bench_partial_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/partial_update");

    for n in [1, 3, 10, 50] {
        let input = payload(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| black_box(sql_for_partial_update(input.clone(), &USER_FIELDS)));
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let criteria = FilterCriteria::new()
        .with("minEmployees", "10")
        .with("maxEmployees", "300")
        .with("name", "net_50%");

    c.bench_function("builders/filter", |b| {
        b.iter(|| black_box(build_filter(&criteria, &COMPANY_CRITERIA)));
    });
}

fn bench_update_statement(c: &mut Criterion) {
    let input = payload(10);

    c.bench_function("builders/update_statement", |b| {
        b.iter(|| {
            let set = sql_for_partial_update(input.clone(), &USER_FIELDS).unwrap();
            let mut q = sql("UPDATE users SET ");
            q.push_clause(&set);
            q.push(" WHERE username = ").push_bind("u1");
            black_box(q.to_sql())
        });
    });
}

criterion_group!(
    benches,
    bench_partial_update,
    bench_filter,
    bench_update_statement
);
criterion_main!(benches);

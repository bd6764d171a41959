use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rowcraft::prelude::*;

#[derive(Entity, Default)]
#[rowcraft("table:events")]
pub struct Event {
    #[rowcraft("primaryKey;autoIncrement")]
    pub id: i64,
    #[rowcraft("notNull;size:64;index")]
    pub kind: String,
    pub payload: serde_json::Value,
    pub created_at: Option<chrono::NaiveDateTime>,
}

fn benchmark_extract_cold(c: &mut Criterion) {
    c.bench_function("ModelRegistry::extract cold", |b| {
        b.iter(|| {
            let registry = ModelRegistry::new();
            black_box(registry.extract::<Event>().unwrap());
        })
    });
}

fn benchmark_extract_warm(c: &mut Criterion) {
    let registry = ModelRegistry::new();
    registry.extract::<Event>().unwrap();

    c.bench_function("ModelRegistry::extract warm", |b| {
        b.iter(|| {
            black_box(registry.extract::<Event>().unwrap());
        })
    });
}

fn benchmark_select(c: &mut Criterion) {
    c.bench_function("SqlBuilder select", |b| {
        b.iter(|| {
            let mut sql = SqlBuilder::postgres();
            sql.select(&["id", "kind"])
                .from("events")
                .where_("kind = ?", [black_box("login")])
                .where_("id > ?", [black_box(1000)])
                .order_by(&["id DESC"])
                .limit(50);
            black_box(sql.to_sql());
        })
    });
}

fn benchmark_subquery(c: &mut Criterion) {
    let mut inner = SqlBuilder::postgres();
    inner
        .select(&["user_id"])
        .from("sessions")
        .where_("active = ?", [true]);

    c.bench_function("SqlBuilder subquery", |b| {
        b.iter(|| {
            let mut sql = SqlBuilder::postgres();
            sql.select(&[])
                .from("users")
                .where_("region = ?", ["eu"])
                .append(" AND id IN ")
                .subquery(black_box(&inner), None);
            black_box(sql.to_sql());
        })
    });
}

fn benchmark_field_values(c: &mut Criterion) {
    let event = Event {
        id: 1,
        kind: "login".into(),
        payload: serde_json::json!({"ip": "127.0.0.1"}),
        created_at: None,
    };

    c.bench_function("Entity::field_values", |b| {
        b.iter(|| {
            black_box(event.field_values(&[]).unwrap());
        })
    });
}

criterion_group!(
    benches,
    benchmark_extract_cold,
    benchmark_extract_warm,
    benchmark_select,
    benchmark_subquery,
    benchmark_field_values
);
criterion_main!(benches);

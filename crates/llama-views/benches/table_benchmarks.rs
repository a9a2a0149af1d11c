//! Benchmarks for the table engine and report filters

#![allow(clippy::unwrap_used, clippy::cast_precision_loss, missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use llama_core::types::{MasterLists, StudentReport};
use llama_views::{Column, PerformanceFilter, ReportFilter, TableModel};
use serde_json::json;
use std::hint::black_box;

#[derive(Debug, Clone)]
struct Row {
    id: i64,
    name: String,
    email: String,
    experience: i64,
}

fn rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| Row {
            id: i as i64,
            name: format!("Estudiante {i}"),
            email: format!("estudiante{i}@llama.pe"),
            experience: ((i * 7919) % 5000) as i64,
        })
        .collect()
}

fn table(count: usize) -> TableModel<Row> {
    let mut table = TableModel::new(vec![
        Column::keyed("ID", "id", |r: &Row| r.id.into()),
        Column::keyed("Name", "name", |r: &Row| r.name.as_str().into()),
        Column::keyed("Email", "email", |r: &Row| r.email.as_str().into()),
        Column::keyed("XP", "experience", |r: &Row| r.experience.into()),
    ]);
    table.set_rows(rows(count));
    table
}

/// Search plus sort over growing tables, recomputed each iteration
fn bench_table_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_view");

    for size in [100_usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("search_and_sort", size), &size, |b, &size| {
            let mut model = table(size);
            model.sort_by("experience");
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                model.set_search(if flip { "estudiante1" } else { "llama" });
                black_box(model.view().rows.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", size), &size, |b, &size| {
            let mut model = table(size);
            model.set_search("9");
            b.iter(|| black_box(model.view().rows.len()));
        });
    }

    group.finish();
}

/// Report filters over a realistic class list
fn bench_report_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_filter");

    let students: Vec<StudentReport> = (0..2_000)
        .map(|i: i32| {
            let course = if i % 2 == 0 { "Álgebra" } else { "Cálculo" };
            serde_json::from_value(json!({
                "id": i,
                "nombre": format!("Alumno {i}"),
                "institucion_id": i % 5,
                "carrera_id": i % 12,
                "curso_asignado": course,
                "promedio_global": f64::from(i % 21),
            }))
            .unwrap()
        })
        .collect();
    let lists: MasterLists = serde_json::from_value(json!({
        "cursos": [{"id": 1, "nombre": "Álgebra"}, {"id": 2, "nombre": "Cálculo"}]
    }))
    .unwrap();

    let filter = ReportFilter {
        search: "alumno 1".to_string(),
        institution_id: Some(1),
        course_id: Some(1),
        performance: PerformanceFilter::AtRisk,
        ..ReportFilter::default()
    };

    group.throughput(Throughput::Elements(students.len() as u64));
    group.bench_function("combined", |b| {
        b.iter(|| black_box(filter.apply(&students, &lists).len()));
    });

    group.finish();
}

criterion_group!(benches, bench_table_view, bench_report_filter);
criterion_main!(benches);

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seqcal_core::logging::Silent;
use seqcal_core::models::{Appointment, DateWindow, Horizon, PatternConfig, PatternId};
use seqcal_core::parser::TodoLineParser;
use seqcal_core::pattern::DatePatternMatcher;
use seqcal_core::recurrence::{expand, CadenceUnit};
use seqcal_core::schedule::ScheduleEngine;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_test_appointments(count: usize) -> Vec<Appointment> {
    (0..count)
        .map(|i| Appointment {
            title: format!("Appointment {} %dag", i),
            description: "Slot %coffee_slot".to_string(),
            pattern: PatternId::ALL[1 + i % (PatternId::ALL.len() - 1)],
            calendar: "bench".to_string(),
            stacked: true,
            start_time: None,
            end_time: None,
            literal_date: None,
            location: None,
        })
        .collect()
}

fn bench_matcher_year(c: &mut Criterion) {
    let matcher = DatePatternMatcher::with_defaults();
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();

    c.bench_function("matcher_all_patterns_one_year", |b| {
        b.iter(|| {
            window
                .days()
                .flat_map(|day| PatternId::ALL.iter().map(move |p| (day, *p)))
                .filter(|(day, p)| matcher.matches(black_box(*day), *p, "bench title"))
                .count()
        })
    });
}

fn bench_generate_appointments(c: &mut Criterion) {
    let engine = ScheduleEngine::new(PatternConfig::default()).with_logger(Arc::new(Silent));
    let start = date(2024, 2, 1);

    let mut group = c.benchmark_group("generate_appointments");
    for count in [10, 50, 100].iter() {
        let appointments = create_test_appointments(*count);
        let window = DateWindow::around(start, 1, 4);
        group.bench_with_input(BenchmarkId::new("appointments", count), count, |b, _| {
            b.iter(|| {
                engine
                    .generate_appointments(black_box(&appointments), "bench", window)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_expand(c: &mut Criterion) {
    c.bench_function("expand_weekly_ten_years", |b| {
        b.iter(|| {
            expand(black_box(date(2020, 1, 6)), 1, CadenceUnit::Week, date(2030, 1, 6))
                .unwrap()
                .count()
        })
    });
}

fn bench_parse_lines(c: &mut Criterion) {
    let parser = TodoLineParser::new(date(2024, 3, 1), Horizon::Overview)
        .with_logger(Arc::new(Silent));
    let lines = [
        "TODO [#A] Buy milk",
        "TODO Follow up: contract #5m",
        "TODO Meet: Anna\nSCHEDULED: <2024-03-04 Mon>",
        "TODO [#B] Water plants\nSCHEDULED: <2024-03-04 Mon ++1w>",
    ];

    c.bench_function("parse_mixed_lines", |b| {
        b.iter(|| {
            lines
                .iter()
                .map(|line| parser.parse(black_box(line), "bench").unwrap().len())
                .sum::<usize>()
        })
    });
}

criterion_group!(
    benches,
    bench_matcher_year,
    bench_generate_appointments,
    bench_expand,
    bench_parse_lines
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use stroke_triage::{
    evaluate, EligibilityCase, EligibilityEngine, EligibilityInput, LabSnapshot, Subject,
    VitalsSnapshot,
};

fn complete_case() -> EligibilityCase {
    EligibilityCase {
        subject: Subject::new("bench").with_age(58),
        vitals: VitalsSnapshot {
            nihss_score: Some(11),
            oxygen_saturation: Some(97),
            blood_pressure_systolic: Some(172),
            blood_pressure_diastolic: Some(96),
            significant_head_trauma: Some(false),
            recent_surgery: Some(false),
            recent_myocardial_infarction: Some(false),
            recent_hemorrhage: Some(false),
            platelet_count: Some(210_000),
            inr_score: Some(1.1),
            ..Default::default()
        },
        lab: LabSnapshot {
            bmp_glucose: Some(132.0),
            coagulation: Some("normal".to_string()),
            ..Default::default()
        },
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let case = complete_case();

    c.bench_function("evaluate eligible case", |b| {
        b.iter(|| evaluate(black_box(&case.subject), black_box(&case.vitals), black_box(&case.lab)))
    });

    let mut early_exit = complete_case();
    early_exit.subject.age = Some(16);
    c.bench_function("evaluate fails on first criterion", |b| {
        b.iter(|| {
            evaluate(
                black_box(&early_exit.subject),
                black_box(&early_exit.vitals),
                black_box(&early_exit.lab),
            )
        })
    });
}

fn bench_assess(c: &mut Criterion) {
    let engine = EligibilityEngine::new();

    c.bench_function("assess with breakdown", |b| {
        b.iter_batched(
            || EligibilityInput::new(complete_case(), "bench"),
            |input| engine.assess(&input),
            BatchSize::SmallInput,
        )
    });

    let case = complete_case();
    c.bench_function("inputs hash", |b| {
        b.iter(|| EligibilityEngine::compute_inputs_hash(black_box(&case)))
    });
}

criterion_group!(benches, bench_evaluate, bench_assess);
criterion_main!(benches);

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use nbclassify::{LabeledText, Trainer, TrainerConfig};

const WORDS: &[&str] = &[
    "market", "rally", "earnings", "striker", "goal", "match", "senate", "ballot", "budget",
    "recipe", "garlic", "oven", "compiler", "kernel", "latency", "weather", "storm", "forecast",
];
const CATEGORIES: &[&str] = &["finance", "sports", "politics", "cooking", "tech", "weather"];

fn build_examples(count: usize) -> Vec<LabeledText> {
    (0..count)
        .map(|idx| {
            let text = (0..24)
                .map(|offset| WORDS[(idx * 7 + offset * 3) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ");
            LabeledText::new(text, CATEGORIES[idx % CATEGORIES.len()])
        })
        .collect()
}

fn bench_training(c: &mut Criterion) {
    let examples = build_examples(4096);
    let total_bytes: usize = examples.iter().map(|example| example.text.len()).sum();
    let cfg = TrainerConfig::builder()
        .show_progress(false)
        .build()
        .expect("configuration");

    let mut group = c.benchmark_group("train_text_corpus");
    group.throughput(Throughput::Bytes(total_bytes as u64));
    group.sampling_mode(SamplingMode::Flat);
    group.bench_function(BenchmarkId::from_parameter("docs_4096"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artefacts = trainer.train(&examples).expect("training");
            let _ = black_box(artefacts);
        });
    });
    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let examples = build_examples(4096);
    let cfg = TrainerConfig::builder()
        .show_progress(false)
        .build()
        .expect("configuration");
    let model = Trainer::new(cfg).train(&examples).expect("training").model;
    let texts: Vec<&str> = examples
        .iter()
        .take(512)
        .map(|example| example.text.as_str())
        .collect();

    let mut group = c.benchmark_group("predict_text");
    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function(BenchmarkId::from_parameter("sequential_512"), |b| {
        b.iter(|| {
            for text in &texts {
                let _ = black_box(model.predict(text));
            }
        });
    });
    group.bench_function(BenchmarkId::from_parameter("batch_512"), |b| {
        b.iter(|| black_box(model.predict_batch(&texts)));
    });
    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);

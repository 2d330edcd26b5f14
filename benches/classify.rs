use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use formsense::classifier::Classifier;
use formsense::field::{FieldHandle, FieldId, NativeKind, Rect, SelectOption};
use formsense::settings::Settings;
use formsense::{classify_snapshot, signals};

fn text_field(id: u64, name: &str) -> FieldHandle {
    FieldHandle {
        id: FieldId(id),
        kind: NativeKind::Text,
        name: name.to_string(),
        element_id: format!("field-{id}"),
        placeholder: String::new(),
        aria_label: String::new(),
        title: String::new(),
        label: String::new(),
        classes: vec!["form-control".to_string()],
        data_attributes: Default::default(),
        attributes: Default::default(),
        rect: Rect { x: 10.0, y: id as f64 * 40.0, width: 220.0, height: 28.0 },
        nearby_text: Vec::new(),
        sibling_names: Vec::new(),
        options: Vec::new(),
    }
}

fn generate_page(fields: usize) -> Vec<FieldHandle> {
    let names = [
        "email",
        "firstname",
        "lastname",
        "user.phone",
        "billing[zip]",
        "vorname",
        "usr_eml",
        "xq7",
        "comment_text",
        "company",
    ];
    let mut page: Vec<FieldHandle> = (0..fields)
        .map(|i| text_field(i as u64, names[i % names.len()]))
        .collect();

    let mut country = text_field(fields as u64, "country");
    country.kind = NativeKind::Select;
    country.options = (0..60)
        .map(|n| SelectOption {
            value: format!("c{n}"),
            text: format!("Country {n}"),
            disabled: false,
        })
        .collect();
    page.push(country);
    page
}

fn bench_signal_extraction(c: &mut Criterion) {
    let page = generate_page(200);
    c.bench_function("extract_signals_200_fields", |b| {
        b.iter(|| {
            for field in &page {
                std::hint::black_box(signals::extract(field));
            }
        })
    });
}

fn bench_classify_cold_cache(c: &mut Criterion) {
    let page = generate_page(200);
    c.bench_function("classify_200_fields_cold", |b| {
        b.iter_batched(
            || Classifier::new(Settings::default()),
            |mut classifier| {
                for field in &page {
                    std::hint::black_box(classifier.classify(field));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_classify_warm_cache(c: &mut Criterion) {
    let page = generate_page(200);
    let mut classifier = Classifier::new(Settings::default());
    for field in &page {
        classifier.classify(field);
    }
    c.bench_function("classify_200_fields_warm", |b| {
        b.iter(|| {
            for field in &page {
                std::hint::black_box(classifier.classify(field));
            }
        })
    });
}

fn bench_full_snapshot(c: &mut Criterion) {
    let page = generate_page(500);
    c.bench_function("snapshot_500_fields", |b| {
        b.iter(|| std::hint::black_box(classify_snapshot(&page, Settings::default(), Some(1))))
    });
}

criterion_group!(
    benches,
    bench_signal_extraction,
    bench_classify_cold_cache,
    bench_classify_warm_cache,
    bench_full_snapshot
);
criterion_main!(benches);

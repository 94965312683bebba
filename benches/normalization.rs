//! Benchmark for the normalization hot path: title repair, reference
//! extraction, multi-case expansion, and classification over a synthetic
//! corpus.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use filing_linkage::normalize::FilingNormalizer;
use filing_linkage::RawFiling;

fn synthetic_corpus(size: usize) -> Vec<RawFiling> {
    let templates = [
        "Complaint - Jane Roe, MD - Case No {Y}-8654-1",
        "Complaint- John Doe, MD, Case No {Y}-5171-1",
        "Settlement Agreement and Order - Jane Roe, MD - Case Nos {Y}-22461-1, -2, -3, -4",
        "Voluntary Surrender of License - Alex Poe, MD - License No 21350",
        "Findings of Fact, Conclusions of Law and Order - Sam Moe, MD - Cae No {Y}-1001401",
        "Order Denying Application for Licensure - Pat Foe, MD",
    ];

    (0..size)
        .map(|i| {
            let year = 2008 + (i % 18) as i32;
            let title = templates[i % templates.len()]
                .replace("{Y}", &format!("{:02}", year % 100));
            RawFiling {
                year,
                date: format!("{}/{}/{}", 1 + i % 12, 1 + i % 28, year),
                title,
                source_url: format!("https://example.org/{}/{}.pdf", year, i),
                relative_path: None,
            }
        })
        .collect()
}

fn bench_normalization(c: &mut Criterion) {
    let normalizer = FilingNormalizer::new().unwrap();
    let corpus = synthetic_corpus(1000);

    c.bench_function("normalize_1000_filings", |b| {
        b.iter(|| {
            let outcome = normalizer.normalize_all(black_box(&corpus));
            black_box(outcome.filings.len())
        })
    });

    let single = synthetic_corpus(6);
    c.bench_function("normalize_single_multi_case", |b| {
        b.iter(|| {
            let outcome = normalizer.normalize_all(black_box(&single[2..3]));
            black_box(outcome.filings.len())
        })
    });
}

criterion_group!(benches, bench_normalization);
criterion_main!(benches);

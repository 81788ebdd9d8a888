//! Criterion benchmarks for the tonality pipeline.
//!
//! Covers the hot paths of the core:
//! - Tokenization (unigram and mixed-order)
//! - TF-IDF fit and transform
//! - Classifier fit at one lambda

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use tonality::analysis::tokenizer::{Tokenizer, WordGramTokenizer};
use tonality::document::Label;
use tonality::features::tfidf::TfIdfVectorizer;
use tonality::features::vocabulary::VocabularyBuilder;
use tonality::model::logistic::LassoLogisticRegression;

/// Generate test sentences for benchmarking.
fn generate_sentences(count: usize) -> Vec<String> {
    let words = [
        "great", "wonderful", "superb", "awful", "terrible", "dreadful", "average", "ordinary",
        "plain", "film", "movie", "story", "acting", "direction", "pacing", "cast", "script",
        "scene", "ending", "soundtrack",
    ];

    (0..count)
        .map(|i| {
            (0..12)
                .map(|j| words[(i * 7 + j * 3) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_tokenizer(c: &mut Criterion) {
    let sentences = generate_sentences(200);
    let unigram = WordGramTokenizer::unigram();
    let mixed = WordGramTokenizer::new(1, 2).unwrap();

    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Elements(sentences.len() as u64));

    group.bench_function("unigram", |b| {
        b.iter(|| {
            for sentence in &sentences {
                let tokens = unigram.token_texts(black_box(sentence)).unwrap();
                black_box(tokens);
            }
        })
    });

    group.bench_function("mixed_1_2", |b| {
        b.iter(|| {
            for sentence in &sentences {
                let tokens = mixed.token_texts(black_box(sentence)).unwrap();
                black_box(tokens);
            }
        })
    });

    group.finish();
}

fn bench_tfidf(c: &mut Criterion) {
    let sentences = generate_sentences(500);
    let tokenizer = WordGramTokenizer::unigram();
    let tokens: Vec<Vec<String>> = sentences
        .iter()
        .map(|s| tokenizer.token_texts(s).unwrap())
        .collect();
    let builder = VocabularyBuilder::new(1000);
    let vectorizer = TfIdfVectorizer::fit(&tokens, &builder).unwrap();

    let mut group = c.benchmark_group("tfidf");

    group.bench_function("fit_500_docs", |b| {
        b.iter(|| {
            let fitted = TfIdfVectorizer::fit(black_box(&tokens), &builder).unwrap();
            black_box(fitted);
        })
    });

    group.bench_function("transform_500_docs", |b| {
        b.iter(|| {
            let matrix = vectorizer.transform_all(black_box(&tokens));
            black_box(matrix);
        })
    });

    group.finish();
}

fn bench_classifier(c: &mut Criterion) {
    let sentences = generate_sentences(300);
    let tokenizer = WordGramTokenizer::unigram();
    let tokens: Vec<Vec<String>> = sentences
        .iter()
        .map(|s| tokenizer.token_texts(s).unwrap())
        .collect();
    let labels: Vec<Label> = (0..tokens.len())
        .map(|i| Label::ALL[i % Label::COUNT])
        .collect();

    let vectorizer = TfIdfVectorizer::fit(&tokens, &VocabularyBuilder::new(1000)).unwrap();
    let matrix = vectorizer.transform_all(&tokens);
    let solver = LassoLogisticRegression::new().with_max_iter(50);

    c.bench_function("classifier_fit_300_docs", |b| {
        b.iter(|| {
            let outcome = solver
                .fit(black_box(&matrix), black_box(&labels), 0.01)
                .unwrap();
            black_box(outcome);
        })
    });
}

criterion_group!(benches, bench_tokenizer, bench_tfidf, bench_classifier);
criterion_main!(benches);

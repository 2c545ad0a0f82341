use criterion::{Criterion, criterion_group, criterion_main};
use resume_rag::embeddings::{Chunk, ChunkingConfig, chunk_text};
use resume_rag::search::{DEFAULT_SIMILARITY_THRESHOLD, exhaustive, search};
use resume_rag::store::IndexedDocument;
use std::hint::black_box;

const DIMENSION: usize = 768;

fn synthetic_text() -> String {
    "Senior backend engineer with experience in distributed systems, payments, \
     observability and team leadership. Built event-driven services in Rust and Go. "
        .repeat(40)
}

/// 200 résumés with 5 chunks each
fn synthetic_index() -> Vec<IndexedDocument> {
    (0..1000_u32)
        .map(|i| {
            let document_id = i / 5 + 1;
            let chunk = Chunk {
                chunk_id: format!("{}_{}", document_id, i % 5 + 1),
                document_id,
                display_name: format!("Candidate {}", document_id),
                text: String::new(),
            };
            let embedding = (0..DIMENSION)
                .map(|d| ((i as usize * 31 + d * 17) % 97) as f32 / 97.0 - 0.5)
                .collect();
            IndexedDocument::from_chunk(&chunk, embedding)
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = synthetic_text();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| chunk_text(black_box(&text), black_box(&config)))
    });

    let index = synthetic_index();
    let query: Vec<f32> = (0..DIMENSION).map(|d| (d % 13) as f32 / 13.0).collect();
    c.bench_function("bounded_search", |b| {
        b.iter(|| {
            search(
                black_box(&query),
                black_box(&index),
                200,
                DEFAULT_SIMILARITY_THRESHOLD,
            )
        })
    });
    c.bench_function("exhaustive_search", |b| {
        b.iter(|| exhaustive(black_box(&query), black_box(&index)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

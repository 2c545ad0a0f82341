use super::*;

fn doc(document_id: u32, n: usize, embedding: Vec<f32>) -> IndexedDocument {
    let chunk_id = format!("{}_{}", document_id, n);
    IndexedDocument {
        id: chunk_id.clone(),
        content: format!("passage {}", chunk_id),
        embedding,
        metadata: DocumentMetadata {
            document_id,
            display_name: format!("Candidate {}", document_id),
            chunk_id,
        },
    }
}

/// Three documents with two chunks each, spread across three axes
fn sample_index() -> Vec<IndexedDocument> {
    vec![
        doc(1, 1, vec![1.0, 0.0, 0.0]),
        doc(1, 2, vec![0.8, 0.6, 0.0]),
        doc(2, 1, vec![0.0, 1.0, 0.0]),
        doc(2, 2, vec![0.6, 0.8, 0.0]),
        doc(3, 1, vec![0.0, 0.0, 1.0]),
        doc(3, 2, vec![0.0, 0.6, 0.8]),
    ]
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn cosine_basic_properties() {
    let v = [0.3, -1.2, 4.0];
    let w = [2.0, 0.5, -0.7];
    let neg: Vec<f32> = v.iter().map(|x| -x).collect();

    assert!(approx(cosine_similarity(&v, &v).expect("same length"), 1.0));
    assert!(approx(cosine_similarity(&v, &neg).expect("same length"), -1.0));
    assert!(approx(
        cosine_similarity(&v, &w).expect("same length"),
        cosine_similarity(&w, &v).expect("same length")
    ));
}

#[test]
fn cosine_zero_vector_is_zero() {
    let similarity = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).expect("same length");
    assert_eq!(similarity, 0.0);
}

#[test]
fn cosine_rejects_mismatched_and_empty_vectors() {
    let result = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));

    assert!(cosine_similarity(&[], &[]).is_err());
}

#[test]
fn search_keeps_best_chunk_per_document() {
    let index = sample_index();
    let results = search(&[1.0, 0.2, 0.0], &index, 10, DEFAULT_SIMILARITY_THRESHOLD)
        .expect("search should succeed");

    let ids: Vec<&str> = results.iter().map(|r| r.metadata.chunk_id.as_str()).collect();
    // document 3 only clears the threshold through its second chunk
    assert_eq!(ids, vec!["1_1", "2_2", "3_2"]);

    let distances: Vec<f32> = results.iter().map(|r| r.distance).collect();
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(approx(results[0].similarity(), 1.0 / 1.04_f32.sqrt()));
}

#[test]
fn search_drops_scores_at_or_below_threshold() {
    let index = sample_index();
    let results = search(&[1.0, 0.0, 0.0], &index, 10, DEFAULT_SIMILARITY_THRESHOLD)
        .expect("search should succeed");

    // doc 3 is orthogonal to the query
    let documents: Vec<u32> = results.iter().map(|r| r.metadata.document_id).collect();
    assert_eq!(documents, vec![1, 2]);

    let none = search(&[1.0, 0.0, 0.0], &index, 10, 1.0).expect("search should succeed");
    assert!(none.is_empty());
}

#[test]
fn search_truncates_to_k() {
    let index = sample_index();
    let query = [1.0, 1.0, 1.0];

    let top = search(&query, &index, 1, DEFAULT_SIMILARITY_THRESHOLD).expect("search");
    assert_eq!(top.len(), 1);

    let all = search(&query, &index, 50, DEFAULT_SIMILARITY_THRESHOLD).expect("search");
    assert_eq!(all.len(), 3);

    let zero = search(&query, &index, 0, DEFAULT_SIMILARITY_THRESHOLD).expect("search");
    assert!(zero.is_empty());
}

#[test]
fn search_ties_prefer_earliest_chunk() {
    let index = vec![
        doc(7, 1, vec![0.0, 1.0]),
        doc(7, 2, vec![0.0, 1.0]),
        doc(7, 3, vec![0.0, 1.0]),
    ];
    let results = search(&[0.0, 2.0], &index, 5, DEFAULT_SIMILARITY_THRESHOLD).expect("search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].metadata.chunk_id, "7_1");
}

#[test]
fn search_on_empty_index_returns_nothing() {
    let results = search(&[1.0, 0.0], &[], 5, DEFAULT_SIMILARITY_THRESHOLD).expect("search");
    assert!(results.is_empty());

    let results = exhaustive(&[1.0, 0.0], &[]).expect("exhaustive");
    assert!(results.is_empty());
}

#[test]
fn search_reports_dimension_mismatch() {
    let index = sample_index();
    let result = search(&[1.0, 0.0], &index, 5, DEFAULT_SIMILARITY_THRESHOLD);
    assert!(matches!(result, Err(RagError::DimensionMismatch { .. })));
}

#[test]
fn exhaustive_returns_every_chunk_in_order() {
    let index = sample_index();
    let results = exhaustive(&[1.0, 0.0, 0.0], &index).expect("exhaustive");

    assert_eq!(results.len(), index.len());
    let ids: Vec<&str> = results.iter().map(|r| r.metadata.chunk_id.as_str()).collect();
    // the three orthogonal chunks tie at zero and keep index order
    assert_eq!(ids, vec!["1_1", "1_2", "2_2", "2_1", "3_1", "3_2"]);
}

#[test]
fn nan_scores_do_not_disturb_ordering() {
    let index = vec![
        doc(1, 1, vec![0.0, 1.0]),
        doc(2, 1, vec![f32::NAN, 1.0]),
        doc(3, 1, vec![1.0, 0.0]),
        doc(4, 1, vec![0.6, 0.8]),
    ];

    let all = exhaustive(&[1.0, 0.0], &index).expect("exhaustive");
    assert_eq!(all.len(), 4);
    let finite: Vec<&str> = all
        .iter()
        .filter(|r| !r.distance.is_nan())
        .map(|r| r.metadata.chunk_id.as_str())
        .collect();
    assert_eq!(finite, vec!["3_1", "4_1", "1_1"]);

    let results = search(&[1.0, 0.0], &index, 10, DEFAULT_SIMILARITY_THRESHOLD).expect("search");
    let documents: Vec<u32> = results.iter().map(|r| r.metadata.document_id).collect();
    assert_eq!(documents, vec![3, 4]);
}

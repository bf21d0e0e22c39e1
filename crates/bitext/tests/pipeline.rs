use std::sync::atomic::{AtomicUsize, Ordering};

use bitext::{
    AlignmentState, BitextError, Book, Chapter, CheckpointStore, CombinedBook, Pipeline,
    PipelineConfig, Result, SimilarityScorer,
};

/// Paragraphs look like "L<chapter>.<n>" on the left and "R<chapter>.<n>"
/// on the right.
fn chapter(side: char, id: &str, paragraphs: usize) -> Chapter {
    Chapter::from_texts(
        format!("{side}{id}"),
        (0..paragraphs).map(|i| format!("{side}{id}.{i}")),
    )
}

fn chapter_of(text: &str) -> Option<&str> {
    text.get(1..).and_then(|t| t.split('.').next())
}

/// Abstracts match when they open the same chapter id, paragraphs when
/// they carry the same id and number.
fn score(a: &str, b: &str) -> f32 {
    let same = if a.contains(' ') && b.contains(' ') {
        chapter_of(a) == chapter_of(b)
    } else {
        a.get(1..) == b.get(1..)
    };
    if same { 0.95 } else { 0.1 }
}

fn healthy_books() -> (Book, Book) {
    (
        Book::new("en-book", vec![chapter('L', "0", 6), chapter('L', "2", 3)]),
        Book::new("zh-book", vec![chapter('R', "0", 6), chapter('R', "2", 3)]),
    )
}

/// Chapter 1 on the right has nothing in common with its left partner
/// beyond the abstract's chapter id.
fn divergent_books() -> (Book, Book) {
    (
        Book::new("en-book", vec![chapter('L', "0", 6), chapter('L', "1", 4)]),
        Book::new(
            "zh-book",
            vec![
                chapter('R', "0", 6),
                Chapter::from_texts("R1", (0..30).map(|i| format!("R1.x{i}"))),
            ],
        ),
    )
}

#[test]
fn full_run_aligns_every_pair_and_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> { Ok(score(a, b)) });
    let (mut left, right) = healthy_books();

    let pipeline = Pipeline::new(&scorer, PipelineConfig::default())
        .unwrap()
        .with_checkpoints(&store);
    let mut matcher = pipeline.open_matcher(&left, &right).unwrap();
    let report = pipeline.run(&mut left, &right, &mut matcher).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.matched_pairs, 2);
    assert_eq!(report.aligned_pairs, 2);
    assert!(left.chapters.iter().all(Chapter::is_aligned));
    assert!(store.book_path(&left).is_file());
    assert!(store.matcher_path(&left, &right).is_file());

    let sections: Vec<&str> = report.timings.iter().map(|t| t.section).collect();
    assert_eq!(sections, vec!["align_chapter", "match_chapters"]);
    assert_eq!(report.timings[0].calls, 2);

    let combined = CombinedBook::build(&left, &right, matcher.matches());
    assert_eq!(combined.chapters.len(), 2);
    assert_eq!(combined.chapters[0].paragraphs[3].subjects, vec!["R0.3"]);
}

#[test]
fn resumed_run_skips_finished_work() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    {
        let scorer =
            SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> { Ok(score(a, b)) });
        let (mut left, right) = healthy_books();
        let pipeline = Pipeline::new(&scorer, PipelineConfig::default())
            .unwrap()
            .with_checkpoints(&store);
        let mut matcher = pipeline.open_matcher(&left, &right).unwrap();
        pipeline.run(&mut left, &right, &mut matcher).unwrap();
    }

    let calls = AtomicUsize::new(0);
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(score(a, b))
    });
    let (fresh, right) = healthy_books();
    let mut left = store.load_book(&fresh).unwrap().unwrap();
    let pipeline = Pipeline::new(&scorer, PipelineConfig::default())
        .unwrap()
        .with_checkpoints(&store);
    let mut matcher = pipeline.open_matcher(&left, &right).unwrap();
    assert!(matcher.is_finished());

    let report = pipeline.run(&mut left, &right, &mut matcher).unwrap();
    assert_eq!(report.skipped_pairs, 2);
    assert_eq!(report.aligned_pairs, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn realign_reproduces_the_same_assignment() {
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> { Ok(score(a, b)) });
    let (mut left, right) = healthy_books();
    let pipeline = Pipeline::new(&scorer, PipelineConfig::default()).unwrap();
    let mut matcher = pipeline.open_matcher(&left, &right).unwrap();
    pipeline.run(&mut left, &right, &mut matcher).unwrap();
    let first = left.clone();

    let pipeline = Pipeline::new(&scorer, PipelineConfig::new().with_realign(true)).unwrap();
    let report = pipeline.run(&mut left, &right, &mut matcher).unwrap();

    assert_eq!(report.aligned_pairs, 2);
    assert_eq!(report.skipped_pairs, 0);
    assert_eq!(left, first);
}

#[test]
fn bad_aligned_pair_is_reported_and_stays_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> { Ok(score(a, b)) });
    let (mut left, right) = divergent_books();

    let pipeline = Pipeline::new(&scorer, PipelineConfig::default())
        .unwrap()
        .with_checkpoints(&store);
    let mut matcher = pipeline.open_matcher(&left, &right).unwrap();
    let report = pipeline.run(&mut left, &right, &mut matcher).unwrap();

    assert_eq!(report.matched_pairs, 2);
    assert_eq!(report.aligned_pairs, 1);
    assert_eq!(report.bad_aligned.len(), 1);
    assert_eq!(report.bad_aligned[0].left.name, "L1");
    assert_eq!(report.bad_aligned[0].right.name, "R1");
    assert_eq!(left.chapters[1].alignment, AlignmentState::BadAligned);

    let mut restored = store.load_book(&divergent_books().0).unwrap().unwrap();
    let report = pipeline.run(&mut restored, &right, &mut matcher).unwrap();
    assert_eq!(report.skipped_pairs, 1);
    assert_eq!(report.aligned_pairs, 0);
    assert_eq!(report.bad_aligned.len(), 1);

    let combined = CombinedBook::build(&restored, &right, matcher.matches());
    assert_eq!(combined.chapters.len(), 1);
    assert_eq!(combined.bad_aligned[0].name, "L1");
}

#[test]
fn scorer_failure_aborts_the_run() {
    let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> {
        Err(BitextError::Similarity("model unavailable".into()))
    });
    let (mut left, right) = healthy_books();
    let pipeline = Pipeline::new(&scorer, PipelineConfig::default()).unwrap();
    let mut matcher = pipeline.open_matcher(&left, &right).unwrap();

    let err = pipeline.run(&mut left, &right, &mut matcher).unwrap_err();
    assert!(matches!(err, BitextError::Similarity(_)));
    assert!(!matcher.is_finished());
}

#[test]
fn snapshot_for_other_books_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> { Ok(score(a, b)) });
    let (left, right) = healthy_books();
    let pipeline = Pipeline::new(&scorer, PipelineConfig::default())
        .unwrap()
        .with_checkpoints(&store);

    let matcher = pipeline.open_matcher(&left, &right).unwrap();
    store.save_matcher(&left, &right, &matcher).unwrap();

    // Same titles, so the same checkpoint file; one chapter more.
    let mut grown = right.clone();
    grown.chapters.push(chapter('R', "9", 2));
    assert_eq!(store.matcher_path(&left, &grown), store.matcher_path(&left, &right));

    assert!(matches!(
        pipeline.open_matcher(&left, &grown),
        Err(BitextError::InvalidSnapshot(_))
    ));
}

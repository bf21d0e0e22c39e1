use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use bitext_core::{
    AlignConfig, AlignmentState, Chapter, ParagraphAligner, Result, SimilarityScorer, SubjectRef,
};

/// Left paragraphs look like "L<n>", right ones like "R<n>"; a right
/// paragraph matches the left paragraph named by `target`.
fn numbered(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn index_of(text: &str) -> Option<usize> {
    text.get(1..).and_then(|n| n.parse().ok())
}

#[test]
fn hello_world_pair_is_aligned() {
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
        Ok(match (a, b) {
            ("Hello.", "你好。") | ("World.", "世界。") => 0.95,
            _ => 0.1,
        })
    });
    let mut left = Chapter::from_texts("en.xhtml", ["Hello.", "World."]);
    let right = Chapter::from_texts("zh.xhtml", ["你好。", "世界。"]);

    let outcome = ParagraphAligner::default()
        .align(&mut left, &right, 3, &scorer)
        .unwrap();

    assert_eq!(outcome.state, AlignmentState::Aligned);
    assert_eq!(left.alignment, AlignmentState::Aligned);
    assert_eq!(left.paragraphs[0].subjects, vec![SubjectRef::new(3, 0)]);
    assert_eq!(left.paragraphs[0].align_score, 0.95);
    assert_eq!(left.paragraphs[1].subjects, vec![SubjectRef::new(3, 1)]);
    assert_eq!(left.paragraphs[1].align_score, 0.95);
}

#[test]
fn every_right_paragraph_is_attached_exactly_once() {
    // Right edition drops, splits and inserts paragraphs; trivial ones must
    // not be counted.
    let mut right_texts = Vec::new();
    for i in 0..40 {
        right_texts.push(format!("R{}", i * 3 / 4));
        if i % 7 == 0 {
            right_texts.push("*".to_string());
            right_texts.push("Xnote".to_string());
        }
    }
    let right = Chapter::from_texts("r", right_texts);
    let mut left = Chapter::from_texts("l", numbered("L", 30));

    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
        let same = a.starts_with('L') && b.starts_with('R') && index_of(a) == index_of(b);
        Ok(if same { 0.9 } else { 0.05 })
    });

    let outcome = ParagraphAligner::default()
        .align(&mut left, &right, 0, &scorer)
        .unwrap();

    let alignable = right.paragraphs.iter().filter(|p| p.is_alignable()).count();
    let attached: Vec<SubjectRef> = left
        .paragraphs
        .iter()
        .flat_map(|p| p.subjects.iter().copied())
        .collect();
    let distinct: HashSet<SubjectRef> = attached.iter().copied().collect();

    assert_eq!(outcome.state, AlignmentState::Aligned);
    assert_eq!(attached.len(), alignable);
    assert_eq!(distinct.len(), alignable);
    assert_eq!(outcome.attached, alignable);
    assert!(attached.iter().all(|s| right.paragraphs[s.paragraph].is_alignable()));
}

#[test]
fn hopeless_pair_ends_bad_aligned() {
    let calls = AtomicUsize::new(0);
    let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(0.1)
    });
    let mut left = Chapter::from_texts("l", numbered("L", 4));
    let right = Chapter::from_texts("r", numbered("R", 30));

    let outcome = ParagraphAligner::default()
        .align(&mut left, &right, 0, &scorer)
        .unwrap();

    assert_eq!(outcome.state, AlignmentState::BadAligned);
    assert!(outcome.used_fallback);
    assert!(left.is_bad_aligned());
    assert!(left.paragraphs.iter().all(|p| p.subjects.is_empty()));
    // Only 4 x 30 distinct pairs exist.
    assert!(calls.load(Ordering::SeqCst) <= 120);
}

#[test]
fn short_hopeless_pair_still_attaches_everything() {
    let scorer = SimilarityScorer::new(|_: &str, _: &str| -> Result<f32> { Ok(0.1) });
    let mut left = Chapter::from_texts("l", numbered("L", 4));
    let right = Chapter::from_texts("r", numbered("R", 8));

    let outcome = ParagraphAligner::default()
        .align(&mut left, &right, 0, &scorer)
        .unwrap();

    assert_eq!(outcome.state, AlignmentState::Aligned);
    assert_eq!(outcome.matched, 0);
    assert_eq!(left.paragraphs[3].subjects.len(), 8);
}

#[test]
fn stuck_aligner_falls_back_to_half_chapter_search() {
    // Fourteen untranslatable paragraphs, then one that belongs 15
    // paragraphs further down: beyond the widest window, within the
    // half-chapter search.
    let mut right_texts: Vec<String> = (0..14).map(|i| format!("X{i}")).collect();
    right_texts.push("R15".to_string());
    let right = Chapter::from_texts("r", right_texts);
    let mut left = Chapter::from_texts("l", numbered("L", 40));

    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
        Ok(if b.starts_with('R') && index_of(a) == index_of(b) { 0.9 } else { 0.0 })
    });

    let outcome = ParagraphAligner::default()
        .align(&mut left, &right, 0, &scorer)
        .unwrap();

    assert_eq!(outcome.state, AlignmentState::Aligned);
    assert!(outcome.used_fallback);
    assert_eq!(outcome.matched, 1);
    assert_eq!(left.paragraphs[15].subjects, vec![SubjectRef::new(0, 14)]);
    assert_eq!(left.paragraphs[14].subjects.len(), 14);
}

#[test]
fn scorer_is_called_once_per_distinct_pair() {
    let calls = AtomicUsize::new(0);
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(if index_of(a) == index_of(b) { 0.9 } else { 0.2 })
    });
    let mut left = Chapter::from_texts("l", numbered("L", 12));
    let right = Chapter::from_texts("r", numbered("R", 12));
    let aligner = ParagraphAligner::default();

    aligner.align(&mut left, &right, 0, &scorer).unwrap();
    let first_run = calls.load(Ordering::SeqCst);
    assert_eq!(first_run, scorer.cached_pairs());

    left.reset();
    aligner.align(&mut left, &right, 0, &scorer).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), first_run);
}

#[test]
fn reset_then_realign_reproduces_assignment() {
    let scorer = SimilarityScorer::new(|a: &str, b: &str| -> Result<f32> {
        let (Some(l), Some(r)) = (index_of(a), index_of(b)) else {
            return Ok(0.0);
        };
        Ok(if l == r / 2 { 0.8 } else { 0.3 })
    });
    let mut left = Chapter::from_texts("l", numbered("L", 10));
    let right = Chapter::from_texts("r", numbered("R", 20));
    let aligner = ParagraphAligner::new(AlignConfig::default()).unwrap();

    aligner.align(&mut left, &right, 2, &scorer).unwrap();
    let first = left.clone();

    left.reset();
    assert_eq!(left.alignment, AlignmentState::NotAligned);
    assert!(left.paragraphs.iter().all(|p| p.subjects.is_empty()));

    aligner.align(&mut left, &right, 2, &scorer).unwrap();
    assert_eq!(left, first);
}

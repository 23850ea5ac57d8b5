use paper_explainer::error::ExplainError;
use paper_explainer::segmenter::{Segment, SegmentPlan, segment};

mod common;

fn assert_well_formed(text: &str, segs: &[Segment], chunk_size: usize, overlap: usize) {
    assert!(!segs.is_empty());
    assert_eq!(segs[0].start, 0);
    assert_eq!(segs.last().unwrap().end, text.len());

    for (i, s) in segs.iter().enumerate() {
        assert_eq!(s.index, i);
        assert_eq!(s.text, &text[s.start..s.end]);
        assert!(s.char_len() <= chunk_size, "segment {i} has {} chars", s.char_len());
    }

    let mut rebuilt = segs[0].text.clone();
    for pair in segs.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert!(next.start > prev.start, "segments out of order");
        assert!(next.end > prev.end, "segment adds nothing");
        assert!(next.start <= prev.end, "gap between segments");
        let shared = text[next.start..prev.end].chars().count();
        assert!(shared <= overlap, "overlap {shared} > {overlap}");
        rebuilt.push_str(&text[prev.end..next.end]);
    }
    assert_eq!(rebuilt, text);
}

#[test]
fn reconstructs_source_text() {
    let text = common::paper_text(9_000);
    for (size, overlap) in [(2000, 200), (4000, 400), (500, 0), (120, 60)] {
        let segs = segment(&text, size, overlap).unwrap();
        assert_well_formed(&text, &segs, size, overlap);
    }
}

#[test]
fn nine_thousand_chars_make_five_fine_segments() {
    let text = "abcd ".repeat(1800);
    assert_eq!(text.chars().count(), 9_000);

    let segs = segment(&text, 2000, 200).unwrap();
    assert_eq!(segs.len(), 5);
    assert_well_formed(&text, &segs, 2000, 200);

    let coarse = segment(&text, 4000, 400).unwrap();
    assert_eq!(coarse.len(), 3);
}

#[test]
fn consecutive_segments_share_a_tail() {
    let text = "abcd ".repeat(1800);
    let segs = segment(&text, 2000, 200).unwrap();
    let shared = &text[segs[1].start..segs[0].end];
    assert_eq!(shared.chars().count(), 200);
    assert!(segs[0].text.ends_with(shared));
    assert!(segs[1].text.starts_with(shared));
}

#[test]
fn prefers_paragraph_boundaries() {
    let para = "word ".repeat(300);
    let text = format!("{para}\n\n{para}");

    let segs = segment(&text, 2000, 0).unwrap();
    assert_eq!(segs.len(), 2);
    assert!(segs[0].text.ends_with("\n\n"));
    assert_eq!(segs[1].text, para);
}

#[test]
fn hard_cuts_text_without_separators() {
    let text = "é".repeat(5_000);
    let segs = segment(&text, 2000, 200).unwrap();
    assert_eq!(segs.len(), 3);
    assert_eq!(segs[0].char_len(), 2000);
    assert_eq!(segs[2].char_len(), 1000);
    assert_well_formed(&text, &segs, 2000, 200);
}

#[test]
fn short_text_is_one_segment() {
    let segs = segment("A short abstract.", 2000, 200).unwrap();
    assert_eq!(segs.len(), 1);
    assert_eq!(segs[0].text, "A short abstract.");

    let segs = segment(" ", 10, 2).unwrap();
    assert_eq!(segs.len(), 1);
}

#[test]
fn empty_text_has_no_segments() {
    assert!(segment("", 2000, 200).unwrap().is_empty());
}

#[test]
fn rejects_invalid_parameters() {
    for (size, overlap) in [(0, 0), (100, 100), (100, 150)] {
        let err = segment("some text", size, overlap).unwrap_err();
        assert!(
            matches!(err, ExplainError::InvalidParameters { chunk_size, overlap: o } if chunk_size == size && o == overlap),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn plan_reports_spans() {
    let text = "abcd ".repeat(1800);
    let plan = SegmentPlan::build(&text, 2000, 200).unwrap();
    assert_eq!(plan.total_chars, 9_000);
    assert_eq!(plan.segments.len(), 5);
    assert!(plan.segments.iter().all(|s| s.chars <= 2000));
    assert_eq!(plan.segments[4].end, text.len());
}

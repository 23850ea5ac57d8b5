use crate::error::{ExplainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Boundaries tried in order: paragraph, line, sentence, word.
/// Below the last one the text is cut at a fixed character count.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "? ", "! ", " "];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    /// Byte offsets into the source text, end exclusive.
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Segment {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Serializable view of a segmentation, printed by `paper-explainer segment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub chunk_size: usize,
    pub overlap: usize,
    pub total_chars: usize,
    pub segments: Vec<SegmentSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSpan {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub chars: usize,
}

impl SegmentPlan {
    pub fn build(text: &str, chunk_size: usize, overlap: usize) -> Result<Self> {
        let segments = segment(text, chunk_size, overlap)?;
        Ok(Self {
            chunk_size,
            overlap,
            total_chars: text.chars().count(),
            segments: segments
                .iter()
                .map(|s| SegmentSpan {
                    index: s.index,
                    start: s.start,
                    end: s.end,
                    chars: s.char_len(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

/// Split `text` into ordered segments of at most `chunk_size` characters,
/// consecutive segments sharing at most `overlap` characters.
///
/// Pieces are carved at the coarsest boundary that makes them fit, then
/// greedily packed; the tail of each segment (whole pieces, up to `overlap`
/// characters) is carried into the next one. Segments are exact slices of
/// `text`, so dropping each segment's overlap and concatenating restores it.
pub fn segment(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Segment>> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(ExplainError::InvalidParameters {
            chunk_size,
            overlap,
        });
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut pieces = Vec::new();
    split_recursive(text, 0, SEPARATORS, chunk_size, &mut pieces);
    Ok(merge(text, &pieces, chunk_size, overlap))
}

fn split_recursive(
    text: &str,
    base: usize,
    separators: &[&str],
    chunk_size: usize,
    out: &mut Vec<Piece>,
) {
    let chars = text.chars().count();
    if chars <= chunk_size {
        out.push(Piece {
            start: base,
            end: base + text.len(),
            chars,
        });
        return;
    }

    let Some(pos) = separators.iter().position(|sep| text.contains(sep)) else {
        hard_cut(text, base, chunk_size, out);
        return;
    };

    let sep = separators[pos];
    let finer = &separators[pos + 1..];
    let mut offset = 0;
    for part in text.split_inclusive(sep) {
        split_recursive(part, base + offset, finer, chunk_size, out);
        offset += part.len();
    }
}

fn hard_cut(text: &str, base: usize, chunk_size: usize, out: &mut Vec<Piece>) {
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            out.push(Piece {
                start: base + start,
                end: base + idx,
                chars: count,
            });
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        out.push(Piece {
            start: base + start,
            end: base + text.len(),
            chars: count,
        });
    }
}

fn merge(text: &str, pieces: &[Piece], chunk_size: usize, overlap: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut window: VecDeque<Piece> = VecDeque::new();
    let mut window_chars = 0usize;

    for &piece in pieces {
        if !window.is_empty() && window_chars + piece.chars > chunk_size {
            emit(text, &window, &mut segments);
            // Keep a tail no longer than `overlap` that still leaves room for `piece`.
            while window_chars > overlap || (window_chars > 0 && window_chars + piece.chars > chunk_size)
            {
                if let Some(front) = window.pop_front() {
                    window_chars -= front.chars;
                }
            }
        }
        window_chars += piece.chars;
        window.push_back(piece);
    }

    if !window.is_empty() {
        emit(text, &window, &mut segments);
    }
    segments
}

fn emit(text: &str, window: &VecDeque<Piece>, segments: &mut Vec<Segment>) {
    let (Some(first), Some(last)) = (window.front(), window.back()) else {
        return;
    };
    segments.push(Segment {
        index: segments.len(),
        start: first.start,
        end: last.end,
        text: text[first.start..last.end].to_string(),
    });
}

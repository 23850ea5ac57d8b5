use crate::aspect::{AspectName, AspectResultSet};
use crate::segmenter::Segment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Prerequisites,
    Explanation,
    Examples,
    MathematicalConcepts,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Prerequisites => "Prerequisites",
            SectionKind::Explanation => "Explanation",
            SectionKind::Examples => "Examples",
            SectionKind::MathematicalConcepts => "Mathematical Concepts",
        }
    }
}

/// Per-segment section order.
const SECTION_ORDER: [(AspectName, SectionKind); 4] = [
    (AspectName::Prerequisites, SectionKind::Prerequisites),
    (AspectName::MainExplanation, SectionKind::Explanation),
    (AspectName::Examples, SectionKind::Examples),
    (AspectName::MathConcepts, SectionKind::MathematicalConcepts),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBlock {
    pub index: usize,
    pub text: String,
    pub sections: Vec<Section>,
}

impl SegmentBlock {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub summary: String,
    pub blocks: Vec<SegmentBlock>,
    pub similar_papers: Option<String>,
}

/// Merge summary, segments and aspect results into one ordered document.
///
/// Math sections whose content is blank after trimming are dropped even
/// though the aspect ran.
///
/// # Panics
///
/// If a per-segment result does not have exactly one entry per segment.
pub fn assemble(summary: &str, results: &AspectResultSet, segments: &[Segment]) -> AssembledDocument {
    for (name, _) in SECTION_ORDER {
        if let Some(v) = results.per_segment(name) {
            assert_eq!(
                v.len(),
                segments.len(),
                "{name} has {} results for {} segments",
                v.len(),
                segments.len()
            );
        }
    }

    let blocks = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let sections = SECTION_ORDER
                .iter()
                .filter_map(|&(name, kind)| {
                    let content = results.per_segment(name)?.get(i)?;
                    if kind == SectionKind::MathematicalConcepts && content.trim().is_empty() {
                        return None;
                    }
                    Some(Section {
                        kind,
                        content: content.clone(),
                    })
                })
                .collect();
            SegmentBlock {
                index: i,
                text: seg.text.clone(),
                sections,
            }
        })
        .collect();

    AssembledDocument {
        summary: summary.to_string(),
        blocks,
        similar_papers: results
            .global(AspectName::SimilarPapers)
            .map(str::to_string),
    }
}

impl AssembledDocument {
    /// Markdown with `# Paper Summary`, `## Chunk N` and `### <Section>`
    /// headings; consumers split on these markers.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Paper Summary\n\n{}\n\n", self.summary);

        for block in &self.blocks {
            out.push_str(&format!("\n\n## Chunk {}\n\n", block.index + 1));
            out.push_str(&format!("{}\n\n", block.text));
            for section in &block.sections {
                out.push_str(&format!("### {}\n\n{}\n\n", section.kind.title(), section.content));
            }
        }

        if let Some(similar) = &self.similar_papers {
            out.push_str(&format!("# Similar Papers\n\n{}\n\n", similar));
        }
        out
    }

    pub fn omitted_math_sections(&self, results: &AspectResultSet) -> usize {
        if !results.contains(AspectName::MathConcepts) {
            return 0;
        }
        self.blocks
            .iter()
            .filter(|b| b.section(SectionKind::MathematicalConcepts).is_none())
            .count()
    }
}

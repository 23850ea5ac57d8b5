use crate::config::Config;
use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Normalize raw extracted text before segmentation: running headers,
/// footers and page counters repeat on every page and would otherwise be
/// explained once per segment.
pub fn clean_text(cfg: &Config, raw: &str) -> Result<String> {
    let mut text = raw.to_string();

    if cfg.postprocess.normalize_newlines {
        text = text.replace("\r\n", "\n").replace('\r', "\n");
    }

    if cfg.postprocess.normalize_unicode {
        text = text.nfkc().collect::<String>();
    }

    text = sanitize_control_chars(&text, &cfg.postprocess.control_chars_to_sanitize);

    if cfg.postprocess.trim_trailing_whitespace {
        text = text
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
    }

    if cfg.postprocess.remove_repeated_lines {
        text = remove_repeated_lines(cfg, &text);
    }

    if cfg.postprocess.remove_by_regex {
        text = remove_by_regex(cfg, &text)?;
    }

    Ok(text)
}

fn sanitize_control_chars(s: &str, codes: &[u8]) -> String {
    if codes.is_empty() {
        return s.to_string();
    }

    let mut mask = [false; 128];
    for &code in codes {
        if (code as usize) < mask.len() {
            mask[code as usize] = true;
        }
    }

    s.chars()
        .filter(|&ch| {
            if ch == '\n' || ch == '\r' || ch == '\t' {
                return true;
            }
            let cp = ch as u32;
            if cp < 128 {
                !mask[cp as usize]
            } else {
                // C1 controls leak out of some PDF text layers.
                !(0x80..=0x9f).contains(&cp)
            }
        })
        .collect()
}

fn remove_repeated_lines(cfg: &Config, s: &str) -> String {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let lines: Vec<&str> = s.lines().collect();

    for &l in &lines {
        let l2 = l.trim();
        if l2.is_empty() || l2.len() > cfg.postprocess.repeated_line_max_length as usize {
            continue;
        }
        *counts.entry(l2).or_insert(0) += 1;
    }

    let min = cfg.postprocess.repeated_line_min_occurrences;
    lines
        .into_iter()
        .filter(|l| {
            let l2 = l.trim();
            l2.is_empty() || counts.get(l2).copied().unwrap_or(0) < min
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn remove_by_regex(cfg: &Config, s: &str) -> Result<String> {
    let regs: Vec<Regex> = cfg
        .postprocess
        .regex
        .patterns
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(s.lines()
        .filter(|line| !regs.iter().any(|r| r.is_match(line.trim())))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Plain-text rendering: drops the heading markers `to_markdown` writes and
/// leaves every other line as is.
pub fn markdown_to_text(md: &str) -> String {
    md.lines()
        .map(|l| {
            ["### ", "## ", "# "]
                .iter()
                .find_map(|marker| l.strip_prefix(marker))
                .unwrap_or(l)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

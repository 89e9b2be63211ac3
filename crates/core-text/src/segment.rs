//! Normalization + segmentation adapter.
//!
//! Input may come from a paste or IME burst, so everything entering the line
//! buffer is NFC-normalized first and then split into grapheme clusters. Each
//! [`Segment`] carries its byte range in the normalized string and a display
//! width from [`egc_width`](crate::egc_width). Does not log content.

use crate::egc_width;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cluster: String,
    pub start: usize, // byte offset in normalized string (inclusive)
    pub end: usize,   // byte offset in normalized string (exclusive)
    pub width: u16,
}

/// Normalize to NFC and segment into grapheme clusters with widths and byte ranges.
pub fn normalize_and_segment(input: &str) -> (String, Vec<Segment>) {
    let normalized: String = input.nfc().collect();
    let mut out = Vec::new();
    let mut byte = 0usize;
    for g in normalized.graphemes(true) {
        let len = g.len();
        out.push(Segment {
            cluster: g.to_string(),
            start: byte,
            end: byte + len,
            width: egc_width(g),
        });
        byte += len;
    }
    (normalized, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_equivalence_single_cluster() {
        let (n1, s1) = normalize_and_segment("e\u{0301}");
        let (n2, s2) = normalize_and_segment("\u{00E9}");
        assert_eq!(n1, n2);
        assert_eq!(s1.len(), 1);
        assert_eq!(s2.len(), 1);
        assert_eq!(s1[0].cluster, "\u{00E9}");
        assert_eq!(s1[0].width, 1);
    }

    #[test]
    fn ranges_are_contiguous_and_cover_input() {
        let s = "漢😀👨\u{200D}👩\u{200D}👧a";
        let (normalized, segs) = normalize_and_segment(s);
        assert_eq!(segs.len(), 4);
        let mut prev_end = 0usize;
        let mut join = String::new();
        for seg in &segs {
            assert_eq!(seg.start, prev_end);
            assert!(seg.end > seg.start);
            prev_end = seg.end;
            join.push_str(&seg.cluster);
        }
        assert_eq!(prev_end, normalized.len());
        assert_eq!(join, normalized);
        let widths: Vec<u16> = segs.iter().map(|s| s.width).collect();
        assert_eq!(widths, vec![2, 2, 2, 1]);
    }

    #[test]
    fn empty_input_has_no_segments() {
        let (n, segs) = normalize_and_segment("");
        assert!(n.is_empty());
        assert!(segs.is_empty());
    }
}

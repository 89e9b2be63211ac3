//! Grapheme cluster display width.
//!
//! Every width decision for the prompt line flows through [`egc_width`]. The
//! renderer positions the terminal cursor from these widths, so the policy
//! favors over-estimation for emoji composites: an extra blank cell is
//! harmless, an under-estimate makes the cursor drift left of the caret.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

// Rough Extended Pictographic heuristic (main emoji blocks + misc symbols/dingbats).
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

/// Return the display column width for a single grapheme cluster.
///
/// Precondition: `egc` is one grapheme cluster (callers segment first).
/// Empty input returns 0; control characters count as 0.
#[inline]
pub fn egc_width(egc: &str) -> u16 {
    let mut chars = egc.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    let single = chars.next().is_none();

    if single {
        if first.is_ascii() {
            return if first.is_ascii_control() { 0 } else { 1 };
        }
        if is_extended_pictographic(first) {
            // Text-presentation symbols in the misc block stay narrow without VS16.
            return UnicodeWidthChar::width(first).unwrap_or(1).max(1) as u16;
        }
        return UnicodeWidthChar::width(first).unwrap_or(0) as u16;
    }

    let mut pictographic = 0usize;
    let mut regional = 0usize;
    let mut has_zwj = false;
    let mut has_vs16 = false;
    for c in egc.chars() {
        if is_extended_pictographic(c) {
            pictographic += 1;
        }
        if is_regional_indicator(c) {
            regional += 1;
        }
        has_zwj |= c == ZWJ;
        has_vs16 |= c == VS16;
    }

    if regional == 2 || (has_zwj && pictographic >= 2) || (pictographic >= 1 && has_vs16) {
        return 2;
    }

    // Base + combining marks: the base decides.
    let base = UnicodeWidthChar::width(first).unwrap_or(1) as u16;
    base.max(UnicodeWidthStr::width(egc).min(2) as u16).clamp(1, 2)
}

//! Line-based diff between a template and a target, with color policies.
//!
//! Lines are aligned on their longest common subsequence. Every line of
//! both inputs appears exactly once in the output, tagged as added (target
//! only), removed (template only) or unchanged.

use serde::{Deserialize, Serialize};

/// Tag of a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffTag {
    /// Present only in the target.
    Added,
    /// Present only in the template.
    Removed,
    /// Present in both.
    Unchanged,
}

impl DiffTag {
    /// Unified diff prefix.
    pub fn prefix(&self) -> char {
        match self {
            DiffTag::Added => '+',
            DiffTag::Removed => '-',
            DiffTag::Unchanged => ' ',
        }
    }
}

/// One tagged line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

/// Full line diff of a template/target pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub lines: Vec<DiffLine>,
}

impl DiffReport {
    /// Lines with a given tag, in order.
    pub fn tagged(&self, tag: DiffTag) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(move |l| l.tag == tag)
    }

    /// Number of added lines.
    pub fn added_count(&self) -> usize {
        self.tagged(DiffTag::Added).count()
    }

    /// Number of removed lines.
    pub fn removed_count(&self) -> usize {
        self.tagged(DiffTag::Removed).count()
    }

    /// Whether the two inputs differ at all.
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|l| l.tag != DiffTag::Unchanged)
    }

    /// Template line sequence (unchanged and removed lines).
    pub fn template_lines(&self) -> Vec<&str> {
        self.side(DiffTag::Removed)
    }

    /// Target line sequence (unchanged and added lines).
    pub fn target_lines(&self) -> Vec<&str> {
        self.side(DiffTag::Added)
    }

    /// Common subsequence (unchanged lines).
    pub fn common_lines(&self) -> Vec<&str> {
        self.tagged(DiffTag::Unchanged).map(|l| l.text.as_str()).collect()
    }

    fn side(&self, own: DiffTag) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.tag == own || l.tag == DiffTag::Unchanged)
            .map(|l| l.text.as_str())
            .collect()
    }

    /// Render as unified diff text with `context` lines around each hunk.
    ///
    /// Returns an empty string when the inputs are identical.
    pub fn unified(&self, from_name: &str, to_name: &str, context: usize) -> String {
        let changed: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.tag != DiffTag::Unchanged)
            .map(|(i, _)| i)
            .collect();

        if changed.is_empty() {
            return String::new();
        }

        // Line numbers on each side before every diff line.
        let mut positions = Vec::with_capacity(self.lines.len() + 1);
        let (mut old, mut new) = (0usize, 0usize);
        for line in &self.lines {
            positions.push((old, new));
            match line.tag {
                DiffTag::Added => new += 1,
                DiffTag::Removed => old += 1,
                DiffTag::Unchanged => {
                    old += 1;
                    new += 1;
                }
            }
        }
        positions.push((old, new));

        let mut hunks: Vec<(usize, usize)> = Vec::new();
        for &idx in &changed {
            let start = idx.saturating_sub(context);
            let end = idx
                .saturating_add(context)
                .saturating_add(1)
                .min(self.lines.len());
            match hunks.last_mut() {
                Some(last) if start <= last.1 => last.1 = end,
                _ => hunks.push((start, end)),
            }
        }

        let mut out = format!("--- {}\n+++ {}\n", from_name, to_name);
        for (start, end) in hunks {
            let (old_start, new_start) = positions[start];
            let (old_end, new_end) = positions[end];
            out.push_str(&format!(
                "@@ -{} +{} @@\n",
                format_range(old_start, old_end - old_start),
                format_range(new_start, new_end - new_start)
            ));
            for line in &self.lines[start..end] {
                out.push(line.tag.prefix());
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        out
    }
}

fn format_range(start: usize, length: usize) -> String {
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

/// Compute the line diff of `template_text` against `target_text`.
pub fn render_diff(template_text: &str, target_text: &str) -> DiffReport {
    let old: Vec<&str> = template_text.lines().collect();
    let new: Vec<&str> = target_text.lines().collect();

    // Shared prefix and suffix need no LCS table.
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut lines = Vec::with_capacity(old.len().max(new.len()));
    lines.extend(old[..prefix].iter().map(|l| line(DiffTag::Unchanged, l)));
    diff_middle(old_mid, new_mid, &mut lines);
    lines.extend(
        old[old.len() - suffix..]
            .iter()
            .map(|l| line(DiffTag::Unchanged, l)),
    );

    DiffReport { lines }
}

fn line(tag: DiffTag, text: &str) -> DiffLine {
    DiffLine {
        tag,
        text: text.to_string(),
    }
}

/// Largest LCS table built in one piece. Bigger inputs are split first.
const TABLE_CELLS: usize = 1 << 22;

fn diff_middle(old: &[&str], new: &[&str], out: &mut Vec<DiffLine>) {
    diff_split(old, new, out, TABLE_CELLS);
}

/// Hirschberg split: halve `old`, find where the halves meet in `new` from
/// forward and backward LCS rows, and diff the two pieces. Memory stays
/// linear in the input outside the final tables of at most `table_cells`.
fn diff_split(old: &[&str], new: &[&str], out: &mut Vec<DiffLine>, table_cells: usize) {
    let (n, m) = (old.len(), new.len());
    if n <= 1 || m == 0 || (n + 1).saturating_mul(m + 1) <= table_cells {
        diff_table(old, new, out);
        return;
    }

    let mid = n / 2;
    let forward = lcs_row(&old[..mid], new);
    let old_back: Vec<&str> = old[mid..].iter().rev().copied().collect();
    let new_back: Vec<&str> = new.iter().rev().copied().collect();
    let backward = lcs_row(&old_back, &new_back);

    let split = (0..=m)
        .max_by_key(|&k| (forward[k] + backward[m - k], std::cmp::Reverse(k)))
        .unwrap_or(0);

    diff_split(&old[..mid], &new[..split], out, table_cells);
    diff_split(&old[mid..], &new[split..], out, table_cells);
}

/// `row[j]` = LCS length of `a` and `b[..j]`.
fn lcs_row(a: &[&str], b: &[&str]) -> Vec<u32> {
    let mut prev = vec![0u32; b.len() + 1];
    let mut cur = vec![0u32; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            cur[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

fn diff_table(old: &[&str], new: &[&str], out: &mut Vec<DiffLine>) {
    let (n, m) = (old.len(), new.len());
    let width = m + 1;

    // lcs[i * width + j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if old[i] == new[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            out.push(line(DiffTag::Unchanged, old[i]));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            out.push(line(DiffTag::Removed, old[i]));
            i += 1;
        } else {
            out.push(line(DiffTag::Added, new[j]));
            j += 1;
        }
    }
    out.extend(old[i..].iter().map(|l| line(DiffTag::Removed, l)));
    out.extend(new[j..].iter().map(|l| line(DiffTag::Added, l)));
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Mismatch (added lines).
    pub const RED: Rgb = Rgb(255, 0, 0);
    /// Match (removed lines).
    pub const DARK_GREEN: Rgb = Rgb(0, 128, 0);
    /// Full accuracy band.
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    /// Partial accuracy band.
    pub const YELLOW: Rgb = Rgb(255, 255, 0);

    /// Uppercase hex without `#`, as used in DOCX run colors.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// How diff lines are colored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Added lines red, removed lines green, unchanged uncolored.
    Tagged,
    /// Added lines colored by content accuracy: green at 100%, yellow at or
    /// above `warn_at`, red below. Other lines uncolored.
    AccuracyBanded { warn_at: f64 },
}

impl Default for ColorPolicy {
    fn default() -> Self {
        ColorPolicy::AccuracyBanded { warn_at: 0.8 }
    }
}

impl ColorPolicy {
    /// Color for a line with `tag`, given the pair's content accuracy.
    pub fn color(&self, tag: DiffTag, content_accuracy: f64) -> Option<Rgb> {
        match (self, tag) {
            (ColorPolicy::Tagged, DiffTag::Added) => Some(Rgb::RED),
            (ColorPolicy::Tagged, DiffTag::Removed) => Some(Rgb::DARK_GREEN),
            (ColorPolicy::AccuracyBanded { warn_at }, DiffTag::Added) => {
                Some(accuracy_band(content_accuracy, *warn_at))
            }
            _ => None,
        }
    }
}

/// Band color for an accuracy.
pub fn accuracy_band(content_accuracy: f64, warn_at: f64) -> Rgb {
    if content_accuracy == 1.0 {
        Rgb::GREEN
    } else if content_accuracy >= warn_at {
        Rgb::YELLOW
    } else {
        Rgb::RED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags(report: &DiffReport) -> Vec<DiffTag> {
        report.lines.iter().map(|l| l.tag).collect()
    }

    #[test]
    fn test_identical_texts() {
        let report = render_diff("a\nb\nc", "a\nb\nc");
        assert!(!report.has_changes());
        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.unified("t", "x", 3), "");
    }

    #[test]
    fn test_truncated_target_has_removed_lines() {
        let report = render_diff("invoice\nnumber\ndate\ntotal", "invoice\nnumber");
        assert_eq!(report.removed_count(), 2);
        assert_eq!(report.added_count(), 0);
        assert_eq!(
            report.tagged(DiffTag::Removed).map(|l| l.text.as_str()).collect::<Vec<_>>(),
            vec!["date", "total"]
        );
    }

    #[test]
    fn test_single_line_texts_differ_as_whole_lines() {
        // Words on one line form a single diff line on each side.
        let report = render_diff("invoice number date total", "invoice number");
        assert_eq!(report.removed_count(), 1);
        assert_eq!(report.added_count(), 1);
        assert_eq!(report.template_lines(), vec!["invoice number date total"]);
        assert_eq!(report.target_lines(), vec!["invoice number"]);
    }

    #[test]
    fn test_huge_context_does_not_overflow() {
        let report = render_diff("a\nb", "a\nc");
        let unified = report.unified("t", "x", usize::MAX);
        assert_eq!(unified, "--- t\n+++ x\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n");
    }

    #[test]
    fn test_split_diff_agrees_with_table() {
        let old: Vec<String> = (0..60).map(|i| format!("line {}", i % 7)).collect();
        let new: Vec<String> = (0..45).map(|i| format!("line {}", (i * 3) % 11)).collect();
        let old: Vec<&str> = old.iter().map(String::as_str).collect();
        let new: Vec<&str> = new.iter().map(String::as_str).collect();

        let mut table = Vec::new();
        diff_table(&old, &new, &mut table);
        let mut split = Vec::new();
        diff_split(&old, &new, &mut split, 16);

        let unchanged = |lines: &[DiffLine]| lines.iter().filter(|l| l.tag == DiffTag::Unchanged).count();
        assert_eq!(unchanged(&split), unchanged(&table));

        let report = DiffReport { lines: split };
        assert_eq!(report.template_lines(), old);
        assert_eq!(report.target_lines(), new);
    }

    #[test]
    fn test_replaced_line() {
        let report = render_diff("a\nb\nc", "a\nx\nc");
        assert_eq!(
            tags(&report),
            vec![
                DiffTag::Unchanged,
                DiffTag::Removed,
                DiffTag::Added,
                DiffTag::Unchanged
            ]
        );
    }

    #[test]
    fn test_sides_reconstruct_inputs() {
        let template = "header\nline one\nline two\nshared\nfooter";
        let target = "header\nline 1\nshared\nextra\nfooter\ntrailer";
        let report = render_diff(template, target);

        assert_eq!(report.template_lines(), template.lines().collect::<Vec<_>>());
        assert_eq!(report.target_lines(), target.lines().collect::<Vec<_>>());
        assert_eq!(report.common_lines(), vec!["header", "shared", "footer"]);
    }

    #[test]
    fn test_lcs_is_maximal() {
        let report = render_diff("a\nb\nc\nd\ne", "b\nx\nd\ne\ny");
        assert_eq!(report.common_lines(), vec!["b", "d", "e"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(render_diff("", "").lines.is_empty());
        assert_eq!(render_diff("", "a\nb").added_count(), 2);
        assert_eq!(render_diff("a\nb", "").removed_count(), 2);
    }

    #[test]
    fn test_unified_output() {
        let report = render_diff("a\nb\nc\nd", "a\nb\nx\nd");
        let expected = "--- template\n+++ target\n@@ -2,3 +2,3 @@\n b\n-c\n+x\n d\n";
        assert_eq!(report.unified("template", "target", 1), expected);
    }

    #[test]
    fn test_unified_single_line_ranges() {
        let report = render_diff("a", "b");
        assert_eq!(report.unified("t", "x", 3), "--- t\n+++ x\n@@ -1 +1 @@\n-a\n+b\n");
    }

    #[test]
    fn test_unified_empty_side_range() {
        let report = render_diff("", "a");
        assert_eq!(report.unified("t", "x", 3), "--- t\n+++ x\n@@ -0,0 +1 @@\n+a\n");
    }

    #[test]
    fn test_unified_separate_hunks() {
        let template = "1\n2\n3\n4\n5\n6\n7\n8\n9";
        let target = "x\n2\n3\n4\n5\n6\n7\n8\ny";
        let unified = render_diff(template, target).unified("t", "x", 1);
        assert_eq!(unified.matches("@@ -").count(), 2);
        assert!(unified.contains("@@ -1,2 +1,2 @@"));
        assert!(unified.contains("@@ -8,2 +8,2 @@"));
    }

    #[test]
    fn test_tagged_policy() {
        let policy = ColorPolicy::Tagged;
        assert_eq!(policy.color(DiffTag::Added, 0.1), Some(Rgb::RED));
        assert_eq!(policy.color(DiffTag::Removed, 0.1), Some(Rgb::DARK_GREEN));
        assert_eq!(policy.color(DiffTag::Unchanged, 0.1), None);
    }

    #[test]
    fn test_banded_policy() {
        let policy = ColorPolicy::default();
        assert_eq!(policy.color(DiffTag::Added, 1.0), Some(Rgb::GREEN));
        assert_eq!(policy.color(DiffTag::Added, 0.85), Some(Rgb::YELLOW));
        assert_eq!(policy.color(DiffTag::Added, 0.8), Some(Rgb::YELLOW));
        assert_eq!(policy.color(DiffTag::Added, 0.5), Some(Rgb::RED));
        assert_eq!(policy.color(DiffTag::Removed, 0.5), None);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::DARK_GREEN.hex(), "008000");
        assert_eq!(Rgb::YELLOW.hex(), "FFFF00");
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&ColorPolicy::Tagged).unwrap();
        assert_eq!(json, r#"{"kind":"tagged"}"#);
        let parsed: ColorPolicy =
            serde_json::from_str(r#"{"kind":"accuracy_banded","warn_at":0.7}"#).unwrap();
        assert_eq!(parsed, ColorPolicy::AccuracyBanded { warn_at: 0.7 });
    }
}

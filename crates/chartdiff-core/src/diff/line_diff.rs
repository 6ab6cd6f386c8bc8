//! Naive positional line diff, the fallback of last resort.

/// Compare two texts line by line at equal positions
///
/// For every index where the lines differ, emits `- <left>` when the left
/// line is non-empty and `+ <right>` when the right line is non-empty.
/// Identical inputs produce an empty string.
pub fn line_diff(left: &str, right: &str) -> String {
    let left: Vec<&str> = left.split('\n').collect();
    let right: Vec<&str> = right.split('\n').collect();
    let len = left.len().max(right.len());

    let mut out = Vec::new();
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or("");
        let r = right.get(i).copied().unwrap_or("");
        if l != r {
            if !l.is_empty() {
                out.push(format!("- {}", l));
            }
            if !r.is_empty() {
                out.push(format!("+ {}", r));
            }
        }
    }
    out.join("\n")
}

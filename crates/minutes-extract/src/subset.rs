//! Representative excerpting for transcripts that exceed the prompt budget.
//!
//! Rather than truncating the tail, the excerpt keeps the opening and
//! closing of the meeting in full and samples evenly from the middle, so
//! every phase of the conversation stays represented in the prompt.

const OMISSION_MARKER: &str = "[...]";

/// Reduce `text` to at most roughly `budget` characters.
///
/// Text within budget is returned unchanged. Otherwise the excerpt keeps
/// leading lines, trailing lines, and an even sample of the middle,
/// separated by omission markers, preserving original line order.
pub fn coverage_excerpt(text: &str, budget: usize) -> String {
    if text.len() <= budget {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 {
        // Single oversized block: hard truncate at a char boundary.
        let mut end = budget.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        return text[..end].to_string();
    }

    let head_budget = budget * 2 / 5;
    let tail_budget = budget * 3 / 10;
    let middle_budget = budget - head_budget - tail_budget;

    let mut head_end = 0usize;
    let mut used = 0usize;
    while head_end < lines.len() && used + lines[head_end].len() + 1 <= head_budget {
        used += lines[head_end].len() + 1;
        head_end += 1;
    }

    let mut tail_start = lines.len();
    used = 0;
    while tail_start > head_end && used + lines[tail_start - 1].len() + 1 <= tail_budget {
        used += lines[tail_start - 1].len() + 1;
        tail_start -= 1;
    }

    let middle: Vec<&str> = lines[head_end..tail_start].to_vec();
    let mut sampled: Vec<&str> = Vec::new();
    if !middle.is_empty() && middle_budget > 0 {
        let avg_line = middle.iter().map(|l| l.len() + 1).sum::<usize>() / middle.len();
        let keep = (middle_budget / avg_line.max(1)).max(1);
        let step = (middle.len() / keep).max(1);
        used = 0;
        for line in middle.iter().step_by(step) {
            if used + line.len() + 1 > middle_budget {
                break;
            }
            used += line.len() + 1;
            sampled.push(line);
        }
    }

    let mut parts: Vec<&str> = Vec::new();
    parts.extend_from_slice(&lines[..head_end]);
    if !sampled.is_empty() {
        parts.push(OMISSION_MARKER);
        parts.extend_from_slice(&sampled);
    }
    if tail_start > head_end {
        parts.push(OMISSION_MARKER);
        parts.extend_from_slice(&lines[tail_start..]);
    }
    parts.join("\n")
}

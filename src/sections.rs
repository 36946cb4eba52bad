/// Collapse line numbers into maximal contiguous runs: `"1-3, 10, 20-22"`.
///
/// Input order does not matter and duplicates are ignored. An empty input
/// gives an empty string.
pub fn compress(lines: &[usize]) -> String {
    let mut sorted = lines.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut parts = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let (mut start, mut prev) = (first, first);
    for n in iter {
        if n == prev + 1 {
            prev = n;
            continue;
        }
        parts.push(run_token(start, prev));
        start = n;
        prev = n;
    }
    parts.push(run_token(start, prev));

    parts.join(", ")
}

fn run_token(start: usize, end: usize) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

//! Levenshtein edit distance, used by the command dispatcher to suggest a
//! correction when a typed command name does not match any registered
//! handler exactly.

/// Edit distance between `a` and `b` (insert/delete/substitute, cost 1 each).
#[must_use]
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let tmp = row[j + 1];
            row[j + 1] = if ca == cb {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j + 1])
            };
            prev_diag = tmp;
        }
    }
    row[b.len()]
}

/// Find the closest name in `candidates` to `input`, if any is within
/// `max_distance` edits.
#[must_use]
pub fn closest<'a>(input: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&c| (c, distance(input, c)))
        .filter(|&(_, d)| d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_have_zero_distance() {
        assert_eq!(distance("munge", "munge"), 0);
    }

    #[test]
    fn one_substitution_has_distance_one() {
        assert_eq!(distance("munge", "munje"), 1);
    }

    #[test]
    fn closest_picks_the_nearest_candidate() {
        let candidates = ["munge", "bestfit", "btr", "exit"];
        assert_eq!(closest("munje", &candidates, 2), Some("munge"));
        assert_eq!(closest("zzzzz", &candidates, 2), None);
    }
}

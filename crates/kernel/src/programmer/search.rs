// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Fuzzy subsequence ranking for search.

use std::cmp::Ordering;

/// Score `candidate` against `query`, or `None` if the query's characters do not all appear in
/// it, in order, ignoring case. Higher is better: consecutive runs and matches at the start of
/// a word (after `.`, `_`, `-`, or at a lower-to-upper case change) score extra, and shorter
/// candidates beat longer ones.
pub fn fuzzy_score(query: &str, candidate: &str) -> Option<f64> {
    let query: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let chars: Vec<char> = candidate.chars().collect();
    if query.is_empty() {
        return Some(0.0);
    }

    let mut score = 0.0;
    let mut matched = 0;
    let mut previous: Option<usize> = None;
    for (i, c) in chars.iter().enumerate() {
        if matched == query.len() {
            break;
        }
        if !c.to_lowercase().eq(std::iter::once(query[matched])) {
            continue;
        }
        score += 1.0;
        if i > 0 && previous == Some(i - 1) {
            score += 2.0;
        }
        if is_word_start(&chars, i) {
            score += 1.5;
        }
        previous = Some(i);
        matched += 1;
    }
    if matched < query.len() {
        return None;
    }
    Some(score + query.len() as f64 / chars.len() as f64)
}

fn is_word_start(chars: &[char], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    let prev = chars[i - 1];
    matches!(prev, '.' | '_' | '-' | ' ') || (prev.is_lowercase() && chars[i].is_uppercase())
}

/// Keep the items whose key matches `query`, best first, at most `max`. Equal scores keep
/// their original order. An empty query keeps everything in the original order.
pub fn rank<T>(query: &str, items: Vec<T>, key: impl Fn(&T) -> &str, max: usize) -> Vec<T> {
    if query.is_empty() {
        return items.into_iter().take(max).collect();
    }
    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .filter_map(|item| Some((fuzzy_score(query, key(&item))?, item)))
        .collect();
    // Stable, so equal scores stay in enumeration order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().take(max).map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("greet", "root.greet", true; "exact member")]
    #[test_case("rg", "root.greet", true; "subsequence")]
    #[test_case("ROOT", "root.greet", true; "case insensitive")]
    #[test_case("gr", "root.echo", false; "out of order")]
    #[test_case("xyz", "root.echo", false; "absent")]
    fn test_matches(query: &str, candidate: &str, matches: bool) {
        assert_eq!(fuzzy_score(query, candidate).is_some(), matches);
    }

    #[test]
    fn test_word_start_and_runs_win() {
        let run = fuzzy_score("echo", "root.echo").unwrap();
        let scattered = fuzzy_score("echo", "root.evilChoice_o").unwrap();
        assert!(run > scattered);
    }

    #[test]
    fn test_shorter_wins_on_equal_matches() {
        let short = fuzzy_score("echo", "a.echo").unwrap();
        let long = fuzzy_score("echo", "abcdef.echo").unwrap();
        assert!(short > long);
    }

    #[test]
    fn test_rank_orders_and_caps() {
        let items = vec!["room.look", "root.echo", "root.greet", "thing.echoes"];
        let ranked = rank("echo", items.clone(), |s| *s, 50);
        assert_eq!(ranked, vec!["root.echo", "thing.echoes"]);

        let capped = rank("o", items.clone(), |s| *s, 2);
        assert_eq!(capped.len(), 2);

        assert_eq!(rank("", items.clone(), |s| *s, 50), items);
    }

    #[test]
    fn test_rank_ties_keep_order() {
        let items = vec!["a.xx", "b.xx"];
        assert_eq!(rank("xx", items, |s| *s, 50), vec!["a.xx", "b.xx"]);

        // Same score, though the second is the closer string.
        let items = vec!["zz.ab", "ab.ab"];
        assert_eq!(
            fuzzy_score("ab", items[0]).unwrap(),
            fuzzy_score("ab", items[1]).unwrap()
        );
        assert_eq!(rank("ab", items.clone(), |s| *s, 50), items);
    }

    #[test]
    fn test_rank_cap_takes_first_of_many_ties() {
        let items: Vec<String> = (0..60).map(|i| format!("o{i:02}.fn")).collect();
        let ranked = rank("fn", items.clone(), |s| s.as_str(), 50);
        assert_eq!(ranked, items[..50].to_vec());
    }
}

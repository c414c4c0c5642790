// Keyword extraction by word frequency.
// Tokens are counted after stop-word removal with case variants and plurals
// folded together; adjacent pairs that form strong collocations are counted
// as a single two-word keyword.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::stopwords::is_stopword;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']*").unwrap());

pub const DEFAULT_COLLOCATION_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    num_keywords: usize,
    collocations: bool,
    collocation_threshold: f64,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(7)
    }
}

impl KeywordExtractor {
    pub fn new(num_keywords: usize) -> Self {
        Self {
            num_keywords,
            collocations: true,
            collocation_threshold: DEFAULT_COLLOCATION_THRESHOLD,
        }
    }

    pub fn without_collocations(mut self) -> Self {
        self.collocations = false;
        self
    }

    /// Top keywords by descending frequency. Equal counts keep the order in
    /// which the words first appeared.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut ranked = self.word_frequencies(text);
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(self.num_keywords)
            .map(|(word, _)| word)
            .collect()
    }

    /// Word counts in first-seen order.
    pub fn word_frequencies(&self, text: &str) -> Vec<(String, usize)> {
        let words: Vec<String> = TOKEN_RE
            .find_iter(text)
            .map(|m| strip_possessive(m.as_str()))
            .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_numeric()))
            .collect();

        let unigrams: Vec<String> = words.iter().filter(|w| !is_stopword(w)).cloned().collect();
        let unigram_counts = process_tokens(&unigrams);

        if !self.collocations {
            return unigram_counts.counts;
        }

        let bigrams: Vec<String> = words
            .windows(2)
            .filter(|pair| !is_stopword(&pair[0]) && !is_stopword(&pair[1]))
            .map(|pair| format!("{} {}", pair[0], pair[1]))
            .collect();
        let bigram_counts = process_tokens(&bigrams);

        merge_collocations(
            unigram_counts,
            bigram_counts.counts,
            unigrams.len(),
            self.collocation_threshold,
        )
    }
}

fn strip_possessive(word: &str) -> String {
    if word.ends_with("'s") || word.ends_with("'S") {
        word[..word.len() - 2].to_string()
    } else {
        word.to_string()
    }
}

struct TokenCounts {
    /// Standard-form token and its fused count, in first-seen order.
    counts: Vec<(String, usize)>,
    /// Lowercase token (plurals included) to its standard form.
    standard: HashMap<String, String>,
}

/// Folds case variants and plurals. Each group is reported under its most
/// frequent case variant; a plural merges into its singular when both occur.
fn process_tokens(words: &[String]) -> TokenCounts {
    let mut order: Vec<String> = Vec::new();
    let mut cases: HashMap<String, Vec<(String, usize)>> = HashMap::new();

    for word in words {
        let lower = word.to_lowercase();
        let variants = cases.entry(lower.clone()).or_insert_with(|| {
            order.push(lower);
            Vec::new()
        });
        match variants.iter_mut().find(|(w, _)| w == word) {
            Some((_, count)) => *count += 1,
            None => variants.push((word.clone(), 1)),
        }
    }

    let mut merged_plurals: Vec<(String, String)> = Vec::new();
    for key in &order {
        if !key.ends_with('s') || key.ends_with("ss") {
            continue;
        }
        let singular = &key[..key.len() - 1];
        if !cases.contains_key(singular) {
            continue;
        }
        if let Some(plural_variants) = cases.remove(key) {
            if let Some(singular_variants) = cases.get_mut(singular) {
                for (word, count) in plural_variants {
                    let form = drop_last_char(&word);
                    match singular_variants.iter_mut().find(|(w, _)| *w == form) {
                        Some((_, c)) => *c += count,
                        None => singular_variants.push((form, count)),
                    }
                }
            }
            merged_plurals.push((key.clone(), singular.to_string()));
        }
    }

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut standard: HashMap<String, String> = HashMap::new();
    for key in &order {
        let Some(variants) = cases.get(key) else {
            continue;
        };
        // First variant wins ties.
        let mut best = &variants[0];
        for variant in variants.iter().skip(1) {
            if variant.1 > best.1 {
                best = variant;
            }
        }
        counts.push((best.0.clone(), variants.iter().map(|(_, c)| c).sum()));
        standard.insert(key.clone(), best.0.clone());
    }

    for (plural, singular) in merged_plurals {
        if let Some(form) = standard.get(&singular).cloned() {
            standard.insert(plural, form);
        }
    }

    TokenCounts { counts, standard }
}

fn drop_last_char(word: &str) -> String {
    match word.char_indices().last() {
        Some((idx, _)) => word[..idx].to_string(),
        None => String::new(),
    }
}

/// Adds bigrams scoring above `threshold` and discounts their words. Counts
/// that fall to zero or below are dropped.
fn merge_collocations(
    unigrams: TokenCounts,
    bigrams: Vec<(String, usize)>,
    n_words: usize,
    threshold: f64,
) -> Vec<(String, usize)> {
    let original: HashMap<String, usize> = unigrams.counts.iter().cloned().collect();
    let mut counts: Vec<(String, i64)> = unigrams
        .counts
        .iter()
        .map(|(w, c)| (w.clone(), *c as i64))
        .collect();
    let mut index: HashMap<String, usize> = counts
        .iter()
        .enumerate()
        .map(|(i, (w, _))| (w.clone(), i))
        .collect();

    for (bigram, count) in bigrams {
        let Some((first, second)) = bigram.split_once(' ') else {
            continue;
        };
        let (Some(word1), Some(word2)) = (
            unigrams.standard.get(&first.to_lowercase()),
            unigrams.standard.get(&second.to_lowercase()),
        ) else {
            continue;
        };
        let (Some(&count1), Some(&count2)) = (original.get(word1), original.get(word2)) else {
            continue;
        };

        if collocation_score(count, count1, count2, n_words) > threshold {
            for word in [word1, word2] {
                if let Some(&i) = index.get(word) {
                    counts[i].1 -= count as i64;
                }
            }
            match index.get(&bigram) {
                Some(&i) => counts[i].1 = count as i64,
                None => {
                    index.insert(bigram.clone(), counts.len());
                    counts.push((bigram, count as i64));
                }
            }
        }
    }

    counts
        .into_iter()
        .filter(|(_, c)| *c > 0)
        .map(|(w, c)| (w, c as usize))
        .collect()
}

fn log_likelihood(k: f64, n: f64, x: f64) -> f64 {
    x.max(1e-10).ln() * k + (1.0 - x).max(1e-10).ln() * (n - k)
}

/// Dunning's log-likelihood ratio for a word pair.
fn collocation_score(count_bigram: usize, count1: usize, count2: usize, n_words: usize) -> f64 {
    if n_words <= count1 || n_words <= count2 {
        return 0.0;
    }
    let n = n_words as f64;
    let c12 = count_bigram as f64;
    let c1 = count1 as f64;
    let c2 = count2 as f64;

    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);

    let score = log_likelihood(c12, c1, p) + log_likelihood(c2 - c12, n - c1, p)
        - log_likelihood(c12, c1, p1)
        - log_likelihood(c2 - c12, n - c1, p2);
    -2.0 * score
}

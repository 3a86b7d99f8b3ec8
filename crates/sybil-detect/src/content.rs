use std::collections::HashMap;
use sybil_core::AccountProfile;

/// Comments shorter than this many characters count as low-effort.
pub const SHORT_COMMENT_CHARS: usize = 20;

/// How many of the most recent comments feed the similarity matrix.
const SIMILARITY_COMMENT_LIMIT: usize = 15;

/// Terms dropped before weighting; function words carry no authorship signal
/// and let "I think that..." boilerplate dominate the cosine.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more",
    "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours", "yourself",
];

/// Text-based features: brevity and self-similarity. The cross-platform
/// duplication lookup lives in the search crate; its evidence is consumed by
/// the heuristic scorer, not by the feature vector.
pub fn content_features(profile: &AccountProfile) -> HashMap<&'static str, f64> {
    HashMap::from([
        ("short_comment_ratio", short_comment_ratio(&profile.comments)),
        ("avg_comment_similarity", avg_comment_similarity(&profile.comments)),
    ])
}

/// Fraction of comments under [`SHORT_COMMENT_CHARS`] characters.
pub fn short_comment_ratio(comments: &[String]) -> f64 {
    if comments.is_empty() {
        return 0.0;
    }
    let short = comments
        .iter()
        .filter(|c| c.chars().count() < SHORT_COMMENT_CHARS)
        .count();
    short as f64 / comments.len() as f64
}

/// Mean pairwise cosine similarity of TF-IDF vectors over the most recent
/// comments. Upper triangle only: no self-pairs, no mirrored duplicates.
/// Fewer than two comments means there is nothing to compare.
pub fn avg_comment_similarity(comments: &[String]) -> f64 {
    if comments.len() < 2 {
        return 0.0;
    }
    let recent = &comments[..comments.len().min(SIMILARITY_COMMENT_LIMIT)];
    let vectors = tfidf_vectors(recent);

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            total += cosine(&vectors[i], &vectors[j]);
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    total / pairs as f64
}

/// Lowercased word tokens of two or more alphanumeric characters, minus
/// stopwords.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2 && !STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

/// L2-normalized TF-IDF weights per document, smoothed IDF:
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`.
fn tfidf_vectors(docs: &[String]) -> Vec<HashMap<String, f64>> {
    let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d)).collect();
    let n = tokenized.len() as f64;

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for tokens in &tokenized {
        let mut seen: Vec<&str> = Vec::new();
        for token in tokens {
            if !seen.contains(&token.as_str()) {
                seen.push(token);
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }
    }

    tokenized
        .iter()
        .map(|tokens| {
            let mut weights: HashMap<String, f64> = HashMap::new();
            for token in tokens {
                *weights.entry(token.clone()).or_insert(0.0) += 1.0;
            }
            for (term, weight) in weights.iter_mut() {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                *weight *= idf;
            }
            let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for weight in weights.values_mut() {
                    *weight /= norm;
                }
            }
            weights
        })
        .collect()
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    // Vectors are already unit-length; the dot product is the similarity.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, wa)| large.get(term).map(|wb| wa * wb))
        .sum()
}

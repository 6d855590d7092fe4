//! Turns free-form traveller comments into per-place review snippets and local tips.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::review::ReviewComment;

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]").expect("sentence break pattern is valid"));

static CAPITALISED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-zA-Z]+\b").expect("capitalised word pattern is valid"));

static TIP_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)hidden|tip|gem|avoid|must|try").expect("tip keyword pattern is valid")
});

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Groups comment sentences by the place they mention.
///
/// With a non-empty `places` list a sentence is filed under every listed place it names
/// (case-insensitive). Without one, every capitalised word in the sentence is treated
/// as a place name.
pub fn build_place_reviews_map(
    comments: &[ReviewComment],
    places: Option<&[String]>,
) -> HashMap<String, Vec<String>> {
    let places = places.filter(|p| !p.is_empty());
    let lowered_places: Vec<(String, &String)> = places
        .unwrap_or_default()
        .iter()
        .map(|place| (place.to_lowercase(), place))
        .collect();

    let mut reviews: HashMap<String, Vec<String>> = HashMap::new();
    for comment in comments {
        for sentence in sentences(comment.text()) {
            if places.is_some() {
                let lowered = sentence.to_lowercase();
                for (needle, place) in &lowered_places {
                    if lowered.contains(needle.as_str()) {
                        reviews
                            .entry((*place).clone())
                            .or_default()
                            .push(sentence.to_string());
                    }
                }
            } else {
                for word in CAPITALISED_WORD.find_iter(sentence) {
                    reviews
                        .entry(word.as_str().to_string())
                        .or_default()
                        .push(sentence.to_string());
                }
            }
        }
    }
    reviews
}

/// Sentences that read like insider advice ("hidden", "tip", "gem", "avoid", "must", "try").
pub fn extract_local_tips(comments: &[ReviewComment]) -> Vec<String> {
    comments
        .iter()
        .flat_map(|comment| sentences(comment.text()))
        .filter(|sentence| TIP_KEYWORD.is_match(sentence))
        .map(str::to_string)
        .collect()
}

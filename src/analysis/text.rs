//! Description normalization and keyword scoring.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// English stopwords.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Words too common in this corpus to carry meaning.
const DOMAIN_STOPWORDS: &[&str] = &[
    "scholarship",
    "student",
    "award",
    "application",
    "apply",
    "program",
    "opportunity",
];

/// Stopwords kept because they flip meaning.
const NEGATIONS: &[&str] = &["no", "not", "nor", "neither"];

/// Compound terms rejoined after tokenization.
pub const HYPHENATED_TERMS: &[&str] = &[
    "first-generation",
    "low-income",
    "african-american",
    "asian-american",
    "native-american",
    "latin-american",
];

/// Tokens rewritten as `dei_<term>`.
pub const DEI_TERMS: &[&str] = &[
    "diversity",
    "equity",
    "inclusion",
    "dei",
    "minority",
    "underrepresented",
    "marginalized",
];

/// Tokens rewritten as `identity_<term>`.
pub const IDENTITY_TERMS: &[&str] = &[
    "gender",
    "race",
    "ethnicity",
    "lgbtq",
    "disability",
    "veteran",
    "immigrant",
    "refugee",
    "indigenous",
    "native",
];

/// Keywords counted by [`keyword_score`] for the diversity/identity score.
pub const DEI_IDENTITY_KEYWORDS: &[&str] = &[
    "diversity",
    "equity",
    "inclusion",
    "minority",
    "underrepresented",
    "gender",
    "race",
    "ethnicity",
    "lgbtq",
    "disability",
    "first-generation",
    "low-income",
    "international",
    "veteran",
    "immigrant",
    "refugee",
    "indigenous",
    "native",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?\S+|www\S+").unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+").unwrap());

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ENGLISH_STOPWORDS
        .iter()
        .chain(DOMAIN_STOPWORDS)
        .copied()
        .filter(|w| !NEGATIONS.contains(w))
        .collect()
});

/// Normalize a description for vectorizing.
///
/// Lowercases, drops URLs and e-mail addresses, keeps only ASCII letters,
/// whitespace and hyphens, removes stopwords (negations survive), reduces
/// plurals, rejoins [`HYPHENATED_TERMS`] and tags [`DEI_TERMS`] and
/// [`IDENTITY_TERMS`].
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lowered, "");
    let no_emails = EMAIL_RE.replace_all(&no_urls, "");
    let letters: String = no_emails
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace() || *c == '-')
        .collect();

    let tokens: Vec<String> = letters
        .split_whitespace()
        .map(|t| t.trim_matches('-'))
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(lemmatize)
        .collect();

    rejoin_hyphenated(tokens)
        .iter()
        .map(|t| tag_token(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge adjacent token pairs that spell one of [`HYPHENATED_TERMS`].
fn rejoin_hyphenated(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        let compound = iter
            .peek()
            .map(|next| format!("{token}-{next}"))
            .filter(|c| HYPHENATED_TERMS.contains(&c.as_str()));
        match compound {
            Some(c) => {
                iter.next();
                out.push(c);
            }
            None => out.push(token),
        }
    }
    out
}

fn tag_token(token: &str) -> String {
    if DEI_TERMS.contains(&token) {
        format!("dei_{token}")
    } else if IDENTITY_TERMS.contains(&token) {
        format!("identity_{token}")
    } else {
        token.to_string()
    }
}

/// Reduce a plural noun to its singular form.
pub fn lemmatize(word: &str) -> String {
    match word {
        "women" => return "woman".into(),
        "men" => return "man".into(),
        "children" => return "child".into(),
        "alumni" => return "alumnus".into(),
        _ => {}
    }
    if word.len() <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    for suffix in ["xes", "ches", "shes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Case-insensitive count of non-overlapping keyword occurrences.
pub fn keyword_score(text: &str, keywords: &[&str]) -> usize {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .map(|k| lowered.matches(&k.to_lowercase()).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_noise_and_stopwords() {
        let out = preprocess("Apply at https://x.org or mail me@x.org! The 2024 Award is NOT for seniors.");
        assert_eq!(out, "mail not senior");
    }

    #[test]
    fn restores_hyphenated_terms() {
        let out = preprocess("For first generation and low-income African Americans");
        assert_eq!(out, "first-generation low-income african-american");
    }

    #[test]
    fn compounds_only_join_whole_tokens() {
        assert_eq!(preprocess("yellow income"), "yellow income");
        assert_eq!(preprocess("Belowing income levels"), "belowing income level");
        assert_eq!(preprocess("low income families"), "low-income family");
        assert_eq!(preprocess("native american tribes"), "native-american tribe");
    }

    #[test]
    fn tags_dei_and_identity_terms() {
        let out = preprocess("Supports diversity for minorities of any gender and veterans");
        assert_eq!(
            out,
            "support dei_diversity dei_minority identity_gender identity_veteran"
        );
    }

    #[test]
    fn lemmatize_plurals() {
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("churches"), "church");
        assert_eq!(lemmatize("majors"), "major");
        assert_eq!(lemmatize("campus"), "campus");
        assert_eq!(lemmatize("basis"), "basis");
        assert_eq!(lemmatize("women"), "woman");
        assert_eq!(lemmatize("gas"), "gas");
    }

    #[test]
    fn keyword_score_counts_occurrences() {
        let text = "Diversity and INCLUSION. Diversity matters to first-generation and native students.";
        assert_eq!(keyword_score(text, DEI_IDENTITY_KEYWORDS), 5);
        assert_eq!(keyword_score("", DEI_IDENTITY_KEYWORDS), 0);
    }
}

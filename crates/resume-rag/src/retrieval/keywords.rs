//! Keyword extraction for the hyperlink query
//!
//! Reduces a question to its nouns and adjectives, most frequent first, in
//! title case. Tagging is rule based: a small lexicon, generated verb
//! inflections, suffix heuristics and the tag of the previous token.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// NLTK English stop-word list
const STOPWORDS: &[&str] = &[
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

/// Part-of-speech tag (only as fine as keyword selection needs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Noun,
    PluralNoun,
    Adjective,
    Comparative,
    Superlative,
    Verb,
    Adverb,
    Modal,
    Number,
    Other,
}

impl Tag {
    /// Nouns (singular/plural) and adjectives (base/comparative/superlative)
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Tag::Noun | Tag::PluralNoun | Tag::Adjective | Tag::Comparative | Tag::Superlative
        )
    }
}

/// Which inflection a verb form is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerbForm {
    Base,
    ThirdSingular,
    Past,
    Gerund,
}

/// Conjugation pattern for English verbs
#[derive(Debug, Clone, Copy)]
enum VerbPattern {
    /// ask → asks, asked, asking
    Regular,
    /// hire → hires, hired, hiring
    RegularE,
    /// prefer → prefers, preferred, preferring
    DoubleConsonant,
    /// apply → applies, applied, applying
    YToI,
    /// Irregular past forms; `doubled` doubles the last consonant before -ing
    Irregular {
        past: &'static str,
        past_participle: &'static str,
        doubled: bool,
    },
}

struct VerbEntry {
    base: &'static str,
    pattern: VerbPattern,
}

impl VerbEntry {
    const fn regular(base: &'static str) -> Self {
        Self { base, pattern: VerbPattern::Regular }
    }

    const fn e_ending(base: &'static str) -> Self {
        Self { base, pattern: VerbPattern::RegularE }
    }

    const fn double_consonant(base: &'static str) -> Self {
        Self { base, pattern: VerbPattern::DoubleConsonant }
    }

    const fn y_to_i(base: &'static str) -> Self {
        Self { base, pattern: VerbPattern::YToI }
    }

    const fn irregular(base: &'static str, past: &'static str, past_participle: &'static str) -> Self {
        Self {
            base,
            pattern: VerbPattern::Irregular { past, past_participle, doubled: false },
        }
    }

    const fn irregular_doubled(base: &'static str, past: &'static str, past_participle: &'static str) -> Self {
        Self {
            base,
            pattern: VerbPattern::Irregular { past, past_participle, doubled: true },
        }
    }

    fn inflections(&self) -> Vec<(String, VerbForm)> {
        let base = self.base;
        let last = base.chars().last().map(String::from).unwrap_or_default();
        let drop_last = || base.get(..base.len().saturating_sub(1)).unwrap_or(base);

        let (third, past, participle, gerund) = match self.pattern {
            VerbPattern::Regular => (
                third_person_singular(base),
                format!("{}ed", base),
                None,
                format!("{}ing", base),
            ),
            VerbPattern::RegularE => (
                format!("{}s", base),
                format!("{}d", base),
                None,
                format!("{}ing", drop_last()),
            ),
            VerbPattern::DoubleConsonant => (
                format!("{}s", base),
                format!("{}{}ed", base, last),
                None,
                format!("{}{}ing", base, last),
            ),
            VerbPattern::YToI => (
                format!("{}ies", drop_last()),
                format!("{}ied", drop_last()),
                None,
                format!("{}ing", base),
            ),
            VerbPattern::Irregular { past, past_participle, doubled } => {
                let gerund = if doubled {
                    format!("{}{}ing", base, last)
                } else if base.ends_with('e') && !base.ends_with("ee") {
                    format!("{}ing", drop_last())
                } else {
                    format!("{}ing", base)
                };
                (
                    third_person_singular(base),
                    past.to_string(),
                    Some(past_participle.to_string()),
                    gerund,
                )
            }
        };

        let mut forms = vec![
            (base.to_string(), VerbForm::Base),
            (third, VerbForm::ThirdSingular),
            (past, VerbForm::Past),
            (gerund, VerbForm::Gerund),
        ];
        if let Some(participle) = participle {
            forms.push((participle, VerbForm::Past));
        }
        forms
    }
}

fn third_person_singular(base: &str) -> String {
    if base.ends_with('s')
        || base.ends_with('x')
        || base.ends_with('z')
        || base.ends_with("sh")
        || base.ends_with("ch")
        || base.ends_with('o')
    {
        format!("{}es", base)
    } else {
        format!("{}s", base)
    }
}

/// Verbs common in questions about candidates and roles
const VERB_TABLE: &[VerbEntry] = &[
    VerbEntry::regular("ask"),
    VerbEntry::regular("jump"),
    VerbEntry::regular("walk"),
    VerbEntry::regular("talk"),
    VerbEntry::regular("want"),
    VerbEntry::regular("look"),
    VerbEntry::regular("explain"),
    VerbEntry::regular("suggest"),
    VerbEntry::regular("mention"),
    VerbEntry::regular("consider"),
    VerbEntry::regular("recommend"),
    VerbEntry::regular("contain"),
    VerbEntry::regular("help"),
    VerbEntry::e_ending("compare"),
    VerbEntry::e_ending("describe"),
    VerbEntry::e_ending("provide"),
    VerbEntry::e_ending("require"),
    VerbEntry::e_ending("include"),
    VerbEntry::e_ending("hire"),
    VerbEntry::e_ending("like"),
    VerbEntry::e_ending("love"),
    VerbEntry::e_ending("live"),
    VerbEntry::double_consonant("prefer"),
    VerbEntry::double_consonant("stop"),
    VerbEntry::y_to_i("apply"),
    VerbEntry::y_to_i("identify"),
    VerbEntry::y_to_i("qualify"),
    VerbEntry::irregular("show", "showed", "shown"),
    VerbEntry::irregular("tell", "told", "told"),
    VerbEntry::irregular("give", "gave", "given"),
    VerbEntry::irregular("find", "found", "found"),
    VerbEntry::irregular("know", "knew", "known"),
    VerbEntry::irregular("make", "made", "made"),
    VerbEntry::irregular("take", "took", "taken"),
    VerbEntry::irregular("see", "saw", "seen"),
    VerbEntry::irregular("think", "thought", "thought"),
    VerbEntry::irregular("say", "said", "said"),
    VerbEntry::irregular("go", "went", "gone"),
    VerbEntry::irregular("come", "came", "come"),
    VerbEntry::irregular("choose", "chose", "chosen"),
    VerbEntry::irregular("write", "wrote", "written"),
    VerbEntry::irregular("speak", "spoke", "spoken"),
    VerbEntry::irregular("build", "built", "built"),
    VerbEntry::irregular("lead", "led", "led"),
    VerbEntry::irregular("teach", "taught", "taught"),
    VerbEntry::irregular_doubled("run", "ran", "run"),
    VerbEntry::irregular_doubled("get", "got", "gotten"),
];

const ADJECTIVES: &[&str] = &[
    "quick", "slow", "fast", "old", "new", "good", "bad", "great", "small", "large", "big",
    "little", "young", "long", "short", "high", "low", "early", "late", "first", "last", "top",
    "strong", "weak", "senior", "junior", "remote", "full", "key", "main", "able", "recent",
    "current", "previous", "similar", "different", "certain", "whole", "entire", "major",
    "minor", "common", "simple", "complex", "easy", "hard", "difficult", "open", "free", "ideal",
    "perfect", "ready", "sure", "true", "false", "real", "right", "wrong", "important",
    "relevant", "suitable", "experienced", "skilled", "qualified", "certified", "advanced",
    "detailed", "dark", "bright", "black", "white", "red", "blue", "green", "brown", "grey",
    "gray", "yellow", "golden", "silver", "wise",
];

const COMPARATIVES: &[&str] = &["better", "worse", "less", "greater", "larger", "higher", "lower"];

const SUPERLATIVES: &[&str] = &["best", "worst", "least"];

const ADVERBS: &[&str] = &[
    "also", "well", "even", "still", "already", "always", "never", "often", "really", "quite",
    "rather", "perhaps", "maybe", "almost", "together", "instead", "however", "yet", "ever",
    "sometimes", "soon",
];

const MODALS: &[&str] = &["could", "would", "might", "must", "shall", "may"];

const OTHER: &[&str] = &["please", "hello", "hi", "hey", "thanks", "thank", "yes", "ok", "okay"];

/// Rule-based keyword extractor
pub struct KeywordExtractor {
    stopwords: HashSet<&'static str>,
    lexicon: HashMap<String, Tag>,
    verbs: HashMap<String, VerbForm>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Create an extractor with the built-in English lexicon
    pub fn new() -> Self {
        let mut lexicon = HashMap::new();
        let groups: [(&[&str], Tag); 6] = [
            (ADJECTIVES, Tag::Adjective),
            (COMPARATIVES, Tag::Comparative),
            (SUPERLATIVES, Tag::Superlative),
            (ADVERBS, Tag::Adverb),
            (MODALS, Tag::Modal),
            (OTHER, Tag::Other),
        ];
        for (words, tag) in groups {
            for word in words {
                lexicon.insert(word.to_string(), tag);
            }
        }

        let mut verbs = HashMap::new();
        for entry in VERB_TABLE {
            for (form, kind) in entry.inflections() {
                verbs.entry(form).or_insert(kind);
            }
        }

        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            lexicon,
            verbs,
        }
    }

    /// Lowercased, stop-word-free, purely alphanumeric tokens
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase().replace('\u{2019}', "'");
        lower
            .split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
            .map(|word| strip_clitic(word).trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .filter(|token| !self.stopwords.contains(token))
            .filter(|token| token.chars().all(char::is_alphanumeric))
            .map(str::to_string)
            .collect()
    }

    /// Tag tokens left to right
    pub fn tag(&self, tokens: &[String]) -> Vec<Tag> {
        let mut tags: Vec<Tag> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let tag = self.tag_word(token, tags.last().copied());
            tags.push(tag);
        }
        tags
    }

    fn tag_word(&self, word: &str, previous: Option<Tag>) -> Tag {
        if let Some(tag) = self.lexicon.get(word) {
            return *tag;
        }

        if let Some(form) = self.verbs.get(word) {
            return match form {
                VerbForm::Base => match previous {
                    None | Some(Tag::Adverb) | Some(Tag::Modal) | Some(Tag::Other) => Tag::Verb,
                    _ => Tag::Noun,
                },
                VerbForm::ThirdSingular => match previous {
                    Some(Tag::Adjective) => Tag::PluralNoun,
                    _ => Tag::Verb,
                },
                VerbForm::Past => Tag::Verb,
                VerbForm::Gerund => match previous {
                    Some(Tag::Adjective) => Tag::Noun,
                    _ => Tag::Verb,
                },
            };
        }

        self.infer_tag(word)
    }

    /// Suffix heuristics for words outside the lexicon
    fn infer_tag(&self, word: &str) -> Tag {
        let len = word.chars().count();

        if word.chars().all(|c| c.is_ascii_digit()) {
            return Tag::Number;
        }
        if len > 4 && word.ends_with("ly") {
            return Tag::Adverb;
        }
        if let Some(stem) = word.strip_suffix("est") {
            if self.is_adjective_stem(stem) {
                return Tag::Superlative;
            }
        }
        if let Some(stem) = word.strip_suffix("er") {
            if self.is_adjective_stem(stem) {
                return Tag::Comparative;
            }
        }
        if word.ends_with("ing") {
            return Tag::Noun;
        }
        if len > 4 && word.ends_with("ed") {
            return Tag::Verb;
        }
        if ["ous", "ful", "ive", "able", "ible", "less", "ish", "al"]
            .iter()
            .any(|s| word.ends_with(s))
            || (len > 5 && word.ends_with("ic"))
        {
            return Tag::Adjective;
        }
        if len > 3
            && word.ends_with('s')
            && !["ss", "us", "is"].iter().any(|s| word.ends_with(s))
        {
            return Tag::PluralNoun;
        }

        Tag::Noun
    }

    fn is_adjective_stem(&self, stem: &str) -> bool {
        let known = |w: &str| self.lexicon.get(w) == Some(&Tag::Adjective);
        if stem.is_empty() {
            return false;
        }
        if known(stem) || known(&format!("{}e", stem)) {
            return true;
        }
        // bigger → big
        let mut chars = stem.chars();
        match (chars.next_back(), chars.next_back()) {
            (Some(a), Some(b)) if a == b => known(&stem[..stem.len() - a.len_utf8()]),
            _ => false,
        }
    }

    /// Frequency-ranked nouns and adjectives of `text`, title cased
    pub fn extract(&self, text: &str) -> String {
        let tokens = self.tokens(text);
        let tags = self.tag(&tokens);

        let mut counts: Vec<(&str, usize)> = Vec::new();
        for (token, tag) in tokens.iter().zip(&tags) {
            if !tag.is_keyword() {
                continue;
            }
            match counts.iter_mut().find(|(word, _)| *word == token.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((token.as_str(), 1)),
            }
        }

        // stable: equal counts stay in first-occurrence order
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let joined = counts
            .iter()
            .map(|(word, _)| *word)
            .collect::<Vec<_>>()
            .join(" ");
        title_case(&joined)
    }
}

/// Word without a trailing English clitic: "candidate's" → "candidate",
/// "doesn't" → "does", "won't" → "will"
fn strip_clitic(word: &str) -> &str {
    if let Some(stem) = word.strip_suffix("n't") {
        return match stem {
            "ca" => "can",
            "wo" => "will",
            "sha" => "shall",
            stem => stem,
        };
    }
    ["'s", "'re", "'ve", "'ll", "'d", "'m"]
        .iter()
        .find_map(|clitic| word.strip_suffix(*clitic))
        .unwrap_or(word)
}

/// Uppercase every letter that follows a non-letter, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

static EXTRACTOR: Lazy<KeywordExtractor> = Lazy::new(KeywordExtractor::new);

/// Extract keywords with the shared default extractor
pub fn extract_keywords(text: &str) -> String {
    EXTRACTOR.extract(text)
}

//! String inflection used for naming-convention inference.
//!
//! The core never hard-codes inflection rules; it goes through an
//! [`Inflector`], and [`EnglishInflector`] is just the default one.

/// Word transformations needed for presenter inference and labels.
pub trait Inflector {
    /// `Post` to `Posts`, `Person` to `People`.
    fn pluralize(&self, word: &str) -> String;

    /// `Posts` to `Post`, `People` to `Person`.
    fn singularize(&self, word: &str) -> String;

    /// `blog_post` to `BlogPost`.
    fn camelize(&self, word: &str) -> String {
        word.split('_')
            .filter(|part| !part.is_empty())
            .map(capitalize)
            .collect()
    }

    /// `author_name` to `Author name`, `author_id` to `Author`.
    fn humanize(&self, word: &str) -> String {
        let word = word.strip_suffix("_id").unwrap_or(word);
        let spaced = word.replace('_', " ");
        capitalize(spaced.trim())
    }
}

/// Uppercase the first character, leaving the rest untouched.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
];

/// `(singular, plural)`
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("movie", "movies"),
    ("zombie", "zombies"),
    ("ox", "oxen"),
    ("mouse", "mice"),
    ("goose", "geese"),
];

/// `(singular suffix, plural suffix)`, most specific first.
const PLURAL_RULES: &[(&str, &str)] = &[
    ("quiz", "quizzes"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("index", "indices"),
    ("alias", "aliases"),
    ("status", "statuses"),
    ("octopus", "octopi"),
    ("virus", "viri"),
    ("axis", "axes"),
    ("testis", "testes"),
    ("buffalo", "buffaloes"),
    ("tomato", "tomatoes"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("hive", "hives"),
    ("bus", "buses"),
    ("sis", "ses"),
    ("lf", "lves"),
    ("rf", "rves"),
    ("ch", "ches"),
    ("sh", "shes"),
    ("ss", "sses"),
    ("x", "xes"),
];

/// `(plural suffix, singular suffix)`, most specific first.
const SINGULAR_RULES: &[(&str, &str)] = &[
    ("quizzes", "quiz"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("indices", "index"),
    ("aliases", "alias"),
    ("alias", "alias"),
    ("statuses", "status"),
    ("status", "status"),
    ("octopi", "octopus"),
    ("viri", "virus"),
    ("axes", "axis"),
    ("testes", "testis"),
    ("buffaloes", "buffalo"),
    ("tomatoes", "tomato"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("hives", "hive"),
    ("buses", "bus"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("crises", "crisis"),
    ("lves", "lf"),
    ("rves", "rf"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("sses", "ss"),
    ("xes", "x"),
    ("ss", "ss"),
    ("us", "us"),
    ("is", "is"),
];

/// Default English inflection rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl EnglishInflector {
    fn inflect(
        word: &str,
        to_plural: bool,
        rules: &[(&str, &str)],
        fallback: impl Fn(&str, &str) -> String,
    ) -> String {
        if word.is_empty() {
            return String::new();
        }
        let lower = word.to_ascii_lowercase();
        if UNCOUNTABLE
            .iter()
            .any(|u| whole_word_suffix(word, &lower, u).is_some())
        {
            return word.to_owned();
        }
        for &(singular, plural) in IRREGULAR {
            let (from, to) = if to_plural {
                (singular, plural)
            } else {
                (plural, singular)
            };
            if let Some(stem_len) = whole_word_suffix(word, &lower, from) {
                return replace_suffix(word, stem_len, to);
            }
        }
        for (from, to) in rules {
            if let Some(stem) = lower.strip_suffix(from) {
                return replace_suffix(word, stem.len(), to);
            }
        }
        fallback(word, &lower)
    }
}

/// Length of the stem when `lower` ends with `suffix` and the suffix starts a
/// word of its own (start of input, after `_`, or at a capital letter).
fn whole_word_suffix(word: &str, lower: &str, suffix: &str) -> Option<usize> {
    let stem = lower.strip_suffix(suffix)?;
    let stem_len = stem.len();
    let at_boundary = stem.is_empty()
        || stem.ends_with('_')
        || word
            .get(stem_len..)
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_uppercase()));
    at_boundary.then_some(stem_len)
}

/// Keep `word[..stem_len]` and append `suffix`, capitalized when the part it
/// replaces was.
fn replace_suffix(word: &str, stem_len: usize, suffix: &str) -> String {
    let stem = word.get(..stem_len).unwrap_or_default();
    let capital = word
        .get(stem_len..)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_uppercase()));
    if capital {
        format!("{stem}{}", capitalize(suffix))
    } else {
        format!("{stem}{suffix}")
    }
}

fn is_consonant_y(lower: &str) -> bool {
    let Some(stem) = lower.strip_suffix('y') else {
        return false;
    };
    stem.ends_with("qu")
        || stem.ends_with(|c: char| c.is_ascii_alphabetic() && !"aeiouy".contains(c))
}

impl Inflector for EnglishInflector {
    fn pluralize(&self, word: &str) -> String {
        Self::inflect(word, true, PLURAL_RULES, |word, lower| {
            if lower.ends_with('s') {
                word.to_owned()
            } else if is_consonant_y(lower) {
                let stem = word.strip_suffix(['y', 'Y']).unwrap_or(word);
                format!("{stem}ies")
            } else {
                format!("{word}s")
            }
        })
    }

    fn singularize(&self, word: &str) -> String {
        Self::inflect(word, false, SINGULAR_RULES, |word, lower| {
            if lower.ends_with("ies") && lower.len() > 3 {
                let stem = word.get(..lower.len().saturating_sub(3)).unwrap_or_default();
                format!("{stem}y")
            } else if let Some(stem) = word.strip_suffix(['s', 'S']) {
                stem.to_owned()
            } else {
                word.to_owned()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        let inflector = EnglishInflector;
        assert_eq!(inflector.pluralize("Post"), "Posts");
        assert_eq!(inflector.pluralize("Comment"), "Comments");
        assert_eq!(inflector.pluralize("Category"), "Categories");
        assert_eq!(inflector.pluralize("Day"), "Days");
        assert_eq!(inflector.pluralize("Address"), "Addresses");
        assert_eq!(inflector.pluralize("Box"), "Boxes");
        assert_eq!(inflector.pluralize("Person"), "People");
        assert_eq!(inflector.pluralize("SalesPerson"), "SalesPeople");
        assert_eq!(inflector.pluralize("Status"), "Statuses");
        assert_eq!(inflector.pluralize("Wolf"), "Wolves");
        assert_eq!(inflector.pluralize("Sheep"), "Sheep");
        assert_eq!(inflector.pluralize("Price"), "Prices");
        assert_eq!(inflector.pluralize("Human"), "Humans");
        assert_eq!(inflector.pluralize("News"), "News");
        assert_eq!(inflector.pluralize(""), "");
    }

    #[test]
    fn test_singularize() {
        let inflector = EnglishInflector;
        assert_eq!(inflector.singularize("Posts"), "Post");
        assert_eq!(inflector.singularize("Categories"), "Category");
        assert_eq!(inflector.singularize("Addresses"), "Address");
        assert_eq!(inflector.singularize("Address"), "Address");
        assert_eq!(inflector.singularize("People"), "Person");
        assert_eq!(inflector.singularize("Statuses"), "Status");
        assert_eq!(inflector.singularize("Wolves"), "Wolf");
        assert_eq!(inflector.singularize("Analyses"), "Analysis");
        assert_eq!(inflector.singularize("Movies"), "Movie");
        assert_eq!(inflector.singularize("comments"), "comment");
        assert_eq!(inflector.singularize("Sheep"), "Sheep");
        assert_eq!(inflector.singularize("Women"), "Woman");
        assert_eq!(inflector.singularize("SalesPeople"), "SalesPerson");
    }

    #[test]
    fn test_round_trip_for_common_names() {
        let inflector = EnglishInflector;
        for word in ["Post", "Comment", "Author", "Category", "Person", "Box"] {
            assert_eq!(inflector.singularize(&inflector.pluralize(word)), word);
        }
    }

    #[test]
    fn test_camelize_and_humanize() {
        let inflector = EnglishInflector;
        assert_eq!(inflector.camelize("blog_post"), "BlogPost");
        assert_eq!(inflector.camelize("author"), "Author");
        assert_eq!(inflector.humanize("author_name"), "Author name");
        assert_eq!(inflector.humanize("author_id"), "Author");
        assert_eq!(inflector.humanize("title"), "Title");
    }
}

//! Technology and role taxonomy.
//!
//! Maps canonical technology or role names ("python", "frontend", "qa") to
//! the vocabulary a listing about that subject tends to use: synonyms,
//! Russian and English role names, neighbouring parts of the stack. The
//! relevance calculator uses it to recognise that a "Backend разработчик"
//! position is on-topic for the query "python" even though the word never
//! appears.
//!
//! # Matching rules
//!
//! A category is detected for a query when any of these hold:
//!
//! 1. a query variant equals the canonical term;
//! 2. a query variant equals one of the related terms;
//! 3. the canonical term is a substring of a query variant;
//! 4. a related term is a substring of the lowercased query itself.
//!
//! Rule 3 runs against the spelling variants so "front-end" and "frontend"
//! both find the `frontend` entry. Rule 4 runs against the plain query only,
//! which keeps short related terms like "ui" or "ml" from matching every
//! variant that happens to contain them after whitespace removal.

use std::collections::BTreeSet;

use crate::normalize::{self, Query};

/// One canonical term with its related vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub canonical: String,
    pub related: Vec<String>,
}

impl TaxonomyEntry {
    pub fn new<S: AsRef<str>>(canonical: &str, related: &[S]) -> Self {
        Self {
            canonical: clean_term(canonical),
            related: related
                .iter()
                .map(|t| clean_term(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// The canonical term followed by every related term.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.related.iter().map(String::as_str))
    }

    fn is_detected_by(&self, query: &Query) -> bool {
        let variants = query.variants();
        variants.contains(&self.canonical)
            || self.related.iter().any(|r| variants.contains(r))
            || variants.iter().any(|v| v.contains(self.canonical.as_str()))
            || self.related.iter().any(|r| query.as_str().contains(r.as_str()))
    }
}

/// Immutable category table plus the list of generic role words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    common_terms: BTreeSet<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Taxonomy {
    pub fn new(entries: Vec<TaxonomyEntry>, common_terms: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries,
            common_terms: common_terms
                .into_iter()
                .map(|t| clean_term(&t))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// The curated table shipped with the crate.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CATEGORIES
            .iter()
            .map(|&(canonical, related)| TaxonomyEntry::new(canonical, related))
            .collect();
        Self::new(entries, COMMON_TERMS.iter().map(|t| t.to_string()))
    }

    /// Add a category, replacing the related terms if the canonical term
    /// already exists. Existing entries keep their position.
    pub fn with_category(mut self, entry: TaxonomyEntry) -> Self {
        match self.entries.iter_mut().find(|e| e.canonical == entry.canonical) {
            Some(existing) => existing.related = entry.related,
            None => self.entries.push(entry),
        }
        self
    }

    pub fn with_common_terms(mut self, terms: impl IntoIterator<Item = String>) -> Self {
        self.common_terms = terms
            .into_iter()
            .map(|t| clean_term(&t))
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn common_terms(&self) -> &BTreeSet<String> {
        &self.common_terms
    }

    pub fn is_common_term(&self, token: &str) -> bool {
        self.common_terms.contains(token)
    }

    /// Categories the query refers to, in table order.
    pub fn detect_categories(&self, query: &Query) -> Vec<&TaxonomyEntry> {
        if query.is_empty() {
            return Vec::new();
        }
        self.entries.iter().filter(|e| e.is_detected_by(query)).collect()
    }

    /// Whether `text` contains related vocabulary of any category detected
    /// for the query. The text is lowercased and checked in all of its
    /// spelling variants.
    pub fn matches_category(&self, query: &Query, text: &str) -> bool {
        Self::text_matches(&self.detect_categories(query), text)
    }

    /// [`matches_category`](Self::matches_category) for categories that were
    /// already detected.
    pub fn text_matches(categories: &[&TaxonomyEntry], text: &str) -> bool {
        if categories.is_empty() {
            return false;
        }
        let text_variants = normalize::variants(text);
        categories.iter().any(|entry| {
            entry
                .related
                .iter()
                .any(|term| text_variants.iter().any(|t| t.contains(term.as_str())))
        })
    }

    /// Categories whose canonical term appears literally in the lowercased
    /// query. This is the plain lookup used for sphere tags.
    pub fn named_in<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a TaxonomyEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| !query.is_empty() && query.contains(e.canonical.as_str()))
    }
}

fn clean_term(term: &str) -> String {
    term.trim().to_lowercase()
}

const COMMON_TERMS: &[&str] = &[
    "разработка",
    "программирование",
    "development",
    "engineer",
    "инженер",
    "developer",
    "программист",
    "специалист",
    "junior",
    "middle",
    "senior",
    "lead",
    "стажер",
    "intern",
    "trainee",
];

const FRONTEND_TERMS: &[&str] = &[
    "разработка",
    "веб",
    "web",
    "ui",
    "верстка",
    "интерфейс",
    "клиентская часть",
    "front end",
    "front-end",
    "фронт",
    "front",
    "фронтенд разработка",
    "frontend разработка",
    "front end разработка",
    "веб разработка",
];

const MOBILE_TERMS: &[&str] = &[
    "разработка",
    "разработчик",
    "программист",
    "mobile",
    "мобильная разработка",
    "мобильный",
];

const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "python",
        &["разработка", "разработчик", "программист", "backend", "бэкенд", "data science", "ml"],
    ),
    (
        "java",
        &["разработка", "разработчик", "программист", "backend", "бэкенд", "enterprise"],
    ),
    (
        "javascript",
        &[
            "разработка",
            "разработчик",
            "программист",
            "frontend",
            "фронтенд",
            "веб",
            "web",
            "fullstack",
        ],
    ),
    (
        "typescript",
        &["разработка", "разработчик", "программист", "frontend", "фронтенд", "fullstack"],
    ),
    (
        "c#",
        &["разработка", "разработчик", "программист", "backend", "бэкенд", ".net", "desktop"],
    ),
    (
        "c++",
        &["разработка", "разработчик", "программист", "системный", "низкоуровневый"],
    ),
    (
        "go",
        &["разработка", "разработчик", "программист", "backend", "бэкенд", "golang"],
    ),
    (
        "php",
        &["разработка", "разработчик", "программист", "backend", "бэкенд", "веб", "web"],
    ),
    (
        "ruby",
        &["разработка", "разработчик", "программист", "backend", "бэкенд", "rails"],
    ),
    ("android", MOBILE_TERMS),
    ("ios", MOBILE_TERMS),
    (
        "swift",
        &["ios", "mobile", "мобильная разработка", "мобильный", "разработка", "apple"],
    ),
    (
        "kotlin",
        &["android", "mobile", "мобильная разработка", "мобильный", "разработка"],
    ),
    (
        "flutter",
        &["mobile", "мобильная разработка", "мобильный", "cross-platform", "кроссплатформенный"],
    ),
    (
        "react native",
        &["mobile", "мобильная разработка", "мобильный", "cross-platform", "кроссплатформенный"],
    ),
    ("frontend", FRONTEND_TERMS),
    ("front end", FRONTEND_TERMS),
    ("front-end", FRONTEND_TERMS),
    ("backend", &["разработка", "сервер", "серверная часть", "api", "бэкенд"]),
    (
        "fullstack",
        &["разработка", "веб", "web", "full stack", "фулстэк", "полный стек"],
    ),
    ("html", &["frontend", "фронтенд", "верстка", "веб", "web"]),
    ("css", &["frontend", "фронтенд", "верстка", "веб", "web", "стили"]),
    ("react", &["frontend", "фронтенд", "javascript", "веб", "web", "ui"]),
    (
        "angular",
        &["frontend", "фронтенд", "javascript", "typescript", "веб", "web"],
    ),
    ("vue", &["frontend", "фронтенд", "javascript", "веб", "web"]),
    (
        "data science",
        &[
            "аналитика",
            "data",
            "машинное обучение",
            "ml",
            "анализ данных",
            "дата сайенс",
            "исследование данных",
        ],
    ),
    (
        "machine learning",
        &[
            "ml",
            "машинное обучение",
            "data science",
            "искусственный интеллект",
            "ai",
            "глубокое обучение",
        ],
    ),
    (
        "data engineering",
        &["data", "данные", "etl", "pipeline", "хранилище данных", "big data"],
    ),
    (
        "data analysis",
        &["аналитика", "анализ данных", "data science", "статистика", "визуализация"],
    ),
    (
        "big data",
        &["data", "большие данные", "hadoop", "spark", "data engineering"],
    ),
    (
        "qa",
        &["тестирование", "тестировщик", "quality assurance", "контроль качества"],
    ),
    (
        "testing",
        &["тестирование", "тесты", "qa", "quality assurance", "автотесты"],
    ),
    (
        "automation testing",
        &["автоматизация тестирования", "автотесты", "qa", "автоматизация"],
    ),
    ("manual testing", &["ручное тестирование", "тестировщик", "qa"]),
    (
        "devops",
        &["инфраструктура", "деплой", "ci/cd", "kubernetes", "docker", "облако", "cloud"],
    ),
    (
        "sre",
        &["надежность", "инфраструктура", "мониторинг", "devops", "site reliability"],
    ),
    (
        "cloud",
        &["облако", "облачные технологии", "aws", "azure", "gcp", "devops"],
    ),
    (
        "kubernetes",
        &["k8s", "оркестрация", "контейнеры", "devops", "docker"],
    ),
    ("docker", &["контейнеры", "контейнеризация", "devops", "kubernetes"]),
    (
        "security",
        &["безопасность", "информационная безопасность", "кибербезопасность", "защита"],
    ),
    (
        "pentesting",
        &["тестирование на проникновение", "этичный хакинг", "security", "безопасность"],
    ),
    (
        "ux",
        &[
            "user experience",
            "пользовательский опыт",
            "дизайн",
            "ui/ux",
            "проектирование интерфейсов",
        ],
    ),
    (
        "ui",
        &["user interface", "интерфейс", "дизайн", "ui/ux", "графический дизайн"],
    ),
    ("design", &["дизайн", "проектирование", "ui", "ux", "графика"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn canonicals(taxonomy: &Taxonomy, query: &str) -> Vec<String> {
        taxonomy
            .detect_categories(&Query::new(query))
            .into_iter()
            .map(|e| e.canonical.clone())
            .collect()
    }

    #[test]
    fn test_builtin_table_shape() {
        let t = Taxonomy::builtin();
        assert_eq!(t.entries().len(), BUILTIN_CATEGORIES.len());
        assert_eq!(t.entries()[0].canonical, "python");
        assert!(t.is_common_term("developer"));
        assert!(!t.is_common_term("python"));
    }

    #[test]
    fn test_detect_exact_canonical() {
        let found = canonicals(&Taxonomy::builtin(), "Python");
        assert!(found.contains(&"python".to_string()));
    }

    #[test]
    fn test_detect_is_hyphen_and_space_insensitive() {
        let t = Taxonomy::builtin();
        for q in ["frontend", "front end", "front-end", "Front-End"] {
            let found = canonicals(&t, q);
            assert!(found.contains(&"frontend".to_string()), "{} -> {:?}", q, found);
        }
    }

    #[test]
    fn test_detect_canonical_inside_query() {
        let found = canonicals(&Taxonomy::builtin(), "стажировка golang backend");
        assert!(found.contains(&"go".to_string()));
        assert!(found.contains(&"backend".to_string()));
    }

    #[test]
    fn test_detect_related_term_in_raw_query() {
        // "android" is related vocabulary of kotlin
        let found = canonicals(&Taxonomy::builtin(), "android");
        assert!(found.contains(&"android".to_string()));
        assert!(found.contains(&"kotlin".to_string()));
    }

    #[test]
    fn test_detect_variant_equals_related_term() {
        // only the "full stack" variant reaches fullstack's vocabulary
        let found = canonicals(&Taxonomy::builtin(), "full-stack");
        assert!(found.contains(&"fullstack".to_string()), "{:?}", found);
    }

    #[test]
    fn test_text_matches_detected_categories() {
        let t = Taxonomy::builtin();
        let detected = t.detect_categories(&Query::new("python"));
        assert!(Taxonomy::text_matches(&detected, "Backend разработчик"));
        assert!(!Taxonomy::text_matches(&detected, "маркетолог"));
        assert!(!Taxonomy::text_matches(&[], "backend"));
    }

    #[test]
    fn test_detect_nothing_for_unrelated_query() {
        assert!(canonicals(&Taxonomy::builtin(), "hr").is_empty());
        assert!(canonicals(&Taxonomy::builtin(), "").is_empty());
    }

    #[test]
    fn test_matches_category() {
        let t = Taxonomy::builtin();
        let q = Query::new("python");
        assert!(t.matches_category(&q, "backend разработчик"));
        assert!(!t.matches_category(&q, "маркетолог"));
        assert!(!t.matches_category(&Query::new("hr"), "backend разработчик"));
    }

    #[test]
    fn test_matches_category_uses_text_variants() {
        let t = Taxonomy::builtin();
        // "frontend" only appears once the space is removed from the text
        assert!(t.matches_category(&Query::new("html"), "Front End стажер"));
    }

    #[test]
    fn test_named_in_is_plain_substring() {
        let t = Taxonomy::builtin();
        let named: Vec<&str> = t
            .named_in("python разработчик")
            .map(|e| e.canonical.as_str())
            .collect();
        assert_eq!(named, vec!["python"]);
        assert_eq!(t.named_in("").count(), 0);
    }

    #[test]
    fn test_with_category_replaces_or_appends() {
        let t = Taxonomy::builtin()
            .with_category(TaxonomyEntry::new("Rust", &["системный", "backend"]))
            .with_category(TaxonomyEntry::new("qa", &["тестирование"]));
        let rust = t.entries().last().unwrap();
        assert_eq!(rust.canonical, "rust");
        let qa = t.entries().iter().find(|e| e.canonical == "qa").unwrap();
        assert_eq!(qa.related, vec!["тестирование".to_string()]);
        assert_eq!(t.entries().len(), BUILTIN_CATEGORIES.len() + 1);
    }
}

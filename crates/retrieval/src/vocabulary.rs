use crate::error::{Result, RetrievalError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Closed enumeration of seniority levels. A text may match zero or several
/// of them; ambiguous phrasing is preserved, not resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeniorityLevel {
    Intern,
    Junior,
    Mid,
    Senior,
}

impl SeniorityLevel {
    pub const ALL: [Self; 4] = [Self::Intern, Self::Junior, Self::Mid, Self::Senior];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Intern => "intern",
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
        }
    }
}

/// The skill terms the default vocabulary recognizes. Carried over from the
/// catalog domain this engine was built for (hiring queries against
/// assessment catalogs); callers with a different domain construct their own
/// `Vocabulary`.
const SKILL_TERMS: &[&str] = &[
    // Programming languages
    "java",
    "python",
    "javascript",
    "typescript",
    "c#",
    "c++",
    "ruby",
    "go",
    "rust",
    "php",
    "swift",
    "kotlin",
    "scala",
    "sql",
    "html",
    "css",
    "react",
    "angular",
    "vue",
    "node.js",
    // Data & ML
    "machine learning",
    "deep learning",
    "nlp",
    "data science",
    "tensorflow",
    "pytorch",
    "pandas",
    "numpy",
    // Cloud & DevOps
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "ci/cd",
    // Databases
    "mysql",
    "postgresql",
    "mongodb",
    "redis",
    "elasticsearch",
    // Soft skills & process
    "leadership",
    "management",
    "communication",
    "agile",
    "scrum",
    "git",
    // Domains
    "finance",
    "healthcare",
    "ecommerce",
    "api",
    "microservices",
];

const SENIORITY_SYNONYMS: &[(SeniorityLevel, &[&str])] = &[
    (
        SeniorityLevel::Intern,
        &[
            "intern",
            "internship",
            "trainee",
            "graduate",
            "entry level",
            "entry-level",
        ],
    ),
    (SeniorityLevel::Junior, &["junior", "jr"]),
    (
        SeniorityLevel::Mid,
        &["mid-level", "mid level", "intermediate", "experienced"],
    ),
    (
        SeniorityLevel::Senior,
        &["senior", "sr", "lead", "principal", "staff"],
    ),
];

struct TermMatcher {
    tag: String,
    pattern: Regex,
}

impl TermMatcher {
    fn new(tag: &str, term: &str) -> Result<Self> {
        let pattern = Regex::new(&term_pattern(term)).map_err(|err| {
            RetrievalError::Vocabulary(format!("term '{term}' does not compile: {err}"))
        })?;
        Ok(Self {
            tag: tag.to_string(),
            pattern,
        })
    }

    fn matches(&self, normalized: &str) -> bool {
        self.pattern.is_match(normalized)
    }
}

/// Word-boundary pattern for one vocabulary term, matched against
/// case-folded text. A term ending in an alphanumeric also matches its
/// simple plural, and terms with interior separators (`node.js`, `ci/cd`,
/// `machine learning`) additionally match their collapsed compound spelling
/// (`nodejs`, `cicd`).
fn term_pattern(term: &str) -> String {
    let mut variants = vec![variant_pattern(term)];
    let collapsed: String = term
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/' | ' '))
        .collect();
    if collapsed != term && !collapsed.is_empty() {
        variants.push(variant_pattern(&collapsed));
    }
    format!("(?:{})", variants.join("|"))
}

/// Boundary rules for one spelling. Terms with non-alphanumeric edges
/// (`c++`, `c#`) get a boundary only on the alphanumeric side — `\b` next
/// to punctuation would never match.
fn variant_pattern(term: &str) -> String {
    let escaped = regex::escape(term);
    let mut pattern = String::with_capacity(escaped.len() + 8);
    if term.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&escaped);
    if term.ends_with(|c: char| c.is_ascii_alphanumeric()) {
        pattern.push_str(r"s?\b");
    }
    pattern
}

/// Two disjoint fixed dictionaries: open-ended skill terms and the closed
/// seniority enumeration with its synonym lists. Immutable after
/// construction and passed explicitly into the extractor, so tests can run
/// against alternate vocabularies.
pub struct Vocabulary {
    skills: Vec<TermMatcher>,
    seniority: Vec<(SeniorityLevel, Vec<TermMatcher>)>,
}

impl Vocabulary {
    pub fn new(
        skills: &[&str],
        seniority: &[(SeniorityLevel, &[&str])],
    ) -> Result<Self> {
        let skills = skills
            .iter()
            .map(|term| TermMatcher::new(term, term))
            .collect::<Result<Vec<_>>>()?;
        let seniority = seniority
            .iter()
            .map(|(level, synonyms)| {
                let matchers = synonyms
                    .iter()
                    .map(|synonym| TermMatcher::new(level.tag(), synonym))
                    .collect::<Result<Vec<_>>>()?;
                Ok((*level, matchers))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { skills, seniority })
    }

    /// Skill tags whose term (or plural variant) occurs in the normalized
    /// text. All matches are returned; there is no early exit.
    pub(crate) fn matching_skills<'a>(
        &'a self,
        normalized: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.skills
            .iter()
            .filter(move |matcher| matcher.matches(normalized))
            .map(|matcher| matcher.tag.as_str())
    }

    /// Seniority levels with at least one matching synonym.
    pub(crate) fn matching_seniority<'a>(
        &'a self,
        normalized: &'a str,
    ) -> impl Iterator<Item = SeniorityLevel> + 'a {
        self.seniority
            .iter()
            .filter(move |(_, matchers)| matchers.iter().any(|m| m.matches(normalized)))
            .map(|(level, _)| *level)
    }

    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }
}

static DEFAULT_VOCABULARY: Lazy<Arc<Vocabulary>> = Lazy::new(|| {
    Arc::new(
        Vocabulary::new(SKILL_TERMS, SENIORITY_SYNONYMS)
            .expect("builtin vocabulary terms must compile"),
    )
});

/// The process-wide default vocabulary, built once.
#[must_use]
pub fn default_vocabulary() -> Arc<Vocabulary> {
    DEFAULT_VOCABULARY.clone()
}

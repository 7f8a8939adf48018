//! The campus assistant. It answers from an ordered list of keyword rules: the first rule with a
//! keyword found in the message wins, otherwise a fallback answer is given.

/// Replaced with the student's name in a response.
const NAME_PLACEHOLDER: &str = "{name}";

const FALLBACK: &str = "Thanks for your question! I can help with schedules, grades, attendance \
and finances. Is there something specific you would like to know?";

/// One keyword rule. Keywords are matched as lower-case substrings of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    keywords: Vec<String>,
    response: String,
}

impl Rule {
    pub fn new<S>(keywords: impl IntoIterator<Item = S>, response: impl Into<String>) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            response: response.into(),
        }
    }

    fn matches(&self, message: &str) -> bool {
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }
}

/// The ordered rule list plus the answer given when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    rules: Vec<Rule>,
    fallback: String,
}

impl Rules {
    pub fn new(rules: Vec<Rule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Answers `message` on behalf of `student_name`.
    pub fn reply(&self, message: &str, student_name: &str) -> String {
        let lower = message.to_lowercase();
        let response = self
            .rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.response.as_str())
            .unwrap_or(&self.fallback);
        response.replace(NAME_PLACEHOLDER, student_name)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(
            vec![
                Rule::new(
                    ["jadwal", "schedule"],
                    "To manage your class schedule use `campus schedule`. You can add, edit, \
                    list and delete the courses you attend each week.",
                ),
                Rule::new(
                    ["nilai", "grade", "score"],
                    "To record grades use `campus grade add` with your task, midterm and final \
                    exam scores. The final score, letter and your average (IPK) are computed \
                    for you.",
                ),
                Rule::new(
                    ["keuangan", "uang", "rupiah", "money", "finance"],
                    "Use `campus transaction` to record income and expenses in Rupiah, and \
                    `campus report ledger` to see monthly or weekly statistics by category.",
                ),
                Rule::new(
                    ["halo", "hai", "hello"],
                    "Hello {name}! I am the Smart Campus assistant. How can I help you with \
                    your studies today?",
                ),
                Rule::new(
                    ["bantuan", "help"],
                    "I can help you with:\n- your class schedule\n- grades and IPK\n- \
                    attendance\n- your finances in Rupiah\n\nJust ask!",
                ),
                Rule::new(
                    ["smart campus"],
                    "Smart Campus helps students manage their class schedule, grades, \
                    attendance and personal finances in one place.",
                ),
            ],
            FALLBACK,
        )
    }
}

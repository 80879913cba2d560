/// Domain selected when the client starts.
pub const DEFAULT_DOMAIN: &str = "hr";

const DOMAINS: &[(&str, &str)] = &[
    ("hr", "HR"),
    ("finance", "Finance"),
    ("procurement", "Procurement"),
];

const PROMPTS: &[(&str, &[&str])] = &[
    (
        "hr",
        &[
            "Tell me about leave policy in the company",
            "How do I submit a leave request?",
            "I want to apply for leave",
            "Help me apply for leave",
        ],
    ),
    (
        "procurement",
        &[
            "What is the procurement process?",
            "How to order new laptops?",
            "I want to place an order",
        ],
    ),
    (
        "finance",
        &[
            "Show me the latest invoice status",
            "How to claim expenses?",
            "I need to process an invoice",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedQuestion {
    pub question: String,
}

pub fn default_domains() -> Vec<Domain> {
    DOMAINS
        .iter()
        .map(|(key, text)| Domain {
            key: (*key).to_string(),
            text: (*text).to_string(),
        })
        .collect()
}

/// Recommended questions for `domain`; empty when the domain is not mapped.
pub fn recommendations_for(domain: &str) -> Vec<RecommendedQuestion> {
    PROMPTS
        .iter()
        .find(|(key, _)| *key == domain)
        .map(|(_, questions)| {
            questions
                .iter()
                .map(|question| RecommendedQuestion {
                    question: (*question).to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

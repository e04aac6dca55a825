//! Keyword dispatch for the payment assistant
//!
//! Rules are checked top to bottom and the first category with a trigger
//! word in the (lower-cased) input wins. The reply is drawn uniformly at
//! random from that category's list so repeated questions don't always get
//! the same wording. The random source is passed in by the caller.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::responses::builtin;

/// Reply categories, in match priority order (fallback last)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Schedule,
    Transaction,
    Security,
    Education,
    Optimization,
    Fees,
    Greeting,
    Thanks,
    Fallback,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Schedule,
        Category::Transaction,
        Category::Security,
        Category::Education,
        Category::Optimization,
        Category::Fees,
        Category::Greeting,
        Category::Thanks,
        Category::Fallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Schedule => "schedule",
            Category::Transaction => "transaction",
            Category::Security => "security",
            Category::Education => "education",
            Category::Optimization => "optimization",
            Category::Fees => "fees",
            Category::Greeting => "greeting",
            Category::Thanks => "thanks",
            Category::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger words per category, evaluated in this order
const RULES: &[(Category, &[&str])] = &[
    (Category::Schedule, &["schedule", "recurring", "monthly"]),
    (Category::Transaction, &["transaction", "explain", "last"]),
    (Category::Security, &["security", "safe", "protect"]),
    (Category::Education, &["best practice", "usdc", "guide"]),
    (Category::Optimization, &["optimization", "optimize", "improve"]),
    (Category::Fees, &["fee", "cost", "gas"]),
    (
        Category::Greeting,
        &["hello", "hi there", "hey there", "good morning", "good afternoon", "good evening"],
    ),
    (Category::Thanks, &["thank", "thx", "appreciate"]),
];

/// Placeholder replaced by the user's own words
pub const MESSAGE_PLACEHOLDER: &str = "{message}";

/// Errors building a response table
#[derive(Debug, thiserror::Error)]
pub enum ResponseTableError {
    #[error("Category has no replies: {0}")]
    EmptyCategory(Category),

    #[error("Category missing from table: {0}")]
    MissingCategory(Category),
}

/// Category -> non-empty list of canned replies
#[derive(Debug, Clone)]
pub struct ResponseTable {
    replies: HashMap<Category, Vec<String>>,
}

impl ResponseTable {
    /// Every category, fallback included, must have at least one reply
    pub fn new(replies: HashMap<Category, Vec<String>>) -> Result<Self, ResponseTableError> {
        for category in Category::ALL {
            match replies.get(&category) {
                None => return Err(ResponseTableError::MissingCategory(category)),
                Some(list) if list.is_empty() => {
                    return Err(ResponseTableError::EmptyCategory(category))
                }
                Some(_) => {}
            }
        }
        Ok(Self { replies })
    }

    /// The compiled-in replies
    pub fn builtin() -> Self {
        let replies = Category::ALL
            .into_iter()
            .map(|category| {
                let list = builtin::replies(category)
                    .iter()
                    .map(|reply| reply.to_string())
                    .collect();
                (category, list)
            })
            .collect();
        Self { replies }
    }

    pub fn replies(&self, category: Category) -> &[String] {
        self.replies
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Give up the table as a plain map, e.g. to overlay a response file
    pub fn into_replies(self) -> HashMap<Category, Vec<String>> {
        self.replies
    }

    fn pick<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> &str {
        let list = self.replies(category);
        match list.len() {
            0 => "",
            1 => &list[0],
            n => &list[rng.gen_range(0..n)],
        }
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A dispatched reply and the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub category: Category,
    pub text: String,
}

/// Maps free text to one canned reply
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: ResponseTable,
}

impl Dispatcher {
    pub fn new(table: ResponseTable) -> Self {
        Self { table }
    }

    /// First rule with a matching trigger word, or [`Category::Fallback`]
    pub fn classify(&self, input: &str) -> Category {
        let message = input.to_lowercase();
        RULES
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|word| message.contains(word)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Fallback)
    }

    /// Pick a reply for `input`
    pub fn dispatch<R: Rng + ?Sized>(&self, input: &str, rng: &mut R) -> Reply {
        let category = self.classify(input);
        let text = self
            .table
            .pick(category, rng)
            .replace(MESSAGE_PLACEHOLDER, input.trim());

        tracing::debug!(%category, "Dispatched assistant reply");
        Reply { category, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table_with(category: Category, list: Vec<&str>) -> HashMap<Category, Vec<String>> {
        let mut replies: HashMap<Category, Vec<String>> = Category::ALL
            .into_iter()
            .map(|c| (c, vec![format!("{} reply", c)]))
            .collect();
        replies.insert(category, list.into_iter().map(String::from).collect());
        replies
    }

    #[test]
    fn test_classify_priority_order() {
        let dispatcher = Dispatcher::default();

        assert_eq!(dispatcher.classify("How do I SCHEDULE a payment?"), Category::Schedule);
        assert_eq!(dispatcher.classify("Explain my last transaction"), Category::Transaction);
        assert_eq!(dispatcher.classify("Is my wallet safe?"), Category::Security);
        assert_eq!(dispatcher.classify("What are USDC best practices?"), Category::Education);
        assert_eq!(dispatcher.classify("help me optimize"), Category::Optimization);
        assert_eq!(dispatcher.classify("why is gas so high"), Category::Fees);
        assert_eq!(dispatcher.classify("Hello!"), Category::Greeting);
        assert_eq!(dispatcher.classify("thanks a lot"), Category::Thanks);

        // "monthly" beats "fee": schedule is checked before fees
        assert_eq!(dispatcher.classify("monthly fee"), Category::Schedule);
        // "usdc" beats "cost"
        assert_eq!(dispatcher.classify("usdc cost"), Category::Education);
    }

    #[test]
    fn test_unrelated_input_falls_back() {
        let dispatcher = Dispatcher::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let reply = dispatcher.dispatch("asdkjasdj completely unrelated", &mut rng);
            assert_eq!(reply.category, Category::Fallback);
        }
    }

    #[test]
    fn test_empty_input_falls_back() {
        let dispatcher = Dispatcher::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(dispatcher.dispatch("", &mut rng).category, Category::Fallback);
        assert_eq!(dispatcher.dispatch("   ", &mut rng).category, Category::Fallback);
    }

    #[test]
    fn test_schedule_always_answers_from_schedule() {
        let dispatcher = Dispatcher::default();
        let schedule = ResponseTable::builtin().replies(Category::Schedule).to_vec();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let reply = dispatcher.dispatch("can you schedule rent?", &mut rng);
            assert_eq!(reply.category, Category::Schedule);
            assert!(schedule.contains(&reply.text));
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let dispatcher = Dispatcher::default();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);

        for input in ["fees?", "schedule", "security", "nothing here"] {
            assert_eq!(dispatcher.dispatch(input, &mut a), dispatcher.dispatch(input, &mut b));
        }
    }

    #[test]
    fn test_every_reply_is_reachable() {
        let table = ResponseTable::new(table_with(Category::Fees, vec!["a", "b", "c"])).unwrap();
        let dispatcher = Dispatcher::new(table);
        let mut rng = StdRng::seed_from_u64(3);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            seen.insert(dispatcher.dispatch("gas", &mut rng).text);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_message_placeholder() {
        let table =
            ResponseTable::new(table_with(Category::Fallback, vec!["You asked about \"{message}\"."]))
                .unwrap();
        let dispatcher = Dispatcher::new(table);
        let mut rng = StdRng::seed_from_u64(0);

        let reply = dispatcher.dispatch("  Weather on Mars  ", &mut rng);
        assert_eq!(reply.text, "You asked about \"Weather on Mars\".");
    }

    #[test]
    fn test_table_validation() {
        let err = ResponseTable::new(table_with(Category::Fallback, vec![])).unwrap_err();
        assert!(matches!(err, ResponseTableError::EmptyCategory(Category::Fallback)));

        let mut replies = table_with(Category::Fees, vec!["x"]);
        replies.remove(&Category::Thanks);
        let err = ResponseTable::new(replies).unwrap_err();
        assert!(matches!(err, ResponseTableError::MissingCategory(Category::Thanks)));
    }

    #[test]
    fn test_builtin_table_is_complete() {
        let table = ResponseTable::builtin();
        for category in Category::ALL {
            assert!(!table.replies(category).is_empty(), "{} is empty", category);
        }
        assert!(table
            .replies(Category::Fallback)
            .iter()
            .all(|reply| reply.contains(MESSAGE_PLACEHOLDER)));
    }
}

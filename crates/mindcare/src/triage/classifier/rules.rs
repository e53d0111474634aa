use super::Category;

/// Validation failures raised while assembling a rule set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    #[error("no crisis rule configured; crisis detection cannot be disabled")]
    MissingCrisisRule,
    #[error("crisis reply must reference the crisis hotline '{hotline}'")]
    CrisisReplyWithoutHotline { hotline: String },
    #[error("'{0}' is the fallback category and cannot carry keywords")]
    FallbackCategory(Category),
    #[error("{0} rule has no keywords")]
    NoKeywords(Category),
    #[error("{0} rule contains an empty keyword")]
    EmptyKeyword(Category),
    #[error("{0} rule has an empty reply")]
    EmptyReply(Category),
}

/// Keyword vocabulary and canned reply for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    category: Category,
    keywords: Vec<String>,
    reply: String,
}

impl KeywordRule {
    /// Keywords are case-folded and de-duplicated; declaration order is kept. Surrounding
    /// spaces are part of the keyword, so `" die "` does not match inside "diet".
    pub fn new<I, S>(
        category: Category,
        keywords: I,
        reply: impl Into<String>,
    ) -> Result<Self, RuleSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if category == Category::General {
            return Err(RuleSetError::FallbackCategory(category));
        }

        let mut folded: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().to_lowercase();
            if keyword.trim().is_empty() {
                return Err(RuleSetError::EmptyKeyword(category));
            }
            if !folded.contains(&keyword) {
                folded.push(keyword);
            }
        }
        if folded.is_empty() {
            return Err(RuleSetError::NoKeywords(category));
        }

        let reply = reply.into();
        if reply.trim().is_empty() {
            return Err(RuleSetError::EmptyReply(category));
        }

        Ok(Self {
            category,
            keywords: folded,
            reply,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Returns the first keyword contained in already case-folded text.
    pub(crate) fn first_match(&self, folded: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| folded.contains(keyword.as_str()))
            .map(String::as_str)
    }

    fn absorb(&mut self, other: KeywordRule) {
        for keyword in other.keywords {
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }
}

/// Outcome of evaluating the rule set against one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RuleMatch<'a> {
    pub category: Category,
    pub reply: &'a str,
    pub keyword: Option<&'a str>,
}

/// Ordered keyword rules with the crisis rule held in a dedicated slot.
///
/// The crisis rule is always evaluated first. The remaining tiers are sorted by
/// [`Category::priority`] and then declaration order, so rule data can be listed in
/// any order without changing which category wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    crisis: KeywordRule,
    tiers: Vec<KeywordRule>,
    fallback_reply: String,
}

impl RuleSet {
    pub fn new(
        crisis: KeywordRule,
        rules: Vec<KeywordRule>,
        fallback_reply: impl Into<String>,
    ) -> Result<Self, RuleSetError> {
        if crisis.category != Category::Crisis {
            return Err(RuleSetError::MissingCrisisRule);
        }

        let mut crisis = crisis;
        let mut tiers = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.category == Category::Crisis {
                crisis.absorb(rule);
            } else {
                tiers.push(rule);
            }
        }
        // stable: equal priorities keep declaration order
        tiers.sort_by_key(|rule| rule.category.priority());

        let fallback_reply = fallback_reply.into();
        if fallback_reply.trim().is_empty() {
            return Err(RuleSetError::EmptyReply(Category::General));
        }

        Ok(Self {
            crisis,
            tiers,
            fallback_reply,
        })
    }

    pub fn crisis(&self) -> &KeywordRule {
        &self.crisis
    }

    /// Non-crisis rules in evaluation order.
    pub fn tiers(&self) -> &[KeywordRule] {
        &self.tiers
    }

    pub fn fallback_reply(&self) -> &str {
        &self.fallback_reply
    }

    pub(crate) fn evaluate(&self, folded: &str) -> RuleMatch<'_> {
        std::iter::once(&self.crisis)
            .chain(self.tiers.iter())
            .find_map(|rule| {
                rule.first_match(folded).map(|keyword| RuleMatch {
                    category: rule.category,
                    reply: &rule.reply,
                    keyword: Some(keyword),
                })
            })
            .unwrap_or(RuleMatch {
                category: Category::General,
                reply: &self.fallback_reply,
                keyword: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crisis() -> KeywordRule {
        KeywordRule::new(Category::Crisis, ["Hurt", "die"], "Call 988 now").expect("valid")
    }

    #[test]
    fn keywords_are_folded_and_deduplicated() {
        let rule = KeywordRule::new(Category::Anxiety, ["Panic", "PANIC", "WORRY"], "breathe")
            .expect("valid rule");
        assert_eq!(rule.keywords(), ["panic", "worry"]);
    }

    #[test]
    fn padded_keywords_keep_their_spaces() {
        let rule = KeywordRule::new(Category::Crisis, [" Die "], "Call 988 now").expect("valid");
        assert_eq!(rule.keywords(), [" die "]);

        let rules = RuleSet::new(rule, Vec::new(), "tell me more").expect("rule set");
        assert_eq!(rules.evaluate("starting a new diet").category, Category::General);

        let hit = rules.evaluate("i could die now");
        assert_eq!(hit.category, Category::Crisis);
        assert_eq!(hit.keyword, Some(" die "));
    }

    #[test]
    fn general_cannot_be_a_keyword_rule() {
        let err = KeywordRule::new(Category::General, ["hello"], "hi").unwrap_err();
        assert_eq!(err, RuleSetError::FallbackCategory(Category::General));
    }

    #[test]
    fn blank_keywords_are_rejected() {
        let err = KeywordRule::new(Category::Anxiety, ["panic", "  "], "breathe").unwrap_err();
        assert_eq!(err, RuleSetError::EmptyKeyword(Category::Anxiety));

        let err =
            KeywordRule::new(Category::Anxiety, Vec::<String>::new(), "breathe").unwrap_err();
        assert_eq!(err, RuleSetError::NoKeywords(Category::Anxiety));
    }

    #[test]
    fn tiers_are_sorted_by_priority_not_declaration() {
        let academic = KeywordRule::new(Category::AcademicStress, ["exam"], "study").unwrap();
        let depression = KeywordRule::new(Category::Depression, ["sad"], "hear you").unwrap();
        let anxiety = KeywordRule::new(Category::Anxiety, ["stress"], "breathe").unwrap();

        let rules = RuleSet::new(crisis(), vec![academic, depression, anxiety], "tell me more")
            .expect("rule set");

        let order: Vec<Category> = rules.tiers().iter().map(KeywordRule::category).collect();
        assert_eq!(
            order,
            vec![
                Category::Anxiety,
                Category::Depression,
                Category::AcademicStress
            ]
        );
    }

    #[test]
    fn extra_crisis_rules_merge_into_the_hoisted_slot() {
        let extra = KeywordRule::new(Category::Crisis, ["overdose", "die"], "ignored").unwrap();
        let rules = RuleSet::new(crisis(), vec![extra], "tell me more").expect("rule set");

        assert!(rules.tiers().is_empty());
        assert_eq!(rules.crisis().keywords(), ["hurt", "die", "overdose"]);
        assert_eq!(rules.crisis().reply(), "Call 988 now");
    }

    #[test]
    fn non_crisis_rule_cannot_fill_the_crisis_slot() {
        let anxiety = KeywordRule::new(Category::Anxiety, ["stress"], "breathe").unwrap();
        let err = RuleSet::new(anxiety, Vec::new(), "tell me more").unwrap_err();
        assert_eq!(err, RuleSetError::MissingCrisisRule);
    }

    #[test]
    fn evaluate_reports_matched_keyword() {
        let rules = RuleSet::new(crisis(), Vec::new(), "tell me more").unwrap();

        let hit = rules.evaluate("i want to die");
        assert_eq!(hit.category, Category::Crisis);
        assert_eq!(hit.keyword, Some("die"));

        let miss = rules.evaluate("good morning");
        assert_eq!(miss.category, Category::General);
        assert_eq!(miss.keyword, None);
        assert_eq!(miss.reply, "tell me more");
    }
}

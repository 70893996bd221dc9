//! Canned boardroom insights.
//!
//! Nothing here infers anything: every message comes from a static table,
//! chosen either by the first matching rule or by a pick from a fixed bank.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

pub struct Rule<C> {
    pub when: fn(&C) -> bool,
    pub template: &'static str,
}

/// Prioritized rules; the first predicate that holds supplies the message.
pub struct RuleTable<C> {
    rules: Vec<Rule<C>>,
    fallback: &'static str,
}

impl<C> RuleTable<C> {
    pub fn new(fallback: &'static str) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule(mut self, when: fn(&C) -> bool, template: &'static str) -> Self {
        self.rules.push(Rule { when, template });
        self
    }

    pub fn pick(&self, ctx: &C) -> &'static str {
        self.rules
            .iter()
            .find(|rule| (rule.when)(ctx))
            .map(|rule| rule.template)
            .unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NarrativeBank {
    entries: &'static [&'static str],
}

impl NarrativeBank {
    pub const fn new(entries: &'static [&'static str]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [&'static str] {
        self.entries
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries[rng.gen_range(0..self.entries.len())])
    }
}

pub const BOARD_TIPS: NarrativeBank = NarrativeBank::new(&[
    "Review the lowest readiness cohort before approving next week's load plan.",
    "Tie every pilot in the innovation pipeline to one measurable board KPI.",
    "Coaches with expiring licences should be booked on the next federation course.",
    "Schedule a stakeholder touchpoint for every skeptical sponsor this quarter.",
    "Compare this month's inequality index with last season before reallocating minutes.",
    "Export the roster snapshot before the board meeting so the numbers stay fixed.",
]);

/// Seeded when a seed is configured, otherwise from OS entropy.
pub fn narrative_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Replaces `{key}` placeholders; unknown placeholders are left as is.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut output = template.to_string();
    for (key, value) in vars {
        output = output.replace(&format!("{{{key}}}"), value);
    }
    output
}

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{day, fmt_score, LogEntry, Subject};
use crate::error::ValidationError;
use crate::export::Exportable;
use crate::filter::{FieldValue, Filterable};
use crate::form::{Draft, FormRecord};
use crate::metrics::completeness_score;
use crate::narrative::{fill, RuleTable};
use crate::report::Reportable;
use crate::scenario::{nudge, Scenario};
use crate::store::Record;

/// Ordered from most to least supportive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Champion,
    Supportive,
    Neutral,
    Skeptical,
}

impl Sentiment {
    pub fn warmer(self) -> Self {
        match self {
            Sentiment::Skeptical => Sentiment::Neutral,
            Sentiment::Neutral => Sentiment::Supportive,
            Sentiment::Supportive | Sentiment::Champion => Sentiment::Champion,
        }
    }

    pub fn cooler(self) -> Self {
        match self {
            Sentiment::Champion => Sentiment::Supportive,
            Sentiment::Supportive => Sentiment::Neutral,
            Sentiment::Neutral | Sentiment::Skeptical => Sentiment::Skeptical,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Champion => "Champion",
            Sentiment::Supportive => "Supportive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Skeptical => "Skeptical",
        };
        f.write_str(label)
    }
}

impl FromStr for Sentiment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "champion" => Ok(Sentiment::Champion),
            "supportive" => Ok(Sentiment::Supportive),
            "neutral" => Ok(Sentiment::Neutral),
            "skeptical" | "sceptical" => Ok(Sentiment::Skeptical),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub id: Uuid,
    pub name: String,
    /// Board, Sponsor, League, Parents...
    pub group: String,
    pub influence: f64,
    pub engagement: f64,
    pub sentiment: Sentiment,
    pub email: Option<String>,
    pub notes: String,
    pub actions: Vec<LogEntry>,
}

impl Stakeholder {
    /// How much of the contact profile is filled in.
    pub fn profile_completeness(&self) -> f64 {
        completeness_score(&[
            !self.name.is_empty(),
            !self.group.is_empty(),
            self.email.as_deref().is_some_and(|e| !e.is_empty()),
            !self.notes.is_empty(),
            !self.actions.is_empty(),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct StakeholderPatch {
    pub name: Option<String>,
    pub group: Option<String>,
    pub influence: Option<f64>,
    pub engagement: Option<f64>,
    pub sentiment: Option<Sentiment>,
    pub email: Option<Option<String>>,
    pub notes: Option<String>,
    pub actions: Option<Vec<LogEntry>>,
}

impl Record for Stakeholder {
    type Patch = StakeholderPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn apply(&mut self, patch: &StakeholderPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(group) = &patch.group {
            self.group = group.clone();
        }
        if let Some(influence) = patch.influence {
            self.influence = influence;
        }
        if let Some(engagement) = patch.engagement {
            self.engagement = engagement;
        }
        if let Some(sentiment) = patch.sentiment {
            self.sentiment = sentiment;
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(actions) = &patch.actions {
            self.actions = actions.clone();
        }
    }
}

impl FormRecord for Stakeholder {
    fn form_fields() -> &'static [&'static str] {
        &[
            "name",
            "group",
            "influence",
            "engagement",
            "sentiment",
            "email",
            "notes",
        ]
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("name", self.name.clone())
            .with("group", self.group.clone())
            .with("influence", self.influence.to_string())
            .with("engagement", self.engagement.to_string())
            .with("sentiment", self.sentiment.to_string())
            .with("email", self.email.clone().unwrap_or_default())
            .with("notes", self.notes.clone())
    }

    fn from_draft(draft: &Draft, base: Option<&Self>) -> Result<Self, ValidationError> {
        let email = draft.text("email");
        Ok(Self {
            id: base.map(|b| b.id).unwrap_or_default(),
            name: draft.required("name")?,
            group: draft.required("group")?,
            influence: draft.score("influence")?,
            engagement: draft.score("engagement")?,
            sentiment: draft.parsed("sentiment")?,
            email: (!email.is_empty()).then_some(email),
            notes: draft.text("notes"),
            actions: base.map(|b| b.actions.clone()).unwrap_or_default(),
        })
    }
}

impl Filterable for Stakeholder {
    fn label(&self) -> &str {
        &self.name
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "name" => FieldValue::Text(self.name.clone()),
            "group" => FieldValue::Text(self.group.clone()),
            "sentiment" | "status" => FieldValue::Text(self.sentiment.to_string()),
            "influence" => FieldValue::Number(self.influence),
            "engagement" => FieldValue::Number(self.engagement),
            "completeness" => FieldValue::Number(self.profile_completeness()),
            _ => return None,
        };
        Some(value)
    }
}

impl Exportable for Stakeholder {
    const SUBJECT: &'static str = "Stakeholders";

    fn csv_headers() -> Vec<&'static str> {
        vec![
            "id",
            "name",
            "group",
            "influence",
            "engagement",
            "sentiment",
            "email",
            "notes",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.group.clone(),
            fmt_score(self.influence),
            fmt_score(self.engagement),
            self.sentiment.to_string(),
            self.email.clone().unwrap_or_default(),
            self.notes.clone(),
        ]
    }

    fn block_title(&self) -> String {
        format!("{} · {}", self.name, self.group)
    }

    fn pdf_block(&self) -> Vec<(String, String)> {
        vec![
            ("Sentiment".to_string(), self.sentiment.to_string()),
            ("Influence".to_string(), fmt_score(self.influence)),
            ("Engagement".to_string(), fmt_score(self.engagement)),
            (
                "Profile".to_string(),
                format!("{:.0}% complete", self.profile_completeness()),
            ),
            ("Insight".to_string(), self.insight()),
        ]
    }
}

impl Reportable for Stakeholder {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn status_label(&self) -> String {
        self.sentiment.to_string()
    }

    fn headline(&self) -> f64 {
        self.engagement
    }

    fn headline_label() -> &'static str {
        "engagement"
    }

    fn log(&self) -> &[LogEntry] {
        &self.actions
    }
}

fn engagement_rules() -> RuleTable<Stakeholder> {
    RuleTable::<Stakeholder>::new("Keep {name} on the regular update cadence.")
        .rule(
            |s| s.sentiment == Sentiment::Skeptical && s.influence >= 70.0,
            "{name} is influential and skeptical: the president should meet them this month.",
        )
        .rule(
            |s| s.engagement < 40.0,
            "{name} has gone quiet ({engagement}% engagement): send a personal update.",
        )
        .rule(
            |s| s.sentiment == Sentiment::Champion,
            "{name} is a champion: ask them to co-sponsor the next initiative.",
        )
        .rule(
            |s| s.profile_completeness() < 60.0,
            "{name}'s profile is incomplete: add contact details and notes.",
        )
}

fn host_meeting(s: &Stakeholder, today: NaiveDate) -> Stakeholder {
    let mut next = s.clone();
    next.engagement = nudge(s.engagement, 10.0);
    next.sentiment = s.sentiment.warmer();
    next.actions
        .push(LogEntry::new(today, "meeting", "Hosted one-to-one briefing"));
    next
}

fn escalate(s: &Stakeholder, today: NaiveDate) -> Stakeholder {
    let mut next = s.clone();
    next.sentiment = s.sentiment.cooler();
    next.actions
        .push(LogEntry::new(today, "scenario", "Escalated a complaint to the board"));
    next
}

fn missed_update(s: &Stakeholder, today: NaiveDate) -> Stakeholder {
    let mut next = s.clone();
    next.engagement = nudge(s.engagement, -8.0);
    next.actions
        .push(LogEntry::new(today, "scenario", "Missed monthly update: -8 engagement"));
    next
}

impl Subject for Stakeholder {
    const TITLE: &'static str = "Stakeholder Map";

    fn seed() -> Vec<Self> {
        vec![
            stakeholder(
                0x51c7_e2d4_3a90_4b18_a6f2_0000_0000_0001,
                ("Zdravko Kos", "Board"),
                [92.0, 71.0],
                Sentiment::Supportive,
                Some("z.kos@courtevo.example"),
                "Club president, chairs budget committee",
                vec![LogEntry::new(day(2026, 1, 22), "meeting", "Budget pre-read walkthrough")],
            ),
            stakeholder(
                0x51c7_e2d4_3a90_4b18_a6f2_0000_0000_0002,
                ("Adria Energy", "Sponsor"),
                [78.0, 44.0],
                Sentiment::Skeptical,
                Some("partnerships@adria.example"),
                "Main shirt sponsor, renewal due in June",
                Vec::new(),
            ),
            stakeholder(
                0x51c7_e2d4_3a90_4b18_a6f2_0000_0000_0003,
                ("City Sports Office", "Municipality"),
                [65.0, 35.0],
                Sentiment::Neutral,
                None,
                "",
                Vec::new(),
            ),
            stakeholder(
                0x51c7_e2d4_3a90_4b18_a6f2_0000_0000_0004,
                ("Academy Parents Council", "Parents"),
                [40.0, 83.0],
                Sentiment::Champion,
                Some("parents@courtevo.example"),
                "Runs the volunteer rota",
                vec![LogEntry::new(day(2026, 2, 1), "meeting", "Volunteer evening")],
            ),
            stakeholder(
                0x51c7_e2d4_3a90_4b18_a6f2_0000_0000_0005,
                ("Regional League", "League"),
                [58.0, 62.0],
                Sentiment::Neutral,
                Some("office@league.example"),
                "Licensing and fixtures",
                Vec::new(),
            ),
        ]
    }

    fn scenarios() -> Vec<Scenario<Self>> {
        vec![
            Scenario {
                key: "host-meeting",
                label: "Host meeting",
                apply: host_meeting,
            },
            Scenario {
                key: "escalate",
                label: "Escalate",
                apply: escalate,
            },
            Scenario {
                key: "missed-update",
                label: "Missed update",
                apply: missed_update,
            },
        ]
    }

    fn insight(&self) -> String {
        fill(
            engagement_rules().pick(self),
            &[
                ("name", self.name.clone()),
                ("engagement", format!("{:.0}", self.engagement)),
            ],
        )
    }

    fn color(&self) -> &'static str {
        match self.sentiment {
            Sentiment::Champion => "#1f9d55",
            Sentiment::Supportive => "#2f80ed",
            Sentiment::Neutral => "#f2c94c",
            Sentiment::Skeptical => "#eb5757",
        }
    }
}

fn stakeholder(
    id: u128,
    (name, group): (&str, &str),
    [influence, engagement]: [f64; 2],
    sentiment: Sentiment,
    email: Option<&str>,
    notes: &str,
    actions: Vec<LogEntry>,
) -> Stakeholder {
    Stakeholder {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        group: group.to_string(),
        influence,
        engagement,
        sentiment,
        email: email.map(String::from),
        notes: notes.to_string(),
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::gini_index;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    fn by_name(name: &str) -> Stakeholder {
        Stakeholder::seed()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
    }

    #[test]
    fn completeness_counts_profile_fields() {
        assert_eq!(by_name("Zdravko Kos").profile_completeness(), 100.0);
        assert_eq!(by_name("City Sports Office").profile_completeness(), 40.0);
    }

    #[test]
    fn meeting_warms_sentiment() {
        let sponsor = host_meeting(&by_name("Adria Energy"), today());
        assert_eq!(sponsor.sentiment, Sentiment::Neutral);
        assert_eq!(sponsor.engagement, 54.0);
        assert_eq!(sponsor.actions.len(), 1);
    }

    #[test]
    fn sentiment_steps_saturate() {
        assert_eq!(Sentiment::Champion.warmer(), Sentiment::Champion);
        assert_eq!(Sentiment::Skeptical.cooler(), Sentiment::Skeptical);
    }

    #[test]
    fn insights_follow_rule_priority() {
        assert!(by_name("Adria Energy").insight().contains("influential and skeptical"));
        assert!(by_name("City Sports Office").insight().contains("35% engagement"));
        assert!(by_name("Academy Parents Council").insight().contains("champion"));
        assert!(by_name("Regional League").insight().starts_with("Keep Regional League"));
    }

    #[test]
    fn influence_spread_is_moderate() {
        let influence: Vec<f64> = Stakeholder::seed().iter().map(|s| s.influence).collect();
        let g = gini_index(&influence);
        assert!(g > 0.0 && g < 0.5, "{g}");
    }

    #[test]
    fn blank_email_becomes_none() {
        let draft = by_name("Regional League").to_draft().with("email", "  ");
        let parsed = Stakeholder::from_draft(&draft, None).unwrap();
        assert_eq!(parsed.email, None);
    }
}

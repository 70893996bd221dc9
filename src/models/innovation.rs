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
use crate::metrics::score_color;
use crate::narrative::{fill, RuleTable};
use crate::report::Reportable;
use crate::scenario::Scenario;
use crate::store::Record;

/// Pipeline stage, in adoption order. `Parked` sits outside the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Idea,
    Pilot,
    Scaling,
    Adopted,
    Parked,
}

impl Stage {
    pub fn next(self) -> Self {
        match self {
            Stage::Idea => Stage::Pilot,
            Stage::Pilot => Stage::Scaling,
            Stage::Scaling | Stage::Adopted => Stage::Adopted,
            Stage::Parked => Stage::Parked,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idea => "Idea",
            Stage::Pilot => "Pilot",
            Stage::Scaling => "Scaling",
            Stage::Adopted => "Adopted",
            Stage::Parked => "Parked",
        };
        f.write_str(label)
    }
}

impl FromStr for Stage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idea" => Ok(Stage::Idea),
            "pilot" => Ok(Stage::Pilot),
            "scaling" => Ok(Stage::Scaling),
            "adopted" => Ok(Stage::Adopted),
            "parked" => Ok(Stage::Parked),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Innovation {
    pub id: Uuid,
    pub title: String,
    pub owner: String,
    pub stage: Stage,
    /// Board-estimated impact, 0-100.
    pub impact: f64,
    pub votes: u32,
    /// Budget in thousands of euros.
    pub cost: f64,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct InnovationPatch {
    pub title: Option<String>,
    pub owner: Option<String>,
    pub stage: Option<Stage>,
    pub impact: Option<f64>,
    pub votes: Option<u32>,
    pub cost: Option<f64>,
    pub log: Option<Vec<LogEntry>>,
}

impl Record for Innovation {
    type Patch = InnovationPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn apply(&mut self, patch: &InnovationPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(owner) = &patch.owner {
            self.owner = owner.clone();
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(impact) = patch.impact {
            self.impact = impact;
        }
        if let Some(votes) = patch.votes {
            self.votes = votes;
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(log) = &patch.log {
            self.log = log.clone();
        }
    }
}

impl FormRecord for Innovation {
    fn form_fields() -> &'static [&'static str] {
        &["title", "owner", "stage", "impact", "votes", "cost"]
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("title", self.title.clone())
            .with("owner", self.owner.clone())
            .with("stage", self.stage.to_string())
            .with("impact", self.impact.to_string())
            .with("votes", self.votes.to_string())
            .with("cost", self.cost.to_string())
    }

    fn from_draft(draft: &Draft, base: Option<&Self>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: base.map(|b| b.id).unwrap_or_default(),
            title: draft.required("title")?,
            owner: draft.required("owner")?,
            stage: draft.parsed("stage")?,
            impact: draft.score("impact")?,
            votes: draft.integer("votes")?,
            cost: draft.bounded("cost", 0.0, f64::MAX)?,
            log: base.map(|b| b.log.clone()).unwrap_or_default(),
        })
    }
}

impl Filterable for Innovation {
    fn label(&self) -> &str {
        &self.title
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "title" => FieldValue::Text(self.title.clone()),
            "owner" => FieldValue::Text(self.owner.clone()),
            "stage" | "status" => FieldValue::Text(self.stage.to_string()),
            "impact" => FieldValue::Number(self.impact),
            "votes" => FieldValue::Number(self.votes as f64),
            "cost" => FieldValue::Number(self.cost),
            _ => return None,
        };
        Some(value)
    }
}

impl Exportable for Innovation {
    const SUBJECT: &'static str = "Innovation Pipeline";

    fn csv_headers() -> Vec<&'static str> {
        vec!["id", "title", "owner", "stage", "impact", "votes", "cost_k_eur"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.owner.clone(),
            self.stage.to_string(),
            fmt_score(self.impact),
            self.votes.to_string(),
            fmt_score(self.cost),
        ]
    }

    fn block_title(&self) -> String {
        format!("{} ({})", self.title, self.stage)
    }

    fn pdf_block(&self) -> Vec<(String, String)> {
        vec![
            ("Owner".to_string(), self.owner.clone()),
            ("Impact".to_string(), fmt_score(self.impact)),
            ("Votes".to_string(), self.votes.to_string()),
            ("Cost".to_string(), format!("€{:.0}k", self.cost)),
            ("Insight".to_string(), self.insight()),
        ]
    }
}

impl Reportable for Innovation {
    fn display_name(&self) -> &str {
        &self.title
    }

    fn status_label(&self) -> String {
        self.stage.to_string()
    }

    fn headline(&self) -> f64 {
        self.impact
    }

    fn headline_label() -> &'static str {
        "impact"
    }

    fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

fn pipeline_rules() -> RuleTable<Innovation> {
    RuleTable::<Innovation>::new("{title} is progressing; revisit at the next pipeline review.")
        .rule(
            |i| i.stage == Stage::Parked,
            "{title} is parked: confirm whether to archive or revive with a new owner.",
        )
        .rule(
            |i| i.stage == Stage::Idea && i.votes >= 10,
            "{title} has {votes} votes: ready to promote to a pilot.",
        )
        .rule(
            |i| i.cost > 50.0 && i.impact < 50.0,
            "{title} is cost-heavy for its impact: ask {owner} for a leaner scope.",
        )
        .rule(
            |i| i.impact >= 80.0 && i.stage != Stage::Adopted,
            "{title} is a high-impact bet: fast-track the next stage.",
        )
}

fn add_vote(i: &Innovation, today: NaiveDate) -> Innovation {
    let mut next = i.clone();
    next.votes = i.votes.saturating_add(1);
    next.log
        .push(LogEntry::new(today, "vote", format!("Vote recorded ({} total)", next.votes)));
    next
}

fn fast_track(i: &Innovation, today: NaiveDate) -> Innovation {
    let mut next = i.clone();
    next.stage = i.stage.next();
    next.log.push(LogEntry::new(
        today,
        "scenario",
        format!("Fast-tracked from {} to {}", i.stage, next.stage),
    ));
    next
}

fn park(i: &Innovation, today: NaiveDate) -> Innovation {
    let mut next = i.clone();
    next.stage = Stage::Parked;
    next.log
        .push(LogEntry::new(today, "scenario", "Parked pending budget review"));
    next
}

impl Subject for Innovation {
    const TITLE: &'static str = "Innovation Pipeline";

    fn seed() -> Vec<Self> {
        vec![
            innovation(
                0x9b3e_7f10_aa41_4c2d_b5e6_0000_0000_0001,
                ("Wearable load tracking", "Performance Lab"),
                Stage::Pilot,
                (86.0, 14, 42.0),
                vec![LogEntry::new(day(2026, 1, 8), "scenario", "Pilot started with U18 squad")],
            ),
            innovation(
                0x9b3e_7f10_aa41_4c2d_b5e6_0000_0000_0002,
                ("Fan app loyalty tier", "Commercial"),
                Stage::Idea,
                (61.0, 11, 18.0),
                Vec::new(),
            ),
            innovation(
                0x9b3e_7f10_aa41_4c2d_b5e6_0000_0000_0003,
                ("Video scouting platform", "Sporting Director"),
                Stage::Scaling,
                (74.0, 9, 65.0),
                Vec::new(),
            ),
            innovation(
                0x9b3e_7f10_aa41_4c2d_b5e6_0000_0000_0004,
                ("Cryotherapy chamber", "Medical"),
                Stage::Idea,
                (38.0, 3, 120.0),
                Vec::new(),
            ),
            innovation(
                0x9b3e_7f10_aa41_4c2d_b5e6_0000_0000_0005,
                ("Academy e-learning hub", "Academy"),
                Stage::Parked,
                (55.0, 6, 25.0),
                vec![LogEntry::new(day(2025, 11, 20), "scenario", "Parked after vendor exit")],
            ),
        ]
    }

    fn scenarios() -> Vec<Scenario<Self>> {
        vec![
            Scenario {
                key: "vote",
                label: "Add vote",
                apply: add_vote,
            },
            Scenario {
                key: "fast-track",
                label: "Fast-track",
                apply: fast_track,
            },
            Scenario {
                key: "park",
                label: "Park",
                apply: park,
            },
        ]
    }

    fn insight(&self) -> String {
        fill(
            pipeline_rules().pick(self),
            &[
                ("title", self.title.clone()),
                ("owner", self.owner.clone()),
                ("votes", self.votes.to_string()),
            ],
        )
    }

    fn color(&self) -> &'static str {
        match self.stage {
            Stage::Parked => "#9b9b9b",
            _ => score_color(self.impact),
        }
    }
}

fn innovation(
    id: u128,
    (title, owner): (&str, &str),
    stage: Stage,
    (impact, votes, cost): (f64, u32, f64),
    log: Vec<LogEntry>,
) -> Innovation {
    Innovation {
        id: Uuid::from_u128(id),
        title: title.to_string(),
        owner: owner.to_string(),
        stage,
        impact,
        votes,
        cost,
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    fn by_title(title: &str) -> Innovation {
        Innovation::seed()
            .into_iter()
            .find(|i| i.title == title)
            .unwrap()
    }

    #[test]
    fn stages_advance_and_stop() {
        assert_eq!(Stage::Idea.next(), Stage::Pilot);
        assert_eq!(Stage::Scaling.next(), Stage::Adopted);
        assert_eq!(Stage::Adopted.next(), Stage::Adopted);
        assert_eq!(Stage::Parked.next(), Stage::Parked);
    }

    #[test]
    fn fast_track_logs_transition() {
        let next = fast_track(&by_title("Fan app loyalty tier"), today());
        assert_eq!(next.stage, Stage::Pilot);
        assert_eq!(next.log[0].note, "Fast-tracked from Idea to Pilot");
    }

    #[test]
    fn vote_counts_up() {
        let next = add_vote(&by_title("Cryotherapy chamber"), today());
        assert_eq!(next.votes, 4);
    }

    #[test]
    fn insights_follow_rule_priority() {
        assert!(by_title("Fan app loyalty tier")
            .insight()
            .contains("11 votes: ready to promote"));
        assert!(by_title("Cryotherapy chamber")
            .insight()
            .contains("ask Medical for a leaner scope"));
        assert!(by_title("Wearable load tracking")
            .insight()
            .contains("high-impact bet"));
        assert!(by_title("Academy e-learning hub").insight().contains("parked"));
    }

    #[test]
    fn draft_rejects_negative_cost() {
        let draft = by_title("Video scouting platform")
            .to_draft()
            .with("cost", "-5");
        assert!(matches!(
            Innovation::from_draft(&draft, None),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}

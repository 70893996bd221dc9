use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{day, fmt_score, LogEntry, Subject};
use crate::error::ValidationError;
use crate::export::Exportable;
use crate::filter::{FieldValue, Filterable};
use crate::form::{Draft, FormRecord};
use crate::metrics::{mean, score_color};
use crate::narrative::{fill, RuleTable};
use crate::report::Reportable;
use crate::scenario::{nudge, Scenario};
use crate::store::Record;

pub const SCORE_KEYS: [&str; 3] = ["tactical", "communication", "development"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoachStatus {
    Compliant,
    Expiring,
    #[serde(rename = "At Risk")]
    AtRisk,
    Fail,
}

impl fmt::Display for CoachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CoachStatus::Compliant => "Compliant",
            CoachStatus::Expiring => "Expiring",
            CoachStatus::AtRisk => "At Risk",
            CoachStatus::Fail => "Fail",
        };
        f.write_str(label)
    }
}

impl FromStr for CoachStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "compliant" => Ok(CoachStatus::Compliant),
            "expiring" => Ok(CoachStatus::Expiring),
            "at risk" | "atrisk" => Ok(CoachStatus::AtRisk),
            "fail" | "failed" => Ok(CoachStatus::Fail),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub status: CoachStatus,
    pub license_expires: NaiveDate,
    /// Evaluation scores keyed by [`SCORE_KEYS`], 0-100.
    pub scores: BTreeMap<String, f64>,
    pub history: Vec<LogEntry>,
}

impl Coach {
    pub fn certification_score(&self) -> f64 {
        let values: Vec<f64> = self.scores.values().copied().collect();
        mean(&values)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoachPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub status: Option<CoachStatus>,
    pub license_expires: Option<NaiveDate>,
    /// Merged key by key into the existing scores.
    pub scores: Option<BTreeMap<String, f64>>,
    pub history: Option<Vec<LogEntry>>,
}

impl Record for Coach {
    type Patch = CoachPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn apply(&mut self, patch: &CoachPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(role) = &patch.role {
            self.role = role.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(expires) = patch.license_expires {
            self.license_expires = expires;
        }
        if let Some(scores) = &patch.scores {
            for (key, value) in scores {
                self.scores.insert(key.clone(), *value);
            }
        }
        if let Some(history) = &patch.history {
            self.history = history.clone();
        }
    }
}

impl FormRecord for Coach {
    fn form_fields() -> &'static [&'static str] {
        &[
            "name",
            "role",
            "status",
            "license_expires",
            "tactical",
            "communication",
            "development",
        ]
    }

    fn to_draft(&self) -> Draft {
        let mut draft = Draft::new()
            .with("name", self.name.clone())
            .with("role", self.role.clone())
            .with("status", self.status.to_string())
            .with(
                "license_expires",
                self.license_expires.format("%Y-%m-%d").to_string(),
            );
        for (key, value) in &self.scores {
            draft.set(key, value.to_string());
        }
        draft
    }

    fn from_draft(draft: &Draft, base: Option<&Self>) -> Result<Self, ValidationError> {
        let mut scores = BTreeMap::new();
        for key in SCORE_KEYS {
            scores.insert(key.to_string(), draft.score(key)?);
        }
        Ok(Self {
            id: base.map(|b| b.id).unwrap_or_default(),
            name: draft.required("name")?,
            role: draft.required("role")?,
            status: draft.parsed("status")?,
            license_expires: draft.date("license_expires")?,
            scores,
            history: base.map(|b| b.history.clone()).unwrap_or_default(),
        })
    }
}

impl Filterable for Coach {
    fn label(&self) -> &str {
        &self.name
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "name" => FieldValue::Text(self.name.clone()),
            "role" => FieldValue::Text(self.role.clone()),
            "status" => FieldValue::Text(self.status.to_string()),
            "license_expires" => FieldValue::Text(self.license_expires.to_string()),
            "score" => FieldValue::Number(self.certification_score()),
            other => FieldValue::Number(*self.scores.get(other)?),
        };
        Some(value)
    }
}

impl Exportable for Coach {
    const SUBJECT: &'static str = "Coaches";

    fn csv_headers() -> Vec<&'static str> {
        let mut headers = vec!["id", "name", "role", "status", "license_expires"];
        headers.extend(SCORE_KEYS);
        headers.push("score");
        headers
    }

    fn csv_row(&self) -> Vec<String> {
        let mut row = vec![
            self.id.to_string(),
            self.name.clone(),
            self.role.clone(),
            self.status.to_string(),
            self.license_expires.to_string(),
        ];
        for key in SCORE_KEYS {
            row.push(
                self.scores
                    .get(key)
                    .map(|v| fmt_score(*v))
                    .unwrap_or_default(),
            );
        }
        row.push(fmt_score(self.certification_score()));
        row
    }

    fn block_title(&self) -> String {
        format!("{} · {}", self.name, self.role)
    }

    fn pdf_block(&self) -> Vec<(String, String)> {
        let mut lines = vec![
            ("Status".to_string(), self.status.to_string()),
            ("License expires".to_string(), self.license_expires.to_string()),
        ];
        for (key, value) in &self.scores {
            lines.push((key.clone(), fmt_score(*value)));
        }
        lines.push((
            "Certification score".to_string(),
            fmt_score(self.certification_score()),
        ));
        lines.push(("Insight".to_string(), self.insight()));
        lines
    }
}

impl Reportable for Coach {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn headline(&self) -> f64 {
        self.certification_score()
    }

    fn headline_label() -> &'static str {
        "certification score"
    }

    fn log(&self) -> &[LogEntry] {
        &self.history
    }
}

fn compliance_rules() -> RuleTable<Coach> {
    RuleTable::<Coach>::new("{name} is compliant; next review on licence renewal.")
        .rule(
            |c| c.status == CoachStatus::Fail,
            "{name} failed the last audit: remove from match-day bench until re-certified.",
        )
        .rule(
            |c| c.status == CoachStatus::AtRisk,
            "{name} is at risk of non-compliance: assign a mentor and a CPD plan.",
        )
        .rule(
            |c| c.status == CoachStatus::Expiring,
            "{name}'s licence expires {expires}: book the renewal course now.",
        )
        .rule(
            |c| c.scores.values().any(|v| *v < 60.0),
            "{name} has a development gap ({weakest}): schedule targeted coaching.",
        )
}

fn weakest_area(coach: &Coach) -> String {
    coach
        .scores
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(key, _)| key.clone())
        .unwrap_or_default()
}

fn renew_license(c: &Coach, today: NaiveDate) -> Coach {
    let mut next = c.clone();
    let base = c.license_expires.max(today);
    next.license_expires = base.checked_add_months(Months::new(12)).unwrap_or(base);
    next.status = CoachStatus::Compliant;
    next.history.push(LogEntry::new(
        today,
        "scenario",
        format!("Licence renewed until {}", next.license_expires),
    ));
    next
}

fn missed_cpd(c: &Coach, today: NaiveDate) -> Coach {
    let mut next = c.clone();
    if let Some(score) = next.scores.get_mut("development") {
        *score = nudge(*score, -10.0);
    }
    if next.status == CoachStatus::Compliant {
        next.status = CoachStatus::AtRisk;
    }
    next.history
        .push(LogEntry::new(today, "scenario", "Missed CPD module: -10 development"));
    next
}

fn fail_audit(c: &Coach, today: NaiveDate) -> Coach {
    let mut next = c.clone();
    next.status = CoachStatus::Fail;
    next.history
        .push(LogEntry::new(today, "scenario", "Federation audit failed"));
    next
}

impl Subject for Coach {
    const TITLE: &'static str = "Coach Compliance";

    fn seed() -> Vec<Self> {
        vec![
            coach(
                0x3c0a_c4e5_1d2b_4f6a_8e77_0000_0000_0001,
                ("Davor Marić", "Head Coach"),
                CoachStatus::Compliant,
                day(2027, 5, 31),
                [88.0, 82.0, 79.0],
                vec![LogEntry::new(day(2025, 6, 1), "licence", "FIBA Level 3 renewed")],
            ),
            coach(
                0x3c0a_c4e5_1d2b_4f6a_8e77_0000_0000_0002,
                ("Petra Novak", "Assistant Coach"),
                CoachStatus::Expiring,
                day(2026, 3, 15),
                [74.0, 90.0, 81.0],
                Vec::new(),
            ),
            coach(
                0x3c0a_c4e5_1d2b_4f6a_8e77_0000_0000_0003,
                ("Goran Vuković", "Academy U16"),
                CoachStatus::AtRisk,
                day(2026, 9, 30),
                [66.0, 58.0, 54.0],
                vec![LogEntry::new(day(2026, 1, 18), "audit", "Two missed safeguarding sessions")],
            ),
            coach(
                0x3c0a_c4e5_1d2b_4f6a_8e77_0000_0000_0004,
                ("Maja Tomić", "Strength & Conditioning"),
                CoachStatus::Compliant,
                day(2026, 12, 31),
                [79.0, 71.0, 57.0],
                Vec::new(),
            ),
        ]
    }

    fn scenarios() -> Vec<Scenario<Self>> {
        vec![
            Scenario {
                key: "renew-license",
                label: "Renew licence",
                apply: renew_license,
            },
            Scenario {
                key: "missed-cpd",
                label: "Missed CPD",
                apply: missed_cpd,
            },
            Scenario {
                key: "fail-audit",
                label: "Fail audit",
                apply: fail_audit,
            },
        ]
    }

    fn insight(&self) -> String {
        fill(
            compliance_rules().pick(self),
            &[
                ("name", self.name.clone()),
                ("expires", self.license_expires.to_string()),
                ("weakest", weakest_area(self)),
            ],
        )
    }

    fn color(&self) -> &'static str {
        match self.status {
            CoachStatus::Compliant => score_color(self.certification_score()),
            CoachStatus::Expiring => "#f2994a",
            CoachStatus::AtRisk | CoachStatus::Fail => "#eb5757",
        }
    }
}

fn coach(
    id: u128,
    (name, role): (&str, &str),
    status: CoachStatus,
    license_expires: NaiveDate,
    [tactical, communication, development]: [f64; 3],
    history: Vec<LogEntry>,
) -> Coach {
    let scores = SCORE_KEYS
        .iter()
        .zip([tactical, communication, development])
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    Coach {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        role: role.to_string(),
        status,
        license_expires,
        scores,
        history,
    }
}

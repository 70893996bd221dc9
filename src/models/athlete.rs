use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{day, fmt_score, LogEntry, Subject};
use crate::error::ValidationError;
use crate::export::Exportable;
use crate::filter::{FieldValue, Filterable};
use crate::form::{join_numbers, Draft, FormRecord};
use crate::metrics::{trend_direction, Trend};
use crate::narrative::{fill, RuleTable};
use crate::report::Reportable;
use crate::scenario::{nudge, Scenario};
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AthleteStatus {
    Elite,
    Ready,
    Monitor,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl fmt::Display for AthleteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AthleteStatus::Elite => "Elite",
            AthleteStatus::Ready => "Ready",
            AthleteStatus::Monitor => "Monitor",
            AthleteStatus::AtRisk => "At Risk",
        };
        f.write_str(label)
    }
}

impl FromStr for AthleteStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "elite" => Ok(AthleteStatus::Elite),
            "ready" => Ok(AthleteStatus::Ready),
            "monitor" => Ok(AthleteStatus::Monitor),
            "at risk" | "atrisk" => Ok(AthleteStatus::AtRisk),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub age: u32,
    pub status: AthleteStatus,
    /// Weekly training load, 0-100.
    pub load: f64,
    pub fatigue: f64,
    pub readiness: f64,
    /// Days left in the current recovery window.
    pub window_days: u32,
    /// Weekly readiness history, oldest first.
    pub trend: Vec<f64>,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct AthletePatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub age: Option<u32>,
    pub status: Option<AthleteStatus>,
    pub load: Option<f64>,
    pub fatigue: Option<f64>,
    pub readiness: Option<f64>,
    pub window_days: Option<u32>,
    pub trend: Option<Vec<f64>>,
    pub log: Option<Vec<LogEntry>>,
}

impl Record for Athlete {
    type Patch = AthletePatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn apply(&mut self, patch: &AthletePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(position) = &patch.position {
            self.position = position.clone();
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(load) = patch.load {
            self.load = load;
        }
        if let Some(fatigue) = patch.fatigue {
            self.fatigue = fatigue;
        }
        if let Some(readiness) = patch.readiness {
            self.readiness = readiness;
        }
        if let Some(window_days) = patch.window_days {
            self.window_days = window_days;
        }
        if let Some(trend) = &patch.trend {
            self.trend = trend.clone();
        }
        if let Some(log) = &patch.log {
            self.log = log.clone();
        }
    }
}

impl FormRecord for Athlete {
    fn form_fields() -> &'static [&'static str] {
        &[
            "name",
            "position",
            "age",
            "status",
            "load",
            "fatigue",
            "readiness",
            "window_days",
            "trend",
        ]
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("name", self.name.clone())
            .with("position", self.position.clone())
            .with("age", self.age.to_string())
            .with("status", self.status.to_string())
            .with("load", self.load.to_string())
            .with("fatigue", self.fatigue.to_string())
            .with("readiness", self.readiness.to_string())
            .with("window_days", self.window_days.to_string())
            .with("trend", join_numbers(&self.trend))
    }

    fn from_draft(draft: &Draft, base: Option<&Self>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: base.map(|b| b.id).unwrap_or_default(),
            name: draft.required("name")?,
            position: draft.required("position")?,
            age: draft.integer("age")?,
            status: draft.parsed("status")?,
            load: draft.score("load")?,
            fatigue: draft.score("fatigue")?,
            readiness: draft.score("readiness")?,
            window_days: draft.integer("window_days")?,
            trend: draft.numbers("trend")?,
            log: base.map(|b| b.log.clone()).unwrap_or_default(),
        })
    }
}

impl Filterable for Athlete {
    fn label(&self) -> &str {
        &self.name
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "name" => FieldValue::Text(self.name.clone()),
            "position" => FieldValue::Text(self.position.clone()),
            "status" => FieldValue::Text(self.status.to_string()),
            "age" => FieldValue::Number(self.age as f64),
            "load" => FieldValue::Number(self.load),
            "fatigue" => FieldValue::Number(self.fatigue),
            "readiness" => FieldValue::Number(self.readiness),
            "window_days" => FieldValue::Number(self.window_days as f64),
            _ => return None,
        };
        Some(value)
    }
}

impl Exportable for Athlete {
    const SUBJECT: &'static str = "Athletes";

    fn csv_headers() -> Vec<&'static str> {
        vec![
            "id",
            "name",
            "position",
            "age",
            "status",
            "load",
            "fatigue",
            "readiness",
            "window_days",
            "trend",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.position.clone(),
            self.age.to_string(),
            self.status.to_string(),
            fmt_score(self.load),
            fmt_score(self.fatigue),
            fmt_score(self.readiness),
            self.window_days.to_string(),
            join_numbers(&self.trend),
        ]
    }

    fn block_title(&self) -> String {
        format!("{} · {}", self.name, self.position)
    }

    fn pdf_block(&self) -> Vec<(String, String)> {
        vec![
            ("Status".to_string(), self.status.to_string()),
            ("Age".to_string(), self.age.to_string()),
            ("Load".to_string(), fmt_score(self.load)),
            ("Fatigue".to_string(), fmt_score(self.fatigue)),
            ("Readiness".to_string(), fmt_score(self.readiness)),
            ("Recovery window".to_string(), format!("{} days", self.window_days)),
            ("Insight".to_string(), self.insight()),
        ]
    }
}

impl Reportable for Athlete {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn headline(&self) -> f64 {
        self.readiness
    }

    fn headline_label() -> &'static str {
        "readiness"
    }

    fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

fn copilot() -> RuleTable<Athlete> {
    RuleTable::<Athlete>::new("{name} is on plan; keep the current load.")
        .rule(
            |a| a.fatigue >= 80.0,
            "{name} is carrying {fatigue}% fatigue: cut load before the next match.",
        )
        .rule(
            |a| a.status == AthleteStatus::AtRisk,
            "{name} is flagged at risk: book a medical review this week.",
        )
        .rule(
            |a| trend_direction(&a.trend) == Trend::Falling,
            "{name}'s readiness is sliding: review sleep, travel and minutes.",
        )
        .rule(
            |a| a.window_days > 0 && a.load >= 75.0,
            "{name} is loading hard inside a {window} day recovery window.",
        )
        .rule(
            |a| a.readiness >= 85.0,
            "{name} is peaking at {readiness}% readiness: candidate for extra minutes.",
        )
}

fn push_load(a: &Athlete, today: NaiveDate) -> Athlete {
    let mut next = a.clone();
    next.load = nudge(a.load, 10.0);
    next.fatigue = nudge(a.fatigue, 12.0);
    next.readiness = nudge(a.readiness, -6.0);
    next.trend.push(next.readiness);
    next.log
        .push(LogEntry::new(today, "scenario", "Push load: +10 load, +12 fatigue"));
    next
}

fn recovery_day(a: &Athlete, today: NaiveDate) -> Athlete {
    let mut next = a.clone();
    next.fatigue = nudge(a.fatigue, -15.0);
    next.readiness = nudge(a.readiness, 8.0);
    next.trend.push(next.readiness);
    next.log
        .push(LogEntry::new(today, "scenario", "Recovery day: -15 fatigue, +8 readiness"));
    next
}

fn extend_window(a: &Athlete, today: NaiveDate) -> Athlete {
    let mut next = a.clone();
    next.window_days = a.window_days.saturating_add(7);
    next.log
        .push(LogEntry::new(today, "scenario", "Extended recovery window by 7 days"));
    next
}

fn trigger_risk(a: &Athlete, today: NaiveDate) -> Athlete {
    let mut next = a.clone();
    next.status = AthleteStatus::AtRisk;
    next.readiness = nudge(a.readiness, -15.0);
    next.trend.push(next.readiness);
    next.log
        .push(LogEntry::new(today, "scenario", "Risk triggered: -15 readiness"));
    next
}

impl Subject for Athlete {
    const TITLE: &'static str = "Athlete Readiness";

    fn seed() -> Vec<Self> {
        vec![
            athlete(
                0x6a1f_42c0_5b7e_4d0e_9a10_0000_0000_0001,
                ("Luka Perić", "Point Guard", 24),
                AthleteStatus::Elite,
                [72.0, 38.0, 91.0],
                0,
                &[84.0, 86.0, 88.0, 91.0],
                vec![LogEntry::new(day(2026, 1, 20), "medical", "Cleared after ankle screen")],
            ),
            athlete(
                0x6a1f_42c0_5b7e_4d0e_9a10_0000_0000_0002,
                ("Ivo Babić", "Center", 29),
                AthleteStatus::AtRisk,
                [81.0, 84.0, 52.0],
                10,
                &[70.0, 66.0, 58.0, 52.0],
                vec![
                    LogEntry::new(day(2026, 1, 12), "medical", "Hamstring tightness reported"),
                    LogEntry::new(day(2026, 1, 26), "load", "Minutes capped at 18"),
                ],
            ),
            athlete(
                0x6a1f_42c0_5b7e_4d0e_9a10_0000_0000_0003,
                ("Lucija Horvat", "Shooting Guard", 21),
                AthleteStatus::Ready,
                [64.0, 45.0, 78.0],
                0,
                &[71.0, 74.0, 76.0, 78.0],
                Vec::new(),
            ),
            athlete(
                0x6a1f_42c0_5b7e_4d0e_9a10_0000_0000_0004,
                ("Marin Kovač", "Power Forward", 26),
                AthleteStatus::Monitor,
                [77.0, 69.0, 63.0],
                4,
                &[68.0, 65.0, 66.0, 63.0],
                vec![LogEntry::new(day(2026, 1, 30), "wellness", "Poor sleep scores three nights")],
            ),
            athlete(
                0x6a1f_42c0_5b7e_4d0e_9a10_0000_0000_0005,
                ("Ana Jurić", "Small Forward", 19),
                AthleteStatus::Ready,
                [58.0, 31.0, 82.0],
                0,
                &[75.0, 78.0, 80.0, 82.0],
                Vec::new(),
            ),
            athlete(
                0x6a1f_42c0_5b7e_4d0e_9a10_0000_0000_0006,
                ("Tomislav Šarić", "Center", 32),
                AthleteStatus::Monitor,
                [49.0, 57.0, 67.0],
                0,
                &[72.0, 70.0, 69.0, 67.0],
                vec![LogEntry::new(
                    day(2026, 2, 2),
                    "load",
                    "Back-to-back games, reduced practice",
                )],
            ),
        ]
    }

    fn scenarios() -> Vec<Scenario<Self>> {
        vec![
            Scenario {
                key: "push-load",
                label: "Push load",
                apply: push_load,
            },
            Scenario {
                key: "recovery-day",
                label: "Recovery day",
                apply: recovery_day,
            },
            Scenario {
                key: "extend-window",
                label: "Extend window",
                apply: extend_window,
            },
            Scenario {
                key: "trigger-risk",
                label: "Trigger risk",
                apply: trigger_risk,
            },
        ]
    }

    fn insight(&self) -> String {
        fill(
            copilot().pick(self),
            &[
                ("name", self.name.clone()),
                ("fatigue", format!("{:.0}", self.fatigue)),
                ("readiness", format!("{:.0}", self.readiness)),
                ("window", self.window_days.to_string()),
            ],
        )
    }

    fn color(&self) -> &'static str {
        match self.status {
            AthleteStatus::Elite => "#1f9d55",
            AthleteStatus::Ready => "#2f80ed",
            AthleteStatus::Monitor => "#f2c94c",
            AthleteStatus::AtRisk => "#eb5757",
        }
    }

    fn trend(&self) -> &[f64] {
        &self.trend
    }
}

fn athlete(
    id: u128,
    (name, position, age): (&str, &str, u32),
    status: AthleteStatus,
    [load, fatigue, readiness]: [f64; 3],
    window_days: u32,
    trend: &[f64],
    log: Vec<LogEntry>,
) -> Athlete {
    Athlete {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        position: position.to_string(),
        age,
        status,
        load,
        fatigue,
        readiness,
        window_days,
        trend: trend.to_vec(),
        log,
    }
}

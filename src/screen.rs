use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ScreenError;
use crate::export::{export_file_name, pdf_blocks, CsvTable, ExportSink, Exportable, PdfLayout};
use crate::filter::{filter, Criteria, Filterable};
use crate::form::{Draft, FormRecord};
use crate::report::{build_report, Reportable};
use crate::scenario::{find_scenario, Scenario};
use crate::store::Store;

/// Which overlay is open. Only one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Adding { draft: Draft },
    Editing { id: Uuid, draft: Draft },
    Viewing { id: Uuid },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Adding { .. } => "adding",
            Mode::Editing { .. } => "editing",
            Mode::Viewing { .. } => "viewing",
        }
    }
}

/// One boardroom page: store, filters, the open form and the scenario table.
pub struct Screen<T: FormRecord> {
    title: String,
    store: Store<T>,
    criteria: Criteria,
    mode: Mode,
    scenarios: Vec<Scenario<T>>,
}

impl<T> Screen<T>
where
    T: FormRecord + Filterable + Exportable + Reportable,
{
    pub fn new(title: impl Into<String>, store: Store<T>, scenarios: Vec<Scenario<T>>) -> Self {
        Self {
            title: title.into(),
            store,
            criteria: Criteria::default(),
            mode: Mode::Idle,
            scenarios,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn store(&self) -> &Store<T> {
        &self.store
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn scenarios(&self) -> &[Scenario<T>] {
        &self.scenarios
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: Criteria) {
        self.criteria = criteria;
    }

    pub fn visible(&self) -> Vec<&T> {
        filter(self.store.items(), &self.criteria)
    }

    /// The record shown in the side panel, if any.
    pub fn selected(&self) -> Option<&T> {
        match &self.mode {
            Mode::Editing { id, .. } | Mode::Viewing { id } => self.store.get(*id),
            _ => None,
        }
    }

    pub fn open_add(&mut self) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        self.mode = Mode::Adding {
            draft: Draft::new(),
        };
        Ok(())
    }

    pub fn open_edit(&mut self, id: Uuid) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        let record = self.store.get(id).ok_or(ScreenError::NotFound(id))?;
        self.mode = Mode::Editing {
            id,
            draft: record.to_draft(),
        };
        Ok(())
    }

    pub fn open_view(&mut self, id: Uuid) -> Result<(), ScreenError> {
        self.ensure_idle()?;
        if self.store.get(id).is_none() {
            return Err(ScreenError::NotFound(id));
        }
        self.mode = Mode::Viewing { id };
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<(), ScreenError> {
        match &mut self.mode {
            Mode::Adding { draft } | Mode::Editing { draft, .. } => {
                draft.set(key, value);
                Ok(())
            }
            _ => Err(ScreenError::NoOpenForm),
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.mode {
            Mode::Adding { draft } | Mode::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Saves the open form. On a validation error the form stays open with
    /// the draft untouched.
    pub fn submit(&mut self) -> Result<Uuid, ScreenError> {
        let (id, saved) = match &self.mode {
            Mode::Adding { draft } => {
                let record = T::from_draft(draft, None)?;
                (self.store.add(record), true)
            }
            Mode::Editing { id, draft } => {
                let id = *id;
                let record = T::from_draft(draft, self.store.get(id))?;
                (id, self.store.replace(id, record))
            }
            _ => return Err(ScreenError::NoOpenForm),
        };
        let mode = self.mode.name();
        self.mode = Mode::Idle;
        if !saved {
            return Err(ScreenError::NotFound(id));
        }
        info!(screen = %self.title, %id, mode, "form saved");
        Ok(id)
    }

    pub fn cancel(&mut self) {
        self.mode = Mode::Idle;
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let removed = self.store.remove(id);
        if removed && self.mode_targets(id) {
            self.mode = Mode::Idle;
        }
        removed
    }

    pub fn undo(&mut self) -> bool {
        let done = self.store.undo();
        self.drop_stale_mode();
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.store.redo();
        self.drop_stale_mode();
        done
    }

    /// Applies a canned scenario to one record through the store, so it can
    /// be undone like any edit.
    pub fn simulate(&mut self, id: Uuid, key: &str, today: NaiveDate) -> Result<&T, ScreenError> {
        let scenario = find_scenario(&self.scenarios, key)
            .ok_or_else(|| ScreenError::UnknownScenario(key.to_string()))?;
        let current = self.store.get(id).ok_or(ScreenError::NotFound(id))?;
        let next = scenario.run(current, today);
        debug!(screen = %self.title, %id, scenario = scenario.key, "scenario applied");
        self.store.replace(id, next);
        self.store.get(id).ok_or(ScreenError::NotFound(id))
    }

    pub fn export_csv(
        &self,
        sink: &mut dyn ExportSink,
        today: NaiveDate,
    ) -> anyhow::Result<String> {
        let name = export_file_name(T::SUBJECT, today, "csv");
        let table = CsvTable::from_records(self.visible());
        sink.write_csv(&name, &table)?;
        info!(screen = %self.title, rows = table.rows.len(), file = %name, "csv exported");
        Ok(name)
    }

    pub fn export_pdf(
        &self,
        sink: &mut dyn ExportSink,
        layout: &PdfLayout,
        today: NaiveDate,
    ) -> anyhow::Result<String> {
        let name = export_file_name(T::SUBJECT, today, "pdf.json");
        let blocks = pdf_blocks(self.visible());
        let subtitle = format!("CourtEvo Vero · {} · {}", self.title, today);
        let pages = layout.layout(&self.title, &subtitle, &blocks);
        sink.write_pdf(&name, &pages)?;
        info!(screen = %self.title, pages = pages.len(), file = %name, "pdf layout exported");
        Ok(name)
    }

    pub fn export_report(
        &self,
        sink: &mut dyn ExportSink,
        today: NaiveDate,
    ) -> anyhow::Result<String> {
        let name = export_file_name(T::SUBJECT, today, "md");
        let visible: Vec<T> = self.visible().into_iter().cloned().collect();
        let report = build_report(&self.title, &visible, today);
        sink.write_report(&name, &report)?;
        Ok(name)
    }

    fn ensure_idle(&self) -> Result<(), ScreenError> {
        match self.mode {
            Mode::Idle => Ok(()),
            _ => Err(ScreenError::Busy(self.mode.name())),
        }
    }

    fn mode_targets(&self, target: Uuid) -> bool {
        matches!(&self.mode, Mode::Editing { id, .. } | Mode::Viewing { id } if *id == target)
    }

    fn drop_stale_mode(&mut self) {
        if let Mode::Editing { id, .. } | Mode::Viewing { id } = &self.mode {
            if self.store.get(*id).is_none() {
                self.mode = Mode::Idle;
            }
        }
    }
}

use crate::config::MapConfig;
use crate::data::{self, DataSource};
use crate::error::LoadError;
use crate::filter::{self, FilterCriteria, Selection};
use crate::types::{GroupField, RecordTable};
use crate::view::DashboardView;
use serde::Serialize;

/// Selector contents for the district and category controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub districts: Vec<String>,
    pub categories: Vec<String>,
}

/// The only mutable state: the loaded table and the current selections.
/// Each control has one handler, which returns the freshly derived view.
#[derive(Debug, Clone)]
pub struct Session {
    table: RecordTable,
    criteria: FilterCriteria,
    all_label: String,
    map: MapConfig,
}

impl Session {
    pub fn new(table: RecordTable, all_label: &str, map: MapConfig) -> Self {
        Self {
            table,
            criteria: FilterCriteria::default(),
            all_label: all_label.to_string(),
            map,
        }
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn all_label(&self) -> &str {
        &self.all_label
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            districts: filter::options(&self.table, GroupField::District, &self.all_label),
            categories: filter::options(&self.table, GroupField::Category, &self.all_label),
        }
    }

    pub fn view(&self) -> DashboardView {
        self.view_with(&self.criteria)
    }

    /// Derives a view for `criteria` without touching the stored selections.
    pub fn view_with(&self, criteria: &FilterCriteria) -> DashboardView {
        DashboardView::build(&self.table, criteria, &self.map)
    }

    pub fn select_district(&mut self, value: &str) -> DashboardView {
        self.criteria.district = Selection::parse(value, &self.all_label);
        self.view()
    }

    pub fn select_category(&mut self, value: &str) -> DashboardView {
        self.criteria.category = Selection::parse(value, &self.all_label);
        self.view()
    }

    pub fn search_name(&mut self, query: &str) -> DashboardView {
        self.criteria.name_query = query.to_string();
        self.view()
    }

    /// Replaces the whole table with uploaded CSV text and resets the selections,
    /// which may name values the new table lacks. On error the previous table stays.
    pub fn upload(&mut self, csv: String) -> Result<DashboardView, LoadError> {
        let outcome = data::load(&DataSource::Csv(csv))?;
        tracing::info!(records = outcome.table.len(), dropped = outcome.dropped, "Replaced record table from upload");

        self.table = outcome.table;
        self.criteria = FilterCriteria::default();
        Ok(self.view())
    }
}

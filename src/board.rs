//! Client-side view of the expense data: a mirror of what the server holds plus
//! the filter and error-banner state a front end renders from.
//!
//! Every successful mutation is followed by a full re-fetch; local state is never
//! patched in place.

use crate::error::ExpenseError;
use crate::models::{Expense, ExpenseFilter, ExpenseInput, SummaryRow};
use crate::service::ExpenseService;

/// Expenses whose category equals `selected_category` (when set) and whose
/// description contains `search_term` ignoring case (when non-empty).
pub fn filter_expenses<'a>(
    expenses: &'a [Expense],
    selected_category: Option<&str>,
    search_term: &str,
) -> Vec<&'a Expense> {
    let needle = search_term.to_lowercase();
    expenses
        .iter()
        .filter(|expense| selected_category.is_none_or(|category| expense.category == category))
        .filter(|expense| needle.is_empty() || expense.description.to_lowercase().contains(&needle))
        .collect()
}

pub struct Board<S> {
    service: S,
    expenses: Vec<Expense>,
    categories: Vec<String>,
    summary: Vec<SummaryRow>,
    selected_category: Option<String>,
    search_term: String,
    loading: bool,
    error: Option<String>,
}

impl<S: ExpenseService> Board<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            expenses: Vec::new(),
            categories: Vec::new(),
            summary: Vec::new(),
            selected_category: None,
            search_term: String::new(),
            loading: true,
            error: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Initial fetch of everything the view shows.
    pub fn load(&mut self) {
        self.refresh();
    }

    pub fn add(&mut self, input: &ExpenseInput) -> bool {
        let result = self.service.create_expense(input).map(|_| ());
        self.after_mutation(result)
    }

    pub fn save(&mut self, id: i64, input: &ExpenseInput) -> bool {
        let result = self.service.update_expense(id, input).map(|_| ());
        self.after_mutation(result)
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let result = self.service.delete_expense(id);
        self.after_mutation(result)
    }

    pub fn select_category(&mut self, category: Option<&str>) {
        self.selected_category = category
            .filter(|category| !category.is_empty() && *category != "all")
            .map(str::to_string);
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn visible(&self) -> Vec<&Expense> {
        filter_expenses(
            &self.expenses,
            self.selected_category.as_deref(),
            &self.search_term,
        )
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn summary(&self) -> &[SummaryRow] {
        &self.summary
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn after_mutation(&mut self, result: Result<(), ExpenseError>) -> bool {
        match result {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    fn refresh(&mut self) {
        match self.service.expenses(&ExpenseFilter::default()) {
            Ok(expenses) => self.expenses = expenses,
            Err(err) => self.error = Some(err.to_string()),
        }
        self.loading = false;

        // Background data: keep what we had.
        match self.service.categories() {
            Ok(categories) => self.categories = categories,
            Err(err) => log::warn!("Failed to refresh categories: {err}"),
        }
        match self.service.summary() {
            Ok(summary) => self.summary = summary,
            Err(err) => log::warn!("Failed to refresh summary: {err}"),
        }
    }
}

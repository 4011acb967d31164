use crate::db::Store;
use crate::error::ExpenseError;
use crate::models::{Expense, ExpenseFilter, ExpenseInput, SummaryRow};

/// The operations exposed to clients. Both the HTTP routes and [`crate::board::Board`]
/// talk to the store through this trait.
pub trait ExpenseService {
    fn expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseError>;
    fn create_expense(&self, input: &ExpenseInput) -> Result<i64, ExpenseError>;
    fn update_expense(&self, id: i64, input: &ExpenseInput) -> Result<i64, ExpenseError>;
    fn delete_expense(&self, id: i64) -> Result<(), ExpenseError>;
    fn categories(&self) -> Result<Vec<String>, ExpenseError>;
    fn summary(&self) -> Result<Vec<SummaryRow>, ExpenseError>;
}

impl ExpenseService for Store {
    fn expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.list_expenses(filter)?)
    }

    fn create_expense(&self, input: &ExpenseInput) -> Result<i64, ExpenseError> {
        let record = input.validate()?;
        let id = self.insert_expense(&record)?;
        log::info!("Created expense {id} ({} in {})", record.description, record.category);
        Ok(id)
    }

    fn update_expense(&self, id: i64, input: &ExpenseInput) -> Result<i64, ExpenseError> {
        let record = input.validate()?;
        if !self.replace_expense(id, &record)? {
            return Err(ExpenseError::NotFound(id));
        }
        log::info!("Updated expense {id}");
        Ok(id)
    }

    fn delete_expense(&self, id: i64) -> Result<(), ExpenseError> {
        if !self.remove_expense(id)? {
            return Err(ExpenseError::NotFound(id));
        }
        log::info!("Deleted expense {id}");
        Ok(())
    }

    fn categories(&self) -> Result<Vec<String>, ExpenseError> {
        Ok(self.list_categories()?)
    }

    fn summary(&self) -> Result<Vec<SummaryRow>, ExpenseError> {
        Ok(self.category_totals()?)
    }
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row, params};

use crate::models::{
    DEFAULT_CATEGORIES, Expense, ExpenseFilter, ExpenseRecord, SummaryRow, cents_to_amount,
};

pub type DbPool = Pool<SqliteConnectionManager>;

const SAMPLE_EXPENSES: [(i64, &str, &str); 3] = [
    (5000, "Lunch at cafe", "Food"),
    (12000, "Grocery shopping", "Food"),
    (2500, "Bus fare", "Transportation"),
];

/// Data-access object over the expense database. Construct one per process and
/// hand it to whoever needs it; the pool is released when it is dropped.
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::new(manager)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::init(pool)
    }

    /// Every in-memory connection is its own database, so the pool holds exactly one.
    pub fn open_in_memory() -> Result<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())?;
        Self::init(pool)
    }

    fn init(pool: DbPool) -> Result<Self> {
        let store = Self { pool };
        {
            let conn = store.conn()?;
            run_migrations(&conn).context("Database migration failed")?;
            seed_default_categories(&conn)?;
        }
        Ok(store)
    }

    pub fn close(self) {
        let state = self.pool.state();
        log::info!(
            "Closing expense store ({} connections, {} idle)",
            state.connections,
            state.idle_connections
        );
        drop(self.pool);
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().context("No database connection available")
    }

    /// Inserts the demo expenses, dated `today`, into an empty expense table.
    /// Returns whether anything was inserted.
    pub fn seed_sample_expenses(&self, today: NaiveDate) -> Result<bool> {
        if self.expense_count()? > 0 {
            return Ok(false);
        }
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "
            INSERT INTO expenses (amount_cents, description, category, date)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )?;
        for (amount_cents, description, category) in SAMPLE_EXPENSES {
            stmt.execute(params![amount_cents, description, category, today])?;
        }
        log::info!("Inserted sample expenses");
        Ok(true)
    }

    pub fn expense_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut conditions = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();
        if let Some(category) = &filter.category {
            values.push(category);
            conditions.push(format!("category = ?{}", values.len()));
        }
        if let Some(date) = &filter.date {
            values.push(date);
            conditions.push(format!("date = ?{}", values.len()));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "
            SELECT id, amount_cents, description, category, date, created_at
            FROM expenses
            {where_clause}
            ORDER BY date DESC, id DESC
            "
        ))?;
        let rows = stmt.query_map(values.as_slice(), expense_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn expense_by_id(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "
            SELECT id, amount_cents, description, category, date, created_at
            FROM expenses
            WHERE id = ?1
            ",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(expense_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn insert_expense(&self, record: &ExpenseRecord) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "
            INSERT INTO expenses (amount_cents, description, category, date)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                record.amount_cents,
                record.description,
                record.category,
                record.date
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrites every mutable column. Returns `false` when no row has this id.
    pub fn replace_expense(&self, id: i64, record: &ExpenseRecord) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "
            UPDATE expenses
            SET amount_cents = ?1, description = ?2, category = ?3, date = ?4
            WHERE id = ?5
            ",
            params![
                record.amount_cents,
                record.description,
                record.category,
                record.date,
                id
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn remove_expense(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn list_categories(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Per-category totals. Categories without expenses do not appear.
    pub fn category_totals(&self) -> Result<Vec<SummaryRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "
            SELECT category, SUM(amount_cents) AS total_cents
            FROM expenses
            GROUP BY category
            ORDER BY category
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SummaryRow {
                category: row.get(0)?,
                total: cents_to_amount(row.get(1)?),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount_cents INTEGER NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);

        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );
        ",
    )
}

fn seed_default_categories(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }
    let mut stmt = conn.prepare("INSERT INTO categories (name) VALUES (?1)")?;
    for name in DEFAULT_CATEGORIES {
        stmt.execute(params![name])?;
    }
    log::info!("Inserted default categories");
    Ok(())
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        amount: cents_to_amount(row.get(1)?),
        description: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount_cents: i64, description: &str, category: &str, date: &str) -> ExpenseRecord {
        ExpenseRecord {
            amount_cents,
            description: description.to_string(),
            category: category.to_string(),
            date: date.parse().unwrap(),
        }
    }

    #[test]
    fn default_categories_seeded_in_name_order() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(
            store.list_categories().unwrap(),
            vec!["Bills", "Entertainment", "Food", "Other", "Shopping", "Transportation"]
        );
    }

    #[test]
    fn reopening_does_not_duplicate_categories_or_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("expenses.sqlite");
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let store = Store::open(&path).unwrap();
        assert!(store.seed_sample_expenses(today).unwrap());
        store.close();

        let store = Store::open(&path).unwrap();
        assert!(!store.seed_sample_expenses(today).unwrap());
        assert_eq!(store.list_categories().unwrap().len(), DEFAULT_CATEGORIES.len());
        assert_eq!(store.expense_count().unwrap(), 3);
    }

    #[test]
    fn insert_assigns_ids_and_created_at() {
        let store = Store::open_in_memory().unwrap();
        let first = store.insert_expense(&record(5000, "Lunch", "Food", "2024-05-01")).unwrap();
        let second = store.insert_expense(&record(5000, "Lunch", "Food", "2024-05-01")).unwrap();
        assert_ne!(first, second);

        let stored = store.expense_by_id(first).unwrap().unwrap();
        assert_eq!(stored.amount, cents_to_amount(5000));
        assert_eq!(stored.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(store.expense_by_id(first + 100).unwrap().is_none());
    }

    #[test]
    fn list_orders_by_date_descending_and_filters() {
        let store = Store::open_in_memory().unwrap();
        store.insert_expense(&record(100, "Old", "Food", "2024-01-01")).unwrap();
        store.insert_expense(&record(200, "New", "Food", "2024-03-01")).unwrap();
        store.insert_expense(&record(300, "Mid", "Bills", "2024-02-01")).unwrap();
        store.insert_expense(&record(400, "Lower", "food", "2024-03-01")).unwrap();

        let all = store.list_expenses(&ExpenseFilter::default()).unwrap();
        let order: Vec<&str> = all.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(order, vec!["Lower", "New", "Mid", "Old"]);

        let food = store
            .list_expenses(&ExpenseFilter {
                category: Some("Food".into()),
                date: None,
            })
            .unwrap();
        assert_eq!(food.len(), 2);
        assert!(food.iter().all(|e| e.category == "Food"));

        let both = store
            .list_expenses(&ExpenseFilter {
                category: Some("Food".into()),
                date: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            })
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].description, "New");

        let none = store
            .list_expenses(&ExpenseFilter {
                category: Some("Travel".into()),
                date: None,
            })
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let store = Store::open_in_memory().unwrap();
        let id = store.insert_expense(&record(100, "Tea", "Food", "2024-01-01")).unwrap();

        let replacement = record(250, "Tea and cake", "Food", "2024-01-02");
        assert!(store.replace_expense(id, &replacement).unwrap());
        let updated = store.expense_by_id(id).unwrap().unwrap();
        assert_eq!(updated.description, "Tea and cake");
        assert_eq!(updated.amount, cents_to_amount(250));

        assert!(!store.replace_expense(id + 1, &record(1, "x", "Food", "2024-01-01")).unwrap());
        assert!(store.remove_expense(id).unwrap());
        assert!(!store.remove_expense(id).unwrap());
    }

    #[test]
    fn summary_groups_by_category_and_omits_empty_ones() {
        let store = Store::open_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        store.seed_sample_expenses(today).unwrap();

        let summary = store.category_totals().unwrap();
        assert_eq!(
            summary,
            vec![
                SummaryRow {
                    category: "Food".into(),
                    total: cents_to_amount(17000),
                },
                SummaryRow {
                    category: "Transportation".into(),
                    total: cents_to_amount(2500),
                },
            ]
        );
    }
}

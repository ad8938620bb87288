use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Employee, LeaveTransaction};

/// Fixed storage key, informally versioned by the suffix. The store file is
/// named after it so a v2 format can live alongside a v1 file.
pub const STORAGE_KEY: &str = "leave-manager-employees-v1";

/// JSON-file persistence for the employee collection.
///
/// The on-disk format is a single JSON array of employee records, identical
/// to what the browser client kept under the same key in localStorage. Reads
/// are deliberately forgiving: a missing, unreadable, or corrupt file loads
/// as an empty collection rather than an error.
pub struct EmployeeStore {
    path: PathBuf,
}

impl EmployeeStore {
    /// Store rooted in `dir`; the file name is derived from [`STORAGE_KEY`].
    pub fn open(dir: &Path) -> Self {
        EmployeeStore {
            path: dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection. Any read or parse failure yields an empty
    /// list rather than an error.
    pub fn load(&self) -> Vec<Employee> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Persist the full collection, replacing whatever was stored.
    pub fn save(&self, employees: &[Employee]) -> Result<()> {
        let json = serde_json::to_string(employees)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store file {:?}", self.path))?;
        Ok(())
    }

    /// Append a new employee and persist.
    pub fn add_employee(&self, employee: Employee) -> Result<()> {
        let mut employees = self.load();
        employees.push(employee);
        self.save(&employees)
    }

    /// Append a transaction to the employee with the given id and persist.
    /// The transaction history is append-only; nothing is ever amended.
    pub fn append_transaction(&self, employee_id: &str, tx: LeaveTransaction) -> Result<()> {
        let mut employees = self.load();
        let employee = employees
            .iter_mut()
            .find(|e| e.id == employee_id)
            .with_context(|| format!("Employee not found: {employee_id}"))?;
        employee.transactions.push(tx);
        self.save(&employees)
    }

    /// Discard the entire collection ("reset all").
    pub fn reset(&self) -> Result<()> {
        self.save(&[])
    }
}

// 📂 CSV Loader - Records handed in by the import workflow
//
// clients.csv:     id,name
// expenses.csv:    id,date,supplier,amount,category
// candidates.csv:  date,supplier,amount
//
// Every record is validated at the boundary; a bad row fails the whole load
// with its line number.

use crate::entities::{Client, DuplicateExpense, ExpenseCandidate};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

pub fn load_clients(csv_path: &Path) -> Result<Vec<Client>> {
    let clients: Vec<Client> = load_records(csv_path)?;
    for (index, client) in clients.iter().enumerate() {
        client
            .validate()
            .with_context(|| format!("Invalid client on line {}", index + 2))?;
    }

    info!(count = clients.len(), path = %csv_path.display(), "Loaded clients");
    Ok(clients)
}

pub fn load_expenses(csv_path: &Path) -> Result<Vec<DuplicateExpense>> {
    let expenses: Vec<DuplicateExpense> = load_records(csv_path)?;
    for (index, expense) in expenses.iter().enumerate() {
        expense
            .validate()
            .with_context(|| format!("Invalid expense on line {}", index + 2))?;
    }

    info!(count = expenses.len(), path = %csv_path.display(), "Loaded existing expenses");
    Ok(expenses)
}

pub fn load_candidates(csv_path: &Path) -> Result<Vec<ExpenseCandidate>> {
    let candidates: Vec<ExpenseCandidate> = load_records(csv_path)?;
    for (index, candidate) in candidates.iter().enumerate() {
        candidate
            .validate()
            .with_context(|| format!("Invalid candidate on line {}", index + 2))?;
    }

    info!(count = candidates.len(), path = %csv_path.display(), "Loaded expense candidates");
    Ok(candidates)
}

fn load_records<T: DeserializeOwned>(csv_path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.context("Failed to deserialize record")?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_clients() {
        let file = write_csv("id,name\nc1,Spotify AB\nc2,Konserthuset Stockholm\n");
        let clients = load_clients(file.path()).unwrap();

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].id, "c1");
        assert_eq!(clients[1].name, "Konserthuset Stockholm");
    }

    #[test]
    fn test_load_clients_rejects_missing_id() {
        let file = write_csv("id,name\nc1,Spotify\n,Nalen\n");
        let err = load_clients(file.path()).unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_load_expenses_with_optional_category() {
        let file = write_csv(
            "id,date,supplier,amount,category\n\
             e1,2024-03-01,Thomann,249.00,Equipment\n\
             e2,2024-03-02,SJ AB,495.50,\n",
        );
        let expenses = load_expenses(file.path()).unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].category.as_deref(), Some("Equipment"));
        assert_eq!(expenses[1].category, None);
        assert_eq!(expenses[1].amount, Decimal::new(49550, 2));
    }

    #[test]
    fn test_load_candidates_rejects_bad_date() {
        let file = write_csv("date,supplier,amount\n03/01/2024,Thomann,249.00\n");
        assert!(load_candidates(file.path()).is_err());
    }

    #[test]
    fn test_load_candidates_rejects_blank_supplier() {
        let file = write_csv("date,supplier,amount\n2024-03-01,  ,249.00\n");
        let err = load_candidates(file.path()).unwrap_err();

        assert!(err.to_string().contains("Invalid candidate on line 2"));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(load_clients(Path::new("/nonexistent/clients.csv")).is_err());
    }
}

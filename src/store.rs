use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{MedlogError, Result};
use crate::models::{VisitEntry, VisitInput};

/// Record storage for visit entries, scoped to a single owner.
pub trait VisitStore {
    /// Store a new entry and return its id.
    fn create_entry(&self, input: &VisitInput) -> Result<i64>;
    fn edit_entry(&self, id: i64, input: &VisitInput) -> Result<()>;
    /// Delete an entry. `confirm_hospital_name` must match the stored name exactly.
    fn delete_entry(&self, id: i64, confirm_hospital_name: &str) -> Result<()>;
    fn get_entry(&self, id: i64) -> Result<VisitEntry>;
    /// Newest visit first; ties go to the most recently created.
    fn list_entries(&self) -> Result<Vec<VisitEntry>>;
}

pub struct SqliteStore {
    conn: Connection,
    owner: String,
}

const SELECT_ENTRY: &str = "SELECT id, owner, created_at, visit_date, hospital_name, doctor_name, \
     patient_name, hospital_rs, medicine_rs, medicine_name, address FROM visit_entries";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<VisitEntry> {
    Ok(VisitEntry {
        id: row.get(0)?,
        owner: row.get(1)?,
        created_at: row.get(2)?,
        visit_date: row.get(3)?,
        hospital_name: row.get(4)?,
        doctor_name: row.get(5)?,
        patient_name: row.get(6)?,
        hospital_rs: row.get::<_, i64>(7)?.max(0) as u64,
        medicine_rs: row.get::<_, i64>(8)?.max(0) as u64,
        medicine_name: row.get(9)?,
        address: row.get(10)?,
    })
}

fn check_input(input: &VisitInput) -> Result<(i64, i64)> {
    let required = [
        (&input.hospital_name, "Hospital name is required"),
        (&input.doctor_name, "Doctor name is required"),
        (&input.patient_name, "Patient name is required"),
        (&input.medicine_name, "Medicine name is required"),
        (&input.address, "Address is required"),
    ];
    if let Some((_, msg)) = required.iter().find(|(v, _)| v.trim().is_empty()) {
        return Err(MedlogError::Validation(msg.to_string()));
    }
    let hospital_rs = i64::try_from(input.hospital_rs)
        .map_err(|_| MedlogError::Validation("Hospital charges are too large".to_string()))?;
    let medicine_rs = i64::try_from(input.medicine_rs)
        .map_err(|_| MedlogError::Validation("Medicine charges are too large".to_string()))?;
    Ok((hospital_rs, medicine_rs))
}

impl SqliteStore {
    pub fn new(conn: Connection, owner: &str) -> Self {
        Self {
            conn,
            owner: owner.to_string(),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl VisitStore for SqliteStore {
    fn create_entry(&self, input: &VisitInput) -> Result<i64> {
        let (hospital_rs, medicine_rs) = check_input(input)?;
        self.conn.execute(
            "INSERT INTO visit_entries (owner, created_at, visit_date, hospital_name, doctor_name, \
             patient_name, hospital_rs, medicine_rs, medicine_name, address) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                self.owner,
                Utc::now().timestamp_millis(),
                input.visit_date,
                input.hospital_name,
                input.doctor_name,
                input.patient_name,
                hospital_rs,
                medicine_rs,
                input.medicine_name,
                input.address,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, owner = %self.owner, "created visit entry");
        Ok(id)
    }

    fn edit_entry(&self, id: i64, input: &VisitInput) -> Result<()> {
        let (hospital_rs, medicine_rs) = check_input(input)?;
        self.get_entry(id)?;
        self.conn.execute(
            "UPDATE visit_entries SET visit_date = ?1, hospital_name = ?2, doctor_name = ?3, \
             patient_name = ?4, hospital_rs = ?5, medicine_rs = ?6, medicine_name = ?7, address = ?8 \
             WHERE id = ?9",
            rusqlite::params![
                input.visit_date,
                input.hospital_name,
                input.doctor_name,
                input.patient_name,
                hospital_rs,
                medicine_rs,
                input.medicine_name,
                input.address,
                id,
            ],
        )?;
        debug!(id, "edited visit entry");
        Ok(())
    }

    fn delete_entry(&self, id: i64, confirm_hospital_name: &str) -> Result<()> {
        let entry = self.get_entry(id)?;
        if entry.hospital_name != confirm_hospital_name {
            return Err(MedlogError::ConfirmationMismatch {
                expected: entry.hospital_name,
            });
        }
        self.conn.execute("DELETE FROM visit_entries WHERE id = ?1", [id])?;
        debug!(id, "deleted visit entry");
        Ok(())
    }

    fn get_entry(&self, id: i64) -> Result<VisitEntry> {
        let entry = self
            .conn
            .query_row(&format!("{SELECT_ENTRY} WHERE id = ?1"), [id], entry_from_row)
            .optional()?
            .ok_or(MedlogError::EntryNotFound(id))?;
        if entry.owner != self.owner {
            return Err(MedlogError::NotOwner(id));
        }
        Ok(entry)
    }

    fn list_entries(&self) -> Result<Vec<VisitEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_ENTRY} WHERE owner = ?1 ORDER BY visit_date DESC, created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map([&self.owner], entry_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_store(owner: &str) -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, SqliteStore::new(conn, owner))
    }

    fn input(hospital: &str, visit_date: i64) -> VisitInput {
        VisitInput {
            hospital_name: hospital.to_string(),
            visit_date,
            doctor_name: "Dr. Smith".to_string(),
            patient_name: "John Doe".to_string(),
            hospital_rs: 5000,
            medicine_rs: 1200,
            medicine_name: "Paracetamol".to_string(),
            address: "123 Main St".to_string(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, store) = test_store("alice");
        let id = store.create_entry(&input("City Hospital", 1_705_276_800_000)).unwrap();
        let entry = store.get_entry(id).unwrap();
        assert_eq!(entry.hospital_name, "City Hospital");
        assert_eq!(entry.owner, "alice");
        assert_eq!(entry.total_rs(), 6200);
        assert!(entry.created_at > 0);
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let (_dir, store) = test_store("alice");
        let mut bad = input("City Hospital", 0);
        bad.address = "  ".to_string();
        let err = store.create_entry(&bad).unwrap_err();
        assert!(matches!(err, MedlogError::Validation(ref m) if m == "Address is required"));
        assert!(store.list_entries().unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_entry() {
        let (_dir, store) = test_store("alice");
        assert!(matches!(store.get_entry(42), Err(MedlogError::EntryNotFound(42))));
    }

    #[test]
    fn test_edit_entry() {
        let (_dir, store) = test_store("alice");
        let id = store.create_entry(&input("City Hospital", 0)).unwrap();
        let mut changed = input("General Hospital", 86_400_000);
        changed.medicine_rs = 0;
        store.edit_entry(id, &changed).unwrap();
        let entry = store.get_entry(id).unwrap();
        assert_eq!(entry.hospital_name, "General Hospital");
        assert_eq!(entry.medicine_rs, 0);
        assert_eq!(entry.visit_date, 86_400_000);
    }

    #[test]
    fn test_delete_requires_matching_hospital_name() {
        let (_dir, store) = test_store("alice");
        let id = store.create_entry(&input("City Hospital", 0)).unwrap();
        let err = store.delete_entry(id, "city hospital").unwrap_err();
        assert!(matches!(err, MedlogError::ConfirmationMismatch { .. }));
        assert!(store.get_entry(id).is_ok());
        store.delete_entry(id, "City Hospital").unwrap();
        assert!(matches!(store.get_entry(id), Err(MedlogError::EntryNotFound(_))));
    }

    #[test]
    fn test_entries_are_scoped_to_owner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let alice_conn = get_connection(&path).unwrap();
        init_db(&alice_conn).unwrap();
        let alice = SqliteStore::new(alice_conn, "alice");
        let bob = SqliteStore::new(get_connection(&path).unwrap(), "bob");

        let id = alice.create_entry(&input("City Hospital", 0)).unwrap();
        assert!(bob.list_entries().unwrap().is_empty());
        assert!(matches!(bob.get_entry(id), Err(MedlogError::NotOwner(_))));
        assert!(matches!(
            bob.edit_entry(id, &input("X", 0)),
            Err(MedlogError::NotOwner(_))
        ));
        assert!(matches!(
            bob.delete_entry(id, "City Hospital"),
            Err(MedlogError::NotOwner(_))
        ));
        assert_eq!(alice.list_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_list_orders_newest_visit_first() {
        let (_dir, store) = test_store("alice");
        let day = 86_400_000;
        store.create_entry(&input("Old", day)).unwrap();
        store.create_entry(&input("New", 3 * day)).unwrap();
        store.create_entry(&input("Same Day A", 2 * day)).unwrap();
        store.create_entry(&input("Same Day B", 2 * day)).unwrap();
        let names: Vec<String> = store
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.hospital_name)
            .collect();
        assert_eq!(names, vec!["New", "Same Day B", "Same Day A", "Old"]);
    }
}

//! Loads class snapshots from the class-listing CSV export so the service and CLI can run
//! without a live backend.

mod parser;

use crate::transfers::{
    ClassId, ClassStatus, ClassSummary, GradeId, ScheduleSlot, SubjectId, TeacherId,
};
use parser::ClassRow;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, message: String },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read class export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid class export CSV: {}", err),
            CatalogImportError::Row { line, message } => {
                write!(f, "class export line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ClassCatalogImporter;

impl ClassCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ClassSummary>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ClassSummary>, CatalogImportError> {
        parser::parse_rows(reader)?
            .into_iter()
            .map(|(line, row)| {
                class_from_row(row).map_err(|message| CatalogImportError::Row { line, message })
            })
            .collect()
    }
}

fn class_from_row(row: ClassRow) -> Result<ClassSummary, String> {
    if row.class_id.is_empty() {
        return Err("missing class id".to_string());
    }

    let status = ClassStatus::from_label(&row.status)
        .ok_or_else(|| format!("unknown class status '{}'", row.status))?;

    let max_capacity = row
        .capacity
        .as_deref()
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| format!("capacity '{}' is not a whole number", raw))
        })
        .transpose()?;

    let schedule = match row.schedule.as_deref() {
        Some(raw) => parse_schedule(raw)?,
        None => Vec::new(),
    };

    Ok(ClassSummary {
        id: ClassId::new(row.class_id),
        name: row.name,
        subject_id: SubjectId::new(row.subject),
        grade_id: GradeId::new(row.grade),
        status,
        current_occupancy: row.occupancy.unwrap_or(0),
        max_capacity,
        teacher_id: row.teacher.map(TeacherId::new),
        schedule,
    })
}

/// `1 08:00-09:30; 3 08:00-09:30`
fn parse_schedule(raw: &str) -> Result<Vec<ScheduleSlot>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<ScheduleSlot>()
                .map_err(|err| format!("schedule entry '{}': {}", entry, err))
        })
        .collect()
}

use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct ClassRow {
    #[serde(rename = "Class ID")]
    pub(crate) class_id: String,
    #[serde(rename = "Name", default)]
    pub(crate) name: String,
    #[serde(rename = "Subject")]
    pub(crate) subject: String,
    #[serde(rename = "Grade")]
    pub(crate) grade: String,
    #[serde(rename = "Status")]
    pub(crate) status: String,
    #[serde(rename = "Occupancy", default)]
    pub(crate) occupancy: Option<u32>,
    #[serde(rename = "Capacity", default, deserialize_with = "empty_as_none")]
    pub(crate) capacity: Option<String>,
    #[serde(rename = "Teacher", default, deserialize_with = "empty_as_none")]
    pub(crate) teacher: Option<String>,
    #[serde(rename = "Schedule", default, deserialize_with = "empty_as_none")]
    pub(crate) schedule: Option<String>,
}

/// Rows paired with their line number in the export, for error reporting.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(u64, ClassRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let row: ClassRow = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }

    Ok(rows)
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

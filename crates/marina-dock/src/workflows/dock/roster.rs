//! Roster import: one CSV row per member application.
//!
//! Expected headers: `member_id, member_name, seniority, category, boat_name, boat_length,
//! boat_type, boat_registration, insurance_coverage, insurance_notes`.

use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{ApplicationCategory, ApplicationSubmission, Member, MemberId};

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown category '{value}'")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: member {member} appears more than once")]
    DuplicateMember { row: usize, member: MemberId },
}

pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<ApplicationSubmission>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut submissions: Vec<ApplicationSubmission> = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = record?;
        // header is line 1
        let line = index + 2;

        let category = ApplicationCategory::parse(&row.category).ok_or_else(|| {
            RosterImportError::UnknownCategory {
                row: line,
                value: row.category.clone(),
            }
        })?;

        let member = MemberId(row.member_id);
        if submissions.iter().any(|existing| existing.member.id == member) {
            return Err(RosterImportError::DuplicateMember { row: line, member });
        }

        submissions.push(ApplicationSubmission {
            member: Member {
                id: member,
                name: row.member_name,
                seniority: row.seniority,
            },
            category,
            boat_name: row.boat_name,
            boat_length: row.boat_length,
            boat_type: row.boat_type,
            boat_registration: row.boat_registration,
            insurance_coverage: row.insurance_coverage,
            insurance_notes: row.insurance_notes,
        });
    }

    Ok(submissions)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    member_id: String,
    member_name: String,
    seniority: u32,
    category: String,
    boat_name: String,
    boat_length: u32,
    #[serde(default)]
    boat_type: String,
    #[serde(default)]
    boat_registration: String,
    insurance_coverage: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    insurance_notes: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "member_id,member_name,seniority,category,boat_name,boat_length,boat_type,boat_registration,insurance_coverage,insurance_notes\n";

    #[test]
    fn parses_rows_in_file_order() {
        let csv = format!(
            "{HEADER}m-7, Ada Lovelace ,3,renewal_same,Analytical,34,sloop,IA-1001,750000,\n\
             m-2,Grace Hopper,12,New,Cobol,28,trawler,IA-2002,500000,rider pending\n"
        );

        let roster = parse_roster(csv.as_bytes()).expect("roster parses");

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].member.id, MemberId("m-7".to_string()));
        assert_eq!(roster[0].member.name, "Ada Lovelace");
        assert_eq!(roster[0].category, ApplicationCategory::RenewalSame);
        assert_eq!(roster[0].insurance_notes, None);
        assert_eq!(roster[1].category, ApplicationCategory::New);
        assert_eq!(roster[1].boat_length, 28);
        assert_eq!(roster[1].insurance_notes.as_deref(), Some("rider pending"));
    }

    #[test]
    fn rejects_unknown_category_with_row_number() {
        let csv = format!("{HEADER}m-1,Ann,1,transfer,Gull,30,sloop,IA-1,600000,\n");

        let error = parse_roster(csv.as_bytes()).expect_err("category rejected");

        match error {
            RosterImportError::UnknownCategory { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "transfer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_duplicate_members() {
        let csv = format!(
            "{HEADER}m-1,Ann,1,new,Gull,30,sloop,IA-1,600000,\n\
             m-1,Ann,1,new,Tern,32,sloop,IA-2,600000,\n"
        );

        assert!(matches!(
            parse_roster(csv.as_bytes()),
            Err(RosterImportError::DuplicateMember { row: 3, .. })
        ));
    }

    #[test]
    fn malformed_numbers_surface_csv_errors() {
        let csv = format!("{HEADER}m-1,Ann,one,new,Gull,30,sloop,IA-1,600000,\n");

        assert!(matches!(
            parse_roster(csv.as_bytes()),
            Err(RosterImportError::Csv(_))
        ));
    }
}

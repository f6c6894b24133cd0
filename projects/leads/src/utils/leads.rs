use serde_json::Value;
use thiserror::Error;

use crate::db::lead::models::NewLead;

/// Keys Phantom Buster has used for the profile link, in preference order.
pub const PROFILE_URL_KEYS: [&str; 3] = ["profileUrl", "profile_url", "profileLink"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub username: String,
    pub profile_url: String,
}

impl LeadRecord {
    pub fn as_new_lead(&self, post_id: Option<i32>) -> NewLead<'_> {
        NewLead {
            username: &self.username,
            profile_url: &self.profile_url,
            post_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLeads {
    pub records: Vec<LeadRecord>,
    /// Entries dropped for lacking a username or profile url.
    pub skipped: usize,
}

impl ExtractedLeads {
    pub fn to_new_leads(&self, post_id: Option<i32>) -> Vec<NewLead<'_>> {
        self.records
            .iter()
            .map(|record| record.as_new_lead(post_id))
            .collect()
    }

    fn push(&mut self, record: Option<LeadRecord>) {
        match record {
            Some(record) => self.records.push(record),
            None => self.skipped += 1,
        }
    }
}

pub fn extract_leads(values: &[Value]) -> ExtractedLeads {
    let mut extracted = ExtractedLeads::default();
    for value in values {
        extracted.push(lead_from_json(value));
    }
    extracted
}

fn lead_from_json(value: &Value) -> Option<LeadRecord> {
    let username = non_empty(value.get("username")?.as_str()?)?;
    let profile_url = PROFILE_URL_KEYS
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find_map(non_empty)?;

    Some(LeadRecord {
        username,
        profile_url,
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Error)]
pub enum ParseLeadsCsvError {
    #[error("ReadHeaders: {source}")]
    ReadHeaders {
        source: csv::Error,
    },

    #[error("MissingColumn: {column}")]
    MissingColumn { column: &'static str },

    #[error("ReadRecord: {source}")]
    ReadRecord {
        source: csv::Error,
    },
}

/// Reads a Phantom Buster CSV export. Header names are matched
/// case-insensitively; every profile-url alias column is consulted.
pub fn parse_leads_csv(data: &[u8]) -> Result<ExtractedLeads, ParseLeadsCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|source| ParseLeadsCsvError::ReadHeaders { source })?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
    };

    let username_col = column("username").ok_or(ParseLeadsCsvError::MissingColumn {
        column: "username",
    })?;
    let profile_cols: Vec<usize> = PROFILE_URL_KEYS.into_iter().filter_map(|key| column(key)).collect();
    if profile_cols.is_empty() {
        return Err(ParseLeadsCsvError::MissingColumn {
            column: "profileUrl",
        });
    }

    let mut extracted = ExtractedLeads::default();
    for row in reader.records() {
        let row = row.map_err(|source| ParseLeadsCsvError::ReadRecord { source })?;
        let record = row.get(username_col).and_then(non_empty).and_then(|username| {
            profile_cols
                .iter()
                .filter_map(|col| row.get(*col))
                .find_map(non_empty)
                .map(|profile_url| LeadRecord {
                    username,
                    profile_url,
                })
        });
        extracted.push(record);
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_first_present_profile_key() {
        let values = vec![
            json!({"username": "a", "profileUrl": "https://instagram.com/a"}),
            json!({"username": "b", "profile_url": "https://instagram.com/b"}),
            json!({"username": "c", "profileUrl": "", "profileLink": "https://instagram.com/c"}),
        ];
        let extracted = extract_leads(&values);
        assert_eq!(extracted.skipped, 0);
        let urls: Vec<&str> = extracted.records.iter().map(|r| r.profile_url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://instagram.com/a", "https://instagram.com/b", "https://instagram.com/c"]
        );
    }

    #[test]
    fn skips_entries_missing_username_or_url() {
        let values = vec![
            json!({"profileUrl": "https://instagram.com/x"}),
            json!({"username": "  ", "profileUrl": "https://instagram.com/y"}),
            json!({"username": "z"}),
            json!({"username": 12, "profileUrl": "https://instagram.com/n"}),
            json!("just a string"),
            json!({"username": " kept ", "profileUrl": " https://instagram.com/kept "}),
        ];
        let extracted = extract_leads(&values);
        assert_eq!(extracted.skipped, 5);
        assert_eq!(
            extracted.records,
            vec![LeadRecord {
                username: "kept".into(),
                profile_url: "https://instagram.com/kept".into(),
            }]
        );
    }

    #[test]
    fn parses_csv_export() {
        let csv = "\u{feff}Username,fullName,ProfileUrl\n\
                   alice,Alice A,https://instagram.com/alice\n\
                   ,No Name,https://instagram.com/none\n\
                   bob,Bob B,\n\
                   carol,Carol C,https://instagram.com/carol\n";
        let extracted = parse_leads_csv(csv.as_bytes()).unwrap();
        assert_eq!(extracted.skipped, 2);
        let names: Vec<&str> = extracted.records.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, ["alice", "carol"]);
    }

    #[test]
    fn csv_falls_back_across_profile_columns() {
        let csv = "username,profileUrl,profileLink\nalice,,https://instagram.com/alice\n";
        let extracted = parse_leads_csv(csv.as_bytes()).unwrap();
        assert_eq!(extracted.records[0].profile_url, "https://instagram.com/alice");
    }

    #[test]
    fn csv_without_required_columns_is_rejected() {
        let err = parse_leads_csv(b"name,url\na,b\n").unwrap_err();
        assert!(matches!(err, ParseLeadsCsvError::MissingColumn { column: "username" }));

        let err = parse_leads_csv(b"username,fullName\na,b\n").unwrap_err();
        assert!(matches!(err, ParseLeadsCsvError::MissingColumn { column: "profileUrl" }));
    }
}

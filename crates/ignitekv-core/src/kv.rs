//! JSON to KV transformation
//!
//! Converts a flat JSON document (top-level object) into the ordered
//! key/value record list the worker template imports into Cloudflare
//! Workers KV. Values are re-serialized to JSON strings so objects,
//! arrays, and scalars all travel the same way.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the generated record list inside the project directory
pub const KV_FILE_NAME: &str = "kv.json";

/// One key/value pair destined for the remote KV namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvRecord {
    pub key: String,
    pub value: String,
}

/// Fold a JSON document into KV records, one per top-level key, in
/// document order.
///
/// The top level must be an object; anything else is a validation error
/// rather than a silent empty result.
pub fn records_from_str(text: &str, source: &str) -> Result<Vec<KvRecord>> {
    let parsed: Value = serde_json::from_str(text)?;

    let object = match parsed {
        Value::Object(map) => map,
        other => {
            return Err(Error::TopLevelNotObject {
                path: source.to_string(),
                found: json_type_name(&other).to_string(),
            })
        }
    };

    object
        .into_iter()
        .map(|(key, value)| {
            Ok(KvRecord {
                key,
                value: serde_json::to_string(&value)?,
            })
        })
        .collect()
}

/// Read `json_path`, transform it, and write the record list as a single
/// JSON array to `kv.json` inside `project_dir`.
///
/// Nothing is written unless the whole document parses; a malformed input
/// never leaves a partial output file behind. Returns the number of
/// records written.
pub fn transform_file(json_path: &Utf8Path, project_dir: &Utf8Path) -> Result<usize> {
    let text = std::fs::read_to_string(json_path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(json_path.as_str())
        } else {
            Error::Io(err)
        }
    })?;

    let records = records_from_str(&text, json_path.as_str())?;
    let serialized = serde_json::to_string(&records)?;

    let dest = project_dir.join(KV_FILE_NAME);
    std::fs::write(&dest, serialized)?;

    debug!("wrote {} KV records to {}", records.len(), dest);
    Ok(records.len())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn one_record_per_top_level_key_in_order() {
        let doc = r#"{"zebra": 1, "apple": {"x": true}, "mango": [1, 2], "nil": null}"#;
        let records = records_from_str(doc, "db.json").unwrap();

        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["zebra", "apple", "mango", "nil"]);
    }

    #[test]
    fn values_round_trip_through_json() {
        let doc = r#"{"obj": {"a": 1}, "arr": [1, "x"], "s": "hi", "n": 2.5, "b": false, "nil": null}"#;
        let original: Value = serde_json::from_str(doc).unwrap();
        let records = records_from_str(doc, "db.json").unwrap();

        assert_eq!(records.len(), 6);
        for record in &records {
            let reparsed: Value = serde_json::from_str(&record.value).unwrap();
            assert_eq!(reparsed, original[&record.key]);
        }
    }

    #[test]
    fn scalar_values_are_json_encoded_strings() {
        let records = records_from_str(r#"{"s": "hi"}"#, "db.json").unwrap();
        // The value is the JSON encoding, quotes included, not the bare string.
        assert_eq!(records[0].value, "\"hi\"");
    }

    #[test]
    fn empty_object_yields_no_records() {
        assert!(records_from_str("{}", "db.json").unwrap().is_empty());
    }

    #[test]
    fn non_object_top_level_is_an_error() {
        for doc in ["[1, 2]", "\"text\"", "42", "null", "true"] {
            let err = records_from_str(doc, "db.json").unwrap_err();
            assert!(
                matches!(err, Error::TopLevelNotObject { .. }),
                "expected TopLevelNotObject for {}",
                doc
            );
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            records_from_str("{not json", "db.json"),
            Err(Error::JsonParse(_))
        ));
    }

    #[test]
    fn transform_file_writes_kv_json() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let db = root.join("db.json");
        std::fs::write(&db, r#"{"posts": [{"id": 1}], "title": "demo"}"#).unwrap();

        let count = transform_file(&db, &root).unwrap();
        assert_eq!(count, 2);

        let written = std::fs::read_to_string(root.join(KV_FILE_NAME)).unwrap();
        let records: Vec<KvRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(records[0].key, "posts");
        assert_eq!(records[1].value, "\"demo\"");
    }

    #[test]
    fn transform_file_missing_input() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let err = transform_file(&root.join("absent.json"), &root).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn unreadable_input_is_not_reported_as_missing() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        // Invalid UTF-8: the file exists but cannot be read as text.
        let db = root.join("db.json");
        std::fs::write(&db, [0xff, 0xfe, 0xfd]).unwrap();

        let err = transform_file(&db, &root).unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {:?}", err);
    }

    #[test]
    fn malformed_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let db = root.join("db.json");
        std::fs::write(&db, "{broken").unwrap();

        assert!(transform_file(&db, &root).is_err());
        assert!(!root.join(KV_FILE_NAME).exists());
    }
}

use serde::Deserialize;
use serde_json::Value;

/// A stored document. The store prefixes its own metadata with `$`.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub data: Value,
}

/// Result of a filtered list query.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    pub total: i64,
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_parses_store_metadata() {
        let doc: Document = serde_json::from_value(json!({
            "$id": "abc123",
            "$collectionId": "competitions",
            "code": "PL",
            "name": "Premier League"
        }))
        .unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.data["code"], "PL");
    }

    #[test]
    fn list_tolerates_missing_documents() {
        let list: DocumentList = serde_json::from_value(json!({ "total": 0 })).unwrap();
        assert_eq!(list.total, 0);
        assert!(list.documents.is_empty());
    }
}

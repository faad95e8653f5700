use serde::{Deserialize, Serialize};

use crate::encoder::{self, DecodeError, DecodedPayload};

/// Classification of a file derived from its MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Audio,
    Binary,
    Document,
    Image,
    Video,
}

impl FileType {
    /// Derive a file type classification from a MIME type string.
    pub fn from_mime(mime_type: &str) -> Self {
        let essence = mime_type.split(';').next().unwrap_or("").trim();
        let (primary, sub) = essence.split_once('/').unwrap_or((essence, ""));
        match primary {
            "audio" => FileType::Audio,
            "image" => FileType::Image,
            "video" => FileType::Video,
            "text" => FileType::Document,
            "application" => match sub {
                "pdf"
                | "msword"
                | "rtf"
                | "vnd.openxmlformats-officedocument.wordprocessingml.document"
                | "vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                | "vnd.openxmlformats-officedocument.presentationml.presentation"
                | "vnd.ms-excel"
                | "vnd.ms-powerpoint" => FileType::Document,
                _ => FileType::Binary,
            },
            _ => FileType::Binary,
        }
    }
}

/// One uploaded attachment. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Informational; never checked against `data_url`.
    pub size: u64,
    /// Milliseconds since the Unix epoch, taken from the source file
    pub last_modified: i64,
    pub data_url: String,
}

impl StoredFile {
    pub fn file_type(&self) -> FileType {
        FileType::from_mime(&self.mime_type)
    }

    /// Decode the stored payload back into the original bytes.
    pub fn content(&self) -> Result<DecodedPayload, DecodeError> {
        encoder::decode(&self.data_url)
    }
}

/// A subject as persisted: files are referenced by id, in upload order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

/// A subject with its file references resolved, as the dashboard displays it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectWithFiles {
    pub id: u64,
    pub name: String,
    pub files: Vec<StoredFile>,
}

/// The dashboard's quick stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub subjects: usize,
    pub files: usize,
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub files: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_mime() {
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Document);
        assert_eq!(FileType::from_mime("image/png"), FileType::Image);
        assert_eq!(FileType::from_mime("text/plain;charset=utf-8"), FileType::Document);
        assert_eq!(FileType::from_mime("application/zip"), FileType::Binary);
        assert_eq!(FileType::from_mime(""), FileType::Binary);
    }

    #[test]
    fn test_stored_file_json_layout() {
        let file = StoredFile {
            id: "file-1".to_string(),
            name: "notes.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 3,
            last_modified: 1_700_000_000_000,
            data_url: "data:application/pdf;base64,YWJj".to_string(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "application/pdf");
        assert_eq!(json["lastModified"], 1_700_000_000_000i64);
        assert_eq!(json["dataUrl"], "data:application/pdf;base64,YWJj");
        assert_eq!(file.content().unwrap().data.as_ref(), b"abc");
    }

    #[test]
    fn test_stored_subject_reads_browser_json() {
        let subject: StoredSubject =
            serde_json::from_str(r#"{"id":1712345678901,"name":"Physics","fileIds":["a","b"]}"#)
                .unwrap();
        assert_eq!(subject.id, 1_712_345_678_901);
        assert_eq!(subject.file_ids, vec!["a", "b"]);
    }
}

//! Topic source selection by file extension

use std::path::Path;
use std::sync::Arc;
use topic_poster_domain::{TopicRepo, TopicSourceError};

use crate::topics_csv::CsvTopicRepo;
use crate::topics_xlsx::XlsxTopicRepo;

/// Open the topic file at `path`: `.xlsx` workbooks by their first sheet,
/// anything else as CSV
pub fn open_topic_repo(path: impl AsRef<Path>) -> Result<Arc<dyn TopicRepo>, TopicSourceError> {
    let path = path.as_ref();
    let is_workbook = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    if is_workbook {
        Ok(Arc::new(XlsxTopicRepo::new(path)?))
    } else {
        Ok(Arc::new(CsvTopicRepo::new(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extension_selects_reader() {
        let dir = TempDir::new().unwrap();

        let csv_path = dir.path().join("topics.csv");
        std::fs::write(&csv_path, "topic\nEntropy\n").unwrap();

        let xlsx_path = dir.path().join("General_facts.XLSX");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "topic").unwrap();
        sheet.write_string(1, 0, "Entropy").unwrap();
        sheet.write_string(2, 0, "Variance").unwrap();
        workbook.save(&xlsx_path).unwrap();

        let from_csv = open_topic_repo(&csv_path).unwrap().load().await.unwrap();
        let from_xlsx = open_topic_repo(&xlsx_path).unwrap().load().await.unwrap();

        assert_eq!(from_csv.len(), 1);
        assert_eq!(from_xlsx.len(), 2);
        assert_eq!(from_xlsx.get(1).unwrap().text, "Variance");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(open_topic_repo("/nonexistent/topics.xlsx").is_err());
    }
}

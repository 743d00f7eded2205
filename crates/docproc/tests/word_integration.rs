//! Word-processing documents (DOCX) through the processor.

use docproc::text::DetectedLanguage;
use docproc::{ExtractedData, ProcessingStats};

mod helpers;
use helpers::{core_properties, doc, docx, paragraph, processor};

const TABLE: &str = r#"<w:tbl>
  <w:tr><w:tc><w:p><w:r><w:t>item</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>cost</w:t></w:r></w:p></w:tc></w:tr>
  <w:tr><w:tc><w:p><w:r><w:t>rent</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>900</w:t></w:r></w:p></w:tc></w:tr>
  <w:tr><w:tc><w:p><w:r><w:t>food</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>300</w:t></w:r></w:p></w:tc></w:tr>
</w:tbl>"#;

#[test]
fn test_docx_text_tables_and_properties() {
    let body = [
        paragraph("The budget for the year is ready and you are not going to like it."),
        TABLE.to_string(),
        paragraph("But the team will review it for the board."),
    ]
    .concat();
    let bytes = docx(&body, Some(&core_properties("Budget", "M. Rossi")), None);

    let result = processor().process(doc("budget.docx", bytes)).unwrap();
    assert!(result.is_success(), "errors: {:?}", result.errors());
    assert_eq!(result.processing_strategy, "WORD_PROCESSING_STRATEGY");
    assert_eq!(
        result.message,
        "Successfully processed DOCX with 2 paragraphs and 1 tables"
    );

    let metadata = result.metadata.as_ref().unwrap();
    assert_eq!(metadata.title.as_deref(), Some("Budget"));
    assert_eq!(metadata.author.as_deref(), Some("M. Rossi"));
    assert!(metadata.creation_date.is_some());

    let Some(ExtractedData::Document(content)) = &result.extracted_data else {
        panic!("expected document content");
    };
    assert_eq!(content.len(), 1);
    assert_eq!(content[0].paragraphs.len(), 2);
    assert_eq!(content[0].tables[0].row_count, 3);
    assert_eq!(content[0].tables[0].rows[1], vec!["rent", "900"]);

    let Some(ProcessingStats::Word(stats)) = &result.processing_stats else {
        panic!("expected word statistics");
    };
    assert_eq!(stats.structure.tables, Some(1));
    assert_eq!(stats.text.detected_language, Some(DetectedLanguage::English));
    let tables = stats.table_statistics.as_ref().unwrap();
    assert_eq!(tables.total_tables, 1);
    assert_eq!(tables.total_rows, Some(3));
    assert_eq!(tables.max_columns, Some(2));
}

#[test]
fn test_docx_without_tables_reports_zero_total() {
    let bytes = docx(&paragraph("Solo una nota para el equipo de la casa."), None, None);

    let result = processor().process(doc("nota.docx", bytes)).unwrap();
    assert!(result.is_success());

    let Some(ProcessingStats::Word(stats)) = &result.processing_stats else {
        panic!("expected word statistics");
    };
    assert_eq!(stats.text.detected_language, Some(DetectedLanguage::Spanish));
    let json = serde_json::to_value(stats.table_statistics.as_ref().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "totalTables": 0 }));
}

#[test]
fn test_corrupt_docx_is_a_failed_result() {
    let result = processor()
        .process(doc("broken.docx", b"PK\x03\x04 not really".to_vec()))
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.message, "Failed to process DOCX document");
}

#[test]
fn test_word_strategy_rejects_other_types_by_name() {
    let err = processor()
        .process_with_strategy(doc("budget.pdf", b"%PDF-1.4".to_vec()), "WORD_PROCESSING_STRATEGY")
        .unwrap_err();
    assert!(err.to_string().contains("WORD_PROCESSING_STRATEGY"));
    assert!(err.to_string().contains("budget.pdf"));
}

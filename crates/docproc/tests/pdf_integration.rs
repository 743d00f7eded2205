//! PDF processing with lopdf-built fixtures.

use docproc::pdf::PAGE_BREAK;
use docproc::{ErrorCode, ProcessingStats};
use lopdf::{Object, dictionary};

mod helpers;
use helpers::{doc, encrypted_pdf, pdf, processor};

#[test]
fn test_pdf_text_pages_and_metadata() {
    let info = dictionary! {
        "Title" => Object::string_literal("Quarterly Notes"),
        "Author" => Object::string_literal("J. Okafor"),
        "CreationDate" => Object::string_literal("D:20240115093000Z"),
    };
    let bytes = pdf(
        &["The report covers the first quarter", "Numbers are stable and the outlook is fine"],
        Some(info),
    );

    let result = processor().process(doc("notes.pdf", bytes)).unwrap();
    assert!(result.is_success(), "errors: {:?}", result.errors());
    assert_eq!(result.processing_strategy, "PDF_PROCESSING_STRATEGY");
    assert_eq!(result.message, "PDF processed successfully with 2 pages");

    let text = result.extracted_text.as_deref().unwrap();
    assert!(text.contains("first quarter"));
    assert!(text.contains(PAGE_BREAK));

    let metadata = result.metadata.as_ref().unwrap();
    assert_eq!(metadata.page_count, Some(2));
    assert_eq!(metadata.title.as_deref(), Some("Quarterly Notes"));
    assert_eq!(metadata.author.as_deref(), Some("J. Okafor"));
    assert!(metadata.creation_date.is_some());
    assert_eq!(metadata.is_encrypted, Some(false));

    let Some(ProcessingStats::Pdf(stats)) = &result.processing_stats else {
        panic!("expected PDF statistics");
    };
    assert!(stats.text_extracted);
    assert_eq!(stats.total_pages, 2);
    assert!(stats.average_words_per_page > 0.0);
    assert!(stats.text.word_count > 10);
}

#[test]
fn test_password_protected_pdf_is_a_failed_result() {
    let result = processor().process(doc("locked.pdf", encrypted_pdf())).unwrap();

    assert!(!result.is_success());
    assert!(result.message.contains("password"));
    assert_eq!(result.errors(), ["Document protected with password"]);
    assert_eq!(result.error_code, Some(ErrorCode::ProcessingError));
    assert_eq!(result.metadata.as_ref().unwrap().is_encrypted, Some(true));
}

#[test]
fn test_unreadable_pdf_is_a_failed_result() {
    let result = processor()
        .process(doc("junk.pdf", b"%PDF-1.4\nthis is not a pdf body".to_vec()))
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.message, "Could not read the PDF document");
    assert!(result.processing_time_ms.is_some());
}

#[test]
fn test_encrypt_token_in_page_text_is_plain_pdf() {
    let bytes = pdf(&["Rotate the /Encrypt key every month"], None);
    let result = processor().process(doc("policy.pdf", bytes)).unwrap();

    assert!(result.is_success(), "errors: {:?}", result.errors());
    assert_eq!(result.metadata.as_ref().unwrap().is_encrypted, Some(false));
    assert!(result.extracted_text.as_deref().unwrap().contains("Encrypt key"));
}

#[test]
fn test_unreadable_pdf_mentioning_encrypt_is_not_password_protected() {
    let result = processor()
        .process(doc("junk.pdf", b"%PDF-1.4\n/Encrypt 5 0 R but no body".to_vec()))
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.message, "Could not read the PDF document");
}

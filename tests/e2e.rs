//! End-to-end integration tests for contactscribe.
//!
//! Every test writes its own fixture into a fresh [`TempDir`] and drives the
//! public API exactly as the CLI does. Produced PDFs are parsed back with
//! `lopdf` to check the page tree; text assertions run on uncompressed
//! output where content streams are plain bytes.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use chrono::NaiveDate;
use contactscribe::{
    default_output_path, export, export_to_file, load_contacts, translate, ExportConfig,
    InputFormat, Language, ScribeError,
};
use std::path::PathBuf;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn config(language: Language) -> ExportConfig {
    ExportConfig::builder()
        .language(language)
        .export_date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
        .compress(false)
        .build()
        .expect("valid config")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// `text` as it appears in an uncompressed content stream: WinAnsi bytes,
/// parentheses either raw or backslash-escaped.
fn has_text(pdf: &[u8], text: &str) -> bool {
    let raw: Vec<u8> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    let mut escaped = Vec::with_capacity(raw.len());
    for &b in &raw {
        if b == b'(' || b == b')' {
            escaped.push(b'\\');
        }
        escaped.push(b);
    }
    contains(pdf, &raw) || contains(pdf, &escaped)
}

fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf)
        .expect("output must be a readable PDF")
        .get_pages()
        .len()
}

const SPANISH_CSV: &str = "Nombre,Apellidos,Teléfono (Trabajo)\nAna,Gómez,555-1234\n";

const TWO_PHONES_VCF: &str = "\
BEGIN:VCARD\r
VERSION:3.0\r
N:Smith;John;;;\r
FN:John Smith\r
TEL;TYPE=WORK:555-0100\r
TEL;TYPE=CELL:555-0199\r
END:VCARD\r
";

// ── CSV ──────────────────────────────────────────────────────────────────────

#[test]
fn test_csv_single_contact_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "contactos.csv", SPANISH_CSV);

    let output = export(&input, &config(Language::En)).expect("export should succeed");

    assert_eq!(output.contacts.len(), 1);
    let record = &output.contacts.records()[0];
    assert_eq!(record.get("Nombre"), Some("Ana"));
    assert_eq!(record.get("Apellidos"), Some("Gómez"));
    assert_eq!(record.get("Teléfono (Trabajo)"), Some("555-1234"));
    assert!(output.skipped.is_empty());

    assert_eq!(output.stats.pages, 1);
    assert_eq!(page_count(&output.pdf), 1);
    assert!(has_text(&output.pdf, "Ana Gómez"));
    assert!(has_text(&output.pdf, "Phone (Work): 555-1234"));
    assert!(has_text(&output.pdf, "Export date: 17/05/2024"));
    assert!(contains(&output.pdf, b"Helvetica-Bold"));
}

#[test]
fn test_csv_spanish_labels() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "contactos.csv", SPANISH_CSV);

    let output = export(&input, &config(Language::Es)).unwrap();
    assert!(has_text(&output.pdf, "Teléfono (Trabajo): 555-1234"));
    assert!(has_text(&output.pdf, "Fecha de exportación: 17/05/2024"));
}

#[test]
fn test_csv_rows_are_sorted_by_last_then_first_name() {
    let dir = TempDir::new().unwrap();
    let input = fixture(
        &dir,
        "people.csv",
        "First Name,Last Name,Email\n\
         Zoe,Adams,z@example.com\n\
         Bob,Brown,b@example.com\n\
         Amy,Brown,a@example.com\n\
         Carl,Adams,c@example.com\n",
    );

    let loaded = load_contacts(&input, &config(Language::En)).unwrap();
    assert_eq!(loaded.format, InputFormat::Csv);
    let names: Vec<String> = loaded.contacts.iter().map(|r| r.full_name()).collect();
    assert_eq!(names, vec!["Carl Adams", "Zoe Adams", "Amy Brown", "Bob Brown"]);
}

#[test]
fn test_empty_fields_are_not_printed() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "c.csv", "Nombre,Apellidos,Puesto,Notas\nAna,Gómez,,hola\n");

    let output = export(&input, &config(Language::En)).unwrap();
    assert!(!has_text(&output.pdf, "Puesto"));
    assert!(!has_text(&output.pdf, "Title:"));
    assert!(has_text(&output.pdf, "Notes: hola"));
}

// ── vCard ────────────────────────────────────────────────────────────────────

#[test]
fn test_vcard_typed_phones_become_separate_fields() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "book.vcf", TWO_PHONES_VCF);

    let output = export(&input, &config(Language::En)).unwrap();
    let record = &output.contacts.records()[0];
    assert_eq!(record.first_name(), "John");
    assert_eq!(record.last_name(), "Smith");
    assert_eq!(record.get("Phone (WORK)"), Some("555-0100"));
    assert_eq!(record.get("Phone (CELL)"), Some("555-0199"));

    assert!(has_text(&output.pdf, "Phone (work): 555-0100"));
    assert!(has_text(&output.pdf, "Phone (cell): 555-0199"));
}

#[test]
fn test_vcard_malformed_component_is_skipped() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{TWO_PHONES_VCF}\
         BEGIN:VCARD\r\nVERSION:3.0\r\nthis line has no colon\r\nEND:VCARD\r\n\
         BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;Jane;;;\r\nEND:VCARD\r\n"
    );
    let input = fixture(&dir, "book.vcf", &content);

    let output = export(&input, &config(Language::En)).unwrap();
    assert_eq!(output.contacts.len(), 2);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].index, 2);
    assert_eq!(output.stats.skipped_records, 1);

    let names: Vec<String> = output.contacts.iter().map(|r| r.full_name()).collect();
    assert_eq!(names, vec!["Jane Doe", "John Smith"]);
}

#[test]
fn test_vcard_strict_mode_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = fixture(
        &dir,
        "book.vcf",
        "BEGIN:VCARD\nVERSION:3.0\nFN:Only Begin\n",
    );
    let target = dir.path().join("book.pdf");

    let strict = ExportConfig::builder()
        .skip_invalid_records(false)
        .build()
        .unwrap();
    let err = export_to_file(&input, &target, &strict).unwrap_err();
    assert!(matches!(err, ScribeError::InputFormat { .. }));
    assert!(!target.exists());
}

#[test]
fn test_vcard_21_quoted_printable_names() {
    let dir = TempDir::new().unwrap();
    let input = fixture(
        &dir,
        "phone.vcf",
        "BEGIN:VCARD\r\n\
         VERSION:2.1\r\n\
         N;CHARSET=UTF-8;ENCODING=QUOTED-PRINTABLE:G=C3=B3mez;Ana;;;\r\n\
         FN;CHARSET=UTF-8;ENCODING=QUOTED-PRINTABLE:Ana G=C3=B3mez\r\n\
         NOTE;CHARSET=UTF-8;ENCODING=QUOTED-PRINTABLE:Vive en M=C3=A1laga y trabaja =\r\n\
         en el puerto\r\n\
         TEL;CELL;PREF:600111222\r\n\
         END:VCARD\r\n",
    );

    let output = export(&input, &config(Language::Es)).unwrap();
    assert!(output.skipped.is_empty(), "{:?}", output.skipped);
    let record = &output.contacts.records()[0];
    assert_eq!(record.last_name(), "Gómez");
    assert_eq!(record.get("Note"), Some("Vive en Málaga y trabaja en el puerto"));

    assert!(has_text(&output.pdf, "Ana Gómez"));
    assert!(has_text(&output.pdf, "Nota: Vive en Málaga y trabaja en el puerto"));
}

#[test]
fn test_vcard_without_components_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "empty.vcf", "\n\n");
    let err = export(&input, &config(Language::En)).unwrap_err();
    assert!(matches!(err, ScribeError::InputFormat { .. }));
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "contacts.xlsx", "whatever");

    let err = export(&input, &config(Language::En)).unwrap_err();
    assert!(matches!(err, ScribeError::UnsupportedFormat { .. }));
    assert_eq!(err.to_string(), "Unsupported file format.");
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = export(dir.path().join("nope.csv"), &config(Language::En)).unwrap_err();
    assert!(matches!(err, ScribeError::FileNotFound { .. }));
}

#[test]
fn test_unsupported_language_code() {
    let err = "fr".parse::<Language>().unwrap_err();
    assert!(matches!(err, ScribeError::UnsupportedLanguage { .. }));
    assert_eq!("ES-es".parse::<Language>().unwrap(), Language::Es);
}

#[test]
fn test_csv_unclosed_quote_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = fixture(
        &dir,
        "contactos.csv",
        "Nombre,Apellidos\nAna,\"Gómez\nBob,Ruiz\nCarl,Diaz\n",
    );
    let target = default_output_path(&input);

    let err = export_to_file(&input, &target, &config(Language::En)).unwrap_err();
    assert!(matches!(err, ScribeError::InputFormat { .. }));
    assert!(!target.exists());
}

#[test]
fn test_csv_row_wider_than_header_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = fixture(
        &dir,
        "contactos.csv",
        "Nombre,Apellidos\nBob,Ruiz\nAna,Gómez,555-1234,secret\n",
    );

    let err = load_contacts(&input, &config(Language::En)).unwrap_err();
    assert!(matches!(err, ScribeError::InputFormat { .. }));
    assert!(err.to_string().contains("line 3"), "got: {err}");
}

#[test]
fn test_invalid_utf8_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.csv");
    std::fs::write(&input, [b'N', b'o', b'm', 0xFF, b'\n']).unwrap();
    let target = default_output_path(&input);

    let err = export_to_file(&input, &target, &config(Language::En)).unwrap_err();
    assert!(matches!(err, ScribeError::InputFormat { .. }));
    assert!(!target.exists());
}

// ── Output ───────────────────────────────────────────────────────────────────

#[test]
fn test_export_to_default_path() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir, "contactos.csv", SPANISH_CSV);
    let target = default_output_path(&input);
    assert_eq!(target, dir.path().join("contactos.pdf"));

    let stats = export_to_file(&input, &target, &ExportConfig::default()).unwrap();
    assert_eq!(stats.contacts, 1);

    let bytes = std::fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(page_count(&bytes), stats.pages);
    assert_eq!(stats.pdf_bytes, bytes.len());
}

#[test]
fn test_many_contacts_span_multiple_pages() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::from("First Name,Last Name,Email,Phone,Note\n");
    for i in 0..120 {
        csv.push_str(&format!(
            "Person{i:03},Family{i:03},p{i}@example.com,555-{i:04},\"Some longer note for contact {i}\"\n"
        ));
    }
    let input = fixture(&dir, "big.csv", &csv);

    let output = export(&input, &config(Language::En)).unwrap();
    assert_eq!(output.contacts.len(), 120);
    assert!(output.stats.pages > 1);
    assert_eq!(page_count(&output.pdf), output.stats.pages);
    for i in [0, 59, 119] {
        let line = format!("p{i}@example.com");
        assert!(has_text(&output.pdf, &line), "missing {line}");
    }
}

#[test]
fn test_compressed_output_is_smaller_and_valid() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::from("Nombre,Apellidos,Notas\n");
    for i in 0..40 {
        csv.push_str(&format!("N{i},A{i},nota {i}\n"));
    }
    let input = fixture(&dir, "c.csv", &csv);

    let plain = export(&input, &config(Language::En)).unwrap();
    let packed_config = ExportConfig::builder().compress(true).build().unwrap();
    let packed = export(&input, &packed_config).unwrap();

    assert!(packed.pdf.len() < plain.pdf.len());
    assert_eq!(page_count(&packed.pdf), plain.stats.pages);
}

// ── Translator ───────────────────────────────────────────────────────────────

#[test]
fn test_translate_compound_label() {
    assert_eq!(translate("Phone (work, mobile)", "es"), "Teléfono (Trabajo, Móvil)");
    assert_eq!(translate("Email", "en"), "Email");
}

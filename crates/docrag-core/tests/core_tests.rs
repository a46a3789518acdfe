use std::fs;
use tempfile::TempDir;

use docrag_core::error::Error;
use docrag_core::loader::DocumentLoader;
use docrag_core::splitter::TextSplitter;
use docrag_core::types::{matches_filter, ContentHashIds, IdStrategy, Metadata, MetadataPolicy, PositionalIds};

fn meta(pairs: &[(&str, &str)]) -> Metadata { pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }

#[test]
fn split_empty_text_yields_nothing() {
    let splitter = TextSplitter::default();
    assert!(splitter.split("").is_empty());
    assert!(splitter.split("  \n\n  ").is_empty());
    assert!(splitter.split_many::<&str>(&[]).is_empty());
}

#[test]
fn split_short_text_is_one_trimmed_chunk() {
    let splitter = TextSplitter::new(100, 20).unwrap();
    assert_eq!(splitter.split("  hello world \n"), vec!["hello world"]);
}

#[test]
fn split_japanese_paragraphs_respects_chunk_size() {
    let splitter = TextSplitter::new(100, 20).unwrap();
    let text = "\n    これはテスト用のテキストです。\n    このテキストは複数の段落に分かれています。\n    \n    2番目の段落です。\n    ここには別の内容が書かれています。\n    \n    3番目の段落です。\n    最後の段落になります。\n    ";
    let chunks = splitter.split(text);
    assert!(!chunks.is_empty());
    for c in &chunks {
        assert!(c.chars().count() <= 100);
        assert!(text.contains(c.as_str()));
    }
}

#[test]
fn split_repeated_sentence_uses_sentence_terminator() {
    let splitter = TextSplitter::new(50, 10).unwrap();
    let text = "これはテスト用のテキストです。".repeat(10);
    let chunks = splitter.split(&text);
    assert!(chunks.len() >= 2);
    for c in &chunks {
        assert!(c.chars().count() <= 50, "chunk too long: {c}");
        assert!(text.contains(c.as_str()));
    }
    // separators stay at the start of the following piece
    assert!(chunks[1].starts_with('。'));
}

#[test]
fn split_carries_overlap_between_words() {
    let splitter = TextSplitter::new(10, 4).unwrap();
    let chunks = splitter.split("aaa bbb ccc ddd");
    assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
}

#[test]
fn split_many_flattens_in_order() {
    let splitter = TextSplitter::new(100, 20).unwrap();
    let texts = ["1つ目のテキストです。\n複数行に分かれています。", "2つ目のテキストです。\nこれも複数行です。"];
    let chunks = splitter.split_many(&texts);
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].starts_with("1つ目"));
    assert!(chunks[1].starts_with("2つ目"));
}

#[test]
fn splitter_rejects_bad_config() {
    assert!(matches!(TextSplitter::new(0, 0), Err(Error::InvalidConfig(_))));
    assert!(matches!(TextSplitter::new(10, 11), Err(Error::InvalidConfig(_))));
}

#[test]
fn load_markdown_and_reject_other_formats() {
    let tmp = TempDir::new().unwrap();
    let md = tmp.path().join("note.MD");
    fs::write(&md, "# Test\nThis is a test document.").unwrap();
    let txt = tmp.path().join("plain.txt");
    fs::write(&txt, "ignored").unwrap();

    let loader = DocumentLoader::new();
    assert_eq!(loader.load_document(&md).unwrap(), "# Test\nThis is a test document.");
    match loader.load_document(&txt) {
        Err(Error::FormatUnsupported { extension, .. }) => assert_eq!(extension, "txt"),
        other => panic!("expected FormatUnsupported, got {other:?}"),
    }
    assert!(matches!(loader.load_document(&tmp.path().join("missing.md")), Err(Error::NotFound(_))));
}

#[test]
fn load_documents_reports_skipped_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("b.md"), "bravo").unwrap();
    fs::write(dir.join("nested").join("a.markdown"), "alpha").unwrap();
    fs::write(dir.join("c.txt"), "charlie").unwrap();
    fs::write(dir.join("d.docx"), "delta").unwrap();

    let report = DocumentLoader::new().load_documents(dir).expect("load");
    assert_eq!(report.texts(), vec!["bravo".to_string(), "alpha".to_string()]);
    let skipped: Vec<String> = report.skipped.iter().map(|s| s.path.file_name().unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(skipped, vec!["c.txt", "d.docx"]);
}

#[test]
fn malformed_pdf_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.md"), "alpha").unwrap();
    fs::write(dir.join("broken.pdf"), b"%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 9 0 R >>\ntrailer <<>>\n%%EOF").unwrap();

    let report = DocumentLoader::new().load_documents(dir).expect("load");
    assert_eq!(report.texts(), vec!["alpha".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("broken.pdf"));
}

#[test]
fn load_documents_missing_dir_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = DocumentLoader::new().load_documents(&tmp.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn metadata_policy_replace_and_merge() {
    let empty = Metadata::new();
    let given = meta(&[("source", "guide.md")]);

    assert_eq!(MetadataPolicy::Replace.resolve(Some(&empty), 1), meta(&[("source", "document_1"), ("type", "markdown")]));
    assert_eq!(MetadataPolicy::Replace.resolve(None, 0), meta(&[("source", "document_0"), ("type", "markdown")]));
    assert_eq!(MetadataPolicy::Replace.resolve(Some(&given), 0), given);
    assert_eq!(MetadataPolicy::Merge.resolve(Some(&given), 3), meta(&[("source", "guide.md"), ("type", "markdown")]));
}

#[test]
fn id_strategies() {
    let m = meta(&[("source", "a")]);
    assert_eq!(PositionalIds.chunk_id(2, "text", &m), "doc_2");

    let a = ContentHashIds.chunk_id(0, "text", &m);
    let b = ContentHashIds.chunk_id(9, "text", &m);
    let c = ContentHashIds.chunk_id(0, "other", &m);
    assert_eq!(a, b, "position does not affect content ids");
    assert_ne!(a, c);
    assert!(a.starts_with("chunk_"));
}

#[test]
fn filter_matching_is_and_of_equalities() {
    let m = meta(&[("source", "a"), ("type", "markdown")]);
    assert!(matches_filter(&m, &Metadata::new()));
    assert!(matches_filter(&m, &meta(&[("type", "markdown")])));
    assert!(!matches_filter(&m, &meta(&[("type", "markdown"), ("source", "b")])));
    assert!(!matches_filter(&m, &meta(&[("lang", "en")])));
}

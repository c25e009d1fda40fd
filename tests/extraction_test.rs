//! Extraction heuristics over realistic model replies and web text.

use execfind::extract::{extract_name, is_valid_name, parse_lookup_response};
use execfind::sources::Confidence;

#[test]
fn test_extracts_from_prose_variants() {
    let cases = [
        ("Acme's CEO: Jordan Blake has led since 2020", "Jordan Blake"),
        ("The firm was founded by Lena Hoff in 2011", "Lena Hoff"),
        ("Marcus Webb serves as the President of the board", "Marcus Webb"),
        ("John Smith, CEO of Acme", "John Smith"),
        ("Reach out to Ms. Dana Kirby for press enquiries", "Dana Kirby"),
        (r#"The spokesperson "Felix Arnold" declined to comment"#, "Felix Arnold"),
    ];
    for (text, expected) in cases {
        assert_eq!(extract_name(text).as_deref(), Some(expected), "text: {text}");
    }
}

#[test]
fn test_rejects_org_like_candidates() {
    for text in [
        "Acme Corporation announced record earnings",
        "Customer Team responded quickly",
        "No Information Available at this time",
        "",
    ] {
        assert_eq!(extract_name(text), None, "text: {text}");
    }
}

#[test]
fn test_markdown_wrapped_json_reply() {
    let reply = "Sure! Here's what I found:\n\n```json\n{\n  \"ceo_name\": \"Ingrid Solberg\",\n  \"ceo_title\": \"Chief Executive Officer\",\n  \"ceo_email\": \"\",\n  \"ceo_linkedin\": \"\",\n  \"confidence\": \"high\"\n}\n```\nLet me know if you need more.";
    let record = parse_lookup_response(reply, "OpenAI", None).unwrap();
    assert_eq!(record.name, "Ingrid Solberg");
    assert_eq!(record.title, "Chief Executive Officer");
    assert_eq!(record.confidence, Confidence::High);
}

#[test]
fn test_refusal_with_name_in_context_still_yields_result() {
    let context = "Company: Acme\n\nSearch results: Acme grows under CEO Tomas Reyes | annual report";
    let record = parse_lookup_response(
        "I'm sorry, I can't determine that from my training data.",
        "Gemini",
        Some(context),
    )
    .unwrap();
    assert_eq!(record.name, "Tomas Reyes");
    assert_eq!(record.source, "Gemini - context extraction");
    assert_eq!(record.title, "Found in content");
}

#[test]
fn test_failure_messages_are_not_valid_names() {
    for value in ["Not found", "unknown", "Error fetching page", "N/A", "Bob"] {
        assert!(!is_valid_name(value), "value: {value}");
    }
    assert!(is_valid_name("Tomas Reyes"));
}

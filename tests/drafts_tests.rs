//! Draft discovery and registry injection

use analyticstxt::{default_version, list_drafts, Draft, DraftRegistry, Engine, Error, Options};
use serde_json::json;

#[test]
fn test_list_drafts() {
    let drafts = list_drafts().unwrap();
    let ids: Vec<_> = drafts.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["2021-04-13", "2021-06-21"]);

    let defaults: Vec<_> = drafts.iter().filter(|d| d.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, default_version().unwrap());
}

#[test]
fn test_default_resolution() {
    let registry = DraftRegistry::bundled().unwrap();
    let implicit = registry.resolve(None).unwrap();
    let explicit = registry.resolve(Some(default_version().unwrap())).unwrap();
    assert!(std::ptr::eq(implicit, explicit));
    assert_eq!(implicit.id(), "2021-06-21");
}

#[test]
fn test_canonical_field_order() {
    let registry = DraftRegistry::bundled().unwrap();
    let order = registry.resolve(None).unwrap().field_order();
    assert_eq!(order.first().map(String::as_str), Some("Author"));
    assert_eq!(order.last().map(String::as_str), Some("Deploys"));
    assert_eq!(order.len(), 12);
}

#[test]
fn test_unknown_draft_suggestion() {
    let registry = DraftRegistry::bundled().unwrap();
    let err = registry.resolve(Some("2021-04")).unwrap_err();
    match &err {
        Error::UnknownDraft { suggestion, known, .. } => {
            assert_eq!(suggestion.as_deref(), Some("2021-04-13"));
            assert_eq!(known.len(), 2);
        }
        other => panic!("Expected UnknownDraft, got {:?}", other),
    }
    assert!(err.to_string().contains("did you mean `2021-04-13`"));
}

#[test]
fn test_synthetic_registry() {
    let draft = Draft::from_json(
        "test-1",
        json!({
            "type": "object",
            "required": ["Name"],
            "additionalProperties": false,
            "properties": {
                "Name": { "type": "array", "minItems": 1, "items": { "type": "string" } },
                "Color": {
                    "type": "array",
                    "items": { "type": "string", "enum": ["red", "green"] }
                }
            }
        }),
    )
    .unwrap();
    let registry = DraftRegistry::new(vec![draft], None).unwrap();
    let engine = Engine::new(&registry);

    assert_eq!(engine.default_version(), "test-1");
    assert!(engine.validate("Color: red\nName: x\n", &Options::new()).is_ok());
    assert!(engine.validate("Name: x\nColor: blue\n", &Options::new()).is_err());
    assert!(engine.validate("Name: x\nColor: blue\n", &Options::new().lax(true)).is_ok());

    let text = engine
        .serialize(&json!({ "Color": ["green"], "Name": ["x"] }), &Options::new())
        .unwrap();
    assert_eq!(text, "Name: x\nColor: green");
}

#[test]
fn test_concurrent_first_use() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| DraftRegistry::bundled().map(|r| r as *const DraftRegistry as usize)))
        .collect();
    let addresses: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
}

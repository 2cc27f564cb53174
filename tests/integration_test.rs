use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use safe_input::{
    default_validation_map, BuiltinType, ExtractFields, FieldSetProcessor, FieldSource,
    FieldValue, TypeSpec, Validated, ValidationMap, Validator, Value,
};

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// A form post carrying single and repeated fields.
struct FormPost {
    fields: Vec<(String, String)>,
}

impl ExtractFields for FormPost {
    fn extract_fields(&self) -> FieldSource {
        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in &self.fields {
            grouped.entry(k.clone()).or_default().push(v.clone());
        }
        let mut source = FieldSource::new();
        for (k, mut values) in grouped {
            if values.len() == 1 {
                source.add(k, values.remove(0));
            } else {
                source.add_multiple(k, values);
            }
        }
        source
    }
}

#[test]
fn query_fields_with_default_inference() {
    let source: FieldSource = [
        ("int", "1"),
        ("float", "2.1"),
        ("varname", "my_var_name"),
        ("html", "This is a <b>html</b>."),
        ("text", "This is plain text."),
        ("boolean", "true"),
        ("url", "http://www.usc.edu"),
        ("email", "ttrojan@usc.edu"),
        ("five_six", "This is five and six."),
        ("seven-eight", "This is seven and eight."),
    ]
    .into_iter()
    .collect();

    let inferred = default_validation_map(&source);
    let expected = [
        ("int", BuiltinType::Integer),
        ("float", BuiltinType::Float),
        ("varname", BuiltinType::Varname),
        ("html", BuiltinType::Html),
        ("text", BuiltinType::Text),
        ("boolean", BuiltinType::Boolean),
        ("url", BuiltinType::Url),
        ("email", BuiltinType::Email),
        ("five_six", BuiltinType::Text),
        ("seven-eight", BuiltinType::Text),
    ];
    for (key, ty) in expected {
        assert_eq!(inferred.get(key), Some(&TypeSpec::Builtin(ty)), "{}", key);
    }

    let out = FieldSetProcessor::default().process(&source, None);
    assert_eq!(out.len(), 10);
    assert_eq!(out.scalar("varname"), Some(&text("my_var_name")));
    assert_eq!(out.scalar("email"), Some(&text("ttrojan@usc.edu")));
}

#[test]
fn form_post_with_explicit_map() {
    let post = FormPost {
        fields: vec![
            ("title".to_string(), r#"<script>alert("Oops this is bad.");</script>This is a title."#.to_string()),
            ("summary".to_string(), r#"<p style="color:red">Test of "quotes" in string.</p>"#.to_string()),
            ("select_multiple".to_string(), "1".to_string()),
            ("select_multiple".to_string(), "2".to_string()),
            ("select_multiple".to_string(), "The Fox".to_string()),
            ("phone".to_string(), "(213)740-2925".to_string()),
            ("homepage".to_string(), "www.example.com".to_string()),
            ("vars".to_string(), "$one,two,$three".to_string()),
            ("injected".to_string(), "<img src=x onerror=alert(1)>".to_string()),
        ],
    };
    let map = ValidationMap::try_from_pairs([
        ("title", "HTML"),
        ("summary", "HTML"),
        ("select_multiple", "Array_Integers"),
        ("phone", r"\([0-9][0-9][0-9]\)[0-9][0-9][0-9]-[0-9][0-9][0-9][0-9]"),
        ("homepage", "Url"),
        ("vars", "Varname_List"),
    ])
    .unwrap();

    let out = FieldSetProcessor::default().process(&post, Some(&map));

    assert_eq!(out.scalar("title"), Some(&text("This is a title.")));
    assert_eq!(
        out.scalar("summary"),
        Some(&text("<p>Test of &quot;quotes&quot; in string.</p>"))
    );
    assert_eq!(
        out.get("select_multiple"),
        Some(&Validated::List(vec![Value::Integer(1), Value::Integer(2)]))
    );
    assert_eq!(out.scalar("phone"), Some(&text("(213)740-2925")));
    assert_eq!(out.scalar("homepage"), Some(&text("http://www.example.com")));
    assert_eq!(out.scalar("vars"), Some(&text("one,two,three")));
    assert!(!out.contains_key("injected"));
}

#[test]
fn server_metadata_path_info() {
    let mut server = HashMap::new();
    server.insert("PATH_INFO".to_string(), "/20142/33361".to_string());
    server.insert("HTTP_USER_AGENT".to_string(), "<script>x</script>".to_string());
    let map = ValidationMap::try_from_pairs([("PATH_INFO", "/20[0-9][0-9][1-3]/[0-9]{5}")]).unwrap();

    let out = FieldSetProcessor::default().process(&server, Some(&map));

    assert_eq!(out.scalar("PATH_INFO"), Some(&text("/20142/33361")));
    assert_eq!(out.len(), 1);
}

#[test]
fn repeated_query_keys_as_lists() {
    let mut query: HashMap<String, Vec<String>> = HashMap::new();
    query.insert(
        "emails".to_string(),
        vec!["ttrojan@usc.edu".to_string(), "Abc.example.com".to_string()],
    );
    let map = ValidationMap::builder().array("emails", BuiltinType::Email).build();

    let out = FieldSetProcessor::default().process(&query, Some(&map));

    assert_eq!(out.list("emails"), Some(&[text("ttrojan@usc.edu")][..]));
}

#[test]
fn single_value_validation_api() {
    let v = Validator::default();
    let boolean = TypeSpec::Builtin(BuiltinType::Boolean);

    for (input, expected) in [
        ("true", true),
        ("1", true),
        ("false", false),
        ("0", false),
        ("blahblah", false),
    ] {
        assert_eq!(v.validate(input, &boolean), Ok(Value::Boolean(expected)), "{}", input);
    }

    let url = TypeSpec::Builtin(BuiltinType::Url);
    assert_eq!(v.validate("www.example.com", &url), Ok(text("http://www.example.com")));
    assert_eq!(v.validate("http://example.com", &url), Ok(text("http://example.com")));
    assert!(v.validate("htp://www.usc.edu", &url).is_err());
}

#[test]
fn validated_fields_serialize_to_json() {
    let mut source = FieldSource::new();
    source.add("id", "7");
    source.insert("tags", FieldValue::from(vec!["a", "b-c"]));
    let map = ValidationMap::builder()
        .field("id", BuiltinType::Integer)
        .array("tags", BuiltinType::Varname)
        .build();

    let out = FieldSetProcessor::default().process(&source, Some(&map));
    let json = serde_json::to_value(&out).unwrap();

    assert_eq!(json, serde_json::json!({ "id": 7, "tags": ["a"] }));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn rejections_are_logged_without_raw_values() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut source = FieldSource::new();
        source.add("secret_code", "hunter2-not-an-int");
        let map = ValidationMap::builder()
            .field("secret_code", BuiltinType::Integer)
            .build();
        let out = FieldSetProcessor::default().process(&source, Some(&map));
        assert!(out.is_empty());
    });

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("field rejected"));
    assert!(output.contains("secret_code"));
    assert!(!output.contains("hunter2"));
}

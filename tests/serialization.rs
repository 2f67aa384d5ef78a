//! Serialized form of snapshots, including completed generator slots

use insta::assert_snapshot;
use serde_json::json;
use tidal::template::loader::{Format, TemplateLoader};
use tidal::{BuildOptions, Builder, Limit, Options, Template, Value};

fn lines(snapshots: impl Iterator<Item = Value>) -> String {
    snapshots
        .map(|snapshot| serde_json::to_string(&snapshot).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_completed_member_is_omitted() {
    let mut builder = Builder::new();
    builder
        .add(Template::from_entries([
            ("id", Template::from("sensor")),
            ("reading", Template::iter(|| vec![1.5])),
        ]))
        .unwrap();
    let sequence = builder
        .build_with(BuildOptions::new().limit(Limit::Count(2)))
        .unwrap();
    assert_snapshot!(lines(sequence), @r###"
    {"id":"sensor","reading":1.5}
    {"id":"sensor"}
    "###);
}

#[test]
fn test_completed_element_is_null() {
    let mut builder = Builder::new();
    builder
        .add_at(
            "pair",
            Template::Array(vec![Template::from("x"), Template::iter(|| vec![true])]),
        )
        .unwrap();
    let sequence = builder
        .build_with(BuildOptions::new().limit(Limit::Count(2)))
        .unwrap();
    assert_snapshot!(lines(sequence), @r###"
    {"pair":["x",true]}
    {"pair":["x",null]}
    "###);
}

#[test]
fn test_key_order_follows_insertion() {
    let mut builder = Builder::with_options(Options::new().limit(1usize));
    builder
        .add(json!({"zeta": 1, "alpha": {"y": 2, "b": 3}}))
        .unwrap()
        .add_at("middle", "m")
        .unwrap();
    assert_snapshot!(lines(builder.build()), @r###"{"zeta":1,"alpha":{"y":2,"b":3},"middle":"m"}"###);
}

#[test]
fn test_yaml_template_stream() {
    let source = r#"
ticker:
  symbol: ACME
  price:
    $sequence: [10, 10.5, 9.75]
  seq:
    $range: {start: 1, end: 4}
"#;
    let builder = TemplateLoader::from_string(source, Format::Yaml)
        .into_builder(Options::new())
        .unwrap();
    let sequence = builder.build_with("ticker").unwrap().take(10);
    assert_snapshot!(lines(sequence), @r###"
    {"symbol":"ACME","price":10,"seq":1}
    {"symbol":"ACME","price":10.5,"seq":2}
    {"symbol":"ACME","price":9.75,"seq":3}
    "###);
}

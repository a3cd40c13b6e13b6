use chrono::NaiveDate;

use cellmap::{
    field_enum, map, CastFailure, CasterKind, Describe, EnumDescriptor, Enumeration, MapCell,
    Serializer, Target, Value,
};

#[derive(Default, Debug)]
struct Member {
    name: String,
    age: i64,
    active: bool,
}

impl Target for Member {
    fn blank() -> Self {
        Member::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields.property("name", |m: &mut Member, v: String| m.name = v);
        fields.property("age", |m: &mut Member, v: i64| m.age = v);
        fields.property("active", |m: &mut Member, v: bool| m.active = v);
    }
}

#[test]
fn test_end_to_end_record() {
    let serializer = Serializer::<Member>::new(&["name", "age", "active"]).unwrap();

    let ann = serializer.hydrate(&["Ann", "37", "yes"]).unwrap();
    assert_eq!(ann.name, "Ann");
    assert_eq!(ann.age, 37);
    assert!(ann.active);

    let err = serializer.hydrate(&["Bob", "x", "no"]).unwrap_err();
    assert_eq!(err.field(), Some("age"));
    assert!(matches!(err.failure(), CastFailure::InvalidValue { .. }));
    assert!(err.to_string().contains("age"));
}

#[test]
fn test_unmatched_boolean_token_fails() {
    let serializer = Serializer::<Member>::new(&["name", "age", "active"]).unwrap();
    let err = serializer.hydrate(&["Ann", "37", "maybe"]).unwrap_err();
    assert_eq!(err.field(), Some("active"));
}

#[derive(Default)]
struct Settings {
    retries: Option<i64>,
    ratio: Option<f64>,
    label: Option<String>,
}

impl Target for Settings {
    fn blank() -> Self {
        Settings::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields
            .property("retries", |s: &mut Settings, v: Option<i64>| s.retries = v)
            .map(MapCell::new().option("default", 3));
        fields
            .property("ratio", |s: &mut Settings, v: Option<f64>| s.ratio = v)
            .map(MapCell::new().option("default", 0.5));
        fields.property("label", |s: &mut Settings, v: Option<String>| s.label = v);
    }
}

#[test]
fn test_null_cell_takes_declared_default() {
    let serializer = Serializer::<Settings>::new(&["retries", "ratio", "label"]).unwrap();

    let settings = serializer.hydrate(&[None::<&str>, None, None]).unwrap();
    assert_eq!(settings.retries, Some(3));
    assert_eq!(settings.ratio, Some(0.5));
    assert_eq!(settings.label, None);

    let settings = serializer.hydrate(&[Some("7"), Some("1.25"), Some("x")]).unwrap();
    assert_eq!(settings.retries, Some(7));
    assert_eq!(settings.ratio, Some(1.25));
    assert_eq!(settings.label.as_deref(), Some("x"));
}

#[derive(Debug, PartialEq)]
enum Level {
    A,
    B,
}

impl Enumeration for Level {
    fn descriptor() -> EnumDescriptor {
        EnumDescriptor::int_backed("Level", &[("A", 1), ("B", 2)])
    }

    fn from_case(case: &str) -> Option<Self> {
        match case {
            "A" => Some(Level::A),
            "B" => Some(Level::B),
            _ => None,
        }
    }
}

field_enum!(Level);

#[derive(Debug)]
struct Ticket {
    level: Level,
}

impl Target for Ticket {
    fn blank() -> Self {
        Ticket { level: Level::A }
    }

    fn describe(fields: &mut Describe<Self>) {
        fields.property("level", |t: &mut Ticket, v: Level| t.level = v);
    }
}

#[test]
fn test_int_backed_enum() {
    let serializer = Serializer::<Ticket>::new(&["level"]).unwrap();
    assert_eq!(serializer.hydrate(&["2"]).unwrap().level, Level::B);

    let err = serializer.hydrate(&["9"]).unwrap_err();
    assert_eq!(
        err.failure(),
        &CastFailure::UnknownEnumCase {
            value: "9".to_string(),
            enum_name: "Level".to_string(),
        }
    );
}

struct Loose {
    raw: Value,
}

impl Target for Loose {
    fn blank() -> Self {
        Loose { raw: Value::Null }
    }

    fn describe(fields: &mut Describe<Self>) {
        fields
            .property("raw", |l: &mut Loose, v: Value| l.raw = v)
            .map(MapCell::new().enumeration::<Level>());
    }
}

#[test]
fn test_enum_caster_on_mixed_field() {
    let serializer = Serializer::<Loose>::new(&["raw"]).unwrap();
    let loose = serializer.hydrate(&["1"]).unwrap();
    assert_eq!(loose.raw.to_string(), "Level::A");
}

#[derive(Default, Debug)]
struct Post {
    tags: Vec<String>,
    scores: Vec<i64>,
    meta: Value,
}

impl Target for Post {
    fn blank() -> Self {
        Post::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields
            .property("tags", |p: &mut Post, v: Vec<String>| p.tags = v)
            .map(MapCell::new().option("delimiter", "|"));
        fields
            .property("scores", |p: &mut Post, v: Vec<i64>| p.scores = v)
            .map(
                MapCell::new()
                    .option("shape", "csv")
                    .option("delimiter", ";")
                    .option("type", "int"),
            );
        fields
            .property("meta", |p: &mut Post, v: Value| p.meta = v)
            .map(MapCell::new().cast(CasterKind::Array).option("shape", "json"));
    }
}

#[test]
fn test_array_shapes() {
    let serializer = Serializer::<Post>::new(&["tags", "scores", "meta"]).unwrap();

    let post = serializer
        .hydrate(&["a|b|c", "1;\"2\";3", r#"{"k": [1, 2]}"#])
        .unwrap();
    assert_eq!(post.tags, vec!["a", "b", "c"]);
    assert_eq!(post.scores, vec![1, 2, 3]);
    assert!(matches!(post.meta, Value::Map(_)));

    let post = serializer.hydrate(&["", "", ""]).unwrap();
    assert!(post.tags.is_empty());
    assert!(post.scores.is_empty());
    assert_eq!(post.meta, Value::Array(vec![]));

    let err = serializer.hydrate(&["a", "1;two", "[]"]).unwrap_err();
    assert_eq!(err.field(), Some("scores"));
    assert!(matches!(err.failure(), CastFailure::InvalidElement { index: 1, .. }));

    let err = serializer.hydrate(&["a", "1", "{broken"]).unwrap_err();
    assert_eq!(err.field(), Some("meta"));
}

#[derive(Default)]
struct Event {
    day: Option<NaiveDate>,
}

impl Target for Event {
    fn blank() -> Self {
        Event::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields
            .property("day", |e: &mut Event, v: Option<NaiveDate>| e.day = v)
            .map(MapCell::new().option("format", "%d/%m/%Y"));
    }
}

#[test]
fn test_date_with_format() {
    let serializer = Serializer::<Event>::new(&["day"]).unwrap();
    let event = serializer.hydrate(&["17/10/2026"]).unwrap();
    assert_eq!(event.day, NaiveDate::from_ymd_opt(2026, 10, 17));

    assert_eq!(serializer.hydrate(&[None::<&str>]).unwrap().day, None);
    assert!(serializer.hydrate(&["2026-10-17"]).is_err());
}

/// `nickname` is only set when the cell is not empty.
#[derive(Default, Debug)]
struct Profile {
    name: String,
    nickname: Option<String>,
}

impl Target for Profile {
    fn blank() -> Self {
        Profile::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields.property("name", |p: &mut Profile, v: String| p.name = v);
        fields
            .property("nickname", |p: &mut Profile, v: Option<String>| p.nickname = v)
            .private()
            .probe(|p| p.nickname.is_some());
        fields
            .setter("setAlias", |p: &mut Profile, v: String| {
                if !v.is_empty() {
                    p.nickname = Some(v);
                }
            })
            .map(MapCell::new());
    }
}

#[test]
fn test_validation_runs_once_per_serializer() {
    let serializer = Serializer::<Profile>::new(&["name", "alias"]).unwrap();
    let records = vec![
        vec!["Ann", "annie"],
        vec!["Bob", "bobby"],
        vec!["Cy", ""],
    ];

    let profiles: Vec<_> = serializer
        .hydrate_all(&records)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(profiles.len(), 3);
    assert_eq!(profiles[2].nickname, None);
}

#[test]
fn test_validation_applies_to_first_record_pulled() {
    let serializer = Serializer::<Profile>::new(&["name", "alias"]).unwrap();

    let err = serializer.hydrate(&["Cy", ""]).unwrap_err();
    assert_eq!(
        err.failure(),
        &CastFailure::Uninitialized {
            field: "nickname".to_string()
        }
    );

    // The check is spent; a second sequence from the same serializer is not
    // verified again.
    let records = [["Dee", ""]];
    assert!(serializer.hydrate_all(&records).all(|r| r.is_ok()));

    let fresh = Serializer::<Profile>::new(&["name", "alias"]).unwrap();
    assert!(fresh.hydrate_all(&records).all(|r| r.is_err()));
}

#[test]
fn test_lazy_sequence_continues_after_error() {
    let serializer = Serializer::<Member>::new(&["name", "age", "active"]).unwrap();
    let records = vec![
        vec!["Ann".to_string(), "37".to_string(), "1".to_string()],
        vec!["Bob".to_string(), "old".to_string(), "0".to_string()],
        vec!["Cy".to_string(), "21".to_string(), "off".to_string()],
    ];

    let mut results = serializer.hydrate_all(&records);
    assert_eq!(results.next().unwrap().unwrap().name, "Ann");
    assert!(results.next().unwrap().is_err());
    let cy = results.next().unwrap().unwrap();
    assert_eq!((cy.age, cy.active), (21, false));
    assert!(results.next().is_none());
}

#[test]
fn test_shared_between_threads() {
    let serializer = Serializer::<Member>::new(&["name", "age", "active"]).unwrap();

    let ages: Vec<i64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let serializer = &serializer;
                scope.spawn(move || {
                    let age = (20 + i).to_string();
                    serializer
                        .hydrate(&["T", age.as_str(), "true"])
                        .map(|m| m.age)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    assert_eq!(ages, vec![20, 21, 22, 23]);
}

#[test]
fn test_one_shot_map() {
    let member: Member = map([("active", "no"), ("age", "5"), ("name", "Kit")]).unwrap();
    assert_eq!(member.name, "Kit");
    assert_eq!(member.age, 5);
    assert!(!member.active);
}

#[derive(Default)]
struct Audited {
    name: String,
    normalized: bool,
}

impl Target for Audited {
    fn blank() -> Self {
        Audited::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields
            .property("name", |a: &mut Audited, v: String| a.name = v)
            .map(MapCell::new().trim());
        fields
            .property("normalized", |a: &mut Audited, v: bool| a.normalized = v)
            .map(MapCell::ignored())
            .defaulted();
        fields.after_mapping(|a| {
            a.name = a.name.to_uppercase();
            a.normalized = true;
        });
    }
}

#[test]
fn test_after_mapping_hook_and_trim() {
    let serializer = Serializer::<Audited>::new(&["name", "normalized"]).unwrap();
    assert_eq!(serializer.bindings().len(), 1);

    let audited = serializer.hydrate(&["  ada ", "false"]).unwrap();
    assert_eq!(audited.name, "ADA");
    assert!(audited.normalized);
}

#[derive(Default, Debug)]
struct Counter {
    hits: u64,
}

impl Target for Counter {
    fn blank() -> Self {
        Counter::default()
    }

    fn describe(fields: &mut Describe<Self>) {
        fields
            .property("hits", |c: &mut Counter, v: u64| c.hits = v)
            .map(MapCell::new().cast(CasterKind::String));
    }
}

#[test]
fn test_u64_field_reads_full_unsigned_range() {
    let serializer = Serializer::<Counter>::new(&["hits"]).unwrap();
    let counter = serializer.hydrate(&["18446744073709551615"]).unwrap();
    assert_eq!(counter.hits, u64::MAX);

    let err = serializer.hydrate(&["-1"]).unwrap_err();
    assert_eq!(err.field(), Some("hits"));
}

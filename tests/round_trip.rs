//! Load/save round trips across the supported route file formats.

use carrier_route::codec::{record_from_data, RouteFormat, RouteStore};
use carrier_route::routing::{route, RouteRequest, RouteTable, Target};
use carrier_route::RouteError;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod common;

#[test]
fn test_native_save_then_load_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::sample_store(dir.path());
    let original = store.load().unwrap();

    let copy = RouteStore::new(dir.path().join("copy.conf"));
    copy.save(&original).unwrap();
    let reloaded = copy.load().unwrap();

    assert_eq!(record_from_data(&reloaded), record_from_data(&original));
    assert_eq!(reloaded.rule_count(), original.rule_count());
    assert_eq!(reloaded.domain_count(), 2);
}

#[test]
fn test_conversion_through_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let original = common::sample_store(dir.path()).load().unwrap();
    let expected = record_from_data(&original);

    let mut data = original;
    for (name, format) in [
        ("routes.toml", RouteFormat::Toml),
        ("routes.json", RouteFormat::Json),
        ("routes.conf", RouteFormat::Native),
    ] {
        let store = RouteStore::new(dir.path().join(name));
        assert_eq!(store.format(), format);
        store.save(&data).unwrap();
        data = store.load().unwrap();
        assert_eq!(record_from_data(&data), expected, "mismatch after {name}");
    }
}

#[test]
fn test_saved_file_routes_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let original = common::sample_store(dir.path()).load().unwrap();

    let store = RouteStore::new(dir.path().join("saved.conf"));
    store.save(&original).unwrap();
    let reloaded = store.load().unwrap();

    let numbers = ["49301234567", "4989123", "4420555", "33123", "1"];
    for number in numbers {
        for domain in ["voice", "sms"] {
            let request = RouteRequest::new(domain, number)
                .destination("sip.example.com")
                .selection_key("call-1@example.com");
            let a = route(&original, &request, &mut StdRng::seed_from_u64(11));
            let b = route(&reloaded, &request, &mut StdRng::seed_from_u64(11));
            assert_eq!(a, b, "{domain}/{number}");
        }
    }
}

#[test]
fn test_keep_original_sentinel_survives_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = common::sample_store(dir.path());
    store.save(&store.load().unwrap()).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("target \"\""));

    let table = RouteTable::from_store(&store).unwrap();
    let outcome = table.route(&RouteRequest::new("voice", "49301234567").destination("sip.example.com"));
    let decision = outcome.decision().unwrap();
    assert_eq!(decision.target, Target::KeepOriginal);
    assert_eq!(decision.rewrite.destination, "sip.example.com");
    assert_eq!(decision.rewrite.number, "49301234567;npdi");
}

#[test]
fn test_failed_save_leaves_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let data = common::sample_store(dir.path()).load().unwrap();

    // A directory in the way of the target makes the final rename fail.
    let blocked = dir.path().join("blocked.conf");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep"), "x").unwrap();

    let err = RouteStore::new(&blocked).save(&data).unwrap_err();
    assert!(matches!(err, RouteError::Io { .. }));
    assert_eq!(std::fs::read_to_string(blocked.join("keep")).unwrap(), "x");

    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["blocked.conf", "carrierroute.conf"]);
}

#[test]
fn test_quoted_null_host_survives_format_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_route_file(
        dir.path(),
        "routes.toml",
        "[[domain]]\nname = \"voice\"\n\n[[domain.prefix]]\nprefix = \"49\"\n\n\
         [[domain.prefix.target]]\nhost = \"NULL\"\nprob = 1.0\n",
    );
    let from_toml = RouteStore::new(path).load().unwrap();

    let native = RouteStore::new(dir.path().join("routes.conf"));
    native.save(&from_toml).unwrap();
    let from_native = native.load().unwrap();
    assert_eq!(record_from_data(&from_native), record_from_data(&from_toml));

    let request = RouteRequest::new("voice", "491").destination("sip.example.com");
    let decision = route(&from_native, &request, &mut StdRng::seed_from_u64(1));
    assert_eq!(decision.decision().unwrap().target, Target::Host("NULL".into()));

    // Written back out, the title stays quoted.
    let text = std::fs::read_to_string(native.path()).unwrap();
    assert!(text.contains("target \"NULL\""), "{text}");
}

#[test]
fn test_parse_error_reports_line_and_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_route_file(
        dir.path(),
        "bad.conf",
        "domain voice {\n  prefix 49 {\n    target gw {\n      prob = lots\n    }\n  }\n}\n",
    );
    match RouteStore::new(path).load() {
        Err(RouteError::ConfigParse { line, section, .. }) => {
            assert_eq!(line, 4);
            assert!(section.contains("target \"gw\""), "{section}");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

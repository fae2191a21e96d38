//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};

use carrier_route::codec::RouteStore;

/// A small but complete route file: catch-all, German and UK prefixes,
/// a hash-indexed pair, a disabled and a probing rule.
pub const SAMPLE_ROUTES: &str = r#"
domain voice {
    prefix "" {
        target fallback.example.net {
            prob = 1
        }
    }
    prefix 49 {
        max_locdb = 2
        target gw1.example.com {
            prob = 0.7
            strip = 2
            rewrite_prefix = "0"
        }
        target gw2.example.com {
            prob = 0.3
            comment = "backup"
        }
    }
    prefix 4930 {
        target "" {
            prob = 1
            rewrite_suffix = ";npdi"
        }
    }
    prefix 44 {
        max_locdb = 0
        target uk1.example.com {
            prob = 0.5
            hash_index = 1
        }
        target uk2.example.com {
            prob = 0.5
            hash_index = 2
        }
        target uk-old.example.com {
            prob = 1
            status = 0
        }
        target uk-trial.example.com {
            prob = 1
            status = 2
        }
    }
}

domain sms {
    prefix 1 {
        target "smsc.example.org" {
            prob = 1
        }
    }
}
"#;

/// Write `contents` to `name` inside `dir` and return its path.
pub fn write_route_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// A native-format store seeded with [`SAMPLE_ROUTES`].
#[allow(dead_code)]
pub fn sample_store(dir: &Path) -> RouteStore {
    RouteStore::new(write_route_file(dir, "carrierroute.conf", SAMPLE_ROUTES))
}

/// A `voice` domain whose catch-all and `49` rules both point at `host`.
#[allow(dead_code)]
pub fn single_host_routes(host: &str) -> String {
    format!(
        "domain voice {{\n    prefix \"\" {{\n        target \"{host}\" {{\n            prob = 1\n        }}\n    }}\n    prefix 49 {{\n        target \"{host}\" {{\n            prob = 1\n        }}\n    }}\n}}\n"
    )
}

//! Static frame corpora used across harnesses.

/// A three-level hierarchy: `app` (1) → `db` (2) → `pool` (3), plus a
/// second root `cache` (4).
pub const HIERARCHY: &[&str] = &[
    "{\"cmd\":\"add\",\"data\":{\"id\":1,\"parentPath\":[],\"label\":\"app\"}}\r\n",
    "{\"cmd\":\"add\",\"data\":{\"id\":2,\"parentPath\":[1],\"label\":\"db\"}}\r\n",
    "{\"cmd\":\"add\",\"data\":{\"id\":3,\"parentPath\":[1,2],\"label\":\"pool\"}}\r\n",
    "{\"cmd\":\"add\",\"data\":{\"id\":4,\"parentPath\":[],\"label\":\"cache\"}}\r\n",
];

/// Log frames for the loggers in [`HIERARCHY`], one per level.
pub const RECORDS: &[&str] = &[
    "{\"cmd\":\"log\",\"data\":{\"loggerID\":1,\"level\":1,\"reason\":\"booting\"}}\r\n",
    "{\"cmd\":\"log\",\"data\":{\"loggerID\":2,\"level\":2,\"reason\":\"connected\",\"payload\":\"postgres://db\"}}\r\n",
    "{\"cmd\":\"log\",\"data\":{\"loggerID\":3,\"level\":3,\"reason\":\"pool ready\",\"payload\":{\"size\":8}}}\r\n",
    "{\"cmd\":\"log\",\"data\":{\"loggerID\":4,\"level\":4,\"reason\":\"evicting\",\"payload\":[1,2,3]}}\r\n",
    "{\"cmd\":\"log\",\"data\":{\"loggerID\":2,\"level\":5,\"reason\":\"query failed\",\"payload\":{\"code\":\"40001\"}}}\r\n",
    "{\"cmd\":\"log\",\"data\":{\"loggerID\":4,\"level\":6,\"reason\":\"hit ratio\",\"payload\":0.93}}\r\n",
];

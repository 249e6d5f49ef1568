//! Build-time embedding of the standard-library catalog.
//!
//! The JSON lives on disk under `assets/stdlib/` so it can be edited and
//! diffed like source, but it is folded into the binary at compile time via
//! [`include_dir`] rather than read from the filesystem at runtime — the
//! shipped binary never needs its own install directory to find it.

use include_dir::{include_dir, Dir};

use jackc_sema::{Catalog, parse_catalog};

static STDLIB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/stdlib");

/// Parses the embedded `stdlib.json`.
///
/// Fails only if the shipped asset itself is malformed, which is an
/// infra-level bug in this crate, not a diagnostic about the user's program.
pub fn embedded_catalog() -> Result<Catalog, serde_json::Error> {
    let file = STDLIB_DIR
        .get_file("stdlib.json")
        .expect("assets/stdlib/stdlib.json is embedded at build time");
    let json = file.contents_utf8().expect("stdlib.json is valid UTF-8");
    parse_catalog(json)
}

//! CLI command implementations.

use serde::Serialize;

pub mod get;
pub mod show;

/// JSON envelope for `--json` output.
#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

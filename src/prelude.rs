#![allow(unused_imports)]

pub use anyhow::{Context, Result, anyhow, bail};
pub use log::{debug, error, info, trace, warn};

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod model;
pub mod sort;
pub mod source;
pub mod state;

pub use error::*;
pub use model::*;
pub use sort::*;
pub use source::*;
pub use state::*;

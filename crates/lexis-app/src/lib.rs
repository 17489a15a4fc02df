// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod corpus;
pub mod generation;
pub mod model;
pub mod resolver;
pub mod state;
pub mod throttle;

pub use corpus::*;
pub use generation::*;
pub use model::*;
pub use resolver::*;
pub use state::*;
pub use throttle::*;

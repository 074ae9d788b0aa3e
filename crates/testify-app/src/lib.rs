// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod booking;
pub mod catalog;
pub mod flow;
pub mod forms;
pub mod ids;
pub mod model;
pub mod orders;
pub mod pricing;
pub mod seed;
pub mod selection;
pub mod state;

pub use booking::*;
pub use catalog::*;
pub use flow::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use orders::*;
pub use pricing::*;
pub use seed::*;
pub use selection::*;
pub use state::*;

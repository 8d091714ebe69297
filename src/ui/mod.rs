// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Terminal front end

mod console;
pub mod render;

pub use console::{Command, Console};
pub use render::status_view;

#![allow(dead_code)]

mod http;
mod source;

pub use http::{get, post, test_state};
pub use source::{MockSource, addon_template, release};

//! 数据模型

mod fragment;
mod language;
mod testcase;

pub use fragment::*;
pub use language::*;
pub use testcase::*;

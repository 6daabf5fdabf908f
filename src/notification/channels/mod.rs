//! 具体渠道实现

pub mod console;
pub mod matrix;

pub use console::ConsoleChannel;
pub use matrix::{MatrixChannel, MatrixConfig};

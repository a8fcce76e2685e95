pub mod consts;
pub mod error;
pub mod frame;
pub mod sample;
pub mod progress;
pub mod source;
pub mod stack;
pub mod io;
pub mod pipeline;

mod common;
mod defects;
mod presets;
mod taint_fault;

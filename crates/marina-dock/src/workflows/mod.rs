//! Marina workflows. Dock planning is currently the only one.

pub mod dock;

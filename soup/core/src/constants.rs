//! Machine-wide constants shared by the soup, the CPU and the loader.

/// Number of bytes in the soup. Every address is reduced modulo this value.
pub const SOUP_SIZE: usize = 60_000;

/// Capacity of the per-CPU data stack.
pub const STACK_SIZE: usize = 10;

/// Highest opcode value with a defined meaning; anything above is ignored.
pub const MAX_OPCODE: u8 = 0x1f;

/// Marker byte values read as template bits by the resolver.
pub const MARKER_ZERO: u8 = 0x00;
pub const MARKER_ONE: u8 = 0x01;

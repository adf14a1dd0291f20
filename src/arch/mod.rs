//! Architecture-specific kernels and their shared table builders.

#[cfg(target_arch = "x86_64")]
pub(crate) mod shuffle;
#[cfg(target_arch = "x86_64")]
pub(crate) mod sse41;

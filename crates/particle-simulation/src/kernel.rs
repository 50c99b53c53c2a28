//! Source of the WGSL particle update kernel

use crate::error::BackendError;
use std::borrow::Cow;
use std::path::PathBuf;

/// Kernel bundled with the crate
pub const BUILTIN_KERNEL: &str = include_str!("shaders/update_particles.wgsl");

/// Entry point every kernel source must define
pub const KERNEL_ENTRY_POINT: &str = "update_particles";

/// Threads per workgroup declared by the kernel's `@workgroup_size`
pub const WORKGROUP_SIZE: u32 = 64;

/// Where the compute kernel is loaded from
///
/// A replacement kernel must keep the bindings, the `update_particles` entry
/// point and the workgroup size of [`BUILTIN_KERNEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KernelSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl KernelSource {
    pub fn load(&self) -> Result<Cow<'static, str>, BackendError> {
        match self {
            KernelSource::Builtin => Ok(Cow::Borrowed(BUILTIN_KERNEL)),
            KernelSource::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| BackendError::KernelSource {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

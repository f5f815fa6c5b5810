use std::sync::OnceLock;

static INSTANCE: OnceLock<wgpu::Instance> = OnceLock::new();

/// Returns the process-wide wgpu instance, creating it on first use.
///
/// The instance loads the platform graphics drivers. It is created exactly once
/// no matter how many canvases or windows exist and lives until process exit.
pub fn instance() -> &'static wgpu::Instance {
    INSTANCE.get_or_init(|| {
        log::debug!("bootstrapping wgpu instance");
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    })
}

pub mod linux;
pub mod macos;
pub mod null;
pub mod windows;

pub use linux::LinuxProvider;
pub use macos::MacProvider;
pub use null::NullProvider;
pub use windows::WindowsProvider;

use crate::provider::ScanProvider;
use crate::ScanConfig;

#[cfg(target_os = "macos")]
pub fn create_provider(config: &ScanConfig) -> Box<dyn ScanProvider> {
    Box::new(MacProvider::new(config))
}

#[cfg(target_os = "linux")]
pub fn create_provider(config: &ScanConfig) -> Box<dyn ScanProvider> {
    Box::new(LinuxProvider::new(config))
}

#[cfg(target_os = "windows")]
pub fn create_provider(config: &ScanConfig) -> Box<dyn ScanProvider> {
    Box::new(WindowsProvider::new(config))
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
pub fn create_provider(_config: &ScanConfig) -> Box<dyn ScanProvider> {
    Box::new(NullProvider)
}

//! Mobile app steps.

use crate::driver::MobileDriver;
use crate::resolver::SelectorResolver;
use crate::result::StepResult;

/// Step handlers bound to one device session
#[derive(Debug)]
pub struct AppStep<M: MobileDriver> {
    device: M,
    resolver: SelectorResolver,
}

impl<M: MobileDriver> AppStep<M> {
    /// Bind steps to `device`
    pub const fn new(device: M, resolver: SelectorResolver) -> Self {
        Self { device, resolver }
    }

    /// The underlying device
    pub const fn device(&self) -> &M {
        &self.device
    }

    /// Install the package named by the step parameter
    pub fn install_app(&mut self, param: &str) -> StepResult<()> {
        let package = self.resolver.resolve(param)?.selector;
        tracing::info!(package = %package, "install_app");
        self.device.install_app(&package)
    }

    /// Remove the app named by the step parameter
    pub fn uninstall_app(&mut self, param: &str) -> StepResult<()> {
        let package = self.resolver.resolve(param)?.selector;
        tracing::info!(package = %package, "uninstall_app");
        self.device.uninstall_app(&package)
    }

    /// Go back one page
    pub fn return_pre_page(&mut self) -> StepResult<()> {
        self.device.navigate_back()
    }

    /// Open a page by schema URL or page name
    pub fn jump_to_page(&mut self, page: &str) -> StepResult<()> {
        self.device.jump_to_page(page.trim())
    }
}

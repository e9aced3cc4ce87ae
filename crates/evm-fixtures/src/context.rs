use hiro_system_kit::Logger;

#[derive(Clone)]
pub struct Context {
    pub logger: Option<Logger>,
}

impl Context {
    pub fn empty() -> Context {
        Context { logger: None }
    }

    /// Context logging through the process-wide terminal logger
    pub fn with_default_logger() -> Context {
        Context { logger: Some(hiro_system_kit::log::setup_logger()) }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::empty()
    }
}

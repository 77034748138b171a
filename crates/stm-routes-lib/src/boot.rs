//! Host lifecycle hook: defer setup until the host map is ready

/// Setup callback run against the host's context
pub type SetupFn<C> = Box<dyn FnOnce(&mut C)>;

/// Setup callbacks waiting for the host to become ready
///
/// Registering after the host signalled readiness runs the setup immediately, so a guest
/// that loads late still starts.
pub struct BootHooks<C> {
    ready: bool,
    pending: Vec<SetupFn<C>>,
}

impl<C> Default for BootHooks<C> {
    fn default() -> Self {
        Self {
            ready: false,
            pending: Vec::new(),
        }
    }
}

impl<C> BootHooks<C> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of setups still waiting for readiness
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Run `setup` now if the host is ready, otherwise queue it
    pub fn register(&mut self, context: &mut C, setup: impl FnOnce(&mut C) + 'static) {
        if self.ready {
            setup(context);
        } else {
            self.pending.push(Box::new(setup));
        }
    }

    /// Mark the host ready and run queued setups in registration order.
    ///
    /// Only the first call has an effect.
    pub fn signal_ready(&mut self, context: &mut C) {
        if self.ready {
            return;
        }
        self.ready = true;

        let pending = std::mem::take(&mut self.pending);
        tracing::debug!("Host ready, running {} deferred setups", pending.len());
        for setup in pending {
            setup(context);
        }
    }
}

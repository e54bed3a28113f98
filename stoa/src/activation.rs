//! Per-request context injection.

use crate::{AttributeStore, ContextFacade, Controller, SeedPolicy};

/// The stores one handler invocation sees.
///
/// Facades are built from the stores when [`apply`](Self::apply) runs, so they
/// are seeded with the store contents at that moment.
///
/// ```rust,ignore
/// Activation::new()
///     .request(Arc::clone(&request))
///     .session(Arc::clone(&session))
///     .apply(&mut handler);
/// ```
pub struct Activation<Rq, Ss, Ap> {
    request: Option<Rq>,
    session: Option<Ss>,
    application: Option<Ap>,
    policy: SeedPolicy,
}

impl<Rq, Ss, Ap> Activation<Rq, Ss, Ap>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    /// An activation that injects nothing yet.
    pub fn new() -> Self {
        Self {
            request: None,
            session: None,
            application: None,
            policy: SeedPolicy::default(),
        }
    }

    /// Inject a request context over `store`.
    pub fn request(mut self, store: Rq) -> Self {
        self.request = Some(store);
        self
    }

    /// Inject a session context over `store`.
    pub fn session(mut self, store: Ss) -> Self {
        self.session = Some(store);
        self
    }

    /// Inject an application context over `store`.
    pub fn application(mut self, store: Ap) -> Self {
        self.application = Some(store);
        self
    }

    /// Seed the injected facades with `policy` instead of the default.
    pub fn seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the facades and install them on `controller`.
    ///
    /// Contexts not given to this activation are left as they were.
    pub fn apply<C>(self, controller: &mut C)
    where
        C: Controller<RequestStore = Rq, SessionStore = Ss, ApplicationStore = Ap>,
    {
        let policy = self.policy;
        if let Some(store) = self.request {
            controller.set_request_context(ContextFacade::with_policy(store, policy));
        }
        if let Some(store) = self.session {
            controller.set_session_context(ContextFacade::with_policy(store, policy));
        }
        if let Some(store) = self.application {
            controller.set_application_context(ContextFacade::with_policy(store, policy));
        }
    }
}

impl<Rq, Ss, Ap> Default for Activation<Rq, Ss, Ap>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    fn default() -> Self {
        Self::new()
    }
}

//! # Capability Resolver (Controller)
//!
//! The mixin a handler type implements to receive its injected contexts and to
//! resolve collaborators from the installed [`CapabilityRegistry`].
//!
//! A handler embeds a [`ControllerState`] and exposes it through
//! [`Controller::controller_state`]; every other method has a default. With the
//! `macros` feature of `stoa`, `#[derive(Controller)]` writes the two accessors.
//!
//! # Resolution
//!
//! - [`Controller::find`] looks a key up explicitly.
//! - [`Controller::call_member`] is the entry point for script hosts that route
//!   undeclared member calls: `find_<key>` resolves `<key>`, everything else
//!   fails with [`ResolveError::Unresolved`].
//!
//! Missing collaborators surface at first use, not when the handler is built.
//!
//! [`CapabilityRegistry`]: crate::CapabilityRegistry

use crate::{
    error::ResolveError,
    facade::ContextFacade,
    registry::{Component, RegistryHandle, SharedRegistry, downcast},
    store::AttributeStore,
};
use std::{any::Any, fmt, sync::Arc};

/// Member-name prefix routed to the registry by [`Controller::call_member`].
pub const FINDER_PREFIX: &str = "find_";

/// Per-handler state: injected contexts plus the shared registry slot.
pub struct ControllerState<Rq, Ss = Rq, Ap = Ss>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    request: Option<ContextFacade<Rq>>,
    session: Option<ContextFacade<Ss>>,
    application: Option<ContextFacade<Ap>>,
    registry: RegistryHandle,
}

impl<Rq, Ss, Ap> ControllerState<Rq, Ss, Ap>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    /// Create state with no contexts and a fresh registry slot.
    pub fn new() -> Self {
        Self::with_registry_handle(RegistryHandle::new())
    }

    /// Create state that shares `registry` with other handler instances.
    pub fn with_registry_handle(registry: RegistryHandle) -> Self {
        Self {
            request: None,
            session: None,
            application: None,
            registry,
        }
    }

    /// Fresh state for another instance of the same handler type: no contexts,
    /// same registry slot.
    pub fn fork(&self) -> Self {
        Self::with_registry_handle(self.registry.clone())
    }

    /// The registry slot.
    pub fn registry_handle(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Install the request context, returning the previous one.
    pub fn set_request(&mut self, ctx: ContextFacade<Rq>) -> Option<ContextFacade<Rq>> {
        self.request.replace(ctx)
    }

    /// Install the session context, returning the previous one.
    pub fn set_session(&mut self, ctx: ContextFacade<Ss>) -> Option<ContextFacade<Ss>> {
        self.session.replace(ctx)
    }

    /// Install the application context, returning the previous one.
    pub fn set_application(&mut self, ctx: ContextFacade<Ap>) -> Option<ContextFacade<Ap>> {
        self.application.replace(ctx)
    }

    /// Drop every injected context, keeping the registry slot.
    pub fn clear_contexts(&mut self) {
        self.request = None;
        self.session = None;
        self.application = None;
    }

    /// The request context.
    pub fn request(&self) -> Option<&ContextFacade<Rq>> {
        self.request.as_ref()
    }

    /// The request context, mutably.
    pub fn request_mut(&mut self) -> Option<&mut ContextFacade<Rq>> {
        self.request.as_mut()
    }

    /// The session context.
    pub fn session(&self) -> Option<&ContextFacade<Ss>> {
        self.session.as_ref()
    }

    /// The session context, mutably.
    pub fn session_mut(&mut self) -> Option<&mut ContextFacade<Ss>> {
        self.session.as_mut()
    }

    /// The application context.
    pub fn application(&self) -> Option<&ContextFacade<Ap>> {
        self.application.as_ref()
    }

    /// The application context, mutably.
    pub fn application_mut(&mut self) -> Option<&mut ContextFacade<Ap>> {
        self.application.as_mut()
    }
}

impl<Rq, Ss, Ap> Default for ControllerState<Rq, Ss, Ap>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Rq, Ss, Ap> fmt::Debug for ControllerState<Rq, Ss, Ap>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerState")
            .field("request", &self.request.is_some())
            .field("session", &self.session.is_some())
            .field("application", &self.application.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Names the store types of a [`ControllerState`].
///
/// Lets `#[derive(Controller)]` fill in the associated store types from the
/// field type alone.
pub trait ControllerStores {
    /// Store behind the request context.
    type Request: AttributeStore;
    /// Store behind the session context.
    type Session: AttributeStore;
    /// Store behind the application context.
    type Application: AttributeStore;
}

impl<Rq, Ss, Ap> ControllerStores for ControllerState<Rq, Ss, Ap>
where
    Rq: AttributeStore,
    Ss: AttributeStore,
    Ap: AttributeStore,
{
    type Request = Rq;
    type Session = Ss;
    type Application = Ap;
}

/// A handler with injected contexts and registry-backed collaborator lookup.
///
/// # Example
///
/// ```rust,ignore
/// struct CheckoutController {
///     state: ControllerState<Arc<MemoryStore>>,
/// }
///
/// impl Controller for CheckoutController {
///     type RequestStore = Arc<MemoryStore>;
///     type SessionStore = Arc<MemoryStore>;
///     type ApplicationStore = Arc<MemoryStore>;
///
///     fn controller_state(&self) -> &ControllerState<Arc<MemoryStore>> { &self.state }
///     fn controller_state_mut(&mut self) -> &mut ControllerState<Arc<MemoryStore>> { &mut self.state }
/// }
///
/// let mailer = controller.find_as::<Mailer>("mailer")?;
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a controller",
    label = "missing `Controller` implementation",
    note = "Embed a `ControllerState` and `#[derive(Controller)]`, or implement the two state accessors."
)]
pub trait Controller {
    /// Store behind the request context.
    type RequestStore: AttributeStore;
    /// Store behind the session context.
    type SessionStore: AttributeStore;
    /// Store behind the application context.
    type ApplicationStore: AttributeStore;

    /// The embedded state.
    fn controller_state(
        &self,
    ) -> &ControllerState<Self::RequestStore, Self::SessionStore, Self::ApplicationStore>;

    /// The embedded state, mutably.
    fn controller_state_mut(
        &mut self,
    ) -> &mut ControllerState<Self::RequestStore, Self::SessionStore, Self::ApplicationStore>;

    /// Install the request context.
    fn set_request_context(&mut self, ctx: ContextFacade<Self::RequestStore>) {
        self.controller_state_mut().set_request(ctx);
    }

    /// Install the session context.
    fn set_session_context(&mut self, ctx: ContextFacade<Self::SessionStore>) {
        self.controller_state_mut().set_session(ctx);
    }

    /// Install the application context.
    fn set_application_context(&mut self, ctx: ContextFacade<Self::ApplicationStore>) {
        self.controller_state_mut().set_application(ctx);
    }

    /// The request context.
    fn request(&self) -> Option<&ContextFacade<Self::RequestStore>> {
        self.controller_state().request()
    }

    /// The request context, mutably.
    fn request_mut(&mut self) -> Option<&mut ContextFacade<Self::RequestStore>> {
        self.controller_state_mut().request_mut()
    }

    /// The session context.
    fn session(&self) -> Option<&ContextFacade<Self::SessionStore>> {
        self.controller_state().session()
    }

    /// The session context, mutably.
    fn session_mut(&mut self) -> Option<&mut ContextFacade<Self::SessionStore>> {
        self.controller_state_mut().session_mut()
    }

    /// The application context.
    fn application(&self) -> Option<&ContextFacade<Self::ApplicationStore>> {
        self.controller_state().application()
    }

    /// The application context, mutably.
    fn application_mut(&mut self) -> Option<&mut ContextFacade<Self::ApplicationStore>> {
        self.controller_state_mut().application_mut()
    }

    /// Drop every injected context at the end of a request.
    fn release_contexts(&mut self) {
        self.controller_state_mut().clear_contexts();
    }

    /// Install `registry` for every instance sharing this handler's slot.
    fn set_registry(&self, registry: SharedRegistry) {
        self.controller_state().registry_handle().install(registry);
    }

    /// The installed registry.
    fn registry(&self) -> Option<SharedRegistry> {
        self.controller_state().registry_handle().current()
    }

    /// Resolve the collaborator registered under `key`.
    fn find(&self, key: &str) -> Result<Component, ResolveError> {
        let name = format!("{FINDER_PREFIX}{key}");
        let registry = self
            .registry()
            .ok_or_else(|| ResolveError::RegistryNotInstalled { name: name.clone() })?;
        registry.resolve(key).ok_or(ResolveError::Unresolved {
            name,
            args: Vec::new(),
        })
    }

    /// Resolve the collaborator registered under `key` as a `T`.
    fn find_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ResolveError> {
        let component = self.find(key)?;
        downcast::<T>(component).ok_or_else(|| ResolveError::TypeMismatch {
            key: key.to_owned(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Dispatch an undeclared member call.
    ///
    /// `find_<key>` resolves `<key>` from the registry; a miss, or any other
    /// name, fails with [`ResolveError::Unresolved`] carrying `name` and `args`.
    fn call_member(
        &self,
        name: &str,
        args: &[&dyn fmt::Debug],
    ) -> Result<Component, ResolveError> {
        let unresolved = || ResolveError::Unresolved {
            name: name.to_owned(),
            args: args.iter().map(|arg| format!("{arg:?}")).collect(),
        };

        let Some(key) = name.strip_prefix(FINDER_PREFIX) else {
            return Err(unresolved());
        };
        let registry = self
            .registry()
            .ok_or_else(|| ResolveError::RegistryNotInstalled {
                name: name.to_owned(),
            })?;
        registry.resolve(key).ok_or_else(unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::KeyIdentity, store::AttributeStore};

    struct NullStore;

    impl AttributeStore for NullStore {
        type Value = ();

        fn attribute_names(&self) -> Vec<KeyIdentity> {
            Vec::new()
        }

        fn attribute(&self, _key: &KeyIdentity) -> Option<()> {
            None
        }

        fn set_attribute(&self, _key: &KeyIdentity, _value: ()) {}
    }

    #[derive(Debug, PartialEq)]
    struct Mailer(&'static str);

    #[derive(Default)]
    struct Plain {
        state: ControllerState<NullStore>,
    }

    impl Controller for Plain {
        type RequestStore = NullStore;
        type SessionStore = NullStore;
        type ApplicationStore = NullStore;

        fn controller_state(&self) -> &ControllerState<NullStore> {
            &self.state
        }

        fn controller_state_mut(&mut self) -> &mut ControllerState<NullStore> {
            &mut self.state
        }
    }

    fn mailer_registry() -> SharedRegistry {
        Arc::new(|key: &str| (key == "mailer").then(|| Arc::new(Mailer("smtp")) as Component))
    }

    #[test]
    fn test_find_convention_resolves_registered_key() {
        let handler = Plain::default();
        handler.set_registry(mailer_registry());

        let found = handler.call_member("find_mailer", &[]).unwrap();
        assert_eq!(downcast::<Mailer>(found).as_deref(), Some(&Mailer("smtp")));
    }

    #[test]
    fn test_find_convention_miss_is_unresolved() {
        let handler = Plain::default();
        handler.set_registry(mailer_registry());

        let err = handler.call_member("find_logger", &[&42]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unresolved {
                name: "find_logger".into(),
                args: vec!["42".into()],
            }
        );
    }

    #[test]
    fn test_other_members_fall_through() {
        let handler = Plain::default();
        handler.set_registry(mailer_registry());

        let err = handler.call_member("mailer", &[]).unwrap_err();
        assert_eq!(err.member_name(), Some("mailer"));
        assert!(matches!(err, ResolveError::Unresolved { .. }));

        // Non-finder names fail the same way with no registry at all.
        let bare = Plain::default();
        assert!(matches!(
            bare.call_member("save", &[&"x"]),
            Err(ResolveError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_finder_without_registry() {
        let handler = Plain::default();
        assert_eq!(
            handler.find("mailer").unwrap_err(),
            ResolveError::RegistryNotInstalled {
                name: "find_mailer".into()
            }
        );
    }

    #[test]
    fn test_find_as_checks_type() {
        let handler = Plain::default();
        handler.set_registry(mailer_registry());

        assert_eq!(*handler.find_as::<Mailer>("mailer").unwrap(), Mailer("smtp"));
        assert!(matches!(
            handler.find_as::<String>("mailer"),
            Err(ResolveError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_forked_state_shares_registry() {
        let first = Plain::default();
        let second = Plain {
            state: first.state.fork(),
        };
        first.set_registry(mailer_registry());
        assert!(second.find("mailer").is_ok());
    }
}

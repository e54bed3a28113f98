use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod controller;

/// Derive macro for implementing the `Controller` trait.
///
/// The struct must embed exactly one `ControllerState`. It is found by type
/// name, or can be marked explicitly with `#[controller]`.
///
/// ```rust,ignore
/// #[derive(Controller)]
/// struct CheckoutController {
///     #[controller]
///     state: ControllerState<Arc<MemoryStore>>,
///     retries: u8,
/// }
/// ```
#[proc_macro_derive(Controller, attributes(controller))]
pub fn derive_controller(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    controller::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

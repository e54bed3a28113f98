//! `#[derive(Controller)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Index, Member, Type};

const STATE_TYPE: &str = "ControllerState";

fn is_marked(field: &Field) -> bool {
    field
        .attrs
        .iter()
        .any(|attr| attr.path().is_ident("controller"))
}

fn is_state_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == STATE_TYPE),
        _ => false,
    }
}

fn member_of(index: usize, field: &Field) -> Member {
    match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(Index::from(index)),
    }
}

/// Pick the state field: the `#[controller]` one if any, else the only field
/// typed `ControllerState`.
fn state_field<'a>(input: &'a DeriveInput) -> syn::Result<(Member, &'a Type)> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect(),
            Fields::Unit => Vec::new(),
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Controller can only be derived for structs",
            ));
        }
    };

    let indexed: Vec<(usize, &'a Field)> = fields.into_iter().enumerate().collect();
    let marked: Vec<(usize, &'a Field)> = indexed
        .iter()
        .copied()
        .filter(|(_, field)| is_marked(field))
        .collect();
    let candidates = if marked.is_empty() {
        indexed
            .iter()
            .copied()
            .filter(|(_, field)| is_state_type(&field.ty))
            .collect()
    } else {
        marked
    };

    match candidates.as_slice() {
        [(index, field)] => {
            let field: &'a Field = *field;
            Ok((member_of(*index, field), &field.ty))
        }
        [] => Err(syn::Error::new_spanned(
            &input.ident,
            "Controller needs a `ControllerState` field (mark it with #[controller])",
        )),
        [_, (_, extra), ..] => Err(syn::Error::new_spanned(
            extra,
            "more than one controller state field; mark one with #[controller]",
        )),
    }
}

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let (member, ty) = state_field(input)?;

    Ok(quote! {
        impl #impl_generics ::stoa::Controller for #name #ty_generics #where_clause {
            type RequestStore = <#ty as ::stoa::ControllerStores>::Request;
            type SessionStore = <#ty as ::stoa::ControllerStores>::Session;
            type ApplicationStore = <#ty as ::stoa::ControllerStores>::Application;

            fn controller_state(
                &self,
            ) -> &::stoa::ControllerState<
                Self::RequestStore,
                Self::SessionStore,
                Self::ApplicationStore,
            > {
                &self.#member
            }

            fn controller_state_mut(
                &mut self,
            ) -> &mut ::stoa::ControllerState<
                Self::RequestStore,
                Self::SessionStore,
                Self::ApplicationStore,
            > {
                &mut self.#member
            }
        }
    })
}

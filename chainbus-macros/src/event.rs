use crate::field_utils::ensure_field;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Ident, Item, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[event] 宏实现
/// - 若缺失则追加 `state: ::chainbus::event::EventState` 字段（字段名可由 `state = ..` 指定）
/// - 自动实现 `::chainbus::event::Event`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EventAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        // 错误指向类型名
        Item::Enum(e) => return not_a_struct(e.ident.span()),
        Item::Union(u) => return not_a_struct(u.ident.span()),
        other => return not_a_struct(other.span()),
    };

    // 仅支持具名字段结构体
    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.ident.span(), "#[event] supports only named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let state_field = cfg
        .state
        .unwrap_or_else(|| Ident::new("state", proc_macro2::Span::call_site()));
    let state_ty: Type = syn::parse_quote! { ::chainbus::event::EventState };
    ensure_field(fields_named, &st.vis, &state_field, &state_ty);

    let ident = &st.ident;
    let kind = cfg
        .kind
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let generics = st.generics.clone();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        #st

        impl #impl_generics ::chainbus::event::Event for #ident #ty_generics #where_clause {
            const KIND: &'static str = #kind;

            fn state(&self) -> &::chainbus::event::EventState {
                &self.#state_field
            }

            fn state_mut(&mut self) -> &mut ::chainbus::event::EventState {
                &mut self.#state_field
            }
        }
    };

    TokenStream::from(expanded)
}

fn not_a_struct(span: proc_macro2::Span) -> TokenStream {
    syn::Error::new(span, "#[event] only on struct")
        .to_compile_error()
        .into()
}

// -------- parsing --------

struct EventAttrConfig {
    kind: Option<LitStr>,
    state: Option<Ident>,
}

impl Parse for EventAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut kind: Option<LitStr> = None;
        let mut state: Option<Ident> = None;

        if input.is_empty() {
            return Ok(Self { kind, state });
        }

        let elems: Punctuated<EventAttrElem, Token![,]> =
            Punctuated::<EventAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            match elem {
                EventAttrElem::Kind(lit) => {
                    if kind.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'kind' in attribute",
                        ));
                    }
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'kind' must not be empty"));
                    }
                    kind = Some(lit);
                }
                EventAttrElem::State(ident) => {
                    if state.is_some() {
                        return Err(syn::Error::new(
                            ident.span(),
                            "duplicate key 'state' in attribute",
                        ));
                    }
                    state = Some(ident);
                }
            }
        }

        Ok(Self { kind, state })
    }
}

enum EventAttrElem {
    Kind(LitStr),
    State(Ident),
}

impl Parse for EventAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "kind" {
            Ok(EventAttrElem::Kind(input.parse()?))
        } else if key == "state" {
            Ok(EventAttrElem::State(input.parse()?))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'kind' or 'state'",
            ))
        }
    }
}

use crate::args::MacroArgs;
use crate::derives::ensure_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Fields, ItemStruct, parse_macro_input};

/// #[entity_id] 宏实现
/// 仅支持单字段 tuple struct，为包装类型：
/// - 合并派生：Default, Clone, Debug（可关闭）, Serialize, Deserialize, PartialEq, Eq, Hash
/// - 提供 new/into_inner、Display、FromStr、AsRef、From 等便捷实现
/// - 实现 `::catalog_domain::entity::Identifier`，内部值等于默认值时视为未分配
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let st = parse_macro_input!(item as ItemStruct);

    match build(args, st) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn build(args: MacroArgs, mut st: ItemStruct) -> syn::Result<proc_macro2::TokenStream> {
    args.only(&["debug"])?;
    let derive_debug = args.flag("debug", true)?;

    let inner_ty = match &st.fields {
        Fields::Unnamed(f) if f.unnamed.len() == 1 => f.unnamed[0].ty.clone(),
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[entity_id] requires a tuple struct with exactly one field, e.g. struct X(Uuid);",
            ));
        }
    };

    let mut wanted: Vec<syn::Path> = vec![
        syn::parse_quote!(Default),
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
        syn::parse_quote!(Hash),
        syn::parse_quote!(::serde::Serialize),
        syn::parse_quote!(::serde::Deserialize),
    ];
    if derive_debug {
        wanted.insert(2, syn::parse_quote!(Debug));
    }
    ensure_derives(&mut st.attrs, &wanted);

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics #ident #ty_generics #where_clause {
            pub fn new(value: #inner_ty) -> Self { Self(value) }

            pub fn into_inner(self) -> #inner_ty { self.0 }
        }

        impl #impl_generics ::std::str::FromStr for #ident #ty_generics #where_clause {
            type Err = <#inner_ty as ::std::str::FromStr>::Err;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                ::std::result::Result::Ok(Self(s.parse()?))
            }
        }

        impl #impl_generics ::std::fmt::Display for #ident #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl #impl_generics ::std::convert::AsRef<#inner_ty> for #ident #ty_generics #where_clause {
            fn as_ref(&self) -> &#inner_ty { &self.0 }
        }

        impl #impl_generics ::std::convert::From<#inner_ty> for #ident #ty_generics #where_clause {
            fn from(value: #inner_ty) -> Self { Self(value) }
        }

        impl #impl_generics ::catalog_domain::entity::Identifier for #ident #ty_generics #where_clause {
            fn is_unassigned(&self) -> bool {
                self.0 == <#inner_ty as ::std::default::Default>::default()
            }
        }
    })
}

use crate::args::MacroArgs;
use crate::derives::ensure_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Field, Fields, ItemStruct, Token, Type, parse_macro_input};

/// #[entity] 宏实现
/// - 在字段最前插入 `id: IdType` 与 `version: i64`（已存在的同名字段会被替换），可见性与结构体一致
/// - 合并派生：Debug（可关闭）、Clone、Serialize、Deserialize
/// - 实现 `::catalog_domain::entity::Entity`（id/version/with_version）
/// - 参数：`#[entity(id = IdType, debug = true|false)]`，`id` 默认 `String`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let st = parse_macro_input!(item as ItemStruct);

    match build(args, st) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn build(args: MacroArgs, mut st: ItemStruct) -> syn::Result<proc_macro2::TokenStream> {
    args.only(&["id", "debug"])?;
    let id_ty: Type = args.ty("id")?.unwrap_or_else(|| syn::parse_quote!(String));
    let derive_debug = args.flag("debug", true)?;

    let vis = st.vis.clone();
    let Fields::Named(named) = &mut st.fields else {
        return Err(syn::Error::new(
            st.span(),
            "#[entity] supports only structs with named fields",
        ));
    };

    let mut fields: Punctuated<Field, Token![,]> = Punctuated::new();
    fields.push(syn::parse_quote!(#vis id: #id_ty));
    fields.push(syn::parse_quote!(#vis version: i64));
    for f in named.named.iter() {
        let reserved = f.ident.as_ref().is_some_and(|i| i == "id" || i == "version");
        if !reserved {
            fields.push(f.clone());
        }
    }
    named.named = fields;

    let mut wanted: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(::serde::Serialize),
        syn::parse_quote!(::serde::Deserialize),
    ];
    if derive_debug {
        wanted.insert(0, syn::parse_quote!(Debug));
    }
    ensure_derives(&mut st.attrs, &wanted);

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics ::catalog_domain::entity::Entity for #ident #ty_generics #where_clause {
            type Id = #id_ty;

            fn id(&self) -> &Self::Id { &self.id }

            fn version(&self) -> i64 { self.version }

            fn with_version(self, version: i64) -> Self {
                Self { version, ..self }
            }
        }
    })
}

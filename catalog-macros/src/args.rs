use quote::ToTokens;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Lit, MetaNameValue, Result, Token, Type};

/// 属性参数：`key = value` 列表
pub(crate) struct MacroArgs {
    pairs: Vec<MetaNameValue>,
}

impl Parse for MacroArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let list = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;
        let mut pairs: Vec<MetaNameValue> = Vec::new();
        for nv in list {
            if pairs.iter().any(|p| key_of(p) == key_of(&nv)) {
                return Err(syn::Error::new(
                    nv.path.span(),
                    format!("duplicate key '{}' in attribute", key_of(&nv)),
                ));
            }
            pairs.push(nv);
        }
        Ok(Self { pairs })
    }
}

impl MacroArgs {
    /// 拒绝不在 `allowed` 中的键
    pub(crate) fn only(&self, allowed: &[&str]) -> Result<()> {
        for nv in &self.pairs {
            let key = key_of(nv);
            if !allowed.contains(&key.as_str()) {
                return Err(syn::Error::new(
                    nv.path.span(),
                    format!("unknown key '{key}'; expected one of: {}", allowed.join(", ")),
                ));
            }
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&Expr> {
        self.pairs
            .iter()
            .find(|nv| nv.path.is_ident(key))
            .map(|nv| &nv.value)
    }

    pub(crate) fn ty(&self, key: &str) -> Result<Option<Type>> {
        self.get(key)
            .map(|expr| syn::parse2::<Type>(expr.to_token_stream()))
            .transpose()
    }

    pub(crate) fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Expr::Lit(lit)) => match &lit.lit {
                Lit::Bool(b) => Ok(b.value()),
                other => Err(syn::Error::new(
                    other.span(),
                    format!("expected boolean literal for '{key}'"),
                )),
            },
            Some(other) => Err(syn::Error::new(
                other.span(),
                format!("expected boolean literal for '{key}'"),
            )),
        }
    }
}

fn key_of(nv: &MetaNameValue) -> String {
    nv.path.to_token_stream().to_string()
}

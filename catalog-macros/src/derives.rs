use syn::punctuated::Punctuated;
use syn::{Attribute, Path, Token};

/// 确保结构体带有给定派生
///
/// 已声明的派生按末段名称去重（`Serialize` 与 `serde::Serialize` 视为同一项），
/// 缺失的派生追加到一个新的 `#[derive]` 属性中，置于其他属性之前。
pub(crate) fn ensure_derives(attrs: &mut Vec<Attribute>, wanted: &[Path]) {
    let declared: Vec<String> = attrs
        .iter()
        .filter(|a| a.path().is_ident("derive"))
        .filter_map(|a| {
            a.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .filter_map(|p| last_segment(&p))
        .collect();

    let missing: Vec<&Path> = wanted
        .iter()
        .filter(|p| {
            last_segment(p)
                .map(|name| !declared.contains(&name))
                .unwrap_or(true)
        })
        .collect();

    if missing.is_empty() {
        return;
    }

    attrs.insert(0, syn::parse_quote!(#[derive(#(#missing),*)]));
}

fn last_segment(path: &Path) -> Option<String> {
    path.segments.last().map(|s| s.ident.to_string())
}

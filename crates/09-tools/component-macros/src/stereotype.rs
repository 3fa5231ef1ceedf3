//! 派生构造型宏实现

use crate::utils::{lit_str, to_snake_case};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Error, Expr, Fields, Ident, ItemStruct, Result};

/// 实现 `#[stereotype(meta = ["controller"])]`
///
/// 标记名是结构体名的蛇形形式，例如 `RestController` -> `rest_controller`。
pub fn stereotype_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = match syn::parse::<ItemStruct>(input) {
        Ok(item) => item,
        Err(e) => return e.to_compile_error().into(),
    };

    let mut meta = Vec::new();
    let parser = syn::meta::parser(|nested| {
        if nested.path.is_ident("meta") {
            let value: Expr = nested.value()?.parse()?;
            let Expr::Array(array) = &value else {
                return Err(Error::new_spanned(&value, "meta 需要字符串数组"));
            };
            for element in &array.elems {
                meta.push(lit_str(element)?.value());
            }
            Ok(())
        } else {
            Err(nested.error("stereotype 只支持 meta 参数"))
        }
    });
    if let Err(e) = syn::parse::Parser::parse(parser, args) {
        return e.to_compile_error().into();
    }

    expand(&item, &meta)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand(item: &ItemStruct, meta: &[String]) -> Result<TokenStream2> {
    if !matches!(item.fields, Fields::Unit) {
        return Err(Error::new_spanned(&item.ident, "构造型必须声明为单元结构体"));
    }

    let marker = to_snake_case(&item.ident.to_string());
    let registration_fn_name = Ident::new(
        &format!("__register_stereotype_{marker}"),
        Span::call_site(),
    );
    let ident = &item.ident;

    Ok(quote! {
        #item

        impl #ident {
            /// 标记名
            pub const MARKER: &'static str = #marker;
        }

        #[ctor::ctor]
        fn #registration_fn_name() {
            ::ioc_common::global_annotation_index().register(#marker, &[#(#meta),*]);
        }
    })
}

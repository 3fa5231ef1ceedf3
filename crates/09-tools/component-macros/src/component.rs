//! 组件注册宏实现

use crate::utils::{
    attribute_name, attribute_value, extract_generic_type, is_arc_type, is_option_type,
    lit_bool, lit_str, parse_request_mapping, take_attribute, to_snake_case,
};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, punctuated::Punctuated, Error, Expr, Field, Ident,
    ItemStruct, LitStr, Meta, Result, Token,
};

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentScope {
    Singleton,
    Prototype,
}

/// 组件参数
#[derive(Debug, Clone, Default)]
pub struct ComponentArgs {
    /// 自定义 Bean 名称
    pub name: Option<String>,
    /// 声明的作用域
    pub scope: Option<ComponentScope>,
    /// 类型实现了 `DisposableBean`
    pub disposable: bool,
    /// 自定义零参构造函数
    pub constructor: Option<Ident>,
    /// 额外的标记注解
    pub annotations: Vec<String>,
    /// 替换主标记的派生构造型
    pub stereotype: Option<String>,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = ComponentArgs::default();

        if input.peek(LitStr) {
            args.name = Some(input.parse::<LitStr>()?.value());
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;
        for meta in parsed {
            match &meta {
                Meta::Path(path) if path.is_ident("disposable") => args.disposable = true,
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    args.name = Some(lit_str(&nv.value)?.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("scope") => {
                    let lit = lit_str(&nv.value)?;
                    args.scope = Some(match lit.value().as_str() {
                        "singleton" => ComponentScope::Singleton,
                        "prototype" => ComponentScope::Prototype,
                        _ => {
                            return Err(Error::new(
                                lit.span(),
                                "scope 只能是 \"singleton\" 或 \"prototype\"",
                            ))
                        }
                    });
                }
                Meta::NameValue(nv) if nv.path.is_ident("constructor") => {
                    args.constructor = Some(lit_str(&nv.value)?.parse::<Ident>()?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("stereotype") => {
                    args.stereotype = Some(lit_str(&nv.value)?.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("annotations") => {
                    let Expr::Array(array) = &nv.value else {
                        return Err(Error::new_spanned(&nv.value, "annotations 需要字符串数组"));
                    };
                    for element in &array.elems {
                        args.annotations.push(lit_str(element)?.value());
                    }
                }
                _ => return Err(Error::new_spanned(meta, "未知的组件参数")),
            }
        }

        Ok(args)
    }
}

/// 实现 `#[component]`、`#[service]`、`#[controller]`
///
/// `marker` 是主标记常量的路径，例如 `::ioc_common::markers::SERVICE`。
pub fn component_impl(marker: TokenStream2, args: TokenStream, input: TokenStream) -> TokenStream {
    let component_args = if args.is_empty() {
        ComponentArgs::default()
    } else {
        match syn::parse::<ComponentArgs>(args) {
            Ok(args) => args,
            Err(e) => return e.to_compile_error().into(),
        }
    };

    let input_struct = match syn::parse::<ItemStruct>(input) {
        Ok(item) => item,
        Err(e) => return e.to_compile_error().into(),
    };

    expand(marker, component_args, input_struct)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand(
    marker: TokenStream2,
    args: ComponentArgs,
    mut input_struct: ItemStruct,
) -> Result<TokenStream2> {
    if !input_struct.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input_struct.generics,
            "组件不能带泛型参数",
        ));
    }

    let struct_name = input_struct.ident.clone();
    let simple_name = struct_name.to_string();

    // 主标记；有自定义名称时作为注解值
    let primary = match &args.stereotype {
        Some(stereotype) => quote! { ::ioc_common::Annotation::new(#stereotype) },
        None => quote! { ::ioc_common::Annotation::new(#marker) },
    };
    let primary = match &args.name {
        Some(name) => quote! { #primary.with_value(#name) },
        None => primary,
    };

    let extra_markers = args.annotations.iter().map(|name| quote! { .marker(#name) });

    let request_mapping = match take_attribute(&mut input_struct.attrs, "request_mapping") {
        Some(attr) => {
            let path = parse_request_mapping(&attr)?;
            Some(quote! {
                .annotation(
                    ::ioc_common::Annotation::new(::ioc_common::markers::REQUEST_MAPPING)
                        .with_value(#path)
                )
            })
        }
        None => None,
    };

    let platform = input_struct
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("doc"))
        .map(|attr| {
            let name = attribute_name(attr);
            match attribute_value(attr) {
                Some(value) => quote! {
                    .annotation(::ioc_common::Annotation::platform(#name).with_value(#value))
                },
                None => quote! { .annotation(::ioc_common::Annotation::platform(#name)) },
            }
        })
        .collect::<Vec<_>>();

    let scope = match args.scope {
        Some(ComponentScope::Prototype) => {
            Some(quote! { .scope(::ioc_common::BeanScope::Prototype) })
        }
        Some(ComponentScope::Singleton) => {
            Some(quote! { .scope(::ioc_common::BeanScope::Singleton) })
        }
        None => None,
    };

    let mut fields = Vec::new();
    for field in input_struct.fields.iter_mut() {
        if let Some(tokens) = autowired_field(&struct_name, field)? {
            fields.push(tokens);
        }
    }

    let constructor = match &args.constructor {
        Some(function) => quote! {
            .constructor(<#struct_name>::#function as fn() -> ::std::result::Result<#struct_name, _>)
        },
        None => quote! { .default_constructor() },
    };

    let disposable = args.disposable.then(|| quote! { .disposable() });

    let registration_fn_name = Ident::new(
        &format!("__register_component_{}", to_snake_case(&simple_name)),
        Span::call_site(),
    );

    Ok(quote! {
        #input_struct

        // 程序启动时把类型描述符注册到全局类型注册表
        #[ctor::ctor]
        fn #registration_fn_name() {
            let descriptor = ::ioc_common::TypeDescriptor::builder::<#struct_name>(
                ::std::module_path!(),
                #simple_name,
            )
            .annotation(#primary)
            #(#extra_markers)*
            #request_mapping
            #(#platform)*
            #scope
            #(#fields)*
            #constructor
            #disposable
            .build();

            ::ioc_common::global_type_registry().register_type(descriptor);
        }
    })
}

/// 处理 `#[autowired]` 字段，返回字段描述符的构建代码
fn autowired_field(struct_name: &Ident, field: &mut Field) -> Result<Option<TokenStream2>> {
    let Some(attr) = take_attribute(&mut field.attrs, "autowired") else {
        return Ok(None);
    };

    let mut required = true;
    if let Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("required") {
                let value: Expr = meta.value()?.parse()?;
                required = lit_bool(&value)?.value;
                Ok(())
            } else {
                Err(meta.error("autowired 只支持 required 参数"))
            }
        })?;
    }

    let Some(field_name) = field.ident.clone() else {
        return Err(Error::new_spanned(&attr, "autowired 只能用于具名字段"));
    };

    let dependency = is_option_type(&field.ty)
        .then(|| extract_generic_type(&field.ty))
        .flatten()
        .filter(|inner| is_arc_type(inner))
        .and_then(extract_generic_type)
        .ok_or_else(|| Error::new_spanned(&field.ty, "autowired 字段的类型必须是 Option<Arc<T>>"))?;

    let name = field_name.to_string();
    Ok(Some(quote! {
        .field(::ioc_common::FieldDescriptor::autowired::<#struct_name, #dependency>(
            #name,
            #required,
            |bean, dependency| bean.#field_name = ::std::option::Option::Some(dependency),
        ))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_args_defaults() {
        let args: ComponentArgs = syn::parse_str("").unwrap();
        assert_eq!(args.name, None);
        assert_eq!(args.scope, None);
        assert!(!args.disposable);
        assert!(args.annotations.is_empty());
    }

    #[test]
    fn test_component_args_full() {
        let args: ComponentArgs = syn::parse_str(
            r#""repo", scope = "prototype", disposable, constructor = "connect", annotations = ["audited"]"#,
        )
        .unwrap();
        assert_eq!(args.name.as_deref(), Some("repo"));
        assert_eq!(args.scope, Some(ComponentScope::Prototype));
        assert!(args.disposable);
        assert_eq!(args.constructor.unwrap().to_string(), "connect");
        assert_eq!(args.annotations, vec!["audited".to_string()]);
    }

    #[test]
    fn test_component_args_rejects_unknown_scope() {
        assert!(syn::parse_str::<ComponentArgs>(r#"scope = "session""#).is_err());
        assert!(syn::parse_str::<ComponentArgs>("lazy").is_err());
    }

    #[test]
    fn test_autowired_requires_option_arc() {
        let struct_name: Ident = syn::parse_str("Consumer").unwrap();
        let item: ItemStruct = syn::parse_quote! {
            struct Consumer {
                #[autowired(required = false)]
                service: Option<Arc<Service>>,
                #[autowired]
                raw: Arc<Service>,
                plain: u32,
            }
        };
        let mut fields: Vec<Field> = item.fields.into_iter().collect();

        assert!(autowired_field(&struct_name, &mut fields[0]).unwrap().is_some());
        assert!(fields[0].attrs.is_empty());
        assert!(autowired_field(&struct_name, &mut fields[1]).is_err());
        assert!(autowired_field(&struct_name, &mut fields[2]).unwrap().is_none());
    }
}

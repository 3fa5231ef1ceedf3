//! 处理器方法注册宏实现
//!
//! 为 `#[handlers]` 块中每个带 `#[request_mapping]` 的方法生成一个统一签名的调用入口，
//! 并把方法描述符登记到全局类型注册表。

use crate::utils::{
    attribute_name, attribute_value, is_reference_to, lit_bool, lit_str, parse_request_mapping,
    simple_type_name, take_attribute, to_snake_case, type_text,
};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse::ParseStream, punctuated::Punctuated, Attribute, Error, FnArg, Ident, ImplItem,
    ImplItemFn, ItemImpl, LitStr, Meta, MetaNameValue, Pat, Result, Token, Type,
};

/// 可以直接转换的请求参数类型
const SCALAR_TYPES: [&str; 5] = ["String", "i32", "i64", "f64", "bool"];

/// 参数绑定方式
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Request,
    Response,
    RequestParam {
        name: String,
        required: bool,
        default_value: Option<String>,
    },
    Unbound,
}

/// 处理器参数
struct HandlerParameter {
    name: String,
    ty: Type,
    binding: Binding,
}

impl HandlerParameter {
    fn is_scalar(&self) -> bool {
        simple_type_name(&self.ty).is_some_and(|name| SCALAR_TYPES.contains(&name.as_str()))
    }

    fn is_bindable(&self) -> bool {
        matches!(self.binding, Binding::Request | Binding::Response) || self.is_scalar()
    }
}

/// 处理器方法
struct HandlerMethod {
    ident: Ident,
    path: String,
    platform: Vec<(String, Option<String>)>,
    parameters: Vec<HandlerParameter>,
}

/// 实现 `#[handlers]`
pub fn handlers_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return Error::new(Span::call_site(), "#[handlers] 不接受参数")
            .to_compile_error()
            .into();
    }

    let item = match syn::parse::<ItemImpl>(input) {
        Ok(item) => item,
        Err(e) => return e.to_compile_error().into(),
    };

    expand(item).unwrap_or_else(Error::into_compile_error).into()
}

fn expand(mut item: ItemImpl) -> Result<TokenStream2> {
    if item.trait_.is_some() {
        return Err(Error::new_spanned(&item.self_ty, "#[handlers] 只能用于固有 impl 块"));
    }
    if !item.generics.params.is_empty() {
        return Err(Error::new_spanned(&item.generics, "#[handlers] 不支持泛型 impl 块"));
    }

    let self_ty = (*item.self_ty).clone();
    let type_name = simple_type_name(&self_ty)
        .ok_or_else(|| Error::new_spanned(&self_ty, "#[handlers] 需要具名的非泛型类型"))?;

    let mut methods = Vec::new();
    for impl_item in item.items.iter_mut() {
        if let ImplItem::Fn(method) = impl_item {
            if let Some(handler) = HandlerMethod::take_from(method)? {
                methods.push(handler);
            }
        }
    }

    let invokers = methods.iter().map(HandlerMethod::invoker);
    let descriptors = methods.iter().map(|method| method.descriptor(&self_ty));
    let registration_fn_name = Ident::new(
        &format!("__register_handlers_{}", to_snake_case(&type_name)),
        Span::call_site(),
    );

    Ok(quote! {
        #item

        impl #self_ty {
            #(#invokers)*
        }

        // 程序启动时登记处理器方法
        #[ctor::ctor]
        fn #registration_fn_name() {
            ::ioc_common::global_type_registry().register_methods::<#self_ty>(::std::vec![
                #(#descriptors),*
            ]);
        }
    })
}

impl HandlerMethod {
    /// 从方法中取出处理器声明并移除辅助属性；没有 `#[request_mapping]` 时返回 `None`
    fn take_from(method: &mut ImplItemFn) -> Result<Option<Self>> {
        let mapping = take_attribute(&mut method.attrs, "request_mapping");

        let mut parameters = Vec::new();
        let mut shared_receiver = false;
        for input in method.sig.inputs.iter_mut() {
            match input {
                FnArg::Receiver(receiver) => {
                    shared_receiver =
                        receiver.reference.is_some() && receiver.mutability.is_none();
                }
                FnArg::Typed(pat_type) => {
                    let name = match pat_type.pat.as_ref() {
                        Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
                        _ => format!("arg{}", parameters.len()),
                    };
                    let request_param = take_attribute(&mut pat_type.attrs, "request_param");
                    let ty = (*pat_type.ty).clone();

                    let binding = if is_reference_to(&ty, "WebRequest", false) {
                        Binding::Request
                    } else if is_reference_to(&ty, "WebResponse", true) {
                        Binding::Response
                    } else if let Some(attr) = request_param {
                        parse_request_param(&attr, &name)?
                    } else {
                        Binding::Unbound
                    };
                    parameters.push(HandlerParameter { name, ty, binding });
                }
            }
        }

        let Some(mapping) = mapping else {
            return Ok(None);
        };
        if !shared_receiver {
            return Err(Error::new_spanned(&method.sig, "处理器方法的接收者必须是 &self"));
        }
        if method.sig.asyncness.is_some() {
            return Err(Error::new_spanned(&method.sig, "处理器方法不能是 async fn"));
        }
        if !method.sig.generics.params.is_empty() {
            return Err(Error::new_spanned(&method.sig.generics, "处理器方法不能带泛型参数"));
        }

        let platform = method
            .attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("doc"))
            .map(|attr| (attribute_name(attr), attribute_value(attr)))
            .collect();

        Ok(Some(Self {
            ident: method.sig.ident.clone(),
            path: parse_request_mapping(&mapping)?,
            platform,
            parameters,
        }))
    }

    fn invoker_ident(&self) -> Ident {
        format_ident!("__mvc_invoke_{}", self.ident)
    }

    /// 统一签名的调用入口，签名与 `web_mvc::HandlerFn` 一致
    fn invoker(&self) -> TokenStream2 {
        let invoker = self.invoker_ident();
        let method = &self.ident;
        let handler = method.to_string();

        let body = match self.parameters.iter().find(|p| !p.is_bindable()) {
            Some(unbindable) => {
                let message = format!(
                    "处理器 {} 的参数 '{}' 无法绑定: {}",
                    handler,
                    unbindable.name,
                    type_text(&unbindable.ty)
                );
                quote! {
                    ::std::result::Result::Err(::std::convert::From::from(#message))
                }
            }
            None => {
                let mut bindings = Vec::new();
                let mut call_args = Vec::new();
                for (index, parameter) in self.parameters.iter().enumerate() {
                    let value = format_ident!("__arg{}", index);
                    match parameter.binding {
                        Binding::Request => {
                            bindings.push(quote! { let _ = __args.next(); });
                            call_args.push(quote! { __request });
                        }
                        Binding::Response => {
                            bindings.push(quote! { let _ = __args.next(); });
                            call_args.push(quote! { __response });
                        }
                        _ => {
                            let ty = &parameter.ty;
                            let name = &parameter.name;
                            bindings.push(quote! {
                                let #value = <#ty as ::web_mvc::FromArgument>::from_argument(
                                    __args.next(),
                                    #name,
                                )?;
                            });
                            call_args.push(quote! { #value });
                        }
                    }
                }
                quote! {
                    let __this = __bean
                        .downcast_ref::<Self>()
                        .ok_or(concat!("处理器类型不匹配: ", stringify!(#method)))?;
                    let mut __args = __args.into_iter();
                    #(#bindings)*
                    ::web_mvc::IntoHandlerResult::into_handler_result(__this.#method(#(#call_args),*))
                }
            }
        };

        quote! {
            #[doc(hidden)]
            #[allow(unused_mut, unused_variables, clippy::needless_question_mark)]
            fn #invoker(
                __bean: &(dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync),
                __args: ::std::vec::Vec<::web_mvc::ArgumentValue>,
                __request: &::web_mvc::WebRequest,
                __response: &mut ::web_mvc::WebResponse,
            ) -> ::std::result::Result<::web_mvc::HandlerResult, ::web_mvc::BoxError> {
                #body
            }
        }
    }

    /// 方法描述符的构建代码
    fn descriptor(&self, self_ty: &Type) -> TokenStream2 {
        let name = self.ident.to_string();
        let path = &self.path;
        let invoker = self.invoker_ident();

        let platform = self.platform.iter().map(|(name, value)| match value {
            Some(value) => quote! {
                .annotation(::ioc_common::Annotation::platform(#name).with_value(#value))
            },
            None => quote! { .annotation(::ioc_common::Annotation::platform(#name)) },
        });

        let parameters = self.parameters.iter().enumerate().map(|(index, parameter)| {
            let param_name = &parameter.name;
            let type_name = type_text(&parameter.ty);
            let scalar = simple_type_name(&parameter.ty).unwrap_or_default();
            let binding = match &parameter.binding {
                Binding::Request => quote! { ::ioc_common::ParameterBinding::PlatformRequest },
                Binding::Response => quote! { ::ioc_common::ParameterBinding::PlatformResponse },
                Binding::Unbound => quote! { ::ioc_common::ParameterBinding::Unbound },
                Binding::RequestParam {
                    name,
                    required: true,
                    ..
                } => quote! {
                    ::ioc_common::ParameterBinding::RequestParam(
                        ::ioc_common::RequestParamBinding::required(
                            #name,
                            ::ioc_common::ScalarType::from_type_name(#scalar),
                        )
                    )
                },
                Binding::RequestParam {
                    name,
                    required: false,
                    default_value,
                } => {
                    let default_value = default_value.clone().unwrap_or_default();
                    quote! {
                        ::ioc_common::ParameterBinding::RequestParam(
                            ::ioc_common::RequestParamBinding::optional(
                                #name,
                                #default_value,
                                ::ioc_common::ScalarType::from_type_name(#scalar),
                            )
                        )
                    }
                }
            };
            quote! {
                .parameter(::ioc_common::MethodParameter::new(#index, #param_name, #type_name, #binding))
            }
        });

        quote! {
            ::ioc_common::MethodDescriptor::new(#name)
                .annotation(
                    ::ioc_common::Annotation::new(::ioc_common::markers::REQUEST_MAPPING)
                        .with_value(#path)
                )
                #(#platform)*
                #(#parameters)*
                .handle(::std::sync::Arc::new(<#self_ty>::#invoker as ::web_mvc::HandlerFn))
        }
    }
}

/// 解析 `#[request_param]`、`#[request_param("id")]` 或
/// `#[request_param(name = "id", required = false, default = "1")]`
fn parse_request_param(attr: &Attribute, parameter_name: &str) -> Result<Binding> {
    let mut name = parameter_name.to_string();
    let mut required = true;
    let mut default_value = None;

    if !matches!(attr.meta, Meta::Path(_)) {
        attr.parse_args_with(|input: ParseStream| {
            if input.peek(LitStr) {
                name = input.parse::<LitStr>()?.value();
                if input.is_empty() {
                    return Ok(());
                }
                input.parse::<Token![,]>()?;
            }

            let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;
            for pair in pairs {
                if pair.path.is_ident("name") || pair.path.is_ident("value") {
                    name = lit_str(&pair.value)?.value();
                } else if pair.path.is_ident("required") {
                    required = lit_bool(&pair.value)?.value;
                } else if pair.path.is_ident("default") {
                    default_value = Some(lit_str(&pair.value)?.value());
                } else {
                    return Err(Error::new_spanned(&pair.path, "未知的 request_param 参数"));
                }
            }
            Ok(())
        })?;
    }

    // 提供默认值即表示可选
    if default_value.is_some() {
        required = false;
    }

    Ok(Binding::RequestParam {
        name,
        required,
        default_value,
    })
}

//! 宏工具函数

use quote::ToTokens;
use syn::{Attribute, Error, Expr, Lit, LitBool, LitStr, Meta, Result, Type};

/// 从类型中提取第一个泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner_type)) = args.args.first() {
                    return Some(inner_type);
                }
            }
        }
    }
    None
}

/// 检查类型是否为 Option<T>
pub fn is_option_type(ty: &Type) -> bool {
    last_segment_is(ty, "Option")
}

/// 检查类型是否为 Arc<T>
pub fn is_arc_type(ty: &Type) -> bool {
    last_segment_is(ty, "Arc")
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

/// 无泛型参数的路径类型的最后一段，例如 `std::string::String` -> `String`
pub fn simple_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            let segment = type_path.path.segments.last()?;
            segment
                .arguments
                .is_empty()
                .then(|| segment.ident.to_string())
        }
        _ => None,
    }
}

/// 检查类型是否为 `&Name`（`mutable` 为真时要求 `&mut Name`）
pub fn is_reference_to(ty: &Type, name: &str, mutable: bool) -> bool {
    match ty {
        Type::Reference(reference) => {
            reference.mutability.is_some() == mutable
                && simple_type_name(&reference.elem).is_some_and(|n| n == name)
        }
        _ => false,
    }
}

/// 把类型渲染为紧凑文本
pub fn type_text(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

/// 将驼峰命名转换为蛇形命名
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            // 前一个字符小写或下一个字符小写时断词
            let prev_is_lower = chars.get(i - 1).is_some_and(|c| c.is_lowercase());
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());

            if prev_is_lower || next_is_lower {
                result.push('_');
            }
        }
        result.push(ch.to_lowercase().next().unwrap_or(ch));
    }

    result
}

/// 属性名（路径的最后一段）
pub fn attribute_name(attr: &Attribute) -> String {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
        .unwrap_or_default()
}

/// 从属性列表中取出名为 `name` 的属性
pub fn take_attribute(attrs: &mut Vec<Attribute>, name: &str) -> Option<Attribute> {
    let position = attrs.iter().position(|attr| attr.path().is_ident(name))?;
    Some(attrs.remove(position))
}

/// 属性参数文本，作为平台注解的值
pub fn attribute_value(attr: &Attribute) -> Option<String> {
    match &attr.meta {
        Meta::Path(_) => None,
        Meta::List(list) => Some(list.tokens.to_string()),
        Meta::NameValue(nv) => Some(nv.value.to_token_stream().to_string()),
    }
}

/// 要求表达式是字符串字面量
pub fn lit_str(expr: &Expr) -> Result<&LitStr> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit) => Ok(lit),
            other => Err(Error::new_spanned(other, "这里需要字符串字面量")),
        },
        other => Err(Error::new_spanned(other, "这里需要字符串字面量")),
    }
}

/// 要求表达式是布尔字面量
pub fn lit_bool(expr: &Expr) -> Result<&LitBool> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Bool(lit) => Ok(lit),
            other => Err(Error::new_spanned(other, "这里需要 true 或 false")),
        },
        other => Err(Error::new_spanned(other, "这里需要 true 或 false")),
    }
}

/// 解析 `#[request_mapping("/path")]`，无参数时路径为空
pub fn parse_request_mapping(attr: &Attribute) -> Result<String> {
    match &attr.meta {
        Meta::Path(_) => Ok(String::new()),
        _ => Ok(attr.parse_args::<LitStr>()?.value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("MyService"), "my_service");
        assert_eq!(to_snake_case("HTTPClient"), "http_client");
        assert_eq!(to_snake_case("RestController"), "rest_controller");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_option_arc_detection() {
        let ty: Type = parse_quote!(Option<Arc<HelloService>>);
        assert!(is_option_type(&ty));
        let inner = extract_generic_type(&ty).unwrap();
        assert!(is_arc_type(inner));
        let target = extract_generic_type(inner).unwrap();
        assert_eq!(simple_type_name(target).as_deref(), Some("HelloService"));
    }

    #[test]
    fn test_reference_detection() {
        let request: Type = parse_quote!(&web_mvc::WebRequest);
        let response: Type = parse_quote!(&mut WebResponse);
        assert!(is_reference_to(&request, "WebRequest", false));
        assert!(!is_reference_to(&request, "WebRequest", true));
        assert!(is_reference_to(&response, "WebResponse", true));
    }

    #[test]
    fn test_simple_type_name() {
        let ty: Type = parse_quote!(std::string::String);
        assert_eq!(simple_type_name(&ty).as_deref(), Some("String"));
        let generic: Type = parse_quote!(Vec<u8>);
        assert_eq!(simple_type_name(&generic), None);
        assert_eq!(type_text(&generic), "Vec<u8>");
    }

    #[test]
    fn test_parse_request_mapping() {
        let attr: Attribute = parse_quote!(#[request_mapping("/user")]);
        assert_eq!(parse_request_mapping(&attr).unwrap(), "/user");
        let bare: Attribute = parse_quote!(#[request_mapping]);
        assert_eq!(parse_request_mapping(&bare).unwrap(), "");
    }
}

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate proc_macro;

use once_cell::sync::Lazy;
use proc_macro::TokenStream;
use quote::ToTokens;
use quote::{format_ident, quote};
use regex::Regex;
use syn::{Attribute, DeriveInput, Ident, parse_macro_input};

static KIND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"kind\s*=\s*"([^"]+)""#).unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bname\s*=\s*"([^"]+)""#).unwrap());
static HOSTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"hosts\s*=\s*\[(?P<inner>[^\]]*)\]").unwrap());

/// 实体种类, 决定注册到哪一张表
#[derive(Debug, Clone, Copy)]
enum EntityKind {
    Service,
    Contest,
    Problem,
}

impl EntityKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "service" => Some(Self::Service),
            "contest" => Some(Self::Contest),
            "problem" => Some(Self::Problem),
            _ => None,
        }
    }

    /// 对应的 `RegistryItem` 变体与实体特型同名
    fn ident(self) -> Ident {
        match self {
            Self::Service => format_ident!("Service"),
            Self::Contest => format_ident!("Contest"),
            Self::Problem => format_ident!("Problem"),
        }
    }
}

/// 适配器属性
///
/// # 使用示例
///
/// ```rust,ignore
/// #[derive(SiteAdapter)]
/// #[adapter(kind = "problem", name = "Codeforces", hosts = ["codeforces.com", "m1.codeforces.com"])]
/// pub struct CodeforcesProblem { /* ... */ }
/// ```
///
/// 支持的属性:
/// - `kind = "service" | "contest" | "problem"`: 实体种类 (必须)
/// - `name = "..."`: 适配器显示名称 (必须)
/// - `hosts = ["h1", "h2"]`: 主机白名单 (可选)
///
/// 该宏为类型实现 `crate::traits::Adapter`, 并生成 `__REGISTRY_ITEM_<TYPE>()`,
/// 由 `crate::services::registry_items` 按顺序收集.
#[derive(Debug)]
struct AdapterAttributes {
    kind: EntityKind,
    name: String,
    hosts: Vec<String>,
}

impl AdapterAttributes {
    fn from_attrs(ident: &Ident, attrs: &[Attribute]) -> Result<Self, syn::Error> {
        // 与旧版 syn 兼容: 把属性转成字符串再用正则解析,
        // 形如 (kind = "problem", name = "xxx", hosts = ["a", "b"]).
        let mut kind = None;
        let mut name = None;
        let mut hosts = Vec::new();

        for attr in attrs {
            if !attr.path().is_ident("adapter") {
                continue;
            }
            let mut ts = proc_macro2::TokenStream::new();
            attr.to_tokens(&mut ts);
            let s = ts.to_string();

            if kind.is_none()
                && let Some(cap) = KIND_RE.captures(&s)
            {
                let raw = cap.get(1).unwrap().as_str();
                kind = Some(EntityKind::parse(raw).ok_or_else(|| {
                    syn::Error::new_spanned(attr, format!("unknown adapter kind '{raw}'"))
                })?);
            }
            if name.is_none()
                && let Some(cap) = NAME_RE.captures(&s)
            {
                name = Some(cap.get(1).unwrap().as_str().to_string());
            }
            if let Some(cap) = HOSTS_RE.captures(&s) {
                let inner = cap.name("inner").unwrap().as_str();
                for part in inner.split(',') {
                    let h = part.trim().trim_matches('"').trim().to_string();
                    if !h.is_empty() {
                        hosts.push(h);
                    }
                }
            }
        }

        Ok(AdapterAttributes {
            kind: kind.ok_or_else(|| {
                syn::Error::new_spanned(ident, "Missing required attribute 'kind'")
            })?,
            name: name.ok_or_else(|| {
                syn::Error::new_spanned(ident, "Missing required attribute 'name'")
            })?,
            hosts,
        })
    }
}

#[proc_macro_derive(SiteAdapter, attributes(adapter))]
pub fn derive_site_adapter(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = &input.ident;

    let attrs = match AdapterAttributes::from_attrs(ident, &input.attrs) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    let adapter_name = attrs.name;
    let hosts = attrs.hosts;
    let entity = attrs.kind.ident();

    // 每个适配器一个唯一的注册函数名 (全部大写)
    let registry_item_name =
        format_ident!("__REGISTRY_ITEM_{}", ident.to_string().to_uppercase());

    let expanded = quote! {
        impl crate::traits::Adapter for #ident {
            fn adapter_name(&self) -> &'static str {
                #adapter_name
            }

            fn hosts() -> &'static [&'static str]
            where
                Self: Sized,
            {
                &[#(#hosts),*]
            }
        }

        #[allow(non_snake_case)]
        pub fn #registry_item_name() -> crate::factory::RegistryItem {
            crate::factory::RegistryItem::#entity(crate::factory::Factory {
                name: #adapter_name,
                from_url: |url: &str| -> Option<Box<dyn crate::traits::#entity>> {
                    <#ident as crate::traits::Resolvable>::from_url(url)
                        .map(|it| Box::new(it) as Box<dyn crate::traits::#entity>)
                },
            })
        }
    };

    expanded.into()
}

// Rust parser using syn
//
// The host-language tier: a full syntax tree, so it recovers arguments,
// doc comments, attributes, impl methods and trait bases that the other
// tiers cannot.

use super::{Class, Function, ParseResult, ParserPlugin, NATIVE_PRIORITY};
use proc_macro2::Span;
use std::collections::HashMap;
use std::path::Path;
use syn::{
    Attribute, Expr, FnArg, ImplItem, Item, ItemImpl, Lit, Meta, Pat, Signature, TraitItem,
    Type, TypeParamBound, UseTree,
};

/// Parser for Rust source files
#[derive(Debug, Default)]
pub struct NativeParser;

impl NativeParser {
    pub fn new() -> Self {
        Self
    }
}

impl ParserPlugin for NativeParser {
    fn name(&self) -> &str {
        "native-rust"
    }

    fn priority(&self) -> u32 {
        NATIVE_PRIORITY
    }

    fn supports(&self, language: &str) -> bool {
        language.eq_ignore_ascii_case("rust")
    }

    fn parse(&mut self, content: &str, path: &Path, _language: &str) -> ParseResult {
        let result = match syn::parse_file(content) {
            Ok(file) => {
                let mut collector = Collector::new(path);
                collector.walk(&file.items);
                collector.finish()
            }
            Err(e) => {
                tracing::debug!("syn could not parse {}: {}", path.display(), e);
                ParseResult::default()
            }
        };
        // Line numbers are already extracted; release this thread's source map
        proc_macro2::extra::invalidate_current_thread_spans();
        result
    }
}

/// Two-pass extraction: type definitions first, then impl blocks attach to them
struct Collector<'a> {
    path: &'a Path,
    result: ParseResult,
    class_index: HashMap<String, usize>,
    impls: Vec<&'a ItemImpl>,
}

impl<'a> Collector<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            result: ParseResult::default(),
            class_index: HashMap::new(),
            impls: Vec::new(),
        }
    }

    fn walk(&mut self, items: &'a [Item]) {
        for item in items {
            match item {
                Item::Fn(f) => {
                    let func = function(&f.attrs, &f.sig, self.path);
                    self.result.functions.push(func);
                }
                Item::Struct(s) => self.add_class(&s.ident, &s.attrs),
                Item::Enum(e) => self.add_class(&e.ident, &e.attrs),
                Item::Union(u) => self.add_class(&u.ident, &u.attrs),
                Item::Trait(t) => {
                    self.add_class(&t.ident, &t.attrs);
                    let path = self.path;
                    let class = self.class_mut(&t.ident.to_string(), t.ident.span());
                    for bound in &t.supertraits {
                        if let TypeParamBound::Trait(bound) = bound {
                            if let Some(seg) = bound.path.segments.last() {
                                push_unique(&mut class.bases, seg.ident.to_string());
                            }
                        }
                    }
                    for trait_item in &t.items {
                        if let TraitItem::Fn(f) = trait_item {
                            class.methods.push(function(&f.attrs, &f.sig, path));
                        }
                    }
                }
                Item::Impl(imp) => self.impls.push(imp),
                Item::Mod(m) => {
                    if let Some((_, nested)) = &m.content {
                        self.walk(nested);
                    }
                }
                Item::Use(u) => flatten_use(&u.tree, String::new(), &mut self.result.imports),
                Item::ExternCrate(c) => {
                    self.result.imports.insert(c.ident.to_string());
                }
                _ => {}
            }
        }
    }

    fn add_class(&mut self, ident: &syn::Ident, attrs: &[Attribute]) {
        let name = ident.to_string();
        let mut class = Class::new(&name, self.path, line_of(ident.span()));
        class.docstring = doc_comment(attrs);
        class.decorators = decorators(attrs);
        self.class_index.insert(name, self.result.classes.len());
        self.result.classes.push(class);
    }

    /// The class named `name`, created if this file never declared it
    fn class_mut(&mut self, name: &str, span: Span) -> &mut Class {
        let idx = match self.class_index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.result.classes.len();
                self.result
                    .classes
                    .push(Class::new(name, self.path, line_of(span)));
                self.class_index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.result.classes[idx]
    }

    fn finish(mut self) -> ParseResult {
        let impls = std::mem::take(&mut self.impls);
        for imp in impls {
            let Some((name, span)) = self_type_name(&imp.self_ty) else {
                continue;
            };
            let path = self.path;
            let class = self.class_mut(&name, span);

            if let Some((_, trait_path, _)) = &imp.trait_ {
                if let Some(seg) = trait_path.segments.last() {
                    push_unique(&mut class.bases, seg.ident.to_string());
                }
            }

            for impl_item in &imp.items {
                if let ImplItem::Fn(f) = impl_item {
                    class.methods.push(function(&f.attrs, &f.sig, path));
                }
            }
        }
        self.result
    }
}

fn function(attrs: &[Attribute], sig: &Signature, path: &Path) -> Function {
    let mut func = Function::new(&sig.ident.to_string(), path, line_of(sig.ident.span()));
    func.docstring = doc_comment(attrs);
    func.decorators = decorators(attrs);
    func.is_async = sig.asyncness.is_some();
    func.args = sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Receiver(_) => "self".to_string(),
            FnArg::Typed(typed) => match typed.pat.as_ref() {
                Pat::Ident(ident) => ident.ident.to_string(),
                _ => "_".to_string(),
            },
        })
        .collect();
    func
}

fn line_of(span: Span) -> usize {
    span.start().line
}

/// Name of the type an impl block targets, with the span of its identifier
fn self_type_name(ty: &Type) -> Option<(String, Span)> {
    match ty {
        Type::Path(tp) => tp
            .path
            .segments
            .last()
            .map(|seg| (seg.ident.to_string(), seg.ident.span())),
        Type::Reference(r) => self_type_name(&r.elem),
        Type::Group(g) => self_type_name(&g.elem),
        Type::Paren(p) => self_type_name(&p.elem),
        _ => None,
    }
}

/// Joined `///` comments, or `None` when there are none
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();

    let doc = lines.join("\n").trim().to_string();
    if doc.is_empty() {
        None
    } else {
        Some(doc)
    }
}

/// Attribute paths except `doc`; `derive` keeps its list
fn decorators(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("doc"))
        .map(|attr| {
            let name = path_string(attr.path());
            if attr.path().is_ident("derive") {
                let mut derived = Vec::new();
                let parsed = attr.parse_nested_meta(|meta| {
                    derived.push(path_string(&meta.path));
                    Ok(())
                });
                match parsed {
                    Ok(()) => format!("{}({})", name, derived.join(", ")),
                    Err(_) => name,
                }
            } else {
                name
            }
        })
        .collect()
}

fn path_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

fn flatten_use(tree: &UseTree, prefix: String, out: &mut std::collections::BTreeSet<String>) {
    match tree {
        UseTree::Path(p) => flatten_use(&p.tree, format!("{}{}::", prefix, p.ident), out),
        UseTree::Name(n) => {
            out.insert(format!("{}{}", prefix, n.ident));
        }
        UseTree::Rename(r) => {
            out.insert(format!("{}{}", prefix, r.ident));
        }
        UseTree::Glob(_) => {
            out.insert(format!("{}*", prefix));
        }
        UseTree::Group(g) => {
            for item in &g.items {
                flatten_use(item, prefix.clone(), out);
            }
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

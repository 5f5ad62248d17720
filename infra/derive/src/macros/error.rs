use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, Type, Variant, Visibility};

const CONTEXT_TYPE: &str = "Option<Cow<'static,str>>";

/// What the generated impls need to know about one variant.
struct Shape<'a> {
    ident: &'a Ident,
    source: Option<&'a Type>,
    has_context: bool,
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    let Data::Enum(data) = &input.data else {
        return quote! { compile_error!("sigil_error can only be applied to enums"); };
    };
    if data.variants.is_empty() {
        return quote! { compile_error!("sigil_error requires at least one variant"); };
    }

    let shapes = match data.variants.iter().map(shape_of).collect::<syn::Result<Vec<_>>>() {
        Ok(shapes) => shapes,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let vis = &input.vis;
    let ext = format_ident!("{name}Ext");
    let kind = format_ident!("{name}Kind");

    let kind_items = kind_items(name, &kind, vis, &shapes);
    let context_arms = shapes.iter().filter(|s| s.has_context).map(|s| {
        let ident = s.ident;
        quote! { #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });
    let source_items = shapes.iter().filter_map(|s| source_items(name, &ext, s));
    let internal_items = shapes.iter().any(|s| s.ident == "Internal").then(|| {
        quote! {
            impl From<&'static str> for #name {
                fn from(message: &'static str) -> Self {
                    Self::Internal { message: std::borrow::Cow::Borrowed(message), context: None }
                }
            }

            impl From<String> for #name {
                fn from(message: String) -> Self {
                    Self::Internal { message: std::borrow::Cow::Owned(message), context: None }
                }
            }
        }
    });

    quote! {
        #[derive(Debug, ::thiserror::Error)]
        #input

        #kind_items

        #vis trait #ext<T> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name>;
        }

        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #( #context_arms )*
                        #[allow(unreachable_patterns)]
                        _ => {}
                    }
                    err
                })
            }
        }

        #( #source_items )*
        #internal_items

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> String {
            context.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
        }
    }
}

fn shape_of(variant: &Variant) -> syn::Result<Shape<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(variant, "sigil_error variants need named fields"));
    };

    let mut shape = Shape { ident: &variant.ident, source: None, has_context: false };
    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        if ident == "source" {
            shape.source = Some(&field.ty);
        } else if ident == "context" {
            let ty = &field.ty;
            if quote!(#ty).to_string().replace(' ', "") != CONTEXT_TYPE {
                return Err(syn::Error::new_spanned(ty, "context must be Option<Cow<'static, str>>"));
            }
            shape.has_context = true;
        }
    }

    if shape.source.is_some() && !shape.has_context {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "variants with a source also need `context: Option<Cow<'static, str>>`",
        ));
    }
    Ok(shape)
}

/// Fieldless `Kind` mirror of the enum plus the `kind()` accessor.
fn kind_items(name: &Ident, kind: &Ident, vis: &Visibility, shapes: &[Shape<'_>]) -> TokenStream {
    let idents: Vec<&Ident> = shapes.iter().map(|s| s.ident).collect();
    let labels = idents.iter().map(ToString::to_string);
    let kind_doc = format!("Fieldless discriminant of [`{name}`].");

    quote! {
        #[doc = #kind_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #vis enum #kind {
            #( #idents, )*
        }

        impl #kind {
            /// Variant name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    #( Self::#idents => #labels, )*
                }
            }
        }

        impl std::fmt::Display for #kind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl #name {
            /// Failure category of this error.
            #[must_use]
            pub const fn kind(&self) -> #kind {
                match self {
                    #( Self::#idents { .. } => #kind::#idents, )*
                }
            }
        }
    }
}

/// `From<source>` and `.context()` on foreign results for a source-carrying variant.
fn source_items(name: &Ident, ext: &Ident, shape: &Shape<'_>) -> Option<TokenStream> {
    let source = shape.source?;
    let ident = shape.ident;

    Some(quote! {
        impl From<#source> for #name {
            fn from(source: #source) -> Self {
                Self::#ident { source, context: None }
            }
        }

        impl<T> #ext<T> for ::std::result::Result<T, #source> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name> {
                self.map_err(|source| #name::#ident { source, context: Some(context.into()) })
            }
        }
    })
}
